//! Application-wide error types.

use thiserror::Error;

use crate::model::NodeId;

#[derive(Debug, Error)]
pub enum BabblerError {
	#[error("babbler not found: {0}")]
	SpeakerNotFound(String),

	#[error("{0} hasn't said anything yet")]
	NoUtterances(String),

	#[error("never said that: {0}")]
	NeverSaid(String),

	#[error("missing arcs from node {0}")]
	MissingArcs(NodeId),

	#[error("cannot merge {0} into itself")]
	SelfMerge(String),

	#[error("storage error: {0}")]
	Storage(String),

	#[error("snapshot error: {0}")]
	Snapshot(String),

	#[error("config error: {0}")]
	Config(String),

	#[error("logger error: {0}")]
	Logger(String),

	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for BabblerError {
	fn from(e: rusqlite::Error) -> Self {
		BabblerError::Storage(e.to_string())
	}
}

impl From<postcard::Error> for BabblerError {
	fn from(e: postcard::Error) -> Self {
		BabblerError::Snapshot(e.to_string())
	}
}
