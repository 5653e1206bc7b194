use serde::{Deserialize, Serialize};

pub type SpeakerId = i64;
pub type WordId = i64;
pub type NodeId = i64;
pub type ArcId = i64;

/// A trained identity with its own word graph.
///
/// `name` is the case-sensitive key used by chat commands.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Speaker {
	pub id: SpeakerId,
	pub name: String,
}

/// An interned, case-folded word.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Word {
	pub id: WordId,
	pub text: String,
}

/// "This speaker can say this word."
///
/// # Invariants
/// - At most one node per `(speaker_id, word_id)`
/// - `is_root` is true exactly when `root_frequency > 0`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Node {
	pub id: NodeId,
	pub speaker_id: SpeakerId,
	pub word_id: WordId,
	pub is_root: bool,
	/// Number of learned utterances that started with this word.
	pub root_frequency: u64,
}

/// Observed transition `from_node_id -> to_node_id`.
///
/// Repeated transitions bump `frequency`, there are never parallel arcs.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Arc {
	pub id: ArcId,
	pub from_node_id: NodeId,
	pub to_node_id: NodeId,
	pub frequency: u64,
}
