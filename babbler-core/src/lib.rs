//! Persistent Markov-chain "babbler" engine.
//!
//! This crate learns per-speaker word transitions from chat lines and
//! produces new lines by weighted random walk, including:
//! - A first-order word graph with root and terminal markers
//! - Interchangeable storage backends (SQLite, in-memory with snapshots)
//! - Seeded or unseeded generation with an injectable random source
//! - Merging one speaker's graph into another's
//! - A chat command interpreter driving all of the above

/// Application-wide error type.
pub mod error;

/// TOML configuration with environment overrides.
pub mod config;

/// Tracing subscriber bootstrap.
pub mod logger;

/// Records of the word graph and the storage contract they live behind.
pub mod model;

/// Storage backends implementing `GraphStore`.
pub mod store;

/// The babbler engine: vocabulary, speakers, learning, generation, merging.
pub mod engine;

/// Chat command parsing and dispatch.
pub mod command;

/// Quote sources used to backfill new speakers.
pub mod quotes;

/// File helpers (quote files, snapshot paths).
///
/// Not exposed
pub(crate) mod io;

pub use engine::Babbler;
pub use error::BabblerError;
