//! Storage backends for the babbler graph.

/// Arena-backed store, optionally persisted as a postcard snapshot.
pub mod memory;

/// SQLite-backed store.
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::config::{Backend, StorageConfig};
use crate::error::BabblerError;
use crate::model::GraphStore;

/// Opens the backend selected in the configuration.
pub fn open(config: &StorageConfig) -> Result<Box<dyn GraphStore + Send>, BabblerError> {
	match config.backend {
		Backend::Sqlite => Ok(Box::new(SqliteStore::open(&config.path)?)),
		Backend::Memory => Ok(Box::new(MemoryStore::open(&config.path)?)),
	}
}
