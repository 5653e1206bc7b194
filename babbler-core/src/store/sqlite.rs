//! `sqlite`: durable babbler graph on a single SQLite file.
//!
//! ## Schema
//! - `babblers(id, name)`: unique on `name`
//! - `babbler_words(id, word)`: unique on `word`
//! - `babbler_nodes(id, babbler_id, word_id, root, root_frequency)`: unique on
//!   `(babbler_id, word_id)`
//! - `babbler_arcs(id, from_node_id, to_node_id, frequency)`: unique on
//!   `(from_node_id, to_node_id)`
//!
//! Increments are single `UPDATE`/upsert statements, so each call is atomic.
//! Nothing spans calls in a transaction (see `GraphStore`).

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use crate::error::BabblerError;
use crate::io::ensure_parent_dir;
use crate::model::{Arc, GraphStore, Node, NodeId, Speaker, SpeakerId, Word, WordId};

/// Schema version stored in `PRAGMA user_version`.
const SCHEMA_VERSION: i64 = 1;

const NODE_COLUMNS: &str = "id, babbler_id, word_id, root, root_frequency";
const ARC_COLUMNS: &str = "id, from_node_id, to_node_id, frequency";

pub struct SqliteStore {
	conn: Connection,
}

impl SqliteStore {
	/// Opens (or creates) the database at `path` and applies the schema.
	///
	/// Pragmas applied:
	/// - `journal_mode = WAL`
	/// - busy timeout of 5 s
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BabblerError> {
		let path = path.as_ref();
		ensure_parent_dir(path)?;
		let conn = Connection::open(path)
			.map_err(|e| BabblerError::Storage(format!("open {}: {e}", path.display())))?;

		conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
			.map_err(|e| BabblerError::Storage(format!("set journal_mode WAL: {e}")))?;
		conn.busy_timeout(Duration::from_secs(5))?;

		let store = Self { conn };
		store.init_schema()?;
		debug!(path = %path.display(), "opened babbler database");
		Ok(store)
	}

	/// Opens a private in-memory database. Useful for tests.
	pub fn open_in_memory() -> Result<Self, BabblerError> {
		let store = Self { conn: Connection::open_in_memory()? };
		store.init_schema()?;
		Ok(store)
	}

	fn init_schema(&self) -> Result<(), BabblerError> {
		let version: i64 = self.conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
		if version >= SCHEMA_VERSION {
			return Ok(());
		}

		self.conn
			.execute_batch(
				"
				CREATE TABLE IF NOT EXISTS babblers (
					id INTEGER PRIMARY KEY,
					name TEXT NOT NULL UNIQUE
				);

				CREATE TABLE IF NOT EXISTS babbler_words (
					id INTEGER PRIMARY KEY,
					word TEXT NOT NULL UNIQUE
				);

				CREATE TABLE IF NOT EXISTS babbler_nodes (
					id INTEGER PRIMARY KEY,
					babbler_id INTEGER NOT NULL,
					word_id INTEGER NOT NULL,
					root INTEGER NOT NULL DEFAULT 0,
					root_frequency INTEGER NOT NULL DEFAULT 0,
					UNIQUE (babbler_id, word_id)
				);

				CREATE TABLE IF NOT EXISTS babbler_arcs (
					id INTEGER PRIMARY KEY,
					from_node_id INTEGER NOT NULL,
					to_node_id INTEGER NOT NULL,
					frequency INTEGER NOT NULL DEFAULT 0,
					UNIQUE (from_node_id, to_node_id)
				);

				PRAGMA user_version = 1;
				",
			)
			.map_err(|e| BabblerError::Storage(format!("initialize schema: {e}")))
	}

	fn node_from_row(row: &Row<'_>) -> rusqlite::Result<Node> {
		Ok(Node {
			id: row.get(0)?,
			speaker_id: row.get(1)?,
			word_id: row.get(2)?,
			is_root: row.get::<_, i64>(3)? != 0,
			root_frequency: row.get::<_, i64>(4)? as u64,
		})
	}

	fn arc_from_row(row: &Row<'_>) -> rusqlite::Result<Arc> {
		Ok(Arc {
			id: row.get(0)?,
			from_node_id: row.get(1)?,
			to_node_id: row.get(2)?,
			frequency: row.get::<_, i64>(3)? as u64,
		})
	}

	fn query_nodes(&self, sql: &str, speaker: SpeakerId) -> Result<Vec<Node>, BabblerError> {
		let mut stmt = self.conn.prepare(sql)?;
		let nodes = stmt
			.query_map(params![speaker], Self::node_from_row)?
			.collect::<Result<Vec<_>, _>>()?;
		Ok(nodes)
	}
}

impl GraphStore for SqliteStore {
	fn find_word(&self, text: &str) -> Result<Option<Word>, BabblerError> {
		Ok(self
			.conn
			.query_row(
				"SELECT id, word FROM babbler_words WHERE word = ?1",
				params![text],
				|row| Ok(Word { id: row.get(0)?, text: row.get(1)? }),
			)
			.optional()?)
	}

	fn insert_word(&mut self, text: &str) -> Result<Word, BabblerError> {
		self.conn.execute("INSERT INTO babbler_words (word) VALUES (?1)", params![text])?;
		Ok(Word { id: self.conn.last_insert_rowid(), text: text.to_owned() })
	}

	fn word_by_id(&self, id: WordId) -> Result<Option<Word>, BabblerError> {
		Ok(self
			.conn
			.query_row(
				"SELECT id, word FROM babbler_words WHERE id = ?1",
				params![id],
				|row| Ok(Word { id: row.get(0)?, text: row.get(1)? }),
			)
			.optional()?)
	}

	fn find_speaker(&self, name: &str) -> Result<Option<Speaker>, BabblerError> {
		Ok(self
			.conn
			.query_row(
				"SELECT id, name FROM babblers WHERE name = ?1",
				params![name],
				|row| Ok(Speaker { id: row.get(0)?, name: row.get(1)? }),
			)
			.optional()?)
	}

	fn insert_speaker(&mut self, name: &str) -> Result<Speaker, BabblerError> {
		self.conn.execute("INSERT INTO babblers (name) VALUES (?1)", params![name])?;
		Ok(Speaker { id: self.conn.last_insert_rowid(), name: name.to_owned() })
	}

	fn list_speakers(&self) -> Result<Vec<Speaker>, BabblerError> {
		let mut stmt = self.conn.prepare("SELECT id, name FROM babblers ORDER BY id")?;
		let speakers = stmt
			.query_map([], |row| Ok(Speaker { id: row.get(0)?, name: row.get(1)? }))?
			.collect::<Result<Vec<_>, _>>()?;
		Ok(speakers)
	}

	fn find_node(&self, speaker: SpeakerId, word: WordId) -> Result<Option<Node>, BabblerError> {
		Ok(self
			.conn
			.query_row(
				&format!("SELECT {NODE_COLUMNS} FROM babbler_nodes WHERE babbler_id = ?1 AND word_id = ?2"),
				params![speaker, word],
				Self::node_from_row,
			)
			.optional()?)
	}

	fn insert_node(
		&mut self,
		speaker: SpeakerId,
		word: WordId,
		is_root: bool,
		root_frequency: u64,
	) -> Result<Node, BabblerError> {
		self.conn.execute(
			"INSERT INTO babbler_nodes (babbler_id, word_id, root, root_frequency) VALUES (?1, ?2, ?3, ?4)",
			params![speaker, word, is_root as i64, root_frequency as i64],
		)?;
		Ok(Node {
			id: self.conn.last_insert_rowid(),
			speaker_id: speaker,
			word_id: word,
			is_root,
			root_frequency,
		})
	}

	fn node_by_id(&self, id: NodeId) -> Result<Option<Node>, BabblerError> {
		Ok(self
			.conn
			.query_row(
				&format!("SELECT {NODE_COLUMNS} FROM babbler_nodes WHERE id = ?1"),
				params![id],
				Self::node_from_row,
			)
			.optional()?)
	}

	fn add_root_frequency(&mut self, node: NodeId, amount: u64, mark_root: bool) -> Result<Node, BabblerError> {
		let updated = self.conn.execute(
			"UPDATE babbler_nodes
			 SET root_frequency = root_frequency + ?1,
			     root = CASE WHEN ?2 THEN 1 ELSE root END
			 WHERE id = ?3",
			params![amount as i64, mark_root, node],
		)?;
		if updated == 0 {
			return Err(BabblerError::Storage(format!("unknown node {node}")));
		}
		self.node_by_id(node)?
			.ok_or_else(|| BabblerError::Storage(format!("unknown node {node}")))
	}

	fn find_arc(&self, from: NodeId, to: NodeId) -> Result<Option<Arc>, BabblerError> {
		Ok(self
			.conn
			.query_row(
				&format!("SELECT {ARC_COLUMNS} FROM babbler_arcs WHERE from_node_id = ?1 AND to_node_id = ?2"),
				params![from, to],
				Self::arc_from_row,
			)
			.optional()?)
	}

	fn add_arc_frequency(&mut self, from: NodeId, to: NodeId, amount: u64) -> Result<Arc, BabblerError> {
		self.conn.execute(
			"INSERT INTO babbler_arcs (from_node_id, to_node_id, frequency) VALUES (?1, ?2, ?3)
			 ON CONFLICT (from_node_id, to_node_id) DO UPDATE SET frequency = frequency + excluded.frequency",
			params![from, to, amount as i64],
		)?;
		self.find_arc(from, to)?
			.ok_or_else(|| BabblerError::Storage(format!("arc {from} -> {to} vanished after upsert")))
	}

	fn list_root_nodes(&self, speaker: SpeakerId) -> Result<Vec<Node>, BabblerError> {
		self.query_nodes(
			&format!("SELECT {NODE_COLUMNS} FROM babbler_nodes WHERE babbler_id = ?1 AND root = 1 ORDER BY id"),
			speaker,
		)
	}

	fn list_nodes(&self, speaker: SpeakerId) -> Result<Vec<Node>, BabblerError> {
		self.query_nodes(
			&format!("SELECT {NODE_COLUMNS} FROM babbler_nodes WHERE babbler_id = ?1 ORDER BY id"),
			speaker,
		)
	}

	fn list_arcs_from(&self, node: NodeId) -> Result<Vec<Arc>, BabblerError> {
		let mut stmt = self
			.conn
			.prepare(&format!("SELECT {ARC_COLUMNS} FROM babbler_arcs WHERE from_node_id = ?1 ORDER BY id"))?;
		let arcs = stmt
			.query_map(params![node], Self::arc_from_row)?
			.collect::<Result<Vec<_>, _>>()?;
		Ok(arcs)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn open_creates_database_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("data").join("babbler.db");
		SqliteStore::open(&path).unwrap();
		assert!(path.exists());
	}

	#[test]
	fn reopen_keeps_rows() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("babbler.db");
		{
			let mut store = SqliteStore::open(&path).unwrap();
			store.insert_speaker("alice").unwrap();
			store.insert_word("hello").unwrap();
		}
		let store = SqliteStore::open(&path).unwrap();
		assert_eq!(store.find_speaker("alice").unwrap().map(|s| s.name), Some("alice".to_owned()));
		assert!(store.find_word("hello").unwrap().is_some());
	}

	#[test]
	fn word_lookup_is_exact() {
		let mut store = SqliteStore::open_in_memory().unwrap();
		store.insert_word("hello").unwrap();
		assert!(store.find_word("Hello").unwrap().is_none());
		assert!(store.find_word("hello").unwrap().is_some());
	}

	#[test]
	fn duplicate_node_is_rejected_by_schema() {
		let mut store = SqliteStore::open_in_memory().unwrap();
		let speaker = store.insert_speaker("alice").unwrap();
		let word = store.insert_word("hello").unwrap();
		store.insert_node(speaker.id, word.id, false, 0).unwrap();
		assert!(matches!(store.insert_node(speaker.id, word.id, false, 0), Err(BabblerError::Storage(_))));
	}

	#[test]
	fn arc_upsert_accumulates() {
		let mut store = SqliteStore::open_in_memory().unwrap();
		let speaker = store.insert_speaker("alice").unwrap();
		let a = store.insert_word("a").unwrap();
		let b = store.insert_word("b").unwrap();
		let from = store.get_or_create_node(speaker.id, a.id).unwrap();
		let to = store.get_or_create_node(speaker.id, b.id).unwrap();

		assert_eq!(store.increment_arc(from.id, to.id).unwrap().frequency, 1);
		assert_eq!(store.add_arc_frequency(from.id, to.id, 3).unwrap().frequency, 4);
		assert_eq!(store.list_arcs_from(from.id).unwrap().len(), 1);
	}

	#[test]
	fn root_flag_is_sticky() {
		let mut store = SqliteStore::open_in_memory().unwrap();
		let speaker = store.insert_speaker("alice").unwrap();
		let word = store.insert_word("hello").unwrap();
		let node = store.get_or_create_node(speaker.id, word.id).unwrap();

		let node = store.increment_root(node.id).unwrap();
		assert!(node.is_root);
		let node = store.add_root_frequency(node.id, 2, false).unwrap();
		assert!(node.is_root);
		assert_eq!(node.root_frequency, 3);
		assert_eq!(store.list_root_nodes(speaker.id).unwrap(), vec![node]);
	}

	#[test]
	fn unknown_node_is_a_storage_error() {
		let mut store = SqliteStore::open_in_memory().unwrap();
		assert!(matches!(store.increment_root(99), Err(BabblerError::Storage(_))));
	}
}
