use crate::error::BabblerError;
use super::records::{Arc, Node, NodeId, Speaker, SpeakerId, Word, WordId};

/// Storage contract for the babbler graph.
///
/// Backends only need exact-match lookups, inserts and in-place increments;
/// the `get_or_create_*` helpers are provided on top of them.
///
/// # Ordering
/// Every `list_*` method returns records in ascending id order. Weighted
/// draws walk these lists, so the order decides which record a given draw
/// lands on.
///
/// # Concurrency
/// Each call is atomic on its own, but sequences such as "find node, then
/// increment it" are not wrapped in a transaction. Two writers learning for
/// the same speaker through separate handles can interleave between calls:
/// if both miss on `find_node`, the later `insert_node` trips the unique
/// `(speaker, word)` index and fails with `Storage`, aborting that learn.
pub trait GraphStore {
	/// Exact-match word lookup. Callers fold case before calling.
	fn find_word(&self, text: &str) -> Result<Option<Word>, BabblerError>;

	fn insert_word(&mut self, text: &str) -> Result<Word, BabblerError>;

	fn word_by_id(&self, id: WordId) -> Result<Option<Word>, BabblerError>;

	fn find_speaker(&self, name: &str) -> Result<Option<Speaker>, BabblerError>;

	fn insert_speaker(&mut self, name: &str) -> Result<Speaker, BabblerError>;

	fn list_speakers(&self) -> Result<Vec<Speaker>, BabblerError>;

	fn find_node(&self, speaker: SpeakerId, word: WordId) -> Result<Option<Node>, BabblerError>;

	/// Inserts a node. The caller guarantees no node exists yet for the pair.
	fn insert_node(
		&mut self,
		speaker: SpeakerId,
		word: WordId,
		is_root: bool,
		root_frequency: u64,
	) -> Result<Node, BabblerError>;

	fn node_by_id(&self, id: NodeId) -> Result<Option<Node>, BabblerError>;

	/// Adds `amount` to the root frequency of `node`.
	///
	/// `mark_root` also sets the root flag; it is never cleared.
	fn add_root_frequency(&mut self, node: NodeId, amount: u64, mark_root: bool) -> Result<Node, BabblerError>;

	fn find_arc(&self, from: NodeId, to: NodeId) -> Result<Option<Arc>, BabblerError>;

	/// Adds `amount` to the arc `from -> to`, creating it with `amount` if absent.
	fn add_arc_frequency(&mut self, from: NodeId, to: NodeId, amount: u64) -> Result<Arc, BabblerError>;

	/// Root nodes (`is_root`) of a speaker.
	fn list_root_nodes(&self, speaker: SpeakerId) -> Result<Vec<Node>, BabblerError>;

	/// Every node of a speaker, roots or not.
	fn list_nodes(&self, speaker: SpeakerId) -> Result<Vec<Node>, BabblerError>;

	fn list_arcs_from(&self, node: NodeId) -> Result<Vec<Arc>, BabblerError>;

	/// Persists pending state. Backends writing through on every call keep the default.
	fn flush(&mut self) -> Result<(), BabblerError> {
		Ok(())
	}

	fn get_or_create_word(&mut self, text: &str) -> Result<Word, BabblerError> {
		match self.find_word(text)? {
			Some(word) => Ok(word),
			None => self.insert_word(text),
		}
	}

	fn get_or_create_node(&mut self, speaker: SpeakerId, word: WordId) -> Result<Node, BabblerError> {
		match self.find_node(speaker, word)? {
			Some(node) => Ok(node),
			None => self.insert_node(speaker, word, false, 0),
		}
	}

	/// Marks `node` as a root and counts one more utterance starting there.
	fn increment_root(&mut self, node: NodeId) -> Result<Node, BabblerError> {
		self.add_root_frequency(node, 1, true)
	}

	/// Counts one more `from -> to` transition.
	fn increment_arc(&mut self, from: NodeId, to: NodeId) -> Result<Arc, BabblerError> {
		self.add_arc_frequency(from, to, 1)
	}
}
