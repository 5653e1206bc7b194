use crate::error::BabblerError;
use crate::model::{Node, Speaker, Word};
use super::Babbler;

/// Placeholder word interned once when the engine starts.
pub const BOOTSTRAP: &str = "";

/// Word ending every learned utterance and every generated walk.
pub const TERMINAL: &str = " ";

/// Splits an utterance into lowercase, whitespace-separated words.
pub fn tokenize(utterance: &str) -> Vec<String> {
	utterance.split_whitespace().map(str::to_lowercase).collect()
}

/// Synthetic word marking a speaker's graph during merges: `alice` → `<alice>`.
pub fn boundary_word(speaker: &str) -> String {
	format!("<{}>", speaker.to_lowercase())
}

impl Babbler {
	pub fn get_or_create_word(&mut self, text: &str) -> Result<Word, BabblerError> {
		self.store.get_or_create_word(text)
	}

	/// Exact-match lookup, failing with `NeverSaid` for unknown words.
	pub fn get_word(&self, text: &str) -> Result<Word, BabblerError> {
		self.store
			.find_word(text)?
			.ok_or_else(|| BabblerError::NeverSaid(text.to_owned()))
	}

	/// The node of `speaker` for `text`, failing with `NeverSaid` if there is none.
	pub(crate) fn node_for(&self, speaker: &Speaker, text: &str) -> Result<Node, BabblerError> {
		let word = self.get_word(text)?;
		self.store
			.find_node(speaker.id, word.id)?
			.ok_or_else(|| BabblerError::NeverSaid(text.to_owned()))
	}

	pub(crate) fn get_or_create_node_for(&mut self, speaker: &Speaker, text: &str) -> Result<Node, BabblerError> {
		let word = self.store.get_or_create_word(text)?;
		self.store.get_or_create_node(speaker.id, word.id)
	}

	pub(crate) fn word_of(&self, node: &Node) -> Result<Word, BabblerError> {
		self.store
			.word_by_id(node.word_id)?
			.ok_or_else(|| BabblerError::Storage(format!("node {} points at unknown word {}", node.id, node.word_id)))
	}
}
