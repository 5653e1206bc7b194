use tracing::debug;

use crate::error::BabblerError;
use crate::model::Speaker;
use super::Babbler;
use super::vocabulary::{TERMINAL, tokenize};

impl Babbler {
	/// Learns `utterance` for the speaker named `name`, creating the speaker if needed.
	///
	/// # Behavior
	/// - Lowercases and splits the utterance on whitespace
	/// - Counts one more root occurrence for the first word
	/// - Counts one more arc for each consecutive pair of words
	/// - Counts one more arc from the last word to the terminal marker
	///
	/// An utterance with no words is a no-op.
	pub fn learn(&mut self, name: &str, utterance: &str) -> Result<(), BabblerError> {
		let speaker = self.get_or_create_speaker(name)?;
		self.learn_for(&speaker, utterance)
	}

	pub(crate) fn learn_for(&mut self, speaker: &Speaker, utterance: &str) -> Result<(), BabblerError> {
		let words = tokenize(utterance);
		let Some((first, rest)) = words.split_first() else {
			return Ok(());
		};

		let mut current = self.get_or_create_node_for(speaker, first)?;
		self.store.increment_root(current.id)?;

		for word in rest {
			let next = self.get_or_create_node_for(speaker, word)?;
			self.store.increment_arc(current.id, next.id)?;
			current = next;
		}

		let terminal = self.get_or_create_node_for(speaker, TERMINAL)?;
		self.store.increment_arc(current.id, terminal.id)?;

		debug!(speaker = %speaker.name, words = words.len(), "learned utterance");
		Ok(())
	}
}
