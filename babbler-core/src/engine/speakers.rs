use tracing::{info, warn};

use crate::error::BabblerError;
use crate::model::Speaker;
use super::Babbler;

impl Babbler {
	/// Looks up a speaker by its exact name.
	pub fn get_speaker(&self, name: &str) -> Result<Speaker, BabblerError> {
		self.store
			.find_speaker(name)?
			.ok_or_else(|| BabblerError::SpeakerNotFound(name.to_owned()))
	}

	pub fn has_speaker(&self, name: &str) -> Result<bool, BabblerError> {
		Ok(self.store.find_speaker(name)?.is_some())
	}

	/// Returns the speaker named `name`, creating and backfilling it if needed.
	///
	/// A new speaker is fed every quote the quote source knows for it.
	/// Backfill failures are logged; the speaker exists regardless.
	pub fn get_or_create_speaker(&mut self, name: &str) -> Result<Speaker, BabblerError> {
		if let Some(speaker) = self.store.find_speaker(name)? {
			return Ok(speaker);
		}

		let speaker = self.store.insert_speaker(name)?;
		info!(speaker = %speaker.name, id = speaker.id, "created babbler");
		self.backfill(&speaker);
		Ok(speaker)
	}

	/// All known speakers, oldest first.
	pub fn speakers(&self) -> Result<Vec<Speaker>, BabblerError> {
		self.store.list_speakers()
	}

	fn backfill(&mut self, speaker: &Speaker) {
		let quotes = match self.quotes.quotes(&speaker.name) {
			Ok(quotes) => quotes,
			Err(e) => {
				warn!(speaker = %speaker.name, error = %e, "quote lookup failed, skipping backfill");
				return;
			}
		};

		let mut learned = 0usize;
		for quote in &quotes {
			match self.learn_for(speaker, quote) {
				Ok(()) => learned += 1,
				Err(e) => warn!(speaker = %speaker.name, error = %e, "failed to learn quote"),
			}
		}
		if !quotes.is_empty() {
			info!(speaker = %speaker.name, learned, total = quotes.len(), "backfilled babbler from quotes");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::quotes::QuoteSource;
	use crate::store::MemoryStore;

	struct Canned(Vec<&'static str>);

	impl QuoteSource for Canned {
		fn quotes(&self, _speaker: &str) -> Result<Vec<String>, BabblerError> {
			Ok(self.0.iter().map(|q| q.to_string()).collect())
		}
	}

	struct Broken;

	impl QuoteSource for Broken {
		fn quotes(&self, _speaker: &str) -> Result<Vec<String>, BabblerError> {
			Err(BabblerError::Storage("factoid table missing".into()))
		}
	}

	#[test]
	fn unknown_speaker_is_not_found() {
		let babbler = Babbler::new(MemoryStore::new()).unwrap();
		assert!(matches!(babbler.get_speaker("bob"), Err(BabblerError::SpeakerNotFound(name)) if name == "bob"));
	}

	#[test]
	fn speaker_is_created_once() {
		let mut babbler = Babbler::new(MemoryStore::new()).unwrap();
		let first = babbler.get_or_create_speaker("alice").unwrap();
		let second = babbler.get_or_create_speaker("alice").unwrap();
		assert_eq!(first, second);
		assert_eq!(babbler.speakers().unwrap().len(), 1);
	}

	#[test]
	fn names_are_case_sensitive() {
		let mut babbler = Babbler::new(MemoryStore::new()).unwrap();
		babbler.get_or_create_speaker("Alice").unwrap();
		assert!(!babbler.has_speaker("alice").unwrap());
		assert!(babbler.has_speaker("Alice").unwrap());
	}

	#[test]
	fn creation_backfills_from_quotes() {
		let mut babbler = Babbler::new(MemoryStore::new())
			.unwrap()
			.with_quotes(Canned(vec!["fish are friends", "fish are food"]));
		let speaker = babbler.get_or_create_speaker("seabass").unwrap();

		let roots = babbler.store().list_root_nodes(speaker.id).unwrap();
		assert_eq!(roots.len(), 1);
		assert_eq!(roots[0].root_frequency, 2);
	}

	#[test]
	fn backfill_failure_still_creates_speaker() {
		let mut babbler = Babbler::new(MemoryStore::new()).unwrap().with_quotes(Broken);
		babbler.get_or_create_speaker("seabass").unwrap();
		assert!(babbler.has_speaker("seabass").unwrap());
	}
}
