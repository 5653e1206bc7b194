//! The babbler engine.
//!
//! `Babbler` owns a storage backend, a random source and a quote source,
//! and exposes the speaker registry, learner, generator and merger as
//! methods split across the submodules below.

use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::BabblerError;
use crate::model::GraphStore;
use crate::quotes::{FileQuotes, NoQuotes, QuoteSource};
use crate::store;

/// Word interning and case folding.
pub mod vocabulary;

/// Speaker lookup, creation and backfill.
pub mod speakers;

/// Incremental updates of root and arc frequencies.
pub mod learner;

/// Weighted random walks.
pub mod generator;

/// Graph union of two speakers.
pub mod merger;

pub use generator::weighted_pick;
pub use merger::MergeReport;
pub use vocabulary::{BOOTSTRAP, TERMINAL, boundary_word, tokenize};

/// Markov-chain babbler over a `GraphStore`.
///
/// # Responsibilities
/// - Learn utterances per speaker
/// - Generate utterances by weighted random walk, optionally seeded
/// - Merge one speaker's graph into another's
///
/// Every operation runs to completion on `&mut self`; callers sharing an
/// engine across threads wrap it in a lock.
pub struct Babbler {
	store: Box<dyn GraphStore + Send>,
	rng: Box<dyn RngCore + Send>,
	quotes: Box<dyn QuoteSource + Send>,
}

impl Babbler {
	/// Creates an engine over `store`, with an OS-seeded RNG and no quote source.
	///
	/// Interns the bootstrap word so the vocabulary is never empty.
	pub fn new<S: GraphStore + Send + 'static>(store: S) -> Result<Self, BabblerError> {
		Self::from_store(Box::new(store))
	}

	pub fn from_store(store: Box<dyn GraphStore + Send>) -> Result<Self, BabblerError> {
		let mut babbler = Self {
			store,
			rng: Box::new(StdRng::from_os_rng()),
			quotes: Box::new(NoQuotes),
		};
		babbler.store.get_or_create_word(BOOTSTRAP)?;
		Ok(babbler)
	}

	/// Builds the engine described by `config`: backend, RNG seed and quote directory.
	pub fn from_config(config: &Config) -> Result<Self, BabblerError> {
		let mut babbler = Self::from_store(store::open(&config.storage)?)?;
		if let Some(seed) = config.rng_seed {
			babbler = babbler.with_rng(StdRng::seed_from_u64(seed));
		}
		if let Some(dir) = &config.quotes_dir {
			let quotes = FileQuotes::new(dir);
			match quotes.speakers() {
				Ok(names) => info!(dir = %dir.display(), speakers = ?names, "quote files available"),
				Err(e) => warn!(dir = %dir.display(), error = %e, "cannot list quote files"),
			}
			babbler = babbler.with_quotes(quotes);
		}
		debug!(backend = ?config.storage.backend, path = %config.storage.path.display(), "babbler ready");
		Ok(babbler)
	}

	/// Replaces the random source used by weighted draws.
	pub fn with_rng<R: RngCore + Send + 'static>(mut self, rng: R) -> Self {
		self.rng = Box::new(rng);
		self
	}

	/// Replaces the quote source consulted when a speaker is created.
	pub fn with_quotes<Q: QuoteSource + Send + 'static>(mut self, quotes: Q) -> Self {
		self.quotes = Box::new(quotes);
		self
	}

	/// Read-only access to the underlying store.
	pub fn store(&self) -> &dyn GraphStore {
		&*self.store
	}

	/// Persists pending state in backends that buffer it.
	pub fn flush(&mut self) -> Result<(), BabblerError> {
		self.store.flush()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{Backend, StorageConfig};

	#[test]
	fn from_config_wires_backend_seed_and_quotes() {
		let dir = tempfile::tempdir().unwrap();
		let quotes = dir.path().join("quotes");
		std::fs::create_dir(&quotes).unwrap();
		std::fs::write(quotes.join("seabass.txt"), "fish are friends\n").unwrap();

		let config = Config {
			rng_seed: Some(7),
			quotes_dir: Some(quotes),
			storage: StorageConfig { backend: Backend::Memory, path: dir.path().join("babbler.bin") },
			..Config::default()
		};
		let mut babbler = Babbler::from_config(&config).unwrap();
		babbler.get_or_create_speaker("seabass").unwrap();
		assert_eq!(babbler.babble("seabass").unwrap(), "fish are friends");

		babbler.flush().unwrap();
		assert!(dir.path().join("babbler.bin").is_file());
	}
}
