use rand::Rng;
use tracing::debug;

use crate::error::BabblerError;
use crate::model::{Node, Speaker};
use super::Babbler;
use super::vocabulary::{TERMINAL, tokenize};

/// Picks one item with probability proportional to its weight.
///
/// Draws `which` uniformly in `[0, total)` and returns the first item whose
/// running weight sum exceeds it, walking `items` in the given order.
///
/// Returns `None` if `items` is empty or all weights are zero.
pub fn weighted_pick<'a, T, R>(rng: &mut R, items: &'a [T], weight: impl Fn(&T) -> u64) -> Option<&'a T>
where
	R: Rng + ?Sized,
{
	let total: u64 = items.iter().map(&weight).sum();
	if total == 0 {
		return None;
	}

	let which = rng.random_range(0..total);
	let mut running = 0u64;
	for item in items {
		running += weight(item);
		if running > which {
			return Some(item);
		}
	}
	None
}

impl Babbler {
	/// Generates an utterance for `name` starting from a weighted random root.
	pub fn babble(&mut self, name: &str) -> Result<String, BabblerError> {
		self.babble_seed::<&str>(name, &[])
	}

	/// Generates an utterance for `name`, continuing from `seed` when given.
	///
	/// # Behavior
	/// - Empty seed: starts at a root drawn by root frequency
	/// - Non-empty seed: every seed word must be known to the speaker and each
	///   consecutive pair must be an observed transition; generation continues
	///   from the last seed word and the output starts with the seed
	/// - Walks arcs drawn by frequency until the terminal marker is drawn
	///
	/// # Errors
	/// - `SpeakerNotFound` for an unknown speaker
	/// - `NoUtterances` if the speaker has no root nodes
	/// - `NeverSaid` if the seed is not an observed path
	/// - `MissingArcs` if the walk reaches a node with no outgoing arcs
	pub fn babble_seed<S: AsRef<str>>(&mut self, name: &str, seed: &[S]) -> Result<String, BabblerError> {
		let speaker = self.get_speaker(name)?;
		let seed: Vec<String> = seed.iter().flat_map(|s| tokenize(s.as_ref())).collect();

		let mut words: Vec<String> = Vec::new();
		let mut current = match seed.split_first() {
			None => {
				let root = self.weighted_root_node(&speaker)?;
				words.push(self.word_of(&root)?.text);
				root
			}
			Some((first, rest)) => {
				let mut node = self.node_for(&speaker, first)?;
				let mut previous = first;
				for word in rest {
					let next = self.node_for(&speaker, word)?;
					if self.store.find_arc(node.id, next.id)?.is_none() {
						return Err(BabblerError::NeverSaid(format!("{previous} {word}")));
					}
					node = next;
					previous = word;
				}
				words.extend(seed.iter().cloned());
				node
			}
		};

		loop {
			let next = self.weighted_next_node(&current)?;
			let word = self.word_of(&next)?;
			if word.text == TERMINAL {
				break;
			}
			words.push(word.text);
			current = next;
		}

		debug!(speaker = %speaker.name, words = words.len(), "babbled");
		Ok(words.join(" "))
	}

	fn weighted_root_node(&mut self, speaker: &Speaker) -> Result<Node, BabblerError> {
		let roots = self.store.list_root_nodes(speaker.id)?;
		weighted_pick(&mut *self.rng, &roots, |node| node.root_frequency)
			.cloned()
			.ok_or_else(|| BabblerError::NoUtterances(speaker.name.clone()))
	}

	fn weighted_next_node(&mut self, from: &Node) -> Result<Node, BabblerError> {
		let arcs = self.store.list_arcs_from(from.id)?;
		let arc = weighted_pick(&mut *self.rng, &arcs, |arc| arc.frequency)
			.ok_or(BabblerError::MissingArcs(from.id))?;
		self.store
			.node_by_id(arc.to_node_id)?
			.ok_or_else(|| BabblerError::Storage(format!("arc {} points at unknown node {}", arc.id, arc.to_node_id)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	use rand::rngs::StdRng;
	use rand::{RngCore, SeedableRng};

	use crate::store::MemoryStore;

	/// Always draws zero, so every weighted pick lands on the first candidate.
	struct Zero;

	impl RngCore for Zero {
		fn next_u32(&mut self) -> u32 {
			0
		}

		fn next_u64(&mut self) -> u64 {
			0
		}

		fn fill_bytes(&mut self, dst: &mut [u8]) {
			dst.fill(0);
		}
	}

	fn seeded(seed: u64) -> Babbler {
		Babbler::new(MemoryStore::new()).unwrap().with_rng(StdRng::seed_from_u64(seed))
	}

	#[test]
	fn weighted_pick_respects_order_and_weights() {
		let items = [("a", 0u64), ("b", 2), ("c", 1)];
		assert_eq!(weighted_pick(&mut Zero, &items, |i| i.1).map(|i| i.0), Some("b"));

		let mut rng = StdRng::seed_from_u64(1);
		let mut seen = HashSet::new();
		for _ in 0..200 {
			seen.insert(weighted_pick(&mut rng, &items, |i| i.1).unwrap().0);
		}
		assert_eq!(seen, HashSet::from(["b", "c"]));
	}

	#[test]
	fn weighted_pick_on_nothing_is_none() {
		let empty: [u64; 0] = [];
		assert!(weighted_pick(&mut Zero, &empty, |w| *w).is_none());
		assert!(weighted_pick(&mut Zero, &[0u64, 0], |w| *w).is_none());
	}

	#[test]
	fn seeded_generation_stays_on_learned_paths() {
		let mut babbler = seeded(7);
		babbler.learn("alice", "hello world").unwrap();
		babbler.learn("alice", "hello there").unwrap();

		let mut seen = HashSet::new();
		for _ in 0..200 {
			seen.insert(babbler.babble_seed("alice", &["hello"]).unwrap());
		}
		assert_eq!(seen, HashSet::from(["hello world".to_owned(), "hello there".to_owned()]));
	}

	#[test]
	fn zero_rng_follows_first_learned_path() {
		let mut babbler = Babbler::new(MemoryStore::new()).unwrap().with_rng(Zero);
		babbler.learn("alice", "the cat sat").unwrap();
		babbler.learn("alice", "a dog ran").unwrap();
		assert_eq!(babbler.babble("alice").unwrap(), "the cat sat");
	}

	#[test]
	fn multi_word_seed_must_be_a_path() {
		let mut babbler = seeded(3);
		babbler.learn("alice", "the cat sat down").unwrap();

		assert_eq!(babbler.babble_seed("alice", &["The", "cat"]).unwrap(), "the cat sat down");
		assert!(matches!(
			babbler.babble_seed("alice", &["the", "sat"]),
			Err(BabblerError::NeverSaid(_))
		));
	}

	#[test]
	fn unknown_seed_was_never_said() {
		let mut babbler = seeded(3);
		babbler.learn("alice", "hello world").unwrap();
		assert!(matches!(babbler.babble_seed("alice", &["goodbye"]), Err(BabblerError::NeverSaid(_))));
	}

	#[test]
	fn fresh_speaker_has_no_utterances() {
		let mut babbler = seeded(3);
		babbler.get_or_create_speaker("bob").unwrap();
		assert!(matches!(babbler.babble("bob"), Err(BabblerError::NoUtterances(name)) if name == "bob"));
	}

	#[test]
	fn unknown_speaker_cannot_babble() {
		let mut babbler = seeded(3);
		assert!(matches!(babbler.babble("nobody"), Err(BabblerError::SpeakerNotFound(_))));
	}

	#[test]
	fn dead_end_reports_missing_arcs() {
		let mut babbler = seeded(3);
		let alice = babbler.get_or_create_speaker("alice").unwrap();
		let node = babbler.get_or_create_node_for(&alice, "stuck").unwrap();
		babbler.store.increment_root(node.id).unwrap();
		assert!(matches!(babbler.babble("alice"), Err(BabblerError::MissingArcs(id)) if id == node.id));
	}
}
