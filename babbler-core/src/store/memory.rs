use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BabblerError;
use crate::io::ensure_parent_dir;
use crate::model::{Arc, ArcId, GraphStore, Node, NodeId, Speaker, SpeakerId, Word, WordId};

/// In-memory graph store.
///
/// Records live in one `Vec` per kind; a record's id is its position + 1.
/// Lookup indexes are rebuilt from the vectors and never serialized.
///
/// When opened with a path, `flush` writes the whole arena to that path
/// with `postcard`, and `open` reloads it.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct MemoryStore {
	words: Vec<Word>,
	speakers: Vec<Speaker>,
	nodes: Vec<Node>,
	arcs: Vec<Arc>,

	#[serde(skip)]
	word_index: HashMap<String, WordId>,
	#[serde(skip)]
	speaker_index: HashMap<String, SpeakerId>,
	#[serde(skip)]
	node_index: HashMap<(SpeakerId, WordId), NodeId>,
	#[serde(skip)]
	arc_index: HashMap<(NodeId, NodeId), ArcId>,
	/// Outgoing arc ids per node, in insertion (ascending id) order.
	#[serde(skip)]
	arcs_from: HashMap<NodeId, Vec<ArcId>>,
	#[serde(skip)]
	snapshot_path: Option<PathBuf>,
}

impl MemoryStore {
	/// Returns an empty store that is never persisted.
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads the snapshot at `path` if it exists, otherwise starts empty.
	///
	/// Either way, later `flush` calls write back to `path`.
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BabblerError> {
		let path = path.as_ref();
		let mut store = if path.exists() {
			let bytes = std::fs::read(path)?;
			let mut store: MemoryStore = postcard::from_bytes(&bytes)?;
			store.reindex();
			debug!(path = %path.display(), nodes = store.nodes.len(), "loaded babbler snapshot");
			store
		} else {
			Self::default()
		};
		store.snapshot_path = Some(path.to_path_buf());
		Ok(store)
	}

	fn reindex(&mut self) {
		self.word_index = self.words.iter().map(|w| (w.text.clone(), w.id)).collect();
		self.speaker_index = self.speakers.iter().map(|s| (s.name.clone(), s.id)).collect();
		self.node_index = self.nodes.iter().map(|n| ((n.speaker_id, n.word_id), n.id)).collect();
		self.arc_index = self.arcs.iter().map(|a| ((a.from_node_id, a.to_node_id), a.id)).collect();
		self.arcs_from.clear();
		for arc in &self.arcs {
			self.arcs_from.entry(arc.from_node_id).or_default().push(arc.id);
		}
	}

	fn next_id(len: usize) -> i64 {
		len as i64 + 1
	}

	fn slot(id: i64) -> Option<usize> {
		usize::try_from(id.checked_sub(1)?).ok()
	}

	fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, BabblerError> {
		Self::slot(id)
			.and_then(|i| self.nodes.get_mut(i))
			.ok_or_else(|| BabblerError::Storage(format!("unknown node {id}")))
	}
}

impl GraphStore for MemoryStore {
	fn find_word(&self, text: &str) -> Result<Option<Word>, BabblerError> {
		Ok(self.word_index.get(text).and_then(|id| self.word_by_id(*id).ok().flatten()))
	}

	fn insert_word(&mut self, text: &str) -> Result<Word, BabblerError> {
		let word = Word { id: Self::next_id(self.words.len()), text: text.to_owned() };
		self.word_index.insert(word.text.clone(), word.id);
		self.words.push(word.clone());
		Ok(word)
	}

	fn word_by_id(&self, id: WordId) -> Result<Option<Word>, BabblerError> {
		Ok(Self::slot(id).and_then(|i| self.words.get(i)).cloned())
	}

	fn find_speaker(&self, name: &str) -> Result<Option<Speaker>, BabblerError> {
		Ok(self
			.speaker_index
			.get(name)
			.and_then(|id| Self::slot(*id))
			.and_then(|i| self.speakers.get(i))
			.cloned())
	}

	fn insert_speaker(&mut self, name: &str) -> Result<Speaker, BabblerError> {
		let speaker = Speaker { id: Self::next_id(self.speakers.len()), name: name.to_owned() };
		self.speaker_index.insert(speaker.name.clone(), speaker.id);
		self.speakers.push(speaker.clone());
		Ok(speaker)
	}

	fn list_speakers(&self) -> Result<Vec<Speaker>, BabblerError> {
		Ok(self.speakers.clone())
	}

	fn find_node(&self, speaker: SpeakerId, word: WordId) -> Result<Option<Node>, BabblerError> {
		Ok(self.node_index.get(&(speaker, word)).and_then(|id| self.node_by_id(*id).ok().flatten()))
	}

	fn insert_node(
		&mut self,
		speaker: SpeakerId,
		word: WordId,
		is_root: bool,
		root_frequency: u64,
	) -> Result<Node, BabblerError> {
		let node = Node {
			id: Self::next_id(self.nodes.len()),
			speaker_id: speaker,
			word_id: word,
			is_root,
			root_frequency,
		};
		self.node_index.insert((speaker, word), node.id);
		self.nodes.push(node.clone());
		Ok(node)
	}

	fn node_by_id(&self, id: NodeId) -> Result<Option<Node>, BabblerError> {
		Ok(Self::slot(id).and_then(|i| self.nodes.get(i)).cloned())
	}

	fn add_root_frequency(&mut self, node: NodeId, amount: u64, mark_root: bool) -> Result<Node, BabblerError> {
		let node = self.node_mut(node)?;
		node.root_frequency += amount;
		node.is_root |= mark_root;
		Ok(node.clone())
	}

	fn find_arc(&self, from: NodeId, to: NodeId) -> Result<Option<Arc>, BabblerError> {
		Ok(self
			.arc_index
			.get(&(from, to))
			.and_then(|id| Self::slot(*id))
			.and_then(|i| self.arcs.get(i))
			.cloned())
	}

	fn add_arc_frequency(&mut self, from: NodeId, to: NodeId, amount: u64) -> Result<Arc, BabblerError> {
		if let Some(slot) = self.arc_index.get(&(from, to)).and_then(|id| Self::slot(*id)) {
			if let Some(arc) = self.arcs.get_mut(slot) {
				arc.frequency += amount;
				return Ok(arc.clone());
			}
		}

		let arc = Arc {
			id: Self::next_id(self.arcs.len()),
			from_node_id: from,
			to_node_id: to,
			frequency: amount,
		};
		self.arc_index.insert((from, to), arc.id);
		self.arcs_from.entry(from).or_default().push(arc.id);
		self.arcs.push(arc.clone());
		Ok(arc)
	}

	fn list_root_nodes(&self, speaker: SpeakerId) -> Result<Vec<Node>, BabblerError> {
		Ok(self
			.nodes
			.iter()
			.filter(|n| n.speaker_id == speaker && n.is_root)
			.cloned()
			.collect())
	}

	fn list_nodes(&self, speaker: SpeakerId) -> Result<Vec<Node>, BabblerError> {
		Ok(self.nodes.iter().filter(|n| n.speaker_id == speaker).cloned().collect())
	}

	fn list_arcs_from(&self, node: NodeId) -> Result<Vec<Arc>, BabblerError> {
		Ok(self
			.arcs_from
			.get(&node)
			.map(|ids| {
				ids.iter()
					.filter_map(|id| Self::slot(*id).and_then(|i| self.arcs.get(i)))
					.cloned()
					.collect()
			})
			.unwrap_or_default())
	}

	fn flush(&mut self) -> Result<(), BabblerError> {
		let Some(path) = &self.snapshot_path else {
			return Ok(());
		};
		ensure_parent_dir(path)?;
		let bytes = postcard::to_stdvec(&*self)?;
		std::fs::write(path, &bytes)?;
		debug!(path = %path.display(), bytes = bytes.len(), "wrote babbler snapshot");
		Ok(())
	}
}
