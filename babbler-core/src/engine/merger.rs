use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::error::BabblerError;
use crate::model::NodeId;
use super::Babbler;
use super::vocabulary::boundary_word;

/// What a merge copied into the target speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeReport {
	/// Source nodes unioned into the target.
	pub nodes: usize,
	/// Source arcs replayed onto the target.
	pub arcs: usize,
	/// Total transition count replayed.
	pub transitions: u64,
}

impl Babbler {
	/// Unions the graph of `other_name` into the graph of `into_name`.
	///
	/// # Behavior
	/// - Ensures a boundary node `<name>` exists for both speakers; the source
	///   boundary node is folded onto the target's boundary word
	/// - Each source node is added to the target node for the same word
	///   (root frequencies summed, root flags OR-ed) or copied when missing
	/// - Each source arc is replayed between the mapped target nodes with
	///   its full frequency
	///
	/// The source speaker's rows are left untouched.
	///
	/// # Errors
	/// - `SelfMerge` if both names are the same
	/// - `SpeakerNotFound` if `other_name` is unknown (`into_name` is created on demand)
	pub fn merge(&mut self, into_name: &str, other_name: &str) -> Result<MergeReport, BabblerError> {
		if into_name == other_name {
			return Err(BabblerError::SelfMerge(into_name.to_owned()));
		}

		let other = self.get_speaker(other_name)?;
		let into = self.get_or_create_speaker(into_name)?;

		let into_boundary = self.get_or_create_node_for(&into, &boundary_word(&into.name))?;
		let other_boundary = self.get_or_create_node_for(&other, &boundary_word(&other.name))?;

		let mut report = MergeReport::default();
		let mut mapping: BTreeMap<NodeId, NodeId> = BTreeMap::new();

		for node in self.store.list_nodes(other.id)? {
			let word_id = if node.id == other_boundary.id { into_boundary.word_id } else { node.word_id };

			let merged = match self.store.find_node(into.id, word_id)? {
				Some(existing) => self.store.add_root_frequency(existing.id, node.root_frequency, node.is_root)?,
				None => self.store.insert_node(into.id, word_id, node.is_root, node.root_frequency)?,
			};
			mapping.insert(node.id, merged.id);
			report.nodes += 1;
		}

		for (old_id, new_id) in &mapping {
			for arc in self.store.list_arcs_from(*old_id)? {
				let Some(target) = mapping.get(&arc.to_node_id) else {
					warn!(arc = arc.id, to = arc.to_node_id, "arc leaves the source speaker, skipping");
					continue;
				};
				self.store.add_arc_frequency(*new_id, *target, arc.frequency)?;
				report.arcs += 1;
				report.transitions += arc.frequency;
			}
		}

		info!(
			into = %into.name,
			other = %other.name,
			nodes = report.nodes,
			arcs = report.arcs,
			"merged babblers"
		);
		Ok(report)
	}
}
