//! Data model of the babbler word graph.
//!
//! The graph is an arena of flat records addressed by integer ids:
//! - `Speaker` and `Word` are interned by name / folded text
//! - `Node` binds a word to a speaker, optionally as a sentence root
//! - `Arc` is an observed transition between two nodes of one speaker
//!
//! Records never hold references to each other, only ids, so the cyclic
//! graph has no ownership cycles. Backends implement `GraphStore`.

/// Plain record types (`Speaker`, `Word`, `Node`, `Arc`).
pub mod records;

/// Storage contract shared by every backend.
pub mod graph_store;

pub use graph_store::GraphStore;
pub use records::{Arc, ArcId, Node, NodeId, Speaker, SpeakerId, Word, WordId};
