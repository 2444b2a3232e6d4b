//! # annis-export
//!
//! Reconstructs annotation models from a raw multi-component property graph.
//!
//! The exporter answers two questions about one raw graph snapshot:
//!
//! > Which document annotation graph do the nodes and edges describe?
//! > Which corpus tree do the corpus nodes describe?
//!
//! ## Core Contract
//!
//! 1. Classify every node as token, span or structure
//! 2. Map edges to typed relations, dropping redundant and out-of-context ones
//! 3. Rebuild primary texts from ordering chains and align segmentations on a timeline
//! 4. Build the corpus tree from PartOfSubcorpus parent links
//!
//! ## Architecture
//!
//! ```text
//! RawGraph → GraphFacade → DocumentExporter → text reconstruction → DocumentGraph
//!                 ↓
//!           CorpusExporter → CorpusGraph
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same raw graph + same config → identical fingerprint
//! - Label maps are ordered by (namespace, name)
//! - Ordering roots are walked by ascending node id

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod store;
pub mod facade;
pub mod export;
pub mod errors;
pub mod config;
pub mod canonical;

/// Reserved annotation namespace for structural control labels.
pub const ANNIS_NS: &str = "annis";

/// Node type of document-level nodes.
pub const NODE_TYPE_NODE: &str = "node";

/// Node type of corpus, sub-corpus and document nodes.
pub const NODE_TYPE_CORPUS: &str = "corpus";

/// Default prefix of exported node ids.
pub const DEFAULT_ID_PREFIX: &str = "salt:/";

// Re-exports
pub use types::{
    Annotation, Component, ComponentFilter, ComponentType, CorpusEntry, CorpusEntryId,
    CorpusEntryKind, CorpusGraph, DocNode, DocNodeId, DocumentGraph, Edge, GraphUpdate, Labels,
    Node, NodeId, NodeKind, QName, Relation, RelationKind, UpdateEvent,
};
pub use store::{MemoryGraph, RawGraph};
pub use facade::GraphFacade;
pub use export::{
    classify, map_corpus_graph, map_document_graph, CorpusExporter, DocumentExporter,
};
pub use errors::{EngineError, EngineErrorKind, ExportError};
pub use config::{ExportConfig, TimelineMode};
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes};
