//! Core types: the raw graph model and the reconstructed outputs.

pub mod node;
pub mod component;
pub mod edge;
pub mod document;
pub mod corpus;
pub mod update;

pub use node::{NodeId, QName, Annotation, Labels, Node, labels_from_annotations};
pub use component::{ComponentType, Component, ComponentFilter};
pub use edge::Edge;
pub use document::{
    DocumentGraph, DocNode, DocNodeId, NodeKind, Relation, RelationId, RelationKind,
    Layer, LayerId, TextualDs, TextId, TextualRelation, Timeline, TimelineRelation,
};
pub use corpus::{CorpusGraph, CorpusEntry, CorpusEntryId, CorpusEntryKind};
pub use update::{GraphUpdate, UpdateEvent};
