//! Raw graph backends.
//!
//! [`RawGraph`] is the seam to the external graph engine: a materialized,
//! immutable property graph produced by a query, a context expansion or a
//! corpus lookup. The reconstruction never mutates it.

pub mod memory;

use crate::errors::EngineError;
use crate::types::{Annotation, Component, ComponentType, NodeId};

/// Read access to a raw multi-component property graph.
///
/// All calls are synchronous and may fail with an engine error, which is
/// fatal for the reconstruction in progress. Lookups of unknown node ids are
/// not failures: they return no annotations.
pub trait RawGraph {
    /// Enumerate the ids of all nodes with the given type.
    ///
    /// The iterator borrows the graph; dropping it releases whatever the
    /// backend holds for the enumeration.
    fn nodes_by_type<'a>(
        &'a self,
        node_type: &str,
    ) -> Result<Box<dyn Iterator<Item = NodeId> + 'a>, EngineError>;

    /// Enumerate components, optionally restricted to one type.
    fn components(&self, ctype: Option<ComponentType>) -> Result<Vec<Component>, EngineError>;

    /// Targets of all edges of `component` starting at `node`, in native order.
    fn outgoing_edges(&self, node: NodeId, component: &Component) -> Result<Vec<NodeId>, EngineError>;

    /// All annotations of a node, including the reserved `annis` ones.
    fn node_annotations(&self, node: NodeId) -> Result<Vec<Annotation>, EngineError>;

    /// All annotations of the edge (source, target) in `component`.
    fn edge_annotations(
        &self,
        source: NodeId,
        target: NodeId,
        component: &Component,
    ) -> Result<Vec<Annotation>, EngineError>;
}

pub use memory::MemoryGraph;
