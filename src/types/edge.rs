//! Edge type for the raw graph.

use serde::{Deserialize, Serialize};
use super::component::{Component, ComponentType};
use super::node::{Labels, NodeId};

/// Directed edge of the raw graph.
///
/// Multiple edges between the same ordered pair are only allowed across
/// distinct components, so (source, target, component) identifies an edge.
/// Implements `Ord` for deterministic ordering: (source, target, component).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Source node.
    pub source: NodeId,
    /// Target node.
    pub target: NodeId,
    /// Owning component.
    pub component: Component,
    /// Edge labels.
    pub labels: Labels,
}

impl Edge {
    /// Create a new edge.
    pub fn new(source: NodeId, target: NodeId, component: Component, labels: Labels) -> Self {
        Self {
            source,
            target,
            component,
            labels,
        }
    }

    /// Type of the owning component.
    pub fn ctype(&self) -> ComponentType {
        self.component.ctype
    }

    /// The relation type string, i.e. the component name.
    pub fn type_name(&self) -> &str {
        &self.component.name
    }

    /// Whether source and target coincide.
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.component == other.component
    }
}

impl Eq for Edge {}

// Canonical ordering: source, then target, then component
impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.source
            .cmp(&other.source)
            .then_with(|| self.target.cmp(&other.target))
            .then_with(|| self.component.cmp(&other.component))
    }
}
