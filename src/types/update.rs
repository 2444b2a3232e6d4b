//! Atomic graph updates.
//!
//! A [`GraphUpdate`] is an ordered log of events addressed by node name. The
//! engine applies it as one transaction.

use serde::{Deserialize, Serialize};

/// One atomic change to a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UpdateEvent {
    /// Add a node.
    AddNode {
        /// Node name.
        node_name: String,
        /// Node type, e.g. `"node"` or `"corpus"`.
        node_type: String,
    },
    /// Delete a node with its labels and incident edges.
    DeleteNode {
        /// Node name.
        node_name: String,
    },
    /// Add or overwrite a node label.
    AddNodeLabel {
        /// Node name.
        node_name: String,
        /// Label namespace.
        anno_ns: String,
        /// Label name.
        anno_name: String,
        /// Label value.
        anno_value: String,
    },
    /// Delete a node label.
    DeleteNodeLabel {
        /// Node name.
        node_name: String,
        /// Label namespace.
        anno_ns: String,
        /// Label name.
        anno_name: String,
    },
    /// Add an edge.
    AddEdge {
        /// Source node name.
        source_node: String,
        /// Target node name.
        target_node: String,
        /// Component layer.
        layer: String,
        /// Component type name, e.g. `"Dominance"`.
        component_type: String,
        /// Component name.
        component_name: String,
    },
    /// Delete an edge with its labels.
    DeleteEdge {
        /// Source node name.
        source_node: String,
        /// Target node name.
        target_node: String,
        /// Component layer.
        layer: String,
        /// Component type name.
        component_type: String,
        /// Component name.
        component_name: String,
    },
    /// Add or overwrite an edge label.
    AddEdgeLabel {
        /// Source node name.
        source_node: String,
        /// Target node name.
        target_node: String,
        /// Component layer.
        layer: String,
        /// Component type name.
        component_type: String,
        /// Component name.
        component_name: String,
        /// Label namespace.
        anno_ns: String,
        /// Label name.
        anno_name: String,
        /// Label value.
        anno_value: String,
    },
    /// Delete an edge label.
    DeleteEdgeLabel {
        /// Source node name.
        source_node: String,
        /// Target node name.
        target_node: String,
        /// Component layer.
        layer: String,
        /// Component type name.
        component_type: String,
        /// Component name.
        component_name: String,
        /// Label namespace.
        anno_ns: String,
        /// Label name.
        anno_name: String,
    },
}

/// Ordered list of update events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphUpdate {
    events: Vec<UpdateEvent>,
}

impl GraphUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw event.
    pub fn push(&mut self, event: UpdateEvent) -> &mut Self {
        self.events.push(event);
        self
    }

    /// Add a node of type `"node"`.
    pub fn add_node(&mut self, node_name: &str) -> &mut Self {
        self.add_node_with_type(node_name, crate::NODE_TYPE_NODE)
    }

    /// Add a node of the given type.
    pub fn add_node_with_type(&mut self, node_name: &str, node_type: &str) -> &mut Self {
        self.push(UpdateEvent::AddNode {
            node_name: node_name.to_string(),
            node_type: node_type.to_string(),
        })
    }

    /// Delete a node.
    pub fn delete_node(&mut self, node_name: &str) -> &mut Self {
        self.push(UpdateEvent::DeleteNode {
            node_name: node_name.to_string(),
        })
    }

    /// Add a node label.
    pub fn add_node_label(&mut self, node_name: &str, ns: &str, name: &str, value: &str) -> &mut Self {
        self.push(UpdateEvent::AddNodeLabel {
            node_name: node_name.to_string(),
            anno_ns: ns.to_string(),
            anno_name: name.to_string(),
            anno_value: value.to_string(),
        })
    }

    /// Delete a node label.
    pub fn delete_node_label(&mut self, node_name: &str, ns: &str, name: &str) -> &mut Self {
        self.push(UpdateEvent::DeleteNodeLabel {
            node_name: node_name.to_string(),
            anno_ns: ns.to_string(),
            anno_name: name.to_string(),
        })
    }

    /// Add an edge.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        layer: &str,
        component_type: &str,
        component_name: &str,
    ) -> &mut Self {
        self.push(UpdateEvent::AddEdge {
            source_node: source.to_string(),
            target_node: target.to_string(),
            layer: layer.to_string(),
            component_type: component_type.to_string(),
            component_name: component_name.to_string(),
        })
    }

    /// Delete an edge.
    pub fn delete_edge(
        &mut self,
        source: &str,
        target: &str,
        layer: &str,
        component_type: &str,
        component_name: &str,
    ) -> &mut Self {
        self.push(UpdateEvent::DeleteEdge {
            source_node: source.to_string(),
            target_node: target.to_string(),
            layer: layer.to_string(),
            component_type: component_type.to_string(),
            component_name: component_name.to_string(),
        })
    }

    /// Add an edge label.
    #[allow(clippy::too_many_arguments)]
    pub fn add_edge_label(
        &mut self,
        source: &str,
        target: &str,
        layer: &str,
        component_type: &str,
        component_name: &str,
        ns: &str,
        name: &str,
        value: &str,
    ) -> &mut Self {
        self.push(UpdateEvent::AddEdgeLabel {
            source_node: source.to_string(),
            target_node: target.to_string(),
            layer: layer.to_string(),
            component_type: component_type.to_string(),
            component_name: component_name.to_string(),
            anno_ns: ns.to_string(),
            anno_name: name.to_string(),
            anno_value: value.to_string(),
        })
    }

    /// Delete an edge label.
    #[allow(clippy::too_many_arguments)]
    pub fn delete_edge_label(
        &mut self,
        source: &str,
        target: &str,
        layer: &str,
        component_type: &str,
        component_name: &str,
        ns: &str,
        name: &str,
    ) -> &mut Self {
        self.push(UpdateEvent::DeleteEdgeLabel {
            source_node: source.to_string(),
            target_node: target.to_string(),
            layer: layer.to_string(),
            component_type: component_type.to_string(),
            component_name: component_name.to_string(),
            anno_ns: ns.to_string(),
            anno_name: name.to_string(),
        })
    }

    /// The events in application order.
    pub fn events(&self) -> &[UpdateEvent] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the update has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
