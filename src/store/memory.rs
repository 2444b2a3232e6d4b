//! In-memory raw graph.

use std::collections::{BTreeMap, BTreeSet};

use super::RawGraph;
use crate::errors::{EngineError, EngineErrorKind};
use crate::types::{
    Annotation, Component, ComponentType, GraphUpdate, Labels, NodeId, QName, UpdateEvent,
};

/// In-memory raw graph for testing and file-based export.
///
/// Uses BTreeMap/BTreeSet for deterministic iteration order. Outgoing edges
/// of one node inside one component keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    next_id: u64,
    /// Node labels, including `annis::node_name` and `annis::node_type`.
    node_labels: BTreeMap<NodeId, Labels>,
    /// Node name -> id.
    node_ids: BTreeMap<String, NodeId>,
    /// All components that ever received an edge.
    components: BTreeSet<Component>,
    /// Component -> source -> targets.
    edges: BTreeMap<Component, BTreeMap<NodeId, Vec<NodeId>>>,
    /// Edge labels keyed by (component, source, target).
    edge_labels: BTreeMap<(Component, NodeId, NodeId), Labels>,
}

impl MemoryGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, or return the id of the existing node with this name.
    pub fn add_node(&mut self, name: &str, node_type: &str) -> NodeId {
        if let Some(id) = self.node_ids.get(name) {
            return *id;
        }
        let id = NodeId::new(self.next_id);
        self.next_id += 1;

        let mut labels = Labels::new();
        labels.insert(QName::node_name(), name.to_string());
        labels.insert(QName::node_type(), node_type.to_string());
        self.node_labels.insert(id, labels);
        self.node_ids.insert(name.to_string(), id);
        id
    }

    /// Add or overwrite a node label. Unknown ids are ignored.
    pub fn add_node_label(&mut self, node: NodeId, key: QName, value: impl Into<String>) {
        if let Some(labels) = self.node_labels.get_mut(&node) {
            labels.insert(key, value.into());
        }
    }

    /// Add an edge. Adding the same edge twice is a no-op.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, component: Component) {
        let targets = self
            .edges
            .entry(component.clone())
            .or_default()
            .entry(source)
            .or_default();
        if !targets.contains(&target) {
            targets.push(target);
        }
        self.components.insert(component);
    }

    /// Add or overwrite an edge label. The edge must exist.
    pub fn add_edge_label(
        &mut self,
        source: NodeId,
        target: NodeId,
        component: &Component,
        key: QName,
        value: impl Into<String>,
    ) -> bool {
        if !self.has_edge(source, target, component) {
            return false;
        }
        self.edge_labels
            .entry((component.clone(), source, target))
            .or_default()
            .insert(key, value.into());
        true
    }

    /// Delete a node together with its labels and incident edges.
    pub fn delete_node(&mut self, node: NodeId) -> bool {
        let Some(labels) = self.node_labels.remove(&node) else {
            return false;
        };
        if let Some(name) = labels.get(&QName::node_name()) {
            self.node_ids.remove(name);
        }
        for by_source in self.edges.values_mut() {
            by_source.remove(&node);
            for targets in by_source.values_mut() {
                targets.retain(|t| *t != node);
            }
        }
        self.edge_labels
            .retain(|(_, s, t), _| *s != node && *t != node);
        true
    }

    /// Delete an edge and its labels.
    pub fn delete_edge(&mut self, source: NodeId, target: NodeId, component: &Component) -> bool {
        let removed = match self.edges.get_mut(component).and_then(|m| m.get_mut(&source)) {
            Some(targets) => {
                let before = targets.len();
                targets.retain(|t| *t != target);
                before != targets.len()
            }
            None => false,
        };
        self.edge_labels
            .remove(&(component.clone(), source, target));
        removed
    }

    /// Whether the edge exists.
    pub fn has_edge(&self, source: NodeId, target: NodeId, component: &Component) -> bool {
        self.edges
            .get(component)
            .and_then(|m| m.get(&source))
            .map(|targets| targets.contains(&target))
            .unwrap_or(false)
    }

    /// Look up a node id by name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.node_ids.get(name).copied()
    }

    /// Get number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.node_labels.len()
    }

    /// Get number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges
            .values()
            .flat_map(|m| m.values())
            .map(Vec::len)
            .sum()
    }

    /// Apply a graph update as one transaction.
    ///
    /// Events run against a scratch copy; the graph only changes if every
    /// event succeeds.
    pub fn apply_update(&mut self, update: &GraphUpdate) -> Result<(), EngineError> {
        let mut scratch = self.clone();
        for (idx, event) in update.events().iter().enumerate() {
            scratch.apply_event(event).map_err(|msg| {
                EngineError::new(
                    EngineErrorKind::ImpossibleGraphUpdate,
                    format!("event {}: {}", idx, msg),
                )
            })?;
        }
        tracing::debug!(
            events = update.len(),
            nodes = scratch.num_nodes(),
            edges = scratch.num_edges(),
            "applied graph update"
        );
        *self = scratch;
        Ok(())
    }

    fn apply_event(&mut self, event: &UpdateEvent) -> Result<(), String> {
        match event {
            UpdateEvent::AddNode {
                node_name,
                node_type,
            } => {
                self.add_node(node_name, node_type);
            }
            UpdateEvent::DeleteNode { node_name } => {
                let id = self.require_node(node_name)?;
                self.delete_node(id);
            }
            UpdateEvent::AddNodeLabel {
                node_name,
                anno_ns,
                anno_name,
                anno_value,
            } => {
                let id = self.require_node(node_name)?;
                let key = QName::new(anno_ns.as_str(), anno_name.as_str());
                self.add_node_label(id, key, anno_value.as_str());
            }
            UpdateEvent::DeleteNodeLabel {
                node_name,
                anno_ns,
                anno_name,
            } => {
                let id = self.require_node(node_name)?;
                let key = QName::new(anno_ns.as_str(), anno_name.as_str());
                if key == QName::node_name() {
                    return Err(format!("cannot delete the name of node '{}'", node_name));
                }
                if let Some(labels) = self.node_labels.get_mut(&id) {
                    labels.remove(&key);
                }
            }
            UpdateEvent::AddEdge {
                source_node,
                target_node,
                layer,
                component_type,
                component_name,
            } => {
                let (s, t, c) = self.resolve_edge(
                    source_node,
                    target_node,
                    layer,
                    component_type,
                    component_name,
                )?;
                self.add_edge(s, t, c);
            }
            UpdateEvent::DeleteEdge {
                source_node,
                target_node,
                layer,
                component_type,
                component_name,
            } => {
                let (s, t, c) = self.resolve_edge(
                    source_node,
                    target_node,
                    layer,
                    component_type,
                    component_name,
                )?;
                self.delete_edge(s, t, &c);
            }
            UpdateEvent::AddEdgeLabel {
                source_node,
                target_node,
                layer,
                component_type,
                component_name,
                anno_ns,
                anno_name,
                anno_value,
            } => {
                let (s, t, c) = self.resolve_edge(
                    source_node,
                    target_node,
                    layer,
                    component_type,
                    component_name,
                )?;
                let key = QName::new(anno_ns.as_str(), anno_name.as_str());
                if !self.add_edge_label(s, t, &c, key, anno_value.as_str()) {
                    return Err(format!(
                        "no edge {} -> {} in component {}",
                        source_node, target_node, c
                    ));
                }
            }
            UpdateEvent::DeleteEdgeLabel {
                source_node,
                target_node,
                layer,
                component_type,
                component_name,
                anno_ns,
                anno_name,
            } => {
                let (s, t, c) = self.resolve_edge(
                    source_node,
                    target_node,
                    layer,
                    component_type,
                    component_name,
                )?;
                let key = QName::new(anno_ns.as_str(), anno_name.as_str());
                if let Some(labels) = self.edge_labels.get_mut(&(c, s, t)) {
                    labels.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn require_node(&self, name: &str) -> Result<NodeId, String> {
        self.node_id(name)
            .ok_or_else(|| format!("node '{}' does not exist", name))
    }

    fn resolve_edge(
        &self,
        source: &str,
        target: &str,
        layer: &str,
        component_type: &str,
        component_name: &str,
    ) -> Result<(NodeId, NodeId, Component), String> {
        let ctype = ComponentType::from_str(component_type)
            .ok_or_else(|| format!("unknown component type '{}'", component_type))?;
        Ok((
            self.require_node(source)?,
            self.require_node(target)?,
            Component::new(ctype, layer, component_name),
        ))
    }
}

fn to_annotations(labels: Option<&Labels>) -> Vec<Annotation> {
    labels
        .map(|l| {
            l.iter()
                .map(|(k, v)| Annotation {
                    key: k.clone(),
                    value: v.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

impl RawGraph for MemoryGraph {
    fn nodes_by_type<'a>(
        &'a self,
        node_type: &str,
    ) -> Result<Box<dyn Iterator<Item = NodeId> + 'a>, EngineError> {
        let node_type = node_type.to_string();
        let type_key = QName::node_type();
        Ok(Box::new(self.node_labels.iter().filter_map(move |(id, labels)| {
            let t = labels
                .get(&type_key)
                .map(String::as_str)
                .unwrap_or(crate::NODE_TYPE_NODE);
            (t == node_type).then_some(*id)
        })))
    }

    fn components(&self, ctype: Option<ComponentType>) -> Result<Vec<Component>, EngineError> {
        Ok(self
            .components
            .iter()
            .filter(|c| ctype.map_or(true, |t| c.ctype == t))
            .cloned()
            .collect())
    }

    fn outgoing_edges(&self, node: NodeId, component: &Component) -> Result<Vec<NodeId>, EngineError> {
        Ok(self
            .edges
            .get(component)
            .and_then(|m| m.get(&node))
            .cloned()
            .unwrap_or_default())
    }

    fn node_annotations(&self, node: NodeId) -> Result<Vec<Annotation>, EngineError> {
        Ok(to_annotations(self.node_labels.get(&node)))
    }

    fn edge_annotations(
        &self,
        source: NodeId,
        target: NodeId,
        component: &Component,
    ) -> Result<Vec<Annotation>, EngineError> {
        Ok(to_annotations(
            self.edge_labels.get(&(component.clone(), source, target)),
        ))
    }
}
