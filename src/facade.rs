//! Graph facade over a raw graph.
//!
//! Turns the engine's id-based calls into [`Node`] and [`Edge`] values. The
//! facade only borrows the raw graph for the duration of one reconstruction;
//! every engine-side buffer it obtains is owned by a value that is dropped
//! before the call returns, on success and error paths alike.

use crate::errors::EngineError;
use crate::store::RawGraph;
use crate::types::{
    labels_from_annotations, Component, ComponentFilter, ComponentType, Edge, Labels, Node, NodeId,
    QName,
};

/// Read-only view of a raw graph.
pub struct GraphFacade<'g, G: RawGraph + ?Sized> {
    graph: &'g G,
}

impl<'g, G: RawGraph + ?Sized> Clone for GraphFacade<'g, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'g, G: RawGraph + ?Sized> Copy for GraphFacade<'g, G> {}

impl<'g, G: RawGraph + ?Sized> GraphFacade<'g, G> {
    /// Wrap a raw graph.
    pub fn new(graph: &'g G) -> Self {
        Self { graph }
    }

    /// Lazily enumerate all nodes of a type.
    ///
    /// Each call starts a fresh, independent pass. Ids that do not resolve
    /// to a node are skipped.
    pub fn nodes_by_type(&self, node_type: &str) -> Result<NodesByType<'g, G>, EngineError> {
        Ok(NodesByType {
            facade: *self,
            ids: self.graph.nodes_by_type(node_type)?,
        })
    }

    /// Resolve a node id. `Ok(None)` means "no such node".
    pub fn node(&self, id: NodeId) -> Result<Option<Node>, EngineError> {
        let labels = labels_from_annotations(self.graph.node_annotations(id)?);
        Ok(Node::from_labels(id, labels))
    }

    /// All labels of a node, reserved ones included.
    ///
    /// `Ok(None)` means "no such node", distinct from a node without
    /// user annotations. As with [`GraphFacade::node`], an id without
    /// `annis::node_name` is not a node.
    pub fn annotations_for_node(&self, id: NodeId) -> Result<Option<Labels>, EngineError> {
        let labels = labels_from_annotations(self.graph.node_annotations(id)?);
        if !labels.contains_key(&QName::node_name()) {
            return Ok(None);
        }
        Ok(Some(labels))
    }

    /// All labels of an edge. Missing edges simply have no labels.
    pub fn annotations_for_edge(
        &self,
        source: NodeId,
        target: NodeId,
        component: &Component,
    ) -> Result<Labels, EngineError> {
        Ok(labels_from_annotations(
            self.graph.edge_annotations(source, target, component)?,
        ))
    }

    /// Components selected by a filter.
    pub fn components(&self, filter: &ComponentFilter) -> Result<Vec<Component>, EngineError> {
        match filter {
            ComponentFilter::All => self.graph.components(None),
            ComponentFilter::Type(ctype) => self.graph.components(Some(*ctype)),
            ComponentFilter::Exact(c) => Ok(vec![c.clone()]),
        }
    }

    /// All outgoing edges of a node in the selected components.
    ///
    /// No ordering guarantee across components; inside one component the
    /// raw graph's native order is kept.
    pub fn outgoing_edges(
        &self,
        node: NodeId,
        filter: impl Into<ComponentFilter>,
    ) -> Result<Vec<Edge>, EngineError> {
        let mut result = Vec::new();
        for component in self.components(&filter.into())? {
            for target in self.graph.outgoing_edges(node, &component)? {
                let labels = self.annotations_for_edge(node, target, &component)?;
                result.push(Edge::new(node, target, component.clone(), labels));
            }
        }
        Ok(result)
    }

    /// Whether a node has at least one outgoing edge of the given type.
    pub fn has_outgoing(&self, node: NodeId, ctype: ComponentType) -> Result<bool, EngineError> {
        for component in self.graph.components(Some(ctype))? {
            if !self.graph.outgoing_edges(node, &component)?.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Lazy sequence of nodes of one type.
pub struct NodesByType<'g, G: RawGraph + ?Sized> {
    facade: GraphFacade<'g, G>,
    ids: Box<dyn Iterator<Item = NodeId> + 'g>,
}

impl<'g, G: RawGraph + ?Sized> Iterator for NodesByType<'g, G> {
    type Item = Result<Node, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        for id in self.ids.by_ref() {
            match self.facade.node(id) {
                Ok(Some(node)) => return Some(Ok(node)),
                Ok(None) => {
                    tracing::trace!(node = %id, "skipping id without node name");
                }
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryGraph;
    use crate::types::Annotation;

    /// Backend where id 1 carries labels but no node name.
    struct NamelessGraph;

    impl RawGraph for NamelessGraph {
        fn nodes_by_type<'a>(
            &'a self,
            _node_type: &str,
        ) -> Result<Box<dyn Iterator<Item = NodeId> + 'a>, EngineError> {
            Ok(Box::new(std::iter::once(NodeId::new(1))))
        }

        fn components(&self, _ctype: Option<ComponentType>) -> Result<Vec<Component>, EngineError> {
            Ok(Vec::new())
        }

        fn outgoing_edges(&self, _node: NodeId, _component: &Component) -> Result<Vec<NodeId>, EngineError> {
            Ok(Vec::new())
        }

        fn node_annotations(&self, node: NodeId) -> Result<Vec<Annotation>, EngineError> {
            if node != NodeId::new(1) {
                return Ok(Vec::new());
            }
            Ok(vec![
                Annotation::new("annis", "node_type", "node"),
                Annotation::new("", "pos", "NN"),
            ])
        }

        fn edge_annotations(
            &self,
            _source: NodeId,
            _target: NodeId,
            _component: &Component,
        ) -> Result<Vec<Annotation>, EngineError> {
            Ok(Vec::new())
        }
    }

    fn sample() -> (MemoryGraph, NodeId, NodeId, NodeId) {
        let mut g = MemoryGraph::new();
        let span = g.add_node("doc#span1", "node");
        let t1 = g.add_node("doc#t1", "node");
        let t2 = g.add_node("doc#t2", "node");
        g.add_node_label(t1, QName::tok(), "Hello");
        g.add_node_label(t2, QName::tok(), "world");

        let cov = Component::new(ComponentType::Coverage, "annis", "");
        g.add_edge(span, t1, cov.clone());
        g.add_edge(span, t2, cov.clone());
        g.add_edge_label(span, t2, &cov, QName::new("", "weight"), "2");

        let ord = Component::new(ComponentType::Ordering, "annis", "");
        g.add_edge(t1, t2, ord);
        (g, span, t1, t2)
    }

    #[test]
    fn test_nodes_by_type_is_restartable() {
        let (g, ..) = sample();
        let facade = GraphFacade::new(&g);

        let first: Vec<_> = facade.nodes_by_type("node").unwrap().collect::<Result<_, _>>().unwrap();
        let second: Vec<_> = facade.nodes_by_type("node").unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(facade.nodes_by_type("corpus").unwrap().count(), 0);
    }

    #[test]
    fn test_outgoing_edges_filters() {
        let (g, span, t1, t2) = sample();
        let facade = GraphFacade::new(&g);

        let all = facade.outgoing_edges(span, ComponentFilter::All).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].target, t1);
        assert_eq!(all[1].target, t2);
        assert_eq!(all[1].labels.get(&QName::new("", "weight")).map(String::as_str), Some("2"));

        let dom = facade.outgoing_edges(span, ComponentType::Dominance).unwrap();
        assert!(dom.is_empty());

        let exact = facade
            .outgoing_edges(t1, Component::new(ComponentType::Ordering, "annis", ""))
            .unwrap();
        assert_eq!(exact.len(), 1);
    }

    #[test]
    fn test_missing_node_is_absent() {
        let (g, _, t1, _) = sample();
        let facade = GraphFacade::new(&g);

        assert!(facade.node(NodeId::new(999)).unwrap().is_none());
        assert!(facade.annotations_for_node(NodeId::new(999)).unwrap().is_none());

        // A real node without user annotations is still found
        let labels = facade.annotations_for_node(t1).unwrap().unwrap();
        assert!(labels.contains_key(&QName::node_name()));
    }

    #[test]
    fn test_labels_without_name_are_not_a_node() {
        let facade = GraphFacade::new(&NamelessGraph);
        let id = NodeId::new(1);

        assert!(facade.node(id).unwrap().is_none());
        assert!(facade.annotations_for_node(id).unwrap().is_none());
        assert_eq!(facade.nodes_by_type("node").unwrap().count(), 0);
    }

    #[test]
    fn test_has_outgoing() {
        let (g, span, t1, t2) = sample();
        let facade = GraphFacade::new(&g);

        assert!(facade.has_outgoing(span, ComponentType::Coverage).unwrap());
        assert!(!facade.has_outgoing(t1, ComponentType::Coverage).unwrap());
        assert!(!facade.has_outgoing(t2, ComponentType::Ordering).unwrap());
    }
}
