//! Document reconstruction.
//!
//! Turns the nodes of type `"node"` of a raw graph into a [`DocumentGraph`]:
//! nodes are classified, edges become typed relations, layers are collected
//! and finally the texts and timeline are rebuilt by [`text`].
//!
//! ## Classification
//!
//! - **Token**: carries `annis::tok` and has no outgoing Coverage edge
//! - **Structure**: otherwise, has an outgoing Dominance edge
//! - **Span**: everything else
//!
//! ## Edge mapping
//!
//! | Component | Relation | Condition |
//! |---|---|---|
//! | Dominance | Dominance | untyped edges are dropped when a typed twin exists |
//! | Pointing | Pointing | always |
//! | Ordering | Order | always |
//! | Coverage | Spanning | only Span to Token |
//!
//! Self-loops and edges leaving the projected node set are never mapped.

pub mod corpus;
pub mod text;

pub use crate::errors::ExportError;
pub use corpus::{map_corpus_graph, CorpusExporter};
pub use text::{assemble_text, OrderIndex, PrimaryText};

use crate::config::ExportConfig;
use crate::errors::EngineError;
use crate::facade::GraphFacade;
use crate::store::RawGraph;
use crate::types::{
    ComponentFilter, ComponentType, DocNode, DocNodeId, DocumentGraph, Edge, Labels, Node,
    NodeKind, QName, Relation, RelationKind,
};
use crate::NODE_TYPE_NODE;

/// Exports the document graph of one raw graph.
///
/// Each call to [`export`](Self::export) is an independent, single pass over
/// the raw graph; no state is kept between calls.
pub struct DocumentExporter<'g, G: RawGraph + ?Sized> {
    facade: GraphFacade<'g, G>,
    config: ExportConfig,
}

impl<'g, G: RawGraph + ?Sized> DocumentExporter<'g, G> {
    /// Create an exporter over a raw graph.
    pub fn new(graph: &'g G, config: ExportConfig) -> Self {
        Self {
            facade: GraphFacade::new(graph),
            config,
        }
    }

    /// The export configuration.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Reconstruct the document graph.
    ///
    /// Any failure of the raw graph aborts the export; no partial graph is
    /// returned.
    pub fn export(&self) -> Result<DocumentGraph, ExportError> {
        let span = tracing::info_span!("export_document", config = %self.config.config_hash());
        let _enter = span.enter();

        let mut doc = DocumentGraph::new();

        for node in self.facade.nodes_by_type(NODE_TYPE_NODE)? {
            let node = node?;
            let kind = classify(&self.facade, &node)?;
            self.add_node(&mut doc, node, kind);
        }

        let sources: Vec<_> = doc.nodes.iter().map(|n| n.source).collect();
        for source in sources {
            let edges = self.facade.outgoing_edges(source, ComponentFilter::All)?;
            for edge in &edges {
                self.add_relation(&mut doc, edge, &edges);
            }
        }

        text::reconstruct_texts(&self.facade, &mut doc, &self.config)?;

        tracing::info!(
            nodes = doc.nodes.len(),
            relations = doc.relations.len(),
            texts = doc.texts.len(),
            layers = doc.layers.len(),
            timeline = doc.timeline.map(|t| t.points).unwrap_or(0),
            "document exported"
        );
        Ok(doc)
    }

    fn add_node(&self, doc: &mut DocumentGraph, node: Node, kind: NodeKind) {
        let (annotations, features) = partition_labels(node.labels);
        let layer = features
            .get(&QName::layer())
            .filter(|l| !l.is_empty())
            .cloned();

        let id = doc.add_node(DocNode {
            id: node_id(&node.name, &self.config.id_prefix),
            name: short_name(&node.name).to_string(),
            kind,
            source: node.id,
            annotations,
            features,
        });

        if let Some(layer) = layer {
            let layer_id = doc.layer_or_insert(&layer);
            doc.layer_mut(layer_id).nodes.push(id);
        }
    }

    fn add_relation(&self, doc: &mut DocumentGraph, edge: &Edge, siblings: &[Edge]) {
        if edge.is_self_loop() {
            tracing::trace!(node = %edge.source, component = %edge.component, "skipping self-loop");
            return;
        }
        let (Some(source), Some(target)) = (
            doc.node_by_source(edge.source),
            doc.node_by_source(edge.target),
        ) else {
            tracing::debug!(
                source = %edge.source,
                target = %edge.target,
                component = %edge.component,
                "dropping edge outside the projected node set"
            );
            return;
        };

        let Some(kind) = relation_kind(doc, edge, source, target, siblings) else {
            return;
        };

        let (annotations, features) = partition_labels(edge.labels.clone());
        let layer = edge
            .component
            .layer_name()
            .map(|name| doc.layer_or_insert(name));

        let rel_id = doc.add_relation(Relation {
            kind,
            source,
            target,
            rel_type: edge.type_name().to_string(),
            annotations,
            features,
            layer,
        });
        if let Some(layer) = layer {
            doc.layer_mut(layer).relations.push(rel_id);
        }
    }
}

/// Export the document graph of a raw graph.
pub fn map_document_graph<G: RawGraph + ?Sized>(
    graph: &G,
    config: &ExportConfig,
) -> Result<DocumentGraph, ExportError> {
    DocumentExporter::new(graph, config.clone()).export()
}

/// Classify a node as Token, Structure or Span.
pub fn classify<G: RawGraph + ?Sized>(
    facade: &GraphFacade<'_, G>,
    node: &Node,
) -> Result<NodeKind, EngineError> {
    if node.token_value().is_some() && !facade.has_outgoing(node.id, ComponentType::Coverage)? {
        return Ok(NodeKind::Token);
    }
    if facade.has_outgoing(node.id, ComponentType::Dominance)? {
        return Ok(NodeKind::Structure);
    }
    Ok(NodeKind::Span)
}

// Decide how an edge between two projected nodes is mapped, if at all.
fn relation_kind(
    doc: &DocumentGraph,
    edge: &Edge,
    source: DocNodeId,
    target: DocNodeId,
    siblings: &[Edge],
) -> Option<RelationKind> {
    match edge.ctype() {
        ComponentType::Dominance => {
            if edge.type_name().is_empty() && has_typed_twin(edge, siblings) {
                tracing::trace!(
                    source = %edge.source,
                    target = %edge.target,
                    "suppressing untyped dominance edge"
                );
                return None;
            }
            Some(RelationKind::Dominance)
        }
        ComponentType::Pointing => Some(RelationKind::Pointing),
        ComponentType::Ordering => Some(RelationKind::Order),
        ComponentType::Coverage => {
            let spans_token = doc.node(source).kind == NodeKind::Span
                && doc.node(target).kind == NodeKind::Token;
            spans_token.then_some(RelationKind::Spanning)
        }
        ComponentType::LeftToken | ComponentType::RightToken | ComponentType::PartOfSubcorpus => {
            None
        }
    }
}

// A different dominance edge with a non-empty type between the same pair.
fn has_typed_twin(edge: &Edge, siblings: &[Edge]) -> bool {
    siblings.iter().any(|other| {
        other.ctype() == ComponentType::Dominance
            && other.source == edge.source
            && other.target == edge.target
            && !other.type_name().is_empty()
            && other != edge
    })
}

/// Split labels into user annotations and reserved `annis` features.
pub fn partition_labels(labels: Labels) -> (Labels, Labels) {
    labels.into_iter().partition(|(key, _)| !key.is_annis())
}

/// Exported id of a node: its name with `prefix` ensured in front.
pub fn node_id(name: &str, prefix: &str) -> String {
    if name.starts_with(prefix) {
        name.to_string()
    } else {
        format!("{}{}", prefix, name)
    }
}

/// Short name of a node: the fragment after `#`, else the last path segment.
pub fn short_name(name: &str) -> &str {
    match name.rsplit_once('#') {
        Some((_, fragment)) => fragment,
        None => last_segment(name),
    }
}

/// Last `/`-separated segment of a path-like name.
pub fn last_segment(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryGraph;
    use crate::types::Component;

    #[test]
    fn test_node_id_prefix() {
        assert_eq!(node_id("pcc2/4282#tok_1", "salt:/"), "salt:/pcc2/4282#tok_1");
        assert_eq!(node_id("salt:/pcc2/4282#tok_1", "salt:/"), "salt:/pcc2/4282#tok_1");
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("pcc2/4282#tok_1"), "tok_1");
        assert_eq!(short_name("pcc2/4282"), "4282");
        assert_eq!(short_name("pcc2"), "pcc2");
    }

    #[test]
    fn test_partition_labels() {
        let mut labels = Labels::new();
        labels.insert(QName::tok(), "storm".to_string());
        labels.insert(QName::layer(), "syntax".to_string());
        labels.insert(QName::new("", "pos"), "NN".to_string());
        labels.insert(QName::new("tiger", "lemma"), "storm".to_string());

        let (annos, features) = partition_labels(labels);
        assert_eq!(annos.len(), 2);
        assert_eq!(features.len(), 2);
        assert!(features.contains_key(&QName::tok()));
        assert!(annos.contains_key(&QName::new("tiger", "lemma")));
    }

    #[test]
    fn test_classify() {
        let mut g = MemoryGraph::new();
        let tok = g.add_node("doc#t1", "node");
        g.add_node_label(tok, QName::tok(), "storm");
        let covering_tok = g.add_node("doc#t2", "node");
        g.add_node_label(covering_tok, QName::tok(), "Category 3");
        let span = g.add_node("doc#s1", "node");
        let cat = g.add_node("doc#np", "node");

        g.add_edge(covering_tok, tok, Component::new(ComponentType::Coverage, "", ""));
        g.add_edge(span, tok, Component::new(ComponentType::Coverage, "", ""));
        g.add_edge(cat, span, Component::new(ComponentType::Dominance, "tiger", ""));
        // A token with dominance edges stays a token
        g.add_edge(tok, span, Component::new(ComponentType::Dominance, "tiger", "edge"));

        let facade = GraphFacade::new(&g);
        let kind = |id| classify(&facade, &facade.node(id).unwrap().unwrap()).unwrap();
        assert_eq!(kind(tok), NodeKind::Token);
        assert_eq!(kind(covering_tok), NodeKind::Span);
        assert_eq!(kind(span), NodeKind::Span);
        assert_eq!(kind(cat), NodeKind::Structure);
    }

    #[test]
    fn test_typed_twin_in_other_component() {
        let untyped = Edge::new(
            1.into(),
            2.into(),
            Component::new(ComponentType::Dominance, "tiger", ""),
            Labels::new(),
        );
        let typed = Edge::new(
            1.into(),
            2.into(),
            Component::new(ComponentType::Dominance, "tiger", "edge"),
            Labels::new(),
        );
        let pointing = Edge::new(
            1.into(),
            2.into(),
            Component::new(ComponentType::Pointing, "dep", "dep"),
            Labels::new(),
        );

        assert!(has_typed_twin(&untyped, &[untyped.clone(), typed.clone()]));
        assert!(!has_typed_twin(&untyped, &[untyped.clone(), pointing]));
        assert!(!has_typed_twin(&typed, &[typed.clone()]));
    }
}
