//! Reconstructed document annotation graph.
//!
//! All entities here are read-only projections of one raw graph snapshot.
//! Nodes, relations, texts and layers live in arenas and reference each
//! other by index.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::canonical::canonical_hash_hex;
use super::node::{Labels, NodeId, QName};

/// Index of a node in [`DocumentGraph::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocNodeId(pub usize);

/// Index of a relation in [`DocumentGraph::relations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationId(pub usize);

/// Index of a text in [`DocumentGraph::texts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextId(pub usize);

/// Index of a layer in [`DocumentGraph::layers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LayerId(pub usize);

/// Classification of a document node. Exactly one applies to every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Carries a token value and covers nothing.
    Token,
    /// Covers tokens and has no outgoing dominance edge.
    Span,
    /// Has at least one outgoing dominance edge.
    Structure,
}

/// A node of the document graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocNode {
    /// Exported identifier (prefixed node name).
    pub id: String,
    /// Short name: URI fragment or last path segment.
    pub name: String,
    /// Node classification.
    pub kind: NodeKind,
    /// Raw graph id this node was projected from.
    pub source: NodeId,
    /// User annotations.
    pub annotations: Labels,
    /// Labels in the reserved `annis` namespace.
    pub features: Labels,
}

impl DocNode {
    /// Get a user annotation.
    pub fn annotation(&self, ns: &str, name: &str) -> Option<&str> {
        self.annotations
            .get(&QName::new(ns, name))
            .map(String::as_str)
    }

    /// Get a reserved feature.
    pub fn feature(&self, name: &str) -> Option<&str> {
        self.features.get(&QName::annis(name)).map(String::as_str)
    }

    /// The token value feature.
    pub fn token_value(&self) -> Option<&str> {
        self.feature("tok")
    }
}

/// Kind of a document relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// Hierarchical structural relation.
    Dominance,
    /// Pointing relation.
    Pointing,
    /// Ordering relation of one tokenization or segmentation.
    Order,
    /// Coverage from a span to a token.
    Spanning,
}

/// A typed, directed relation of the document graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    /// Relation kind.
    pub kind: RelationKind,
    /// Source node.
    pub source: DocNodeId,
    /// Target node.
    pub target: DocNodeId,
    /// Type string (component name, may be empty).
    pub rel_type: String,
    /// User annotations.
    pub annotations: Labels,
    /// Labels in the reserved `annis` namespace.
    pub features: Labels,
    /// Layer the relation belongs to.
    pub layer: Option<LayerId>,
}

/// A named grouping of nodes and relations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    /// Layer name.
    pub name: String,
    /// Member nodes.
    pub nodes: Vec<DocNodeId>,
    /// Member relations.
    pub relations: Vec<RelationId>,
}

/// Reconstructed primary text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextualDs {
    /// Ordering name the text was rebuilt from (empty for the default).
    pub name: String,
    /// The text.
    pub text: String,
}

/// Anchors a token to a half-open range of a text, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextualRelation {
    /// The token.
    pub token: DocNodeId,
    /// The text.
    pub text: TextId,
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

/// Shared sequence of abstract points aligning segmentations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timeline {
    /// Number of allocated points.
    pub points: usize,
}

/// Aligns a node to one point of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRelation {
    /// Aligned node.
    pub node: DocNodeId,
    /// Timeline point.
    pub point: usize,
}

/// The reconstructed document graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "DocumentGraphParts")]
pub struct DocumentGraph {
    /// All nodes.
    pub nodes: Vec<DocNode>,
    /// All relations.
    pub relations: Vec<Relation>,
    /// Reconstructed texts.
    pub texts: Vec<TextualDs>,
    /// Token anchors into `texts`.
    pub textual_relations: Vec<TextualRelation>,
    /// Timeline, if one was created.
    pub timeline: Option<Timeline>,
    /// Alignments to `timeline`.
    pub timeline_relations: Vec<TimelineRelation>,
    /// Layers.
    pub layers: Vec<Layer>,
    #[serde(skip)]
    by_source: BTreeMap<NodeId, DocNodeId>,
}

// Serialized form; the source index is rebuilt on load.
#[derive(Deserialize)]
struct DocumentGraphParts {
    nodes: Vec<DocNode>,
    relations: Vec<Relation>,
    texts: Vec<TextualDs>,
    textual_relations: Vec<TextualRelation>,
    timeline: Option<Timeline>,
    timeline_relations: Vec<TimelineRelation>,
    layers: Vec<Layer>,
}

impl From<DocumentGraphParts> for DocumentGraph {
    fn from(parts: DocumentGraphParts) -> Self {
        let by_source = parts
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.source, DocNodeId(i)))
            .collect();
        Self {
            nodes: parts.nodes,
            relations: parts.relations,
            texts: parts.texts,
            textual_relations: parts.textual_relations,
            timeline: parts.timeline,
            timeline_relations: parts.timeline_relations,
            layers: parts.layers,
            by_source,
        }
    }
}

impl DocumentGraph {
    /// Create an empty document graph.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_node(&mut self, node: DocNode) -> DocNodeId {
        let id = DocNodeId(self.nodes.len());
        self.by_source.insert(node.source, id);
        self.nodes.push(node);
        id
    }

    pub(crate) fn add_relation(&mut self, relation: Relation) -> RelationId {
        let id = RelationId(self.relations.len());
        self.relations.push(relation);
        id
    }

    pub(crate) fn add_text(&mut self, text: TextualDs) -> TextId {
        let id = TextId(self.texts.len());
        self.texts.push(text);
        id
    }

    /// Get the layer with this name, creating it on first use.
    pub(crate) fn layer_or_insert(&mut self, name: &str) -> LayerId {
        if let Some(id) = self.layer_by_name(name) {
            return id;
        }
        let id = LayerId(self.layers.len());
        self.layers.push(Layer {
            name: name.to_string(),
            nodes: Vec::new(),
            relations: Vec::new(),
        });
        id
    }

    pub(crate) fn node_mut(&mut self, id: DocNodeId) -> &mut DocNode {
        &mut self.nodes[id.0]
    }

    pub(crate) fn layer_mut(&mut self, id: LayerId) -> &mut Layer {
        &mut self.layers[id.0]
    }

    /// Get a node.
    pub fn node(&self, id: DocNodeId) -> &DocNode {
        &self.nodes[id.0]
    }

    /// Get a relation.
    pub fn relation(&self, id: RelationId) -> &Relation {
        &self.relations[id.0]
    }

    /// Get a layer.
    pub fn layer(&self, id: LayerId) -> &Layer {
        &self.layers[id.0]
    }

    /// Look up the node projected from a raw graph node.
    pub fn node_by_source(&self, source: NodeId) -> Option<DocNodeId> {
        self.by_source.get(&source).copied()
    }

    /// Look up a node by its exported id.
    pub fn node_by_id(&self, id: &str) -> Option<DocNodeId> {
        self.nodes.iter().position(|n| n.id == id).map(DocNodeId)
    }

    fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = DocNodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.kind == kind)
            .map(|(i, _)| DocNodeId(i))
    }

    /// All token nodes.
    pub fn tokens(&self) -> impl Iterator<Item = DocNodeId> + '_ {
        self.nodes_of_kind(NodeKind::Token)
    }

    /// All span nodes.
    pub fn spans(&self) -> impl Iterator<Item = DocNodeId> + '_ {
        self.nodes_of_kind(NodeKind::Span)
    }

    /// All structure nodes.
    pub fn structures(&self) -> impl Iterator<Item = DocNodeId> + '_ {
        self.nodes_of_kind(NodeKind::Structure)
    }

    /// All relations of one kind.
    pub fn relations_of_kind(&self, kind: RelationKind) -> impl Iterator<Item = &Relation> + '_ {
        self.relations.iter().filter(move |r| r.kind == kind)
    }

    /// Find a layer by name.
    pub fn layer_by_name(&self, name: &str) -> Option<LayerId> {
        self.layers.iter().position(|l| l.name == name).map(LayerId)
    }

    /// Find a text by ordering name.
    pub fn text_by_name(&self, name: &str) -> Option<&TextualDs> {
        self.texts.iter().find(|t| t.name == name)
    }

    /// The covered substring of a token, if it is anchored to a text.
    pub fn token_text(&self, token: DocNodeId) -> Option<&str> {
        let rel = self.textual_relations.iter().find(|r| r.token == token)?;
        let text = &self.texts.get(rel.text.0)?.text;
        let start = byte_offset(text, rel.start)?;
        let end = byte_offset(text, rel.end)?;
        text.get(start..end)
    }

    /// Timeline points a node is aligned to, in emission order.
    pub fn timeline_points(&self, node: DocNodeId) -> Vec<usize> {
        self.timeline_relations
            .iter()
            .filter(|r| r.node == node)
            .map(|r| r.point)
            .collect()
    }

    /// Canonical fingerprint of the exported graph.
    pub fn fingerprint(&self) -> String {
        canonical_hash_hex(self)
    }
}

// Character offset to byte offset; the end of the text is a valid offset.
fn byte_offset(text: &str, chars: usize) -> Option<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(chars)
}
