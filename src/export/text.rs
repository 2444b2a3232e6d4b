//! Primary text reconstruction and timeline alignment.
//!
//! ## Algorithm
//!
//! For every ordering name found on the document's Order relations:
//!
//! 1. Roots are the sources without an incoming Order relation of that name
//! 2. A depth-first walk from each root follows only Order relations whose
//!    type equals the name and returns the visited nodes in order
//! 3. The default ordering (empty name) is turned into a primary text with
//!    one character range per token; named orderings copy their token values
//!    onto the visited spans as an annotation called like the ordering
//! 4. If a timeline exists, primary tokens receive consecutive points and
//!    nodes of named orderings reuse them, directly or through Coverage
//!
//! The walk is a plain function; texts, ranges and points are computed from
//! its result afterwards.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::ExportConfig;
use crate::errors::ExportError;
use crate::facade::GraphFacade;
use crate::store::RawGraph;
use crate::types::{
    ComponentType, DocNodeId, DocumentGraph, NodeId, NodeKind, QName, RelationId, RelationKind,
    TextualDs, TextualRelation, Timeline, TimelineRelation,
};

/// Name of the default (primary) tokenization.
pub const DEFAULT_ORDERING: &str = "";

/// Order relations of a document indexed by source node.
#[derive(Debug, Clone, Default)]
pub struct OrderIndex {
    outgoing: BTreeMap<DocNodeId, Vec<RelationId>>,
    roots: BTreeMap<String, Vec<DocNodeId>>,
}

impl OrderIndex {
    /// Index all Order relations of a document.
    pub fn build(doc: &DocumentGraph) -> Self {
        let mut outgoing: BTreeMap<DocNodeId, Vec<RelationId>> = BTreeMap::new();
        let mut sources: BTreeMap<&str, BTreeSet<DocNodeId>> = BTreeMap::new();
        let mut targets: BTreeMap<&str, HashSet<DocNodeId>> = BTreeMap::new();

        for (idx, rel) in doc.relations.iter().enumerate() {
            if rel.kind != RelationKind::Order {
                continue;
            }
            outgoing.entry(rel.source).or_default().push(RelationId(idx));
            sources.entry(rel.rel_type.as_str()).or_default().insert(rel.source);
            targets.entry(rel.rel_type.as_str()).or_default().insert(rel.target);
        }

        let roots = sources
            .into_iter()
            .map(|(name, srcs)| {
                let incoming = targets.get(name);
                let mut roots: Vec<DocNodeId> = srcs
                    .into_iter()
                    .filter(|s| incoming.map_or(true, |t| !t.contains(s)))
                    .collect();
                roots.sort_by_key(|id| doc.node(*id).source);
                (name.to_string(), roots)
            })
            .collect();

        Self { outgoing, roots }
    }

    /// All ordering names, default first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    /// Root nodes of one ordering.
    pub fn roots(&self, name: &str) -> &[DocNodeId] {
        self.roots.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any ordering besides the default one exists.
    pub fn has_segmentations(&self) -> bool {
        self.names().any(|n| n != DEFAULT_ORDERING)
    }

    /// Depth-first walk of one ordering, in visiting order.
    ///
    /// Only Order relations whose type equals `name` are followed. Each node
    /// is visited at most once.
    pub fn traverse(&self, doc: &DocumentGraph, name: &str) -> Vec<DocNodeId> {
        let mut visited = Vec::new();
        let mut seen: HashSet<DocNodeId> = HashSet::new();

        for root in self.roots(name) {
            let mut stack = vec![*root];
            while let Some(node) = stack.pop() {
                if !seen.insert(node) {
                    continue;
                }
                visited.push(node);

                let Some(rels) = self.outgoing.get(&node) else {
                    continue;
                };
                // Reverse so the first relation is walked first
                for rel_id in rels.iter().rev() {
                    let rel = doc.relation(*rel_id);
                    if rel.kind == RelationKind::Order && rel.rel_type == name {
                        stack.push(rel.target);
                    }
                }
            }
        }
        visited
    }
}

/// Text rebuilt from the default ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryText {
    /// The text.
    pub text: String,
    /// (token, start, end) in traversal order, character offsets, end exclusive.
    pub ranges: Vec<(DocNodeId, usize, usize)>,
}

/// Assemble the primary text from visited nodes.
///
/// Every token contributes its token value; consecutive tokens are joined by
/// `separator`. Other nodes contribute nothing.
pub fn assemble_text(doc: &DocumentGraph, visited: &[DocNodeId], separator: &str) -> PrimaryText {
    let mut text = String::new();
    let mut len = 0usize;
    let sep_len = separator.chars().count();
    let mut ranges = Vec::new();

    for id in visited {
        let node = doc.node(*id);
        if node.kind != NodeKind::Token {
            continue;
        }
        let Some(value) = node.token_value() else {
            continue;
        };
        if !ranges.is_empty() {
            text.push_str(separator);
            len += sep_len;
        }
        let start = len;
        text.push_str(value);
        len += value.chars().count();
        ranges.push((*id, start, len));
    }

    PrimaryText { text, ranges }
}

/// Assigns timeline points.
///
/// Each (node, point) pair is recorded once, however many orderings visit
/// the node.
#[derive(Debug, Clone, Default)]
struct TimelineAligner {
    points: usize,
    by_node: BTreeMap<NodeId, usize>,
    linked: BTreeSet<(DocNodeId, usize)>,
    relations: Vec<TimelineRelation>,
}

impl TimelineAligner {
    fn assign_next(&mut self, doc: &DocumentGraph, token: DocNodeId) {
        let source = doc.node(token).source;
        if self.by_node.contains_key(&source) {
            return;
        }
        let point = self.points;
        self.points += 1;
        self.by_node.insert(source, point);
        self.link(token, point);
    }

    fn link(&mut self, node: DocNodeId, point: usize) {
        if self.linked.insert((node, point)) {
            self.relations.push(TimelineRelation { node, point });
        }
    }

    fn resolve<G: RawGraph + ?Sized>(
        &mut self,
        facade: &GraphFacade<'_, G>,
        doc: &DocumentGraph,
        node: DocNodeId,
    ) -> Result<(), ExportError> {
        let source = doc.node(node).source;
        if let Some(point) = self.by_node.get(&source).copied() {
            self.link(node, point);
            return Ok(());
        }
        for edge in facade.outgoing_edges(source, ComponentType::Coverage)? {
            if let Some(point) = self.by_node.get(&edge.target).copied() {
                self.link(node, point);
            }
        }
        Ok(())
    }
}

/// Rebuild texts, segmentation annotations and timeline of a document.
///
/// Expects all nodes and relations to be mapped already.
pub fn reconstruct_texts<G: RawGraph + ?Sized>(
    facade: &GraphFacade<'_, G>,
    doc: &mut DocumentGraph,
    config: &ExportConfig,
) -> Result<(), ExportError> {
    let index = OrderIndex::build(doc);
    let mut timeline = config
        .timeline
        .enabled(index.has_segmentations())
        .then(TimelineAligner::default);

    // Default ordering first: segmentations resolve their points against it
    if !index.roots(DEFAULT_ORDERING).is_empty() {
        let visited = index.traverse(doc, DEFAULT_ORDERING);
        let primary = assemble_text(doc, &visited, &config.token_separator);
        tracing::debug!(
            tokens = primary.ranges.len(),
            chars = primary.ranges.last().map(|r| r.2).unwrap_or(0),
            "rebuilt primary text"
        );

        let text_id = doc.add_text(TextualDs {
            name: DEFAULT_ORDERING.to_string(),
            text: primary.text,
        });
        for (token, start, end) in &primary.ranges {
            doc.textual_relations.push(TextualRelation {
                token: *token,
                text: text_id,
                start: *start,
                end: *end,
            });
            if let Some(aligner) = timeline.as_mut() {
                aligner.assign_next(doc, *token);
            }
        }
    }

    let segmentations: Vec<String> = index
        .names()
        .filter(|n| *n != DEFAULT_ORDERING)
        .map(str::to_string)
        .collect();

    for name in segmentations {
        let visited = index.traverse(doc, &name);
        tracing::debug!(segmentation = %name, nodes = visited.len(), "walked segmentation");

        for id in &visited {
            let node = doc.node(*id);
            if node.kind == NodeKind::Span {
                if let Some(value) = node.token_value().map(str::to_string) {
                    doc.node_mut(*id)
                        .annotations
                        .insert(QName::new("", name.as_str()), value);
                }
            }
        }

        if let Some(aligner) = timeline.as_mut() {
            for id in &visited {
                if doc.node(*id).kind != NodeKind::Structure {
                    aligner.resolve(facade, doc, *id)?;
                }
            }
        }
    }

    if let Some(aligner) = timeline {
        doc.timeline = Some(Timeline {
            points: aligner.points,
        });
        doc.timeline_relations = aligner.relations;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocNode, Labels, Relation};

    fn add_node(doc: &mut DocumentGraph, source: u64, kind: NodeKind, tok: Option<&str>) -> DocNodeId {
        let mut features = Labels::new();
        if let Some(t) = tok {
            features.insert(QName::tok(), t.to_string());
        }
        doc.add_node(DocNode {
            id: format!("salt:/doc#n{}", source),
            name: format!("n{}", source),
            kind,
            source: NodeId::new(source),
            annotations: Labels::new(),
            features,
        })
    }

    fn order(doc: &mut DocumentGraph, s: DocNodeId, t: DocNodeId, name: &str) {
        doc.add_relation(Relation {
            kind: RelationKind::Order,
            source: s,
            target: t,
            rel_type: name.to_string(),
            annotations: Labels::new(),
            features: Labels::new(),
            layer: None,
        });
    }

    #[test]
    fn test_roots_per_name() {
        let mut doc = DocumentGraph::new();
        let a = add_node(&mut doc, 1, NodeKind::Token, Some("a"));
        let b = add_node(&mut doc, 2, NodeKind::Token, Some("b"));
        let c = add_node(&mut doc, 3, NodeKind::Token, Some("c"));
        order(&mut doc, a, b, "");
        order(&mut doc, b, c, "");
        // b starts its own chain under another name
        order(&mut doc, b, a, "dipl");

        let index = OrderIndex::build(&doc);
        assert_eq!(index.roots(""), &[a]);
        assert_eq!(index.roots("dipl"), &[b]);
        assert_eq!(index.names().collect::<Vec<_>>(), vec!["", "dipl"]);
        assert!(index.has_segmentations());
    }

    #[test]
    fn test_traverse_ignores_other_names() {
        let mut doc = DocumentGraph::new();
        let a = add_node(&mut doc, 1, NodeKind::Token, Some("a"));
        let b = add_node(&mut doc, 2, NodeKind::Token, Some("b"));
        let x = add_node(&mut doc, 3, NodeKind::Span, Some("x"));
        order(&mut doc, a, b, "");
        order(&mut doc, a, x, "norm");

        let index = OrderIndex::build(&doc);
        assert_eq!(index.traverse(&doc, ""), vec![a, b]);
    }

    #[test]
    fn test_traverse_terminates_on_cycle() {
        let mut doc = DocumentGraph::new();
        let a = add_node(&mut doc, 1, NodeKind::Token, Some("a"));
        let b = add_node(&mut doc, 2, NodeKind::Token, Some("b"));
        let c = add_node(&mut doc, 3, NodeKind::Token, Some("c"));
        order(&mut doc, a, b, "");
        order(&mut doc, b, c, "");
        order(&mut doc, c, b, "");

        let index = OrderIndex::build(&doc);
        assert_eq!(index.traverse(&doc, ""), vec![a, b, c]);
    }

    #[test]
    fn test_assemble_text_offsets() {
        let mut doc = DocumentGraph::new();
        let a = add_node(&mut doc, 1, NodeKind::Token, Some("Hello"));
        let s = add_node(&mut doc, 2, NodeKind::Span, None);
        let b = add_node(&mut doc, 3, NodeKind::Token, Some("world"));

        let primary = assemble_text(&doc, &[a, s, b], " ");
        assert_eq!(primary.text, "Hello world");
        assert_eq!(primary.ranges, vec![(a, 0, 5), (b, 6, 11)]);
    }

    #[test]
    fn test_assemble_text_counts_characters() {
        let mut doc = DocumentGraph::new();
        let a = add_node(&mut doc, 1, NodeKind::Token, Some("Grüße"));
        let b = add_node(&mut doc, 2, NodeKind::Token, Some("aus"));

        let primary = assemble_text(&doc, &[a, b], " ");
        assert_eq!(primary.ranges, vec![(a, 0, 5), (b, 6, 9)]);
    }

    #[test]
    fn test_assemble_text_forest_keeps_separator() {
        let mut doc = DocumentGraph::new();
        let a = add_node(&mut doc, 1, NodeKind::Token, Some("a"));
        let b = add_node(&mut doc, 2, NodeKind::Token, Some("b"));
        let c = add_node(&mut doc, 3, NodeKind::Token, Some("c"));
        order(&mut doc, a, b, "");
        // c is a second root

        let index = OrderIndex::build(&doc);
        assert_eq!(index.roots(""), &[a]);
        let mut visited = index.traverse(&doc, "");
        visited.push(c);
        assert_eq!(assemble_text(&doc, &visited, " ").text, "a b c");
    }
}
