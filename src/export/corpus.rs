//! Corpus tree construction.
//!
//! Corpus nodes point to their parent with PartOfSubcorpus edges. Every node
//! that is some edge's parent becomes a corpus entry, built parent first and
//! memoized per raw node. Children that did not become corpus entries are
//! documents.
//!
//! Cycles in the PartOfSubcorpus edges are not detected; the engine keeps
//! them acyclic.

use std::collections::{BTreeMap, BTreeSet};

use super::{last_segment, partition_labels, ExportError};
use crate::config::ExportConfig;
use crate::facade::GraphFacade;
use crate::store::RawGraph;
use crate::types::{
    ComponentType, CorpusEntry, CorpusEntryId, CorpusEntryKind, CorpusGraph, Node, NodeId, QName,
};
use crate::NODE_TYPE_CORPUS;

/// Exports the corpus tree of one raw graph.
pub struct CorpusExporter<'g, G: RawGraph + ?Sized> {
    facade: GraphFacade<'g, G>,
    config: ExportConfig,
}

impl<'g, G: RawGraph + ?Sized> CorpusExporter<'g, G> {
    /// Create an exporter over a raw graph.
    pub fn new(graph: &'g G, config: ExportConfig) -> Self {
        Self {
            facade: GraphFacade::new(graph),
            config,
        }
    }

    /// Build the corpus tree.
    pub fn export(&self) -> Result<CorpusGraph, ExportError> {
        let span = tracing::info_span!("export_corpus");
        let _enter = span.enter();

        let mut nodes: BTreeMap<NodeId, Node> = BTreeMap::new();
        let mut links = ParentLinks::default();

        for node in self.facade.nodes_by_type(NODE_TYPE_CORPUS)? {
            let node = node?;
            for edge in self
                .facade
                .outgoing_edges(node.id, ComponentType::PartOfSubcorpus)?
            {
                if edge.is_self_loop() {
                    tracing::debug!(node = %edge.source, "skipping self-referencing corpus edge");
                    continue;
                }
                links.insert(edge.source, edge.target);
            }
            nodes.insert(node.id, node);
        }

        let mut builder = TreeBuilder {
            nodes: &nodes,
            links: &links,
            config: &self.config,
            graph: CorpusGraph::new(),
        };

        for parent in links.parents() {
            builder.corpus_entry(parent);
        }
        // Corpus nodes without any PartOfSubcorpus edge are standalone roots
        let linked: BTreeSet<NodeId> = links.iter().flat_map(|(c, p)| [c, p]).collect();
        for id in nodes.keys() {
            if !linked.contains(id) {
                builder.corpus_entry(*id);
            }
        }
        for (child, parent) in links.iter() {
            builder.document_entry(child, parent);
        }

        let graph = builder.graph;
        tracing::info!(
            corpora = graph.corpora().len(),
            documents = graph.documents().len(),
            "corpus tree exported"
        );
        Ok(graph)
    }
}

/// Export the corpus tree of a raw graph.
pub fn map_corpus_graph<G: RawGraph + ?Sized>(
    graph: &G,
    config: &ExportConfig,
) -> Result<CorpusGraph, ExportError> {
    CorpusExporter::new(graph, config.clone()).export()
}

// Child to parent links in first-seen child order; a later edge of the same
// child replaces the parent.
#[derive(Debug, Default)]
struct ParentLinks {
    order: Vec<NodeId>,
    parent_of: BTreeMap<NodeId, NodeId>,
}

impl ParentLinks {
    fn insert(&mut self, child: NodeId, parent: NodeId) {
        if self.parent_of.insert(child, parent).is_none() {
            self.order.push(child);
        }
    }

    fn parent(&self, child: NodeId) -> Option<NodeId> {
        self.parent_of.get(&child).copied()
    }

    fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.order.iter().map(|c| (*c, self.parent_of[c]))
    }

    fn parents(&self) -> Vec<NodeId> {
        self.iter().map(|(_, p)| p).collect()
    }
}

struct TreeBuilder<'a> {
    nodes: &'a BTreeMap<NodeId, Node>,
    links: &'a ParentLinks,
    config: &'a ExportConfig,
    graph: CorpusGraph,
}

impl<'a> TreeBuilder<'a> {
    /// Entry of a corpus node, creating it and its ancestors on first use.
    ///
    /// `None` if the node is not a corpus node of this graph.
    fn corpus_entry(&mut self, id: NodeId) -> Option<CorpusEntryId> {
        if let Some(entry) = self.graph.entry_for_node(id) {
            return Some(entry);
        }
        let nodes = self.nodes;
        let node = nodes.get(&id)?;

        let parent = match self.links.parent(id) {
            Some(parent) => self.corpus_entry(parent),
            None => None,
        };

        let name = match last_segment(&node.name).trim() {
            "" => self.config.default_corpus_name.clone(),
            segment => segment.to_string(),
        };
        Some(self.add(CorpusEntryKind::Corpus, name, parent, node))
    }

    /// Leaf entry for a child that is not a corpus.
    fn document_entry(&mut self, child: NodeId, parent: NodeId) {
        if self.graph.entry_for_node(child).is_some() {
            return;
        }
        let nodes = self.nodes;
        let Some(node) = nodes.get(&child) else {
            tracing::debug!(node = %child, "skipping document outside the corpus node set");
            return;
        };
        let parent = self.graph.entry_for_node(parent);
        let name = self.document_name(node);
        self.add(CorpusEntryKind::Document, name, parent, node);
    }

    fn document_name(&self, node: &Node) -> String {
        if let Some(doc) = node.label(&QName::doc()) {
            return doc.to_string();
        }
        match last_segment(&node.name).trim() {
            "" => self.config.default_document_name.clone(),
            segment => segment.to_string(),
        }
    }

    fn add(
        &mut self,
        kind: CorpusEntryKind,
        name: String,
        parent: Option<CorpusEntryId>,
        node: &Node,
    ) -> CorpusEntryId {
        let (meta_annotations, features) = partition_labels(node.labels.clone());
        tracing::trace!(node = %node.id, name = %name, ?kind, "adding corpus entry");
        self.graph.add_entry(CorpusEntry {
            kind,
            name,
            parent,
            source: node.id,
            meta_annotations,
            features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryGraph;
    use crate::types::Component;

    fn part_of() -> Component {
        Component::new(ComponentType::PartOfSubcorpus, "annis", "")
    }

    #[test]
    fn test_shared_parent_built_once() {
        let mut g = MemoryGraph::new();
        let root = g.add_node("pcc2", "corpus");
        let sub = g.add_node("pcc2/news", "corpus");
        let d1 = g.add_node("pcc2/news/4282", "corpus");
        let d2 = g.add_node("pcc2/news/4283", "corpus");
        g.add_edge(d1, sub, part_of());
        g.add_edge(d2, sub, part_of());
        g.add_edge(sub, root, part_of());

        let cg = map_corpus_graph(&g, &ExportConfig::default()).unwrap();
        assert_eq!(cg.corpora().len(), 2);
        assert_eq!(cg.documents().len(), 2);

        let sub_entry = cg.entry_for_node(sub).unwrap();
        let root_entry = cg.entry_for_node(root).unwrap();
        assert_eq!(cg.entry(sub_entry).parent, Some(root_entry));
        assert_eq!(cg.children(sub_entry).len(), 2);
        assert_eq!(cg.roots(), vec![root_entry]);
    }

    #[test]
    fn test_document_name_prefers_doc_label() {
        let mut g = MemoryGraph::new();
        let root = g.add_node("pcc2", "corpus");
        let doc = g.add_node("pcc2/4282", "corpus");
        g.add_node_label(doc, QName::doc(), "maz-4282");
        g.add_node_label(doc, QName::new("", "genre"), "news");
        g.add_edge(doc, root, part_of());

        let cg = map_corpus_graph(&g, &ExportConfig::default()).unwrap();
        let entry = cg.entry(cg.entry_for_node(doc).unwrap());
        assert_eq!(entry.kind, CorpusEntryKind::Document);
        assert_eq!(entry.name, "maz-4282");
        assert_eq!(entry.meta_annotations.get(&QName::new("", "genre")).map(String::as_str), Some("news"));
        assert!(entry.features.contains_key(&QName::doc()));
    }

    #[test]
    fn test_standalone_corpus_is_root() {
        let mut g = MemoryGraph::new();
        let root = g.add_node("lonely", "corpus");

        let cg = map_corpus_graph(&g, &ExportConfig::default()).unwrap();
        let entry = cg.entry(cg.entry_for_node(root).unwrap());
        assert_eq!(entry.kind, CorpusEntryKind::Corpus);
        assert_eq!(entry.name, "lonely");
        assert!(cg.documents().is_empty());
    }

    #[test]
    fn test_non_corpus_nodes_ignored() {
        let mut g = MemoryGraph::new();
        let root = g.add_node("pcc2", "corpus");
        let tok = g.add_node("pcc2/4282#tok_1", "node");
        g.add_edge(tok, root, part_of());

        let cg = map_corpus_graph(&g, &ExportConfig::default()).unwrap();
        assert_eq!(cg.entries.len(), 1);
        assert!(cg.entry_for_node(tok).is_none());
    }
}
