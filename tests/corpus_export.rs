//! Integration tests for corpus tree export.

use annis_export::{
    map_corpus_graph, Component, ComponentType, CorpusEntryKind, CorpusGraph, ExportConfig,
    GraphUpdate, MemoryGraph, NodeId, QName,
};
use proptest::prelude::*;

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn part_of() -> Component {
    Component::new(ComponentType::PartOfSubcorpus, "annis", "")
}

fn export(g: &MemoryGraph) -> CorpusGraph {
    map_corpus_graph(g, &ExportConfig::default()).unwrap()
}

fn names(cg: &CorpusGraph, ids: Vec<annis_export::CorpusEntryId>) -> Vec<String> {
    ids.into_iter().map(|id| cg.entry(id).name.clone()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_tutorial_corpus_with_one_document() {
    let mut g = MemoryGraph::new();
    let corpus = g.add_node("tutorial", "corpus");
    let doc = g.add_node("tutorial/doc1", "corpus");
    g.add_edge(doc, corpus, part_of());

    let cg = export(&g);

    let roots = cg.roots();
    assert_eq!(roots.len(), 1);
    let root = cg.entry(roots[0]);
    assert_eq!(root.kind, CorpusEntryKind::Corpus);
    assert_eq!(root.name, "tutorial");

    let children = cg.children(roots[0]);
    assert_eq!(children.len(), 1);
    let leaf = cg.entry(children[0]);
    assert_eq!(leaf.kind, CorpusEntryKind::Document);
    assert_eq!(leaf.name, "doc1");
    assert_eq!(cg.path(children[0]), "tutorial/doc1");
}

#[test]
fn test_nested_subcorpora() {
    let mut g = MemoryGraph::new();
    let root = g.add_node("pcc2", "corpus");
    let news = g.add_node("pcc2/news", "corpus");
    let blogs = g.add_node("pcc2/blogs", "corpus");
    let d1 = g.add_node("pcc2/news/maz-4282", "corpus");
    let d2 = g.add_node("pcc2/blogs/post-17", "corpus");
    g.add_node_label(news, QName::new("", "genre"), "newspaper");

    // Children before parents in node order
    g.add_edge(d1, news, part_of());
    g.add_edge(d2, blogs, part_of());
    g.add_edge(news, root, part_of());
    g.add_edge(blogs, root, part_of());

    let cg = export(&g);
    assert_eq!(names(&cg, cg.corpora()).len(), 3);
    assert_eq!(names(&cg, cg.documents()), vec!["maz-4282", "post-17"]);

    let root_entry = cg.entry_for_node(root).unwrap();
    assert_eq!(cg.roots(), vec![root_entry]);
    let mut sub = names(&cg, cg.children(root_entry));
    sub.sort();
    assert_eq!(sub, vec!["blogs", "news"]);

    let news_entry = cg.entry(cg.entry_for_node(news).unwrap());
    assert_eq!(
        news_entry.meta_annotations.get(&QName::new("", "genre")).map(String::as_str),
        Some("newspaper")
    );
    assert_eq!(cg.path(cg.entry_for_node(d2).unwrap()), "pcc2/blogs/post-17");
}

#[test]
fn test_document_without_corpus_parent_is_root() {
    let mut g = MemoryGraph::new();
    let doc = g.add_node("orphan/doc1", "corpus");
    let parent = g.add_node("orphan", "node");
    g.add_edge(doc, parent, part_of());

    let cg = export(&g);
    let entry = cg.entry(cg.entry_for_node(doc).unwrap());
    assert_eq!(entry.kind, CorpusEntryKind::Document);
    assert!(entry.parent.is_none());
}

#[test]
fn test_fingerprint_stable() {
    let mut update = GraphUpdate::new();
    update
        .add_node_with_type("tutorial", "corpus")
        .add_node_with_type("tutorial/doc1", "corpus")
        .add_node_with_type("tutorial/doc2", "corpus")
        .add_edge("tutorial/doc1", "tutorial", "annis", "PartOfSubcorpus", "")
        .add_edge("tutorial/doc2", "tutorial", "annis", "PartOfSubcorpus", "");

    let mut g = MemoryGraph::new();
    g.apply_update(&update).unwrap();

    let a = export(&g);
    let b = export(&g);
    assert_eq!(a.documents().len(), 2);
    assert_eq!(a.fingerprint(), b.fingerprint());
}

// ─────────────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────────────

proptest! {
    /// A random forest: every node but the first may point to an earlier node.
    #[test]
    fn prop_one_entry_per_node(parents in prop::collection::vec(prop::option::of(0usize..64), 1..24)) {
        let mut g = MemoryGraph::new();
        let ids: Vec<NodeId> = (0..parents.len())
            .map(|i| g.add_node(&format!("c{}", i), "corpus"))
            .collect();
        for (i, parent) in parents.iter().enumerate() {
            if let Some(p) = parent {
                if i > 0 {
                    g.add_edge(ids[i], ids[p % i], part_of());
                }
            }
        }

        let cg = export(&g);
        prop_assert_eq!(cg.entries.len(), ids.len());
        for id in &ids {
            let entry = cg.entry_for_node(*id);
            prop_assert!(entry.is_some());
            prop_assert_eq!(cg.entry(entry.unwrap()).source, *id);
        }
        // Parents come before their children
        for (idx, entry) in cg.entries.iter().enumerate() {
            if let Some(parent) = entry.parent {
                prop_assert!(parent.0 < idx);
                prop_assert_eq!(cg.entry(parent).kind, CorpusEntryKind::Corpus);
            }
        }
    }
}
