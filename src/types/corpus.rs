//! Corpus tree: corpora, sub-corpora and documents.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::canonical::canonical_hash_hex;
use super::node::{Labels, NodeId};

/// Index of an entry in [`CorpusGraph::entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CorpusEntryId(pub usize);

/// Whether an entry is an inner corpus node or a document leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorpusEntryKind {
    /// Corpus or sub-corpus.
    Corpus,
    /// Document (leaf).
    Document,
}

/// One entry of the corpus tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusEntry {
    /// Corpus or document.
    pub kind: CorpusEntryKind,
    /// Display name.
    pub name: String,
    /// Parent entry, `None` for roots.
    pub parent: Option<CorpusEntryId>,
    /// Raw graph node this entry was built from.
    pub source: NodeId,
    /// Non-reserved labels, kept as metadata.
    pub meta_annotations: Labels,
    /// Labels in the reserved `annis` namespace.
    pub features: Labels,
}

/// The corpus tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "CorpusGraphParts")]
pub struct CorpusGraph {
    /// All entries, parents before children.
    pub entries: Vec<CorpusEntry>,
    #[serde(skip)]
    by_source: BTreeMap<NodeId, CorpusEntryId>,
}

#[derive(Deserialize)]
struct CorpusGraphParts {
    entries: Vec<CorpusEntry>,
}

impl From<CorpusGraphParts> for CorpusGraph {
    fn from(parts: CorpusGraphParts) -> Self {
        let by_source = parts
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.source, CorpusEntryId(i)))
            .collect();
        Self {
            entries: parts.entries,
            by_source,
        }
    }
}

impl CorpusGraph {
    /// Create an empty corpus graph.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_entry(&mut self, entry: CorpusEntry) -> CorpusEntryId {
        let id = CorpusEntryId(self.entries.len());
        self.by_source.insert(entry.source, id);
        self.entries.push(entry);
        id
    }

    /// Get an entry.
    pub fn entry(&self, id: CorpusEntryId) -> &CorpusEntry {
        &self.entries[id.0]
    }

    /// The entry built from a raw graph node.
    pub fn entry_for_node(&self, node: NodeId) -> Option<CorpusEntryId> {
        self.by_source.get(&node).copied()
    }

    /// Entries without parent.
    pub fn roots(&self) -> Vec<CorpusEntryId> {
        self.ids().filter(|id| self.entry(*id).parent.is_none()).collect()
    }

    /// Direct children of an entry.
    pub fn children(&self, parent: CorpusEntryId) -> Vec<CorpusEntryId> {
        self.ids()
            .filter(|id| self.entry(*id).parent == Some(parent))
            .collect()
    }

    /// Corpus and sub-corpus entries.
    pub fn corpora(&self) -> Vec<CorpusEntryId> {
        self.ids()
            .filter(|id| self.entry(*id).kind == CorpusEntryKind::Corpus)
            .collect()
    }

    /// Document entries.
    pub fn documents(&self) -> Vec<CorpusEntryId> {
        self.ids()
            .filter(|id| self.entry(*id).kind == CorpusEntryKind::Document)
            .collect()
    }

    /// Slash-joined names from the root down to this entry.
    pub fn path(&self, id: CorpusEntryId) -> String {
        let mut names: Vec<&str> =
            std::iter::successors(Some(id), |cur| self.entry(*cur).parent)
                .map(|cur| self.entry(cur).name.as_str())
                .collect();
        names.reverse();
        names.join("/")
    }

    /// Canonical fingerprint of the corpus tree.
    pub fn fingerprint(&self) -> String {
        canonical_hash_hex(self)
    }

    fn ids(&self) -> impl Iterator<Item = CorpusEntryId> {
        (0..self.entries.len()).map(CorpusEntryId)
    }
}
