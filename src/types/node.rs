//! Node types for the raw property graph.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::ANNIS_NS;

/// Identifier of a node inside one raw graph instance.
///
/// Opaque and only stable for the lifetime of the graph it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a node id from its raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Qualified annotation key: namespace plus name.
///
/// The namespace may be empty. Ordered by (namespace, name) so label maps
/// serialize deterministically. Serialized as `ns::name` (or `name` without
/// namespace) so it can key JSON objects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct QName {
    /// Namespace, empty if absent.
    pub ns: String,
    /// Local name.
    pub name: String,
}

impl QName {
    /// Create a qualified name.
    pub fn new(ns: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ns: ns.into(),
            name: name.into(),
        }
    }

    /// Create a key in the reserved `annis` namespace.
    pub fn annis(name: impl Into<String>) -> Self {
        Self::new(ANNIS_NS, name)
    }

    /// Whether this key belongs to the reserved `annis` namespace.
    pub fn is_annis(&self) -> bool {
        self.ns == ANNIS_NS
    }

    /// Reserved key naming a node (`annis::node_name`).
    pub fn node_name() -> Self {
        Self::annis("node_name")
    }

    /// Reserved key holding the node type (`annis::node_type`).
    pub fn node_type() -> Self {
        Self::annis("node_type")
    }

    /// Reserved key holding the token value (`annis::tok`).
    pub fn tok() -> Self {
        Self::annis("tok")
    }

    /// Reserved key assigning a node to a layer (`annis::layer`).
    pub fn layer() -> Self {
        Self::annis("layer")
    }

    /// Reserved key naming a document (`annis::doc`).
    pub fn doc() -> Self {
        Self::annis("doc")
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ns.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}::{}", self.ns, self.name)
        }
    }
}

impl From<QName> for String {
    fn from(key: QName) -> Self {
        key.to_string()
    }
}

impl From<String> for QName {
    fn from(s: String) -> Self {
        match s.split_once("::") {
            Some((ns, name)) => Self::new(ns, name),
            None => Self::new("", s),
        }
    }
}

/// A single annotation as reported by the graph engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Qualified key.
    pub key: QName,
    /// Annotation value.
    pub value: String,
}

impl Annotation {
    /// Create a new annotation.
    pub fn new(ns: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: QName::new(ns, name),
            value: value.into(),
        }
    }
}

/// Label mapping from qualified key to value.
pub type Labels = BTreeMap<QName, String>;

/// Collect engine annotations into a label map.
///
/// A later annotation with the same key overwrites an earlier one.
pub fn labels_from_annotations(annos: impl IntoIterator<Item = Annotation>) -> Labels {
    annos.into_iter().map(|a| (a.key, a.value)).collect()
}

/// A node of the raw graph.
///
/// The reserved `annis::node_name` and `annis::node_type` labels are not part
/// of `labels`; they are exposed as `name` and `node_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Identifier inside the raw graph.
    pub id: NodeId,
    /// Hierarchical, path-like node name.
    pub name: String,
    /// Free-form type tag, e.g. `"node"` or `"corpus"`.
    pub node_type: String,
    /// Remaining labels.
    pub labels: Labels,
}

impl Node {
    /// Build a node from its full label set, stripping the reserved name and type.
    ///
    /// Returns `None` when no `annis::node_name` label is present: such an id
    /// does not denote a node.
    pub fn from_labels(id: NodeId, mut labels: Labels) -> Option<Self> {
        let name = labels.remove(&QName::node_name())?;
        let node_type = labels
            .remove(&QName::node_type())
            .unwrap_or_else(|| crate::NODE_TYPE_NODE.to_string());
        Some(Self {
            id,
            name,
            node_type,
            labels,
        })
    }

    /// Get a label value.
    pub fn label(&self, key: &QName) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// The token value, if this node carries one.
    pub fn token_value(&self) -> Option<&str> {
        self.label(&QName::tok())
    }
}

// Nodes are identified by name, like the engine does.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Node {}
