//! Component types: typed partitions of the edge space.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ExportError;

/// Type of an edge component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    /// A span or structure includes a token in its extent.
    Coverage,
    /// Hierarchical structural edge, e.g. constituency.
    Dominance,
    /// Non-hierarchical pointer, e.g. anaphora or dependency.
    Pointing,
    /// Linear chain of one tokenization or segmentation.
    Ordering,
    /// Link to the left-most covered token.
    LeftToken,
    /// Link to the right-most covered token.
    RightToken,
    /// Link from a corpus or document node to its parent corpus.
    PartOfSubcorpus,
}

impl ComponentType {
    /// All component types, in engine code order.
    pub const ALL: [ComponentType; 7] = [
        Self::Coverage,
        Self::Dominance,
        Self::Pointing,
        Self::Ordering,
        Self::LeftToken,
        Self::RightToken,
        Self::PartOfSubcorpus,
    ];

    /// Parse component type from the engine's name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Coverage" => Some(Self::Coverage),
            "Dominance" => Some(Self::Dominance),
            "Pointing" => Some(Self::Pointing),
            "Ordering" => Some(Self::Ordering),
            "LeftToken" => Some(Self::LeftToken),
            "RightToken" => Some(Self::RightToken),
            "PartOfSubcorpus" | "PartOf" => Some(Self::PartOfSubcorpus),
            _ => None,
        }
    }

    /// Decode the engine's numeric component type code.
    pub fn from_raw(raw: i32) -> Result<Self, ExportError> {
        match raw {
            0 => Ok(Self::Coverage),
            2 => Ok(Self::Dominance),
            3 => Ok(Self::Pointing),
            4 => Ok(Self::Ordering),
            5 => Ok(Self::LeftToken),
            6 => Ok(Self::RightToken),
            7 => Ok(Self::PartOfSubcorpus),
            other => Err(ExportError::InvalidComponentType(other)),
        }
    }

    /// The engine's numeric code for this type.
    pub fn as_raw(&self) -> i32 {
        match self {
            Self::Coverage => 0,
            Self::Dominance => 2,
            Self::Pointing => 3,
            Self::Ordering => 4,
            Self::LeftToken => 5,
            Self::RightToken => 6,
            Self::PartOfSubcorpus => 7,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coverage => write!(f, "Coverage"),
            Self::Dominance => write!(f, "Dominance"),
            Self::Pointing => write!(f, "Pointing"),
            Self::Ordering => write!(f, "Ordering"),
            Self::LeftToken => write!(f, "LeftToken"),
            Self::RightToken => write!(f, "RightToken"),
            Self::PartOfSubcorpus => write!(f, "PartOfSubcorpus"),
        }
    }
}

/// A component: (type, layer, name).
///
/// Two components are equal iff all three fields match. Layer and name may
/// be empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Component {
    /// Component type.
    pub ctype: ComponentType,
    /// Layer name, empty if none.
    pub layer: String,
    /// Component name, used as the relation type string.
    pub name: String,
}

impl Component {
    /// Create a new component.
    pub fn new(ctype: ComponentType, layer: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ctype,
            layer: layer.into(),
            name: name.into(),
        }
    }

    /// Layer name, or `None` if empty.
    pub fn layer_name(&self) -> Option<&str> {
        if self.layer.is_empty() {
            None
        } else {
            Some(&self.layer)
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.ctype, self.layer, self.name)
    }
}

/// Restriction applied when enumerating outgoing edges.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ComponentFilter {
    /// All components.
    #[default]
    All,
    /// All components of one type.
    Type(ComponentType),
    /// Exactly one component.
    Exact(Component),
}

impl From<ComponentType> for ComponentFilter {
    fn from(ctype: ComponentType) -> Self {
        Self::Type(ctype)
    }
}

impl From<Component> for ComponentFilter {
    fn from(component: Component) -> Self {
        Self::Exact(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_codes_roundtrip() {
        for ctype in ComponentType::ALL {
            assert_eq!(ComponentType::from_raw(ctype.as_raw()).unwrap(), ctype);
        }
    }

    #[test]
    fn test_unknown_raw_code() {
        // 1 was never assigned by the engine
        assert!(matches!(
            ComponentType::from_raw(1),
            Err(ExportError::InvalidComponentType(1))
        ));
    }

    #[test]
    fn test_component_type_parsing() {
        assert_eq!(ComponentType::from_str("Dominance"), Some(ComponentType::Dominance));
        assert_eq!(ComponentType::from_str("PartOf"), Some(ComponentType::PartOfSubcorpus));
        assert_eq!(ComponentType::from_str("dominance"), None);
    }

    #[test]
    fn test_component_equality_needs_all_fields() {
        let a = Component::new(ComponentType::Dominance, "tiger", "edge");
        let b = Component::new(ComponentType::Dominance, "tiger", "");
        let c = Component::new(ComponentType::Pointing, "tiger", "edge");
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_layer_name() {
        assert_eq!(Component::new(ComponentType::Ordering, "", "").layer_name(), None);
        assert_eq!(
            Component::new(ComponentType::Ordering, "default_ns", "").layer_name(),
            Some("default_ns")
        );
    }
}
