//! Error types.
//!
//! The graph engine reports failures as a flat list of `(kind, message)`
//! pairs. The kind tag is decoded once into [`EngineErrorKind`] at the
//! boundary; nothing downstream compares kind strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a failure reported by the graph engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineErrorKind {
    /// The engine could not install its logger.
    SetLoggerError,
    /// The query could not be parsed.
    AqlSyntaxError,
    /// The query parsed but is semantically invalid.
    AqlSemanticError,
    /// The referenced corpus does not exist.
    NoSuchCorpus,
    /// A graph update could not be applied.
    ImpossibleGraphUpdate,
    /// Any other kind, tag preserved verbatim.
    Other(String),
}

impl EngineErrorKind {
    /// Decode an engine kind tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "SetLoggerError" => Self::SetLoggerError,
            "AQLSyntaxError" => Self::AqlSyntaxError,
            "AQLSemanticError" => Self::AqlSemanticError,
            "NoSuchCorpus" => Self::NoSuchCorpus,
            "ImpossibleGraphUpdate" => Self::ImpossibleGraphUpdate,
            other => Self::Other(other.to_string()),
        }
    }

    /// The engine's tag for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::SetLoggerError => "SetLoggerError",
            Self::AqlSyntaxError => "AQLSyntaxError",
            Self::AqlSemanticError => "AQLSemanticError",
            Self::NoSuchCorpus => "NoSuchCorpus",
            Self::ImpossibleGraphUpdate => "ImpossibleGraphUpdate",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure reported by the graph engine.
///
/// Keeps the engine's kind tag and message, plus the chain of causes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct EngineError {
    /// Decoded kind tag.
    pub kind: EngineErrorKind,
    /// Engine message.
    pub message: String,
    /// Underlying cause, if the engine reported one.
    #[source]
    pub cause: Option<Box<EngineError>>,
}

impl EngineError {
    /// Create an error without a cause.
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Attach a cause.
    pub fn with_cause(mut self, cause: EngineError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Rebuild an error chain from the engine's flat `(kind, message)` list.
    ///
    /// The first entry is the main error, every later entry is the cause of
    /// the one before it. Returns `None` for an empty list.
    pub fn from_error_list<K, M>(errors: &[(K, M)]) -> Option<Self>
    where
        K: AsRef<str>,
        M: AsRef<str>,
    {
        errors.iter().rev().fold(None, |cause, (kind, msg)| {
            let err = Self::new(EngineErrorKind::from_tag(kind.as_ref()), msg.as_ref());
            Some(match cause {
                Some(c) => err.with_cause(c),
                None => err,
            })
        })
    }

    /// Iterate this error and its causes, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &EngineError> {
        std::iter::successors(Some(self), |e| e.cause.as_deref())
    }
}

/// Error type for export operations.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The raw graph call failed. Fatal for the current reconstruction.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    /// The engine reported an unknown component type code.
    #[error("Invalid component type code: {0}")]
    InvalidComponentType(i32),
}

impl ExportError {
    /// The engine kind, if this error came from the engine.
    pub fn engine_kind(&self) -> Option<&EngineErrorKind> {
        match self {
            Self::Engine(e) => Some(&e.kind),
            Self::InvalidComponentType(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_kind_tags_roundtrip() {
        for tag in ["SetLoggerError", "AQLSyntaxError", "AQLSemanticError", "NoSuchCorpus"] {
            assert_eq!(EngineErrorKind::from_tag(tag).as_str(), tag);
        }
        assert_eq!(
            EngineErrorKind::from_tag("LoadingGraphFailed"),
            EngineErrorKind::Other("LoadingGraphFailed".to_string())
        );
    }

    #[test]
    fn test_error_list_builds_chain() {
        let err = EngineError::from_error_list(&[
            ("NoSuchCorpus", "corpus 'pcc2' not found"),
            ("IO", "file missing"),
        ])
        .unwrap();

        assert_eq!(err.kind, EngineErrorKind::NoSuchCorpus);
        assert_eq!(err.message, "corpus 'pcc2' not found");

        let cause = err.source().unwrap().to_string();
        assert_eq!(cause, "IO: file missing");
        assert_eq!(err.chain().count(), 2);
    }

    #[test]
    fn test_empty_error_list() {
        let empty: [(&str, &str); 0] = [];
        assert!(EngineError::from_error_list(&empty).is_none());
    }

    #[test]
    fn test_export_error_keeps_kind() {
        let err: ExportError =
            EngineError::new(EngineErrorKind::AqlSyntaxError, "unexpected '&'").into();
        assert_eq!(err.engine_kind(), Some(&EngineErrorKind::AqlSyntaxError));
        assert!(err.to_string().contains("AQLSyntaxError"));
    }
}
