//! Export configuration.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::DEFAULT_ID_PREFIX;

/// When a document export creates a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimelineMode {
    /// Only when the document has at least one secondary segmentation.
    #[default]
    Auto,
    /// Always.
    Always,
    /// Never.
    Never,
}

impl TimelineMode {
    /// Parse timeline mode from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" | "" => Some(Self::Auto),
            "always" => Some(Self::Always),
            "never" => Some(Self::Never),
            _ => None,
        }
    }

    /// Whether a timeline is created given the presence of segmentations.
    pub fn enabled(&self, has_segmentations: bool) -> bool {
        match self {
            Self::Auto => has_segmentations,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

impl std::fmt::Display for TimelineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Always => write!(f, "always"),
            Self::Never => write!(f, "never"),
        }
    }
}

/// Export configuration.
///
/// ## Parameters
///
/// - `timeline`: when a timeline is created
/// - `token_separator`: inserted between consecutive tokens of a primary text
/// - `id_prefix`: ensured at the start of every exported node id
/// - `default_corpus_name`: name for corpus entries without a node name
/// - `default_document_name`: name for documents without `annis::doc` or node name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Timeline creation mode.
    pub timeline: TimelineMode,
    /// Separator between tokens.
    pub token_separator: String,
    /// Prefix of exported node ids.
    pub id_prefix: String,
    /// Fallback corpus name.
    pub default_corpus_name: String,
    /// Fallback document name.
    pub default_document_name: String,
}

impl ExportConfig {
    /// Read configuration from environment variables.
    ///
    /// Reads `ANNIS_EXPORT_TIMELINE`, `ANNIS_EXPORT_SEPARATOR` and
    /// `ANNIS_EXPORT_ID_PREFIX`. Unset variables keep their default; invalid
    /// values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("ANNIS_EXPORT_TIMELINE") {
            match TimelineMode::from_str(&value) {
                Some(mode) => config.timeline = mode,
                None => tracing::warn!(
                    value = %value,
                    "ANNIS_EXPORT_TIMELINE must be auto, always or never, using default"
                ),
            }
        }
        if let Ok(sep) = std::env::var("ANNIS_EXPORT_SEPARATOR") {
            config.token_separator = sep;
        }
        if let Ok(prefix) = std::env::var("ANNIS_EXPORT_ID_PREFIX") {
            config.id_prefix = prefix;
        }
        config
    }

    /// Set the timeline mode.
    pub fn with_timeline(mut self, timeline: TimelineMode) -> Self {
        self.timeline = timeline;
        self
    }

    /// Set the token separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.token_separator = separator.into();
        self
    }

    /// Compute a hash of the configuration.
    pub fn config_hash(&self) -> String {
        canonical_hash_hex(self)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            timeline: TimelineMode::Auto,
            token_separator: " ".to_string(),
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            default_corpus_name: "corpus".to_string(),
            default_document_name: "document".to_string(),
        }
    }
}
