use serde::{Deserialize, Serialize};

/// Severity of a tag or issue, ordered low to high
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Kinds of tags the pipeline itself produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Filler,
    Hedging,
    Slow,
    Fast,
    VeryFast,
    Pause,
}

/// Per-kind payload so required fields are enforced at compile time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TagData {
    Filler { word: String },
    Hedging { phrase: String },
    Pace { wpm: f64 },
    Pause { duration_ms: u64 },
}

/// An annotation attached to exactly one token or one segment.
/// Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub kind: TagKind,
    pub severity: Severity,
    /// Short human-readable label shown in the UI
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<TagData>,
}

impl Tag {
    pub fn new(kind: TagKind, severity: Severity, label: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            severity,
            label: label.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: TagData) -> Self {
        self.data = Some(data);
        self
    }
}
