use serde::{Deserialize, Serialize};

use super::{Tag, TokenWithTags};

/// A detected silence between two speech blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pause {
    pub start_ms: u64,
    pub end_ms: u64,
    pub duration_ms: u64,
}

impl Pause {
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        Self {
            start_ms,
            end_ms,
            duration_ms: end_ms.saturating_sub(start_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Speech,
    Pause,
}

/// A contiguous span of the recording timeline.
///
/// Speech segments carry one or more tokens; pause segments carry no
/// tokens and exactly one descriptive `pause` tag. With pause segments
/// included, segments partition the timeline with no gaps or overlaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub start_ms: u64,
    pub end_ms: u64,
    pub kind: SegmentKind,
    pub text: String,
    pub tokens: Vec<TokenWithTags>,
    pub tags: Vec<Tag>,
}

impl Segment {
    /// Build a speech segment from tagged tokens; text is the joined words
    pub fn speech(id: impl Into<String>, tokens: Vec<TokenWithTags>, tags: Vec<Tag>) -> Self {
        let start_ms = tokens.first().map(|t| t.token.start_ms).unwrap_or(0);
        let end_ms = tokens.last().map(|t| t.token.end_ms).unwrap_or(start_ms);
        let text = tokens
            .iter()
            .map(|t| t.token.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            id: id.into(),
            start_ms,
            end_ms,
            kind: SegmentKind::Speech,
            text,
            tokens,
            tags,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    pub fn duration_sec(&self) -> f64 {
        self.duration_ms() as f64 / 1000.0
    }

    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }
}
