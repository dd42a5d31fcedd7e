use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Segment, Severity};

/// Session-level numeric metrics derived from the tagged segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Wall-clock span from first token start to last token end, seconds
    pub duration_sec: f64,
    pub total_words: usize,
    /// Words per minute over speaking time (sum of segment durations)
    pub avg_wpm: u32,
    pub filler_count: usize,
    /// Fillers per minute over wall-clock duration, one decimal
    pub filler_per_minute: f64,
    pub avg_heart_rate: u32,
    pub peak_heart_rate: u32,
    pub movement_score: f64,
    /// Fraction of segments tagged fast/very_fast, two decimals
    pub stress_speed_index: f64,
}

/// A session-level finding referencing zero or more segments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    /// Open string: model-derived kinds are not constrained to a closed set
    pub kind: String,
    pub severity: Severity,
    pub message: String,
    pub segment_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub token_ids: Vec<String>,
}

impl Issue {
    pub fn new(
        kind: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        segment_ids: Vec<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: kind.into(),
            severity,
            message: message.into(),
            segment_ids,
            token_ids: vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightType {
    Strength,
    Improvement,
}

/// One coaching takeaway, either a strength or an improvement area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingHighlight {
    #[serde(rename = "type")]
    pub highlight_type: HighlightType,
    pub title: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

/// The complete annotated analysis for one recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub title: String,
    pub segments: Vec<Segment>,
    pub metrics: SessionMetrics,
    pub issues: Vec<Issue>,
    pub coaching_highlights: Vec<CoachingHighlight>,
}

/// What the result sink stores, keyed by conversation id.
/// Overwritten (not versioned) on re-analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisDocument {
    pub conversation_id: String,
    pub analyzed_at: DateTime<Utc>,
    pub result: AnalysisResult,
}

impl AnalysisDocument {
    pub fn new(conversation_id: impl Into<String>, result: AnalysisResult) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            analyzed_at: Utc::now(),
            result,
        }
    }
}
