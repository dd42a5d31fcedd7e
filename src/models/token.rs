use serde::{Deserialize, Serialize};

use super::Tag;

/// Raw token row as delivered by the storage collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRow {
    /// Row identifier; generated if the source omitted it
    #[serde(default)]
    pub id: Option<String>,
    pub conversation_id: String,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
    /// Stored tags, always empty before analysis
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One transcribed word with millisecond timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Unique identifier for this token (UUID)
    pub id: String,
    pub conversation_id: String,
    /// Start timestamp in milliseconds
    pub start_ms: u64,
    /// End timestamp in milliseconds
    pub end_ms: u64,
    /// The word text, possibly punctuated by stage 0
    pub text: String,
}

impl Token {
    /// Create a token from a storage row, generating an id if missing
    pub fn from_row(row: &TokenRow) -> Self {
        Self {
            id: row
                .id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            conversation_id: row.conversation_id.clone(),
            start_ms: row.start_ms,
            end_ms: row.end_ms,
            text: row.text.clone(),
        }
    }

    /// Duration of this token in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// The word lowercased with trailing punctuation removed, for matching
    pub fn normalized(&self) -> String {
        self.text
            .trim_end_matches(['.', ',', '!', '?', ';', ':'])
            .to_lowercase()
    }

    /// Whether the text already ends in terminal punctuation
    pub fn has_terminal_punctuation(&self) -> bool {
        self.text.ends_with(['.', '!', '?'])
    }
}

/// A token plus the tags the tagging stage attached to it.
///
/// The original `Token` is never mutated; tagging produces these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenWithTags {
    #[serde(flatten)]
    pub token: Token,
    pub tags: Vec<Tag>,
}

impl TokenWithTags {
    pub fn untagged(token: Token) -> Self {
        Self {
            token,
            tags: Vec::new(),
        }
    }
}
