use std::time::Duration;

use serde::Deserialize;

use crate::llm::{build_title_prompt, extract_json, ModelTier, TextGenerator, TITLE_SYSTEM_PROMPT};
use crate::models::Segment;

/// Titles longer than this are rejected as non-compliant
const MAX_TITLE_WORDS: usize = 8;

#[derive(Debug, Deserialize)]
struct ModelTitle {
    title: String,
}

/// Derive a short session title from the transcript opening
pub async fn derive_title<G: TextGenerator>(
    generator: &G,
    segments: &[Segment],
    excerpt_words: usize,
    timeout: Duration,
) -> String {
    let prompt = build_title_prompt(segments, excerpt_words);

    let reply = super::call_model(
        generator,
        ModelTier::Fast,
        TITLE_SYSTEM_PROMPT,
        &prompt,
        timeout,
        "title",
    )
    .await;

    reply
        .and_then(|text| parse_title(&text))
        .unwrap_or_else(fallback_title)
}

fn parse_title(text: &str) -> Option<String> {
    let parsed: ModelTitle = extract_json(text)?;
    let title = parsed.title.trim().to_string();
    let words = title.split_whitespace().count();
    if title.is_empty() || words > MAX_TITLE_WORDS {
        return None;
    }
    Some(title)
}

/// Fixed deterministic title; never surfaces fillers from the opening
pub fn fallback_title() -> String {
    "Speaking Practice Session".to_string()
}
