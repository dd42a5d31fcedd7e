use crate::models::{Segment, Severity, Tag, TagData, TagKind, Token, TokenWithTags};

/// Configuration for Stage 2 tagging
#[derive(Debug, Clone)]
pub struct TaggerConfig {
    /// Filler words and phrases (lowercase, space-separated for phrases)
    pub filler_words: Vec<String>,
    /// Hedging phrases (lowercase, space-separated)
    pub hedging_phrases: Vec<String>,
    /// Below this wpm a segment is tagged slow
    pub slow_wpm: f64,
    /// Above this wpm a segment is tagged fast
    pub fast_wpm: f64,
    /// Above this wpm a segment is tagged very_fast instead
    pub very_fast_wpm: f64,
    /// More filler hits than this adds an aggregate segment tag
    pub segment_filler_threshold: usize,
    /// More filler hits than this makes the aggregate tag high severity
    pub segment_filler_high_threshold: usize,
    /// More hedging hits than this adds an aggregate segment tag
    pub segment_hedging_threshold: usize,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            filler_words: [
                "um",
                "uh",
                "uhm",
                "umm",
                "er",
                "ah",
                "like",
                "you know",
                "so",
                "basically",
                "actually",
                "literally",
                "right",
                "okay",
                "well",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            hedging_phrases: [
                "sort of",
                "kind of",
                "i think",
                "i guess",
                "i mean",
                "maybe",
                "perhaps",
                "probably",
                "might",
                "could be",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            slow_wpm: 110.0,
            fast_wpm: 160.0,
            very_fast_wpm: 200.0,
            segment_filler_threshold: 2,
            segment_filler_high_threshold: 4,
            segment_hedging_threshold: 1,
        }
    }
}

/// Perform Stage 2: tag one segment's tokens for fillers, hedging and
/// pace, and synthesize the aggregate segment tags.
///
/// Pure function over the token list; running it twice yields identical
/// tags. Phrases are matched by forward lookahead over up to three
/// tokens so multiword entries never false-positive on a single word,
/// and a matched span is consumed so it cannot re-match.
pub fn tag_segment(id: impl Into<String>, tokens: &[Token], config: &TaggerConfig) -> Segment {
    let mut tagged: Vec<TokenWithTags> = tokens
        .iter()
        .map(|t| TokenWithTags::untagged(t.clone()))
        .collect();

    let normalized: Vec<String> = tokens.iter().map(|t| t.normalized()).collect();

    let mut filler_hits = 0usize;
    let mut hedging_hits = 0usize;
    let mut i = 0usize;

    while i < normalized.len() {
        if let Some(span) = match_phrase(&normalized, i, &config.hedging_phrases) {
            let phrase = normalized[i..i + span].join(" ");
            // A hedging hit tags every token the phrase spans
            for t in tagged.iter_mut().skip(i).take(span) {
                t.tags.push(
                    Tag::new(TagKind::Hedging, Severity::Low, "Hedging language").with_data(
                        TagData::Hedging {
                            phrase: phrase.clone(),
                        },
                    ),
                );
            }
            hedging_hits += 1;
            i += span;
        } else if let Some(span) = match_phrase(&normalized, i, &config.filler_words) {
            let word = normalized[i..i + span].join(" ");
            // One tag per hit, attached to the first spanned token
            tagged[i].tags.push(
                Tag::new(TagKind::Filler, Severity::Medium, "Filler word")
                    .with_data(TagData::Filler { word }),
            );
            filler_hits += 1;
            i += span;
        } else {
            i += 1;
        }
    }

    let mut segment_tags = Vec::new();

    if let Some(pace_tag) = classify_pace(tokens, config) {
        segment_tags.push(pace_tag);
    }

    if filler_hits > config.segment_filler_threshold {
        let severity = if filler_hits > config.segment_filler_high_threshold {
            Severity::High
        } else {
            Severity::Medium
        };
        segment_tags.push(Tag::new(
            TagKind::Filler,
            severity,
            format!("{filler_hits} filler words"),
        ));
    }

    if hedging_hits > config.segment_hedging_threshold {
        segment_tags.push(Tag::new(
            TagKind::Hedging,
            Severity::Medium,
            format!("{hedging_hits} hedging phrases"),
        ));
    }

    Segment::speech(id, tagged, segment_tags)
}

/// Longest-first lookahead match at position `i`; returns the span in tokens
fn match_phrase(normalized: &[String], i: usize, phrases: &[String]) -> Option<usize> {
    let mut best: Option<usize> = None;

    for phrase in phrases {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        let span = words.len();
        if span == 0 || i + span > normalized.len() {
            continue;
        }
        if best.is_some_and(|b| b >= span) {
            continue;
        }
        if words
            .iter()
            .zip(&normalized[i..i + span])
            .all(|(w, n)| *w == n)
        {
            best = Some(span);
        }
    }

    best
}

/// Classify the segment's pace into slow / fast / very_fast, or none.
///
/// The wpm bands are mutually exclusive, so a single if/else chain makes
/// double-tagging impossible. Zero-duration segments get no pace tag.
fn classify_pace(tokens: &[Token], config: &TaggerConfig) -> Option<Tag> {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return None;
    };
    let duration_sec = last.end_ms.saturating_sub(first.start_ms) as f64 / 1000.0;
    if duration_sec <= 0.0 {
        return None;
    }

    let wpm = tokens.len() as f64 / duration_sec * 60.0;

    let tag = if wpm > config.very_fast_wpm {
        Tag::new(TagKind::VeryFast, Severity::High, "Very fast pace")
    } else if wpm > config.fast_wpm {
        Tag::new(TagKind::Fast, Severity::Medium, "Fast pace")
    } else if wpm < config.slow_wpm {
        Tag::new(TagKind::Slow, Severity::Medium, "Slow pace")
    } else {
        return None;
    };

    Some(tag.with_data(TagData::Pace { wpm }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(text: &str, start_ms: u64, end_ms: u64) -> Token {
        Token {
            id: format!("t_{start_ms}"),
            conversation_id: "c".to_string(),
            start_ms,
            end_ms,
            text: text.to_string(),
        }
    }

    /// Tokens spaced to land at a conversational ~120 wpm
    fn paced(words: &[&str]) -> Vec<Token> {
        words
            .iter()
            .enumerate()
            .map(|(i, w)| tok(w, i as u64 * 500, i as u64 * 500 + 400))
            .collect()
    }

    fn tag_kinds(seg: &Segment) -> Vec<TagKind> {
        seg.tokens
            .iter()
            .flat_map(|t| t.tags.iter().map(|tag| tag.kind))
            .collect()
    }

    #[test]
    fn test_single_filler_tagged() {
        let tokens = paced(&["this", "is", "um", "fine"]);
        let seg = tag_segment("seg_0", &tokens, &TaggerConfig::default());

        assert_eq!(seg.tokens[2].tags.len(), 1);
        assert_eq!(seg.tokens[2].tags[0].kind, TagKind::Filler);
        assert_eq!(seg.tokens[2].tags[0].severity, Severity::Medium);
    }

    #[test]
    fn test_multiword_filler_one_tag_on_first_token() {
        let tokens = paced(&["you", "know", "this", "works"]);
        let seg = tag_segment("seg_0", &tokens, &TaggerConfig::default());

        assert_eq!(seg.tokens[0].tags.len(), 1);
        assert_eq!(seg.tokens[0].tags[0].kind, TagKind::Filler);
        assert!(seg.tokens[1].tags.is_empty());
    }

    #[test]
    fn test_you_alone_not_a_filler() {
        let tokens = paced(&["you", "did", "this"]);
        let seg = tag_segment("seg_0", &tokens, &TaggerConfig::default());

        assert!(tag_kinds(&seg).is_empty());
    }

    #[test]
    fn test_hedging_tags_every_spanned_token() {
        let tokens = paced(&["i", "think", "this", "works"]);
        let seg = tag_segment("seg_0", &tokens, &TaggerConfig::default());

        assert_eq!(seg.tokens[0].tags[0].kind, TagKind::Hedging);
        assert_eq!(seg.tokens[1].tags[0].kind, TagKind::Hedging);
        assert!(seg.tokens[2].tags.is_empty());
    }

    #[test]
    fn test_hedging_matching_ignores_punctuation_and_case() {
        let tokens = paced(&["Sort", "of,", "done"]);
        let seg = tag_segment("seg_0", &tokens, &TaggerConfig::default());

        assert_eq!(seg.tokens[0].tags[0].kind, TagKind::Hedging);
        assert_eq!(seg.tokens[1].tags[0].kind, TagKind::Hedging);
    }

    #[test]
    fn test_pace_normal_band_untagged() {
        // 4 tokens over 2s = 120 wpm
        let tokens = paced(&["a", "b", "c", "d"]);
        let seg = tag_segment("seg_0", &tokens, &TaggerConfig::default());

        assert!(seg.tags.is_empty());
    }

    #[test]
    fn test_pace_slow() {
        // 2 tokens over 2s = 60 wpm
        let tokens = vec![tok("a", 0, 400), tok("b", 1_600, 2_000)];
        let seg = tag_segment("seg_0", &tokens, &TaggerConfig::default());

        assert_eq!(seg.tags.len(), 1);
        assert_eq!(seg.tags[0].kind, TagKind::Slow);
        assert_eq!(seg.tags[0].severity, Severity::Medium);
    }

    #[test]
    fn test_pace_very_fast_supersedes_fast() {
        // 8 tokens over 2s = 240 wpm: only very_fast, never both
        let tokens: Vec<Token> = (0..8u64)
            .map(|i| tok("w", i * 250, i * 250 + 200))
            .collect();
        let seg = tag_segment("seg_0", &tokens, &TaggerConfig::default());

        assert_eq!(seg.tags.len(), 1);
        assert_eq!(seg.tags[0].kind, TagKind::VeryFast);
        assert_eq!(seg.tags[0].severity, Severity::High);
    }

    #[test]
    fn test_zero_duration_segment_gets_no_pace_tag() {
        let tokens = vec![tok("a", 100, 100)];
        let seg = tag_segment("seg_0", &tokens, &TaggerConfig::default());

        assert!(seg.tags.is_empty());
    }

    #[test]
    fn test_aggregate_filler_tag_thresholds() {
        let tokens = paced(&["um", "a", "uh", "b", "er", "c"]);
        let seg = tag_segment("seg_0", &tokens, &TaggerConfig::default());

        let filler_seg_tags: Vec<&Tag> = seg
            .tags
            .iter()
            .filter(|t| t.kind == TagKind::Filler)
            .collect();
        assert_eq!(filler_seg_tags.len(), 1);
        assert_eq!(filler_seg_tags[0].severity, Severity::Medium);

        let tokens = paced(&["um", "a", "uh", "b", "er", "c", "ah", "d", "uhm", "e"]);
        let seg = tag_segment("seg_1", &tokens, &TaggerConfig::default());
        let high = seg
            .tags
            .iter()
            .find(|t| t.kind == TagKind::Filler)
            .unwrap();
        assert_eq!(high.severity, Severity::High);
    }

    #[test]
    fn test_aggregate_hedging_tag() {
        let tokens = paced(&["i", "think", "it", "might", "work"]);
        let seg = tag_segment("seg_0", &tokens, &TaggerConfig::default());

        assert!(seg.tags.iter().any(|t| t.kind == TagKind::Hedging));
    }

    #[test]
    fn test_tagger_is_idempotent() {
        let tokens = paced(&["so", "i", "think", "this", "um", "works"]);
        let config = TaggerConfig::default();

        let a = tag_segment("seg_0", &tokens, &config);
        let b = tag_segment("seg_0", &tokens, &config);

        let summary = |seg: &Segment| -> Vec<(usize, TagKind, Severity)> {
            seg.tokens
                .iter()
                .enumerate()
                .flat_map(|(i, t)| t.tags.iter().map(move |tag| (i, tag.kind, tag.severity)))
                .collect()
        };

        assert_eq!(summary(&a), summary(&b));
        assert_eq!(a.tags.len(), b.tags.len());
    }
}
