pub mod highlights;
pub mod issues;
pub mod title;

pub use highlights::*;
pub use issues::*;
pub use title::*;

use std::time::Duration;

use tracing::warn;

use crate::llm::{ModelTier, TextGenerator};
use crate::models::{CoachingHighlight, Issue, Segment, SessionMetrics};

/// Configuration for the enrichment fan-out
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Independent per-call timeout; expiry falls back locally
    pub timeout: Duration,
    /// Words of transcript fed to the title derivation
    pub title_excerpt_words: usize,
    /// Words of transcript fed to the highlights derivation
    pub highlights_excerpt_words: usize,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            title_excerpt_words: 100,
            highlights_excerpt_words: 200,
        }
    }
}

/// Combined output of the three derivations; always complete
#[derive(Debug, Clone)]
pub struct Enrichment {
    pub title: String,
    pub issues: Vec<Issue>,
    pub highlights: Vec<CoachingHighlight>,
}

/// Run the three enrichment derivations concurrently.
///
/// Issues, title and highlights are mutually independent: they read the
/// same immutable segment/metrics snapshot, are dispatched together and
/// awaited jointly, and each collapses its own failure (transport error,
/// timeout, or unparseable output) to a deterministic local fallback.
/// One derivation failing never blocks or fails the other two, and no
/// branch error type escapes the join.
pub async fn enrich<G: TextGenerator + Sync>(
    generator: &G,
    segments: &[Segment],
    metrics: &SessionMetrics,
    config: &EnrichConfig,
) -> Enrichment {
    let (issues, title, highlights) = tokio::join!(
        derive_issues(generator, segments, metrics, config.timeout),
        derive_title(generator, segments, config.title_excerpt_words, config.timeout),
        derive_highlights(
            generator,
            segments,
            metrics,
            config.highlights_excerpt_words,
            config.timeout
        ),
    );

    Enrichment {
        title,
        issues,
        highlights,
    }
}

/// Produce the enrichment outputs from the local fallbacks alone,
/// without touching the network
pub fn enrich_offline(segments: &[Segment], metrics: &SessionMetrics) -> Enrichment {
    Enrichment {
        title: fallback_title(),
        issues: fallback_issues(segments, metrics),
        highlights: fallback_highlights(metrics),
    }
}

/// One model call with its own timeout; `None` covers transport errors
/// and timeouts alike, so callers fall back without retrying
pub(crate) async fn call_model<G: TextGenerator>(
    generator: &G,
    tier: ModelTier,
    system: &str,
    user: &str,
    timeout: Duration,
    derivation: &str,
) -> Option<String> {
    match tokio::time::timeout(timeout, generator.generate(tier, system, user)).await {
        Ok(Ok(text)) => Some(text),
        Ok(Err(e)) => {
            warn!("{} derivation failed, using fallback: {}", derivation, e);
            None
        }
        Err(_) => {
            warn!("{} derivation timed out, using fallback", derivation);
            None
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::{Severity, Tag, TagKind, Token, TokenWithTags};

    fn speech_segment(id: &str, filler_tags: usize) -> Segment {
        let tokens = (0..5u64)
            .map(|i| {
                let mut t = TokenWithTags::untagged(Token {
                    id: format!("{id}_{i}"),
                    conversation_id: "c".to_string(),
                    start_ms: i * 500,
                    end_ms: i * 500 + 400,
                    text: "word".to_string(),
                });
                if (i as usize) < filler_tags {
                    t.tags
                        .push(Tag::new(TagKind::Filler, Severity::Medium, "Filler word"));
                }
                t
            })
            .collect();
        Segment::speech(id, tokens, vec![])
    }

    fn heavy_filler_metrics() -> SessionMetrics {
        SessionMetrics {
            duration_sec: 60.0,
            total_words: 100,
            avg_wpm: 100,
            filler_count: 5,
            filler_per_minute: 5.0,
            avg_heart_rate: 80,
            peak_heart_rate: 95,
            movement_score: 0.4,
            stress_speed_index: 0.0,
        }
    }

    #[tokio::test]
    async fn test_all_three_outputs_present_when_every_call_fails() {
        let segments = vec![speech_segment("seg_0", 5)];
        let metrics = heavy_filler_metrics();

        let enrichment = enrich(
            &FailingGenerator,
            &segments,
            &metrics,
            &EnrichConfig::default(),
        )
        .await;

        assert!(!enrichment.title.is_empty());
        assert!(!enrichment.issues.is_empty());
        assert!(enrichment.highlights.len() >= 4);
    }

    #[tokio::test]
    async fn test_one_branch_garbage_does_not_poison_others() {
        // Canned reply parses as a valid title but as neither issues
        // nor highlights, so those two fall back while title succeeds
        let generator = CannedGenerator(r#"{"title": "Budget Review Talk"}"#.to_string());
        let segments = vec![speech_segment("seg_0", 5)];
        let metrics = heavy_filler_metrics();

        let enrichment =
            enrich(&generator, &segments, &metrics, &EnrichConfig::default()).await;

        assert_eq!(enrichment.title, "Budget Review Talk");
        assert!(!enrichment.issues.is_empty());
        assert!(enrichment.highlights.len() >= 4);
    }

    #[test]
    fn test_offline_enrichment_is_complete() {
        let segments = vec![speech_segment("seg_0", 5)];
        let metrics = heavy_filler_metrics();

        let enrichment = enrich_offline(&segments, &metrics);

        assert_eq!(enrichment.title, "Speaking Practice Session");
        assert!(!enrichment.issues.is_empty());
        assert!(enrichment.highlights.len() >= 4);
    }
}
