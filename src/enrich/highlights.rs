use std::time::Duration;

use serde::Deserialize;

use crate::llm::{
    build_highlights_prompt, extract_json, ModelTier, TextGenerator, HIGHLIGHTS_SYSTEM_PROMPT,
};
use crate::models::{CoachingHighlight, HighlightType, Segment, SessionMetrics, Severity};

/// Maximum entries kept per list
const MAX_PER_LIST: usize = 3;

#[derive(Debug, Deserialize)]
struct ModelHighlights {
    #[serde(default)]
    strengths: Vec<ModelHighlight>,
    #[serde(default)]
    improvements: Vec<ModelHighlight>,
}

#[derive(Debug, Deserialize)]
struct ModelHighlight {
    title: String,
    detail: String,
    #[serde(default)]
    severity: Option<Severity>,
}

/// Derive coaching highlights from transcript excerpt and metrics.
///
/// Runs without the issues list as context so the three enrichment
/// branches stay mutually independent.
pub async fn derive_highlights<G: TextGenerator>(
    generator: &G,
    segments: &[Segment],
    metrics: &SessionMetrics,
    excerpt_words: usize,
    timeout: Duration,
) -> Vec<CoachingHighlight> {
    let prompt = build_highlights_prompt(segments, metrics, excerpt_words);

    let reply = super::call_model(
        generator,
        ModelTier::Quality,
        HIGHLIGHTS_SYSTEM_PROMPT,
        &prompt,
        timeout,
        "highlights",
    )
    .await;

    reply
        .and_then(|text| parse_highlights(&text))
        .unwrap_or_else(|| fallback_highlights(metrics))
}

/// Lenient parse + validation; both lists must be non-empty
fn parse_highlights(text: &str) -> Option<Vec<CoachingHighlight>> {
    let parsed: ModelHighlights = extract_json(text)?;
    if parsed.strengths.is_empty() || parsed.improvements.is_empty() {
        return None;
    }

    let convert = |list: Vec<ModelHighlight>, highlight_type: HighlightType| {
        list.into_iter()
            .take(MAX_PER_LIST)
            .filter(|h| !h.title.trim().is_empty() && !h.detail.trim().is_empty())
            .map(move |h| CoachingHighlight {
                highlight_type,
                title: h.title,
                detail: h.detail,
                severity: h.severity,
            })
    };

    let highlights: Vec<CoachingHighlight> = convert(parsed.strengths, HighlightType::Strength)
        .chain(convert(parsed.improvements, HighlightType::Improvement))
        .collect();

    let strengths = highlights
        .iter()
        .filter(|h| h.highlight_type == HighlightType::Strength)
        .count();
    if strengths == 0 || strengths == highlights.len() {
        return None;
    }

    Some(highlights)
}

/// Deterministic fallback: canned templates keyed on the pace band and
/// filler rate, padded so both lists always hold at least two entries
pub fn fallback_highlights(metrics: &SessionMetrics) -> Vec<CoachingHighlight> {
    let mut strengths = Vec::new();
    let mut improvements = Vec::new();

    if (110..=160).contains(&metrics.avg_wpm) {
        strengths.push(CoachingHighlight {
            highlight_type: HighlightType::Strength,
            title: "Steady pace".to_string(),
            detail: format!(
                "Average pace of {} wpm sat inside the conversational 110-160 band.",
                metrics.avg_wpm
            ),
            severity: None,
        });
    } else if metrics.avg_wpm > 160 {
        improvements.push(CoachingHighlight {
            highlight_type: HighlightType::Improvement,
            title: "Slow down".to_string(),
            detail: format!(
                "Average pace of {} wpm gives listeners little time to absorb each point.",
                metrics.avg_wpm
            ),
            severity: Some(if metrics.avg_wpm > 200 {
                Severity::High
            } else {
                Severity::Medium
            }),
        });
    } else if metrics.avg_wpm > 0 {
        improvements.push(CoachingHighlight {
            highlight_type: HighlightType::Improvement,
            title: "Pick up the pace".to_string(),
            detail: format!(
                "Average pace of {} wpm can read as hesitancy; aim for 110-160.",
                metrics.avg_wpm
            ),
            severity: Some(Severity::Medium),
        });
    }

    if metrics.filler_per_minute <= 3.0 {
        strengths.push(CoachingHighlight {
            highlight_type: HighlightType::Strength,
            title: "Clean delivery".to_string(),
            detail: format!(
                "Only {:.1} filler words per minute kept the message clear.",
                metrics.filler_per_minute
            ),
            severity: None,
        });
    } else {
        improvements.push(CoachingHighlight {
            highlight_type: HighlightType::Improvement,
            title: "Reduce filler words".to_string(),
            detail: format!(
                "{:.1} filler words per minute; replacing them with short pauses reads as confidence.",
                metrics.filler_per_minute
            ),
            severity: Some(if metrics.filler_per_minute > 6.0 {
                Severity::High
            } else {
                Severity::Medium
            }),
        });
    }

    // Pad with fixed generic entries so both lists hold at least two
    let generic_strengths = [
        (
            "Completed a full practice run",
            "Finishing an end-to-end rehearsal is the foundation every other improvement builds on.",
        ),
        (
            "Sustained speaking effort",
            "You kept talking through the whole session instead of stopping at rough spots.",
        ),
    ];
    for (title, detail) in generic_strengths {
        if strengths.len() >= 2 {
            break;
        }
        strengths.push(CoachingHighlight {
            highlight_type: HighlightType::Strength,
            title: title.to_string(),
            detail: detail.to_string(),
            severity: None,
        });
    }

    let generic_improvements = [
        (
            "Practice deliberate pauses",
            "Planned pauses before key points give emphasis and help control pace.",
        ),
        (
            "Vary sentence structure",
            "Mixing short punchy sentences with longer ones keeps listeners engaged.",
        ),
    ];
    for (title, detail) in generic_improvements {
        if improvements.len() >= 2 {
            break;
        }
        improvements.push(CoachingHighlight {
            highlight_type: HighlightType::Improvement,
            title: title.to_string(),
            detail: detail.to_string(),
            severity: Some(Severity::Low),
        });
    }

    strengths.into_iter().chain(improvements).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::test_support::{CannedGenerator, FailingGenerator};

    fn metrics(avg_wpm: u32, filler_per_minute: f64) -> SessionMetrics {
        SessionMetrics {
            duration_sec: 60.0,
            total_words: 100,
            avg_wpm,
            filler_count: 3,
            filler_per_minute,
            avg_heart_rate: 80,
            peak_heart_rate: 95,
            movement_score: 0.4,
            stress_speed_index: 0.0,
        }
    }

    fn count(highlights: &[CoachingHighlight], t: HighlightType) -> usize {
        highlights.iter().filter(|h| h.highlight_type == t).count()
    }

    #[tokio::test]
    async fn test_valid_reply_parsed() {
        let reply = r#"{
            "strengths": [
                {"title": "Clear opening", "detail": "The first sentence stated the goal."},
                {"title": "Good examples", "detail": "Concrete numbers backed each claim."}
            ],
            "improvements": [
                {"title": "Trim fillers", "detail": "Several ums in the middle section.", "severity": "medium"},
                {"title": "Stronger close", "detail": "The ending trailed off."}
            ]
        }"#;

        let highlights = derive_highlights(
            &CannedGenerator(reply.to_string()),
            &[],
            &metrics(130, 2.0),
            200,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(count(&highlights, HighlightType::Strength), 2);
        assert_eq!(count(&highlights, HighlightType::Improvement), 2);
        assert_eq!(highlights[2].severity, Some(Severity::Medium));
    }

    #[tokio::test]
    async fn test_failure_uses_fallback_both_lists() {
        let highlights = derive_highlights(
            &FailingGenerator,
            &[],
            &metrics(180, 5.0),
            200,
            Duration::from_secs(1),
        )
        .await;

        assert!(count(&highlights, HighlightType::Strength) >= 2);
        assert!(count(&highlights, HighlightType::Improvement) >= 2);
    }

    #[test]
    fn test_one_sided_reply_rejected() {
        let reply = r#"{"strengths": [{"title": "Nice", "detail": "Good."}], "improvements": []}"#;
        assert!(parse_highlights(reply).is_none());
    }

    #[test]
    fn test_fallback_good_session_keeps_strengths() {
        let highlights = fallback_highlights(&metrics(130, 1.5));

        let strengths: Vec<&str> = highlights
            .iter()
            .filter(|h| h.highlight_type == HighlightType::Strength)
            .map(|h| h.title.as_str())
            .collect();
        assert!(strengths.contains(&"Steady pace"));
        assert!(strengths.contains(&"Clean delivery"));
        assert!(count(&highlights, HighlightType::Improvement) >= 2);
    }

    #[test]
    fn test_fallback_fast_heavy_filler_session() {
        let highlights = fallback_highlights(&metrics(210, 7.0));

        let improvements: Vec<&CoachingHighlight> = highlights
            .iter()
            .filter(|h| h.highlight_type == HighlightType::Improvement)
            .collect();
        assert!(improvements.iter().any(|h| h.title == "Slow down"
            && h.severity == Some(Severity::High)));
        assert!(improvements
            .iter()
            .any(|h| h.title == "Reduce filler words" && h.severity == Some(Severity::High)));
        assert!(count(&highlights, HighlightType::Strength) >= 2);
    }

    #[test]
    fn test_fallback_deterministic() {
        let a = fallback_highlights(&metrics(130, 2.0));
        let b = fallback_highlights(&metrics(130, 2.0));

        let titles = |hs: &[CoachingHighlight]| -> Vec<String> {
            hs.iter().map(|h| h.title.clone()).collect()
        };
        assert_eq!(titles(&a), titles(&b));
    }
}
