use std::time::Duration;

use serde::Deserialize;

use crate::llm::{
    build_issues_prompt, extract_json, ModelTier, SessionCounts, TextGenerator,
    ISSUES_SYSTEM_PROMPT,
};
use crate::models::{Issue, Segment, SessionMetrics, Severity, TagKind};

/// Maximum issues kept from the model
const MAX_ISSUES: usize = 5;

/// Issue object as the model is asked to emit it
#[derive(Debug, Deserialize)]
struct ModelIssue {
    kind: String,
    severity: Severity,
    message: String,
    #[serde(default)]
    segment_indices: Vec<usize>,
}

/// Derive the ranked issue list, falling back to the deterministic
/// metric-driven list on call failure, timeout, or unparseable output
pub async fn derive_issues<G: TextGenerator>(
    generator: &G,
    segments: &[Segment],
    metrics: &SessionMetrics,
    timeout: Duration,
) -> Vec<Issue> {
    let counts = SessionCounts::from_segments(segments);
    let prompt = build_issues_prompt(&counts, metrics);

    let reply = super::call_model(
        generator,
        ModelTier::Fast,
        ISSUES_SYSTEM_PROMPT,
        &prompt,
        timeout,
        "issues",
    )
    .await;

    reply
        .and_then(|text| parse_issues(&text, segments))
        .unwrap_or_else(|| fallback_issues(segments, metrics))
}

/// Lenient parse + validation; `None` triggers the fallback
fn parse_issues(text: &str, segments: &[Segment]) -> Option<Vec<Issue>> {
    let model_issues: Vec<ModelIssue> = extract_json(text)?;
    if model_issues.is_empty() {
        return None;
    }

    let issues: Vec<Issue> = model_issues
        .into_iter()
        .take(MAX_ISSUES)
        .map(|mi| {
            // Translate segment indices to ids, dropping out-of-range ones
            let segment_ids = mi
                .segment_indices
                .iter()
                .filter_map(|&i| segments.get(i))
                .map(|s| s.id.clone())
                .collect();
            Issue::new(mi.kind, mi.severity, mi.message, segment_ids)
        })
        .filter(|i| !i.message.is_empty())
        .collect();

    if issues.is_empty() {
        None
    } else {
        Some(issues)
    }
}

/// Deterministic fallback derived purely from metrics and segment tags.
/// Non-empty whenever filler rate or pace is outside the healthy bands.
pub fn fallback_issues(
    segments: &[Segment],
    metrics: &SessionMetrics,
) -> Vec<Issue> {
    let mut issues = Vec::new();

    let ids_with = |kinds: &[TagKind]| -> Vec<String> {
        segments
            .iter()
            .filter(|s| s.tags.iter().any(|t| kinds.contains(&t.kind)))
            .map(|s| s.id.clone())
            .collect()
    };

    if metrics.filler_per_minute > 3.0 {
        let severity = if metrics.filler_per_minute > 6.0 {
            Severity::High
        } else {
            Severity::Medium
        };
        issues.push(Issue::new(
            "filler",
            severity,
            format!(
                "{} filler words ({:.1} per minute) interrupted the flow of the speech.",
                metrics.filler_count, metrics.filler_per_minute
            ),
            ids_with(&[TagKind::Filler]),
        ));
    }

    if metrics.avg_wpm > 160 {
        let severity = if metrics.avg_wpm > 200 {
            Severity::High
        } else {
            Severity::Medium
        };
        issues.push(Issue::new(
            "pace",
            severity,
            format!(
                "Average pace of {} wpm is above the conversational 110-160 band.",
                metrics.avg_wpm
            ),
            ids_with(&[TagKind::Fast, TagKind::VeryFast]),
        ));
    } else if metrics.avg_wpm > 0 && metrics.avg_wpm < 110 {
        issues.push(Issue::new(
            "pace",
            Severity::Medium,
            format!(
                "Average pace of {} wpm is below the conversational 110-160 band.",
                metrics.avg_wpm
            ),
            ids_with(&[TagKind::Slow]),
        ));
    }

    let hedged = ids_with(&[TagKind::Hedging]);
    if !hedged.is_empty() {
        issues.push(Issue::new(
            "hedging",
            Severity::Medium,
            "Hedging language weakened the assertiveness of several statements.",
            hedged,
        ));
    }

    // Ranked: most severe first, insertion order breaks ties
    issues.sort_by(|a, b| b.severity.cmp(&a.severity));
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::test_support::{CannedGenerator, FailingGenerator};
    use crate::models::{SessionMetrics, Tag, Token, TokenWithTags};

    fn seg(id: &str, tags: Vec<Tag>) -> Segment {
        Segment::speech(
            id,
            vec![TokenWithTags::untagged(Token {
                id: format!("{id}_t"),
                conversation_id: "c".to_string(),
                start_ms: 0,
                end_ms: 400,
                text: "word".to_string(),
            })],
            tags,
        )
    }

    fn metrics(avg_wpm: u32, filler_per_minute: f64) -> SessionMetrics {
        SessionMetrics {
            duration_sec: 60.0,
            total_words: 100,
            avg_wpm,
            filler_count: (filler_per_minute as usize).max(1),
            filler_per_minute,
            avg_heart_rate: 80,
            peak_heart_rate: 95,
            movement_score: 0.4,
            stress_speed_index: 0.0,
        }
    }

    #[tokio::test]
    async fn test_forced_failure_yields_nonempty_fallback() {
        let segments = vec![seg("seg_0", vec![])];
        let m = metrics(130, 4.5);

        let issues = derive_issues(
            &FailingGenerator,
            &segments,
            &m,
            Duration::from_secs(1),
        )
        .await;

        assert!(!issues.is_empty());
        assert_eq!(issues[0].kind, "filler");
    }

    #[tokio::test]
    async fn test_model_indices_translated_to_segment_ids() {
        let reply = r#"Here you go:
[
  {"kind": "pace", "severity": "high", "message": "Slow down.", "segment_indices": [1, 9]},
  {"kind": "filler", "severity": "medium", "message": "Trim fillers.", "segment_indices": [0]}
]"#;
        let segments = vec![seg("seg_0", vec![]), seg("seg_1", vec![])];
        let m = metrics(130, 1.0);

        let issues = derive_issues(
            &CannedGenerator(reply.to_string()),
            &segments,
            &m,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(issues.len(), 2);
        // Index 9 is out of range and dropped; index 1 maps to seg_1
        assert_eq!(issues[0].segment_ids, vec!["seg_1"]);
        assert_eq!(issues[1].segment_ids, vec!["seg_0"]);
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back() {
        let segments = vec![seg("seg_0", vec![])];
        let m = metrics(220, 1.0);

        let issues = derive_issues(
            &CannedGenerator("I could not produce JSON, sorry.".to_string()),
            &segments,
            &m,
            Duration::from_secs(1),
        )
        .await;

        assert!(!issues.is_empty());
        assert_eq!(issues[0].kind, "pace");
        assert_eq!(issues[0].severity, Severity::High);
    }

    #[test]
    fn test_fallback_empty_when_metrics_healthy() {
        let segments = vec![seg("seg_0", vec![])];
        let issues = fallback_issues(&segments, &metrics(130, 1.0));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_fallback_slow_pace_and_hedging() {
        let hedged = seg(
            "seg_0",
            vec![Tag::new(
                TagKind::Hedging,
                Severity::Medium,
                "2 hedging phrases",
            )],
        );
        let issues = fallback_issues(std::slice::from_ref(&hedged), &metrics(90, 1.0));

        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|i| i.kind == "pace"));
        let hedging = issues.iter().find(|i| i.kind == "hedging").unwrap();
        assert_eq!(hedging.segment_ids, vec!["seg_0"]);
    }

    #[test]
    fn test_fallback_ranked_by_severity() {
        let segments = vec![seg("seg_0", vec![])];
        // Medium filler issue plus high pace issue: pace must rank first
        let issues = fallback_issues(&segments, &metrics(210, 4.0));

        assert_eq!(issues[0].kind, "pace");
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[1].kind, "filler");
    }
}
