use crate::models::{Segment, SegmentKind, SessionMetrics, TagKind};

/// System prompt for the issues derivation
pub const ISSUES_SYSTEM_PROMPT: &str = r#"You are a public speaking coach reviewing one practice session. You MUST follow these rules:

1. Respond with a JSON array and nothing else.
2. The array contains 2 to 5 issue objects, most important first.
3. Each object has exactly these fields:
   - "kind": short snake_case label (e.g. "filler", "pace", "hedging", "structure")
   - "severity": one of "low", "medium", "high"
   - "message": one concrete, actionable sentence
   - "segment_indices": array of integers referencing the numbered segments
4. Reference only segment indices that appear in the input.
5. Do not invent problems the numbers do not support."#;

/// System prompt for the title derivation
pub const TITLE_SYSTEM_PROMPT: &str = r#"You title practice speech recordings. Respond with a JSON object and nothing else: {"title": "..."}. The title is 3 to 5 words, describes the topic of the speech, and contains no quotes or filler words."#;

/// System prompt for the coaching highlights derivation
pub const HIGHLIGHTS_SYSTEM_PROMPT: &str = r#"You are a supportive public speaking coach. Respond with a JSON object and nothing else:

{"strengths": [{"title": "...", "detail": "..."}], "improvements": [{"title": "...", "detail": "...", "severity": "low|medium|high"}]}

Rules:
1. 2 to 3 strengths and 2 to 3 improvements.
2. "title" is 2-5 words; "detail" is one specific sentence grounded in the transcript or metrics.
3. Be encouraging but honest; never fabricate content that is not in the input."#;

/// Aggregate counts fed to the issues derivation
#[derive(Debug, Clone, Copy)]
pub struct SessionCounts {
    pub segment_count: usize,
    pub filler_count: usize,
    pub fast_segments: usize,
    pub slow_segments: usize,
    pub hedging_segments: usize,
}

impl SessionCounts {
    /// Summarize the tagged speech segments for the issues prompt
    pub fn from_segments(segments: &[Segment]) -> Self {
        let has = |seg: &Segment, kinds: &[TagKind]| {
            seg.tags.iter().any(|t| kinds.contains(&t.kind))
        };

        Self {
            segment_count: segments.len(),
            filler_count: segments
                .iter()
                .flat_map(|s| &s.tokens)
                .flat_map(|t| &t.tags)
                .filter(|t| t.kind == TagKind::Filler)
                .count(),
            fast_segments: segments
                .iter()
                .filter(|s| has(s, &[TagKind::Fast, TagKind::VeryFast]))
                .count(),
            slow_segments: segments.iter().filter(|s| has(s, &[TagKind::Slow])).count(),
            hedging_segments: segments
                .iter()
                .filter(|s| has(s, &[TagKind::Hedging]))
                .count(),
        }
    }
}

/// Build the user prompt for the issues derivation
pub fn build_issues_prompt(counts: &SessionCounts, metrics: &SessionMetrics) -> String {
    let mut prompt = String::new();

    prompt.push_str("# Session summary\n");
    prompt.push_str(&format!("Speech segments: {}\n", counts.segment_count));
    prompt.push_str(&format!(
        "Duration: {:.0}s, {} words, average {} wpm\n",
        metrics.duration_sec, metrics.total_words, metrics.avg_wpm
    ));
    prompt.push_str(&format!(
        "Filler words: {} ({:.1} per minute)\n",
        counts.filler_count, metrics.filler_per_minute
    ));
    prompt.push_str(&format!(
        "Segments too fast: {}, too slow: {}, with hedging: {}\n\n",
        counts.fast_segments, counts.slow_segments, counts.hedging_segments
    ));
    prompt.push_str(&format!(
        "Segments are numbered 0 to {}.\n",
        counts.segment_count.saturating_sub(1)
    ));
    prompt.push_str("List the 2-5 most important issues for this speaker.\n");

    prompt
}

/// Build the user prompt for the title derivation
pub fn build_title_prompt(segments: &[Segment], max_words: usize) -> String {
    format!(
        "Opening of the transcript:\n\n{}\n\nTitle this speech.",
        transcript_excerpt(segments, max_words)
    )
}

/// Build the user prompt for the coaching highlights derivation
pub fn build_highlights_prompt(
    segments: &[Segment],
    metrics: &SessionMetrics,
    max_words: usize,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("# Transcript excerpt\n");
    prompt.push_str(&transcript_excerpt(segments, max_words));
    prompt.push_str("\n\n# Metrics\n");
    prompt.push_str(&format!(
        "Duration {:.0}s, {} words, {} wpm average, {} fillers ({:.1}/min), stress-speed index {:.2}\n\n",
        metrics.duration_sec,
        metrics.total_words,
        metrics.avg_wpm,
        metrics.filler_count,
        metrics.filler_per_minute,
        metrics.stress_speed_index
    ));
    prompt.push_str("Give coaching highlights for this session.\n");

    prompt
}

/// First `max_words` words of the spoken transcript
pub fn transcript_excerpt(segments: &[Segment], max_words: usize) -> String {
    segments
        .iter()
        .filter(|s| s.kind == SegmentKind::Speech)
        .flat_map(|s| s.tokens.iter())
        .take(max_words)
        .map(|t| t.token.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
