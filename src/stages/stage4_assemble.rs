use crate::models::{
    AnalysisResult, CoachingHighlight, Issue, Pause, Segment, SegmentKind, SessionMetrics,
    Severity, Tag, TagData, TagKind,
};

/// Perform Stage 4: merge everything into the final `AnalysisResult`.
///
/// Interleaves the tagged speech segments with synthetic pause segments
/// in chronological order and attaches the enrichment outputs and the
/// computed metrics. This stage performs no further classification.
pub fn assemble(
    title: String,
    speech: Vec<Segment>,
    pauses: &[Pause],
    metrics: SessionMetrics,
    issues: Vec<Issue>,
    coaching_highlights: Vec<CoachingHighlight>,
) -> AnalysisResult {
    let mut segments: Vec<Segment> = speech;
    segments.extend(
        pauses
            .iter()
            .enumerate()
            .map(|(i, p)| pause_segment(i, p)),
    );
    segments.sort_by_key(|s| (s.start_ms, s.end_ms));

    AnalysisResult {
        title,
        segments,
        metrics,
        issues,
        coaching_highlights,
    }
}

fn pause_segment(index: usize, pause: &Pause) -> Segment {
    let seconds = pause.duration_ms as f64 / 1000.0;
    let tag = Tag::new(TagKind::Pause, Severity::Low, format!("{seconds:.1}s pause"))
        .with_data(TagData::Pause {
            duration_ms: pause.duration_ms,
        });

    Segment {
        id: format!("pause_{index}"),
        start_ms: pause.start_ms,
        end_ms: pause.end_ms,
        kind: SegmentKind::Pause,
        text: format!("Pause ({seconds:.1}s)"),
        tokens: vec![],
        tags: vec![tag],
    }
}
