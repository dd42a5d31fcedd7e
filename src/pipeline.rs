use std::collections::HashSet;

use tracing::info;

use crate::enrich::{enrich, enrich_offline, EnrichConfig, Enrichment};
use crate::error::AnalysisError;
use crate::llm::TextGenerator;
use crate::models::{AnalysisResult, Pause, Segment, SessionMetrics, Token};
use crate::stages::{
    assemble, compute_metrics, punctuate, segment, tag_segment, BiometricsInput, PunctuateConfig,
    SegmentationResult, SegmenterConfig, TaggerConfig,
};

/// Configuration for one analysis run
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub punctuate: PunctuateConfig,
    pub segmenter: SegmenterConfig,
    pub tagger: TaggerConfig,
    pub enrich: EnrichConfig,
}

/// Everything computed before enrichment; pure and synchronous
#[derive(Debug, Clone)]
pub struct LocalAnalysis {
    pub segments: Vec<Segment>,
    pub pauses: Vec<Pause>,
    pub metrics: SessionMetrics,
}

/// Run the synchronous local stages: punctuate, segment, tag, metrics
pub fn analyze_local(
    tokens: &[Token],
    biometrics: Option<BiometricsInput>,
    config: &PipelineConfig,
) -> Result<LocalAnalysis, AnalysisError> {
    if tokens.is_empty() {
        return Err(AnalysisError::EmptyTranscript);
    }
    for pair in tokens.windows(2) {
        if pair[1].start_ms < pair[0].start_ms {
            return Err(AnalysisError::MalformedInput(
                "tokens are not ordered by start_ms".to_string(),
            ));
        }
    }

    let punctuated = punctuate(tokens, &config.punctuate);

    let SegmentationResult { segments, pauses } = segment(&punctuated, &config.segmenter);
    info!(
        "Segmented into {} speech segments, {} pauses",
        segments.len(),
        pauses.len()
    );

    let mut tagged: Vec<Segment> = segments
        .iter()
        .enumerate()
        .map(|(i, tokens)| tag_segment(format!("seg_{i}"), tokens, &config.tagger))
        .collect();
    close_sentence_seams(&mut tagged, &pauses);

    let metrics = compute_metrics(&tagged, biometrics);
    info!(
        "Metrics: {} words, {} wpm, {} fillers ({:.1}/min)",
        metrics.total_words, metrics.avg_wpm, metrics.filler_count, metrics.filler_per_minute
    );

    Ok(LocalAnalysis {
        segments: tagged,
        pauses,
        metrics,
    })
}

/// Run the full analysis: local stages, then the concurrent enrichment
/// fan-out, then final assembly
pub async fn run_analysis<G: TextGenerator + Sync>(
    tokens: &[Token],
    biometrics: Option<BiometricsInput>,
    config: &PipelineConfig,
    generator: &G,
) -> Result<AnalysisResult, AnalysisError> {
    let local = analyze_local(tokens, biometrics, config)?;

    let enrichment = enrich(generator, &local.segments, &local.metrics, &config.enrich).await;

    Ok(finish(local, enrichment))
}

/// Run the full analysis without touching the network: enrichment comes
/// from the deterministic local fallbacks
pub fn run_analysis_offline(
    tokens: &[Token],
    biometrics: Option<BiometricsInput>,
    config: &PipelineConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let local = analyze_local(tokens, biometrics, config)?;
    let enrichment = enrich_offline(&local.segments, &local.metrics);
    Ok(finish(local, enrichment))
}

/// A sentence split inside one block records no pause, so the two
/// sub-segments must abut. Extend the earlier one across the seam's
/// inter-token gap; pause seams (identified by a recorded pause
/// starting at the segment's end) are left for assembly to fill.
fn close_sentence_seams(segments: &mut [Segment], pauses: &[Pause]) {
    let pause_starts: HashSet<u64> = pauses.iter().map(|p| p.start_ms).collect();
    for i in 1..segments.len() {
        let next_start = segments[i].start_ms;
        let prev = &mut segments[i - 1];
        if prev.end_ms < next_start && !pause_starts.contains(&prev.end_ms) {
            prev.end_ms = next_start;
        }
    }
}

fn finish(local: LocalAnalysis, enrichment: Enrichment) -> AnalysisResult {
    assemble(
        enrichment.title,
        local.segments,
        &local.pauses,
        local.metrics,
        enrichment.issues,
        enrichment.highlights,
    )
}
