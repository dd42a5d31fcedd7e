use tracing::debug;

use crate::models::{Pause, Token};

/// Configuration for Stage 1 segmentation
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Pause threshold while the running segment is still short
    pub pause_threshold_ms: u64,
    /// Tightened pause threshold once the segment has grown long
    pub tightened_threshold_ms: u64,
    /// Running duration at which the tightened threshold kicks in
    pub tighten_after_ms: u64,
    /// Hard cap on a speech block's duration
    pub max_block_ms: u64,
    /// Blocks below this token count are never sentence-split
    pub min_tokens_for_sentence_split: usize,
    /// Blocks with this many terminators or fewer are never sentence-split
    pub max_terminators_unsplit: usize,
    /// Maximum sentences per output segment
    pub max_sentences_per_segment: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            pause_threshold_ms: 2_000,
            tightened_threshold_ms: 1_000,
            tighten_after_ms: 20_000,
            max_block_ms: 25_000,
            min_tokens_for_sentence_split: 15,
            max_terminators_unsplit: 2,
            max_sentences_per_segment: 4,
        }
    }
}

/// Result of Stage 1 segmentation
#[derive(Debug, Clone)]
pub struct SegmentationResult {
    /// Ordered token runs, one per output speech segment
    pub segments: Vec<Vec<Token>>,
    /// Detected pauses, one between each pair of adjacent speech blocks
    pub pauses: Vec<Pause>,
}

/// Perform Stage 1: split the punctuated token stream into speech
/// segments separated by detected pauses.
///
/// Pass A walks the tokens accumulating a current block. The pause
/// threshold is adaptive: it drops from 2000ms to 1000ms once the block
/// has run 20s, and a 25s hard cap forces a split with a synthetic
/// zero-duration pause when no natural gap occurred. Pass B then splits
/// each block at sentence terminators, at most 4 sentences per segment.
pub fn segment(tokens: &[Token], config: &SegmenterConfig) -> SegmentationResult {
    let (blocks, pauses) = split_at_pauses(tokens, config);

    let mut segments = Vec::new();
    for block in &blocks {
        segments.extend(split_sentences(block, config));
    }

    debug!(
        "Segmented {} tokens into {} blocks, {} segments, {} pauses",
        tokens.len(),
        blocks.len(),
        segments.len(),
        pauses.len()
    );

    SegmentationResult { segments, pauses }
}

/// Pass A: pause/duration segmentation
fn split_at_pauses(tokens: &[Token], config: &SegmenterConfig) -> (Vec<Vec<Token>>, Vec<Pause>) {
    let mut blocks: Vec<Vec<Token>> = Vec::new();
    let mut pauses: Vec<Pause> = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut block_start_ms = 0u64;

    for (i, token) in tokens.iter().enumerate() {
        if current.is_empty() {
            block_start_ms = token.start_ms;
        }
        current.push(token.clone());

        let Some(next) = tokens.get(i + 1) else {
            continue;
        };

        let running_ms = token.end_ms.saturating_sub(block_start_ms);
        let threshold = if running_ms < config.tighten_after_ms {
            config.pause_threshold_ms
        } else {
            config.tightened_threshold_ms
        };
        let gap = next.start_ms.saturating_sub(token.end_ms);

        // Hard cap with no natural pause still records a marker over the
        // (near-zero) inter-token gap, so assembly can place a boundary
        // and segments keep tiling the timeline
        if gap >= threshold || running_ms >= config.max_block_ms {
            blocks.push(std::mem::take(&mut current));
            pauses.push(Pause::new(token.end_ms, next.start_ms));
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    (blocks, pauses)
}

/// Pass B: sentence segmentation within one block
fn split_sentences(block: &[Token], config: &SegmenterConfig) -> Vec<Vec<Token>> {
    let terminators = block
        .iter()
        .filter(|t| t.has_terminal_punctuation())
        .count();

    if block.len() < config.min_tokens_for_sentence_split
        || terminators <= config.max_terminators_unsplit
    {
        return vec![block.to_vec()];
    }

    let mut segments = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut sentences = 0usize;

    for token in block {
        let is_terminator = token.has_terminal_punctuation();
        current.push(token.clone());

        if is_terminator {
            sentences += 1;
            if sentences >= config.max_sentences_per_segment {
                segments.push(std::mem::take(&mut current));
                sentences = 0;
            }
        }
    }

    // Final partial segment kept even if short
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}
