use rand::Rng;

use crate::models::{Segment, SessionMetrics, TagKind};

/// Externally measured biometrics for the session.
///
/// The reference system fabricated these; real sensing is out of scope,
/// so callers supply measured values when they have them and the
/// calculator only synthesizes placeholders when they don't.
#[derive(Debug, Clone, Copy)]
pub struct BiometricsInput {
    pub avg_heart_rate: u32,
    pub peak_heart_rate: u32,
    pub movement_score: f64,
}

/// Compute session-level metrics over the tagged speech segments.
///
/// `avg_wpm` divides by speaking time (sum of segment durations) while
/// `filler_per_minute` divides by wall-clock duration. The two
/// denominators are deliberately different and must not be unified.
/// Every division short-circuits to 0 on a zero denominator.
pub fn compute_metrics(segments: &[Segment], biometrics: Option<BiometricsInput>) -> SessionMetrics {
    let total_words: usize = segments.iter().map(|s| s.word_count()).sum();

    let duration_sec = match (segments.first(), segments.last()) {
        (Some(first), Some(last)) => last.end_ms.saturating_sub(first.start_ms) as f64 / 1000.0,
        _ => 0.0,
    };

    let speaking_sec: f64 = segments.iter().map(|s| s.duration_sec()).sum();
    let avg_wpm = if speaking_sec > 0.0 {
        (total_words as f64 / speaking_sec * 60.0).round() as u32
    } else {
        0
    };

    let filler_count: usize = segments
        .iter()
        .flat_map(|s| &s.tokens)
        .flat_map(|t| &t.tags)
        .filter(|tag| tag.kind == TagKind::Filler)
        .count();

    let filler_per_minute = if duration_sec > 0.0 {
        round_to(filler_count as f64 / duration_sec * 60.0, 1)
    } else {
        0.0
    };

    let fast_segments = segments
        .iter()
        .filter(|s| {
            s.tags
                .iter()
                .any(|t| matches!(t.kind, TagKind::Fast | TagKind::VeryFast))
        })
        .count();
    let stress_speed_index = if segments.is_empty() {
        0.0
    } else {
        round_to(fast_segments as f64 / segments.len() as f64, 2)
    };

    let biometrics = biometrics.unwrap_or_else(placeholder_biometrics);

    SessionMetrics {
        duration_sec,
        total_words,
        avg_wpm,
        filler_count,
        filler_per_minute,
        avg_heart_rate: biometrics.avg_heart_rate,
        peak_heart_rate: biometrics.peak_heart_rate,
        movement_score: biometrics.movement_score,
        stress_speed_index,
    }
}

/// Synthesized placeholder values from fixed ranges. Known gap carried
/// over from the reference system, used only when the caller supplies
/// no measured biometrics.
fn placeholder_biometrics() -> BiometricsInput {
    let mut rng = rand::thread_rng();
    let avg_heart_rate = rng.gen_range(72..=88);
    BiometricsInput {
        avg_heart_rate,
        peak_heart_rate: avg_heart_rate + rng.gen_range(8..=20),
        movement_score: round_to(rng.gen_range(0.20..=0.60), 2),
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
