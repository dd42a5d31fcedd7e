use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::AnalysisError;
use crate::models::{AnalysisDocument, HighlightType, SegmentKind};

/// Write the analysis document to the result sink.
///
/// Overwrite semantics, no append; a write failure is fatal to the run
/// with no partial commit.
pub fn write_document(doc: &AnalysisDocument, path: &Path) -> Result<(), AnalysisError> {
    let json = serde_json::to_string_pretty(doc).map_err(|e| AnalysisError::Sink {
        path: path.to_path_buf(),
        source: std::io::Error::other(e),
    })?;

    std::fs::write(path, json).map_err(|e| AnalysisError::Sink {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Human-readable coaching report
pub struct CoachingReport<'a> {
    doc: &'a AnalysisDocument,
}

impl<'a> CoachingReport<'a> {
    pub fn new(doc: &'a AnalysisDocument) -> Self {
        Self { doc }
    }

    /// Format the full report as text
    pub fn format(&self) -> String {
        let result = &self.doc.result;
        let mut output = String::new();

        output.push_str(&format!("{}\n", result.title));
        output.push_str(&format!("{}\n\n", "=".repeat(result.title.len())));

        let m = &result.metrics;
        output.push_str("Metrics\n-------\n");
        output.push_str(&format!(
            "Duration: {:.1}s | Words: {} | Pace: {} wpm\n",
            m.duration_sec, m.total_words, m.avg_wpm
        ));
        output.push_str(&format!(
            "Fillers: {} ({:.1}/min) | Stress-speed index: {:.2}\n",
            m.filler_count, m.filler_per_minute, m.stress_speed_index
        ));
        output.push_str(&format!(
            "Heart rate: {} avg / {} peak | Movement: {:.2}\n\n",
            m.avg_heart_rate, m.peak_heart_rate, m.movement_score
        ));

        output.push_str("Timeline\n--------\n");
        for segment in &result.segments {
            let stamp = format_timestamp(segment.start_ms);
            match segment.kind {
                SegmentKind::Pause => {
                    output.push_str(&format!("[{stamp}] -- {} --\n", segment.text));
                }
                SegmentKind::Speech => {
                    let marks = if segment.tags.is_empty() {
                        String::new()
                    } else {
                        let labels: Vec<&str> =
                            segment.tags.iter().map(|t| t.label.as_str()).collect();
                        format!("  ({})", labels.join(", "))
                    };
                    output.push_str(&format!("[{stamp}]{marks}\n"));
                    output.push_str(&wrap_text(&segment.text, 80));
                    output.push('\n');
                }
            }
        }

        if !result.issues.is_empty() {
            output.push_str("\nIssues\n------\n");
            for issue in &result.issues {
                output.push_str(&format!(
                    "- [{:?}] {}: {}\n",
                    issue.severity, issue.kind, issue.message
                ));
            }
        }

        let (strengths, improvements): (Vec<_>, Vec<_>) = result
            .coaching_highlights
            .iter()
            .partition(|h| h.highlight_type == HighlightType::Strength);

        output.push_str("\nStrengths\n---------\n");
        for h in strengths {
            output.push_str(&format!("- {}: {}\n", h.title, h.detail));
        }
        output.push_str("\nImprovements\n------------\n");
        for h in improvements {
            output.push_str(&format!("- {}: {}\n", h.title, h.detail));
        }

        output
    }

    /// Write the report to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

/// Format milliseconds as MM:SS.mmm
fn format_timestamp(ms: u64) -> String {
    let seconds = ms / 1000;
    let millis = ms % 1000;
    let minutes = seconds / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}.{:03}", minutes, secs, millis)
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        if line_len + word.len() + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word.len();
    }

    result
}
