use std::path::PathBuf;

/// Fatal analysis errors.
///
/// Enrichment failures never appear here: those are recovered per-branch
/// with deterministic fallbacks, so every successful run terminates with
/// a complete `AnalysisResult`.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Nothing to segment
    #[error("conversation has no tokens")]
    EmptyTranscript,

    /// Token rows that cannot form a valid ordered stream
    #[error("malformed token input: {0}")]
    MalformedInput(String),

    /// Persistence write failure; no partial commit
    #[error("failed to write analysis result to {path:?}")]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
