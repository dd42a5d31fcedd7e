pub mod enrich;
pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod stages;

pub use enrich::{enrich, enrich_offline, EnrichConfig, Enrichment};
pub use error::AnalysisError;
pub use io::{parse_tokens_file, parse_tokens_json, write_document, CoachingReport};
pub use llm::{AnthropicClient, GenerationConfig, ModelTier, TextGenerator};
pub use models::{
    AnalysisDocument, AnalysisResult, CoachingHighlight, Issue, Segment, SessionMetrics, Tag,
    Token, TokenWithTags,
};
pub use pipeline::{run_analysis, run_analysis_offline, PipelineConfig};
pub use stages::{BiometricsInput, PunctuateConfig, SegmenterConfig, TaggerConfig};
