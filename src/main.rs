use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use podium::{
    io::conversation_id, parse_tokens_file, run_analysis, run_analysis_offline, write_document,
    AnalysisDocument, AnthropicClient, CoachingReport, GenerationConfig, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "podium")]
#[command(author, version, about = "Speech coaching analysis pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a recording's token stream into a coaching result
    Analyze {
        /// Input token rows (JSON array)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the analysis document (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for the human-readable coaching report (text)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Skip the language model; title, issues and highlights come
        /// from the deterministic fallbacks
        #[arg(long)]
        offline: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print segmentation, tags and metrics without enrichment
    Inspect {
        /// Input token rows (JSON array)
        #[arg(short, long)]
        input: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            output,
            report,
            offline,
            verbose,
        } => {
            setup_logging(verbose);
            analyze(input, output, report, offline).await
        }
        Commands::Inspect { input, verbose } => {
            setup_logging(verbose);
            inspect(input)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn analyze(
    input: PathBuf,
    output: PathBuf,
    report: Option<PathBuf>,
    offline: bool,
) -> Result<()> {
    info!("Loading tokens from {:?}", input);
    let tokens = parse_tokens_file(&input).context("Failed to parse input tokens")?;
    info!("Loaded {} tokens", tokens.len());

    let conversation = conversation_id(&tokens).unwrap_or("unknown").to_string();
    let config = PipelineConfig::default();

    let result = if offline {
        info!("Running offline (deterministic fallbacks only)");
        run_analysis_offline(&tokens, None, &config)?
    } else {
        let client = AnthropicClient::new(GenerationConfig::from_env()?);
        run_analysis(&tokens, None, &config, &client).await?
    };

    info!(
        "Analysis complete: {} segments, {} issues, {} highlights",
        result.segments.len(),
        result.issues.len(),
        result.coaching_highlights.len()
    );

    let doc = AnalysisDocument::new(conversation.as_str(), result);
    write_document(&doc, &output)?;
    info!("Result written to {:?}", output);

    if let Some(report_path) = report {
        CoachingReport::new(&doc).write_file(&report_path)?;
        info!("Report written to {:?}", report_path);
    }

    // Status channel: advance the conversation to its terminal state
    info!("Conversation {} finished", conversation);

    Ok(())
}

fn inspect(input: PathBuf) -> Result<()> {
    let tokens = parse_tokens_file(&input).context("Failed to parse input tokens")?;
    let conversation = conversation_id(&tokens).unwrap_or("unknown").to_string();

    let result = run_analysis_offline(&tokens, None, &PipelineConfig::default())?;

    println!("Conversation {conversation}");
    println!("====================");
    println!("Tokens: {}", tokens.len());
    println!("Segments: {}", result.segments.len());
    println!();

    println!("Metrics");
    println!("-------");
    let m = &result.metrics;
    println!("Duration: {:.1}s", m.duration_sec);
    println!("Words: {} ({} wpm average)", m.total_words, m.avg_wpm);
    println!(
        "Fillers: {} ({:.1} per minute)",
        m.filler_count, m.filler_per_minute
    );
    println!("Stress-speed index: {:.2}", m.stress_speed_index);
    println!();

    println!("Segments");
    println!("--------");
    for segment in &result.segments {
        let tag_labels: Vec<&str> = segment.tags.iter().map(|t| t.label.as_str()).collect();
        let marks = if tag_labels.is_empty() {
            String::new()
        } else {
            format!("  [{}]", tag_labels.join(", "))
        };
        println!(
            "{} {:>7}ms-{:<7}ms{} {}",
            segment.id, segment.start_ms, segment.end_ms, marks, segment.text
        );
    }
    println!();

    // Offline run, so these are the deterministic fallback issues
    println!("Issues");
    println!("------");
    if result.issues.is_empty() {
        println!("(none: metrics inside healthy bands)");
    }
    for issue in &result.issues {
        println!("- [{:?}] {}: {}", issue.severity, issue.kind, issue.message);
    }

    Ok(())
}
