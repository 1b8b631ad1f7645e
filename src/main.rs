// src/main.rs
// ai-comments - AI review of visual-editor DOM changes

use ai_comments::{
    AnalysisContext, ChangeAnalyzer, ChangeInput, PrScoreBreakdown, ProviderFactory, ScoringEngine,
    config::Settings,
    streaming::{to_ndjson_line, to_sse_frame},
    web,
};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use futures::StreamExt;
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "ai-comments")]
#[command(about = "AI review and PR-style scoring for visual-editor DOM changes")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a batch of changes and print one event per line
    Analyze {
        /// JSON file with `changes` and `context` ("-" for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Analyze in concurrent windows
        #[arg(long)]
        parallel: bool,

        /// Window size in parallel mode
        #[arg(long)]
        concurrency: Option<usize>,

        #[arg(long, value_enum, default_value = "ndjson")]
        format: OutputFormat,
    },

    /// Score a breakdown offline, without calling a provider
    Score {
        /// JSON file with a PR score breakdown
        #[arg(short, long)]
        breakdown: PathBuf,
    },

    /// Run the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000", env = "AI_COMMENTS_PORT")]
        port: u16,
    },

    /// Validate configuration and print a report
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Ndjson,
    Sse,
}

#[derive(Deserialize)]
struct BatchInput {
    changes: Vec<ChangeInput>,
    context: AnalysisContext,
}

async fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut buf).await?;
        return Ok(buf);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn run_analyze(
    settings: &Settings,
    input: &Path,
    parallel: bool,
    concurrency: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let batch: BatchInput = serde_json::from_str(&read_input(input).await?)
        .context("Input must be a JSON object with `changes` and `context`")?;
    if batch.changes.is_empty() {
        bail!("No changes to analyze");
    }

    let provider = ProviderFactory::create(&settings.provider_settings())?;
    let analyzer = ChangeAnalyzer::new(provider, settings.analyzer_config());

    let mut options = settings.batch_options();
    if parallel {
        options.parallel = true;
    }
    if let Some(n) = concurrency {
        options = options.concurrency(n);
    }

    info!(changes = batch.changes.len(), parallel = options.parallel, "Analyzing batch");

    let mut events = Box::pin(analyzer.analyze_stream(batch.changes, batch.context, options));
    let mut stdout = std::io::stdout().lock();
    while let Some(event) = events.next().await {
        let line = match format {
            OutputFormat::Ndjson => to_ndjson_line(&event),
            OutputFormat::Sse => to_sse_frame(&event),
        };
        stdout.write_all(line.as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}

async fn run_score(settings: &Settings, path: &Path) -> Result<()> {
    let breakdown: PrScoreBreakdown = serde_json::from_str(&read_input(path).await?)
        .context("Breakdown must be a JSON object with all seven metrics")?;

    let engine = ScoringEngine::new(settings.analyzer_config().weights);
    let report = engine.report(&breakdown);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_server(settings: &Settings, port: u16) -> Result<()> {
    let state = web::AppState::from_settings(settings);
    info!(
        port,
        provider = %state.provider,
        configured = state.is_configured(),
        "Starting ai-comments API"
    );
    web::serve(state, port).await?;
    Ok(())
}

fn run_check(settings: &Settings) -> Result<()> {
    let validation = settings.validate();
    println!("{}", validation.report());
    println!("Providers with keys: {}", settings.env.api_keys.summary());
    if !validation.is_valid() {
        bail!("Configuration has errors");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = Settings::load();

    match cli.command {
        Commands::Analyze {
            input,
            parallel,
            concurrency,
            format,
        } => run_analyze(&settings, &input, parallel, concurrency, format).await,
        Commands::Score { breakdown } => run_score(&settings, &breakdown).await,
        Commands::Serve { port } => run_server(&settings, port).await,
        Commands::Check => run_check(&settings),
    }
}
