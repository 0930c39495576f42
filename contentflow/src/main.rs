//! Contentflow CLI Binary
//!
//! Runs the content pipeline for one product record and writes the FAQ,
//! product and comparison pages as JSON files.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use contentflow::config::{PipelineConfig, StagePolicies};
use contentflow::logging::init_logging;
use contentflow::output::{write_documents, write_run_metadata};
use contentflow::pipeline::{Pipeline, PipelineRun, RetryPolicy};
use contentflow::providers::{DisabledGenerator, Generator};
use contentflow::record::{raw_record_from_json, RawRecord};
use contentflow::testing::sample_raw_record;

/// Contentflow - product content generation with resilient fallbacks
#[derive(Parser)]
#[command(name = "contentflow", version)]
#[command(about = "Generate FAQ, product and comparison pages from a product record")]
struct Cli {
    /// Product record as a JSON object (defaults to the built-in sample serum)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory for the generated JSON files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the external generator; every stage uses its fallback immediately
    #[arg(long, default_value = "false")]
    offline: bool,

    /// Also write run_metadata.json
    #[arg(long, default_value = "false")]
    metadata: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, env = "CONTENTFLOW_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    // CLI arguments take priority over the config file
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format.parse()?;
    }
    if let Some(dir) = cli.output_dir {
        config.output.directory = dir;
    }
    config.output.write_metadata |= cli.metadata;

    init_logging(&config.logging).context("initializing logging")?;
    info!("Contentflow starting");

    let raw = load_record(cli.input.as_ref())?;
    let generator = select_generator(&mut config, cli.offline)?;
    let pipeline = Pipeline::new(generator, config.clone());

    match pipeline.run(&raw).await {
        Ok(run) => {
            let dir = &config.output.directory;
            let paths = write_documents(dir, &run.documents, config.output.pretty)
                .with_context(|| format!("writing documents to {}", dir.display()))?;
            if config.output.write_metadata {
                write_run_metadata(dir, &run.metadata, config.output.pretty)
                    .context("writing run metadata")?;
            }
            print_summary(&run, &paths);
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            error!(phase = %failure.phase, "Pipeline failed");
            eprintln!("{failure}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn load_record(path: Option<&PathBuf>) -> anyhow::Result<RawRecord> {
    let Some(path) = path else {
        info!("No input given, using the built-in sample record");
        return Ok(sample_raw_record());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading input {}", path.display()))?;
    raw_record_from_json(&text).with_context(|| format!("parsing input {}", path.display()))
}

/// Picks the external generator, degrading to offline mode when it is
/// disabled or has no API key.
fn select_generator(config: &mut PipelineConfig, offline: bool) -> anyhow::Result<Arc<dyn Generator>> {
    if !offline && config.provider.enabled {
        match config.provider.api_key() {
            Some(key) => return build_http_generator(config, key),
            None => warn!(
                env = %config.provider.api_key_env,
                "API key not set, running offline"
            ),
        }
    }
    config.retry = StagePolicies::uniform(&RetryPolicy::immediate());
    Ok(Arc::new(DisabledGenerator))
}

#[cfg(feature = "http")]
fn build_http_generator(config: &PipelineConfig, key: String) -> anyhow::Result<Arc<dyn Generator>> {
    let generator = contentflow::providers::ChatCompletionsGenerator::new(&config.provider, key)
        .context("building HTTP generator")?;
    info!(model = generator.model(), "Using chat completions generator");
    Ok(Arc::new(generator))
}

#[cfg(not(feature = "http"))]
fn build_http_generator(_config: &PipelineConfig, _key: String) -> anyhow::Result<Arc<dyn Generator>> {
    anyhow::bail!("built without the `http` feature; rerun with --offline")
}

fn print_summary(run: &PipelineRun, paths: &[PathBuf]) {
    println!("Run {} completed in {} ms", run.metadata.run_id, run.metadata.duration_ms());
    for record in &run.metadata.stages {
        let method = record
            .metadata
            .generation_method
            .map_or("none", |m| m.as_str());
        println!(
            "  {:<13} {:<8} attempts={}",
            record.stage.as_str(),
            method,
            record.metadata.attempts
        );
    }
    for path in paths {
        println!("  wrote {}", path.display());
    }
}
