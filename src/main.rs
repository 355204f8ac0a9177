//! Styleprint - LLM-powered writing style analyzer
//!
//! A CLI tool that fetches a set of articles, asks a model to describe
//! the writing style of each one, and synthesizes a single description of
//! the author's voice across all of them.
//!
//! Exit codes:
//!   0 - Success (including runs where every article failed)
//!   1 - Runtime error (bad arguments, missing API key, synthesis failure, etc.)

mod agent;
mod analysis;
mod cli;
mod config;
mod fetcher;
mod models;
mod report;

#[cfg(test)]
mod test_support;

use agent::{Agent, AgentConfig, AnthropicClient, LanguageModel};
use analysis::Pipeline;
use anyhow::{anyhow, Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use fetcher::HttpFetcher;
use models::RunReport;
use std::path::Path;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is loaded before logging so [general] verbose can apply
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config)?;

    info!("Styleprint v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args.urls);
    debug!("Configuration: {:?}", config.model);

    match run_analysis(args, config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .styleprint.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set models, timeouts, and the article list.");
    Ok(())
}

/// Initialize logging. Logs go to stderr; stdout carries the report.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    // RUST_LOG wins over the flag-derived level when set
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Load configuration from file or defaults, then apply CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        Some(ref config_path) => Config::load(config_path)?,
        None => Config::load_default()?.unwrap_or_default(),
    };

    config.merge_with_args(args);
    config.merge_urls(args.cli_urls()?);
    config.validate()?;

    Ok(config)
}

/// Run the complete workflow: fetch, analyze, synthesize, print.
async fn run_analysis(args: Args, config: Config) -> Result<()> {
    let urls = config.articles.urls.clone();
    if urls.is_empty() {
        warn!("No article URLs given; nothing to analyze");
    }

    let fetcher = HttpFetcher::new(&config.fetch.settings())?;

    // Handle --dry-run: fetch only, no API key needed
    if args.dry_run {
        return handle_dry_run(&fetcher, &urls).await;
    }

    let api_key = args
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| anyhow!("No API key: set ANTHROPIC_API_KEY or pass --api-key"))?;

    let client = AnthropicClient::new(
        &config.model.api_url,
        &api_key,
        config.model.timeout_seconds,
    )?;

    if let Some(banner) = start_banner(args.format, urls.len()) {
        println!("{}", banner);
    }
    info!(
        "Analyzer model: {}, synthesizer model: {}",
        config.model.analyzer_model, config.model.synthesizer_model
    );

    let pipeline = build_pipeline(fetcher, Arc::new(client), &config).with_progress(!args.quiet);
    let report = pipeline.analyze_articles(&urls).await?;

    let output = render_report(&report, args.format, args.show_analyses)?;

    println!("{}", output);

    if let Some(ref path) = args.output {
        std::fs::write(path, &output)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report saved to {}", path.display());
    }

    info!(
        "Done in {:.1}s ({} of {} articles analyzed)",
        report.metadata.duration_seconds,
        report.success_count(),
        report.metadata.articles_requested
    );

    Ok(())
}

/// Progress banner for text runs. JSON runs keep stdout to the report alone.
fn start_banner(format: OutputFormat, article_count: usize) -> Option<String> {
    match format {
        OutputFormat::Text => Some(format!(
            "Analyzing writing style from {} articles...\n\
             This may take a moment as we fetch and analyze each article.\n",
            article_count
        )),
        OutputFormat::Json => None,
    }
}

fn render_report(report: &RunReport, format: OutputFormat, show_analyses: bool) -> Result<String> {
    match format {
        OutputFormat::Json => report::generate_json_report(report),
        OutputFormat::Text => Ok(report::generate_text_report(report, show_analyses)),
    }
}

/// Build both agents from config and bind them to one backend.
fn build_pipeline(
    fetcher: HttpFetcher,
    backend: Arc<dyn LanguageModel>,
    config: &Config,
) -> Pipeline {
    let analyzer = AgentConfig::article_analyzer(&config.model.analyzer_model)
        .with_sampling(config.model.max_tokens, config.model.temperature);
    let synthesizer = AgentConfig::style_synthesizer(&config.model.synthesizer_model)
        .with_sampling(config.model.max_tokens, config.model.temperature);

    Pipeline::new(
        Arc::new(fetcher),
        Agent::new(analyzer, backend.clone()),
        Agent::new(synthesizer, backend),
    )
}

/// Handle --dry-run: fetch every article, print sizes, exit.
async fn handle_dry_run(fetcher: &HttpFetcher, urls: &[String]) -> Result<()> {
    println!("\n🔍 Dry run: fetching articles (no model calls)...\n");

    let probes = analysis::probe_articles(fetcher, urls).await;
    let mut fetched = 0;

    for probe in &probes {
        match probe.outcome {
            Ok(bytes) => {
                fetched += 1;
                println!("   📄 {} ({} bytes)", probe.url, bytes);
            }
            Err(ref e) => println!("   ❌ {}: {}", probe.url, e),
        }
    }

    println!("\n   Fetched {} of {} articles", fetched, probes.len());
    println!("\n✅ Dry run complete. No model calls were made.");
    Ok(())
}
