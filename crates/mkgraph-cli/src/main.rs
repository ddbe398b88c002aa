//! `mkgraph` binary: turn markdown files into a knowledge graph using LLMs.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mkgraph_core::{
    process_directory, process_file, state, GraphConfig, ProcessOptions, RunState,
};
use mkgraph_export::{export_to_graphml, export_to_html, export_to_json, load_entities};
use mkgraph_inference::build_extractor;

/// Application directory under the user's home, holding config and state.
const APP_DIR: &str = ".mkgraph";

#[derive(Parser)]
#[command(name = "mkgraph", version, about = "Turn markdown files into a knowledge graph using LLMs")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a file or directory and create knowledge graph notes
    Run(RunArgs),
    /// Show processing status and statistics
    Status,
    /// Reset state (clear all processed file tracking)
    Reset,
    /// Initialize the config file with defaults
    Init,
    /// Get or set configuration values
    Config(ConfigArgs),
    /// Export the knowledge graph to JSON, GraphML, or HTML
    Export(ExportArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Input file or directory
    input: PathBuf,

    /// Output directory for knowledge graph notes
    #[arg(short, long, default_value = "knowledge")]
    output: PathBuf,

    /// LLM provider to use (overrides config)
    #[arg(long)]
    llm: Option<String>,

    /// Model name (overrides config)
    #[arg(long)]
    model: Option<String>,

    /// Number of files to process in each LLM call (for directories)
    #[arg(short, long, default_value_t = mkgraph_core::defaults::BATCH_SIZE)]
    batch_size: usize,

    /// Disable state tracking (process all files every time)
    #[arg(long)]
    no_state: bool,

    /// Force reprocess all files, ignoring state
    #[arg(long)]
    force: bool,
}

#[derive(clap::Args)]
struct ConfigArgs {
    /// Dotted config key, e.g. llm.provider
    key: Option<String>,

    /// Value to set
    value: Option<String>,

    /// List all config settings
    #[arg(long)]
    list: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Json,
    Graphml,
    Html,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Knowledge graph directory (output of `mkgraph run`)
    input: PathBuf,

    /// Path for the exported file
    output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,
}

fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn config_path() -> PathBuf {
    app_dir().join("config.json")
}

fn state_path() -> PathBuf {
    app_dir().join("state.json")
}

async fn run(args: RunArgs) -> Result<()> {
    let mut config = GraphConfig::load(&config_path()).context("loading config")?;
    if let Some(provider) = args.llm {
        config.llm.provider = provider;
    }
    if let Some(model) = args.model {
        config.llm.model = Some(model);
    }

    if !args.input.exists() {
        bail!("input path does not exist: {}", args.input.display());
    }

    let extractor = build_extractor(&config.llm)?;

    if args.input.is_file() {
        println!("Processing file: {}", args.input.display());
        process_file(&args.input, &args.output, extractor.as_ref(), &config).await?;
    } else {
        println!("Processing directory: {}", args.input.display());
        let state_file = state_path();
        let mut run_state = RunState::load(&state_file).context("loading run state")?;
        let options = ProcessOptions {
            batch_size: args.batch_size,
            use_state: !args.no_state,
            force: args.force,
            state_path: Some(state_file),
        };
        let summary = process_directory(
            &args.input,
            &args.output,
            extractor.as_ref(),
            &config,
            &mut run_state,
            &options,
        )
        .await?;
        println!(
            "Processed {} of {} files in {} batches ({} entities)",
            summary.files_selected, summary.files_discovered, summary.batches, summary.entities
        );
    }

    println!("✓ Done! Notes created in {}", args.output.display());
    Ok(())
}

fn status() -> Result<()> {
    let run_state = RunState::load(&state_path())?;
    println!("Processed files: {}", run_state.processed_count());
    match run_state.last_run {
        Some(ts) => println!("Last run: {ts}"),
        None => println!("Last run: Never"),
    }
    Ok(())
}

fn reset() -> Result<()> {
    state::reset_state_file(&state_path())?;
    println!("State reset. All files will be reprocessed on next run.");
    Ok(())
}

fn init() -> Result<()> {
    let path = config_path();
    let config = GraphConfig::load(&path)?;
    config.save(&path)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

fn config_cmd(args: ConfigArgs) -> Result<()> {
    let path = config_path();
    let mut config = GraphConfig::load(&path)?;

    if args.list {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    match (args.key, args.value) {
        (None, _) => {
            println!("Config file: {}", path.display());
            println!("Use 'mkgraph config --list' to see all settings");
            println!("Use 'mkgraph config <key> <value>' to set a value");
        }
        (Some(key), None) => match config.get_value(&key) {
            Some(value) => println!("{value}"),
            None => bail!("unknown config key: {key}"),
        },
        (Some(key), Some(value)) => {
            config.set_value(&key, &value)?;
            config.save(&path)?;
            println!("Set {key} = {value}");
        }
    }
    Ok(())
}

fn export(args: ExportArgs) -> Result<()> {
    let config = GraphConfig::load(&config_path())?;

    println!("Loading entities from {}...", args.input.display());
    let entities = load_entities(&args.input, &config)?;
    println!("Found {} entities", entities.len());

    match args.format {
        ExportFormat::Json => export_to_json(&entities, &args.output)?,
        ExportFormat::Graphml => export_to_graphml(&entities, &args.output)?,
        ExportFormat::Html => export_to_html(&entities, &args.output)?,
    }
    println!("✓ Exported to {}", args.output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Status => status(),
        Commands::Reset => reset(),
        Commands::Init => init(),
        Commands::Config(args) => config_cmd(args),
        Commands::Export(args) => export(args),
    }
}
