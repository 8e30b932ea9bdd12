//! Washstep CLI - hand-washing step tracking tools.

mod replay;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use washstep_core::{SmoothingConfig, StepCatalog, TrackerConfig};

use replay::ReplayOptions;

#[derive(Parser)]
#[command(name = "washstep")]
#[command(about = "Hand-washing step progress tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Tracker config file (JSON)
    #[arg(short = 'c', long = "config", global = true)]
    config_file: Option<PathBuf>,

    /// Step catalog file (JSON list of steps)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Override required seconds per step
    #[arg(long, global = true)]
    required_time: Option<f64>,

    /// Override advance confidence threshold
    #[arg(long, global = true)]
    advance_threshold: Option<f32>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the washing steps
    Steps,
    /// Print the effective tracker configuration
    Config,
    /// Replay a recorded observation stream (JSON lines)
    Replay {
        /// Input file, `-` for stdin
        input: PathBuf,
        /// Also print transition events
        #[arg(long)]
        events: bool,
        /// Smooth observations over recent frames
        #[arg(long)]
        smooth: bool,
        /// Print estimated remaining time with each status
        #[arg(long)]
        estimate: bool,
    },
}

fn init_logging() {
    // stdout carries JSON output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let catalog = load_catalog(cli.catalog.as_deref())?;
    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Steps => {
            println!("Steps ({})", catalog.len());
            for (index, step) in catalog.iter().enumerate() {
                println!("  {} | {}", index + 1, step.name);
                if !step.technique.is_empty() {
                    println!("      {}", step.technique);
                }
            }
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Replay { input, events, smooth, estimate } => {
            if smooth && config.smoothing.is_none() {
                config.smoothing = Some(SmoothingConfig::default());
            }
            let options = ReplayOptions { events, estimate };
            let stdout = std::io::stdout();

            let summary = if input.as_os_str() == "-" {
                replay::run(std::io::stdin().lock(), stdout.lock(), catalog, config, options)?
            } else {
                let file = std::fs::File::open(&input)
                    .with_context(|| format!("failed to open {}", input.display()))?;
                replay::run(BufReader::new(file), stdout.lock(), catalog, config, options)?
            };

            if let Some(status) = summary.final_status {
                eprintln!(
                    "{} frames | step {} ({}) | {:.1}% | {}",
                    summary.frames,
                    status.current_step + 1,
                    status.step_name,
                    status.completion_percentage,
                    if status.completed { "COMPLETE" } else { "INCOMPLETE" },
                );
            }
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<TrackerConfig> {
    let mut config = match &cli.config_file {
        Some(path) => TrackerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TrackerConfig::default(),
    };
    if let Some(seconds) = cli.required_time {
        config.required_time_per_step = seconds;
    }
    if let Some(threshold) = cli.advance_threshold {
        config.advance_threshold = threshold;
    }
    config.validate()?;
    Ok(config)
}

fn load_catalog(path: Option<&std::path::Path>) -> Result<StepCatalog> {
    let Some(path) = path else {
        return Ok(StepCatalog::who_default());
    };
    let reader = BufReader::new(
        std::fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
    );
    read_catalog(reader).with_context(|| format!("invalid step catalog {}", path.display()))
}

fn read_catalog<R: BufRead>(reader: R) -> Result<StepCatalog> {
    Ok(serde_json::from_reader(reader)?)
}
