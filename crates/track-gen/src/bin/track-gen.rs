//! Generates one run payload from a config file and a point rule.
//!
//! Run with:
//! ```
//! cargo run -p track-gen -- --config configs/default.json --rule rule.json --seed 12345
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use track_gen::config::{PointRule, RunningConfig};
use track_gen::generators::RunGenerator;
use track_gen::gpx::generate_gpx;
use track_gen::logging::TracingSink;
use track_gen::random::{RandomSource, RngSource};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "track-gen", version, about = "Generate a synthetic running-track payload")]
struct Cli {
    /// Run config JSON (START_LATITUDE, RUNNING_SPEED_MPS, ...). Defaults apply when absent.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Point rule JSON, bare or wrapped in a `data` envelope.
    #[arg(long)]
    rule: Option<PathBuf>,

    /// Fixed start time in epoch milliseconds; overrides the config.
    #[arg(long)]
    start_time: Option<i64>,

    /// User id; overrides the config.
    #[arg(long)]
    user_id: Option<String>,

    /// Seed for reproducible track splits.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the payload here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also export the assembled route as GPX.
    #[arg(long)]
    gpx: Option<PathBuf>,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Less logging (-q warn, -qq error).
    #[arg(short, long, action = clap::ArgAction::Count)]
    quiet: u8,
}

fn init_logging(verbose: u8, quiet: u8) {
    let level = match i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        2..=i16::MAX => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => RunningConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RunningConfig::default(),
    };
    if let Some(start_time) = cli.start_time {
        config = config.with_start_time(start_time);
    }
    if let Some(user_id) = cli.user_id {
        config.user_id = user_id;
    }

    let rule = match &cli.rule {
        Some(path) => PointRule::load(path)
            .with_context(|| format!("loading point rule {}", path.display()))?,
        None => {
            tracing::warn!("No point rule given; using the default pace window");
            PointRule::default()
        }
    };

    let mut rng: Box<dyn RandomSource> = match cli.seed {
        Some(seed) => Box::new(RngSource::new(StdRng::seed_from_u64(seed))),
        None => Box::new(RngSource::new(rand::thread_rng())),
    };

    let run = RunGenerator::new(&TracingSink)
        .generate(&config, &rule, rng.as_mut())
        .context("generating running data")?;

    let body = serde_json::to_string_pretty(&run.payload)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, &body)
                .with_context(|| format!("writing payload {}", path.display()))?;
            tracing::info!("Payload written to {}", path.display());
        }
        None => println!("{body}"),
    }

    if let Some(path) = &cli.gpx {
        std::fs::write(path, generate_gpx(&run.route.points, "Generated Run"))
            .with_context(|| format!("writing GPX {}", path.display()))?;
        tracing::info!("Route written to {}", path.display());
    }

    Ok(())
}
