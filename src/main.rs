use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

use zonewatch::{Coordinate, ZonewatchConfig};
use zonewatch::geometry::geohash::DEFAULT_PRECISION;
use zonewatch::log_format::TargetFirstFormat;

mod commands;

use commands::{handle_inspect, handle_nearest, handle_replay};

#[derive(Parser)]
#[command(name = "zonewatch")]
#[command(about = "Geofence evaluation engine: enter, exit and predicted crossing alerts")]
#[command(version)]
struct Cli {
    /// TOML config with [engine] settings and [[zones]] (falls back to $ZONEWATCH_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay newline-delimited JSON fixes through the engine and print events
    Replay {
        /// File with one `{"deviceId",...,"timestampMillis"}` object per line
        #[arg(long)]
        fixes: PathBuf,

        /// Print Prometheus metrics to stderr when done
        #[arg(long)]
        metrics: bool,
    },
    /// Print bounding box, centroid, area and geohash for each configured zone
    Inspect {
        #[arg(long, default_value_t = DEFAULT_PRECISION)]
        geohash_precision: usize,
    },
    /// Show which zones contain a point and the nearest zone boundary outside it
    Nearest {
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,

        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let ansi = std::io::stderr().is_terminal();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(TargetFirstFormat::new(ansi))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = ZonewatchConfig::resolve(cli.config.as_deref())?;

    let result = match cli.command {
        // File reading and evaluation are blocking
        Commands::Replay { fixes, metrics } => {
            tokio::task::spawn_blocking(move || handle_replay(&fixes, config, metrics)).await?
        }
        Commands::Inspect { geohash_precision } => handle_inspect(&config, geohash_precision),
        Commands::Nearest {
            latitude,
            longitude,
        } => handle_nearest(&config, Coordinate::new(latitude, longitude)),
    };

    if let Err(e) = &result {
        error!("zonewatch failed: {:#}", e);
    }
    result
}
