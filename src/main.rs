use anyhow::{Context, Result};
use clap::Parser;
use grid_snake::game::{ApplePlacement, GameConfig, GameLoop};
use grid_snake::modes::HumanMode;
use log::{LevelFilter, info};
use simplelog::{Config, WriteLogger};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "grid_snake")]
#[command(version, about = "Snake on a fixed-tick grid, in the terminal")]
struct Cli {
    /// Seed for apple placement, for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Never place an apple on a cell the snake occupies
    #[arg(long)]
    apple_avoids_snake: bool,

    /// Write logs to this file (the terminal belongs to the game)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn init_logging(path: &Path, level: LevelFilter) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    WriteLogger::init(level, Config::default(), file).context("Failed to initialize logger")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path, cli.log_level)?;
    }

    let apple_placement = if cli.apple_avoids_snake {
        ApplePlacement::AvoidSnake
    } else {
        ApplePlacement::Anywhere
    };
    let config = GameConfig {
        apple_placement,
        ..GameConfig::default()
    };
    let game = match cli.seed {
        Some(seed) => {
            info!("apple seed {}", seed);
            GameLoop::with_seed(config, seed)
        }
        None => GameLoop::new(config),
    }
    .context("Invalid game configuration")?;

    let summary = HumanMode::new(game).run().await?;
    info!(
        "session over ({}) with score {} after {} ticks",
        summary.end, summary.score, summary.ticks
    );
    println!("Session ended ({}). Score: {}", summary.end, summary.score);

    Ok(())
}
