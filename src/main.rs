use std::{fs::File, path::{Path, PathBuf}, sync::Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use snake::config::GameConfig;
use snake::game::SnakeGame;

#[derive(Parser, Debug)]
#[command(name = "snake", version, about = "Snake in the terminal")]
struct Args {
    /// JSON file with board size, colours, speed and key bindings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for apple placement, for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Tick interval in milliseconds, overriding the config file
    #[arg(long)]
    speed: Option<u64>,

    /// Where log output goes; the terminal itself belongs to the game
    #[arg(long, default_value = "snake.log")]
    log_file: PathBuf,
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("could not create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "snake=info".into()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    }
    .with_speed(args.speed)?;

    let mut game = SnakeGame::new(config, args.seed)?;
    game.initialize()?;

    // The terminal is restored whatever the game loop returns.
    let res = match game.show_intro() {
        Ok(true) => game.play(),
        Ok(false) => Ok(()),
        Err(e) => Err(e),
    };
    game.shutdown()?;

    res.context("game loop failed")
}
