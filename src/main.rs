use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use grid_snake::game::{Direction, GameConfig, GrowthMode};
use grid_snake::modes::HumanMode;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "grid_snake")]
#[command(version, about = "Grid-based snake game for the terminal")]
struct Cli {
    /// Board preset, used unless --config is given
    #[arg(long, default_value = "classic")]
    preset: Preset,

    /// JSON game configuration; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid rows (re-centres the starting snake); not combinable with --config
    #[arg(long, conflicts_with = "config")]
    rows: Option<usize>,

    /// Grid columns (re-centres the starting snake); not combinable with --config
    #[arg(long, conflicts_with = "config")]
    cols: Option<usize>,

    /// Initial heading: up, down, left or right
    #[arg(long)]
    direction: Option<Direction>,

    /// Initial tick interval in milliseconds
    #[arg(long)]
    speed: Option<u64>,

    /// When the snake grows after eating
    #[arg(long)]
    growth: Option<Growth>,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (the terminal is taken by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// 10x10
    Small,
    /// 20x20
    Classic,
    /// 40x40
    Large,
}

#[derive(Clone, Copy, ValueEnum)]
enum Growth {
    /// Grow on the tick after eating
    Deferred,
    /// Grow on the eating tick by duplicating the tail
    Immediate,
}

impl From<Growth> for GrowthMode {
    fn from(growth: Growth) -> Self {
        match growth {
            Growth::Deferred => GrowthMode::Deferred,
            Growth::Immediate => GrowthMode::Immediate,
        }
    }
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_file(path)?,
            None => match self.preset {
                Preset::Small => GameConfig::small(),
                Preset::Classic => GameConfig::classic(),
                Preset::Large => GameConfig::large(),
            },
        };

        if self.rows.is_some() || self.cols.is_some() {
            let resized = GameConfig::new(
                self.rows.unwrap_or(config.rows),
                self.cols.unwrap_or(config.cols),
            );
            config.rows = resized.rows;
            config.cols = resized.cols;
            config.initial_snake = resized.initial_snake;
        }
        if let Some(direction) = self.direction {
            config.initial_direction = direction;
        }
        if let Some(speed) = self.speed {
            config.initial_interval_ms = speed;
        }
        if let Some(growth) = self.growth {
            config.growth = growth.into();
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }

        if let Err(err) = config.validate() {
            warn!(%err, "rejected game configuration");
            return Err(err).context("Invalid game configuration");
        }

        Ok(config)
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grid_snake=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = cli.game_config()?;

    let mut human_mode = HumanMode::new(config)?;
    human_mode.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_cannot_override_config_file() {
        for flag in ["--rows", "--cols"] {
            let parsed =
                Cli::try_parse_from(["grid_snake", "--config", "game.json", flag, "12"]);
            assert!(parsed.is_err(), "{flag} accepted alongside --config");
        }
    }

    #[test]
    fn test_resize_recentres_preset_snake() {
        let cli = Cli::try_parse_from(["grid_snake", "--rows", "12", "--cols", "15"]).unwrap();
        let config = cli.game_config().unwrap();

        assert_eq!((config.rows, config.cols), (12, 15));
        assert_eq!(config.initial_snake, GameConfig::new(12, 15).initial_snake);
    }

    #[test]
    fn test_overrides_apply_to_preset() {
        let cli = Cli::try_parse_from([
            "grid_snake",
            "--preset",
            "small",
            "--direction",
            "up",
            "--speed",
            "120",
            "--growth",
            "immediate",
            "--seed",
            "7",
        ])
        .unwrap();
        let config = cli.game_config().unwrap();

        assert_eq!((config.rows, config.cols), (10, 10));
        assert_eq!(config.initial_direction, Direction::Up);
        assert_eq!(config.initial_interval_ms, 120);
        assert_eq!(config.growth, GrowthMode::Immediate);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let cli = Cli::try_parse_from(["grid_snake", "--speed", "10"]).unwrap();
        assert!(cli.game_config().is_err());
    }
}
