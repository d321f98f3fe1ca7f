use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use super::action::Direction;
use super::state::{Cell, Snake};

/// When the snake gains the segment earned by eating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthMode {
    /// The tick after eating keeps its tail
    #[default]
    Deferred,
    /// The tail is duplicated on the eating tick
    Immediate,
}

/// Reasons a configuration cannot start a game
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid must have at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("grid of {rows}x{cols} exceeds the limit of {max} cells")]
    GridTooLarge { rows: usize, cols: usize, max: usize },

    #[error("initial snake must have at least one segment")]
    EmptySnake,

    #[error("initial snake segment {cell} lies outside the {rows}x{cols} grid")]
    SegmentOutOfBounds { cell: Cell, rows: usize, cols: usize },

    #[error("initial snake visits {0} twice")]
    DuplicateSegment(Cell),

    #[error("initial snake segments {0} and {1} are not adjacent")]
    DetachedSegment(Cell, Cell),

    #[error("initial direction {0} points into the snake's neck")]
    DirectionIntoNeck(Direction),

    #[error("initial snake leaves no free cell for food")]
    NoRoomForFood,

    #[error("min_interval_ms must be positive")]
    ZeroMinInterval,

    #[error("initial_interval_ms ({initial}) is below min_interval_ms ({min})")]
    IntervalBelowFloor { initial: u64, min: u64 },
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of grid rows
    pub rows: usize,
    /// Number of grid columns
    pub cols: usize,
    /// Starting body, head first
    pub initial_snake: Vec<Cell>,
    pub initial_direction: Direction,
    /// Tick interval at the start of a game, in milliseconds
    pub initial_interval_ms: u64,
    /// How much each food item shortens the tick interval
    pub interval_decrement_ms: u64,
    /// Floor for the tick interval
    pub min_interval_ms: u64,
    pub growth: GrowthMode,
    /// Fixed RNG seed for reproducible food placement
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(20, 20)
    }
}

impl GameConfig {
    pub const DEFAULT_SNAKE_LENGTH: usize = 3;
    /// Upper bound on `rows * cols`; also keeps every coordinate inside `i32`
    pub const MAX_CELLS: usize = 1 << 20;

    /// Create a configuration for a `rows` x `cols` grid with a centred snake
    /// of length 3 heading right
    pub fn new(rows: usize, cols: usize) -> Self {
        let head = Cell::new((rows / 2) as i32, (cols / 2) as i32);
        let length = Self::DEFAULT_SNAKE_LENGTH
            .min(cols / 2 + 1)
            .min(rows.saturating_mul(cols).saturating_sub(1))
            .max(1);
        let initial_snake = Snake::straight(head, Direction::Right, length).body;

        Self {
            rows,
            cols,
            initial_snake,
            initial_direction: Direction::Right,
            initial_interval_ms: 200,
            interval_decrement_ms: 5,
            min_interval_ms: 50,
            growth: GrowthMode::Deferred,
            seed: None,
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// The 20x20 board
    pub fn classic() -> Self {
        Self::new(20, 20)
    }

    /// The 40x40 board
    pub fn large() -> Self {
        Self::new(40, 40)
    }

    pub fn with_growth(mut self, growth: GrowthMode) -> Self {
        self.growth = growth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn interval_decrement(&self) -> Duration {
        Duration::from_millis(self.interval_decrement_ms)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Interval after one more food item, clamped to the floor
    pub fn next_interval(&self, current: Duration) -> Duration {
        current
            .saturating_sub(self.interval_decrement())
            .max(self.min_interval())
    }

    /// Load a configuration from a JSON file and validate it
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: GameConfig =
            serde_json::from_str(&json).context("Failed to parse game config")?;
        config
            .validate()
            .with_context(|| format!("Invalid game config in {}", path.display()))?;
        Ok(config)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }

        let cells = self
            .rows
            .checked_mul(self.cols)
            .filter(|&cells| cells <= Self::MAX_CELLS);
        let Some(cells) = cells else {
            return Err(ConfigError::GridTooLarge {
                rows: self.rows,
                cols: self.cols,
                max: Self::MAX_CELLS,
            });
        };

        let Some(&head) = self.initial_snake.first() else {
            return Err(ConfigError::EmptySnake);
        };

        let mut seen = HashSet::with_capacity(self.initial_snake.len());
        for &cell in &self.initial_snake {
            let in_bounds = cell.row >= 0
                && cell.col >= 0
                && (cell.row as usize) < self.rows
                && (cell.col as usize) < self.cols;
            if !in_bounds {
                return Err(ConfigError::SegmentOutOfBounds {
                    cell,
                    rows: self.rows,
                    cols: self.cols,
                });
            }
            if !seen.insert(cell) {
                return Err(ConfigError::DuplicateSegment(cell));
            }
        }

        for pair in self.initial_snake.windows(2) {
            if !pair[0].is_adjacent(pair[1]) {
                return Err(ConfigError::DetachedSegment(pair[0], pair[1]));
            }
        }

        if let Some(&neck) = self.initial_snake.get(1) {
            if head.moved_in_direction(self.initial_direction) == neck {
                return Err(ConfigError::DirectionIntoNeck(self.initial_direction));
            }
        }

        if self.initial_snake.len() >= cells {
            return Err(ConfigError::NoRoomForFood);
        }

        if self.min_interval_ms == 0 {
            return Err(ConfigError::ZeroMinInterval);
        }

        if self.initial_interval_ms < self.min_interval_ms {
            return Err(ConfigError::IntervalBelowFloor {
                initial: self.initial_interval_ms,
                min: self.min_interval_ms,
            });
        }

        Ok(())
    }
}
