//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies
//! apart from the tick clock, which a driver uses to pace `GameEngine::tick`.

pub mod action;
pub mod clock;
pub mod config;
pub mod engine;
pub mod snapshot;
pub mod state;

// Re-export commonly used types
pub use action::{Direction, UnknownDirection};
pub use clock::TickClock;
pub use config::{ConfigError, GameConfig, GrowthMode};
pub use engine::GameEngine;
pub use snapshot::{CellKind, Snapshot};
pub use state::{Cell, EndReason, GameState, GameStatus, Snake};
