//! Grid Snake - a single-player snake game
//!
//! This library provides:
//! - Core game logic (game module): a total, deterministic state machine
//! - Keyboard mapping (input module)
//! - TUI rendering (render module)
//! - Session statistics (metrics module)
//! - The interactive terminal driver (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
