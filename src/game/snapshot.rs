//! Read-only view of the game handed to renderers
//!
//! A `Snapshot` is an owned copy, so a renderer can hold on to it across
//! frames without borrowing the engine.

use serde::Serialize;
use std::time::Duration;

use super::state::{Cell, EndReason, GameState};

/// What occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Head,
    Body,
    Food,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Head first
    pub snake: Vec<Cell>,
    pub food: Option<Cell>,
    pub score: u32,
    pub game_over: bool,
    pub end_reason: Option<EndReason>,
    pub rows: usize,
    pub cols: usize,
    #[serde(skip)]
    pub tick_interval: Duration,
}

impl Snapshot {
    pub fn grid_dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Classify one cell; the head wins over body and body wins over food
    pub fn classify(&self, cell: Cell) -> CellKind {
        if self.snake.first() == Some(&cell) {
            CellKind::Head
        } else if self.snake.contains(&cell) {
            CellKind::Body
        } else if self.food == Some(cell) {
            CellKind::Food
        } else {
            CellKind::Empty
        }
    }

    /// Every cell of the grid in row-major order, one `Vec` per row
    pub fn rows_of_cells(&self) -> Vec<Vec<CellKind>> {
        (0..self.rows as i32)
            .map(|row| {
                (0..self.cols as i32)
                    .map(|col| self.classify(Cell::new(row, col)))
                    .collect()
            })
            .collect()
    }
}

impl From<&GameState> for Snapshot {
    fn from(state: &GameState) -> Self {
        Self {
            snake: state.snake.body.clone(),
            food: state.food,
            score: state.score,
            game_over: state.is_game_over(),
            end_reason: state.end_reason(),
            rows: state.rows,
            cols: state.cols,
            tick_interval: state.tick_interval,
        }
    }
}
