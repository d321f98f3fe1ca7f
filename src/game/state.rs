use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::action::Direction;

/// A cell on the game grid, addressed by row and column
///
/// Coordinates are signed so that a head which has just left the grid can
/// still be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Move cell by delta
    pub fn moved_by(&self, drow: i32, dcol: i32) -> Self {
        Self {
            row: self.row + drow,
            col: self.col + dcol,
        }
    }

    /// Move cell one step in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (drow, dcol) = direction.delta();
        self.moved_by(drow, dcol)
    }

    /// True if the two cells share an edge
    pub fn is_adjacent(&self, other: Cell) -> bool {
        (self.row - other.row).abs() + (self.col - other.col).abs() == 1
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Cell>,
}

impl Snake {
    /// Create a snake from its segments, head first
    ///
    /// Callers guarantee `body` is non-empty; `GameConfig::validate` enforces
    /// this for every snake the engine builds.
    pub fn from_cells(body: Vec<Cell>) -> Self {
        debug_assert!(!body.is_empty(), "snake must have at least one segment");
        Self { body }
    }

    /// Create a straight snake whose head is at `head`, trailing behind `direction`
    pub fn straight(head: Cell, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];
        let back = direction.opposite();

        for i in 1..length.max(1) {
            let prev = body[i - 1];
            body.push(prev.moved_in_direction(back));
        }

        Self { body }
    }

    /// Get the head position
    pub fn head(&self) -> Cell {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Cell] {
        &self.body[1..]
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, cell: Cell) -> bool {
        self.body_segments().contains(&cell)
    }

    /// Check if any segment, head included, occupies `cell`
    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Push a new head; the tail is kept when `keep_tail` is true
    pub fn advance(&mut self, new_head: Cell, keep_tail: bool) {
        self.body.insert(0, new_head);

        if !keep_tail {
            self.body.pop();
        }
    }

    /// Append a copy of the current tail
    pub fn duplicate_tail(&mut self) {
        let tail = self.tail();
        self.body.push(tail);
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// No free cell was left to place food on
    BoardFilled,
}

/// Whether the game is still being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    #[default]
    Running,
    GameOver(EndReason),
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    /// Heading travelled on the last tick
    pub direction: Direction,
    /// Heading that the next tick will use
    pub next_direction: Direction,
    /// Always `Some` while running
    pub food: Option<Cell>,
    pub tick_interval: Duration,
    pub score: u32,
    pub ticks: u32,
    pub status: GameStatus,
    /// Set when food was eaten under deferred growth; consumed by the next tick
    pub grow_pending: bool,
    pub rows: usize,
    pub cols: usize,
}

impl GameState {
    /// Create a new game state
    pub fn new(
        snake: Snake,
        direction: Direction,
        food: Option<Cell>,
        tick_interval: Duration,
        rows: usize,
        cols: usize,
    ) -> Self {
        Self {
            snake,
            direction,
            next_direction: direction,
            food,
            tick_interval,
            score: 0,
            ticks: 0,
            status: GameStatus::Running,
            grow_pending: false,
            rows,
            cols,
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.status, GameStatus::GameOver(_))
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        match self.status {
            GameStatus::Running => None,
            GameStatus::GameOver(reason) => Some(reason),
        }
    }

    /// Check if a position is within the grid bounds
    ///
    /// `GameConfig::validate` caps the grid at `GameConfig::MAX_CELLS`, so the
    /// dimensions always fit in `i32`.
    pub fn is_in_bounds(&self, cell: Cell) -> bool {
        cell.row >= 0
            && cell.row < self.rows as i32
            && cell.col >= 0
            && cell.col < self.cols as i32
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, cell: Cell) -> bool {
        self.snake.occupies(cell)
    }

    /// All in-bounds cells the snake does not cover, in row-major order
    pub fn free_cells(&self) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(self.rows * self.cols);
        for row in 0..self.rows as i32 {
            for col in 0..self.cols as i32 {
                let cell = Cell::new(row, col);
                if !self.snake.occupies(cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }
}
