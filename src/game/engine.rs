use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::{
    action::Direction,
    config::{ConfigError, GameConfig, GrowthMode},
    snapshot::Snapshot,
    state::{Cell, EndReason, GameState, GameStatus, Snake},
};

/// The game engine: owns the state and is the only thing that mutates it
///
/// Every operation is total. Invalid input is absorbed as a no-op and no
/// sequence of calls can leave the state undefined.
pub struct GameEngine<R: Rng = StdRng> {
    config: GameConfig,
    state: GameState,
    rng: R,
}

impl GameEngine<StdRng> {
    /// Create a new game engine with the given configuration
    ///
    /// Food placement is seeded from `config.seed` when set, from entropy
    /// otherwise.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> GameEngine<R> {
    /// Create a new game engine drawing food positions from `rng`
    pub fn with_rng(config: GameConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = Self::initial_state(&config, &mut rng);

        Ok(Self { config, state, rng })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current game state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Owned, read-only view for the renderer
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from(&self.state)
    }

    /// Reset the game to its initial state
    pub fn reset(&mut self) -> &GameState {
        self.state = Self::initial_state(&self.config, &mut self.rng);
        info!(
            rows = self.config.rows,
            cols = self.config.cols,
            "game reset"
        );
        &self.state
    }

    /// Queue a heading for the next tick
    ///
    /// Ignored when the game is over or when `requested` reverses the heading
    /// travelled on the last tick. A later valid request before the next tick
    /// replaces an earlier one.
    pub fn set_direction(&mut self, requested: Direction) {
        if self.state.is_game_over() {
            return;
        }

        if self.state.direction.is_opposite(requested) {
            return;
        }

        self.state.next_direction = requested;
    }

    /// Advance the game by one step
    pub fn tick(&mut self) -> &GameState {
        if self.state.is_game_over() {
            return &self.state;
        }

        let state = &mut self.state;
        state.direction = state.next_direction;

        let new_head = state.snake.head().moved_in_direction(state.direction);
        // Judged against the body before it moves, so the departing tail still counts
        let collision = Self::collision(state, new_head);

        let keep_tail = std::mem::take(&mut state.grow_pending);
        state.snake.advance(new_head, keep_tail);
        state.ticks += 1;

        if let Some(reason) = collision {
            state.status = GameStatus::GameOver(reason);
            info!(score = state.score, ticks = state.ticks, ?reason, "game over");
            return &self.state;
        }

        if state.food == Some(new_head) {
            self.eat();
        }

        &self.state
    }

    /// Wall first, then every segment behind the current head
    fn collision(state: &GameState, new_head: Cell) -> Option<EndReason> {
        if !state.is_in_bounds(new_head) {
            return Some(EndReason::Wall);
        }

        if state.snake.collides_with_body(new_head) {
            return Some(EndReason::SelfCollision);
        }

        None
    }

    fn eat(&mut self) {
        let state = &mut self.state;
        state.score += 1;
        state.tick_interval = self.config.next_interval(state.tick_interval);

        match self.config.growth {
            GrowthMode::Deferred => state.grow_pending = true,
            GrowthMode::Immediate => state.snake.duplicate_tail(),
        }

        state.food = Self::spawn_food_avoid_snake(state, &mut self.rng);
        debug!(
            score = state.score,
            interval_ms = state.tick_interval.as_millis() as u64,
            length = state.snake.len(),
            "food eaten"
        );

        if state.food.is_none() {
            state.status = GameStatus::GameOver(EndReason::BoardFilled);
            info!(score = state.score, "board filled");
        }
    }

    fn initial_state(config: &GameConfig, rng: &mut R) -> GameState {
        let mut state = GameState::new(
            Snake::from_cells(config.initial_snake.clone()),
            config.initial_direction,
            None,
            config.initial_interval(),
            config.rows,
            config.cols,
        );
        state.food = Self::spawn_food_avoid_snake(&state, rng);
        state
    }

    /// Pick a random free cell, or `None` when the snake covers the grid
    fn spawn_food_avoid_snake(state: &GameState, rng: &mut R) -> Option<Cell> {
        let free = state.free_cells();
        if free.is_empty() {
            return None;
        }
        Some(free[rng.gen_range(0..free.len())])
    }
}
