use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{debug, info};

use crate::game::{GameConfig, GameEngine, TickClock};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

pub struct HumanMode {
    engine: GameEngine,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    paused_at: Option<Instant>,
    /// Cleared once the finished game has been recorded
    game_recorded: bool,
}

impl HumanMode {
    pub fn new(config: GameConfig) -> Result<Self> {
        let engine = GameEngine::new(config).context("Invalid game configuration")?;

        Ok(Self {
            engine,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            paused_at: None,
            game_recorded: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_clock = TickClock::new(self.engine.state().tick_interval);

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        info!(
            rows = self.engine.config().rows,
            cols = self.engine.config().cols,
            interval_ms = tick_clock.period().as_millis() as u64,
            "game started"
        );

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_clock);
                    }
                }

                // Game logic tick; disarmed while paused or over
                _ = tick_clock.tick(), if self.is_ticking() => {
                    self.update_game(&mut tick_clock);
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    let snapshot = self.engine.snapshot();
                    let paused = self.paused_at.is_some();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &snapshot, &self.metrics, paused);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        info!(
            high_score = self.metrics.high_score,
            games = self.metrics.games_played,
            "quitting"
        );
        Ok(())
    }

    fn is_ticking(&self) -> bool {
        self.paused_at.is_none() && !self.engine.state().is_game_over()
    }

    fn handle_event(&mut self, event: Event, tick_clock: &mut TickClock) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Turn(direction) => {
                    if self.paused_at.is_none() {
                        self.engine.set_direction(direction);
                    }
                }
                KeyAction::Restart => {
                    self.reset_game(tick_clock);
                }
                KeyAction::Pause => {
                    self.toggle_pause(tick_clock);
                }
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::None => {}
            }
        }
    }

    fn update_game(&mut self, tick_clock: &mut TickClock) {
        let state = self.engine.tick();
        let interval = state.tick_interval;

        if state.is_game_over() && !self.game_recorded {
            self.game_recorded = true;
            self.metrics.on_game_over(state.score);
        }

        tick_clock.rearm(interval);
    }

    fn toggle_pause(&mut self, tick_clock: &mut TickClock) {
        if self.engine.state().is_game_over() {
            return;
        }

        match self.paused_at.take() {
            Some(paused_at) => {
                self.metrics.on_resume(paused_at.elapsed());
                tick_clock.restart();
                debug!("resumed");
            }
            None => {
                self.paused_at = Some(Instant::now());
                debug!("paused");
            }
        }
    }

    fn reset_game(&mut self, tick_clock: &mut TickClock) {
        if !self.game_recorded {
            self.metrics.on_game_over(self.engine.state().score);
        }

        let interval = self.engine.reset().tick_interval;
        self.metrics.on_game_start();
        self.paused_at = None;
        self.game_recorded = false;

        if !tick_clock.rearm(interval) {
            tick_clock.restart();
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, Direction};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mode() -> HumanMode {
        HumanMode::new(GameConfig::default().with_seed(9)).unwrap()
    }

    #[test]
    fn test_game_initialization() {
        let mode = mode();
        assert!(!mode.engine.state().is_game_over());
        assert_eq!(mode.engine.state().score, 0);
        assert!(mode.is_ticking());
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let config = GameConfig {
            cols: 0,
            ..GameConfig::default()
        };
        assert!(HumanMode::new(config).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_key_reaches_engine() {
        let mut mode = mode();
        let mut clock = TickClock::new(mode.engine.state().tick_interval);

        mode.handle_event(key(KeyCode::Up), &mut clock);
        assert_eq!(mode.engine.state().next_direction, Direction::Up);

        mode.handle_event(key(KeyCode::Down), &mut clock);
        assert_eq!(mode.engine.state().next_direction, Direction::Down);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_ticking_and_ignores_turns() {
        let mut mode = mode();
        let mut clock = TickClock::new(mode.engine.state().tick_interval);

        mode.handle_event(key(KeyCode::Char(' ')), &mut clock);
        assert!(!mode.is_ticking());

        mode.handle_event(key(KeyCode::Up), &mut clock);
        assert_eq!(mode.engine.state().next_direction, Direction::Right);

        mode.handle_event(key(KeyCode::Char(' ')), &mut clock);
        assert!(mode.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_follows_speed_changes() {
        // On a 1x2 board the only free cell is straight ahead, so the first tick eats
        let config = GameConfig {
            rows: 1,
            cols: 2,
            initial_snake: vec![Cell::new(0, 0)],
            ..GameConfig::default()
        };
        let mut mode = HumanMode::new(config).unwrap();
        let mut clock = TickClock::new(mode.engine.state().tick_interval);
        assert_eq!(mode.engine.state().food, Some(Cell::new(0, 1)));

        mode.update_game(&mut clock);

        assert_eq!(mode.engine.state().score, 1);
        assert_eq!(clock.period(), Duration::from_millis(195));
    }

    #[tokio::test(start_paused = true)]
    async fn test_game_over_is_recorded_once() {
        let mut mode = mode();
        let mut clock = TickClock::new(mode.engine.state().tick_interval);

        mode.handle_event(key(KeyCode::Up), &mut clock);
        while mode.is_ticking() {
            mode.update_game(&mut clock);
        }
        mode.update_game(&mut clock);

        assert_eq!(mode.metrics.games_played, 1);
        assert!(!mode.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_key_resets_game() {
        let mut mode = mode();
        let mut clock = TickClock::new(mode.engine.state().tick_interval);

        mode.handle_event(key(KeyCode::Up), &mut clock);
        while mode.is_ticking() {
            mode.update_game(&mut clock);
        }

        mode.handle_event(key(KeyCode::Char('r')), &mut clock);

        let state = mode.engine.state();
        assert!(!state.is_game_over());
        assert_eq!(state.score, 0);
        assert_eq!(state.snake.head(), Cell::new(10, 10));
        assert_eq!(clock.period(), Duration::from_millis(200));
        assert_eq!(mode.metrics.games_played, 1);
    }
}
