use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::{Stream, StreamExt};
use log::{debug, info, warn};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::fmt;
use std::io::{self, Stderr, stderr};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

use crate::game::{CollisionType, GameLoop, GameStatus};
use crate::input::{InputHandler, KeyAction};
use crate::render::Renderer;

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    GameOver(CollisionType),
    Quit,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::GameOver(CollisionType::Wall) => write!(f, "hit the wall"),
            SessionEnd::GameOver(CollisionType::SelfCollision) => write!(f, "ran into itself"),
            SessionEnd::Quit => write!(f, "quit"),
        }
    }
}

/// Final numbers of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub score: u32,
    pub ticks: u32,
    pub end: SessionEnd,
}

/// Interactive session: one task multiplexing the tick timer and terminal input
pub struct HumanMode {
    game: GameLoop,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(game: GameLoop) -> Self {
        Self {
            game,
            renderer: Renderer::default(),
            input_handler: InputHandler::new(),
            should_quit: false,
        }
    }

    pub fn game(&self) -> &GameLoop {
        &self.game
    }

    /// Take over the terminal, play until game over or quit, then restore it
    pub async fn run(&mut self) -> Result<SessionSummary> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut terminal = match setup_terminal() {
            Ok(terminal) => terminal,
            Err(err) => {
                // Raw mode is already on; hand the terminal back before bailing
                let mut stderr = stderr();
                let _ = execute!(stderr, LeaveAlternateScreen);
                let _ = disable_raw_mode();
                return Err(err);
            }
        };

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal, EventStream::new()).await;
        let cleanup = cleanup_terminal(&mut terminal);

        finish_session(result, cleanup)
    }

    /// Drive the game on any backend from any event source.
    ///
    /// The first tick fires immediately. Once the event source is exhausted the
    /// game keeps ticking on its own until it ends.
    pub async fn run_game_loop<B, S>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: S,
    ) -> Result<SessionSummary>
    where
        B: Backend,
        S: Stream<Item = io::Result<Event>>,
    {
        tokio::pin!(events);
        let mut events_open = true;
        let mut tick_timer = tick_timer(self.game.config().tick_interval());

        info!(
            "session started on a {}x{} grid",
            self.game.state().grid_width,
            self.game.state().grid_height
        );

        loop {
            tokio::select! {
                // Input first so a key pressed just before a tick steers that tick
                biased;

                maybe_event = events.next(), if events_open => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event, terminal)?,
                        Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                        None => events_open = false,
                    }
                }

                _ = tick_timer.tick() => {
                    let outcome = self.game.tick();
                    if let GameStatus::Over(cause) = outcome.status {
                        return Ok(self.summary(SessionEnd::GameOver(cause)));
                    }
                    self.draw(terminal)?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                info!("quit requested after {} ticks", self.game.state().ticks);
                return Ok(self.summary(SessionEnd::Quit));
            }
        }
    }

    fn handle_event<B: Backend>(&mut self, event: Event, terminal: &mut Terminal<B>) -> Result<()> {
        match event {
            // Only process key press events, not release
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match self.input_handler.handle_key_event(key) {
                    KeyAction::Turn(direction) => {
                        if !self.game.set_direction(direction) {
                            debug!("ignored reversal to {:?}", direction);
                        }
                    }
                    KeyAction::Quit => self.should_quit = true,
                    KeyAction::None => {}
                }
            }
            Event::Resize(_, _) => self.draw(terminal)?,
            _ => {}
        }

        Ok(())
    }

    fn draw<B: Backend>(&self, terminal: &mut Terminal<B>) -> Result<()> {
        terminal
            .draw(|frame| self.renderer.render(frame, self.game.state()))
            .context("Failed to draw frame")?;
        Ok(())
    }

    fn summary(&self, end: SessionEnd) -> SessionSummary {
        let state = self.game.state();
        SessionSummary {
            score: state.score,
            ticks: state.ticks,
            end,
        }
    }
}

/// Fixed-period timer. After a stall the next tick is pushed back rather than
/// fired in a burst, so every tick gets its own frame.
fn tick_timer(period: Duration) -> Interval {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stderr>>> {
    let mut stderr = stderr();
    execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.hide_cursor().context("Failed to hide cursor")?;
    terminal.clear().context("Failed to clear terminal")?;
    Ok(terminal)
}

/// The game loop's error wins over a teardown error; the latter is only logged then.
fn finish_session(
    result: Result<SessionSummary>,
    cleanup: Result<()>,
) -> Result<SessionSummary> {
    match (result, cleanup) {
        (Ok(summary), Ok(())) => Ok(summary),
        (Ok(_), Err(cleanup_err)) => Err(cleanup_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(cleanup_err)) => {
            warn!("terminal cleanup also failed: {:#}", cleanup_err);
            Err(err)
        }
    }
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, GameConfig, Position};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use futures::stream;
    use ratatui::backend::TestBackend;

    fn terminal() -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(60, 30)).unwrap()
    }

    fn press(code: KeyCode) -> io::Result<Event> {
        Ok(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn mode() -> HumanMode {
        // Head starts at (5, 10) heading right on a 20x20 grid
        HumanMode::new(GameLoop::with_seed(GameConfig::default(), 9).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_into_right_wall() {
        let mut mode = mode();
        let mut terminal = terminal();

        let summary = mode
            .run_game_loop(&mut terminal, stream::empty::<io::Result<Event>>())
            .await
            .unwrap();

        assert_eq!(summary.end, SessionEnd::GameOver(CollisionType::Wall));
        assert_eq!(summary.ticks, 15);
        assert_eq!(mode.game().state().snake.head(), Position::new(20, 10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_up_hits_top_wall() {
        let mut mode = mode();
        let mut terminal = terminal();

        let summary = mode
            .run_game_loop(&mut terminal, stream::iter(vec![press(KeyCode::Up)]))
            .await
            .unwrap();

        assert_eq!(summary.end, SessionEnd::GameOver(CollisionType::Wall));
        assert_eq!(summary.ticks, 11);
        assert_eq!(mode.game().state().snake.direction, Direction::Up);
        assert_eq!(mode.game().state().snake.head(), Position::new(5, -1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverse_key_is_ignored() {
        let mut mode = mode();
        let mut terminal = terminal();

        let summary = mode
            .run_game_loop(&mut terminal, stream::iter(vec![press(KeyCode::Left)]))
            .await
            .unwrap();

        assert_eq!(summary.end, SessionEnd::GameOver(CollisionType::Wall));
        assert_eq!(summary.ticks, 15);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_key_ends_session() {
        let mut mode = mode();
        let mut terminal = terminal();

        let summary = mode
            .run_game_loop(&mut terminal, stream::iter(vec![press(KeyCode::Char('q'))]))
            .await
            .unwrap();

        assert_eq!(
            summary,
            SessionSummary {
                score: 0,
                ticks: 0,
                end: SessionEnd::Quit,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_release_is_ignored() {
        let mut mode = mode();
        let mut terminal = terminal();
        let release = Event::Key(KeyEvent::new_with_kind(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));

        let summary = mode
            .run_game_loop(&mut terminal, stream::iter(vec![Ok::<_, io::Error>(release)]))
            .await
            .unwrap();

        assert_eq!(summary.end, SessionEnd::GameOver(CollisionType::Wall));
    }

    #[tokio::test(start_paused = true)]
    async fn test_frames_show_live_score() {
        let mut mode = mode();
        let mut terminal = terminal();

        mode.run_game_loop(&mut terminal, stream::empty::<io::Result<Event>>())
            .await
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains(&format!("Score: {}", mode.game().state().score)));
    }

    #[test]
    fn test_session_end_display() {
        assert_eq!(
            SessionEnd::GameOver(CollisionType::Wall).to_string(),
            "hit the wall"
        );
        assert_eq!(SessionEnd::Quit.to_string(), "quit");
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_timer_delays_after_stall() {
        let mut timer = tick_timer(Duration::from_millis(250));
        assert_eq!(timer.missed_tick_behavior(), MissedTickBehavior::Delay);

        let start = tokio::time::Instant::now();
        timer.tick().await;

        // Stall for three periods, then expect one tick and a full period after it
        tokio::time::advance(Duration::from_millis(800)).await;
        let late = timer.tick().await;
        assert_eq!(late, start + Duration::from_millis(250));

        let next = timer.tick().await;
        assert_eq!(
            next.duration_since(start),
            Duration::from_millis(800 + 250)
        );
    }

    #[test]
    fn test_loop_error_reported_before_cleanup_error() {
        let summary = SessionSummary {
            score: 3,
            ticks: 9,
            end: SessionEnd::Quit,
        };

        let err = finish_session(
            Err(anyhow::anyhow!("draw failed")),
            Err(anyhow::anyhow!("leave failed")),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "draw failed");

        let err = finish_session(Ok(summary), Err(anyhow::anyhow!("leave failed"))).unwrap_err();
        assert_eq!(err.to_string(), "leave failed");

        assert_eq!(finish_session(Ok(summary), Ok(())).unwrap(), summary);
    }
}
