use super::{
    config::{ApplePlacement, GameConfig},
    direction::Direction,
    state::{GameState, GameStatus, Position, Snake},
};
use anyhow::{Result, ensure};
use log::{debug, info};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Whether the head landed on the apple this tick
    pub ate_apple: bool,
    /// Status after the tick
    pub status: GameStatus,
}

/// Owns the game state and advances it one tick at a time
pub struct GameLoop {
    config: GameConfig,
    state: GameState,
    rng: StdRng,
}

impl GameLoop {
    /// Start a new game with an entropy-seeded apple generator.
    ///
    /// Fails if `config` does not pass [`GameConfig::validate`].
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Start a new game whose apple sequence is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, mut rng: StdRng) -> Result<Self> {
        config.validate()?;

        let snake = config.initial_snake();
        let apple = place_apple(&mut rng, &config, &snake);
        let state = GameState::new(snake, apple, config.grid_width, config.grid_height);

        Ok(Self { config, state, rng })
    }

    /// Resume from an arbitrary state laid out on the grid `config` describes
    pub fn from_state(config: GameConfig, state: GameState, seed: u64) -> Result<Self> {
        config.validate()?;
        ensure!(
            state.grid_width == config.grid_width && state.grid_height == config.grid_height,
            "state grid {}x{} does not match configured grid {}x{}",
            state.grid_width,
            state.grid_height,
            config.grid_width,
            config.grid_height
        );
        ensure!(!state.snake.is_empty(), "state has no snake");

        Ok(Self {
            config,
            state,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read-only view handed to the renderer
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_over(&self) -> bool {
        !self.state.is_running()
    }

    /// Change direction unless it would reverse the snake into its own neck.
    ///
    /// Returns whether the request was accepted.
    pub fn set_direction(&mut self, requested: Direction) -> bool {
        if self.state.snake.direction.is_opposite(requested) {
            return false;
        }
        self.state.snake.direction = requested;
        true
    }

    /// Advance the game by one step.
    ///
    /// Once the game is over this does nothing and keeps reporting the final status.
    pub fn tick(&mut self) -> TickOutcome {
        if let GameStatus::Over(_) = self.state.status {
            return TickOutcome {
                ate_apple: false,
                status: self.state.status,
            };
        }

        let new_head = self
            .state
            .snake
            .head()
            .moved_in_direction(self.state.snake.direction);
        let ate_apple = new_head == self.state.apple;

        // Grows by skipping the tail pop
        self.state.snake.move_snake(ate_apple);

        if ate_apple {
            self.state.score += 1;
            self.state.apple = place_apple(&mut self.rng, &self.config, &self.state.snake);
            debug!(
                "apple eaten at ({}, {}), score {}, next apple at ({}, {})",
                new_head.x, new_head.y, self.state.score, self.state.apple.x, self.state.apple.y
            );
        }

        self.state.ticks += 1;

        if let Some(collision) = self.state.collision() {
            self.state.status = GameStatus::Over(collision);
            info!(
                "game over after {} ticks: {:?} at ({}, {}), score {}",
                self.state.ticks, collision, new_head.x, new_head.y, self.state.score
            );
        }

        TickOutcome {
            ate_apple,
            status: self.state.status,
        }
    }
}

fn place_apple(rng: &mut StdRng, config: &GameConfig, snake: &Snake) -> Position {
    if config.apple_placement == ApplePlacement::AvoidSnake {
        let free: Vec<Position> = (0..config.grid_height as i32)
            .flat_map(|y| (0..config.grid_width as i32).map(move |x| Position::new(x, y)))
            .filter(|pos| !snake.body.contains(pos))
            .collect();

        if let Some(&pos) = free.choose(rng) {
            return pos;
        }
    }

    Position::new(
        rng.gen_range(0..config.grid_width) as i32,
        rng.gen_range(0..config.grid_height) as i32,
    )
}
