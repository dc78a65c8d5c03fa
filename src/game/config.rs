use std::time::Duration;

use anyhow::{Result, ensure};

use super::direction::Direction;
use super::state::{Position, Snake};

/// Where a freshly placed apple may land
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplePlacement {
    /// Uniform over the whole grid, snake cells included
    #[default]
    Anywhere,
    /// Uniform over the cells the snake does not occupy
    AvoidSnake,
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Width of the game grid, in cells
    pub grid_width: usize,
    /// Height of the game grid, in cells
    pub grid_height: usize,
    /// Head position at game start
    pub start_position: Position,
    /// Initial direction of travel
    pub start_direction: Direction,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Time between two ticks
    pub tick_interval_ms: u64,
    pub apple_placement: ApplePlacement,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            start_position: Position::new(5, 10),
            start_direction: Direction::Right,
            initial_snake_length: 3,
            tick_interval_ms: 250,
            apple_placement: ApplePlacement::Anywhere,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size, starting in the middle row
    pub fn new(width: usize, height: usize) -> Self {
        let defaults = Self::default();
        Self {
            grid_width: width,
            grid_height: height,
            start_position: Position::new(
                defaults.start_position.x.min(width as i32 - 1),
                (height / 2) as i32,
            ),
            ..defaults
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// The snake a new game starts with
    pub fn initial_snake(&self) -> Snake {
        Snake::new(
            self.start_position,
            self.start_direction,
            self.initial_snake_length,
        )
    }

    /// Reject configurations a game cannot start from
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_width > 0 && self.grid_height > 0,
            "grid must be at least 1x1, got {}x{}",
            self.grid_width,
            self.grid_height
        );
        ensure!(
            self.grid_width <= i32::MAX as usize && self.grid_height <= i32::MAX as usize,
            "grid {}x{} is too large",
            self.grid_width,
            self.grid_height
        );
        ensure!(self.initial_snake_length > 0, "snake length must be positive");
        ensure!(self.tick_interval_ms > 0, "tick interval must be positive");

        let snake = self.initial_snake();
        for segment in &snake.body {
            ensure!(
                segment.x >= 0
                    && segment.x < self.grid_width as i32
                    && segment.y >= 0
                    && segment.y < self.grid_height as i32,
                "initial snake segment ({}, {}) lies outside the {}x{} grid",
                segment.x,
                segment.y,
                self.grid_width,
                self.grid_height
            );
        }

        Ok(())
    }
}
