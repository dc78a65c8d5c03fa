//! Core game logic module for Snake
//!
//! Pure state and state transitions, with no I/O or rendering dependencies, so
//! the tick logic can be driven and tested without a terminal.

pub mod config;
pub mod direction;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use config::{ApplePlacement, GameConfig};
pub use direction::Direction;
pub use engine::{GameLoop, TickOutcome};
pub use state::{CollisionType, GameState, GameStatus, Position, Snake};
