//! Grid Snake - a terminal Snake game on a fixed-tick game loop
//!
//! This library provides:
//! - Core game logic, free of any terminal dependency (game module)
//! - Key mapping from terminal events to directions (input module)
//! - TUI rendering of a game state (render module)
//! - The interactive session that schedules ticks and input (modes module)

pub mod game;
pub mod input;
pub mod modes;
pub mod render;
