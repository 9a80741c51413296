//! Game rules and state management.
//!
//! This module builds the game on top of the core data structures:
//!
//! - [`GameState`] - A single game: matrix, current piece, hold, preview and totals
//! - [`Action`] / [`ActionResult`] - What a driver asks for and what happened
//! - [`GameConfig`] - Matrix size, start level and shape seed of a new game
//! - [`ShapeSource`] - Where new piece kinds come from
//! - [`formulas`] - Score, level and gravity curves
//!
//! # Game Flow
//!
//! The engine does not own a clock. A driver feeds it one operation per input
//! event and one [`GameState::elapsed`] per gravity tick:
//!
//! 1. Create a [`GameState`] with a start level (and optionally a seed)
//! 2. Move, rotate, soft drop or hold the current piece
//! 3. On each gravity tick the piece falls one row, or locks once it has landed
//! 4. A lock clears full rows, updates score and level, and spawns the preview
//! 5. Repeat until a spawned piece overlaps the stack
//!
//! # Example
//!
//! ```
//! use postris_engine::{Action, Direction, GameConfig, GameState, ShapeSeed};
//!
//! let config = GameConfig {
//!     seed: Some(ShapeSeed::from_bytes([7; 16])),
//!     ..GameConfig::default()
//! };
//! let mut state = GameState::from_config(&config).unwrap();
//!
//! state.perform(Action::Move(Direction::Left)).unwrap();
//! let result = state.perform(Action::Drop).unwrap();
//! assert!(result.locked);
//!
//! while !state.is_game_over() {
//!     state.elapsed().unwrap();
//! }
//! println!("score: {}", state.score());
//! ```

pub use self::{action::*, config::*, shape_source::*, state::*};

mod action;
mod config;
pub mod formulas;
mod shape_source;
mod state;
