//! Game logic orchestrating the core data structures.
//!
//! - [`Board`] - the command-driven state machine (collision, locking, line
//!   clears, spawn, game over)
//! - [`BoardEvent`] - the transition classification returned by every command
//! - [`Progress`] - cleared-line and piece counters with level derivation
//! - [`ShapeSource`] / [`UniformSource`] - pluggable upcoming-shape sequence
//!
//! # Game Flow
//!
//! A driver owns one [`Board`] and serializes timer ticks and key events onto
//! it:
//!
//! 1. Construct the board; the first piece spawns immediately.
//! 2. Key events call `move_left` / `move_right` / `move_down` / `rotate_cw`
//!    / `hard_drop`; the timer calls `step`.
//! 3. Each command returns a [`BoardEvent`] describing what happened; the
//!    driver re-reads the query surface and redraws.
//! 4. On [`BoardEvent::GameOver`] only `new_game` changes anything further.
//!
//! # Example
//!
//! ```
//! use gridfall_engine::{Board, BoardEvent, GridSize};
//!
//! let size = GridSize::new(10, 20).unwrap();
//! let mut board = Board::new(size);
//!
//! match board.step() {
//!     BoardEvent::PieceMoved => { /* gravity moved the piece down */ }
//!     BoardEvent::Locked { cleared_lines, .. } => {
//!         println!("locked, cleared {cleared_lines} lines");
//!     }
//!     _ => {}
//! }
//! ```

pub use self::{board::*, progress::*, shape_source::*};

mod board;
mod progress;
mod shape_source;
