//! Chess rules engine.
//!
//! Decides whether a requested move is legal under full chess rules
//! (movement patterns, check avoidance, castling, en passant, promotion) and
//! produces the resulting position. Rendering and input parsing are left to
//! the caller; see [`engine::Game`] for the entry point.

pub mod config;
pub mod engine;

pub use engine::{ChessError, Game, Position, new_game};
