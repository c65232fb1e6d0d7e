pub mod attacks;
pub mod board;
pub mod game;
pub mod movegen;
pub mod perft;
pub mod rays;
pub mod types;

pub use board::Position;
pub use game::{Game, MoveRecord};
pub use movegen::{all_legal_moves, candidate_destinations, is_legal, legal_moves};
pub use types::*;

/// Start a game from the standard opening position.
pub fn new_game() -> Game {
    Game::new()
}
