//! Perft (PERFormance Test): count the leaf nodes of the legal move tree.
//!
//! Walks through the public `Game` API, so a wrong count points at move
//! generation, legality filtering or the executor.
//!
//! Reference: <https://www.chessprogramming.org/Perft_Results>

use crate::engine::game::Game;
use crate::engine::types::{ChessError, Move};

/// Number of move sequences of length `depth` from `game`.
pub fn perft(game: &Game, depth: u32) -> Result<u64, ChessError> {
    if depth == 0 {
        return Ok(1);
    }
    let moves = game.legal_moves()?;
    if depth == 1 {
        return Ok(moves.len() as u64);
    }
    let mut nodes = 0u64;
    for mv in moves {
        nodes += perft(&play(game, mv)?, depth - 1)?;
    }
    Ok(nodes)
}

/// Per-root-move breakdown of `perft`, in move-generation order.
pub fn divide(game: &Game, depth: u32) -> Result<Vec<(Move, u64)>, ChessError> {
    let mut out = Vec::new();
    for mv in game.legal_moves()? {
        let nodes = perft(&play(game, mv)?, depth.saturating_sub(1))?;
        out.push((mv, nodes));
    }
    Ok(out)
}

fn play(game: &Game, mv: Move) -> Result<Game, ChessError> {
    let mut child = game.clone();
    child.submit_move(mv.from, mv.to)?;
    Ok(child)
}
