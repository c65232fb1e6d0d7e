//! Attack sets: every square a colour threatens.
//!
//! Recomputed from scratch on each call. The board is small and the
//! simulate-then-check legality filter needs a fresh answer for every scratch
//! position anyway, so nothing is cached.

use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::types::{Bitboard, ChessError, Color, Mode, Square};

/// Union of the attack-mode destinations of every `color` piece.
///
/// Defended friendly squares are included, so a king can never capture onto
/// them.
pub fn attacked_squares(pos: &Position, color: Color) -> Bitboard {
    pos.pieces()
        .filter(|(_, piece)| piece.color == color)
        .fold(Bitboard::EMPTY, |acc, (sq, _)| {
            acc | movegen::candidate_destinations(pos, sq, Mode::Attacks, None)
        })
}

/// Is `sq` attacked by any piece of colour `by`?
#[inline]
pub fn is_square_attacked(pos: &Position, sq: Square, by: Color) -> bool {
    attacked_squares(pos, by).contains(sq)
}

/// Is `color`'s king attacked by the other side?
pub fn is_in_check(pos: &Position, color: Color) -> Result<bool, ChessError> {
    let king = pos.king_sq(color)?;
    Ok(is_square_attacked(pos, king, !color))
}
