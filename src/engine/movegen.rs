//! Move generation.
//!
//! Pipeline:
//!   1. Pseudo-legal destinations per piece (`candidate_destinations`).
//!   2. Filter: apply the move to a copy, verify the mover's king is not
//!      attacked afterwards.
//!
//! The last move played is passed in explicitly; it is only needed to offer
//! en passant.

use tracing::trace;

use crate::engine::attacks;
use crate::engine::board::Position;
use crate::engine::rays::{self, DIAGONAL, ORTHOGONAL, RayKind, Step, UNLIMITED};
use crate::engine::types::{Bitboard, ChessError, Color, Coord, Mode, Move, Piece, PieceType, Square};

const KNIGHT_JUMPS: [Step; 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

// =========================================================================
// Public API
// =========================================================================

/// Legal destinations for the piece standing on `origin`.
///
/// Off-board or empty origins yield an empty set. An error means the
/// position itself is broken (the mover has no king, or several).
pub fn legal_moves(
    pos: &Position,
    origin: impl Into<Coord>,
    last_move: Option<Move>,
) -> Result<Bitboard, ChessError> {
    let Some(from) = origin.into().square() else {
        return Ok(Bitboard::EMPTY);
    };

    let candidates = candidate_destinations(pos, from, Mode::Moves, last_move);
    let mut legal = Bitboard::EMPTY;
    for to in candidates {
        let mv = Move::new(from, to);
        if is_legal(pos, mv)? {
            legal.insert(to);
        } else {
            trace!(%mv, "candidate leaves king in check");
        }
    }
    Ok(legal)
}

/// Every legal move for `color`, in origin-square order.
pub fn all_legal_moves(
    pos: &Position,
    color: Color,
    last_move: Option<Move>,
) -> Result<Vec<Move>, ChessError> {
    let mut moves = Vec::with_capacity(64);
    for sq in pos.occupied_by(color) {
        let targets = legal_moves(pos, sq, last_move)?;
        moves.extend(targets.iter().map(|to| Move::new(sq, to)));
    }
    Ok(moves)
}

/// Would playing `mv` leave the mover's own king safe?
///
/// The move is simulated on a scratch copy with the executor's full side
/// effects (en passant victim, castling rook, promotion), so every way of
/// exposing the king is caught without tracking pins.
pub fn is_legal(pos: &Position, mv: Move) -> Result<bool, ChessError> {
    let Some(piece) = pos.piece_at(mv.from) else {
        return Ok(false);
    };
    let mut scratch = pos.clone();
    scratch.apply(mv);
    let king = scratch.king_sq(piece.color)?;
    Ok(!attacks::is_square_attacked(&scratch, king, !piece.color))
}

// =========================================================================
// Pseudo-legal destinations
// =========================================================================

/// Destinations matching the movement pattern of the piece on `origin`,
/// ignoring whether they expose its own king.
///
/// In `Mode::Attacks` the result is the set of squares the piece threatens:
/// defended friendly squares are included, pawn pushes, castling and en
/// passant are not.
pub fn candidate_destinations(
    pos: &Position,
    origin: Square,
    mode: Mode,
    last_move: Option<Move>,
) -> Bitboard {
    let Some(piece) = pos.piece_at(origin) else {
        return Bitboard::EMPTY;
    };
    let color = piece.color;
    let reach = if piece.kind.is_sliding() { UNLIMITED } else { 1 };

    match piece.kind {
        PieceType::Pawn => pawn_destinations(pos, origin, color, mode, last_move),
        PieceType::Knight => knight_destinations(pos, origin, color, mode),
        PieceType::Bishop => rays::cast_all(pos, origin, color, &DIAGONAL, reach, mode),
        PieceType::Rook => rays::cast_all(pos, origin, color, &ORTHOGONAL, reach, mode),
        PieceType::Queen => {
            rays::cast_all(pos, origin, color, &ORTHOGONAL, reach, mode)
                | rays::cast_all(pos, origin, color, &DIAGONAL, reach, mode)
        }
        PieceType::King => king_destinations(pos, origin, piece, mode),
    }
}

// =========================================================================
// Pawn
// =========================================================================

fn pawn_destinations(
    pos: &Position,
    origin: Square,
    color: Color,
    mode: Mode,
    last_move: Option<Move>,
) -> Bitboard {
    let dir = color.forward();
    let mut out = Bitboard::EMPTY;

    // --- Diagonals: captures as moves, always threatened ---
    for df in [-1, 1] {
        out |= rays::cast(pos, origin, color, (df, dir), 1, mode, RayKind::CaptureOnly);
    }

    if mode == Mode::Attacks {
        return out;
    }

    // --- Single / double push ---
    let reach = if origin.rank() == color.pawn_rank() { 2 } else { 1 };
    out |= rays::cast(pos, origin, color, (0, dir), reach, mode, RayKind::AdvanceOnly);

    // --- En passant ---
    if let Some(target) = en_passant_target(pos, origin, color, last_move) {
        out.insert(target);
    }
    out
}

/// The square behind an enemy pawn that just double-pushed alongside
/// `origin`.
fn en_passant_target(
    pos: &Position,
    origin: Square,
    color: Color,
    last_move: Option<Move>,
) -> Option<Square> {
    let last = last_move?;
    let pushed = pos.piece_at(last.to)?;
    if pushed.kind != PieceType::Pawn || pushed.color == color || last.rank_delta() != 2 {
        return None;
    }
    if last.to.rank() != origin.rank() || (last.to.file() - origin.file()).abs() != 1 {
        return None;
    }
    Square::new(last.to.file(), (last.from.rank() + last.to.rank()) / 2)
}

// =========================================================================
// Knight
// =========================================================================

fn knight_destinations(pos: &Position, origin: Square, color: Color, mode: Mode) -> Bitboard {
    KNIGHT_JUMPS
        .iter()
        .filter_map(|&(df, dr)| origin.offset(df, dr))
        .filter(|&to| match pos.piece_at(to) {
            None => true,
            Some(other) => other.color != color || mode == Mode::Attacks,
        })
        .collect()
}

// =========================================================================
// King (including castling)
// =========================================================================

fn king_destinations(pos: &Position, origin: Square, king: Piece, mode: Mode) -> Bitboard {
    let adjacent = rays::cast_all(pos, origin, king.color, &ORTHOGONAL, 1, mode)
        | rays::cast_all(pos, origin, king.color, &DIAGONAL, 1, mode);
    if mode == Mode::Attacks {
        return adjacent;
    }

    let danger = attacks::attacked_squares(pos, !king.color);
    let mut out = adjacent;
    if !king.has_moved() {
        out |= castling_destinations(pos, origin, king.color, danger);
    }
    out & !danger
}

/// Castling landing squares: kingside toward the file-8 rook, queenside
/// toward the file-1 rook.
///
/// Offered only with an unmoved rook in the corner, nothing in between, and
/// none of the king's current, crossed or landing squares in `danger`.
fn castling_destinations(pos: &Position, origin: Square, color: Color, danger: Bitboard) -> Bitboard {
    let mut out = Bitboard::EMPTY;

    for (rook_file, step) in [(8i8, 1i8), (1, -1)] {
        if (rook_file - origin.file()).abs() < 3 {
            continue;
        }
        let Some(rook_sq) = Square::new(rook_file, origin.rank()) else {
            continue;
        };
        let rook_ready = pos
            .piece_at(rook_sq)
            .is_some_and(|p| p.is(PieceType::Rook, color) && !p.has_moved());
        if !rook_ready {
            continue;
        }

        let between_clear = (1..(rook_file - origin.file()).abs())
            .filter_map(|i| origin.offset(step * i, 0))
            .all(|sq| pos.is_empty(sq));
        if !between_clear {
            continue;
        }

        let path: Vec<Square> = (0..=2).filter_map(|i| origin.offset(step * i, 0)).collect();
        if path.len() == 3 && path.iter().all(|&sq| !danger.contains(sq)) {
            out.insert(path[2]);
        }
    }
    out
}

// =========================================================================
// Tests
// =========================================================================
