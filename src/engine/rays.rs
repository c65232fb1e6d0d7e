//! Ray casting over the square grid.
//!
//! Every piece that moves along a line (including the king and the pawn's
//! single steps, as length-limited rays) goes through `cast`.

use crate::engine::board::Position;
use crate::engine::types::{Bitboard, Color, Mode, Square};

/// A `(file, rank)` step.
pub type Step = (i8, i8);

pub const ORTHOGONAL: [Step; 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const DIAGONAL: [Step; 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Longest possible ray on an 8×8 board.
pub const UNLIMITED: u8 = 7;

/// How a ray treats the squares it reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RayKind {
    /// Sliders and the king: run over empty squares, end on the first piece.
    Slide,
    /// Pawn diagonals: only an enemy piece makes a move; every square counts
    /// as an attack.
    CaptureOnly,
    /// Pawn pushes: only empty squares, never a capture.
    AdvanceOnly,
}

/// Walk from `origin` in direction `step` for up to `max_steps` squares.
///
/// `color` is the colour of the piece the ray belongs to. The origin itself is
/// never included.
pub fn cast(
    pos: &Position,
    origin: Square,
    color: Color,
    step: Step,
    max_steps: u8,
    mode: Mode,
    kind: RayKind,
) -> Bitboard {
    let mut out = Bitboard::EMPTY;
    let mut current = origin;

    for _ in 0..max_steps {
        let Some(next) = current.offset(step.0, step.1) else {
            break;
        };
        current = next;

        match (pos.piece_at(next), kind) {
            (None, RayKind::CaptureOnly) => {
                if mode == Mode::Attacks {
                    out.insert(next);
                }
                break;
            }
            (None, _) => out.insert(next),
            (Some(_), RayKind::AdvanceOnly) => break,
            (Some(other), _) if other.color == color => {
                // Defended square: threatened, but not a destination.
                if mode == Mode::Attacks {
                    out.insert(next);
                }
                break;
            }
            (Some(_), _) => {
                out.insert(next);
                break;
            }
        }
    }
    out
}

/// Union of `cast` over several directions.
pub fn cast_all(
    pos: &Position,
    origin: Square,
    color: Color,
    steps: &[Step],
    max_steps: u8,
    mode: Mode,
) -> Bitboard {
    steps.iter().fold(Bitboard::EMPTY, |acc, &step| {
        acc | cast(pos, origin, color, step, max_steps, mode, RayKind::Slide)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
