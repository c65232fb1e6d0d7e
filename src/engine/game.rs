//! Stateful game controller wrapping Position.
//!
//! `Game` owns the live position, the side to move, the check status and the
//! last move played. It is the only place the live position is mutated, and
//! only after a requested move has been validated.

use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::attacks;
use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::types::{
    Bitboard, ChessError, Color, Coord, GameState, GameStatus, Move, MoveKind, Piece, Square,
};

// =========================================================================
// MoveRecord
// =========================================================================

/// Outcome of an accepted move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub mv: Move,
    /// The piece that moved, as it stood before moving.
    pub piece: Piece,
    /// Captured piece, including a pawn taken en passant.
    pub captured: Option<Piece>,
    pub kind: MoveKind,
    /// Turn and check status after the move.
    pub state_after: GameState,
}

// =========================================================================
// Game
// =========================================================================

/// A chess game: one position, whose turn it is, and whether that side is in
/// check.
#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    turn: Color,
    status: GameStatus,
    /// Needed to offer en passant. `None` before the first move.
    last_move: Option<Move>,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position, white to move.
    pub fn new() -> Self {
        Self {
            position: Position::starting(),
            turn: Color::White,
            status: GameStatus::None,
            last_move: None,
        }
    }

    /// Start from an arbitrary setup. Fails if `turn` has no king (or more
    /// than one), since check status cannot be computed.
    pub fn from_position(position: Position, turn: Color) -> Result<Self, ChessError> {
        let status = status_for(&position, turn)?;
        Ok(Self {
            position,
            turn,
            status,
            last_move: None,
        })
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Current board position (read-only).
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Check status of the side to move.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Side to move.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Turn and status together.
    pub fn state(&self) -> GameState {
        GameState {
            turn: self.turn,
            status: self.status,
        }
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// What stands on `coord`. Off-board reads as empty.
    pub fn square_at(&self, coord: impl Into<Coord>) -> Option<Piece> {
        self.position.square_at(coord)
    }

    /// 8×8 snapshot for rendering, row 0 = rank 1.
    pub fn board_array(&self) -> [[Option<Piece>; 8]; 8] {
        self.position.board_array()
    }

    // -----------------------------------------------------------------
    // Move queries
    // -----------------------------------------------------------------

    /// Legal destinations for the piece on `coord`.
    ///
    /// Empty when the square is off-board, empty, or holds a piece of the
    /// side not to move.
    pub fn request_moves(&self, coord: impl Into<Coord>) -> Result<Bitboard, ChessError> {
        let coord = coord.into();
        match self.position.square_at(coord) {
            Some(piece) if piece.color == self.turn => {
                movegen::legal_moves(&self.position, coord, self.last_move)
            }
            _ => Ok(Bitboard::EMPTY),
        }
    }

    /// All legal moves for the side to move.
    pub fn legal_moves(&self) -> Result<Vec<Move>, ChessError> {
        movegen::all_legal_moves(&self.position, self.turn, self.last_move)
    }

    // -----------------------------------------------------------------
    // Make move
    // -----------------------------------------------------------------

    /// Play a move for the side to move.
    ///
    /// A rejected move leaves the game untouched. Rejections
    /// (`ChessError::is_rejection`) are routine; any other error means the
    /// position is broken and nothing was applied either.
    pub fn submit_move(
        &mut self,
        from: impl Into<Coord>,
        to: impl Into<Coord>,
    ) -> Result<MoveRecord, ChessError> {
        let (from, to) = (from.into(), to.into());
        let result = self.try_move(from, to);
        match &result {
            Ok(record) => debug!(
                mv = %record.mv,
                kind = ?record.kind,
                turn = %record.state_after.turn,
                status = %record.state_after.status,
                "move accepted"
            ),
            Err(e) if e.is_rejection() => debug!(?from, ?to, "move rejected: {e}"),
            Err(e) => warn!(?from, ?to, "position invariant violated: {e}"),
        }
        result
    }

    fn try_move(&mut self, from: Coord, to: Coord) -> Result<MoveRecord, ChessError> {
        let from = Square::try_from(from)?;
        let to = Square::try_from(to)?;
        let piece = self
            .position
            .piece_at(from)
            .ok_or(ChessError::EmptySquare(from))?;
        if piece.color != self.turn {
            return Err(ChessError::WrongTurn {
                square: from,
                expected: self.turn,
            });
        }

        let legal = movegen::legal_moves(&self.position, from, self.last_move)?;
        if !legal.contains(to) {
            return Err(ChessError::IllegalDestination { from, to });
        }

        // Build the next state on a copy so a broken position cannot leave
        // the game half-updated.
        let mv = Move::new(from, to);
        let mut next = self.position.clone();
        let mut captured = next.piece_at(to);
        let kind = next.apply(mv);
        if kind == MoveKind::EnPassant {
            captured = Square::new(to.file(), from.rank()).and_then(|sq| self.position.piece_at(sq));
        }
        let next_turn = !self.turn;
        let status = status_for(&next, next_turn)?;

        self.position = next;
        self.turn = next_turn;
        self.status = status;
        self.last_move = Some(mv);

        Ok(MoveRecord {
            mv,
            piece,
            captured,
            kind,
            state_after: self.state(),
        })
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// `Check` iff `turn`'s king is attacked in `pos`.
fn status_for(pos: &Position, turn: Color) -> Result<GameStatus, ChessError> {
    Ok(if attacks::is_in_check(pos, turn)? {
        GameStatus::Check
    } else {
        GameStatus::None
    })
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::PieceType;

    fn sq(file: i8, rank: i8) -> Square {
        Square::new(file, rank).unwrap()
    }

    fn play(g: &mut Game, from: (i8, i8), to: (i8, i8)) -> MoveRecord {
        g.submit_move(from, to).unwrap()
    }

    // -----------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------

    #[test]
    fn new_game_is_active() {
        let g = Game::new();
        assert_eq!(g.status(), GameStatus::None);
        assert_eq!(g.turn(), Color::White);
        assert_eq!(g.last_move(), None);
        assert_eq!(g.position(), &Position::starting());
    }

    #[test]
    fn from_position_computes_check() {
        let mut pos = Position::empty();
        pos.put(sq(5, 1), Piece::new(PieceType::King, Color::White));
        pos.put(sq(5, 8), Piece::new(PieceType::Rook, Color::Black));
        pos.put(sq(1, 8), Piece::new(PieceType::King, Color::Black));
        let g = Game::from_position(pos, Color::White).unwrap();
        assert_eq!(g.status(), GameStatus::Check);
    }

    #[test]
    fn from_position_without_king_fails() {
        let err = Game::from_position(Position::empty(), Color::White).unwrap_err();
        assert_eq!(err, ChessError::MissingKing(Color::White));
        assert!(!err.is_rejection());
    }

    // -----------------------------------------------------------------
    // Move queries
    // -----------------------------------------------------------------

    #[test]
    fn only_side_to_move_has_moves() {
        let g = Game::new();
        assert_eq!(g.legal_moves().unwrap().len(), 20);
        for file in 1..=8 {
            assert!(g.request_moves((file, 2)).unwrap().is_empty());
            assert!(g.request_moves((file, 1)).unwrap().is_empty());
        }
        assert_eq!(g.request_moves((5, 7)).unwrap().len(), 2);
    }

    #[test]
    fn request_moves_off_board() {
        let g = Game::new();
        assert!(g.request_moves((0, 0)).unwrap().is_empty());
        assert!(g.request_moves((9, 7)).unwrap().is_empty());
    }

    // -----------------------------------------------------------------
    // Making moves
    // -----------------------------------------------------------------

    #[test]
    fn accepted_move_flips_turn() {
        let mut g = Game::new();
        let record = play(&mut g, (5, 7), (5, 5));
        assert_eq!(record.kind, MoveKind::DoublePush);
        assert_eq!(record.piece, Piece::new(PieceType::Pawn, Color::White));
        assert_eq!(record.captured, None);
        assert_eq!(g.turn(), Color::Black);
        assert_eq!(g.status(), GameStatus::None);
        assert_eq!(g.last_move(), Some(Move::new(sq(5, 7), sq(5, 5))));
    }

    #[test]
    fn wrong_turn_rejected() {
        let mut g = Game::new();
        let err = g.submit_move((5, 2), (5, 4)).unwrap_err();
        assert_eq!(
            err,
            ChessError::WrongTurn {
                square: sq(5, 2),
                expected: Color::White
            }
        );
        assert_eq!(g.turn(), Color::White);
        assert_eq!(g.position(), &Position::starting());
    }

    #[test]
    fn illegal_destination_rejected() {
        let mut g = Game::new();
        let err = g.submit_move((5, 7), (5, 4)).unwrap_err();
        assert_eq!(
            err,
            ChessError::IllegalDestination {
                from: sq(5, 7),
                to: sq(5, 4)
            }
        );
        assert!(err.is_rejection());
        assert_eq!(g.last_move(), None);
    }

    #[test]
    fn empty_and_off_board_rejected() {
        let mut g = Game::new();
        assert_eq!(
            g.submit_move((4, 4), (4, 3)).unwrap_err(),
            ChessError::EmptySquare(sq(4, 4))
        );
        assert_eq!(
            g.submit_move((5, 7), (5, 9)).unwrap_err(),
            ChessError::OffBoardCoordinate { file: 5, rank: 9 }
        );
        assert_eq!(
            g.submit_move((0, 7), (1, 6)).unwrap_err(),
            ChessError::OffBoardCoordinate { file: 0, rank: 7 }
        );
        assert_eq!(g.turn(), Color::White);
    }

    #[test]
    fn check_detected_after_move() {
        // 1. (6,7)-(6,6)  (5,2)-(5,3)  2. (7,7)-(7,5)  (4,1)-(8,5)
        let mut g = Game::new();
        play(&mut g, (6, 7), (6, 6));
        play(&mut g, (5, 2), (5, 3));
        play(&mut g, (7, 7), (7, 5));
        let record = play(&mut g, (4, 1), (8, 5));
        assert_eq!(record.state_after.status, GameStatus::Check);
        assert_eq!(g.status(), GameStatus::Check);
        assert_eq!(g.turn(), Color::White);
        // Checkmate is not detected; white simply has no legal moves.
        assert!(g.legal_moves().unwrap().is_empty());
    }

    #[test]
    fn check_clears_after_block() {
        let mut g = Game::new();
        play(&mut g, (5, 7), (5, 6));
        play(&mut g, (6, 2), (6, 3));
        play(&mut g, (4, 8), (8, 4));
        assert_eq!(g.status(), GameStatus::Check);
        let record = play(&mut g, (7, 2), (7, 3));
        assert_eq!(record.state_after.status, GameStatus::None);
    }

    #[test]
    fn en_passant_through_game() {
        let mut g = Game::new();
        play(&mut g, (5, 7), (5, 5));
        play(&mut g, (1, 2), (1, 3));
        play(&mut g, (5, 5), (5, 4));
        play(&mut g, (4, 2), (4, 4));
        assert!(g.request_moves((5, 4)).unwrap().contains(sq(4, 3)));

        let record = play(&mut g, (5, 4), (4, 3));
        assert_eq!(record.kind, MoveKind::EnPassant);
        assert_eq!(record.captured, Some(Piece::new(PieceType::Pawn, Color::Black)));
        assert_eq!(g.square_at((4, 4)), None);
        assert_eq!(
            g.square_at((4, 3)),
            Some(Piece::new(PieceType::Pawn, Color::White))
        );
    }

    #[test]
    fn en_passant_expires_after_one_move() {
        let mut g = Game::new();
        play(&mut g, (5, 7), (5, 5));
        play(&mut g, (1, 2), (1, 3));
        play(&mut g, (5, 5), (5, 4));
        play(&mut g, (4, 2), (4, 4));
        play(&mut g, (8, 7), (8, 6));
        play(&mut g, (1, 3), (1, 4));
        assert!(!g.request_moves((5, 4)).unwrap().contains(sq(4, 3)));
    }

    #[test]
    fn broken_position_leaves_game_untouched() {
        // Black has no king: applying a white move cannot compute black's
        // check status.
        let mut pos = Position::empty();
        pos.put(sq(5, 8), Piece::new(PieceType::King, Color::White));
        pos.put(sq(1, 8), Piece::new(PieceType::Rook, Color::White));
        let mut g = Game::from_position(pos.clone(), Color::White).unwrap();
        let err = g.submit_move((1, 8), (1, 5)).unwrap_err();
        assert_eq!(err, ChessError::MissingKing(Color::Black));
        assert_eq!(g.position(), &pos);
        assert_eq!(g.turn(), Color::White);
    }

    #[test]
    fn state_serializes() {
        let g = Game::new();
        let json = serde_json::to_string(&g.state()).unwrap();
        assert_eq!(json, r#"{"turn":"white","status":"none"}"#);
    }
}
