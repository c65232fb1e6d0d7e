//! Square-centric chess position.
//!
//! `Position` is an 8×8 grid of `Option<Piece>`. It knows nothing about
//! whose turn it is; that lives in `Game`. The move executor (`apply`) is
//! here because it is the only code that mutates the grid.

use std::fmt;

use crate::engine::types::{
    Bitboard, ChessError, Color, Coord, Move, MoveKind, Piece, PieceType, Square,
};

/// Back-rank order from file 1 to file 8.
const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Piece placement, indexed by `Square::index()`.
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    squares: [Option<Piece>; Square::NUM],
}

// ---------------------------------------------------------------------------
// Construction helpers
// ---------------------------------------------------------------------------

impl Position {
    /// Create an empty board with no pieces.
    pub fn empty() -> Self {
        Position {
            squares: [None; Square::NUM],
        }
    }

    /// Standard starting position: white on ranks 7–8, black on ranks 1–2.
    pub fn starting() -> Self {
        let mut pos = Self::empty();
        for color in [Color::White, Color::Black] {
            for (file, &kind) in (1..=8).zip(BACK_RANK.iter()) {
                pos.place(file, color.back_rank(), Piece::new(kind, color));
                pos.place(file, color.pawn_rank(), Piece::new(PieceType::Pawn, color));
            }
        }
        pos
    }

    fn place(&mut self, file: i8, rank: i8, piece: Piece) {
        if let Some(sq) = Square::new(file, rank) {
            self.put(sq, piece);
        }
    }

    // -----------------------------------------------------------------------
    // Piece manipulation (low-level)
    // -----------------------------------------------------------------------

    /// Place a piece on a square, returning whatever stood there.
    #[inline]
    pub fn put(&mut self, sq: Square, piece: Piece) -> Option<Piece> {
        self.squares[sq.index()].replace(piece)
    }

    /// Clear a square, returning whatever stood there.
    #[inline]
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()].take()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// What piece (if any) is on a given square?
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    /// Lookup by raw coordinate. Off-board coordinates read as empty.
    pub fn square_at(&self, coord: impl Into<Coord>) -> Option<Piece> {
        coord.into().square().and_then(|sq| self.piece_at(sq))
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.squares[sq.index()].is_none()
    }

    /// Every occupied square with its piece, in square order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Squares holding a piece of `color`.
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.pieces()
            .filter(|(_, p)| p.color == color)
            .map(|(sq, _)| sq)
            .collect()
    }

    /// Location of `color`'s king.
    ///
    /// A position with no king, or with two, for one side is broken; that is
    /// reported as an error rather than guessed around.
    pub fn king_sq(&self, color: Color) -> Result<Square, ChessError> {
        let mut kings = self
            .pieces()
            .filter(|(_, p)| p.is(PieceType::King, color))
            .map(|(sq, _)| sq);
        let king = kings.next().ok_or(ChessError::MissingKing(color))?;
        if kings.next().is_some() {
            return Err(ChessError::MultipleKings(color));
        }
        Ok(king)
    }

    /// An 8×8 snapshot, row 0 = rank 1, column 0 = file 1.
    pub fn board_array(&self) -> [[Option<Piece>; 8]; 8] {
        let mut board = [[None; 8]; 8];
        for (sq, piece) in self.pieces() {
            board[(sq.rank() - 1) as usize][(sq.file() - 1) as usize] = Some(piece);
        }
        board
    }

    // -----------------------------------------------------------------------
    // Move execution
    // -----------------------------------------------------------------------

    /// Apply a move's full side effects in place. Does not re-validate: the
    /// caller must have checked legality (or be simulating on a copy).
    ///
    /// Special moves are recognised from the board: a pawn reaching its last
    /// rank promotes to a queen, a pawn changing file onto an empty square
    /// captures en passant, and a king moving two files castles.
    pub fn apply(&mut self, mv: Move) -> MoveKind {
        let Some(piece) = self.remove(mv.from) else {
            return MoveKind::Normal;
        };

        // ---- Promotion ----
        if piece.kind.promotes() && mv.to.rank() == piece.color.promotion_rank() {
            self.put(mv.to, Piece::new(PieceType::Queen, piece.color));
            return MoveKind::Promotion;
        }

        // ---- En passant: the victim sits beside the mover, not on `to` ----
        if piece.kind == PieceType::Pawn && mv.file_delta() != 0 && self.is_empty(mv.to) {
            self.put(mv.to, piece);
            if let Some(victim) = Square::new(mv.to.file(), mv.from.rank()) {
                self.remove(victim);
            }
            return MoveKind::EnPassant;
        }

        let captured = self.put(mv.to, piece.moved());

        // ---- Castling: bring the corner rook to the king's inner side ----
        if piece.kind == PieceType::King && mv.file_delta() == 2 {
            let (rook_file, step) = if mv.to.file() > mv.from.file() {
                (8, -1)
            } else {
                (1, 1)
            };
            let rook_from = Square::new(rook_file, mv.from.rank());
            let rook_to = mv.to.offset(step, 0);
            if let (Some(rook_from), Some(rook_to)) = (rook_from, rook_to)
                && let Some(rook) = self.remove(rook_from)
            {
                self.put(rook_to, rook.moved());
            }
            return MoveKind::Castle;
        }

        if captured.is_some() {
            MoveKind::Capture
        } else if piece.kind == PieceType::Pawn && mv.rank_delta() == 2 {
            MoveKind::DoublePush
        } else {
            MoveKind::Normal
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Position")?;
        for rank in 1..=8 {
            write!(f, "  {rank} ")?;
            for file in 1..=8 {
                let c = self.square_at((file, rank)).map_or('.', Piece::to_char);
                write!(f, "{c}")?;
                if file < 8 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "    1 2 3 4 5 6 7 8")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
