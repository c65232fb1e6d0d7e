use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Rank step a pawn of this colour advances by.
    ///
    /// White starts on ranks 7–8 and moves toward rank 1.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Back rank for this colour's pieces in the opening setup.
    #[inline]
    pub const fn back_rank(self) -> i8 {
        match self {
            Color::White => 8,
            Color::Black => 1,
        }
    }

    /// Rank this colour's pawns start on.
    #[inline]
    pub const fn pawn_rank(self) -> i8 {
        match self {
            Color::White => 7,
            Color::Black => 2,
        }
    }

    /// Rank on which this colour's pawns promote.
    #[inline]
    pub const fn promotion_rank(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => 8,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceType
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// All piece types in order.
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Bishops, rooks and queens move along unbounded rays.
    pub fn is_sliding(self) -> bool {
        matches!(self, PieceType::Bishop | PieceType::Rook | PieceType::Queen)
    }

    /// Only pawns promote.
    pub fn promotes(self) -> bool {
        matches!(self, PieceType::Pawn)
    }

    /// Whether the `has_moved` flag is meaningful (castling eligibility).
    pub fn tracks_moved(self) -> bool {
        matches!(self, PieceType::Rook | PieceType::King)
    }

    /// Single uppercase letter for white, lowercase for black.
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceType::Pawn => write!(f, "pawn"),
            PieceType::Knight => write!(f, "knight"),
            PieceType::Bishop => write!(f, "bishop"),
            PieceType::Rook => write!(f, "rook"),
            PieceType::Queen => write!(f, "queen"),
            PieceType::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// A piece standing on a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
    has_moved: bool,
}

impl Piece {
    /// A piece that has not moved yet.
    pub const fn new(kind: PieceType, color: Color) -> Self {
        Piece {
            kind,
            color,
            has_moved: false,
        }
    }

    /// The same piece flagged as having moved. No-op for kinds that do not
    /// track the flag.
    pub fn moved(self) -> Self {
        Piece {
            has_moved: self.kind.tracks_moved(),
            ..self
        }
    }

    /// Always `false` for pawns, knights, bishops and queens.
    pub fn has_moved(self) -> bool {
        self.has_moved
    }

    #[inline]
    pub fn is(self, kind: PieceType, color: Color) -> bool {
        self.kind == kind && self.color == color
    }

    pub fn to_char(self) -> char {
        self.kind.to_char(self.color)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}

// ---------------------------------------------------------------------------
// Coord / Square
// ---------------------------------------------------------------------------

/// A raw `(file, rank)` pair as supplied by a caller. May be off the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub file: i8,
    pub rank: i8,
}

impl Coord {
    pub const fn new(file: i8, rank: i8) -> Self {
        Coord { file, rank }
    }

    /// The on-board square, or `None` if either component is outside 1..=8.
    #[inline]
    pub fn square(self) -> Option<Square> {
        Square::new(self.file, self.rank)
    }
}

impl From<(i8, i8)> for Coord {
    fn from((file, rank): (i8, i8)) -> Self {
        Coord { file, rank }
    }
}

impl From<Square> for Coord {
    fn from(sq: Square) -> Self {
        Coord {
            file: sq.file(),
            rank: sq.rank(),
        }
    }
}

impl TryFrom<Coord> for Square {
    type Error = ChessError;

    fn try_from(c: Coord) -> Result<Self, Self::Error> {
        c.square().ok_or(ChessError::OffBoardCoordinate {
            file: c.file,
            rank: c.rank,
        })
    }
}

/// An on-board square. Files and ranks are numbered 1..=8; the index is
/// `(rank - 1) * 8 + (file - 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "Coord", try_from = "Coord")]
pub struct Square(u8);

impl Square {
    pub const NUM: usize = 64;

    /// Build a square from 1-based file and rank, rejecting anything off the
    /// board.
    #[inline]
    pub fn new(file: i8, rank: i8) -> Option<Self> {
        if (1..=8).contains(&file) && (1..=8).contains(&rank) {
            Some(Square(((rank - 1) * 8 + (file - 1)) as u8))
        } else {
            None
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn file(self) -> i8 {
        (self.0 & 7) as i8 + 1
    }

    #[inline]
    pub fn rank(self) -> i8 {
        (self.0 >> 3) as i8 + 1
    }

    /// The square `(df, dr)` away, if it is still on the board.
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Self> {
        Square::new(self.file() + df, self.rank() + dr)
    }

    /// All 64 squares in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..Self::NUM as u8).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.file(), self.rank())
    }
}

// ---------------------------------------------------------------------------
// Bitboard
// ---------------------------------------------------------------------------

/// A set of squares, one bit per square.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bitboard(pub u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const ALL: Bitboard = Bitboard(!0u64);

    #[inline]
    pub fn contains(self, sq: Square) -> bool {
        self.0 & (1u64 << sq.0) != 0
    }

    #[inline]
    pub fn insert(&mut self, sq: Square) {
        self.0 |= 1u64 << sq.0;
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Pop the lowest-index square.
    #[inline]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            let sq = Square(self.0.trailing_zeros() as u8);
            self.0 &= self.0 - 1; // clear LSB
            Some(sq)
        }
    }

    /// Iterate over member squares in ascending index order.
    #[inline]
    pub fn iter(self) -> BitboardIter {
        BitboardIter(self)
    }
}

/// Iterator over set bits in a `Bitboard`.
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        self.0.pop_lsb()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.0.len();
        (count, Some(count))
    }
}

impl ExactSizeIterator for BitboardIter {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;

    fn into_iter(self) -> BitboardIter {
        self.iter()
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        let mut bb = Bitboard::EMPTY;
        for sq in iter {
            bb.insert(sq);
        }
        bb
    }
}

impl std::ops::BitAnd for Bitboard {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Bitboard(self.0 & rhs.0)
    }
}

impl std::ops::BitOr for Bitboard {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Bitboard(self.0 | rhs.0)
    }
}

impl std::ops::Not for Bitboard {
    type Output = Self;
    #[inline]
    fn not(self) -> Self {
        Bitboard(!self.0)
    }
}

impl std::ops::BitAndAssign for Bitboard {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl std::ops::BitOrAssign for Bitboard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bitboard(0x{:016x})", self.0)?;
        for rank in 1..=8 {
            write!(f, "  {rank} ")?;
            for file in 1..=8 {
                let set = Square::new(file, rank).is_some_and(|sq| self.contains(sq));
                write!(f, "{}", if set { '1' } else { '.' })?;
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
// Move / MoveKind / Mode
// ---------------------------------------------------------------------------

/// A candidate move: origin and destination. Special moves are inferred from
/// the board when the move is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move { from, to }
    }

    /// Rank distance covered by the move.
    #[inline]
    pub fn rank_delta(self) -> i8 {
        (self.to.rank() - self.from.rank()).abs()
    }

    /// File distance covered by the move.
    #[inline]
    pub fn file_delta(self) -> i8 {
        (self.to.file() - self.from.file()).abs()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// What applying a move actually did, as inferred by the executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Normal,
    Capture,
    DoublePush,
    EnPassant,
    Castle,
    Promotion,
}

/// Whether a piece's destinations are wanted as moves or as threatened
/// squares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Squares the piece may move to (ignoring self-check).
    Moves,
    /// Squares the piece threatens, including defended friendly squares.
    Attacks,
}

// ---------------------------------------------------------------------------
// GameStatus / GameState
// ---------------------------------------------------------------------------

/// Check status of the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// The side to move is not in check.
    None,
    Check,
}

impl GameStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GameStatus::None => "none",
            GameStatus::Check => "check",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Turn and check status, as reported to a presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub turn: Color,
    pub status: GameStatus,
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Domain errors for the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    #[error("coordinate ({file},{rank}) is off the board")]
    OffBoardCoordinate { file: i8, rank: i8 },

    /// Raised before any destination is looked at, unlike `IllegalDestination`:
    /// with no piece on the origin there is no mover to generate moves for.
    #[error("no piece on {0}")]
    EmptySquare(Square),

    #[error("piece on {square} does not belong to {expected}, whose turn it is")]
    WrongTurn { square: Square, expected: Color },

    #[error("illegal move: {from} -> {to}")]
    IllegalDestination { from: Square, to: Square },

    #[error("position has no {0} king")]
    MissingKing(Color),

    #[error("position has more than one {0} king")]
    MultipleKings(Color),
}

impl ChessError {
    /// Routine rejection of a requested move, as opposed to a broken
    /// position invariant.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            ChessError::MissingKing(_) | ChessError::MultipleKings(_)
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
