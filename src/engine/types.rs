use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// The two sides in a game. Wire encoding: black = 0, white = 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Side {
    Black,
    White,
}

impl Side {
    /// Index for array lookups: Black=0, White=1.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Wire code: 0 for black, 1 for white.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// The side that owns a timeline: white for `l >= 0`, black for `l < 0`.
    #[inline]
    pub const fn of_timeline(l: i32) -> Side {
        if l >= 0 {
            Side::White
        } else {
            Side::Black
        }
    }

    /// Pawn advance direction along `y`: black moves +y, white moves -y.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Side::Black => 1,
            Side::White => -1,
        }
    }

    /// Home rank of the back-rank pieces: y=0 for black, y=7 for white.
    #[inline]
    pub const fn home_rank(self) -> i8 {
        match self {
            Side::Black => 0,
            Side::White => 7,
        }
    }

    /// Home rank of the pawns: y=1 for black, y=6 for white.
    #[inline]
    pub const fn pawn_rank(self) -> i8 {
        match self {
            Side::Black => 1,
            Side::White => 6,
        }
    }

    /// The rank a pawn promotes on: y=7 for black, y=0 for white.
    #[inline]
    pub const fn promotion_rank(self) -> i8 {
        match self {
            Side::Black => 7,
            Side::White => 0,
        }
    }
}

impl std::ops::Not for Side {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Side::Black => Side::White,
            Side::White => Side::Black,
        }
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> u8 {
        side.code()
    }
}

impl TryFrom<u8> for Side {
    type Error = String;
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Side::Black),
            1 => Ok(Side::White),
            other => Err(format!("invalid side code: {other}")),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Black => write!(f, "black"),
            Side::White => write!(f, "white"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceKind
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// All piece kinds in order.
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Lowercase wire name ("pawn", "knight", ...).
    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        }
    }

    /// Parse a lowercase wire name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "pawn" => Some(PieceKind::Pawn),
            "knight" => Some(PieceKind::Knight),
            "bishop" => Some(PieceKind::Bishop),
            "rook" => Some(PieceKind::Rook),
            "queen" => Some(PieceKind::Queen),
            "king" => Some(PieceKind::King),
            _ => None,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Promotion
// ---------------------------------------------------------------------------

/// A pawn promotion choice. Wire codes: 1=queen, 2=knight, 3=rook, 4=bishop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Promotion {
    Queen = 1,
    Knight = 2,
    Rook = 3,
    Bishop = 4,
}

impl Promotion {
    /// Wire code (1..=4).
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// The piece kind the pawn becomes.
    pub const fn kind(self) -> PieceKind {
        match self {
            Promotion::Queen => PieceKind::Queen,
            Promotion::Knight => PieceKind::Knight,
            Promotion::Rook => PieceKind::Rook,
            Promotion::Bishop => PieceKind::Bishop,
        }
    }
}

impl From<Promotion> for u8 {
    fn from(p: Promotion) -> u8 {
        p.code()
    }
}

impl TryFrom<u8> for Promotion {
    type Error = String;
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Promotion::Queen),
            2 => Ok(Promotion::Knight),
            3 => Ok(Promotion::Rook),
            4 => Ok(Promotion::Bishop),
            other => Err(format!("invalid promotion code: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// CastlingRights
// ---------------------------------------------------------------------------

/// Castling availability bitfield.
///
/// Layout: bit 0 black-kingside, bit 1 black-queenside, bit 2 white-kingside,
/// bit 3 white-queenside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CastlingRights(pub u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const BLACK_KINGSIDE: u8 = 1;
    pub const BLACK_QUEENSIDE: u8 = 2;
    pub const WHITE_KINGSIDE: u8 = 4;
    pub const WHITE_QUEENSIDE: u8 = 8;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    #[inline]
    pub fn has(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    #[inline]
    pub fn remove(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    /// The kingside bit for a side.
    #[inline]
    pub const fn kingside_bit(side: Side) -> u8 {
        match side {
            Side::Black => Self::BLACK_KINGSIDE,
            Side::White => Self::WHITE_KINGSIDE,
        }
    }

    /// The queenside bit for a side.
    #[inline]
    pub const fn queenside_bit(side: Side) -> u8 {
        match side {
            Side::Black => Self::BLACK_QUEENSIDE,
            Side::White => Self::WHITE_QUEENSIDE,
        }
    }

    /// Remove both rights for a side (king moved or was captured).
    #[inline]
    pub fn remove_side(&mut self, side: Side) {
        self.remove(Self::kingside_bit(side) | Self::queenside_bit(side));
    }

    #[inline]
    pub fn can_castle_kingside(self, side: Side) -> bool {
        self.has(Self::kingside_bit(side))
    }

    #[inline]
    pub fn can_castle_queenside(self, side: Side) -> bool {
        self.has(Self::queenside_bit(side))
    }
}

// ---------------------------------------------------------------------------
// WinReason
// ---------------------------------------------------------------------------

/// Why a finished game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinReason {
    Checkmate,
    Stalemate,
    Resign,
    Timeout,
    Draw,
}

impl WinReason {
    pub fn as_str(self) -> &'static str {
        match self {
            WinReason::Checkmate => "checkmate",
            WinReason::Stalemate => "stalemate",
            WinReason::Resign => "resign",
            WinReason::Timeout => "timeout",
            WinReason::Draw => "draw",
        }
    }
}

impl fmt::Display for WinReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Domain errors for the engine.
///
/// Rejected player input is never an error: `make_move` answers `false` and
/// `submit` answers `{ submitted: false }`. These variants cover malformed
/// wire data and internal invariant violations only.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid wire move: {0}")]
    BadWireMove(String),

    #[error("state invariant violated: {0}")]
    State(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
