//! A typed occupant of one square.
//!
//! Pieces are owned by their board's square array and carry the `(l, t)`
//! coordinates of that board as a non-owning back-reference. Cloning a board
//! deep-copies its pieces; piece identity is per-board, so user code resolves
//! a "current" piece by coordinates rather than holding one across submits.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::types::{PieceKind, Side};
use crate::engine::vec4::Vec4;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub side: Side,
    pub kind: PieceKind,
    pub x: i8,
    pub y: i8,
    /// Timeline of the board this piece sits on.
    pub l: i32,
    /// Turn of the board this piece sits on.
    pub t: i32,
    pub has_moved: bool,
}

impl Piece {
    pub fn new(side: Side, kind: PieceKind, x: i8, y: i8, l: i32, t: i32) -> Self {
        Piece {
            side,
            kind,
            x,
            y,
            l,
            t,
            has_moved: false,
        }
    }

    /// Full 4D position of this piece.
    #[inline]
    pub fn pos(&self) -> Vec4 {
        Vec4::new(self.x, self.y, self.l, self.t)
    }

    /// Whether this pawn still sits on its home rank and may double-push.
    #[inline]
    pub fn on_pawn_rank(&self) -> bool {
        self.kind == PieceKind::Pawn && self.y == self.side.pawn_rank()
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} at {}", self.side, self.kind, self.pos())
    }
}
