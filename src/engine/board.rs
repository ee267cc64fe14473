//! 8×8 board snapshot.
//!
//! A `Board` is one immutable-by-convention position at a fixed `(l, t)`.
//! The move engine never mutates a board that has a derived successor; it
//! clones first, so every past position stays reachable for undo and for
//! cross-timeline attack queries.
//!
//! `turn` (the side to move on this board) is fully determined by the
//! coordinates: `turn = (t + side_of(l)) mod 2`, with white = 1.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::piece::Piece;
use crate::engine::types::{CastlingRights, Side};
use crate::engine::vec4::Vec4;

/// One 8×8 snapshot inside a timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub l: i32,
    pub t: i32,
    /// Side to move on this board. Kept consistent with `(l, t)` parity.
    pub turn: Side,
    /// `squares[y][x]`.
    squares: [[Option<Piece>; 8]; 8],
    /// Whether this is the playable head of its timeline. Historical
    /// snapshots have `active = false`.
    pub active: bool,
    pub castle_rights: CastlingRights,
    /// Square passed over by the last double pawn push, tagged with the
    /// `(l, t)` of the board it was set on. Clones at other coordinates
    /// invalidate it without bookkeeping.
    pub en_passant: Option<Vec4>,
}

impl Board {
    /// Side to move on the board at `(l, t)`.
    #[inline]
    pub fn turn_for(l: i32, t: i32) -> Side {
        if (t + Side::of_timeline(l).code() as i32).rem_euclid(2) == 1 {
            Side::White
        } else {
            Side::Black
        }
    }

    /// An empty board at `(l, t)` with parity-correct `turn` and no rights.
    pub fn empty(l: i32, t: i32) -> Self {
        Board {
            l,
            t,
            turn: Self::turn_for(l, t),
            squares: Default::default(),
            active: true,
            castle_rights: CastlingRights::NONE,
            en_passant: None,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[inline]
    pub fn in_bounds(x: i8, y: i8) -> bool {
        (0..8).contains(&x) && (0..8).contains(&y)
    }

    /// The piece on `(x, y)`, if any. Out-of-bounds access answers `None`.
    #[inline]
    pub fn piece_at(&self, x: i8, y: i8) -> Option<&Piece> {
        if Self::in_bounds(x, y) {
            self.squares[y as usize][x as usize].as_ref()
        } else {
            None
        }
    }

    /// Whether `(x, y)` is an on-board square with nothing on it.
    #[inline]
    pub fn is_empty(&self, x: i8, y: i8) -> bool {
        Self::in_bounds(x, y) && self.piece_at(x, y).is_none()
    }

    /// Whether `(x, y)` holds a piece of the opposite side. Out of bounds
    /// answers `false`.
    #[inline]
    pub fn is_enemy(&self, x: i8, y: i8, side: Side) -> bool {
        self.piece_at(x, y).map(|p| p.side != side).unwrap_or(false)
    }

    /// All pieces on the board.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.squares.iter().flatten().filter_map(|sq| sq.as_ref())
    }

    /// All pieces of one side.
    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces().filter(move |p| p.side == side)
    }

    /// Square of the first king of `side`, if one is on the board. Boards in
    /// a multiverse game can carry zero or several kings of one side.
    pub fn king_square(&self, side: Side) -> Option<(i8, i8)> {
        self.pieces_of(side)
            .find(|p| p.kind == crate::engine::types::PieceKind::King)
            .map(|p| (p.x, p.y))
    }

    // -----------------------------------------------------------------------
    // Mutation (used on fresh clones only)
    // -----------------------------------------------------------------------

    /// Put a piece on `(x, y)`, re-coordinating it to this board. Returns the
    /// displaced occupant, if any. Out-of-bounds placement is a no-op that
    /// drops the piece; callers validate bounds first.
    pub fn set_piece(&mut self, x: i8, y: i8, mut piece: Piece) -> Option<Piece> {
        if !Self::in_bounds(x, y) {
            return None;
        }
        piece.x = x;
        piece.y = y;
        piece.l = self.l;
        piece.t = self.t;
        self.squares[y as usize][x as usize].replace(piece)
    }

    /// Remove and return the piece on `(x, y)`.
    pub fn take_piece(&mut self, x: i8, y: i8) -> Option<Piece> {
        if !Self::in_bounds(x, y) {
            return None;
        }
        self.squares[y as usize][x as usize].take()
    }

    // -----------------------------------------------------------------------
    // Derivation
    // -----------------------------------------------------------------------

    /// A clone of this position rooted at `(l, t)`: pieces re-coordinated,
    /// `turn` recomputed from parity, en-passant cleared, rights inherited.
    /// Used for the `t+1` successor of a move or null move and for the first
    /// board of a spawned timeline.
    pub fn derive_at(&self, l: i32, t: i32) -> Board {
        let mut board = Board {
            l,
            t,
            turn: Self::turn_for(l, t),
            squares: self.squares.clone(),
            active: true,
            castle_rights: self.castle_rights,
            en_passant: None,
        };
        for row in board.squares.iter_mut() {
            for sq in row.iter_mut() {
                if let Some(p) = sq {
                    p.l = l;
                    p.t = t;
                }
            }
        }
        board
    }

    /// The successor position on the same timeline.
    pub fn successor(&self) -> Board {
        self.derive_at(self.l, self.t + 1)
    }

    // -----------------------------------------------------------------------
    // Display
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line text grid (y = 0 at top), for debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(160);
        for y in 0..8i8 {
            for x in 0..8i8 {
                let ch = match self.piece_at(x, y) {
                    Some(p) => {
                        let c = match p.kind {
                            crate::engine::types::PieceKind::Pawn => 'p',
                            crate::engine::types::PieceKind::Knight => 'n',
                            crate::engine::types::PieceKind::Bishop => 'b',
                            crate::engine::types::PieceKind::Rook => 'r',
                            crate::engine::types::PieceKind::Queen => 'q',
                            crate::engine::types::PieceKind::King => 'k',
                        };
                        if p.side == Side::White {
                            c.to_ascii_uppercase()
                        } else {
                            c
                        }
                    }
                    None => '.',
                };
                s.push(ch);
                if x < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "L{} T{} ({} to move)", self.l, self.t, self.turn)?;
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
