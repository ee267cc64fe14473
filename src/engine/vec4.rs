//! 4D board coordinate.
//!
//! `(x, y)` address a square on an 8×8 board (x = file 0..7, y = rank 0..7,
//! y = 0 is black's home rank). `l` is the timeline index (0 = main, > 0
//! spawned by white, < 0 spawned by black) and `t` the turn number within
//! the timeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 4D coordinate `(x, y, l, t)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: i8,
    pub y: i8,
    pub l: i32,
    pub t: i32,
}

impl Vec4 {
    pub const fn new(x: i8, y: i8, l: i32, t: i32) -> Self {
        Vec4 { x, y, l, t }
    }

    /// Whether the square part lies on the board. `l` and `t` are unbounded.
    #[inline]
    pub fn in_bounds(&self) -> bool {
        (0..8).contains(&self.x) && (0..8).contains(&self.y)
    }

    /// The board this coordinate addresses.
    #[inline]
    pub fn board_coords(&self) -> (i32, i32) {
        (self.l, self.t)
    }

    /// Same square, re-rooted onto another board.
    #[inline]
    pub fn on_board(&self, l: i32, t: i32) -> Vec4 {
        Vec4 { l, t, ..*self }
    }
}

impl fmt::Display for Vec4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{} L{} T{})", self.x, self.y, self.l, self.t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_structural() {
        assert_eq!(Vec4::new(4, 6, 0, 0), Vec4::new(4, 6, 0, 0));
        assert_ne!(Vec4::new(4, 6, 0, 0), Vec4::new(4, 6, 0, 1));
        assert_ne!(Vec4::new(4, 6, 0, 0), Vec4::new(4, 6, 1, 0));
    }

    #[test]
    fn bounds() {
        assert!(Vec4::new(0, 0, 0, 0).in_bounds());
        assert!(Vec4::new(7, 7, -3, 12).in_bounds());
        assert!(!Vec4::new(-1, 0, 0, 0).in_bounds());
        assert!(!Vec4::new(0, 8, 0, 0).in_bounds());
        assert!(!Vec4::new(8, 3, 0, 0).in_bounds());
    }

    #[test]
    fn re_rooting_keeps_square() {
        let v = Vec4::new(2, 5, 0, 3);
        let w = v.on_board(-1, 7);
        assert_eq!((w.x, w.y), (2, 5));
        assert_eq!(w.board_coords(), (-1, 7));
    }

    #[test]
    fn serde_round_trip() {
        let v = Vec4::new(3, 4, -2, 9);
        let json = serde_json::to_string(&v).unwrap();
        let back: Vec4 = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }

    #[test]
    fn display() {
        assert_eq!(Vec4::new(4, 6, 0, 0).to_string(), "(4,6 L0 T0)");
    }
}
