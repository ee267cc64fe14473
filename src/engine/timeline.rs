//! A timeline: boards at consecutive turns sharing one index `l`.
//!
//! Boards are append-only at slot `t - start`; the trailing slot holds the
//! current (playable) board. A slot can be `None` only transiently while an
//! undo is being applied.

use serde::{Deserialize, Serialize};

use crate::engine::board::Board;
use crate::engine::types::EngineError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub l: i32,
    /// Turn number of the first slot.
    pub start: i32,
    boards: Vec<Option<Board>>,
    /// Whether this timeline lies in the active range and counts toward the
    /// present.
    pub active: bool,
}

impl Timeline {
    pub fn new(l: i32, start: i32) -> Self {
        Timeline {
            l,
            start,
            boards: Vec::new(),
            active: true,
        }
    }

    /// Turn number of the last slot. Meaningless for an empty timeline,
    /// which never escapes the move engine.
    #[inline]
    pub fn end(&self) -> i32 {
        self.start + self.boards.len() as i32 - 1
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    fn slot(&self, t: i32) -> Option<usize> {
        let idx = t - self.start;
        if idx >= 0 && (idx as usize) < self.boards.len() {
            Some(idx as usize)
        } else {
            None
        }
    }

    /// The board at turn `t`, if that slot exists and is filled.
    pub fn board_at(&self, t: i32) -> Option<&Board> {
        self.slot(t).and_then(|i| self.boards[i].as_ref())
    }

    pub fn board_at_mut(&mut self, t: i32) -> Option<&mut Board> {
        self.slot(t).and_then(move |i| self.boards[i].as_mut())
    }

    /// The current (trailing) board.
    pub fn current(&self) -> Option<&Board> {
        self.boards.last().and_then(|b| b.as_ref())
    }

    /// All filled boards in turn order.
    pub fn boards(&self) -> impl Iterator<Item = &Board> {
        self.boards.iter().filter_map(|b| b.as_ref())
    }

    /// Append a board at the next turn. The board's coordinates must match.
    pub fn push(&mut self, board: Board) -> Result<(), EngineError> {
        let expected = if self.boards.is_empty() {
            self.start
        } else {
            self.end() + 1
        };
        if board.l != self.l || board.t != expected {
            return Err(EngineError::State(format!(
                "appending board (L{} T{}) to timeline L{} expecting T{}",
                board.l, board.t, self.l, expected
            )));
        }
        self.boards.push(Some(board));
        Ok(())
    }

    /// Remove and return the trailing board.
    pub fn pop(&mut self) -> Option<Board> {
        self.boards.pop().flatten()
    }

    /// Swap the board in slot `t` for another snapshot at the same
    /// coordinates, returning the displaced original.
    pub fn replace(&mut self, t: i32, board: Board) -> Result<Board, EngineError> {
        if board.l != self.l || board.t != t {
            return Err(EngineError::State(format!(
                "replacing slot T{t} of timeline L{} with board (L{} T{})",
                self.l, board.l, board.t
            )));
        }
        let idx = self.slot(t).ok_or_else(|| {
            EngineError::State(format!("timeline L{} has no slot at T{t}", self.l))
        })?;
        self.boards[idx].replace(board).ok_or_else(|| {
            EngineError::State(format!("timeline L{} slot T{t} was empty", self.l))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn board(l: i32, t: i32) -> Board {
        Board::empty(l, t)
    }

    #[test]
    fn push_and_end() {
        let mut tl = Timeline::new(0, -1);
        tl.push(board(0, -1)).unwrap();
        tl.push(board(0, 0)).unwrap();
        assert_eq!(tl.start, -1);
        assert_eq!(tl.end(), 0);
        assert_eq!(tl.len(), 2);
        assert_eq!(tl.current().unwrap().t, 0);
    }

    #[test]
    fn push_rejects_wrong_coordinates() {
        let mut tl = Timeline::new(0, 0);
        tl.push(board(0, 0)).unwrap();
        assert!(tl.push(board(0, 2)).is_err());
        assert!(tl.push(board(1, 1)).is_err());
    }

    #[test]
    fn board_at_by_turn() {
        let mut tl = Timeline::new(2, 5);
        tl.push(board(2, 5)).unwrap();
        tl.push(board(2, 6)).unwrap();
        assert_eq!(tl.board_at(5).unwrap().t, 5);
        assert_eq!(tl.board_at(6).unwrap().t, 6);
        assert!(tl.board_at(4).is_none());
        assert!(tl.board_at(7).is_none());
    }

    #[test]
    fn pop_shrinks() {
        let mut tl = Timeline::new(0, 0);
        tl.push(board(0, 0)).unwrap();
        tl.push(board(0, 1)).unwrap();
        let popped = tl.pop().unwrap();
        assert_eq!(popped.t, 1);
        assert_eq!(tl.end(), 0);
    }

    #[test]
    fn replace_swaps_in_place() {
        let mut tl = Timeline::new(0, 0);
        tl.push(board(0, 0)).unwrap();
        let mut inactive = board(0, 0);
        inactive.active = false;
        let original = tl.replace(0, inactive).unwrap();
        assert!(original.active);
        assert!(!tl.board_at(0).unwrap().active);
    }

    #[test]
    fn replace_rejects_mismatched_board() {
        let mut tl = Timeline::new(0, 0);
        tl.push(board(0, 0)).unwrap();
        assert!(tl.replace(0, board(0, 1)).is_err());
        assert!(tl.replace(1, board(0, 1)).is_err());
    }

    #[test]
    fn negative_timeline_indexing() {
        let mut tl = Timeline::new(-2, 3);
        tl.push(board(-2, 3)).unwrap();
        tl.push(board(-2, 4)).unwrap();
        assert_eq!(tl.board_at(3).unwrap().l, -2);
        assert_eq!(tl.end(), 4);
    }
}
