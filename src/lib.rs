//! Rule engine for 5D chess with multiverse time travel.
//!
//! A pure, deterministic game core over a branching graph of 8×8 boards: a
//! move may stay on its board, jump onto another timeline's head, or branch
//! off a past board into a fresh timeline. The engine resolves candidate
//! moves, cross-timeline attack and check, castling with pass-through
//! checks, en passant, promotion, the submit cycle with null-move padding,
//! and checkmate/stalemate.
//!
//! ```
//! use multiverse_chess::{Game, Vec4};
//!
//! let mut game = Game::default();
//! // White: e2 pawn one square up the board.
//! assert!(game.make_move(Vec4::new(4, 6, 0, 0), Vec4::new(4, 5, 0, 1), None));
//! assert!(game.submit().submitted);
//! assert_eq!(game.present(), 1);
//! ```
//!
//! Rendering, input, networking and clocks live outside; the engine is
//! single-threaded, synchronous, and rejects bad input with plain `false`
//! results rather than errors.

pub mod engine;

pub use engine::*;
