//! Move records and the move engine.
//!
//! A move never mutates a board in place. The engine displaces affected
//! slots with mutated clones (or appends successors), and the `Move` record
//! keeps the displaced originals plus the coordinates of everything it
//! created, which is exactly the state undo needs. Submission clears the
//! buffer and is the commit point: after it, these records are history only.
//!
//! Three regular shapes, classified by the target board's state:
//!   - *advance*: onto the empty `t+1` slot of the piece's own timeline;
//!   - *jump*: onto the current board of another active timeline
//!     (inter-dimensional, no timeline advances until null padding);
//!   - *branch*: onto a historical board, spawning a new timeline one turn
//!     after it.
//! A *null move* advances a timeline without relocating a piece.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::engine::board::Board;
use crate::engine::game::Game;
use crate::engine::movement;
use crate::engine::piece::Piece;
use crate::engine::types::{CastlingRights, EngineError, PieceKind, Promotion};
use crate::engine::vec4::Vec4;

// ---------------------------------------------------------------------------
// Move record
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    Regular,
    Null,
}

/// One applied move, carrying everything needed to reverse it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub kind: MoveKind,
    pub from: Option<Vec4>,
    pub to: Option<Vec4>,
    /// Snapshot of the piece as it stood on the source board.
    pub piece: Option<Piece>,
    pub promotion: Option<Promotion>,
    pub inter_dimensional: bool,
    pub remote: bool,
    /// Timeline a null move advanced.
    pub null_timeline: Option<i32>,
    pub source_board: Option<(i32, i32)>,
    pub target_board: Option<(i32, i32)>,
    /// Displaced originals, deactivated while held.
    used: Vec<Board>,
    /// Coordinates of replacement clones and appended successors.
    created: Vec<(i32, i32)>,
    /// Timeline spawned by a branch.
    spawned_timeline: Option<i32>,
}

impl Move {
    /// Coordinates of the snapshots this move deactivated.
    pub fn used_boards(&self) -> Vec<(i32, i32)> {
        self.used.iter().map(|b| (b.l, b.t)).collect()
    }

    /// Coordinates of the snapshots this move created.
    pub fn created_boards(&self) -> &[(i32, i32)] {
        &self.created
    }

    pub fn spawned_timeline(&self) -> Option<i32> {
        self.spawned_timeline
    }

    /// Timelines this move acted on; each may host at most one move per
    /// submit cycle.
    pub fn consumed_timelines(&self) -> Vec<i32> {
        let mut out = Vec::with_capacity(2);
        match self.kind {
            MoveKind::Null => {
                if let Some(l) = self.null_timeline {
                    out.push(l);
                }
            }
            MoveKind::Regular => {
                if let Some(from) = self.from {
                    out.push(from.l);
                }
                if let Some(l) = self.spawned_timeline {
                    out.push(l);
                } else if self.inter_dimensional {
                    if let Some(to) = self.to {
                        out.push(to.l);
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MoveKind::Null => write!(f, "null on L{}", self.null_timeline.unwrap_or(0)),
            MoveKind::Regular => match (self.from, self.to) {
                (Some(from), Some(to)) => write!(f, "{from} -> {to}"),
                _ => write!(f, "malformed move"),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Apply a validated regular move. The caller (Game) has already filtered
/// for side, turn order, candidates and self-check; violations found here
/// are state errors, not rejections.
pub(crate) fn apply_move(
    game: &mut Game,
    from: Vec4,
    to: Vec4,
    promotion: Option<Promotion>,
) -> Result<Move, EngineError> {
    let source = game
        .board_at(from.l, from.t)
        .ok_or_else(|| EngineError::State(format!("no source board at (L{} T{})", from.l, from.t)))?
        .clone();
    let piece = source
        .piece_at(from.x, from.y)
        .ok_or_else(|| EngineError::State(format!("no piece at {from}")))?
        .clone();

    if to.l == from.l && to.t == from.t + 1 && game.board_at(to.l, to.t).is_none() {
        apply_advance(game, &source, piece, from, to, promotion)
    } else {
        apply_inter_dimensional(game, &source, piece, from, to, promotion)
    }
}

/// Advance the piece's own timeline by one turn.
fn apply_advance(
    game: &mut Game,
    source: &Board,
    piece: Piece,
    from: Vec4,
    to: Vec4,
    promotion: Option<Promotion>,
) -> Result<Move, EngineError> {
    let mut succ = source.successor();
    let moved = succ
        .take_piece(from.x, from.y)
        .ok_or_else(|| EngineError::State(format!("successor lost the mover at {from}")))?;
    let mut captured = succ.take_piece(to.x, to.y);

    // En passant: a diagonal pawn move onto the empty passed-over square
    // removes the pawn that double-pushed beside it.
    if captured.is_none() && moved.kind == PieceKind::Pawn && (to.x - from.x).abs() == 1 {
        if let Some(ep) = source.en_passant {
            if ep.l == source.l && ep.t == source.t && ep.x == to.x && ep.y == to.y {
                captured = succ.take_piece(ep.x, from.y);
            }
        }
    }

    // Castling: relocate the rook alongside the two-file king hop.
    if moved.kind == PieceKind::King && (to.x - from.x).abs() == 2 {
        if let Some((rook_from, rook_to)) = movement::castle_rook_files(to.x) {
            if let Some(mut rook) = succ.take_piece(rook_from, from.y) {
                rook.has_moved = true;
                succ.set_piece(rook_to, from.y, rook);
            }
        }
    }

    clear_rights_for_departure(&mut succ, &moved);
    if let Some(c) = &captured {
        clear_rights_for_capture(&mut succ, c);
    }
    place_moved(&mut succ, moved, to.x, to.y, promotion);

    // A double push arms en passant on the created board.
    if piece.kind == PieceKind::Pawn && (to.y - from.y).abs() == 2 {
        let passed = from.y + piece.side.forward();
        succ.en_passant = Some(Vec4::new(from.x, passed, succ.l, succ.t));
    }

    let original = deactivate_slot(game, from.l, from.t)?;
    let succ_coords = (succ.l, succ.t);
    game.timeline_mut(from.l)?.push(succ)?;

    Ok(Move {
        kind: MoveKind::Regular,
        from: Some(from),
        to: Some(to),
        piece: Some(piece),
        promotion,
        inter_dimensional: false,
        remote: false,
        null_timeline: None,
        source_board: Some((from.l, from.t)),
        target_board: Some((to.l, to.t)),
        used: vec![original],
        created: vec![(from.l, from.t), succ_coords],
        spawned_timeline: None,
    })
}

/// Jump onto another active timeline's head, or branch off a historical
/// board into a new timeline.
fn apply_inter_dimensional(
    game: &mut Game,
    source: &Board,
    piece: Piece,
    from: Vec4,
    to: Vec4,
    promotion: Option<Promotion>,
) -> Result<Move, EngineError> {
    let target = game
        .board_at(to.l, to.t)
        .ok_or_else(|| {
            EngineError::State(format!("no target board at (L{} T{})", to.l, to.t))
        })?
        .clone();
    let target_is_head = game
        .timeline(to.l)
        .map(|tl| tl.active && tl.end() == to.t)
        .unwrap_or(false)
        && target.active;

    // The piece leaves its board: the source slot becomes a clone without it.
    let mut source_clone = source.clone();
    let moved = source_clone
        .take_piece(from.x, from.y)
        .ok_or_else(|| EngineError::State(format!("source clone lost the mover at {from}")))?;
    clear_rights_for_departure(&mut source_clone, &moved);

    if target_is_head {
        // Jump: mutate the target head in place; both timelines advance
        // later by null padding. A jump is never a double push, so any
        // en-passant window armed on the target expires with it.
        let mut target_clone = target.clone();
        target_clone.en_passant = None;
        let captured = target_clone.take_piece(to.x, to.y);
        if let Some(c) = &captured {
            clear_rights_for_capture(&mut target_clone, c);
        }
        place_moved(&mut target_clone, moved, to.x, to.y, promotion);

        let original_source = displace_slot(game, from.l, from.t, source_clone)?;
        let original_target = displace_slot(game, to.l, to.t, target_clone)?;
        debug!(from = %from, to = %to, "inter-dimensional jump");

        Ok(Move {
            kind: MoveKind::Regular,
            from: Some(from),
            to: Some(to),
            piece: Some(piece),
            promotion,
            inter_dimensional: true,
            remote: false,
            null_timeline: None,
            source_board: Some((from.l, from.t)),
            target_board: Some((to.l, to.t)),
            used: vec![original_source, original_target],
            created: vec![(from.l, from.t), (to.l, to.t)],
            spawned_timeline: None,
        })
    } else if !target.active {
        // Branch: a new timeline opens one turn after the targeted past.
        let new_l = game.next_timeline_index(piece.side);
        let start = to.t + 1;
        let mut branch = target.derive_at(new_l, start);
        let captured = branch.take_piece(to.x, to.y);
        if let Some(c) = &captured {
            clear_rights_for_capture(&mut branch, c);
        }
        place_moved(&mut branch, moved, to.x, to.y, promotion);

        let original_source = displace_slot(game, from.l, from.t, source_clone)?;
        game.spawn_timeline(new_l, start, branch)?;
        debug!(%from, %to, new_l, start, "branched a new timeline");

        Ok(Move {
            kind: MoveKind::Regular,
            from: Some(from),
            to: Some(to),
            piece: Some(piece),
            promotion,
            inter_dimensional: true,
            remote: false,
            null_timeline: None,
            source_board: Some((from.l, from.t)),
            target_board: Some((to.l, to.t)),
            used: vec![original_source],
            created: vec![(from.l, from.t), (new_l, start)],
            spawned_timeline: Some(new_l),
        })
    } else {
        Err(EngineError::State(format!(
            "target (L{} T{}) is the head of an inactive timeline",
            to.l, to.t
        )))
    }
}

/// Advance a timeline with a null move: a fresh successor, no relocation.
pub(crate) fn apply_null(game: &mut Game, l: i32) -> Result<Move, EngineError> {
    let current = game
        .timeline(l)
        .and_then(|tl| tl.current())
        .ok_or_else(|| EngineError::State(format!("timeline L{l} has no current board")))?
        .clone();
    let succ = current.successor();
    let t = current.t;
    let original = deactivate_slot(game, l, t)?;
    game.timeline_mut(l)?.push(succ)?;

    Ok(Move {
        kind: MoveKind::Null,
        from: None,
        to: None,
        piece: None,
        promotion: None,
        inter_dimensional: false,
        remote: false,
        null_timeline: Some(l),
        source_board: Some((l, t)),
        target_board: Some((l, t + 1)),
        used: vec![original],
        created: vec![(l, t), (l, t + 1)],
        spawned_timeline: None,
    })
}

// ---------------------------------------------------------------------------
// Undo
// ---------------------------------------------------------------------------

/// Reverse a move: destroy what it created, restore what it displaced,
/// unspawn what it branched.
pub(crate) fn undo_move(game: &mut Game, mv: Move) -> Result<(), EngineError> {
    let Move {
        created,
        mut used,
        spawned_timeline,
        ..
    } = mv;

    if let Some(l) = spawned_timeline {
        game.remove_timeline(l)?;
    }

    for &(l, t) in created.iter().rev() {
        if spawned_timeline == Some(l) {
            continue;
        }
        if let Some(idx) = used.iter().position(|b| b.l == l && b.t == t) {
            let mut original = used.swap_remove(idx);
            original.active = true;
            game.timeline_mut(l)?.replace(t, original)?;
        } else {
            let popped = game
                .timeline_mut(l)?
                .pop()
                .ok_or_else(|| EngineError::State(format!("timeline L{l} empty during undo")))?;
            if popped.t != t {
                return Err(EngineError::State(format!(
                    "undo popped (L{} T{}) expecting T{t}",
                    popped.l, popped.t
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Slot helpers
// ---------------------------------------------------------------------------

/// Swap the slot for a deactivated clone of itself; the original becomes a
/// used snapshot.
fn deactivate_slot(game: &mut Game, l: i32, t: i32) -> Result<Board, EngineError> {
    let board = game
        .board_at(l, t)
        .ok_or_else(|| EngineError::State(format!("no board at (L{l} T{t})")))?;
    let mut hist = board.clone();
    hist.active = false;
    displace_slot(game, l, t, hist)
}

/// Swap the slot for a replacement clone, returning the deactivated original.
fn displace_slot(game: &mut Game, l: i32, t: i32, replacement: Board) -> Result<Board, EngineError> {
    let mut original = game.timeline_mut(l)?.replace(t, replacement)?;
    original.active = false;
    Ok(original)
}

// ---------------------------------------------------------------------------
// Piece mutation helpers
// ---------------------------------------------------------------------------

/// Land the mover on its target square, promoting a pawn that carries an
/// explicit code or reaches the last rank. Queen when unspecified.
fn place_moved(board: &mut Board, mut piece: Piece, x: i8, y: i8, promotion: Option<Promotion>) {
    piece.has_moved = true;
    if piece.kind == PieceKind::Pawn
        && (promotion.is_some() || y == piece.side.promotion_rank())
    {
        piece.kind = promotion.unwrap_or(Promotion::Queen).kind();
    }
    board.set_piece(x, y, piece);
}

/// A king move clears both of its side's rights; a rook leaving its home
/// corner clears the matching one.
fn clear_rights_for_departure(board: &mut Board, piece: &Piece) {
    match piece.kind {
        PieceKind::King => board.castle_rights.remove_side(piece.side),
        PieceKind::Rook => {
            if piece.y == piece.side.home_rank() {
                if piece.x == 7 {
                    board
                        .castle_rights
                        .remove(CastlingRights::kingside_bit(piece.side));
                } else if piece.x == 0 {
                    board
                        .castle_rights
                        .remove(CastlingRights::queenside_bit(piece.side));
                }
            }
        }
        _ => {}
    }
}

/// Capturing a rook on its home corner clears the defender's matching right.
fn clear_rights_for_capture(board: &mut Board, captured: &Piece) {
    if captured.kind != PieceKind::Rook || captured.y != captured.side.home_rank() {
        return;
    }
    if captured.x == 7 {
        board
            .castle_rights
            .remove(CastlingRights::kingside_bit(captured.side));
    } else if captured.x == 0 {
        board
            .castle_rights
            .remove(CastlingRights::queenside_bit(captured.side));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Side;

    // Whole-game move behavior is exercised in game.rs and the integration
    // suites; these cover the record bookkeeping and the piece helpers.

    fn sample_board() -> Board {
        Board::empty(0, 4)
    }

    #[test]
    fn place_moved_sets_has_moved() {
        let mut b = sample_board();
        let p = Piece::new(Side::White, PieceKind::Knight, 1, 7, 0, 4);
        place_moved(&mut b, p, 2, 5, None);
        let landed = b.piece_at(2, 5).unwrap();
        assert!(landed.has_moved);
        assert_eq!(landed.kind, PieceKind::Knight);
    }

    #[test]
    fn place_moved_promotes_on_last_rank() {
        let mut b = sample_board();
        let p = Piece::new(Side::White, PieceKind::Pawn, 3, 1, 0, 4);
        place_moved(&mut b, p, 3, 0, None);
        assert_eq!(b.piece_at(3, 0).unwrap().kind, PieceKind::Queen);
    }

    #[test]
    fn place_moved_honors_promotion_code() {
        let mut b = sample_board();
        let p = Piece::new(Side::Black, PieceKind::Pawn, 6, 6, 0, 4);
        place_moved(&mut b, p, 6, 7, Some(Promotion::Knight));
        assert_eq!(b.piece_at(6, 7).unwrap().kind, PieceKind::Knight);
    }

    #[test]
    fn king_departure_clears_both_rights() {
        let mut b = sample_board();
        b.castle_rights = CastlingRights::ALL;
        let king = Piece::new(Side::White, PieceKind::King, 4, 7, 0, 4);
        clear_rights_for_departure(&mut b, &king);
        assert!(!b.castle_rights.can_castle_kingside(Side::White));
        assert!(!b.castle_rights.can_castle_queenside(Side::White));
        assert!(b.castle_rights.can_castle_kingside(Side::Black));
    }

    #[test]
    fn rook_departure_clears_matching_right() {
        let mut b = sample_board();
        b.castle_rights = CastlingRights::ALL;
        let rook = Piece::new(Side::Black, PieceKind::Rook, 0, 0, 0, 4);
        clear_rights_for_departure(&mut b, &rook);
        assert!(!b.castle_rights.can_castle_queenside(Side::Black));
        assert!(b.castle_rights.can_castle_kingside(Side::Black));
    }

    #[test]
    fn rook_away_from_corner_keeps_rights() {
        let mut b = sample_board();
        b.castle_rights = CastlingRights::ALL;
        let rook = Piece::new(Side::Black, PieceKind::Rook, 3, 3, 0, 4);
        clear_rights_for_departure(&mut b, &rook);
        assert_eq!(b.castle_rights, CastlingRights::ALL);
    }

    #[test]
    fn captured_corner_rook_clears_defender_right() {
        let mut b = sample_board();
        b.castle_rights = CastlingRights::ALL;
        let rook = Piece::new(Side::White, PieceKind::Rook, 7, 7, 0, 4);
        clear_rights_for_capture(&mut b, &rook);
        assert!(!b.castle_rights.can_castle_kingside(Side::White));
        assert!(b.castle_rights.can_castle_queenside(Side::White));
    }

    #[test]
    fn null_move_record_shape() {
        let mut game = Game::default();
        let mv = apply_null(&mut game, 0).unwrap();
        assert_eq!(mv.kind, MoveKind::Null);
        assert_eq!(mv.null_timeline, Some(0));
        assert!(mv.piece.is_none());
        assert_eq!(mv.used_boards(), vec![(0, 0)]);
        assert_eq!(mv.created_boards(), &[(0, 0), (0, 1)]);
        assert_eq!(mv.consumed_timelines(), vec![0]);
    }

    #[test]
    fn null_move_advances_and_undoes() {
        let mut game = Game::default();
        let before = game.clone();
        let mv = apply_null(&mut game, 0).unwrap();
        assert_eq!(game.timeline(0).unwrap().end(), 1);
        assert_eq!(game.board_at(0, 1).unwrap().turn, Side::Black);
        assert!(!game.board_at(0, 0).unwrap().active);
        undo_move(&mut game, mv).unwrap();
        assert_eq!(game, before);
    }
}
