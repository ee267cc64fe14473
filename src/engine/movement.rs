//! Candidate-move enumeration.
//!
//! Every piece kind yields a finite set of candidate targets
//! `Vec4(x, y, l, board.t + 1)`, where `l` defaults to the piece's own
//! timeline and may be re-rooted for cross-timeline queries. Candidates are
//! geometric only; the move engine and the check detector filter them.
//!
//! Two entry points: [`candidates`] for full move generation, including
//! castling and en passant when the query stays on the piece's own
//! timeline, and [`attack_candidates`] for attack queries. The latter
//! excludes castling and en passant (neither can capture a king), which
//! also keeps check detection non-recursive.

use crate::engine::board::Board;
use crate::engine::check;
use crate::engine::game::Game;
use crate::engine::piece::Piece;
use crate::engine::types::{CastlingRights, PieceKind};
#[cfg(test)]
use crate::engine::types::Side;
use crate::engine::vec4::Vec4;

const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KING_DIRS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// All candidate targets for `piece` on `board`, re-rooted to `target_l`
/// when given. Castling and en passant are emitted only for a same-timeline
/// query (`target_l` unset) on a board where it is the piece's turn.
pub fn candidates(game: &Game, board: &Board, piece: &Piece, target_l: Option<i32>) -> Vec<Vec4> {
    let mut out = attack_candidates(board, piece, target_l);
    if target_l.is_none() && piece.side == board.turn {
        match piece.kind {
            PieceKind::King => castling_targets(game, board, piece, &mut out),
            PieceKind::Pawn => en_passant_targets(board, piece, &mut out),
            _ => {}
        }
    }
    out
}

/// Candidate targets without castling or en passant.
pub fn attack_candidates(board: &Board, piece: &Piece, target_l: Option<i32>) -> Vec<Vec4> {
    let l = target_l.unwrap_or(board.l);
    let t = board.t + 1;
    let mut out = Vec::new();
    match piece.kind {
        PieceKind::Rook => rays(board, piece, &ROOK_DIRS, l, t, &mut out),
        PieceKind::Bishop => rays(board, piece, &BISHOP_DIRS, l, t, &mut out),
        PieceKind::Queen => {
            rays(board, piece, &ROOK_DIRS, l, t, &mut out);
            rays(board, piece, &BISHOP_DIRS, l, t, &mut out);
        }
        PieceKind::Knight => steps(board, piece, &KNIGHT_OFFSETS, l, t, &mut out),
        PieceKind::King => steps(board, piece, &KING_DIRS, l, t, &mut out),
        PieceKind::Pawn => pawn_targets(board, piece, l, t, &mut out),
    }
    out
}

// ---------------------------------------------------------------------------
// Sliders and steppers
// ---------------------------------------------------------------------------

/// Ray-cast: a prefix of empty squares plus at most one enemy terminator.
fn rays(board: &Board, piece: &Piece, dirs: &[(i8, i8)], l: i32, t: i32, out: &mut Vec<Vec4>) {
    for &(dx, dy) in dirs {
        let (mut x, mut y) = (piece.x + dx, piece.y + dy);
        while Board::in_bounds(x, y) {
            if board.is_empty(x, y) {
                out.push(Vec4::new(x, y, l, t));
            } else {
                if board.is_enemy(x, y, piece.side) {
                    out.push(Vec4::new(x, y, l, t));
                }
                break;
            }
            x += dx;
            y += dy;
        }
    }
}

/// Fixed offsets: capture-or-empty.
fn steps(board: &Board, piece: &Piece, offsets: &[(i8, i8)], l: i32, t: i32, out: &mut Vec<Vec4>) {
    for &(dx, dy) in offsets {
        let (x, y) = (piece.x + dx, piece.y + dy);
        if !Board::in_bounds(x, y) {
            continue;
        }
        if board.is_empty(x, y) || board.is_enemy(x, y, piece.side) {
            out.push(Vec4::new(x, y, l, t));
        }
    }
}

// ---------------------------------------------------------------------------
// Pawns
// ---------------------------------------------------------------------------

fn pawn_targets(board: &Board, piece: &Piece, l: i32, t: i32, out: &mut Vec<Vec4>) {
    let fwd = piece.side.forward();

    // Single push, then double push from the home rank.
    if board.is_empty(piece.x, piece.y + fwd) {
        out.push(Vec4::new(piece.x, piece.y + fwd, l, t));
        if !piece.has_moved && piece.on_pawn_rank() && board.is_empty(piece.x, piece.y + 2 * fwd) {
            out.push(Vec4::new(piece.x, piece.y + 2 * fwd, l, t));
        }
    }

    // Diagonal captures.
    for dx in [-1i8, 1] {
        let (x, y) = (piece.x + dx, piece.y + fwd);
        if board.is_enemy(x, y, piece.side) {
            out.push(Vec4::new(x, y, l, t));
        }
    }
}

/// En passant: the board's target square must have been set on this exact
/// `(l, t)` and the pawn must sit beside the double-pushed pawn. The capture
/// lands on the passed-over square.
fn en_passant_targets(board: &Board, piece: &Piece, out: &mut Vec<Vec4>) {
    let Some(ep) = board.en_passant else { return };
    if ep.l != board.l || ep.t != board.t {
        return;
    }
    let fwd = piece.side.forward();
    if piece.y + fwd != ep.y || (piece.x - ep.x).abs() != 1 {
        return;
    }
    // The victim pawn sits beside the capturer, on the square it double-pushed to.
    let victim = board.piece_at(ep.x, piece.y);
    if victim.map_or(false, |v| v.kind == PieceKind::Pawn && v.side != piece.side) {
        out.push(Vec4::new(ep.x, ep.y, board.l, board.t + 1));
    }
}

// ---------------------------------------------------------------------------
// Castling
// ---------------------------------------------------------------------------

/// For a castling king target square, the rook's `(from_x, to_x)` hop.
pub(crate) fn castle_rook_files(king_to_x: i8) -> Option<(i8, i8)> {
    match king_to_x {
        6 => Some((7, 5)),
        2 => Some((0, 3)),
        _ => None,
    }
}

fn castling_targets(game: &Game, board: &Board, king: &Piece, out: &mut Vec<Vec4>) {
    let side = king.side;
    let y = side.home_rank();
    if king.has_moved || king.x != 4 || king.y != y {
        return;
    }
    // No castling out of cross-timeline check.
    if check::is_king_in_check(game, board, side) {
        return;
    }

    // (rights bit, rook file, king target file, between files, passed file)
    let lanes: [(u8, i8, i8, &[i8], i8); 2] = [
        (CastlingRights::kingside_bit(side), 7, 6, &[5, 6], 5),
        (CastlingRights::queenside_bit(side), 0, 2, &[1, 2, 3], 3),
    ];

    for (bit, rook_x, king_to, between, passed) in lanes {
        if !board.castle_rights.has(bit) {
            continue;
        }
        let rook_ok = board
            .piece_at(rook_x, y)
            .map_or(false, |r| r.kind == PieceKind::Rook && r.side == side && !r.has_moved);
        if !rook_ok {
            continue;
        }
        if !between.iter().all(|&x| board.is_empty(x, y)) {
            continue;
        }
        // The king may not pass through an attacked square; simulate it on
        // the successor board. The landing square is covered by the
        // legality filter.
        let mut sim = board.successor();
        if let Some(k) = sim.take_piece(4, y) {
            sim.set_piece(passed, y, k);
        }
        if check::is_king_in_check_with(game, &sim, side, &[&sim]) {
            continue;
        }
        out.push(Vec4::new(king_to, y, board.l, board.t + 1));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
