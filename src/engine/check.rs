//! Cross-timeline attack and check queries.
//!
//! Attack detection layers two predicates. The single-board form asks
//! whether any piece of one side on one board has a candidate reaching a
//! square. The cross-timeline form widens the search to the current board of
//! every active timeline, re-rooting candidates onto the target's timeline;
//! a board projects threats only while its side to move is the attacker
//! (it is the boards the attacker can still act from that menace the
//! present), or when it is the queried board itself.
//!
//! Simulation queries substitute freshly mutated clones for the boards they
//! shadow, so "would this move leave my king in check" never touches game
//! state.

use crate::engine::board::Board;
use crate::engine::game::Game;
use crate::engine::movement;
use crate::engine::types::Side;
use crate::engine::vec4::Vec4;

// ---------------------------------------------------------------------------
// Single-board attacks
// ---------------------------------------------------------------------------

/// Is `(x, y)` attacked by `attacker` pieces on `board`? Candidates are
/// re-rooted to `target_l` when given. No legality filter: attacks ignore
/// self-check.
pub fn is_square_attacked_single(
    board: &Board,
    x: i8,
    y: i8,
    attacker: Side,
    target_l: Option<i32>,
) -> bool {
    let probe = Vec4::new(x, y, target_l.unwrap_or(board.l), board.t + 1);
    board
        .pieces_of(attacker)
        .any(|p| movement::attack_candidates(board, p, target_l).contains(&probe))
}

// ---------------------------------------------------------------------------
// Cross-timeline attacks
// ---------------------------------------------------------------------------

/// The boards a cross-timeline query inspects: the current board of every
/// active timeline, with `overrides` standing in for the head of the
/// timeline they belong to. An override whose timeline does not exist yet
/// (a simulated branch board) is appended as an additional head.
fn search_boards<'a>(game: &'a Game, overrides: &'a [&'a Board]) -> Vec<&'a Board> {
    let mut shadowed = vec![false; overrides.len()];
    let mut out: Vec<&Board> = Vec::new();
    for tl in game.active_timelines() {
        let Some(cur) = tl.current() else { continue };
        match overrides.iter().position(|o| o.l == cur.l) {
            Some(i) => {
                shadowed[i] = true;
                out.push(overrides[i]);
            }
            None => out.push(cur),
        }
    }
    for (i, o) in overrides.iter().enumerate() {
        if !shadowed[i] {
            out.push(o);
        }
    }
    out
}

/// Is the square `(x, y)` of `target_board` attacked by `attacker` from any
/// active timeline?
///
/// A head projects threats onto the target when its side to move is the
/// attacker (it can still act), or when its turn differs from the target's
/// (its pieces face the target board once the submit cycle pads it
/// forward). The target board itself always joins the search.
pub fn is_square_attacked_cross_timeline(
    game: &Game,
    target_board: &Board,
    x: i8,
    y: i8,
    attacker: Side,
    overrides: &[&Board],
) -> bool {
    for board in search_boards(game, overrides) {
        let is_target = board.l == target_board.l && board.t == target_board.t;
        if !is_target && board.turn != attacker && board.turn == target_board.turn {
            continue;
        }
        if is_square_attacked_single(board, x, y, attacker, Some(target_board.l)) {
            return true;
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

/// Is `side`'s king on `board` attacked, on the board itself or from another
/// timeline? A board with no king of `side` is never in check.
pub fn is_king_in_check(game: &Game, board: &Board, side: Side) -> bool {
    is_king_in_check_with(game, board, side, &[])
}

/// [`is_king_in_check`] with simulation clones substituted into the search.
pub fn is_king_in_check_with(
    game: &Game,
    board: &Board,
    side: Side,
    overrides: &[&Board],
) -> bool {
    let Some((kx, ky)) = board.king_square(side) else {
        return false;
    };
    is_square_attacked_single(board, kx, ky, !side, None)
        || is_square_attacked_cross_timeline(game, board, kx, ky, !side, overrides)
}

// ---------------------------------------------------------------------------
// Move legality simulation
// ---------------------------------------------------------------------------

/// Would moving the piece at `from` to `to` leave the mover's own king
/// attacked on the resulting board? The bare mutation is applied to the
/// source board's successor (promotion, castling rook hops and en-passant
/// removal are ignored: the geometric position decides check), and every
/// other timeline's current board is read as-is. Cross-board targets use
/// the same single-board approximation: the mover lands on the successor's
/// `(x, y)`, so a pinned piece cannot slip away through another timeline
/// and a checked king must find a square that is safe on its own board.
pub fn move_leaves_king_in_check(game: &Game, from: Vec4, to: Vec4) -> bool {
    let Some(board) = game.board_at(from.l, from.t) else {
        return true;
    };
    let Some(piece) = board.piece_at(from.x, from.y) else {
        return true;
    };
    let side = piece.side;

    let mut sim = board.successor();
    if let Some(moved) = sim.take_piece(from.x, from.y) {
        sim.take_piece(to.x, to.y);
        sim.set_piece(to.x, to.y, moved);
    }
    is_king_in_check_with(game, &sim, side, &[&sim])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
