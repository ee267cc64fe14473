//! Initial-board setups.
//!
//! Variants differ only in what the `t = 0` back ranks hold; pawn ranks and
//! everything downstream are identical. The `Random` variant is the only
//! randomness in the engine and is fully determined by the options seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::engine::board::Board;
use crate::engine::piece::Piece;
use crate::engine::types::{CastlingRights, PieceKind, Side};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    #[default]
    Standard,
    NoBishops,
    NoKnights,
    NoRooks,
    NoQueens,
    KnightsVsBishops,
    SimpleSet,
    Random,
}

const STANDARD_RANK: [Option<PieceKind>; 8] = [
    Some(PieceKind::Rook),
    Some(PieceKind::Knight),
    Some(PieceKind::Bishop),
    Some(PieceKind::Queen),
    Some(PieceKind::King),
    Some(PieceKind::Bishop),
    Some(PieceKind::Knight),
    Some(PieceKind::Rook),
];

impl Variant {
    /// Build the setup board for `(l, t)`.
    pub fn initial_board(self, l: i32, t: i32, seed: u64) -> Board {
        let mut board = Board::empty(l, t);
        for side in [Side::Black, Side::White] {
            let rank = self.back_rank(side, seed);
            let home = side.home_rank();
            for (x, kind) in rank.iter().enumerate() {
                if let Some(kind) = *kind {
                    board.set_piece(x as i8, home, Piece::new(side, kind, x as i8, home, l, t));
                }
            }
            let pawn_rank = side.pawn_rank();
            for x in 0..8i8 {
                board.set_piece(
                    x,
                    pawn_rank,
                    Piece::new(side, PieceKind::Pawn, x, pawn_rank, l, t),
                );
            }
        }
        board.castle_rights = rights_for(&board);
        board
    }

    /// Back rank for one side.
    fn back_rank(self, side: Side, seed: u64) -> [Option<PieceKind>; 8] {
        use PieceKind::*;
        match self {
            Variant::Standard => STANDARD_RANK,
            Variant::NoBishops => without(Bishop),
            Variant::NoKnights => without(Knight),
            Variant::NoRooks => without(Rook),
            Variant::NoQueens => without(Queen),
            // White fields bishops where its knights stood; black the reverse.
            Variant::KnightsVsBishops => match side {
                Side::White => replace(Knight, Bishop),
                Side::Black => replace(Bishop, Knight),
            },
            Variant::SimpleSet => [
                Some(Rook),
                None,
                None,
                Some(Queen),
                Some(King),
                None,
                None,
                Some(Rook),
            ],
            Variant::Random => {
                let mut rank = STANDARD_RANK;
                let mut rng = StdRng::seed_from_u64(seed);
                rank.shuffle(&mut rng);
                rank
            }
        }
    }
}

fn without(kind: PieceKind) -> [Option<PieceKind>; 8] {
    let mut rank = STANDARD_RANK;
    for slot in rank.iter_mut() {
        if *slot == Some(kind) {
            *slot = None;
        }
    }
    rank
}

fn replace(from: PieceKind, to: PieceKind) -> [Option<PieceKind>; 8] {
    let mut rank = STANDARD_RANK;
    for slot in rank.iter_mut() {
        if *slot == Some(from) {
            *slot = Some(to);
        }
    }
    rank
}

/// Grant rights only where a home-square king/rook pair actually stands;
/// shuffled setups usually start with none.
fn rights_for(board: &Board) -> CastlingRights {
    let mut rights = CastlingRights::NONE;
    for side in [Side::Black, Side::White] {
        let home = side.home_rank();
        let king_home = board
            .piece_at(4, home)
            .map_or(false, |p| p.kind == PieceKind::King && p.side == side);
        if !king_home {
            continue;
        }
        let rook_at = |x: i8| {
            board
                .piece_at(x, home)
                .map_or(false, |p| p.kind == PieceKind::Rook && p.side == side)
        };
        if rook_at(7) {
            rights.0 |= CastlingRights::kingside_bit(side);
        }
        if rook_at(0) {
            rights.0 |= CastlingRights::queenside_bit(side);
        }
    }
    rights
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_setup() {
        let b = Variant::Standard.initial_board(0, 0, 0);
        assert_eq!(b.pieces().count(), 32);
        assert_eq!(b.piece_at(4, 7).unwrap().kind, PieceKind::King);
        assert_eq!(b.piece_at(4, 7).unwrap().side, Side::White);
        assert_eq!(b.piece_at(3, 0).unwrap().kind, PieceKind::Queen);
        assert_eq!(b.piece_at(3, 0).unwrap().side, Side::Black);
        assert_eq!(b.castle_rights, CastlingRights::ALL);
        assert_eq!(b.turn, Side::White);
    }

    #[test]
    fn standard_pawn_ranks() {
        let b = Variant::Standard.initial_board(0, 0, 0);
        for x in 0..8i8 {
            assert_eq!(b.piece_at(x, 6).unwrap().kind, PieceKind::Pawn);
            assert_eq!(b.piece_at(x, 6).unwrap().side, Side::White);
            assert_eq!(b.piece_at(x, 1).unwrap().kind, PieceKind::Pawn);
            assert_eq!(b.piece_at(x, 1).unwrap().side, Side::Black);
        }
    }

    #[test]
    fn no_bishops_leaves_holes() {
        let b = Variant::NoBishops.initial_board(0, 0, 0);
        assert!(b.is_empty(2, 0));
        assert!(b.is_empty(5, 0));
        assert!(b.is_empty(2, 7));
        assert!(b.is_empty(5, 7));
        assert_eq!(b.pieces().count(), 28);
        assert_eq!(b.castle_rights, CastlingRights::ALL);
    }

    #[test]
    fn no_rooks_grants_no_rights() {
        let b = Variant::NoRooks.initial_board(0, 0, 0);
        assert!(b.is_empty(0, 0));
        assert!(b.is_empty(7, 7));
        assert_eq!(b.castle_rights, CastlingRights::NONE);
    }

    #[test]
    fn knights_vs_bishops_sides_differ() {
        let b = Variant::KnightsVsBishops.initial_board(0, 0, 0);
        assert_eq!(b.piece_at(1, 7).unwrap().kind, PieceKind::Bishop);
        assert_eq!(b.piece_at(6, 7).unwrap().kind, PieceKind::Bishop);
        assert_eq!(b.piece_at(2, 0).unwrap().kind, PieceKind::Knight);
        assert_eq!(b.piece_at(5, 0).unwrap().kind, PieceKind::Knight);
        // Rooks, queens, kings untouched.
        assert_eq!(b.piece_at(4, 0).unwrap().kind, PieceKind::King);
        assert_eq!(b.castle_rights, CastlingRights::ALL);
    }

    #[test]
    fn simple_set_contents() {
        let b = Variant::SimpleSet.initial_board(0, 0, 0);
        assert_eq!(b.pieces().count(), 24);
        assert!(b.is_empty(1, 0));
        assert!(b.is_empty(6, 7));
        assert_eq!(b.piece_at(0, 7).unwrap().kind, PieceKind::Rook);
        assert_eq!(b.castle_rights, CastlingRights::ALL);
    }

    #[test]
    fn random_is_deterministic_per_seed() {
        let a = Variant::Random.initial_board(0, 0, 42);
        let b = Variant::Random.initial_board(0, 0, 42);
        assert_eq!(a, b);
        assert_eq!(a.pieces().count(), 32);
    }

    #[test]
    fn random_seeds_differ() {
        // Two seeds giving identical shuffles would be a (very) unlucky pick.
        let a = Variant::Random.initial_board(0, 0, 1);
        let b = Variant::Random.initial_board(0, 0, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn random_mirrors_both_sides() {
        let b = Variant::Random.initial_board(0, 0, 7);
        for x in 0..8i8 {
            let white = b.piece_at(x, 7).map(|p| p.kind);
            let black = b.piece_at(x, 0).map(|p| p.kind);
            assert_eq!(white, black);
        }
    }

    #[test]
    fn variant_serde_names_are_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Variant::KnightsVsBishops).unwrap(),
            "\"knights-vs-bishops\""
        );
        let v: Variant = serde_json::from_str("\"simple-set\"").unwrap();
        assert_eq!(v, Variant::SimpleSet);
    }

    #[test]
    fn parity_respected_off_main_timeline() {
        let b = Variant::Standard.initial_board(-1, 0, 0);
        assert_eq!(b.turn, Side::Black);
    }
}
