pub mod board;
pub mod check;
pub mod clock;
pub mod game;
pub mod movement;
pub mod moves;
pub mod options;
pub mod piece;
pub mod timeline;
pub mod types;
pub mod variant;
pub mod vec4;
pub mod wire;

pub use board::Board;
pub use check::{
    is_king_in_check, is_square_attacked_cross_timeline, is_square_attacked_single,
    move_leaves_king_in_check,
};
pub use clock::{GameClock, ManualClock, NullClock};
pub use movement::{attack_candidates, candidates};
pub use game::{Game, SubmitOutcome};
pub use moves::{Move, MoveKind};
pub use options::{GameOptions, TimeSettings};
pub use piece::Piece;
pub use timeline::Timeline;
pub use types::*;
pub use variant::Variant;
pub use vec4::Vec4;
pub use wire::WireMove;
