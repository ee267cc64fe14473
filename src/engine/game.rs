//! The game aggregate.
//!
//! `Game` owns every timeline, board and piece, and exposes the submit
//! cycle: buffer moves with [`Game::make_move`], take them back with
//! [`Game::undo`], commit with [`Game::submit`]. Submission null-pads every
//! active timeline still waiting on the mover, recomputes the present,
//! flips the turn, and settles checkmate/stalemate for the opponent.
//!
//! The present is the minimum `end` across the active range: timelines with
//! `|l| <= min(spawned by black, spawned by white) + 1`. Spawning timelines
//! widens the range; undoing a branch narrows it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use crate::engine::board::Board;
use crate::engine::check;
use crate::engine::clock::GameClock;
use crate::engine::movement;
use crate::engine::moves::{self, Move};
use crate::engine::options::GameOptions;
use crate::engine::piece::Piece;
use crate::engine::timeline::Timeline;
use crate::engine::types::{EngineError, Promotion, Side, WinReason};
use crate::engine::variant::Variant;
use crate::engine::vec4::Vec4;

// =========================================================================
// SubmitOutcome
// =========================================================================

/// Result of a submit attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub submitted: bool,
    /// Milliseconds the committed turn took, when a clock was driven.
    pub elapsed_time: Option<u64>,
    /// Configured cap on time gained back per turn, when clocks run.
    pub time_gained_cap: Option<u64>,
}

impl SubmitOutcome {
    fn rejected() -> Self {
        SubmitOutcome {
            submitted: false,
            elapsed_time: None,
            time_gained_cap: None,
        }
    }
}

// =========================================================================
// Game
// =========================================================================

/// A complete multiverse game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub created_at: DateTime<Utc>,

    turn: Side,
    present: i32,
    /// Timelines `l = 0, 1, 2, ...` (index `l`).
    timelines_white: Vec<Timeline>,
    /// Timelines `l = -1, -2, ...` (index `-l - 1`).
    timelines_black: Vec<Timeline>,
    /// Timelines spawned per side, `[black, white]`.
    timeline_count: [u32; 2],
    /// Moves buffered this submit cycle, undoable until committed.
    current_turn_moves: Vec<Move>,
    /// King positions currently under cross-timeline attack.
    displayed_checks: Vec<Vec4>,
    finished: bool,
    options: GameOptions,
    local_players: [bool; 2],
}

impl Game {
    // -----------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------

    /// A new game: timeline `l = 0` seeded with an inactive `t = -1`
    /// placeholder and the variant's `t = 0` setup board.
    pub fn new(options: GameOptions, local_players: [bool; 2]) -> Self {
        let variant: Variant = options.variant;
        let mut placeholder = variant.initial_board(0, -1, options.seed);
        placeholder.active = false;
        let initial = variant.initial_board(0, 0, options.seed);

        let mut main = Timeline::new(0, -1);
        main.push(placeholder)
            .expect("seed boards are coordinate-consistent");
        main.push(initial)
            .expect("seed boards are coordinate-consistent");

        let finished = options.finished;
        Game {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            turn: Side::White,
            present: 0,
            timelines_white: vec![main],
            timelines_black: Vec::new(),
            timeline_count: [0, 0],
            current_turn_moves: Vec::new(),
            displayed_checks: Vec::new(),
            finished,
            options,
            local_players,
        }
    }

    /// A game starting from a custom position instead of the variant setup.
    /// The board is re-rooted to `(0, 0)`; the `t = -1` placeholder mirrors
    /// it. Used for puzzles and tests.
    pub fn from_setup(options: GameOptions, local_players: [bool; 2], setup: &Board) -> Self {
        let mut game = Self::new(options, local_players);
        let mut placeholder = setup.derive_at(0, -1);
        placeholder.active = false;
        let initial = setup.derive_at(0, 0);
        let main = game
            .timeline_mut(0)
            .expect("the main timeline always exists");
        main.replace(-1, placeholder)
            .expect("seed boards are coordinate-consistent");
        main.replace(0, initial)
            .expect("seed boards are coordinate-consistent");
        game.recompute_checks();
        game
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Side to move.
    pub fn turn(&self) -> Side {
        self.turn
    }

    /// Minimum `end` across active timelines, clamped to 0.
    pub fn present(&self) -> i32 {
        self.present
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    pub fn local_players(&self) -> [bool; 2] {
        self.local_players
    }

    /// King positions under attack, for display.
    pub fn displayed_checks(&self) -> &[Vec4] {
        &self.displayed_checks
    }

    /// Moves buffered in the current submit cycle.
    pub fn current_turn_moves(&self) -> &[Move] {
        &self.current_turn_moves
    }

    /// Timelines spawned per side, `[black, white]`.
    pub fn timeline_count(&self) -> [u32; 2] {
        self.timeline_count
    }

    /// The timeline at index `l`, if it exists.
    pub fn timeline(&self, l: i32) -> Option<&Timeline> {
        if l >= 0 {
            self.timelines_white.get(l as usize)
        } else {
            self.timelines_black.get((-l - 1) as usize)
        }
    }

    /// All timelines, main first, then white's spawn order, then black's.
    pub fn timelines(&self) -> impl Iterator<Item = &Timeline> {
        self.timelines_white.iter().chain(self.timelines_black.iter())
    }

    /// Timelines inside the active range.
    pub fn active_timelines(&self) -> impl Iterator<Item = &Timeline> {
        self.timelines().filter(|tl| tl.active)
    }

    /// Current boards of the active timelines, the render projection.
    pub fn active_boards(&self) -> Vec<&Board> {
        self.active_timelines()
            .filter_map(|tl| tl.current())
            .collect()
    }

    /// The board at `(l, t)`, if present.
    pub fn board_at(&self, l: i32, t: i32) -> Option<&Board> {
        self.timeline(l).and_then(|tl| tl.board_at(t))
    }

    /// The piece at a full 4D position, if present.
    pub fn get_piece(&self, pos: Vec4) -> Option<&Piece> {
        self.board_at(pos.l, pos.t)
            .and_then(|b| b.piece_at(pos.x, pos.y))
    }

    // -----------------------------------------------------------------
    // Internal timeline management
    // -----------------------------------------------------------------

    pub(crate) fn timeline_mut(&mut self, l: i32) -> Result<&mut Timeline, EngineError> {
        let slot = if l >= 0 {
            self.timelines_white.get_mut(l as usize)
        } else {
            self.timelines_black.get_mut((-l - 1) as usize)
        };
        slot.ok_or_else(|| EngineError::State(format!("no timeline L{l}")))
    }

    /// The index the next timeline spawned by `side` will get.
    pub(crate) fn next_timeline_index(&self, side: Side) -> i32 {
        match side {
            Side::White => self.timeline_count[Side::White.index()] as i32 + 1,
            Side::Black => -(self.timeline_count[Side::Black.index()] as i32 + 1),
        }
    }

    pub(crate) fn spawn_timeline(
        &mut self,
        l: i32,
        start: i32,
        board: Board,
    ) -> Result<(), EngineError> {
        let mut tl = Timeline::new(l, start);
        tl.push(board)?;
        if l > 0 {
            if self.timelines_white.len() != l as usize {
                return Err(EngineError::State(format!(
                    "spawning L{l} out of order (have {})",
                    self.timelines_white.len()
                )));
            }
            self.timelines_white.push(tl);
            self.timeline_count[Side::White.index()] += 1;
        } else if l < 0 {
            if self.timelines_black.len() != (-l - 1) as usize {
                return Err(EngineError::State(format!(
                    "spawning L{l} out of order (have {})",
                    self.timelines_black.len()
                )));
            }
            self.timelines_black.push(tl);
            self.timeline_count[Side::Black.index()] += 1;
        } else {
            return Err(EngineError::State("cannot respawn the main timeline".into()));
        }
        self.refresh_active_range();
        Ok(())
    }

    /// Remove a spawned timeline again (undo of a branch). Only the
    /// outermost timeline of its side can go.
    pub(crate) fn remove_timeline(&mut self, l: i32) -> Result<(), EngineError> {
        if l > 0 && self.timelines_white.len() == l as usize + 1 {
            self.timelines_white.pop();
            self.timeline_count[Side::White.index()] -= 1;
        } else if l < 0 && self.timelines_black.len() == (-l) as usize {
            self.timelines_black.pop();
            self.timeline_count[Side::Black.index()] -= 1;
        } else {
            return Err(EngineError::State(format!(
                "timeline L{l} is not the outermost of its side"
            )));
        }
        self.refresh_active_range();
        Ok(())
    }

    /// Timelines are active within `|l| <= min(counts) + 1`: symmetric,
    /// with a one-step lead for the side ahead on branches.
    fn refresh_active_range(&mut self) {
        let lead = self.timeline_count[0].min(self.timeline_count[1]) + 1;
        for tl in self
            .timelines_white
            .iter_mut()
            .chain(self.timelines_black.iter_mut())
        {
            tl.active = tl.l.unsigned_abs() <= lead;
        }
    }

    pub(crate) fn recompute_present(&mut self) {
        let mut min_end = i32::MAX;
        for tl in self.active_timelines() {
            min_end = min_end.min(tl.end());
        }
        self.present = if min_end == i32::MAX { 0 } else { min_end.max(0) };
    }

    /// Recompute the displayed-check projection, e.g. after restoring a
    /// serialized snapshot.
    pub fn refresh_checks(&mut self) {
        self.recompute_checks();
    }

    fn recompute_checks(&mut self) {
        let mut checks = Vec::new();
        for tl in self.active_timelines() {
            let Some(board) = tl.current() else { continue };
            for side in [Side::Black, Side::White] {
                if let Some((kx, ky)) = board.king_square(side) {
                    if check::is_king_in_check(self, board, side) {
                        checks.push(Vec4::new(kx, ky, board.l, board.t));
                    }
                }
            }
        }
        self.displayed_checks = checks;
    }

    /// Whether a move already acted on timeline `l` this cycle.
    fn timeline_used_this_cycle(&self, l: i32) -> bool {
        self.current_turn_moves
            .iter()
            .any(|m| m.consumed_timelines().contains(&l))
    }

    // -----------------------------------------------------------------
    // Legal moves
    // -----------------------------------------------------------------

    /// Same-board candidate moves for the piece at `at`, filtered by
    /// self-check. Cross-board proposals go straight to [`Game::make_move`].
    pub fn legal_moves_for(&self, at: Vec4) -> Vec<Vec4> {
        if self.finished {
            return Vec::new();
        }
        let Some((board, piece)) = self.playable_piece(at) else {
            return Vec::new();
        };
        movement::candidates(self, board, piece, None)
            .into_iter()
            .filter(|&to| !check::move_leaves_king_in_check(self, at, to))
            .collect()
    }

    /// The piece at `at` if it may move this cycle: it belongs to the side
    /// to move, sits on the active head of an active timeline where it is
    /// its side's turn, and that timeline has not moved yet.
    fn playable_piece(&self, at: Vec4) -> Option<(&Board, &Piece)> {
        let tl = self.timeline(at.l)?;
        if !tl.active || tl.end() != at.t {
            return None;
        }
        let board = tl.board_at(at.t)?;
        if !board.active || board.turn != self.turn {
            return None;
        }
        let piece = board.piece_at(at.x, at.y)?;
        if piece.side != self.turn || self.timeline_used_this_cycle(at.l) {
            return None;
        }
        Some((board, piece))
    }

    // -----------------------------------------------------------------
    // Make move
    // -----------------------------------------------------------------

    /// Buffer a move for this submit cycle. Answers `false` for anything
    /// illegal, leaving the game untouched.
    pub fn make_move(&mut self, from: Vec4, to: Vec4, promotion: Option<Promotion>) -> bool {
        if self.finished || !from.in_bounds() || !to.in_bounds() {
            return false;
        }
        if self.playable_piece(from).is_none() {
            return false;
        }

        let same_board = to.l == from.l && to.t == from.t + 1 && self.board_at(to.l, to.t).is_none();
        if same_board {
            let Some((board, piece)) = self.playable_piece(from) else {
                return false;
            };
            if !movement::candidates(self, board, piece, None).contains(&to) {
                return false;
            }
        } else {
            // A jump onto another active head, or a branch off history.
            let Some(target_tl) = self.timeline(to.l) else {
                return false;
            };
            let Some(target) = target_tl.board_at(to.t) else {
                return false;
            };
            if target.active {
                // Head board: only a foreign, active, unconsumed timeline
                // accepts a jump.
                if target_tl.end() != to.t
                    || !target_tl.active
                    || to.l == from.l
                    || self.timeline_used_this_cycle(to.l)
                {
                    return false;
                }
            }
            let Some((board, piece)) = self.playable_piece(from) else {
                return false;
            };
            let reachable = movement::candidates(self, board, piece, Some(to.l))
                .iter()
                .any(|c| c.x == to.x && c.y == to.y);
            if !reachable {
                return false;
            }
        }

        if check::move_leaves_king_in_check(self, from, to) {
            return false;
        }

        match moves::apply_move(self, from, to, promotion) {
            Ok(mv) => {
                debug!(%mv, "buffered move");
                self.current_turn_moves.push(mv);
                self.recompute_present();
                self.recompute_checks();
                true
            }
            Err(err) => {
                error!(%err, "move engine rejected a validated move");
                false
            }
        }
    }

    // -----------------------------------------------------------------
    // Undo
    // -----------------------------------------------------------------

    /// Take back the most recent buffered move. Nothing to take back once
    /// the cycle is submitted.
    pub fn undo(&mut self) -> bool {
        if self.finished {
            return false;
        }
        let Some(mv) = self.current_turn_moves.pop() else {
            return false;
        };
        match moves::undo_move(self, mv) {
            Ok(()) => {
                self.recompute_present();
                self.recompute_checks();
                true
            }
            Err(err) => {
                error!(%err, "undo failed");
                false
            }
        }
    }

    // -----------------------------------------------------------------
    // Submit
    // -----------------------------------------------------------------

    /// Commit the buffered moves without driving a clock.
    pub fn submit(&mut self) -> SubmitOutcome {
        self.submit_inner(None)
    }

    /// Commit the buffered moves, stopping the mover's clock and starting
    /// the opponent's.
    pub fn submit_with_clock(&mut self, clock: &mut dyn GameClock) -> SubmitOutcome {
        self.submit_inner(Some(clock))
    }

    fn submit_inner(&mut self, clock: Option<&mut dyn GameClock>) -> SubmitOutcome {
        if self.finished {
            return SubmitOutcome::rejected();
        }
        // Every active timeline must have caught up to the present.
        if self.active_timelines().any(|tl| tl.end() < self.present) {
            return SubmitOutcome::rejected();
        }

        // Null-pad: any active timeline whose head still waits on the mover
        // advances by a synthesized move. Timelines a move advanced this
        // cycle already show the opponent to move and are skipped.
        let to_pad: Vec<i32> = self
            .active_timelines()
            .filter(|tl| tl.current().map_or(false, |b| b.turn == self.turn))
            .map(|tl| tl.l)
            .collect();
        let padded = to_pad.len();
        for l in to_pad {
            if let Err(err) = moves::apply_null(self, l) {
                error!(%err, l, "null padding failed");
                return SubmitOutcome::rejected();
            }
        }
        debug!(padded, turn = %self.turn, "submit");

        // Commit point: buffered moves become history.
        self.current_turn_moves.clear();
        self.recompute_present();

        let elapsed_time = clock.map(|c| {
            let elapsed = c.stop_time();
            c.start_time(None, None);
            elapsed
        });

        self.turn = !self.turn;
        self.recompute_checks();

        if !self.has_legal_moves() {
            self.finish_by_mate();
        }

        let time_gained_cap = if self.options.time.running_clocks {
            Some(self.options.time.running_clock_time)
        } else {
            None
        };
        SubmitOutcome {
            submitted: true,
            elapsed_time,
            time_gained_cap,
        }
    }

    fn finish_by_mate(&mut self) {
        self.finished = true;
        self.options.finished = true;
        if self.side_in_check(self.turn) {
            let winner = !self.turn;
            self.options.winner = Some(winner.code() as i8);
            self.options.win_cause = Some(self.turn.code());
            self.options.win_reason = Some(WinReason::Checkmate);
            debug!(winner = %winner, "checkmate");
        } else {
            self.options.winner = Some(-1);
            self.options.win_cause = None;
            self.options.win_reason = Some(WinReason::Stalemate);
            debug!("stalemate");
        }
    }

    // -----------------------------------------------------------------
    // Endgame queries
    // -----------------------------------------------------------------

    /// Whether any king of `side` on an active head is under attack.
    pub fn side_in_check(&self, side: Side) -> bool {
        self.active_boards()
            .into_iter()
            .any(|b| check::is_king_in_check(self, b, side))
    }

    /// Whether the side to move has any legal move: same-board, jump onto
    /// another active head, or branch off any historical board.
    pub fn has_legal_moves(&self) -> bool {
        let sources: Vec<&Board> = self
            .active_boards()
            .into_iter()
            .filter(|b| b.turn == self.turn)
            .collect();

        // Same-board moves first; they resolve almost every position.
        for &board in &sources {
            for piece in board.pieces_of(self.turn) {
                for to in movement::candidates(self, board, piece, None) {
                    if !check::move_leaves_king_in_check(self, piece.pos(), to) {
                        return true;
                    }
                }
            }
        }

        // Cross-board targets: heads of other active timelines (jumps) and
        // historical boards anywhere (branches).
        let mut targets: Vec<(i32, i32, bool)> = Vec::new();
        for tl in self.timelines() {
            for b in tl.boards() {
                let is_head = b.active && tl.end() == b.t;
                if is_head {
                    if tl.active {
                        targets.push((b.l, b.t, true));
                    }
                } else if !b.active {
                    targets.push((b.l, b.t, false));
                }
            }
        }

        for &board in &sources {
            for piece in board.pieces_of(self.turn) {
                for &(l, t, is_jump) in &targets {
                    if is_jump && l == board.l {
                        continue;
                    }
                    for c in movement::candidates(self, board, piece, Some(l)) {
                        let to = Vec4::new(c.x, c.y, l, t);
                        if !check::move_leaves_king_in_check(self, piece.pos(), to) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// The side to move is mated: in check with no legal move.
    pub fn is_checkmate(&self) -> bool {
        if self.finished {
            return self.options.win_reason == Some(WinReason::Checkmate);
        }
        self.side_in_check(self.turn) && !self.has_legal_moves()
    }

    /// The side to move is stalemated: no legal move, but no check either.
    pub fn is_stalemate(&self) -> bool {
        if self.finished {
            return self.options.win_reason == Some(WinReason::Stalemate);
        }
        !self.side_in_check(self.turn) && !self.has_legal_moves()
    }

    // -----------------------------------------------------------------
    // Concessions
    // -----------------------------------------------------------------

    /// Concede the game for `side`.
    pub fn resign(&mut self, side: Side) -> bool {
        self.finish_externally(side, WinReason::Resign)
    }

    /// Flag `side` as having run out of time. The clock collaborator
    /// decides when; the engine just records it.
    pub fn flag_timeout(&mut self, side: Side) -> bool {
        self.finish_externally(side, WinReason::Timeout)
    }

    fn finish_externally(&mut self, loser: Side, reason: WinReason) -> bool {
        if self.finished {
            return false;
        }
        self.finished = true;
        self.options.finished = true;
        self.options.winner = Some((!loser).code() as i8);
        self.options.win_cause = Some(loser.code());
        self.options.win_reason = Some(reason);
        debug!(loser = %loser, reason = %reason, "game conceded");
        true
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameOptions::default(), [true, true])
    }
}

// =========================================================================
// Tests
// =========================================================================
