use rand::Rng as _;
use serde::Serialize;

use crate::{
    PlacementError,
    core::{
        board::{BOARD_SIZE, Board},
        piece::PieceId,
    },
};

use super::{
    GameStats,
    clear::{self, ResolutionOutcome},
    piece_queue::{GeneratorSeed, PieceGenerator, PieceQueue},
    power,
};

/// Lifecycle state of a session.
///
/// `Over` is terminal: only [`GameSession::reset`] leaves it.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Active,
    Paused,
    Over,
}

/// Everything a single successful placement did, computed atomically.
///
/// Callers replay these sub-events (fills, power clears, line clears) on
/// their own timeline; the engine schedules nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementReport {
    /// The consumed piece.
    pub piece_id: PieceId,
    /// Cells the footprint filled, in stamp order.
    pub cells_filled: Vec<(usize, usize)>,
    /// Cells emptied by power effects fired by this placement.
    pub power_cells_cleared: usize,
    /// Rows cleared by line resolution, ascending.
    pub rows_cleared: Vec<usize>,
    /// Columns cleared by line resolution, ascending.
    pub cols_cleared: Vec<usize>,
    /// Points awarded by line resolution.
    pub points_awarded: usize,
    /// Combo streak after this placement.
    pub combo: usize,
    /// Whether this placement newly ended the game.
    pub game_over: bool,
}

/// The session controller: one live board, the offer queue, and the score.
///
/// All engine operations are synchronous and re-validate their inputs; the
/// session is the sole trust boundary between the presentation layer and the
/// game state.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    queue: PieceQueue,
    generator: PieceGenerator,
    stats: GameStats,
    session_state: SessionState,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Creates a fresh session with a random seed: empty board, full queue,
    /// zeroed stats, `Active` state.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for reproducible piece
    /// sequences.
    #[must_use]
    pub fn with_seed(seed: GeneratorSeed) -> Self {
        let mut generator = PieceGenerator::with_seed(seed);
        let queue = PieceQueue::generate(&mut generator);
        Self {
            board: Board::EMPTY,
            queue,
            generator,
            stats: GameStats::new(),
            session_state: SessionState::Active,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn queue(&self) -> &PieceQueue {
        &self.queue
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn session_state(&self) -> &SessionState {
        &self.session_state
    }

    /// Attempts to place the queued piece with its bounding-box corner at
    /// `(row, col)`.
    ///
    /// On failure nothing changes. On success the placement runs to
    /// completion in this call: stamp, power effects in stamp order, the
    /// clear cascade, stats update, queue consumption and refill, and
    /// game-over re-evaluation.
    pub fn try_place(
        &mut self,
        piece_id: PieceId,
        row: usize,
        col: usize,
    ) -> Result<PlacementReport, PlacementError> {
        match self.session_state {
            SessionState::Active => {}
            SessionState::Paused => return Err(PlacementError::GamePaused),
            SessionState::Over => return Err(PlacementError::GameOver),
        }
        let piece = self
            .queue
            .get(piece_id)
            .ok_or(PlacementError::InvalidPosition)?;
        if !self.board.can_place(piece, row, col) {
            return Err(PlacementError::InvalidPosition);
        }

        let piece = self
            .queue
            .take(piece_id)
            .expect("piece was just found in the queue");
        let cells_filled: Vec<_> = piece.occupied_positions(row, col).collect();
        let power_cells = self.board.place(&piece, row, col);

        // Each power cell fires against the board left by the previous one.
        let mut power_cells_cleared = 0;
        for power_cell in &power_cells {
            power_cells_cleared += power::apply_power(
                &mut self.board,
                power_cell.kind,
                power_cell.row,
                power_cell.col,
            );
        }

        let (rows_cleared, cols_cleared, points_awarded) = self.resolve_clears();

        self.refill_if_empty();
        let game_over = self.check_game_over();

        Ok(PlacementReport {
            piece_id,
            cells_filled,
            power_cells_cleared,
            rows_cleared,
            cols_cleared,
            points_awarded,
            combo: self.stats.combo(),
            game_over,
        })
    }

    /// Runs the clear cascade for the placement just applied and folds the
    /// result into the stats.
    ///
    /// A first pass that clears nothing resets the combo. After a clearing
    /// pass the resolver is re-invoked until a pass finds nothing; that
    /// terminating pass does not touch the streak.
    fn resolve_clears(&mut self) -> (Vec<usize>, Vec<usize>, usize) {
        let mut outcome = clear::resolve(&mut self.board, self.stats.combo());
        if !outcome.cleared_any() {
            self.stats.complete_placement(0, 0, 0);
            return (Vec::new(), Vec::new(), 0);
        }

        let mut rows_cleared = Vec::new();
        let mut cols_cleared = Vec::new();
        let mut points_awarded = 0;
        let mut total_lines = 0;
        let mut combo = self.stats.combo();
        while outcome.cleared_any() {
            rows_cleared.extend(outcome.rows_cleared.iter().copied());
            cols_cleared.extend(outcome.cols_cleared.iter().copied());
            points_awarded += outcome.points_awarded;
            total_lines += outcome.total_lines();
            combo = outcome.new_combo;
            outcome = clear::resolve(&mut self.board, combo);
        }
        debug_assert_eq!(outcome, ResolutionOutcome::default());
        self.stats
            .complete_placement(total_lines, points_awarded, combo);
        (rows_cleared, cols_cleared, points_awarded)
    }

    /// Regenerates a full queue when the queue is empty and the session is
    /// active. Idempotent: a non-empty queue is left alone.
    pub fn refill_if_empty(&mut self) {
        if self.session_state.is_active() && self.queue.is_empty() {
            self.queue.refill(&mut self.generator);
        }
    }

    /// Re-evaluates the terminal condition: no queued piece fits at any of
    /// the 64 origins. When that holds the session transitions to `Over`.
    pub fn check_game_over(&mut self) -> bool {
        // A transiently empty queue is awaiting refill, not a dead end.
        if self.queue.is_empty() {
            return false;
        }
        let any_fits = self.queue.iter().any(|piece| {
            (0..BOARD_SIZE)
                .any(|row| (0..BOARD_SIZE).any(|col| self.board.can_place(piece, row, col)))
        });
        if !any_fits {
            self.session_state = SessionState::Over;
        }
        !any_fits
    }

    /// Suspends placements. No-op unless the session is active.
    pub fn pause(&mut self) {
        if self.session_state.is_active() {
            self.session_state = SessionState::Paused;
        }
    }

    /// Resumes from pause. No-op unless the session is paused.
    pub fn resume(&mut self) {
        if self.session_state.is_paused() {
            self.session_state = SessionState::Active;
        }
    }

    /// Discards the whole session and starts a fresh one with a fresh
    /// random seed. This is the only way out of `Over`.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use arrayvec::ArrayVec;

    use super::*;
    use crate::core::piece::{BlockColor, Piece, PieceId, PowerKind, ShapeId};

    fn zero_seed() -> GeneratorSeed {
        "00000000000000000000000000000000".parse().unwrap()
    }

    fn piece(id: u64, shape: u8, color: BlockColor, power: Option<PowerKind>) -> Piece {
        Piece::new(PieceId(id), ShapeId::new(shape).unwrap(), color, power)
    }

    fn dot(id: u64) -> Piece {
        piece(id, 0, BlockColor::Cyan, None)
    }

    /// Session with a handcrafted board and queue, for deterministic turns.
    fn session_with(board: Board, pieces: &[Piece]) -> GameSession {
        let mut queue_pieces = ArrayVec::new();
        for p in pieces {
            queue_pieces.push(*p);
        }
        GameSession {
            board,
            queue: PieceQueue::from_pieces(queue_pieces),
            generator: PieceGenerator::with_seed(zero_seed()),
            stats: GameStats::new(),
            session_state: SessionState::Active,
        }
    }

    fn fill_row_except(board: &mut Board, row: usize, gap_col: usize) {
        for col in 0..BOARD_SIZE {
            if col != gap_col {
                board.place(&dot(1000 + col as u64), row, col);
            }
        }
    }

    #[test]
    fn test_fresh_session_invariants() {
        let session = GameSession::with_seed(zero_seed());
        assert!(session.board().is_empty());
        assert_eq!(session.queue().len(), 3);
        assert_eq!(session.stats().score(), 0);
        assert_eq!(session.stats().combo(), 0);
        assert_eq!(session.stats().total_cleared_lines(), 0);
        assert!(session.session_state().is_active());
    }

    #[test]
    fn test_try_place_fills_and_consumes_piece() {
        let mut session = session_with(Board::EMPTY, &[dot(1), dot(2), dot(3)]);
        let report = session.try_place(PieceId(1), 4, 4).unwrap();
        assert_eq!(report.cells_filled, vec![(4, 4)]);
        assert_eq!(report.points_awarded, 0);
        assert!(!report.game_over);
        assert!(session.board().cell(4, 4).is_filled());
        assert!(session.queue().get(PieceId(1)).is_none());
        assert_eq!(session.queue().len(), 2);
        assert_eq!(session.stats().placed_pieces(), 1);
    }

    #[test]
    fn test_unknown_piece_is_invalid_position() {
        let mut session = session_with(Board::EMPTY, &[dot(1)]);
        let err = session.try_place(PieceId(99), 0, 0).unwrap_err();
        assert_eq!(err, PlacementError::InvalidPosition);
        assert!(session.board().is_empty());
        assert_eq!(session.queue().len(), 1);
    }

    #[test]
    fn test_illegal_position_leaves_everything_unchanged() {
        let mut board = Board::EMPTY;
        board.place(&dot(50), 0, 5);
        let mut session = session_with(board, &[piece(1, 3, BlockColor::Red, None)]);
        let before_board = session.board().clone();

        // 1×4 bar overlapping the filled cell.
        let err = session.try_place(PieceId(1), 0, 4).unwrap_err();
        assert_eq!(err, PlacementError::InvalidPosition);
        // And out of bounds.
        let err = session.try_place(PieceId(1), 0, 5).unwrap_err();
        assert_eq!(err, PlacementError::InvalidPosition);

        assert_eq!(session.board(), &before_board);
        assert_eq!(session.queue().len(), 1);
        assert_eq!(session.stats().placed_pieces(), 0);
    }

    #[test]
    fn test_paused_session_rejects_placement() {
        let mut session = session_with(Board::EMPTY, &[dot(1)]);
        session.pause();
        assert!(session.session_state().is_paused());
        let err = session.try_place(PieceId(1), 0, 0).unwrap_err();
        assert_eq!(err, PlacementError::GamePaused);
        session.resume();
        assert!(session.try_place(PieceId(1), 0, 0).is_ok());
    }

    #[test]
    fn test_completing_a_row_clears_and_scores() {
        let mut board = Board::EMPTY;
        fill_row_except(&mut board, 3, 7);
        let mut session = session_with(board, &[dot(1), dot(2)]);
        let report = session.try_place(PieceId(1), 3, 7).unwrap();
        assert_eq!(report.rows_cleared, vec![3]);
        assert!(report.cols_cleared.is_empty());
        assert_eq!(report.points_awarded, 100);
        assert_eq!(report.combo, 1);
        assert!(session.board().is_empty());
        assert_eq!(session.stats().score(), 100);
        assert_eq!(session.stats().total_cleared_lines(), 1);
    }

    #[test]
    fn test_combo_streak_counts_clearing_placements() {
        let mut board = Board::EMPTY;
        fill_row_except(&mut board, 0, 0);
        fill_row_except(&mut board, 4, 4);
        let mut session = session_with(board, &[dot(1), dot(2), dot(3)]);

        let first = session.try_place(PieceId(1), 0, 0).unwrap();
        assert_eq!(first.combo, 1);
        assert_eq!(first.points_awarded, 100);

        let second = session.try_place(PieceId(2), 4, 4).unwrap();
        assert_eq!(second.combo, 2);
        assert_eq!(second.points_awarded, 200);
        assert_eq!(session.stats().score(), 300);

        // A no-clear placement resets the streak.
        let third = session.try_place(PieceId(3), 7, 7).unwrap();
        assert_eq!(third.combo, 0);
        assert_eq!(session.stats().combo(), 0);
    }

    #[test]
    fn test_simultaneous_row_and_column_score_together() {
        let mut board = Board::EMPTY;
        fill_row_except(&mut board, 2, 5);
        for row in 0..BOARD_SIZE {
            if row != 2 {
                board.place(&dot(2000 + row as u64), row, 5);
            }
        }
        let mut session = session_with(board, &[dot(1)]);
        let report = session.try_place(PieceId(1), 2, 5).unwrap();
        assert_eq!(report.rows_cleared, vec![2]);
        assert_eq!(report.cols_cleared, vec![5]);
        assert_eq!(report.points_awarded, 200);
        assert!(session.board().is_empty());
        assert_eq!(session.stats().total_cleared_lines(), 2);
    }

    #[test]
    fn test_power_effects_fire_before_line_resolution() {
        // Row 6 is one cell short at (6, 3); a lightning dot dropped there
        // clears its row and column directly, so line resolution then finds
        // nothing and the combo resets.
        let mut board = Board::EMPTY;
        fill_row_except(&mut board, 6, 3);
        let mut session = session_with(
            board,
            &[piece(1, 0, BlockColor::Power, Some(PowerKind::Lightning))],
        );
        let report = session.try_place(PieceId(1), 6, 3).unwrap();
        assert_eq!(report.power_cells_cleared, 8);
        assert!(report.rows_cleared.is_empty());
        assert_eq!(report.points_awarded, 0);
        assert_eq!(report.combo, 0);
        assert!(session.board().is_empty());
    }

    #[test]
    fn test_multi_cell_power_piece_fires_per_cell_sequentially() {
        // A 1×2 bomb piece at (0, 0): the first bomb clears the 2×2 around
        // (0, 0) including its sibling cell, the second still fires at (0, 1).
        let mut board = Board::EMPTY;
        board.place(&dot(50), 1, 2);
        let mut session = session_with(
            board,
            &[piece(1, 1, BlockColor::Power, Some(PowerKind::Bomb))],
        );
        let report = session.try_place(PieceId(1), 0, 0).unwrap();
        // First bomb empties (0,0), (0,1), (1,0), (1,1): both piece cells.
        // Second bomb at (0,1) reaches (1,2) and clears the leftover dot.
        assert_eq!(report.power_cells_cleared, 3);
        assert!(session.board().is_empty());
    }

    #[test]
    fn test_queue_refills_after_last_piece() {
        let mut session = session_with(Board::EMPTY, &[dot(1)]);
        let report = session.try_place(PieceId(1), 0, 0).unwrap();
        assert!(!report.game_over);
        assert_eq!(session.queue().len(), 3, "queue refills once emptied");
    }

    #[test]
    fn test_refill_if_empty_is_idempotent() {
        let mut session = GameSession::with_seed(zero_seed());
        let snapshot: Vec<_> = session.queue().iter().copied().collect();
        session.refill_if_empty();
        session.refill_if_empty();
        let after: Vec<_> = session.queue().iter().copied().collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    fn test_game_over_on_full_board_with_single_cell_pieces() {
        let mut board = Board::EMPTY;
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                board.place(&dot(100 + (row * BOARD_SIZE + col) as u64), row, col);
            }
        }
        let mut session = session_with(board, &[dot(1), dot(2), dot(3)]);
        assert!(session.check_game_over());
        assert!(session.session_state().is_over());
        let err = session.try_place(PieceId(1), 0, 0).unwrap_err();
        assert_eq!(err, PlacementError::GameOver);
    }

    #[test]
    fn test_no_game_over_with_one_empty_cell() {
        let mut board = Board::EMPTY;
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if (row, col) != (7, 7) {
                    board.place(&dot(100 + (row * BOARD_SIZE + col) as u64), row, col);
                }
            }
        }
        let mut session = session_with(board, &[dot(1), dot(2), dot(3)]);
        assert!(!session.check_game_over());
        assert!(session.session_state().is_active());
    }

    #[test]
    fn test_placement_reports_newly_triggered_game_over() {
        // Checkerboard board: no full line anywhere and no 1×2 piece ever
        // fits. Placing the dot leaves only the 1×2 bar in the queue, which
        // fits nowhere, so this placement newly ends the game.
        let mut board = Board::EMPTY;
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if (row + col) % 2 == 0 {
                    board.place(&dot(100 + (row * BOARD_SIZE + col) as u64), row, col);
                }
            }
        }
        let bar = piece(2, 1, BlockColor::Red, None); // 1×2 bar
        let mut session = session_with(board, &[dot(1), bar]);
        assert!(!session.check_game_over(), "the dot still fits");

        let report = session.try_place(PieceId(1), 0, 1).unwrap();
        assert!(report.game_over);
        assert!(report.rows_cleared.is_empty() && report.cols_cleared.is_empty());
        assert!(session.session_state().is_over());
        let err = session.try_place(PieceId(2), 0, 3).unwrap_err();
        assert_eq!(err, PlacementError::GameOver);
    }

    #[test]
    fn test_reset_restores_initial_invariants() {
        let mut session = session_with(Board::EMPTY, &[dot(1), dot(2), dot(3)]);
        session.try_place(PieceId(1), 0, 0).unwrap();
        session.pause();
        session.reset();
        assert!(session.board().is_empty());
        assert_eq!(session.queue().len(), 3);
        assert_eq!(session.stats().score(), 0);
        assert_eq!(session.stats().combo(), 0);
        assert_eq!(session.stats().total_cleared_lines(), 0);
        assert_eq!(session.stats().placed_pieces(), 0);
        assert!(session.session_state().is_active());
    }

    #[test]
    fn test_pause_does_not_leave_game_over() {
        let mut board = Board::EMPTY;
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                board.place(&dot(100 + (row * BOARD_SIZE + col) as u64), row, col);
            }
        }
        let mut session = session_with(board, &[dot(1)]);
        session.check_game_over();
        assert!(session.session_state().is_over());
        session.pause();
        assert!(session.session_state().is_over());
        session.resume();
        assert!(session.session_state().is_over());
    }

    #[test]
    fn test_seeded_sessions_offer_identical_queues() {
        let seed: GeneratorSeed = "0123456789abcdeffedcba9876543210".parse().unwrap();
        let a = GameSession::with_seed(seed);
        let b = GameSession::with_seed(seed);
        let qa: Vec<_> = a.queue().iter().copied().collect();
        let qb: Vec<_> = b.queue().iter().copied().collect();
        assert_eq!(qa, qb);
    }
}
