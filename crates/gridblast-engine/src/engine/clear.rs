use arrayvec::ArrayVec;

use crate::core::board::{BOARD_SIZE, Board};

/// Points awarded per cleared line before the combo multiplier.
pub const LINE_SCORE: usize = 100;

/// Result of one scan-clear-score pass over the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionOutcome {
    /// Row indices cleared by this pass, ascending.
    pub rows_cleared: ArrayVec<usize, BOARD_SIZE>,
    /// Column indices cleared by this pass, ascending.
    pub cols_cleared: ArrayVec<usize, BOARD_SIZE>,
    /// Points awarded by this pass.
    pub points_awarded: usize,
    /// Combo value after this pass: `combo + 1` when something cleared,
    /// 0 when the pass found no full line.
    pub new_combo: usize,
}

impl ResolutionOutcome {
    /// Total number of lines (rows plus columns) this pass cleared.
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.rows_cleared.len() + self.cols_cleared.len()
    }

    #[must_use]
    pub fn cleared_any(&self) -> bool {
        self.total_lines() > 0
    }
}

/// Runs one resolution pass: detect full rows and columns, clear them, and
/// score the result.
///
/// With no full line the board is untouched and `new_combo` is 0. Otherwise
/// every full row and column is cleared (intersections once), the combo
/// streak advances by one, and points are
/// `total_lines * LINE_SCORE * max(1, new_combo)` - the multiplier only
/// kicks in from the second consecutive clearing placement.
///
/// The pass is re-entrant: callers re-invoke it on the mutated board until a
/// pass clears nothing, which keeps chained clears correct without relying
/// on timing.
pub fn resolve(board: &mut Board, combo: usize) -> ResolutionOutcome {
    let rows_cleared: ArrayVec<usize, BOARD_SIZE> =
        (0..BOARD_SIZE).filter(|&r| board.is_row_full(r)).collect();
    let cols_cleared: ArrayVec<usize, BOARD_SIZE> =
        (0..BOARD_SIZE).filter(|&c| board.is_col_full(c)).collect();

    if rows_cleared.is_empty() && cols_cleared.is_empty() {
        return ResolutionOutcome::default();
    }

    board.clear_rows(rows_cleared.iter().copied());
    board.clear_cols(cols_cleared.iter().copied());

    let total_lines = rows_cleared.len() + cols_cleared.len();
    let new_combo = combo + 1;
    let points_awarded = total_lines * LINE_SCORE * new_combo.max(1);

    ResolutionOutcome {
        rows_cleared,
        cols_cleared,
        points_awarded,
        new_combo,
    }
}
