/// Cumulative counters for one session.
///
/// Tracks the score, the combo streak, and how many lines each placement
/// cleared:
///
/// - **Score**: points from line clears (power effects award no points on
///   their own)
/// - **Combo**: consecutive placements that each cleared at least one line;
///   reset to 0 by a placement that clears nothing
/// - **Lines cleared**: cumulative rows plus columns ever cleared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStats {
    score: usize,
    placed_pieces: usize,
    total_cleared_lines: usize,
    combo: usize,
    line_cleared_counter: [usize; 7],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Creates a stats tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            placed_pieces: 0,
            total_cleared_lines: 0,
            combo: 0,
            line_cleared_counter: [0; 7],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Number of pieces successfully placed so far.
    #[must_use]
    pub const fn placed_pieces(&self) -> usize {
        self.placed_pieces
    }

    /// Cumulative rows plus columns cleared over the session.
    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Current combo streak.
    #[must_use]
    pub const fn combo(&self) -> usize {
        self.combo
    }

    /// Histogram of lines cleared per placement.
    ///
    /// Index is the number of lines a single placement cleared; larger
    /// clears (a full-board sweep can reach 16) saturate into the last
    /// bucket.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 7] {
        &self.line_cleared_counter
    }

    /// Records the outcome of one successful placement.
    ///
    /// `new_combo` is the streak value after the placement's resolution: one
    /// more than before when it cleared, 0 when it did not.
    pub const fn complete_placement(
        &mut self,
        cleared_lines: usize,
        points: usize,
        new_combo: usize,
    ) {
        self.placed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        self.score += points;
        self.combo = new_combo;
        let bucket = if cleared_lines < self.line_cleared_counter.len() {
            cleared_lines
        } else {
            self.line_cleared_counter.len() - 1
        };
        self.line_cleared_counter[bucket] += 1;
    }
}
