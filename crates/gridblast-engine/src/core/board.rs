use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::piece::{BlockColor, MAX_PIECE_CELLS, Piece, PowerKind};

/// Side length of the square board.
pub const BOARD_SIZE: usize = 8;

/// A single board cell.
///
/// The "an empty cell has no color and no power" invariant from the data
/// model is enforced by construction: color and power only exist on the
/// `Filled` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Filled {
        color: BlockColor,
        power: Option<PowerKind>,
    },
}

impl Cell {
    #[must_use]
    pub fn is_filled(self) -> bool {
        matches!(self, Cell::Filled { .. })
    }

    /// Returns the stored color, or `None` for an empty cell.
    #[must_use]
    pub fn color(self) -> Option<BlockColor> {
        match self {
            Cell::Empty => None,
            Cell::Filled { color, .. } => Some(color),
        }
    }

    /// Returns the stored power, or `None` for an empty or unpowered cell.
    #[must_use]
    pub fn power(self) -> Option<PowerKind> {
        match self {
            Cell::Empty => None,
            Cell::Filled { power, .. } => power,
        }
    }
}

/// A power-tagged cell produced by a placement, in stamp order.
///
/// The session dispatches one power effect per entry, in the order the cells
/// were stamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerCell {
    pub row: usize,
    pub col: usize,
    pub kind: PowerKind,
}

/// The 8×8 cell matrix, 0-indexed with row 0 at the top.
///
/// A session owns exactly one live board and mutates it in place; callers
/// needing history (e.g. for animation diffing) snapshot it themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Board {
    /// A board with every cell empty.
    pub const EMPTY: Self = Self {
        cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
    };

    /// Returns the cell at the given coordinate.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of range.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Iterates over the board's rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_SIZE]> {
        self.cells.iter()
    }

    /// Number of filled cells on the board.
    #[must_use]
    pub fn filled_cells(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.is_filled())
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filled_cells() == 0
    }

    /// Whether the piece's footprint fits with its bounding-box corner at
    /// `(origin_row, origin_col)`.
    ///
    /// Every occupied footprint cell must land inside the board on an
    /// unfilled cell; a single offending cell makes the whole placement
    /// illegal.
    #[must_use]
    pub fn can_place(&self, piece: &Piece, origin_row: usize, origin_col: usize) -> bool {
        piece.footprint().occupied_offsets().all(|(r, c)| {
            let row = origin_row + r;
            let col = origin_col + c;
            row < BOARD_SIZE && col < BOARD_SIZE && !self.cells[row][col].is_filled()
        })
    }

    /// Stamps the piece onto the board and returns its power-tagged cells in
    /// stamp (row-major) order.
    ///
    /// Every stamped cell receives the piece's color and power; a multi-cell
    /// power piece therefore produces one [`PowerCell`] per occupied cell.
    /// Callers must have checked [`Self::can_place`] first.
    pub fn place(
        &mut self,
        piece: &Piece,
        origin_row: usize,
        origin_col: usize,
    ) -> ArrayVec<PowerCell, MAX_PIECE_CELLS> {
        let mut power_cells = ArrayVec::new();
        for (row, col) in piece.occupied_positions(origin_row, origin_col) {
            debug_assert!(!self.cells[row][col].is_filled());
            self.cells[row][col] = Cell::Filled {
                color: piece.color(),
                power: piece.power(),
            };
            if let Some(kind) = piece.power() {
                power_cells.push(PowerCell { row, col, kind });
            }
        }
        power_cells
    }

    /// Empties a single cell, returning whether it was filled.
    pub fn clear_cell(&mut self, row: usize, col: usize) -> bool {
        let was_filled = self.cells[row][col].is_filled();
        self.cells[row][col] = Cell::Empty;
        was_filled
    }

    /// Empties every cell in the given rows.
    ///
    /// Clearing is idempotent: a cell covered by both a cleared row and a
    /// cleared column simply ends up empty.
    pub fn clear_rows(&mut self, rows: impl IntoIterator<Item = usize>) {
        for row in rows {
            self.cells[row] = [Cell::Empty; BOARD_SIZE];
        }
    }

    /// Empties every cell in the given columns.
    pub fn clear_cols(&mut self, cols: impl IntoIterator<Item = usize>) {
        for col in cols {
            for row in 0..BOARD_SIZE {
                self.cells[row][col] = Cell::Empty;
            }
        }
    }

    /// Whether all 8 cells of the row are filled.
    #[must_use]
    pub fn is_row_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| cell.is_filled())
    }

    /// Whether all 8 cells of the column are filled.
    #[must_use]
    pub fn is_col_full(&self, col: usize) -> bool {
        self.cells.iter().all(|row| row[col].is_filled())
    }
}
