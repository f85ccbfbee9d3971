use crate::core::board::{BOARD_SIZE, Board};
use crate::core::piece::PowerKind;

/// Applies one power effect at `(row, col)` and returns how many filled
/// cells it emptied.
///
/// Effects act on the board as it stands when they fire: within one
/// placement they run sequentially, each seeing the board left by the
/// previous effect. All four effects clear cells directly, bypassing the
/// full-row/column requirement of normal line clears.
pub fn apply_power(board: &mut Board, kind: PowerKind, row: usize, col: usize) -> usize {
    match kind {
        PowerKind::Bomb => apply_bomb(board, row, col),
        PowerKind::Lightning => apply_lightning(board, row, col),
        PowerKind::Rainbow => apply_rainbow(board, row, col),
        PowerKind::Drill => apply_drill(board, col),
    }
}

/// Clears the 3×3 neighborhood centered at `(row, col)`, clipped to the
/// board. A corner bomb reaches only a 2×2 area.
fn apply_bomb(board: &mut Board, row: usize, col: usize) -> usize {
    let row_range = row.saturating_sub(1)..=(row + 1).min(BOARD_SIZE - 1);
    let col_range = col.saturating_sub(1)..=(col + 1).min(BOARD_SIZE - 1);
    let mut cleared = 0;
    for r in row_range {
        for c in col_range.clone() {
            if board.clear_cell(r, c) {
                cleared += 1;
            }
        }
    }
    cleared
}

/// Clears the whole row and the whole column. The center cell sits on both
/// lines but is counted once.
fn apply_lightning(board: &mut Board, row: usize, col: usize) -> usize {
    let mut cleared = 0;
    for c in 0..BOARD_SIZE {
        if board.clear_cell(row, c) {
            cleared += 1;
        }
    }
    for r in 0..BOARD_SIZE {
        if board.clear_cell(r, col) {
            cleared += 1;
        }
    }
    cleared
}

/// Clears the whole column only; the row is untouched. This is what
/// distinguishes a drill from lightning.
fn apply_drill(board: &mut Board, col: usize) -> usize {
    let mut cleared = 0;
    for r in 0..BOARD_SIZE {
        if board.clear_cell(r, col) {
            cleared += 1;
        }
    }
    cleared
}

/// Clears every filled cell sharing the exact color stored at `(row, col)`.
///
/// The match is on the stored color identifier, including the power
/// gradient: a rainbow cell of a power piece matches only other
/// gradient-colored cells, usually just its own placement. If an earlier
/// effect in the same placement already emptied the trigger cell, nothing is
/// cleared.
fn apply_rainbow(board: &mut Board, row: usize, col: usize) -> usize {
    let Some(target) = board.cell(row, col).color() else {
        return 0;
    };
    let mut cleared = 0;
    for r in 0..BOARD_SIZE {
        for c in 0..BOARD_SIZE {
            if board.cell(r, c).color() == Some(target) && board.clear_cell(r, c) {
                cleared += 1;
            }
        }
    }
    cleared
}
