use super::mono::{horizontal_run_through, vertical_run_through};
use super::{Coord, Grid, Move};

/// Enumerate every swap of two adjacent, differently coloured cells that would
/// create a mono through either swapped cell.
///
/// Each cell is paired with its right and lower neighbour. A candidate is
/// swapped in place, checked with four run scans, and swapped back, so the
/// grid is unchanged on return. The exclusive borrow keeps the transient state
/// private. Results are in row-major order of the first cell, right neighbour
/// before lower neighbour.
///
/// Assumes `grid` is stable (mono-free); on an unstable grid the result also
/// lists swaps that merely touch an existing run.
pub fn legal_moves(grid: &mut Grid, vanish_length: usize) -> Vec<Move> {
    let mut out = Vec::new();
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let here = Coord::new(row, col);
            if col + 1 < grid.width() {
                let right = Coord::new(row, col + 1);
                if creates_mono(grid, here, right, vanish_length) {
                    out.push(Move::new(here, right));
                }
            }
            if row + 1 < grid.height() {
                let below = Coord::new(row + 1, col);
                if creates_mono(grid, here, below, vanish_length) {
                    out.push(Move::new(here, below));
                }
            }
        }
    }
    out
}

/// Swap, test both cells in both directions, swap back.
fn creates_mono(grid: &mut Grid, a: Coord, b: Coord, vanish_length: usize) -> bool {
    if grid.at(a.row, a.col) == grid.at(b.row, b.col) {
        return false;
    }
    grid.swap_unchecked(a, b);
    let hit = vertical_run_through(grid, a, vanish_length)
        || vertical_run_through(grid, b, vanish_length)
        || horizontal_run_through(grid, a, vanish_length)
        || horizontal_run_through(grid, b, vanish_length);
    grid.swap_unchecked(a, b);
    hit
}
