use serde::{Deserialize, Serialize};

use super::{Colour, Coord, EngineError, Grid, EMPTY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A maximal straight run of one colour, at least `vanish_length` long.
///
/// Cells are ordered left to right (horizontal) or top to bottom (vertical).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mono {
    pub orientation: Orientation,
    pub colour: Colour,
    pub cells: Vec<Coord>,
}

impl Mono {
    #[inline]
    pub fn len(&self) -> usize { self.cells.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    /// Score for clearing this run: 1 for a run of exactly `vanish_length`,
    /// plus one per extra cell.
    #[inline]
    pub fn score(&self, vanish_length: usize) -> u64 {
        (self.len() + 1).saturating_sub(vanish_length) as u64
    }
}

/// All maximal monos: every row scanned left to right, then every column top to
/// bottom. Crossing runs are both reported. Runs of [`EMPTY`] are ignored.
pub fn find_monos(grid: &Grid, vanish_length: usize) -> Vec<Mono> {
    let mut out = Vec::new();
    for row in 0..grid.height() {
        scan_line(grid.width(), |i| grid.at(row, i), vanish_length, |colour, start, end| {
            out.push(Mono {
                orientation: Orientation::Horizontal,
                colour,
                cells: (start..end).map(|col| Coord::new(row, col)).collect(),
            });
        });
    }
    for col in 0..grid.width() {
        scan_line(grid.height(), |i| grid.at(i, col), vanish_length, |colour, start, end| {
            out.push(Mono {
                orientation: Orientation::Vertical,
                colour,
                cells: (start..end).map(|row| Coord::new(row, col)).collect(),
            });
        });
    }
    out
}

/// Walk one line tracking the start of the current streak; emit `[start, end)`
/// for each streak of length >= `vanish_length`, including the trailing one.
fn scan_line<F, E>(len: usize, cell: F, vanish_length: usize, mut emit: E)
where
    F: Fn(usize) -> Colour,
    E: FnMut(Colour, usize, usize),
{
    if len == 0 {
        return;
    }
    let mut colour = cell(0);
    let mut start = 0;
    for i in 1..len {
        let c = cell(i);
        if c != colour {
            if colour != EMPTY && i - start >= vanish_length {
                emit(colour, start, i);
            }
            colour = c;
            start = i;
        }
    }
    if colour != EMPTY && len - start >= vanish_length {
        emit(colour, start, len);
    }
}

/// Does a horizontal run of at least `vanish_length` pass through `c`?
///
/// ```
/// use jewels::engine::{horizontal_mono_containing, Coord, Grid};
/// let g = Grid::from_cells(4, 1, vec![5, 2, 2, 2]).unwrap();
/// assert_eq!(horizontal_mono_containing(&g, Coord::new(0, 2), 3), Ok(true));
/// assert_eq!(horizontal_mono_containing(&g, Coord::new(0, 4), 3).is_err(), Ok(true));
/// ```
pub fn horizontal_mono_containing(grid: &Grid, c: Coord, vanish_length: usize) -> Result<bool, EngineError> {
    grid.get(c)?;
    Ok(horizontal_run_through(grid, c, vanish_length))
}

/// Vertical counterpart of [`horizontal_mono_containing`].
pub fn vertical_mono_containing(grid: &Grid, c: Coord, vanish_length: usize) -> Result<bool, EngineError> {
    grid.get(c)?;
    Ok(vertical_run_through(grid, c, vanish_length))
}

/// Walks right and left from `c` while the colour matches; both walks count
/// `c` itself, hence the `- 1`. `c` must be in bounds.
pub(crate) fn horizontal_run_through(grid: &Grid, c: Coord, vanish_length: usize) -> bool {
    let colour = grid.at(c.row, c.col);
    let mut right = 0;
    while c.col + right < grid.width() && grid.at(c.row, c.col + right) == colour {
        right += 1;
    }
    let mut left = 0;
    while left <= c.col && grid.at(c.row, c.col - left) == colour {
        left += 1;
    }
    right + left - 1 >= vanish_length
}

pub(crate) fn vertical_run_through(grid: &Grid, c: Coord, vanish_length: usize) -> bool {
    let colour = grid.at(c.row, c.col);
    let mut down = 0;
    while c.row + down < grid.height() && grid.at(c.row + down, c.col) == colour {
        down += 1;
    }
    let mut up = 0;
    while up <= c.row && grid.at(c.row - up, c.col) == colour {
        up += 1;
    }
    up + down - 1 >= vanish_length
}
