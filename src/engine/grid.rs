use std::fmt;

use rand::Rng;

use super::{Colour, Coord, EngineError, EMPTY};

/// Row-major rectangular array of cells.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Colour>,
}

impl Grid {
    /// A grid with every cell [`EMPTY`]. Both dimensions must be positive.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        check_dims(width, height)?;
        Ok(Grid::empty(width, height))
    }

    /// Caller guarantees positive dimensions.
    pub(crate) fn empty(width: usize, height: usize) -> Self {
        Grid { width, height, cells: vec![EMPTY; width * height] }
    }

    /// Wrap explicit row-major cells. The length must be `width * height`.
    pub fn from_cells(width: usize, height: usize, cells: Vec<Colour>) -> Result<Self, EngineError> {
        check_dims(width, height)?;
        if cells.len() != width * height {
            return Err(EngineError::InvalidConfiguration(format!(
                "expected {} cells for a {width}x{height} grid, got {}",
                width * height,
                cells.len()
            )));
        }
        Ok(Grid { width, height, cells })
    }

    #[inline]
    pub fn width(&self) -> usize { self.width }

    #[inline]
    pub fn height(&self) -> usize { self.height }

    /// Row-major view of all cells.
    #[inline]
    pub fn cells(&self) -> &[Colour] { &self.cells }

    /// One row as a slice.
    pub fn row(&self, row: usize) -> Result<&[Colour], EngineError> {
        if row >= self.height {
            return Err(self.out_of_bounds(Coord::new(row, 0)));
        }
        Ok(&self.cells[row * self.width..(row + 1) * self.width])
    }

    #[inline]
    pub fn contains(&self, c: Coord) -> bool { c.row < self.height && c.col < self.width }

    pub fn get(&self, c: Coord) -> Result<Colour, EngineError> {
        let idx = self.index(c)?;
        Ok(self.cells[idx])
    }

    pub fn set(&mut self, c: Coord, colour: Colour) -> Result<(), EngineError> {
        let idx = self.index(c)?;
        self.cells[idx] = colour;
        Ok(())
    }

    /// Exchange two cells. Only bounds are checked; any two cells may be swapped.
    pub fn swap(&mut self, a: Coord, b: Coord) -> Result<(), EngineError> {
        let ia = self.index(a)?;
        let ib = self.index(b)?;
        self.cells.swap(ia, ib);
        Ok(())
    }

    /// Number of [`EMPTY`] cells.
    pub fn count_empty(&self) -> usize { self.cells.iter().filter(|&&c| c == EMPTY).count() }

    #[inline]
    pub fn is_full(&self) -> bool { !self.cells.contains(&EMPTY) }

    /// Pack each column's non-empty cells against the bottom edge, keeping their
    /// top-to-bottom order, and leave the vacated top cells empty.
    pub fn apply_gravity(&mut self) {
        let mut column: Vec<Colour> = Vec::with_capacity(self.height);
        for col in 0..self.width {
            column.clear();
            column.extend((0..self.height).map(|row| self.at(row, col)).filter(|&c| c != EMPTY));
            let gap = self.height - column.len();
            for row in 0..gap {
                self.cells[row * self.width + col] = EMPTY;
            }
            for (offset, &colour) in column.iter().enumerate() {
                self.cells[(gap + offset) * self.width + col] = colour;
            }
        }
    }

    /// Draw a colour uniformly from `1..=colours` for every empty cell, visiting
    /// cells in row-major order so a seeded RNG reproduces the same board.
    pub fn fill_empty<R: Rng + ?Sized>(&mut self, colours: Colour, rng: &mut R) {
        for cell in self.cells.iter_mut().filter(|c| **c == EMPTY) {
            *cell = rng.gen_range(1..=colours);
        }
    }

    /// Unchecked read for in-crate scans that iterate within bounds.
    #[inline(always)]
    pub(crate) fn at(&self, row: usize, col: usize) -> Colour {
        debug_assert!(row < self.height && col < self.width);
        self.cells[row * self.width + col]
    }

    #[inline(always)]
    pub(crate) fn clear(&mut self, c: Coord) {
        self.cells[c.row * self.width + c.col] = EMPTY;
    }

    #[inline(always)]
    pub(crate) fn swap_unchecked(&mut self, a: Coord, b: Coord) {
        self.cells.swap(a.row * self.width + a.col, b.row * self.width + b.col);
    }

    #[inline]
    fn index(&self, c: Coord) -> Result<usize, EngineError> {
        if self.contains(c) { Ok(c.row * self.width + c.col) } else { Err(self.out_of_bounds(c)) }
    }

    fn out_of_bounds(&self, c: Coord) -> EngineError {
        EngineError::OutOfBounds { row: c.row, col: c.col, width: self.width, height: self.height }
    }
}

fn check_dims(width: usize, height: usize) -> Result<(), EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidConfiguration(format!("grid must be non-empty, got {width}x{height}")));
    }
    Ok(())
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid({}x{}, {:?})", self.width, self.height, self.cells)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            let line: Vec<String> = row
                .iter()
                .map(|&c| if c == EMPTY { ".".to_string() } else { c.to_string() })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
