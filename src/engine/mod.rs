//! Board mechanics: grid state, mono detection, gravity, refill, cascades and
//! legal-move enumeration.
//!
//! The grid is indexed `(row, col)` with row 0 at the top. Gravity pulls cells
//! towards the bottom row. Cells hold a colour in `1..=colours`, with
//! [`EMPTY`] used only transiently while a cascade step is being resolved.
//!
//! ```
//! use jewels::engine::{Board, Config};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut board = Board::random(Config::default(), &mut rng).unwrap();
//! let cascade = board.evolve(&mut rng).unwrap();
//! assert!(board.is_stable());
//! assert!(board.score() >= cascade.score_gained);
//! for mv in board.legal_moves() {
//!     assert!(mv.is_adjacent());
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

mod board;
mod error;
mod grid;
mod mono;
mod moves;

pub use board::{Board, Cascade};
pub use error::EngineError;
pub use grid::Grid;
pub use mono::{find_monos, horizontal_mono_containing, vertical_mono_containing, Mono, Orientation};
pub use moves::legal_moves;

/// Cell value. `0` is [`EMPTY`], colours are `1..=Config::colours`.
pub type Colour = u8;

/// Sentinel for a cleared cell awaiting gravity and refill.
pub const EMPTY: Colour = 0;

/// A grid coordinate, row-major with row 0 at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self { Coord { row, col } }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// An unordered pair of cells to swap.
///
/// The pair is stored with `a < b` in row-major order, so `Move::new(x, y)` and
/// `Move::new(y, x)` compare equal. Adjacency is checked when the move is
/// applied, not at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(Coord, Coord)", into = "(Coord, Coord)")]
pub struct Move {
    a: Coord,
    b: Coord,
}

impl From<(Coord, Coord)> for Move {
    fn from((a, b): (Coord, Coord)) -> Self { Move::new(a, b) }
}

impl From<Move> for (Coord, Coord) {
    fn from(mv: Move) -> Self { (mv.a, mv.b) }
}

impl Move {
    #[inline]
    pub fn new(a: Coord, b: Coord) -> Self {
        if a <= b { Move { a, b } } else { Move { a: b, b: a } }
    }

    /// The first cell in row-major order.
    #[inline]
    pub fn a(&self) -> Coord { self.a }

    /// The second cell in row-major order.
    #[inline]
    pub fn b(&self) -> Coord { self.b }

    /// True when the two cells differ by exactly one step along one axis.
    #[inline]
    pub fn is_adjacent(&self) -> bool {
        self.a.row.abs_diff(self.b.row) + self.a.col.abs_diff(self.b.col) == 1
    }

    /// True for a swap within one row.
    #[inline]
    pub fn is_horizontal(&self) -> bool { self.a.row == self.b.row }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.a, self.b)
    }
}

/// Board dimensions and rules shared by every board in a run.
///
/// Defaults match the Rockbox jewels game: 8x8, seven colours, runs of three.
/// `vanish_length <= min(width, height)` is needed for matches to be reachable
/// but is left to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub width: usize,
    pub height: usize,
    pub colours: u8,
    pub vanish_length: usize,
    /// Upper bound on resolution steps per [`Board::evolve`] call.
    pub max_cascade_steps: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self { width: 8, height: 8, colours: 7, vanish_length: 3, max_cascade_steps: None }
    }
}

impl Config {
    /// Build and validate a configuration without a cascade cap.
    pub fn new(width: usize, height: usize, colours: u32, vanish_length: usize) -> Result<Self, EngineError> {
        let colours = u8::try_from(colours).map_err(|_| {
            EngineError::InvalidConfiguration(format!("colours must be at most {}, got {colours}", u8::MAX))
        })?;
        let cfg = Config { width, height, colours, vanish_length, max_cascade_steps: None };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Cap the number of resolution steps a single `evolve` may take.
    pub fn with_max_cascade_steps(mut self, limit: Option<u32>) -> Self {
        self.max_cascade_steps = limit;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |msg: &str| Err(EngineError::InvalidConfiguration(msg.to_string()));
        if self.width == 0 || self.height == 0 {
            return invalid("width and height must be positive");
        }
        if self.colours == 0 {
            return invalid("colours must be positive");
        }
        if self.vanish_length == 0 {
            return invalid("vanish_length must be positive");
        }
        if self.max_cascade_steps == Some(0) {
            return invalid("max_cascade_steps must be positive when set");
        }
        Ok(())
    }

    #[inline]
    pub fn cell_count(&self) -> usize { self.width * self.height }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_is_unordered() {
        let x = Coord::new(2, 3);
        let y = Coord::new(2, 4);
        assert_eq!(Move::new(x, y), Move::new(y, x));
        assert_eq!(Move::new(y, x).a(), x);
        assert_eq!(Move::new(y, x).b(), y);
    }

    #[test]
    fn move_serde_normalizes_order() {
        let x = Coord::new(1, 1);
        let y = Coord::new(0, 1);
        let bytes = postcard::to_allocvec(&(x, y)).unwrap();
        let mv: Move = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(mv, Move::new(y, x));
        assert_eq!(mv.a(), y);
        let back: Move = postcard::from_bytes(&postcard::to_allocvec(&mv).unwrap()).unwrap();
        assert_eq!(back, mv);
    }

    #[test]
    fn move_adjacency() {
        assert!(Move::new(Coord::new(0, 0), Coord::new(0, 1)).is_adjacent());
        assert!(Move::new(Coord::new(3, 2), Coord::new(4, 2)).is_adjacent());
        assert!(!Move::new(Coord::new(0, 0), Coord::new(1, 1)).is_adjacent());
        assert!(!Move::new(Coord::new(0, 0), Coord::new(0, 2)).is_adjacent());
        assert!(!Move::new(Coord::new(1, 1), Coord::new(1, 1)).is_adjacent());
    }

    #[test]
    fn config_validation() {
        assert!(Config::new(8, 8, 7, 3).is_ok());
        assert!(matches!(Config::new(0, 8, 7, 3), Err(EngineError::InvalidConfiguration(_))));
        assert!(matches!(Config::new(8, 8, 0, 3), Err(EngineError::InvalidConfiguration(_))));
        assert!(matches!(Config::new(8, 8, 300, 3), Err(EngineError::InvalidConfiguration(_))));
        assert!(matches!(Config::new(8, 8, 7, 0), Err(EngineError::InvalidConfiguration(_))));
        let capped = Config::default().with_max_cascade_steps(Some(0));
        assert!(capped.validate().is_err());
        // Unreachable matches are allowed.
        assert!(Config::new(2, 2, 3, 5).is_ok());
    }
}
