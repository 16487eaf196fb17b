//! Move-selection strategies.
//!
//! A strategy picks one move from the legal moves of a stable board. All
//! strategies rank moves by the row of their first cell, top of the board
//! first, using a stable sort so enumeration order breaks ties. Randomized
//! strategies draw from the RNG passed in, keeping playouts reproducible.
//!
//! ```
//! use jewels::engine::{Coord, Move};
//! use jewels::strategy::Chooser;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let moves = vec![
//!     Move::new(Coord::new(5, 0), Coord::new(5, 1)),
//!     Move::new(Coord::new(2, 3), Coord::new(3, 3)),
//! ];
//! let top: Chooser = "top1".parse().unwrap();
//! let mut rng = StdRng::seed_from_u64(0);
//! assert_eq!(top.choose(&moves, &mut rng), Some(moves[1]));
//! assert_eq!(Chooser::Random.choose(&[], &mut rng), None);
//! ```

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chooser {
    /// Uniform over all legal moves.
    Random,
    /// Uniform over the `n` topmost moves.
    FromTop(usize),
    /// Uniform over the `n` bottommost moves.
    FromBottom(usize),
    /// Uniform over the moves in the topmost row that has any.
    Highest,
    /// The last move, in enumeration order, of the topmost row that has any.
    LastHighest,
}

impl Chooser {
    /// Every built-in strategy, in the order `compare` reports them.
    pub const ALL: [Chooser; 7] = [
        Chooser::Random,
        Chooser::FromTop(3),
        Chooser::FromTop(2),
        Chooser::FromTop(1),
        Chooser::Highest,
        Chooser::LastHighest,
        Chooser::FromBottom(5),
    ];

    /// Pick a move. Returns `None` only when `moves` is empty; otherwise the
    /// result is always an element of `moves`.
    pub fn choose<R: Rng + ?Sized>(&self, moves: &[Move], rng: &mut R) -> Option<Move> {
        if moves.is_empty() {
            return None;
        }
        let sorted = sorted_by_row(moves);
        match *self {
            Chooser::Random => moves.choose(rng).copied(),
            Chooser::FromTop(n) => sorted[..n.clamp(1, sorted.len())].choose(rng).copied(),
            Chooser::FromBottom(n) => {
                let n = n.clamp(1, sorted.len());
                sorted[sorted.len() - n..].choose(rng).copied()
            }
            Chooser::Highest => highest_row(&sorted).choose(rng).copied(),
            Chooser::LastHighest => highest_row(&sorted).last().copied(),
        }
    }
}

fn sorted_by_row(moves: &[Move]) -> Vec<Move> {
    let mut sorted = moves.to_vec();
    sorted.sort_by_key(|m| m.a().row);
    sorted
}

/// Leading run of `sorted` sharing the first move's row.
fn highest_row(sorted: &[Move]) -> &[Move] {
    let top = sorted[0].a().row;
    let end = sorted.iter().position(|m| m.a().row != top).unwrap_or(sorted.len());
    &sorted[..end]
}

impl fmt::Display for Chooser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chooser::Random => write!(f, "random"),
            Chooser::FromTop(n) => write!(f, "top:{n}"),
            Chooser::FromBottom(n) => write!(f, "bottom:{n}"),
            Chooser::Highest => write!(f, "highest"),
            Chooser::LastHighest => write!(f, "last-highest"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown strategy '{0}' (expected random, top:N, bottom:N, highest, last-highest)")]
pub struct ParseChooserError(pub String);

impl FromStr for Chooser {
    type Err = ParseChooserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseChooserError(s.to_string());
        let name = s.trim().to_ascii_lowercase();
        let count = |digits: &str| match digits.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(err()),
        };
        match name.as_str() {
            "random" => Ok(Chooser::Random),
            "highest" => Ok(Chooser::Highest),
            "last-highest" | "lasthighest" => Ok(Chooser::LastHighest),
            _ => {
                if let Some(rest) = name.strip_prefix("top") {
                    Ok(Chooser::FromTop(count(rest.trim_start_matches(':'))?))
                } else if let Some(rest) = name.strip_prefix("bottom") {
                    Ok(Chooser::FromBottom(count(rest.trim_start_matches(':'))?))
                } else {
                    Err(err())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Coord;
    use rand::{rngs::StdRng, SeedableRng};

    fn mv(row: usize, col: usize, down: bool) -> Move {
        let other = if down { Coord::new(row + 1, col) } else { Coord::new(row, col + 1) };
        Move::new(Coord::new(row, col), other)
    }

    fn sample() -> Vec<Move> {
        vec![mv(4, 0, false), mv(1, 2, false), mv(6, 1, true), mv(1, 5, true), mv(3, 3, false)]
    }

    #[test]
    fn parse_and_display() {
        for c in Chooser::ALL {
            assert_eq!(c.to_string().parse::<Chooser>(), Ok(c));
        }
        assert_eq!("top3".parse(), Ok(Chooser::FromTop(3)));
        assert_eq!("Bottom5".parse(), Ok(Chooser::FromBottom(5)));
        assert_eq!("LastHighest".parse(), Ok(Chooser::LastHighest));
        assert!("top:0".parse::<Chooser>().is_err());
        assert!("sideways".parse::<Chooser>().is_err());
    }

    #[test]
    fn always_returns_member() {
        let moves = sample();
        let mut rng = StdRng::seed_from_u64(17);
        for c in Chooser::ALL {
            for _ in 0..50 {
                let m = c.choose(&moves, &mut rng).unwrap();
                assert!(moves.contains(&m), "{c} returned {m}");
            }
        }
    }

    #[test]
    fn top_one_and_last_highest() {
        let moves = sample();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(Chooser::FromTop(1).choose(&moves, &mut rng), Some(mv(1, 2, false)));
        assert_eq!(Chooser::LastHighest.choose(&moves, &mut rng), Some(mv(1, 5, true)));
    }

    #[test]
    fn highest_stays_in_top_row() {
        let moves = sample();
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..50 {
            assert_eq!(Chooser::Highest.choose(&moves, &mut rng).unwrap().a().row, 1);
        }
    }

    #[test]
    fn bottom_picks_from_lowest_rows() {
        let moves = sample();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let m = Chooser::FromBottom(2).choose(&moves, &mut rng).unwrap();
            assert!(m.a().row >= 4);
        }
    }

    #[test]
    fn window_larger_than_list() {
        let moves = vec![mv(2, 2, false)];
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Chooser::FromTop(3).choose(&moves, &mut rng), Some(moves[0]));
        assert_eq!(Chooser::FromBottom(5).choose(&moves, &mut rng), Some(moves[0]));
    }

    #[test]
    fn empty_list_yields_none() {
        let mut rng = StdRng::seed_from_u64(1);
        for c in Chooser::ALL {
            assert_eq!(c.choose(&[], &mut rng), None);
        }
    }
}
