use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::mono::find_monos;
use super::moves::legal_moves;
use super::{Colour, Config, Coord, EngineError, Grid, Mono, Move, EMPTY};

/// Outcome of one [`Board::evolve`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cascade {
    /// Resolution steps that found at least one mono.
    pub steps: u32,
    /// Distinct cells cleared over all steps.
    pub cleared: u32,
    /// Score added over all steps.
    pub score_gained: u64,
}

impl Cascade {
    /// Chain reactions beyond the first clear. Zero when nothing was cleared.
    #[inline]
    pub fn chains(&self) -> u32 { self.steps.saturating_sub(1) }
}

/// One game's board: grid, score and turn counter.
///
/// A board is created per game, randomized, then driven by alternating
/// [`Board::evolve`] and [`Board::apply_move`] until [`Board::legal_moves`]
/// comes back empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    config: Config,
    grid: Grid,
    score: u64,
    turn_count: u32,
}

impl Board {
    /// A board with every cell empty. Call [`Board::randomize`] before playing.
    pub fn new(config: Config) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Board { config, grid: Grid::empty(config.width, config.height), score: 0, turn_count: 0 })
    }

    /// A freshly randomized board.
    ///
    /// ```
    /// use jewels::engine::{Board, Config};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let b = Board::random(Config::default(), &mut rng).unwrap();
    /// assert!(b.grid().is_full());
    /// assert_eq!((b.score(), b.turn_count()), (0, 0));
    /// ```
    pub fn random<R: Rng + ?Sized>(config: Config, rng: &mut R) -> Result<Self, EngineError> {
        let mut board = Board::new(config)?;
        board.randomize(rng);
        Ok(board)
    }

    /// Build a board from explicit rows of colours, e.g. for tests and replays.
    pub fn from_rows(config: Config, rows: &[&[Colour]]) -> Result<Self, EngineError> {
        config.validate()?;
        if rows.len() != config.height || rows.iter().any(|r| r.len() != config.width) {
            return Err(EngineError::InvalidConfiguration(format!(
                "rows do not match a {}x{} board",
                config.width, config.height
            )));
        }
        let cells: Vec<Colour> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        if let Some(&colour) = cells.iter().find(|&&c| c == EMPTY || c > config.colours) {
            return Err(EngineError::InvalidColour { colour, colours: config.colours });
        }
        let grid = Grid::from_cells(config.width, config.height, cells)?;
        Ok(Board { config, grid, score: 0, turn_count: 0 })
    }

    /// Overwrite every cell with a uniform random colour, row-major.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.grid = Grid::empty(self.config.width, self.config.height);
        self.grid.fill_empty(self.config.colours, rng);
    }

    /// Empty the grid and zero score and turn count.
    pub fn reset(&mut self) {
        self.grid = Grid::empty(self.config.width, self.config.height);
        self.score = 0;
        self.turn_count = 0;
    }

    #[inline]
    pub fn config(&self) -> &Config { &self.config }

    #[inline]
    pub fn grid(&self) -> &Grid { &self.grid }

    #[inline]
    pub fn score(&self) -> u64 { self.score }

    #[inline]
    pub fn turn_count(&self) -> u32 { self.turn_count }

    #[inline]
    pub fn get(&self, c: Coord) -> Result<Colour, EngineError> { self.grid.get(c) }

    /// Monos currently on the board.
    pub fn monos(&self) -> Vec<Mono> { find_monos(&self.grid, self.config.vanish_length) }

    /// True when the board holds no mono.
    pub fn is_stable(&self) -> bool { self.monos().is_empty() }

    /// Resolve cascades until the board is stable.
    ///
    /// Each step scores every mono found (`len - vanish_length + 1`), clears
    /// their cells once, applies gravity and refills. Detection runs once per
    /// step and feeds both the loop test and the clear. With
    /// `Config::max_cascade_steps` set, a board still unstable after that many
    /// steps yields [`EngineError::CascadeLimitExceeded`]; the board is left
    /// full and scored up to that point.
    ///
    /// ```
    /// use jewels::engine::{Board, Config};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let cfg = Config::new(4, 1, 3, 3).unwrap();
    /// let mut b = Board::from_rows(cfg, &[&[2, 2, 2, 1]]).unwrap();
    /// let cascade = b.evolve(&mut StdRng::seed_from_u64(0)).unwrap();
    /// assert!(cascade.steps >= 1);
    /// assert!(b.score() >= 1);
    /// assert!(b.is_stable());
    /// ```
    pub fn evolve<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Cascade, EngineError> {
        let vanish_length = self.config.vanish_length;
        let mut cascade = Cascade::default();
        loop {
            let monos = find_monos(&self.grid, vanish_length);
            if monos.is_empty() {
                return Ok(cascade);
            }
            if let Some(limit) = self.config.max_cascade_steps {
                if cascade.steps >= limit {
                    return Err(EngineError::CascadeLimitExceeded { limit });
                }
            }
            let gained: u64 = monos.iter().map(|m| m.score(vanish_length)).sum();
            for cell in monos.iter().flat_map(|m| m.cells.iter()) {
                self.grid.clear(*cell);
            }
            cascade.cleared += self.grid.count_empty() as u32;
            cascade.score_gained += gained;
            cascade.steps += 1;
            self.score += gained;
            self.grid.apply_gravity();
            self.grid.fill_empty(self.config.colours, rng);
        }
    }

    /// Legal moves on a stable board, in enumeration order.
    ///
    /// Takes `&mut self` because candidates are tested by swapping in place and
    /// swapping back; the grid is unchanged on return.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        legal_moves(&mut self.grid, self.config.vanish_length)
    }

    #[inline]
    pub fn legal_move_count(&mut self) -> usize { self.legal_moves().len() }

    /// Swap the two cells of `mv` and count a turn.
    ///
    /// Legality is not checked: any in-bounds adjacent pair is swapped. No
    /// cascade is run; call [`Board::evolve`] next.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), EngineError> {
        if !mv.is_adjacent() || !self.grid.contains(mv.a()) || !self.grid.contains(mv.b()) {
            return Err(EngineError::InvalidMove { a: mv.a(), b: mv.b() });
        }
        self.grid.swap_unchecked(mv.a(), mv.b());
        self.turn_count += 1;
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("grid", &self.grid)
            .field("score", &self.score)
            .field("turn_count", &self.turn_count)
            .finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grid)?;
        writeln!(f, "score: {} | turns: {}", self.score, self.turn_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn cfg(width: usize, height: usize, colours: u32) -> Config {
        Config::new(width, height, colours, 3).unwrap()
    }

    #[test]
    fn randomize_fills_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let b = Board::random(cfg(6, 5, 4), &mut rng).unwrap();
        assert!(b.grid().cells().iter().all(|&c| (1..=4).contains(&c)));
    }

    #[test]
    fn from_rows_rejects_bad_input() {
        let c = cfg(2, 2, 3);
        assert!(matches!(
            Board::from_rows(c, &[&[1, 2], &[3, 4]]),
            Err(EngineError::InvalidColour { colour: 4, colours: 3 })
        ));
        assert!(matches!(
            Board::from_rows(c, &[&[1, 0], &[3, 1]]),
            Err(EngineError::InvalidColour { colour: 0, .. })
        ));
        assert!(Board::from_rows(c, &[&[1, 2]]).is_err());
    }

    #[test]
    fn evolve_reaches_fixpoint_and_scores() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let mut b = Board::random(Config::default(), &mut rng).unwrap();
            let cascade = b.evolve(&mut rng).unwrap();
            assert!(b.is_stable());
            assert!(b.grid().is_full());
            assert_eq!(b.score(), cascade.score_gained);
            assert!(cascade.score_gained >= cascade.steps as u64);
        }
    }

    #[test]
    fn evolve_on_stable_board_is_noop() {
        let mut b = Board::from_rows(cfg(3, 3, 3), &[&[1, 2, 3], &[2, 3, 1], &[3, 1, 2]]).unwrap();
        let before = b.clone();
        let cascade = b.evolve(&mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(cascade, Cascade::default());
        assert_eq!(cascade.chains(), 0);
        assert_eq!(b, before);
    }

    #[test]
    fn gravity_triggered_chain_is_counted() {
        // Clearing row 2 drops column 0's 1s onto the 1 below: a second step
        // follows whatever the refill draws.
        let rows: &[&[Colour]] = &[&[1, 2, 1], &[1, 3, 2], &[3, 3, 3], &[1, 2, 1]];
        let mut b = Board::from_rows(cfg(3, 4, 3), rows).unwrap();
        let cascade = b.evolve(&mut StdRng::seed_from_u64(6)).unwrap();
        assert!(cascade.steps >= 2);
        assert_eq!(cascade.chains(), cascade.steps - 1);
        assert!(cascade.score_gained >= 2);
        assert_eq!(b.score(), cascade.score_gained);
        assert!(b.is_stable());
    }

    #[test]
    fn first_step_scores_each_mono() {
        // A cross of 5s: one horizontal run of 4, one vertical run of 3.
        let rows: &[&[Colour]] = &[&[5, 1, 2, 1], &[5, 5, 5, 5], &[5, 3, 4, 3]];
        let c = Config::new(4, 3, 5, 3).unwrap().with_max_cascade_steps(Some(1));
        let mut b = Board::from_rows(c, rows).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        match b.evolve(&mut rng) {
            Ok(cascade) => {
                assert_eq!(cascade.steps, 1);
                assert_eq!(cascade.cleared, 6);
                assert_eq!(cascade.score_gained, 3);
            }
            Err(EngineError::CascadeLimitExceeded { limit }) => assert_eq!(limit, 1),
            Err(e) => panic!("unexpected error {e}"),
        }
        // The first step always contributes 2 (run of 4) + 1 (run of 3).
        assert!(b.score() >= 3);
        assert!(b.grid().is_full());
    }

    #[test]
    fn cascade_limit_surfaces_error() {
        // A single colour refills into monos forever.
        let c = Config::new(3, 3, 1, 3).unwrap().with_max_cascade_steps(Some(4));
        let mut b = Board::random(c, &mut StdRng::seed_from_u64(0)).unwrap();
        let err = b.evolve(&mut StdRng::seed_from_u64(1)).unwrap_err();
        assert_eq!(err, EngineError::CascadeLimitExceeded { limit: 4 });
        assert!(b.grid().is_full());
        // Three rows and three columns scored per step.
        assert_eq!(b.score(), 4 * 6);
    }

    #[test]
    fn apply_move_swaps_and_counts_turns() {
        let mut b = Board::from_rows(cfg(4, 1, 5), &[&[2, 2, 5, 2]]).unwrap();
        let mv = Move::new(Coord::new(0, 2), Coord::new(0, 3));
        assert_eq!(b.legal_moves(), vec![mv]);
        b.apply_move(mv).unwrap();
        assert_eq!(b.grid().cells(), &[2, 2, 2, 5]);
        assert_eq!(b.turn_count(), 1);
        b.apply_move(mv).unwrap();
        assert_eq!(b.grid().cells(), &[2, 2, 5, 2]);
        assert_eq!(b.turn_count(), 2);
    }

    #[test]
    fn apply_move_rejects_non_adjacent_and_out_of_range() {
        let mut b = Board::from_rows(cfg(2, 2, 3), &[&[1, 2], &[2, 1]]).unwrap();
        let diagonal = Move::new(Coord::new(0, 0), Coord::new(1, 1));
        assert_eq!(
            b.apply_move(diagonal),
            Err(EngineError::InvalidMove { a: Coord::new(0, 0), b: Coord::new(1, 1) })
        );
        let outside = Move::new(Coord::new(1, 1), Coord::new(1, 2));
        assert!(matches!(b.apply_move(outside), Err(EngineError::InvalidMove { .. })));
        assert_eq!(b.turn_count(), 0);
    }

    #[test]
    fn reset_clears_progress() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut b = Board::random(Config::default(), &mut rng).unwrap();
        b.evolve(&mut rng).unwrap();
        b.reset();
        assert_eq!((b.score(), b.turn_count()), (0, 0));
        assert_eq!(b.grid().count_empty(), 64);
        b.randomize(&mut rng);
        assert!(b.grid().is_full());
    }
}
