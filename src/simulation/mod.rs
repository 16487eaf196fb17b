//! Strategy playouts.
//!
//! - [`play_game`]: one game from a seed to the no-moves terminal state
//! - [`simulate_batch`]: many games in parallel with per-game seeds
//! - [`replay_game`]: re-run a recorded game and check it reproduces
//! - [`stats`]: aggregate statistics over recorded games
//!
//! Each game owns two RNG streams derived from its seed: one for board fills
//! and one for the strategy. A recorded game can therefore be replayed from
//! its seed and chosen moves alone, whatever strategy produced it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::{Board, Config, EngineError, Move};
use crate::strategy::Chooser;

pub mod stats;

pub use stats::{Describe, Histogram, PositionDeltas, Statistics};

/// Mixed into a game seed to derive the strategy's RNG stream.
const CHOOSER_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Optional caps for a single game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayLimits {
    /// Stop once this many moves have been applied.
    pub max_turns: Option<u32>,
}

/// Everything recorded about one game.
///
/// `moves_available[t]` and `chains[t]` describe the board after the cascade
/// that preceded turn `t`; both have one more entry than `chosen` unless the
/// game was truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub seed: u64,
    pub score: u64,
    pub turns: u32,
    pub moves_available: Vec<u32>,
    pub chains: Vec<u32>,
    pub chosen: Vec<Move>,
    pub truncated: bool,
}

impl GameRecord {
    fn new(seed: u64) -> Self {
        GameRecord {
            seed,
            score: 0,
            turns: 0,
            moves_available: Vec::new(),
            chains: Vec::new(),
            chosen: Vec::new(),
            truncated: false,
        }
    }

    /// Change in available moves from each turn to the next.
    pub fn move_deltas(&self) -> Vec<i64> {
        self.moves_available.windows(2).map(|w| w[1] as i64 - w[0] as i64).collect()
    }

    pub fn initial_moves(&self) -> u32 { self.moves_available.first().copied().unwrap_or(0) }

    pub fn max_moves(&self) -> u32 { self.moves_available.iter().copied().max().unwrap_or(0) }
}

/// Play one game with `chooser` until no legal move remains.
///
/// ```
/// use jewels::engine::Config;
/// use jewels::simulation::{play_game, PlayLimits};
/// use jewels::strategy::Chooser;
///
/// let rec = play_game(&Config::default(), Chooser::FromTop(1), 42, PlayLimits::default()).unwrap();
/// assert_eq!(rec.turns as usize, rec.chosen.len());
/// assert_eq!(rec.moves_available.last(), Some(&0));
/// ```
pub fn play_game(config: &Config, chooser: Chooser, seed: u64, limits: PlayLimits) -> Result<GameRecord, EngineError> {
    let mut choice_rng = StdRng::seed_from_u64(seed ^ CHOOSER_STREAM);
    play(config, seed, limits, |_, moves| chooser.choose(moves, &mut choice_rng))
}

/// Play `games` games in parallel, game `i` seeded with `seed + i`.
///
/// `on_game` runs on the worker thread as each game finishes, in no particular
/// order; results are returned in game order.
pub fn simulate_batch<F>(
    config: &Config,
    chooser: Chooser,
    games: usize,
    seed: u64,
    limits: PlayLimits,
    on_game: F,
) -> Result<Vec<GameRecord>, EngineError>
where
    F: Fn(&GameRecord) + Sync,
{
    config.validate()?;
    (0..games)
        .into_par_iter()
        .map(|i| {
            let rec = play_game(config, chooser, seed.wrapping_add(i as u64), limits)?;
            on_game(&rec);
            Ok(rec)
        })
        .collect()
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("turn {turn}: recorded {field} {expected}, replay gave {actual}")]
    Diverged { turn: usize, field: &'static str, expected: u64, actual: u64 },
    #[error("turn {turn}: recorded move {mv} is not legal on the replayed board")]
    IllegalMove { turn: usize, mv: Move },
}

/// Re-run `record` from its seed, applying its chosen moves, and check that
/// every per-turn count, the score and the turn total come out identical.
pub fn replay_game(config: &Config, record: &GameRecord) -> Result<(), ReplayError> {
    let mut illegal: Option<(usize, Move)> = None;
    let limits = PlayLimits { max_turns: record.truncated.then_some(record.turns) };
    let replayed = play(config, record.seed, limits, |turn, moves| {
        let mv = *record.chosen.get(turn)?;
        if !moves.contains(&mv) {
            illegal = Some((turn, mv));
            return None;
        }
        Some(mv)
    })?;
    if let Some((turn, mv)) = illegal {
        return Err(ReplayError::IllegalMove { turn, mv });
    }
    let per_turn = record.moves_available.iter().zip(&replayed.moves_available).map(|(e, a)| ("moves_available", *e, *a));
    let chains = record.chains.iter().zip(&replayed.chains).map(|(e, a)| ("chains", *e, *a));
    for (turn, (field, expected, actual)) in per_turn.enumerate().chain(chains.enumerate()) {
        if expected != actual {
            return Err(ReplayError::Diverged { turn, field, expected: expected as u64, actual: actual as u64 });
        }
    }
    let last = record.moves_available.len();
    if record.moves_available.len() != replayed.moves_available.len() {
        return Err(ReplayError::Diverged {
            turn: last,
            field: "turn records",
            expected: record.moves_available.len() as u64,
            actual: replayed.moves_available.len() as u64,
        });
    }
    if record.score != replayed.score {
        return Err(ReplayError::Diverged { turn: last, field: "score", expected: record.score, actual: replayed.score });
    }
    if record.turns != replayed.turns {
        return Err(ReplayError::Diverged {
            turn: last,
            field: "turns",
            expected: record.turns as u64,
            actual: replayed.turns as u64,
        });
    }
    Ok(())
}

/// Shared game loop: evolve, enumerate, record, pick, apply.
///
/// `pick` gets the turn index and the legal moves; returning `None` ends the
/// game early.
fn play<P>(config: &Config, seed: u64, limits: PlayLimits, mut pick: P) -> Result<GameRecord, EngineError>
where
    P: FnMut(usize, &[Move]) -> Option<Move>,
{
    let mut board_rng = StdRng::seed_from_u64(seed);
    let mut board = Board::random(*config, &mut board_rng)?;
    let mut record = GameRecord::new(seed);
    loop {
        let cascade = board.evolve(&mut board_rng)?;
        let moves = board.legal_moves();
        record.chains.push(cascade.chains());
        record.moves_available.push(moves.len() as u32);
        if moves.is_empty() {
            break;
        }
        if limits.max_turns.is_some_and(|max| board.turn_count() >= max) {
            record.truncated = true;
            break;
        }
        let Some(mv) = pick(record.chosen.len(), &moves) else { break };
        board.apply_move(mv)?;
        record.chosen.push(mv);
    }
    record.score = board.score();
    record.turns = board.turn_count();
    Ok(record)
}

/// Draw a fresh base seed for a batch when the caller did not fix one.
pub fn random_seed() -> u64 { rand::thread_rng().gen() }
