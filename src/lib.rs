//! jewels: a match-3 board engine and strategy simulator
//!
//! This crate provides:
//! - The board rules (`engine` module): monos, gravity, refill, cascades and legal moves
//! - Move-selection strategies (`strategy` module)
//! - Seeded, parallel playouts with replay and aggregate statistics (`simulation` module)
//! - A checksummed binary trace of single games (`trace` module)
//! - Postcard reports and R exports of whole batches (`serialization` module)
//!
//! Quick start:
//! ```
//! use jewels::engine::Config;
//! use jewels::simulation::{simulate_batch, PlayLimits, Statistics};
//! use jewels::strategy::Chooser;
//!
//! let config = Config::new(6, 6, 7, 3).unwrap();
//! let games = simulate_batch(&config, Chooser::Highest, 8, 42, PlayLimits::default(), |_| {}).unwrap();
//! let stats = Statistics::from_records(&games);
//! assert_eq!(stats.games, 8);
//! ```
//!
//! Boards are driven by a caller-supplied RNG, so a seeded `StdRng` makes
//! every evolve, and therefore every game, reproducible.
pub mod engine;
pub mod serialization;
pub mod simulation;
pub mod strategy;
pub mod trace;
