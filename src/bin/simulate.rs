use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use jewels::engine::Config;
use jewels::serialization::{self, ReportMeta, SimulationReport};
use jewels::simulation::{random_seed, replay_game, simulate_batch, Describe, GameRecord, PlayLimits, Statistics};
use jewels::strategy::Chooser;
use jewels::trace::{self, GameTrace, Meta};

#[derive(Debug, Parser)]
#[command(name = "simulate", about = "Batch match-3 strategy playouts")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Args)]
struct BoardArgs {
    #[arg(long, default_value_t = 8)]
    width: usize,
    #[arg(long, default_value_t = 8)]
    height: usize,
    #[arg(long, default_value_t = 7)]
    colours: u32,
    /// Minimum run length that vanishes
    #[arg(long, default_value_t = 3)]
    vanish: usize,
    /// Fail a game whose cascade takes more than this many steps
    #[arg(long)]
    max_cascade: Option<u32>,
}

impl BoardArgs {
    fn config(&self) -> anyhow::Result<Config> {
        let config = Config::new(self.width, self.height, self.colours, self.vanish)?
            .with_max_cascade_steps(self.max_cascade);
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// Number of games per strategy
    #[arg(long, short = 'n', default_value_t = 1000)]
    games: usize,
    /// Base seed; game i uses seed + i (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Stop each game after this many moves
    #[arg(long)]
    max_turns: Option<u32>,
    /// Suppress progress bars
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Play a batch of games with one strategy and summarize them
    Run {
        #[command(flatten)]
        board: BoardArgs,
        #[command(flatten)]
        batch: BatchArgs,
        /// Strategy: random, top:N, bottom:N, highest, last-highest
        #[arg(long, default_value = "random")]
        strategy: Chooser,
        /// Write a postcard report of every game and the statistics
        #[arg(long)]
        report: Option<PathBuf>,
        /// Write one binary trace per game into this directory
        #[arg(long)]
        trace_dir: Option<PathBuf>,
        /// Append scores and lengths as R vectors to this file
        #[arg(long)]
        scores_r: Option<PathBuf>,
        /// Write the pooled delta counts of available moves
        #[arg(long)]
        delta_counts: Option<PathBuf>,
    },
    /// Play the same seeds with several strategies and compare them
    Compare {
        #[command(flatten)]
        board: BoardArgs,
        #[command(flatten)]
        batch: BatchArgs,
        /// Strategies to compare (all built-ins if omitted)
        #[arg(long, value_delimiter = ',')]
        strategies: Vec<Chooser>,
    },
    /// Verify every trace under a directory replays identically
    Replay {
        dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Run { board, batch, strategy, report, trace_dir, scores_r, delta_counts } => {
            let config = board.config()?;
            let seed = batch.seed.unwrap_or_else(random_seed);
            let start = Instant::now();
            let start_wall = trace::now_unix_seconds();
            let records = run_batch(&config, strategy, &batch, seed)?;
            let elapsed = start.elapsed().as_secs_f64();
            let stats = Statistics::from_records(&records);
            print_summary(strategy, seed, elapsed, &stats);

            if let Some(dir) = trace_dir {
                let per_game = (elapsed / records.len().max(1) as f64) as f32;
                write_traces(&dir, &config, strategy, start_wall, per_game, &records)?;
                eprintln!("Wrote {} traces to {}", records.len(), dir.display());
            }
            if let Some(path) = scores_r {
                let scores: Vec<u64> = records.iter().map(|r| r.score).collect();
                let lengths: Vec<u32> = records.iter().map(|r| r.turns).collect();
                serialization::append_r_vector(&path, "scores", &scores)?;
                serialization::append_r_vector(&path, "lengths", &lengths)?;
            }
            if let Some(path) = delta_counts {
                serialization::write_delta_counts(&path, &stats.delta_counts)?;
            }
            if let Some(path) = report {
                let meta = ReportMeta {
                    strategy: strategy.to_string(),
                    games: records.len() as u64,
                    seed,
                    start_unix_s: start_wall,
                    elapsed_s: elapsed as f32,
                };
                let report = SimulationReport { meta, config, records, stats };
                serialization::write_report_to_path(&path, &report)?;
                eprintln!("Wrote report to {}", path.display());
            }
        }
        Cmd::Compare { board, batch, strategies } => {
            let config = board.config()?;
            let seed = batch.seed.unwrap_or_else(random_seed);
            let strategies = if strategies.is_empty() { Chooser::ALL.to_vec() } else { strategies };
            println!(
                "{:<14} {:>10} {:>10} {:>10} {:>10} {:>8} {:>8}",
                "strategy", "score", "score sd", "length", "length sd", "chains", "r"
            );
            for strategy in strategies {
                let records = run_batch(&config, strategy, &batch, seed)?;
                let stats = Statistics::from_records(&records);
                let (score, score_sd) = mean_sd(stats.scores.as_ref());
                let (length, length_sd) = mean_sd(stats.lengths.as_ref());
                println!(
                    "{:<14} {:>10.1} {:>10.1} {:>10.1} {:>10.1} {:>8.3} {:>8.3}",
                    strategy.to_string(),
                    score,
                    score_sd,
                    length,
                    length_sd,
                    stats.mean_chains(),
                    stats.length_score_correlation.unwrap_or(0.0)
                );
            }
        }
        Cmd::Replay { dir } => replay_dir(&dir)?,
    }
    Ok(())
}

fn run_batch(config: &Config, strategy: Chooser, batch: &BatchArgs, seed: u64) -> anyhow::Result<Vec<GameRecord>> {
    let pb = if batch.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(batch.games as u64);
        pb.set_style(ProgressStyle::with_template("{prefix:>14} [{bar:40}] {pos}/{len} {per_sec} eta {eta}")?);
        pb.set_prefix(strategy.to_string());
        pb
    };
    let limits = PlayLimits { max_turns: batch.max_turns };
    let records = simulate_batch(config, strategy, batch.games, seed, limits, |_| pb.inc(1));
    pb.finish_and_clear();
    Ok(records?)
}

fn mean_sd(d: Option<&Describe>) -> (f64, f64) {
    d.map_or((0.0, 0.0), |d| (d.mean, d.std_dev()))
}

fn print_summary(strategy: Chooser, seed: u64, elapsed: f64, stats: &Statistics) {
    println!("Strategy: {} | games: {} | base seed: {} | {:.2}s", strategy, stats.games, seed, elapsed);
    if stats.truncated > 0 {
        println!("Truncated games: {}", stats.truncated);
    }
    print_describe("score", stats.scores.as_ref());
    print_describe("length", stats.lengths.as_ref());
    print_describe("initial moves", stats.initial_moves.as_ref());
    print_describe("max moves", stats.max_moves.as_ref());
    print_describe("move delta", stats.deltas.as_ref());
    if let Some(r) = stats.length_score_correlation {
        println!("Length/score correlation: {:.4}", r);
    }
    println!("Mean chain reactions per turn: {:.4}", stats.mean_chains());
    for pos in &stats.deltas_by_position {
        println!("  {:>3} moves available: n = {:>7}, mean jump {:+.3}", pos.available, pos.describe.nobs, pos.mean_jump());
    }
}

fn print_describe(label: &str, d: Option<&Describe>) {
    if let Some(d) = d {
        println!(
            "{:<14} n = {}, min = {}, max = {}, mean = {:.3}, sd = {:.3}, skew = {:.3}, kurt = {:.3}",
            label,
            d.nobs,
            d.min,
            d.max,
            d.mean,
            d.std_dev(),
            d.skewness,
            d.kurtosis
        );
    }
}

fn write_traces(
    dir: &Path,
    config: &Config,
    strategy: Chooser,
    start_unix_s: u64,
    elapsed_s: f32,
    records: &[GameRecord],
) -> anyhow::Result<()> {
    fs::create_dir_all(dir)?;
    for record in records {
        let trace = GameTrace {
            meta: Meta { start_unix_s, elapsed_s, strategy: Some(strategy.to_string()) },
            config: *config,
            record: record.clone(),
        };
        trace::write_game_to_path(dir.join(format!("game-{}.j3t", record.seed)), &trace)?;
    }
    Ok(())
}

fn replay_dir(dir: &Path) -> anyhow::Result<()> {
    let mut ok = 0u64;
    let mut failed = 0u64;
    for entry in walkdir::WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "j3t") {
            continue;
        }
        let result = trace::parse_game_file(path)
            .map_err(anyhow::Error::from)
            .and_then(|t| replay_game(&t.config, &t.record).map_err(anyhow::Error::from));
        match result {
            Ok(()) => ok += 1,
            Err(e) => {
                failed += 1;
                eprintln!("{}: {e}", path.display());
            }
        }
    }
    println!("Replayed {} traces: {} ok, {} failed", ok + failed, ok, failed);
    if failed > 0 {
        anyhow::bail!("{failed} traces did not replay");
    }
    Ok(())
}
