use clap::Parser;
use jewels::engine::{Board, Config};
use jewels::simulation::random_seed;
use jewels::strategy::Chooser;
use rand::{rngs::StdRng, SeedableRng};

#[derive(Debug, Parser)]
#[command(name = "jewels", about = "Play one match-3 game with a strategy, printing every board")]
struct Args {
    /// Strategy: random, top:N, bottom:N, highest, last-highest
    #[arg(long, default_value = "top:1")]
    strategy: Chooser,
    /// RNG seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 8)]
    width: usize,
    #[arg(long, default_value_t = 8)]
    height: usize,
    #[arg(long, default_value_t = 7)]
    colours: u32,
    /// Minimum run length that vanishes
    #[arg(long, default_value_t = 3)]
    vanish: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::new(args.width, args.height, args.colours, args.vanish)?;
    let seed = args.seed.unwrap_or_else(random_seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut board = Board::random(config, &mut rng)?;

    let mut chains = 0u64;
    loop {
        let cascade = board.evolve(&mut rng)?;
        chains += cascade.chains() as u64;
        println!("{}", board);
        let moves = board.legal_moves();
        let Some(mv) = args.strategy.choose(&moves, &mut rng) else { break };
        println!("{} moves available, playing {}\n", moves.len(), mv);
        board.apply_move(mv)?;
    }
    println!(
        "Seed: {}, Strategy: {}, Turns: {}, Score: {}, Chain reactions: {}",
        seed,
        args.strategy,
        board.turn_count(),
        board.score(),
        chains
    );
    Ok(())
}
