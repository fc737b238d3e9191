use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use mc_2048::advisor::{AdvisorConfig, MonteCarlo, MonteCarloParallel, RolloutStats};
use mc_2048::board::{Board, Move};
use mc_2048::trace::{self, Meta};

#[derive(Debug, Parser)]
#[command(name = "mc-2048", about = "Monte Carlo 2048 runner")]
struct Args {
    /// Board height
    #[arg(long, default_value_t = 4)]
    height: usize,

    /// Board width
    #[arg(long, default_value_t = 4)]
    width: usize,

    /// Win tile value
    #[arg(long, default_value_t = 2048)]
    win: u32,

    /// Rollouts per legal direction
    #[arg(long, default_value_t = 50)]
    sims: u32,

    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: u32,

    /// RNG seed (drawn from entropy when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Use the rayon-parallel advisor
    #[arg(long)]
    parallel: bool,

    /// Suppress per-move board output, show a status line instead
    #[arg(long)]
    quiet: bool,

    /// Write a binary trace of the first game to this path
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write a JSON summary of the session to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Debug, serde::Serialize)]
struct Summary {
    games: u32,
    wins: u32,
    total_moves: u64,
    rollouts: u64,
    best_tile: u32,
    elapsed_s: f32,
}

struct GameRecord {
    states: Vec<Vec<u32>>,
    moves: Vec<u8>,
    won: bool,
    move_count: u64,
    stats: RolloutStats,
}

fn pick_move(
    board: &Board,
    cfg: &AdvisorConfig,
    parallel: bool,
    rng: &mut SmallRng,
) -> (Option<Move>, RolloutStats) {
    if parallel {
        let mut ai = MonteCarloParallel::with_config(board, cfg.clone());
        let dir = ai.best_move(rng);
        (dir, ai.last_stats())
    } else {
        let mut ai = MonteCarlo::with_config(board, cfg.clone());
        let dir = ai.best_move(rng);
        (dir, ai.last_stats())
    }
}

fn play_game(
    args: &Args,
    rng: &mut SmallRng,
    pb: Option<&ProgressBar>,
    game_idx: u32,
) -> Result<GameRecord> {
    let cfg = AdvisorConfig { simulations: args.sims };
    let mut board =
        Board::new(args.height, args.width, args.win).context("invalid board settings")?;
    board.spawn(rng);
    board.spawn(rng);

    let mut states: Vec<Vec<u32>> = Vec::with_capacity(1024);
    let mut moves: Vec<u8> = Vec::with_capacity(1024);
    states.push(board.grid().cells().to_vec());

    let mut stats = RolloutStats::default();
    let mut move_count: u64 = 0;
    if !args.quiet {
        println!("{}", board);
    }

    while !board.is_win() && !board.is_game_over() {
        let (dir, move_stats) = pick_move(&board, &cfg, args.parallel, rng);
        stats.rollouts += move_stats.rollouts;
        stats.sim_moves += move_stats.sim_moves;
        let dir = match dir {
            Some(dir) => dir,
            None => break,
        };
        board.make_move(dir, rng);
        move_count += 1;
        moves.push(dir.to_u8());
        states.push(board.grid().cells().to_vec());
        if let Some(pb) = pb {
            pb.set_message(format!(
                "game {}/{} | moves: {} | rollouts: {}",
                game_idx + 1,
                args.games,
                move_count,
                stats.rollouts
            ));
        } else if !args.quiet {
            println!("Move {}: {:?}", move_count, dir);
            println!("{}", board);
        }
    }

    let won = board.is_win();
    if !args.quiet {
        let outcome = if won { "reached the win tile" } else { "no moves left" };
        println!(
            "Game {}: {} after {} moves, highest tile {}",
            game_idx + 1,
            outcome,
            move_count,
            board.grid().max_tile()
        );
    }

    Ok(GameRecord { states, moves, won, move_count, stats })
}

fn main() -> Result<()> {
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = SmallRng::seed_from_u64(seed);

    let start = Instant::now();
    let start_wall = trace::now_unix_seconds();

    let pb = if args.quiet {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} | {msg}")?
                .tick_chars("⠁⠃⠇⠧⠷⠿⠻⠟⠯⠷⠧⠇⠃"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let mut wins = 0u32;
    let mut total_moves = 0u64;
    let mut rollouts = 0u64;
    let mut best_tile = 0u32;
    let mut first_game: Option<GameRecord> = None;

    for game_idx in 0..args.games {
        let record = play_game(&args, &mut rng, pb.as_ref(), game_idx)?;
        if record.won {
            wins += 1;
        }
        total_moves += record.move_count;
        rollouts += record.stats.rollouts;
        best_tile = best_tile.max(
            record
                .states
                .last()
                .and_then(|cells| cells.iter().copied().max())
                .unwrap_or(0),
        );
        if first_game.is_none() {
            first_game = Some(record);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let elapsed = start.elapsed().as_secs_f64();
    println!(
        "Games: {} | wins: {} | moves: {} | rollouts: {} | seed: {} | {:.1}s",
        args.games, wins, total_moves, rollouts, seed, elapsed
    );

    if let Some(out_path) = &args.out {
        let record = first_game.as_ref().context("no game was played")?;
        let meta = Meta {
            height: args.height as u16,
            width: args.width as u16,
            win: args.win,
            steps: record.moves.len() as u32,
            start_unix_s: start_wall,
            elapsed_s: elapsed as f32,
            highest_tile: record
                .states
                .iter()
                .flat_map(|cells| cells.iter().copied())
                .max()
                .unwrap_or(0),
            engine_str: Some(engine_str(&args)),
        };
        trace::write_run_to_path(out_path, &meta, &record.states, &record.moves)
            .with_context(|| format!("failed to write trace to {}", out_path.display()))?;
    }

    if let Some(summary_path) = &args.summary {
        let summary = Summary {
            games: args.games,
            wins,
            total_moves,
            rollouts,
            best_tile,
            elapsed_s: elapsed as f32,
        };
        let file = fs::File::create(summary_path)
            .with_context(|| format!("failed to create {}", summary_path.display()))?;
        serde_json::to_writer_pretty(file, &summary)?;
    }

    Ok(())
}

fn engine_str(args: &Args) -> String {
    if args.parallel {
        format!("monte-carlo/{}/par", args.sims)
    } else {
        format!("monte-carlo/{}", args.sims)
    }
}
