use criterion::{criterion_group, criterion_main, Criterion};
use mc_2048::advisor::{AdvisorConfig, MonteCarlo, MonteCarloParallel};
use mc_2048::board::Board;
use rand::{rngs::StdRng, SeedableRng};
use rayon::ThreadPoolBuilder;
use std::hint::black_box;

fn mid_game_board() -> Board {
    let mut rng = StdRng::seed_from_u64(7777);
    let mut board = Board::new(4, 4, 2048).unwrap();
    board.spawn(&mut rng);
    board.spawn(&mut rng);
    for _ in 0..24 {
        let legal = board.legal_moves();
        if legal.is_empty() {
            break;
        }
        board.make_move(legal[0], &mut rng);
    }
    board
}

fn bench_best_move_seq(c: &mut Criterion) {
    let board = mid_game_board();
    let cfg = AdvisorConfig { simulations: 16 };
    c.bench_function("advisor_seq/best_move_16", |bch| {
        bch.iter(|| {
            let mut rng = StdRng::seed_from_u64(13);
            let mut ai = MonteCarlo::with_config(&board, cfg.clone());
            black_box(ai.best_move(&mut rng))
        })
    });
}

fn bench_best_move_par(c: &mut Criterion) {
    // Pin a small pool for stability
    let pool = ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    let board = mid_game_board();
    let cfg = AdvisorConfig { simulations: 16 };
    c.bench_function("advisor_par/best_move_16", |bch| {
        bch.iter(|| {
            pool.install(|| {
                let mut rng = StdRng::seed_from_u64(13);
                let mut ai = MonteCarloParallel::with_config(&board, cfg.clone());
                black_box(ai.best_move(&mut rng))
            })
        })
    });
}

criterion_group!(rollouts, bench_best_move_seq, bench_best_move_par);
criterion_main!(rollouts);
