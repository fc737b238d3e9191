use criterion::{criterion_group, criterion_main, Criterion};
use mc_2048::board::{Board, Move};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(7777);
    let mut board = Board::new(4, 4, 2048).unwrap();
    board.spawn(&mut rng);
    board.spawn(&mut rng);
    let mut boards = vec![board.clone()];
    let seq = [Move::Left, Move::Up, Move::Right, Move::Down];
    for i in 0..64 {
        let dir = seq[i % seq.len()];
        board.make_move(dir, &mut rng);
        boards.push(board.clone());
    }
    boards
}

fn bench_shift(c: &mut Criterion) {
    let boards = corpus();
    c.bench_function("board/shift_all_dirs", |bch| {
        bch.iter(|| {
            let mut changed = 0u32;
            for board in &boards {
                for dir in Move::ALL {
                    let mut b = board.clone();
                    if b.shift(dir) {
                        changed += 1;
                    }
                }
            }
            black_box(changed)
        })
    });
}

fn bench_can_move(c: &mut Criterion) {
    let boards = corpus();
    c.bench_function("board/can_move_all_dirs", |bch| {
        bch.iter(|| {
            let mut legal = 0u32;
            for board in &boards {
                for dir in Move::ALL {
                    if board.can_move(dir) {
                        legal += 1;
                    }
                }
            }
            black_box(legal)
        })
    });
}

fn bench_spawn(c: &mut Criterion) {
    let boards = corpus();
    c.bench_function("board/spawn", |bch| {
        bch.iter(|| {
            let mut rng = StdRng::seed_from_u64(13);
            let mut acc = 0usize;
            for board in &boards {
                let mut b = board.clone();
                b.spawn(&mut rng);
                acc += b.grid().count_empty();
            }
            black_box(acc)
        })
    });
}

criterion_group!(board_ops, bench_shift, bench_can_move, bench_spawn);
criterion_main!(board_ops);
