//! mc-2048: a grid-merging puzzle engine + Monte Carlo move advisor
//!
//! This crate provides:
//! - A [`board::Board`] over an arbitrary `height x width` grid with
//!   directional slide-and-merge moves, random tile spawns, win/game-over
//!   detection, and an undo history (`board` module)
//! - A flat Monte Carlo advisor (`advisor` module) with single-threaded and
//!   parallel variants that scores each legal direction by playing
//!   randomized games to completion
//! - A binary trace format for recorded games (`trace` module)
//!
//! Quick start:
//! ```
//! use mc_2048::board::{Board, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic game setup with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut board = Board::new(4, 4, 2048).unwrap();
//! board.spawn(&mut rng);
//! board.spawn(&mut rng);
//!
//! if board.can_move(Move::Left) {
//!     board.shift(Move::Left);
//!     board.spawn(&mut rng);
//! }
//! assert!(board.undo() || board.history_len() == 0);
//! ```
//!
//! Full loop with the advisor (simplest possible)
//! ```
//! use mc_2048::advisor::{AdvisorConfig, MonteCarlo};
//! use mc_2048::board::Board;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(123);
//! let mut board = Board::new(4, 4, 64).unwrap();
//! board.spawn(&mut rng);
//! board.spawn(&mut rng);
//!
//! // Keep the doctest fast with a small simulation count
//! let cfg = AdvisorConfig { simulations: 3 };
//! let mut moves = 0u32;
//! while !board.is_win() && !board.is_game_over() && moves < 4 {
//!     let dir = MonteCarlo::with_config(&board, cfg.clone()).best_move(&mut rng);
//!     match dir {
//!         Some(dir) => {
//!             board.make_move(dir, &mut rng);
//!             moves += 1;
//!         }
//!         None => break,
//!     }
//! }
//! assert!(moves > 0);
//! ```

pub mod advisor;
pub mod board;
pub mod trace;
