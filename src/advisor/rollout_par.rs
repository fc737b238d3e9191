use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::board::{Board, Move};

use super::{pick_best, run_trial, AdvisorConfig, BranchEval, RolloutStats};

/// Monte Carlo advisor with rayon-parallel rollouts.
///
/// Trials are fully independent, so each runs on its own board clone with
/// its own `SmallRng`. Trial seeds are drawn from the caller's RNG before
/// fanning out and per-trial results are collected and summed afterwards,
/// so a seeded evaluation is reproducible regardless of thread scheduling.
pub struct MonteCarloParallel<'a> {
    board: &'a Board,
    cfg: AdvisorConfig,
    stats: RolloutStats,
}

impl<'a> MonteCarloParallel<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self::with_config(board, AdvisorConfig::default())
    }

    pub fn with_config(board: &'a Board, cfg: AdvisorConfig) -> Self {
        Self {
            board,
            cfg,
            stats: RolloutStats::default(),
        }
    }

    /// Best direction by total rollout score, or `None` when no move is legal.
    pub fn best_move<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Move> {
        let branches = self.branch_evals(rng);
        pick_best(&branches, rng)
    }

    /// Total rollout score for each direction (no normalization).
    ///
    /// Returns a fixed array in order `[Up, Down, Left, Right]`; illegal
    /// directions carry `legal = false` and a zero score.
    pub fn branch_evals<R: Rng + ?Sized>(&mut self, rng: &mut R) -> [BranchEval; 4] {
        let board = self.board;
        let mut out = [
            BranchEval { dir: Move::Up, score: 0.0, legal: false },
            BranchEval { dir: Move::Down, score: 0.0, legal: false },
            BranchEval { dir: Move::Left, score: 0.0, legal: false },
            BranchEval { dir: Move::Right, score: 0.0, legal: false },
        ];
        for (i, &dir) in Move::ALL.iter().enumerate() {
            if !board.can_move(dir) {
                continue;
            }
            let seeds: Vec<u64> = (0..self.cfg.simulations).map(|_| rng.gen()).collect();
            let trials: Vec<(f64, u64)> = seeds
                .par_iter()
                .map(|&seed| {
                    let mut trial_rng = SmallRng::seed_from_u64(seed);
                    run_trial(board, dir, &mut trial_rng)
                })
                .collect();
            let score: f64 = trials.iter().map(|&(s, _)| s).sum();
            self.stats.rollouts += trials.len() as u64;
            self.stats.sim_moves += trials.iter().map(|&(_, m)| m).sum::<u64>();
            out[i] = BranchEval { dir, score, legal: true };
        }
        out
    }

    /// Statistics accumulated since construction or the last reset.
    #[inline]
    pub fn last_stats(&self) -> RolloutStats {
        self.stats
    }

    /// Reset accumulated stats to zero.
    #[inline]
    pub fn reset_stats(&mut self) {
        self.stats = RolloutStats::default();
    }
}
