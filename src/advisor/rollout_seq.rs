use rand::Rng;

use crate::board::{Board, Move};

use super::{pick_best, run_trial, AdvisorConfig, BranchEval, RolloutStats};

/// Single-threaded Monte Carlo advisor.
///
/// Holds a read-only reference to the board it advises on; every rollout
/// runs on a private clone.
pub struct MonteCarlo<'a> {
    board: &'a Board,
    cfg: AdvisorConfig,
    stats: RolloutStats,
}

impl<'a> MonteCarlo<'a> {
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
    ///
    /// Ties are broken uniformly at random with the caller's RNG.
    pub fn best_move<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Move> {
        let branches = self.branch_evals(rng);
        pick_best(&branches, rng)
    }

    /// Total rollout score for each direction (no normalization).
    ///
    /// Returns a fixed array in order `[Up, Down, Left, Right]`; illegal
    /// directions carry `legal = false` and a zero score.
    pub fn branch_evals<R: Rng + ?Sized>(&mut self, rng: &mut R) -> [BranchEval; 4] {
        let mut out = [
            BranchEval { dir: Move::Up, score: 0.0, legal: false },
            BranchEval { dir: Move::Down, score: 0.0, legal: false },
            BranchEval { dir: Move::Left, score: 0.0, legal: false },
            BranchEval { dir: Move::Right, score: 0.0, legal: false },
        ];
        for (i, &dir) in Move::ALL.iter().enumerate() {
            if !self.board.can_move(dir) {
                continue;
            }
            let mut score = 0.0;
            for _ in 0..self.cfg.simulations {
                let (trial_score, trial_moves) = run_trial(self.board, dir, rng);
                score += trial_score;
                self.stats.rollouts += 1;
                self.stats.sim_moves += trial_moves;
            }
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
