// COIN-OR CBC adapter: branch-and-cut reached through good_lp

use super::good_lp_model::solve_with_good_lp;
use crate::domain::{
    models::{OptimizationProblem, Solution},
    solver_service::{Result, SolverService},
};
use good_lp::solvers::coin_cbc::coin_cbc;

pub struct CoinCbcSolver;

impl CoinCbcSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinCbcSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for CoinCbcSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution> {
        // Validate first
        self.validate(problem)?;

        let config = &problem.solver_config;
        solve_with_good_lp(problem, coin_cbc, config.time_limit, |mut model| {
            model.set_parameter("log", if config.verbose { "1" } else { "0" });
            if let Some(limit) = config.time_limit {
                model.set_parameter("seconds", &limit.to_string());
            }
            if let Some(gap) = config.gap_tolerance {
                model.set_parameter("ratioGap", &gap.to_string());
            }
            model
        })
    }

    fn name(&self) -> &str {
        "COIN-OR CBC"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}
