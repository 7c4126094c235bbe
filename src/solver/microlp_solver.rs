// microlp adapter: pure Rust branch-and-bound reached through good_lp

use super::good_lp_model::solve_with_good_lp;
use crate::domain::{
    models::{OptimizationProblem, Solution},
    solver_service::{Result, SolverService},
};
use good_lp::solvers::microlp::microlp;

pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MicroLpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for MicroLpSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution> {
        // Validate first
        self.validate(problem)?;

        if let Some(limit) = problem.solver_config.time_limit {
            tracing::warn!(
                time_limit_secs = limit,
                "microlp does not support time limits, solving to completion"
            );
        }

        solve_with_good_lp(problem, microlp, None, |model| model)
    }

    fn name(&self) -> &str {
        "microlp"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Constraint, ConstraintType, ObjectiveFunction, OptimizationType, SolutionStatus,
        SolverConfig, Variable,
    };

    #[test]
    fn test_solver_name() {
        assert_eq!(MicroLpSolver::new().name(), "microlp");
    }

    #[test]
    fn test_binary_knapsack() {
        // Maximize 150a + 90b + 120c  s.t. 7a + 3b + 4c <= 10
        let problem = OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Maximize,
            vec![150.0, 90.0, 120.0],
        ))
        .with_variables(vec![
            Variable::binary("a"),
            Variable::binary("b"),
            Variable::binary("c"),
        ])
        .add_constraint(Constraint::new(
            ConstraintType::LessThanOrEqual,
            vec![7.0, 3.0, 4.0],
            10.0,
        ));

        let solution = MicroLpSolver::new().solve(&problem).unwrap();
        assert!(solution.is_optimal());
        // a + b = 240, b + c = 210, a alone = 150
        assert!((solution.optimal_value.unwrap() - 240.0).abs() < 1e-6);
        assert!((solution.variable_values[0] - 1.0).abs() < 1e-6);
        assert!((solution.variable_values[1] - 1.0).abs() < 1e-6);
        assert!(solution.quality.is_feasible());
    }

    #[test]
    fn test_infeasible() {
        let problem = OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Maximize,
            vec![1.0, 1.0],
        ))
        .with_variables(vec![Variable::binary("a"), Variable::binary("b")])
        .add_constraint(Constraint::new(
            ConstraintType::GreaterThanOrEqual,
            vec![1.0, 1.0],
            3.0,
        ));

        let solution = MicroLpSolver::new().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Infeasible);
    }

    #[test]
    fn test_false_constant_row_is_infeasible_without_solving() {
        let problem = OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Maximize,
            vec![1.0],
        ))
        .with_variables(vec![Variable::binary("a")])
        .add_constraint(Constraint::new(ConstraintType::Equal, vec![0.0], 1.0));

        let solution = MicroLpSolver::new().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Infeasible);
    }

    #[test]
    fn test_ignored_time_limit_keeps_optimal_status() {
        let problem = OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Maximize,
            vec![3.0, 2.0],
        ))
        .with_variables(vec![Variable::binary("a"), Variable::binary("b")])
        .add_constraint(Constraint::new(ConstraintType::Equal, vec![1.0, 1.0], 1.0))
        .with_config(SolverConfig {
            time_limit: Some(1e-12),
            ..SolverConfig::default()
        });

        let solution = MicroLpSolver::new().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.optimal_value.unwrap() - 3.0).abs() < 1e-6);
    }
}
