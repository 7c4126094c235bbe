// Shared translation from the domain model to good_lp
// Used by every adapter whose backend is reached through good_lp

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolutionQuality},
    solver_service::{presolve, Presolved, Result, SolverError},
    value_objects::{
        ConstraintType, OptimizationType, SolutionStatus as DomainSolutionStatus, VariableType,
    },
};
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError,
    Solution as GoodLpSolutionTrait, Solver, SolverModel, Variable as GoodLpVariable,
};
use std::time::Instant;

/// Builds `problem` with good_lp, hands it to `solver` and maps the outcome back
///
/// `configure` receives the backend model before constraints are added, so
/// adapters can set backend-specific parameters. `enforced_time_limit` is the
/// limit the backend itself stops at, if any.
pub(crate) fn solve_with_good_lp<S, F>(
    problem: &OptimizationProblem,
    solver: S,
    enforced_time_limit: Option<f64>,
    configure: F,
) -> Result<DomainSolution>
where
    S: Solver,
    S::Model: SolverModel<Error = ResolutionError>,
    F: FnOnce(S::Model) -> S::Model,
{
    let start_time = Instant::now();

    let constraints = match presolve(problem) {
        Presolved::Reduced(kept) => kept,
        Presolved::Infeasible(reason) => {
            let statistics = problem.statistics(start_time.elapsed().as_secs_f64() * 1000.0);
            return Ok(DomainSolution::new(
                DomainSolutionStatus::Infeasible,
                format!("Problem is infeasible: {}", reason),
            )
            .with_statistics(statistics));
        }
    };

    // Build variables using good_lp
    let mut vars = variables!();
    let mut lp_variables: Vec<GoodLpVariable> = Vec::with_capacity(problem.num_variables());

    for var_def in &problem.variables {
        let lower = var_def.lower_bound;
        let upper = var_def.upper_bound.unwrap_or(f64::INFINITY);

        let var = match var_def.variable_type {
            VariableType::Binary | VariableType::Integer => {
                vars.add(variable().integer().min(lower).max(upper))
            }
            VariableType::Continuous => vars.add(variable().min(lower).max(upper)),
        };
        lp_variables.push(var);
    }

    // If no variables specified, create defaults
    if problem.variables.is_empty() {
        for _ in 0..problem.num_variables() {
            lp_variables.push(vars.add(variable().min(0.0)));
        }
    }

    // Build objective expression
    let mut obj_expr: Expression = 0.into();
    for (&coeff, &var) in problem.objective.coefficients.iter().zip(&lp_variables) {
        if coeff != 0.0 {
            obj_expr += coeff * var;
        }
    }

    let unsolved = match problem.objective.optimization_type {
        OptimizationType::Maximize => vars.maximise(obj_expr),
        OptimizationType::Minimize => vars.minimise(obj_expr),
    };
    let mut lp_model = configure(unsolved.using(solver));

    // Build constraints
    for c in constraints {
        let mut lhs: Expression = 0.into();
        for (&coeff, &var) in c.coefficients.iter().zip(&lp_variables) {
            if coeff != 0.0 {
                lhs += coeff * var;
            }
        }

        let rhs = c.bound;
        lp_model = match c.constraint_type {
            ConstraintType::LessThanOrEqual => lp_model.with(constraint!(lhs <= rhs)),
            ConstraintType::Equal => lp_model.with(constraint!(lhs == rhs)),
            ConstraintType::GreaterThanOrEqual => lp_model.with(constraint!(lhs >= rhs)),
        };
    }

    // Solve the problem
    let solve_started = Instant::now();
    let solution_result = lp_model.solve();
    let hit_time_limit = enforced_time_limit
        .is_some_and(|limit| solve_started.elapsed().as_secs_f64() >= limit);
    let statistics = problem.statistics(start_time.elapsed().as_secs_f64() * 1000.0);

    match solution_result {
        Ok(sol) => {
            let variable_values: Vec<f64> = lp_variables.iter().map(|&v| sol.value(v)).collect();
            let solution = label_incumbent(problem, variable_values, hit_time_limit);
            Ok(solution.with_statistics(statistics))
        }
        Err(ResolutionError::Infeasible) => {
            Ok(DomainSolution::infeasible().with_statistics(statistics))
        }
        Err(ResolutionError::Unbounded) => {
            Ok(DomainSolution::unbounded().with_statistics(statistics))
        }
        Err(e) => Err(SolverError::ExecutionFailed(e.to_string())),
    }
}

/// Status for the values a backend returned
///
/// A search cut short by the time limit cannot claim optimality, and its
/// incumbent is only usable when it passes the feasibility check.
fn label_incumbent(
    problem: &OptimizationProblem,
    variable_values: Vec<f64>,
    hit_time_limit: bool,
) -> DomainSolution {
    let objective_value = problem.objective.evaluate(&variable_values);
    let quality = SolutionQuality::assess(problem, &variable_values);

    let solution = match (hit_time_limit, quality.is_feasible()) {
        (false, _) => {
            let mut s = DomainSolution::optimal(objective_value, variable_values);
            s.message = format!("Optimal solution found for '{}'", problem.name);
            s
        }
        (true, true) => DomainSolution::feasible(objective_value, variable_values),
        (true, false) => DomainSolution::new(
            DomainSolutionStatus::TimeLimit,
            format!(
                "Time limit reached without a feasible incumbent (max violation {:.3e})",
                quality.max_constraint_violation.max(quality.max_integrality_violation)
            ),
        ),
    };
    solution.with_quality(quality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Constraint, ObjectiveFunction, SolverConfig, Variable};

    fn pick_one() -> OptimizationProblem {
        OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Maximize,
            vec![3.0, 2.0],
        ))
        .with_name("pick_one")
        .with_variables(vec![Variable::binary("a"), Variable::binary("b")])
        .add_constraint(Constraint::new(ConstraintType::Equal, vec![1.0, 1.0], 1.0))
        .with_config(SolverConfig {
            time_limit: Some(1.0),
            ..SolverConfig::default()
        })
    }

    #[test]
    fn test_completed_search_is_optimal() {
        let solution = label_incumbent(&pick_one(), vec![1.0, 0.0], false);
        assert_eq!(solution.status, DomainSolutionStatus::Optimal);
        assert_eq!(solution.optimal_value, Some(3.0));
    }

    #[test]
    fn test_time_limit_with_feasible_incumbent() {
        let solution = label_incumbent(&pick_one(), vec![0.0, 1.0], true);
        assert_eq!(solution.status, DomainSolutionStatus::Feasible);
        assert!(solution.quality.is_feasible());
        assert_eq!(solution.variable_values, vec![0.0, 1.0]);
    }

    #[test]
    fn test_time_limit_with_unverified_incumbent() {
        let solution = label_incumbent(&pick_one(), vec![1.0, 1.0], true);
        assert_eq!(solution.status, DomainSolutionStatus::TimeLimit);
        assert!(solution.variable_values.is_empty());
        assert!(!solution.quality.is_feasible());

        let solution = label_incumbent(&pick_one(), vec![0.5, 0.5], true);
        assert_eq!(solution.status, DomainSolutionStatus::TimeLimit);
    }
}
