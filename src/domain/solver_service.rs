// Domain service interface for solving optimization problems
// Every backend adapter implements this contract

use super::models::{Constraint, OptimizationProblem, Solution};

/// Error types for the solver service
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Outcome of the constant-constraint presolve pass
#[derive(Debug)]
pub enum Presolved<'a> {
    /// Constraints that still reference variables
    Reduced(Vec<&'a Constraint>),
    /// A constraint without variables can never hold
    Infeasible(String),
}

/// Drops constraints that reference no variable, failing fast when one of them is false
pub fn presolve(problem: &OptimizationProblem) -> Presolved<'_> {
    let mut kept = Vec::with_capacity(problem.constraints.len());

    for constraint in &problem.constraints {
        if !constraint.is_constant() {
            kept.push(constraint);
            continue;
        }

        if !constraint
            .constraint_type
            .holds(0.0, constraint.bound, super::models::FEASIBILITY_TOLERANCE)
        {
            return Presolved::Infeasible(format!(
                "constraint '{}' reduces to 0 {} {}",
                constraint.name, constraint.constraint_type, constraint.bound
            ));
        }
    }

    Presolved::Reduced(kept)
}

/// Domain service interface for optimization solvers
///
/// Backends are swappable behind this trait, so the pricing model never
/// depends on a concrete solver crate.
pub trait SolverService: Send + Sync {
    /// Solve an optimization problem
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution>;

    /// Validate a problem without solving it
    fn validate(&self, problem: &OptimizationProblem) -> Result<Vec<String>> {
        let mut errors = Vec::new();

        // Check objective has coefficients
        if problem.objective.coefficients.is_empty() {
            errors.push("Objective must have at least one coefficient".to_string());
        }

        if problem.objective.coefficients.iter().any(|c| !c.is_finite()) {
            errors.push("Objective has non-finite coefficients".to_string());
        }

        let num_vars = problem.num_variables();

        // Check variables match objective
        if !problem.variables.is_empty() && problem.variables.len() != num_vars {
            errors.push(format!(
                "Number of variables ({}) doesn't match objective coefficients ({})",
                problem.variables.len(),
                num_vars
            ));
        }

        // Check constraints
        for (i, constraint) in problem.constraints.iter().enumerate() {
            if constraint.num_variables() != num_vars {
                errors.push(format!(
                    "Constraint {} has {} coefficients but problem has {} variables",
                    i,
                    constraint.num_variables(),
                    num_vars
                ));
            }

            if !constraint.bound.is_finite()
                || constraint.coefficients.iter().any(|c| !c.is_finite())
            {
                errors.push(format!(
                    "Constraint {} '{}' has non-finite coefficients or bound",
                    i, constraint.name
                ));
            }
        }

        // Check variable bounds
        for (i, var) in problem.variables.iter().enumerate() {
            if let Some(upper) = var.upper_bound {
                if var.lower_bound > upper {
                    errors.push(format!(
                        "Variable {} '{}' has lower bound ({}) > upper bound ({})",
                        i, var.name, var.lower_bound, upper
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(Vec::new())
        } else {
            Err(SolverError::InvalidProblem(errors.join("; ")))
        }
    }

    /// Get the name of this solver backend
    fn name(&self) -> &str;

    /// Check if this solver supports mixed-integer programming
    fn supports_mip(&self) -> bool;
}
