// HiGHS adapter
// Translates the domain model straight into a HiGHS row problem

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolutionQuality},
    solver_service::{presolve, Presolved, Result, SolverService},
    value_objects::{
        ConstraintType, OptimizationType, SolutionStatus as DomainSolutionStatus, VariableType,
    },
};
use highs::{HighsModelStatus, RowProblem, Sense};
use std::time::Instant;

pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for HighsSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        // Validate first
        self.validate(problem)?;

        let start_time = Instant::now();

        let constraints = match presolve(problem) {
            Presolved::Reduced(kept) => kept,
            Presolved::Infeasible(reason) => {
                return Ok(DomainSolution::new(
                    DomainSolutionStatus::Infeasible,
                    format!("Problem is infeasible: {}", reason),
                )
                .with_statistics(problem.statistics(start_time.elapsed().as_secs_f64() * 1000.0)));
            }
        };

        // Add variables first, then constraints
        let mut pb = RowProblem::default();
        let mut vars = Vec::with_capacity(problem.num_variables());

        for (i, var_def) in problem.variables.iter().enumerate() {
            let lower = var_def.lower_bound;
            let upper = var_def.upper_bound.unwrap_or(f64::INFINITY);
            let obj_coeff = problem.objective.coefficients.get(i).copied().unwrap_or(0.0);

            let col = match var_def.variable_type {
                VariableType::Integer | VariableType::Binary => {
                    pb.add_integer_column(obj_coeff, lower..upper)
                }
                VariableType::Continuous => pb.add_column(obj_coeff, lower..upper),
            };
            vars.push(col);
        }

        // If no variables specified, create defaults
        if problem.variables.is_empty() {
            for &coeff in &problem.objective.coefficients {
                vars.push(pb.add_column(coeff, 0..));
            }
        }

        for constraint in constraints {
            let terms: Vec<_> = constraint
                .coefficients
                .iter()
                .zip(&vars)
                .filter(|(coeff, _)| **coeff != 0.0)
                .map(|(&coeff, &col)| (col, coeff))
                .collect();

            match constraint.constraint_type {
                ConstraintType::LessThanOrEqual => pb.add_row(..=constraint.bound, &terms),
                ConstraintType::Equal => {
                    pb.add_row(constraint.bound..=constraint.bound, &terms)
                }
                ConstraintType::GreaterThanOrEqual => pb.add_row(constraint.bound.., &terms),
            }
        }

        let sense = if problem.objective.optimization_type == OptimizationType::Maximize {
            Sense::Maximise
        } else {
            Sense::Minimise
        };

        let config = &problem.solver_config;
        let mut model = pb.optimise(sense);
        if !config.verbose {
            model.make_quiet();
        }
        if let Some(limit) = config.time_limit {
            model.set_option("time_limit", limit);
        }
        if let Some(gap) = config.gap_tolerance {
            model.set_option("mip_rel_gap", gap);
        }

        let solved = model.solve();
        let statistics = problem.statistics(start_time.elapsed().as_secs_f64() * 1000.0);

        let incumbent = || {
            let values = solved.get_solution().columns().to_vec();
            let quality = SolutionQuality::assess(problem, &values);
            (values, quality)
        };

        let solution = match solved.status() {
            HighsModelStatus::Optimal => {
                let (values, quality) = incumbent();
                let objective_value = problem.objective.evaluate(&values);
                let mut solution = DomainSolution::optimal(objective_value, values);
                solution.message = format!("Optimal solution found for '{}'", problem.name);
                solution.with_quality(quality)
            }
            status @ (HighsModelStatus::ReachedTimeLimit
            | HighsModelStatus::ReachedIterationLimit) => {
                // Accept the incumbent only if it actually satisfies the model
                let (values, quality) = incumbent();
                if quality.is_feasible() {
                    let objective_value = problem.objective.evaluate(&values);
                    DomainSolution::feasible(objective_value, values).with_quality(quality)
                } else if matches!(status, HighsModelStatus::ReachedTimeLimit) {
                    DomainSolution::new(
                        DomainSolutionStatus::TimeLimit,
                        "Time limit reached before a feasible solution was found",
                    )
                } else {
                    DomainSolution::new(
                        DomainSolutionStatus::IterationLimit,
                        "Iteration limit reached before a feasible solution was found",
                    )
                }
            }
            HighsModelStatus::Infeasible => DomainSolution::infeasible(),
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                DomainSolution::unbounded()
            }
            HighsModelStatus::ModelError | HighsModelStatus::LoadError => DomainSolution::new(
                DomainSolutionStatus::ModelInvalid,
                format!("HiGHS rejected the model: {:?}", solved.status()),
            ),
            status => DomainSolution::new(
                DomainSolutionStatus::Error,
                format!("HiGHS solver returned status: {:?}", status),
            ),
        };

        Ok(solution.with_statistics(statistics))
    }

    fn name(&self) -> &str {
        "HiGHS"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Constraint, ObjectiveFunction, Variable};

    #[test]
    fn test_binary_selection() {
        // Pick exactly one of three prices, maximize revenue
        let problem = OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Maximize,
            vec![100.0, 200.0, 150.0],
        ))
        .with_variables(vec![
            Variable::binary("x[A, 1]"),
            Variable::binary("x[A, 2]"),
            Variable::binary("x[A, 3]"),
        ])
        .add_constraint(Constraint::new(
            ConstraintType::Equal,
            vec![1.0, 1.0, 1.0],
            1.0,
        ));

        let solution = HighsSolver::new().solve(&problem).unwrap();
        assert!(solution.is_optimal());
        assert!((solution.optimal_value.unwrap() - 200.0).abs() < 1e-6);
        assert!((solution.variable_values[1] - 1.0).abs() < 1e-6);
    }
}
