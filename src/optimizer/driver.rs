use super::builder::PricingSession;
use super::error::{OptimizerError, Result};
use crate::domain::{
    presolve, Presolved, PricingOptimizerOutput, ProductResult, Solution, SolutionStatus,
    SolverError, SolverService, FEASIBILITY_TOLERANCE,
};

impl PricingSession {
    /// Runs `solver` on the built model and extracts one result per product
    pub fn solve(self, solver: &dyn SolverService) -> Result<PricingOptimizerOutput> {
        // Rows without variables, such as the selection row of an empty curve
        if let Presolved::Infeasible(message) = presolve(&self.problem) {
            return Err(OptimizerError::InfeasibleOrUnbounded(message));
        }

        if self.problem.num_variables() == 0 {
            tracing::debug!("No products to optimize, skipping solver");
            return Ok(PricingOptimizerOutput::default());
        }

        tracing::info!(
            solver = solver.name(),
            variables = self.problem.num_variables(),
            constraints = self.problem.constraints.len(),
            "Solving pricing model"
        );

        let solution = match solver.solve(&self.problem) {
            Ok(solution) => solution,
            Err(SolverError::InvalidProblem(message)) => {
                return Err(OptimizerError::InvalidModel(message))
            }
            Err(e) => return Err(OptimizerError::SolveFailed(e.to_string())),
        };

        let solution = classify(solution)?;
        tracing::info!(
            status = %solution.status,
            revenue = solution.optimal_value.unwrap_or_default(),
            solve_time_ms = solution.statistics.solve_time_ms,
            "Pricing model solved"
        );

        self.extract(&solution)
    }

    fn extract(&self, solution: &Solution) -> Result<PricingOptimizerOutput> {
        // Every column is binary; snap the solver's floating values to 0/1
        let values: Vec<f64> = solution
            .variable_values
            .iter()
            .map(|v| v.round())
            .collect();

        let mut product_results = Vec::with_capacity(self.product_ids.len());
        for product_id in &self.product_ids {
            let selected: Vec<f64> = self
                .symbols
                .selection(product_id)
                .iter()
                .filter(|(_, column)| is_selected(solution.variable_values.get(*column)))
                .map(|(price, _)| *price)
                .collect();

            let &[price] = selected.as_slice() else {
                return Err(OptimizerError::SelectionViolated {
                    product_id: product_id.clone(),
                    selected: selected.len(),
                });
            };

            let revenue = self
                .symbols
                .revenue(product_id)
                .map_or(0.0, |e| e.evaluate(&values));
            let sales = self
                .symbols
                .sales(product_id)
                .map_or(0.0, |e| e.evaluate(&values));

            product_results.push(ProductResult {
                product_id: product_id.clone(),
                price,
                revenue,
                sales: sales.round().max(0.0) as u64,
            });
        }

        Ok(PricingOptimizerOutput { product_results })
    }
}

fn is_selected(value: Option<&f64>) -> bool {
    value.is_some_and(|v| (v - 1.0).abs() <= FEASIBILITY_TOLERANCE)
}

/// Maps a termination status onto the optimizer's failure classes
pub fn classify(solution: Solution) -> Result<Solution> {
    match solution.status {
        SolutionStatus::Optimal | SolutionStatus::Feasible => Ok(solution),
        SolutionStatus::Infeasible | SolutionStatus::Unbounded => {
            Err(OptimizerError::InfeasibleOrUnbounded(solution.message))
        }
        SolutionStatus::ModelInvalid => Err(OptimizerError::InvalidModel(solution.message)),
        status => Err(OptimizerError::SolveFailed(format!(
            "{}: {}",
            status, solution.message
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_status(status: SolutionStatus) -> Solution {
        Solution::new(status, "scripted")
    }

    #[test]
    fn test_optimal_and_feasible_proceed() {
        assert!(classify(with_status(SolutionStatus::Optimal)).is_ok());
        assert!(classify(with_status(SolutionStatus::Feasible)).is_ok());
    }

    #[test]
    fn test_infeasible_and_unbounded_share_a_class() {
        for status in [SolutionStatus::Infeasible, SolutionStatus::Unbounded] {
            assert!(matches!(
                classify(with_status(status)),
                Err(OptimizerError::InfeasibleOrUnbounded(_))
            ));
        }
    }

    #[test]
    fn test_model_invalid_is_distinct() {
        assert!(matches!(
            classify(with_status(SolutionStatus::ModelInvalid)),
            Err(OptimizerError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_other_statuses_are_generic_failures() {
        for status in [
            SolutionStatus::TimeLimit,
            SolutionStatus::IterationLimit,
            SolutionStatus::Error,
        ] {
            match classify(with_status(status)) {
                Err(OptimizerError::SolveFailed(message)) => {
                    assert!(message.starts_with(&status.to_string()))
                }
                other => panic!("unexpected classification for {status}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_is_selected_tolerance() {
        assert!(is_selected(Some(&1.0)));
        assert!(is_selected(Some(&0.9999999)));
        assert!(!is_selected(Some(&0.5)));
        assert!(!is_selected(None));
    }
}
