// Pricing optimizer: model building, constraint injection and solve/extract

pub mod builder;
pub mod driver;
pub mod error;
pub mod functions;

pub use builder::PricingSession;
pub use driver::classify;
pub use error::{OptimizerError, Result};
pub use functions::{get_default_pricing_parameters, merge_request, optimize_pricing};

use crate::constraint::{check_constraint, InjectionResult};
use crate::domain::{PricingOptimizerInput, PricingOptimizerOutput, SolverConfig, SolverService};
use crate::solver::SolverFactory;

/// Entry point for optimization calls
///
/// Holds only configuration. Every call builds its own [`PricingSession`], so
/// one optimizer can serve any number of calls, including concurrent ones.
#[derive(Debug, Clone, Default)]
pub struct PricingOptimizer {
    config: SolverConfig,
}

impl PricingOptimizer {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves with the backend selected in the configuration
    pub fn optimize(&self, input: &PricingOptimizerInput) -> Result<PricingOptimizerOutput> {
        let solver = SolverFactory::create_from_backend(self.config.backend)?;
        self.optimize_with(solver.as_ref(), input)
    }

    pub fn optimize_with(
        &self,
        solver: &dyn SolverService,
        input: &PricingOptimizerInput,
    ) -> Result<PricingOptimizerOutput> {
        PricingSession::build(input, self.config.clone())?.solve(solver)
    }

    /// Checks each of the input's constraint expressions against its model without solving
    pub fn validate_constraints(
        &self,
        input: &PricingOptimizerInput,
    ) -> Result<Vec<InjectionResult>> {
        let session = PricingSession::build_base(input, self.config.clone())?;
        Ok(input
            .adhoc_constraints
            .iter()
            .map(|expression| check_constraint(expression, session.symbols()))
            .collect())
    }
}
