use crate::domain::SolverError;
use thiserror::Error;

/// Why an optimization call failed
///
/// Injection errors mean the constraint text was malformed; infeasibility means
/// the constraints were well formed but contradict each other.
#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("error injecting custom constraint '{expression}': {message}")]
    Injection { expression: String, message: String },

    #[error("unknown product '{product_id}': no entry in {table}")]
    UnknownProduct {
        product_id: String,
        table: &'static str,
    },

    #[error("infeasible or unbounded optimization problem: {0}")]
    InfeasibleOrUnbounded(String),

    #[error("invalid model error when solving the optimization problem: {0}")]
    InvalidModel(String),

    #[error("model failed to solve: {0}")]
    SolveFailed(String),

    #[error("product '{product_id}' resolved to {selected} selected prices, expected exactly one")]
    SelectionViolated { product_id: String, selected: usize },

    #[error(transparent)]
    Solver(#[from] SolverError),
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
