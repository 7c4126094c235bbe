// Domain value objects shared by the model builder and the solver adapters

use serde::Deserialize;
use std::fmt;

/// Type of decision variable in the optimization problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    /// Continuous real number (x ∈ ℝ)
    Continuous,
    /// Integer number (x ∈ ℤ)
    Integer,
    /// Binary variable (x ∈ {0, 1})
    Binary,
}

/// Type of constraint comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintType {
    /// Less than or equal (≤)
    LessThanOrEqual,
    /// Equal (=)
    Equal,
    /// Greater than or equal (≥)
    GreaterThanOrEqual,
}

impl ConstraintType {
    /// Whether `lhs (cmp) rhs` holds, with an absolute tolerance
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            ConstraintType::LessThanOrEqual => lhs <= rhs + tolerance,
            ConstraintType::Equal => (lhs - rhs).abs() <= tolerance,
            ConstraintType::GreaterThanOrEqual => lhs >= rhs - tolerance,
        }
    }

    /// Amount by which `lhs (cmp) rhs` is violated, zero when satisfied
    pub fn violation(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            ConstraintType::LessThanOrEqual => (lhs - rhs).max(0.0),
            ConstraintType::Equal => (lhs - rhs).abs(),
            ConstraintType::GreaterThanOrEqual => (rhs - lhs).max(0.0),
        }
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintType::LessThanOrEqual => write!(f, "<="),
            ConstraintType::Equal => write!(f, "=="),
            ConstraintType::GreaterThanOrEqual => write!(f, ">="),
        }
    }
}

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationType {
    /// Minimize the objective function
    Minimize,
    /// Maximize the objective function
    Maximize,
}

/// Status of the optimization solution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// Found optimal solution
    Optimal,
    /// Found feasible solution (may not be optimal)
    Feasible,
    /// Problem has no feasible solution
    Infeasible,
    /// Objective can be improved infinitely
    Unbounded,
    /// Solver rejected the model structurally
    ModelInvalid,
    /// Time limit reached
    TimeLimit,
    /// Iteration limit reached
    IterationLimit,
    /// Solver error occurred
    Error,
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "Optimal"),
            SolutionStatus::Feasible => write!(f, "Feasible"),
            SolutionStatus::Infeasible => write!(f, "Infeasible"),
            SolutionStatus::Unbounded => write!(f, "Unbounded"),
            SolutionStatus::ModelInvalid => write!(f, "Model Invalid"),
            SolutionStatus::TimeLimit => write!(f, "Time Limit Reached"),
            SolutionStatus::IterationLimit => write!(f, "Iteration Limit Reached"),
            SolutionStatus::Error => write!(f, "Error"),
        }
    }
}

/// Solver backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    /// Pick the best backend compiled into this build
    #[default]
    Auto,
    /// Pure Rust branch-and-bound (microlp)
    MicroLp,
    /// COIN-OR CBC solver
    CoinCbc,
    /// HiGHS solver
    Highs,
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Auto => write!(f, "Auto"),
            SolverBackend::MicroLp => write!(f, "microlp"),
            SolverBackend::CoinCbc => write!(f, "COIN-OR CBC"),
            SolverBackend::Highs => write!(f, "HiGHS"),
        }
    }
}
