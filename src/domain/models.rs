use super::value_objects::{
    ConstraintType, OptimizationType, SolutionStatus, SolverBackend, VariableType,
};

/// Absolute tolerance used when checking constraints and integrality of solved values
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Decision variable in an optimization problem
#[derive(Debug, Clone)]
pub struct Variable {
    pub variable_type: VariableType,
    pub lower_bound: f64,
    pub upper_bound: Option<f64>,
    pub name: String,
}

impl Variable {
    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Integer,
            lower_bound: 0.0,
            upper_bound: None,
            name: name.into(),
        }
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Binary,
            lower_bound: 0.0,
            upper_bound: Some(1.0),
            name: name.into(),
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: Option<f64>) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.variable_type,
            VariableType::Integer | VariableType::Binary
        )
    }
}

/// Objective function to minimize or maximize
#[derive(Debug, Clone)]
pub struct ObjectiveFunction {
    pub optimization_type: OptimizationType,
    pub coefficients: Vec<f64>,
    pub variable_names: Vec<String>,
}

impl ObjectiveFunction {
    pub fn new(optimization_type: OptimizationType, coefficients: Vec<f64>) -> Self {
        let variable_names = (0..coefficients.len()).map(|i| format!("x{}", i)).collect();

        Self {
            optimization_type,
            coefficients,
            variable_names,
        }
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.variable_names = names;
        self
    }

    pub fn num_variables(&self) -> usize {
        self.coefficients.len()
    }

    /// Objective value at the given point
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(c, v)| c * v)
            .sum()
    }
}

/// Linear constraint on variables: `Σ coefficients[i]·x[i] (cmp) bound`
#[derive(Debug, Clone)]
pub struct Constraint {
    pub constraint_type: ConstraintType,
    pub coefficients: Vec<f64>,
    pub bound: f64,
    pub name: String,
}

impl Constraint {
    pub fn new(constraint_type: ConstraintType, coefficients: Vec<f64>, bound: f64) -> Self {
        Self {
            constraint_type,
            coefficients,
            bound,
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn num_variables(&self) -> usize {
        self.coefficients.len()
    }

    /// True when no variable appears in the constraint
    pub fn is_constant(&self) -> bool {
        self.coefficients.iter().all(|&c| c == 0.0)
    }

    /// Left-hand side value at the given point
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(c, v)| c * v)
            .sum()
    }

    pub fn is_satisfied_by(&self, values: &[f64]) -> bool {
        self.constraint_type
            .holds(self.activity(values), self.bound, FEASIBILITY_TOLERANCE)
    }
}

/// Configuration for the solver
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Wall-clock limit in seconds
    pub time_limit: Option<f64>,
    /// Relative MIP gap at which the search may stop
    pub gap_tolerance: Option<f64>,
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Auto,
            time_limit: None,
            gap_tolerance: None,
            verbose: false,
        }
    }
}

/// Complete optimization problem
#[derive(Debug, Clone)]
pub struct OptimizationProblem {
    pub name: String,
    pub objective: ObjectiveFunction,
    pub constraints: Vec<Constraint>,
    pub variables: Vec<Variable>,
    pub solver_config: SolverConfig,
}

impl OptimizationProblem {
    pub fn new(objective: ObjectiveFunction) -> Self {
        Self {
            name: String::new(),
            objective,
            constraints: Vec::new(),
            variables: Vec::new(),
            solver_config: SolverConfig::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn add_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.solver_config = config;
        self
    }

    pub fn num_variables(&self) -> usize {
        self.objective.num_variables()
    }

    pub fn num_integer_variables(&self) -> usize {
        self.variables.iter().filter(|v| v.is_integer()).count()
    }

    /// Builds the statistics block shared by every adapter
    pub fn statistics(&self, solve_time_ms: f64) -> SolverStatistics {
        let count = |t: VariableType| {
            self.variables
                .iter()
                .filter(|v| v.variable_type == t)
                .count() as u32
        };

        SolverStatistics {
            solve_time_ms,
            num_variables: self.num_variables() as u32,
            num_constraints: self.constraints.len() as u32,
            num_integer_vars: count(VariableType::Integer),
            num_binary_vars: count(VariableType::Binary),
        }
    }
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_constraints: u32,
    pub num_integer_vars: u32,
    pub num_binary_vars: u32,
}

/// Quality metrics for the solution
#[derive(Debug, Clone, Default)]
pub struct SolutionQuality {
    pub max_constraint_violation: f64,
    pub max_integrality_violation: f64,
    pub reliability: f64,
}

impl SolutionQuality {
    /// Measures how well `values` satisfy the constraints, bounds and integrality of `problem`
    pub fn assess(problem: &OptimizationProblem, values: &[f64]) -> Self {
        let mut max_constraint_violation: f64 = 0.0;
        for constraint in &problem.constraints {
            let violation = constraint
                .constraint_type
                .violation(constraint.activity(values), constraint.bound);
            max_constraint_violation = max_constraint_violation.max(violation);
        }

        let mut max_integrality_violation: f64 = 0.0;
        for (var, &value) in problem.variables.iter().zip(values) {
            let below = (var.lower_bound - value).max(0.0);
            let above = var.upper_bound.map_or(0.0, |ub| (value - ub).max(0.0));
            max_constraint_violation = max_constraint_violation.max(below).max(above);

            if var.is_integer() {
                max_integrality_violation =
                    max_integrality_violation.max((value - value.round()).abs());
            }
        }

        let reliability = if values.len() == problem.num_variables()
            && max_constraint_violation <= FEASIBILITY_TOLERANCE
            && max_integrality_violation <= FEASIBILITY_TOLERANCE
        {
            1.0
        } else {
            0.0
        };

        Self {
            max_constraint_violation,
            max_integrality_violation,
            reliability,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.reliability >= 1.0
    }
}

/// Solution to an optimization problem
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolutionStatus,
    pub optimal_value: Option<f64>,
    pub variable_values: Vec<f64>,
    pub message: String,
    pub statistics: SolverStatistics,
    pub quality: SolutionQuality,
}

impl Solution {
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            optimal_value: None,
            variable_values: Vec::new(),
            message: message.into(),
            statistics: SolverStatistics::default(),
            quality: SolutionQuality::default(),
        }
    }

    pub fn optimal(value: f64, variable_values: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            optimal_value: Some(value),
            variable_values,
            message: "Optimal solution found".to_string(),
            statistics: SolverStatistics::default(),
            quality: SolutionQuality::default(),
        }
    }

    pub fn feasible(value: f64, variable_values: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::Feasible,
            optimal_value: Some(value),
            variable_values,
            message: "Feasible solution found (optimality not proven)".to_string(),
            statistics: SolverStatistics::default(),
            quality: SolutionQuality::default(),
        }
    }

    pub fn infeasible() -> Self {
        Self::new(
            SolutionStatus::Infeasible,
            "Problem is infeasible: no solution satisfies all constraints",
        )
    }

    pub fn unbounded() -> Self {
        Self::new(
            SolutionStatus::Unbounded,
            "Problem is unbounded: objective can be improved infinitely",
        )
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn with_quality(mut self, quality: SolutionQuality) -> Self {
        self.quality = quality;
        self
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    pub fn is_feasible(&self) -> bool {
        matches!(
            self.status,
            SolutionStatus::Optimal | SolutionStatus::Feasible
        )
    }
}
