// Model builder: one binary column `x[product, price]` per curve point, exactly
// one price per product, derived price/sales/revenue expressions, revenue objective

use super::error::{OptimizerError, Result};
use crate::constraint::{inject_constraint, LinearExpr, SymbolTable};
use crate::domain::{
    Constraint, ConstraintType, ObjectiveFunction, OptimizationProblem, OptimizationType,
    PricingOptimizerInput, SolverConfig, Variable,
};
use std::collections::HashSet;

/// A model built for exactly one optimization call
///
/// Owns every solver-side structure; [`PricingSession::solve`] consumes it,
/// so a session can never be rebuilt or solved twice.
#[derive(Debug)]
pub struct PricingSession {
    pub(super) problem: OptimizationProblem,
    pub(super) symbols: SymbolTable,
    pub(super) product_ids: Vec<String>,
    revenue_objective: Vec<f64>,
}

/// A price point of one product with its precomputed effective sales
struct PricePoint {
    price: f64,
    sales: u64,
}

impl PricingSession {
    /// Builds the full model: base formulation, injected constraints, objective
    pub fn build(input: &PricingOptimizerInput, config: SolverConfig) -> Result<Self> {
        let mut session = Self::build_base(input, config)?;
        session.inject_all(&input.adhoc_constraints)?;
        session.finalize_objective();
        Ok(session)
    }

    /// Selection variables, one-price constraints and derived expressions only
    pub fn build_base(input: &PricingOptimizerInput, config: SolverConfig) -> Result<Self> {
        let lookup = input.lookup();

        let mut seen = HashSet::new();
        let mut products: Vec<(String, Vec<PricePoint>)> = Vec::new();

        for product_id in &input.product_ids {
            if !seen.insert(product_id.as_str()) {
                tracing::warn!(product_id = %product_id, "Skipping duplicate product id");
                continue;
            }

            let curve = lookup
                .curve(product_id)
                .ok_or_else(|| unknown(product_id, "conversion rate curves"))?;
            let inventory = lookup
                .inventory(product_id)
                .ok_or_else(|| unknown(product_id, "inventories"))?;
            let market_size = lookup
                .market_size(product_id)
                .ok_or_else(|| unknown(product_id, "market sizes"))?;

            let mut points: Vec<PricePoint> = Vec::with_capacity(curve.len());
            for prediction in curve {
                if points.iter().any(|p| p.price == prediction.price) {
                    tracing::warn!(
                        product_id = %product_id,
                        price = prediction.price,
                        "Skipping duplicate price on conversion curve"
                    );
                    continue;
                }
                points.push(PricePoint {
                    price: prediction.price,
                    sales: prediction.effective_sales(inventory, market_size),
                });
            }

            products.push((product_id.clone(), points));
        }

        let num_vars: usize = products.iter().map(|(_, points)| points.len()).sum();
        let mut symbols = SymbolTable::new();
        symbols.set_num_vars(num_vars);

        let mut variables = Vec::with_capacity(num_vars);
        let mut constraints = Vec::with_capacity(products.len());
        let mut revenue_objective = vec![0.0; num_vars];

        for (product_id, points) in &products {
            let mut selection = LinearExpr::zero();
            let mut price = LinearExpr::zero();
            let mut sales = LinearExpr::zero();
            let mut revenue = LinearExpr::zero();

            for point in points {
                let column = variables.len();
                variables.push(Variable::binary(format!(
                    "x[{}, {}]",
                    product_id, point.price
                )));
                symbols.insert_selection(product_id, point.price, column);

                let units = point.sales as f64;
                selection.add_term(column, 1.0);
                price.add_term(column, point.price);
                sales.add_term(column, units);
                revenue.add_term(column, point.price * units);
                revenue_objective[column] = point.price * units;
            }

            // Only one price can be chosen for each product
            constraints.push(
                Constraint::new(ConstraintType::Equal, selection.to_dense(num_vars), 1.0)
                    .with_name(format!("select_one[{}]", product_id)),
            );

            symbols.insert_derived(product_id, price, revenue, sales);
        }

        let names: Vec<String> = variables.iter().map(|v| v.name.clone()).collect();
        let placeholder =
            ObjectiveFunction::new(OptimizationType::Maximize, vec![0.0; num_vars]).with_names(names);

        let mut problem = OptimizationProblem::new(placeholder)
            .with_name("pricing")
            .with_variables(variables)
            .with_config(config);
        problem.constraints = constraints;

        tracing::debug!(
            products = products.len(),
            variables = num_vars,
            "Built base pricing model"
        );

        Ok(Self {
            problem,
            symbols,
            product_ids: products.into_iter().map(|(id, _)| id).collect(),
            revenue_objective,
        })
    }

    /// Adds each expression in order, aborting on the first one that fails
    ///
    /// Constraints added before the failing one stay in the model; the session
    /// is expected to be discarded together with the error.
    pub fn inject_all(&mut self, expressions: &[String]) -> Result<()> {
        for expression in expressions {
            let result = inject_constraint(expression, &self.symbols, &mut self.problem);
            if !result.is_success() {
                return Err(OptimizerError::Injection {
                    expression: result.expression,
                    message: result.message,
                });
            }
        }
        Ok(())
    }

    /// Objective function: maximize total revenue
    pub fn finalize_objective(&mut self) {
        self.problem.objective.optimization_type = OptimizationType::Maximize;
        self.problem.objective.coefficients = self.revenue_objective.clone();
    }

    pub fn problem(&self) -> &OptimizationProblem {
        &self.problem
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn product_ids(&self) -> &[String] {
        &self.product_ids
    }
}

fn unknown(product_id: &str, table: &'static str) -> OptimizerError {
    OptimizerError::UnknownProduct {
        product_id: product_id.to_string(),
        table,
    }
}
