use super::ast::{BinaryOp, Expr, Key};
use super::error::InjectionError;
use super::linear::LinearExpr;
use super::parser::Parser;
use crate::domain::{Constraint, OptimizationProblem};
use std::collections::HashMap;
use std::fmt;

pub const SOLVER: &str = "solver";
pub const SELECTION: &str = "x";
pub const PRODUCT_PRICE: &str = "product_price";
pub const PRODUCT_REVENUE: &str = "product_revenue";
pub const PRODUCT_SALES: &str = "product_sales";

const SELECTION_USAGE: &str = "x['<product>', <price>]";
const PRODUCT_USAGE: &str = "<name>['<product>']";

/// The only names an injected constraint can see
///
/// `x` maps `(product, price)` to a binary column; the three `product_*`
/// maps hold the derived price, revenue and sales expressions per product.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    num_vars: usize,
    selection: HashMap<String, Vec<(f64, usize)>>,
    product_price: HashMap<String, LinearExpr>,
    product_revenue: HashMap<String, LinearExpr>,
    product_sales: HashMap<String, LinearExpr>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of model columns constraints are compiled against
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn set_num_vars(&mut self, num_vars: usize) {
        self.num_vars = num_vars;
    }

    pub fn insert_selection(&mut self, product_id: &str, price: f64, column: usize) {
        self.selection
            .entry(product_id.to_string())
            .or_default()
            .push((price, column));
    }

    pub fn insert_derived(
        &mut self,
        product_id: &str,
        price: LinearExpr,
        revenue: LinearExpr,
        sales: LinearExpr,
    ) {
        self.product_price.insert(product_id.to_string(), price);
        self.product_revenue.insert(product_id.to_string(), revenue);
        self.product_sales.insert(product_id.to_string(), sales);
    }

    /// `(price, column)` pairs of one product, in curve order
    pub fn selection(&self, product_id: &str) -> &[(f64, usize)] {
        self.selection
            .get(product_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn selection_column(&self, product_id: &str, price: f64) -> Option<usize> {
        self.selection(product_id)
            .iter()
            .find(|(p, _)| *p == price)
            .map(|(_, column)| *column)
    }

    pub fn price(&self, product_id: &str) -> Option<&LinearExpr> {
        self.product_price.get(product_id)
    }

    pub fn revenue(&self, product_id: &str) -> Option<&LinearExpr> {
        self.product_revenue.get(product_id)
    }

    pub fn sales(&self, product_id: &str) -> Option<&LinearExpr> {
        self.product_sales.get(product_id)
    }

    fn derived(&self, name: &str) -> Option<&HashMap<String, LinearExpr>> {
        match name {
            PRODUCT_PRICE => Some(&self.product_price),
            PRODUCT_REVENUE => Some(&self.product_revenue),
            PRODUCT_SALES => Some(&self.product_sales),
            _ => None,
        }
    }

    /// Evaluates an expression tree into an affine expression over model columns
    pub fn evaluate(&self, expr: &Expr) -> Result<LinearExpr, InjectionError> {
        match expr {
            Expr::Number { value, .. } => Ok(LinearExpr::from_const(*value)),
            Expr::Name { name, .. } => Err(self.bare_name_error(name)),
            Expr::Subscript { name, key, .. } => self.resolve(name, key),
            Expr::Neg { operand, .. } => Ok(self.evaluate(operand)?.scale(-1.0)),
            Expr::Binary { op, lhs, rhs, span } => {
                let mut left = self.evaluate(lhs)?;
                let right = self.evaluate(rhs)?;
                match op {
                    BinaryOp::Add => {
                        left.add_inplace(&right);
                        Ok(left)
                    }
                    BinaryOp::Sub => Ok(left.sub(right)),
                    BinaryOp::Mul => {
                        if left.is_constant() {
                            Ok(right.scale(left.constant))
                        } else if right.is_constant() {
                            Ok(left.scale(right.constant))
                        } else {
                            Err(InjectionError::NonLinear { span: *span })
                        }
                    }
                    BinaryOp::Div => {
                        if !right.is_constant() {
                            Err(InjectionError::NonConstantDivisor { span: rhs.span() })
                        } else if right.constant == 0.0 {
                            Err(InjectionError::DivisionByZero { span: rhs.span() })
                        } else {
                            Ok(left.scale(1.0 / right.constant))
                        }
                    }
                }
            }
        }
    }

    fn bare_name_error(&self, name: &str) -> InjectionError {
        match name {
            SOLVER => InjectionError::SolverHandle,
            SELECTION => InjectionError::NotSubscripted {
                name: name.to_string(),
                usage: SELECTION_USAGE,
            },
            _ if self.derived(name).is_some() => InjectionError::NotSubscripted {
                name: name.to_string(),
                usage: PRODUCT_USAGE,
            },
            _ => InjectionError::UndefinedName(name.to_string()),
        }
    }

    fn resolve(&self, name: &str, key: &Key) -> Result<LinearExpr, InjectionError> {
        if name == SOLVER {
            return Err(InjectionError::NotSubscriptable {
                name: name.to_string(),
            });
        }

        if name == SELECTION {
            let Key::ProductPrice(product_id, price) = key else {
                return Err(InjectionError::WrongKey {
                    name: name.to_string(),
                    usage: SELECTION_USAGE,
                });
            };
            if !self.selection.contains_key(product_id) {
                return Err(InjectionError::UnknownProduct {
                    name: name.to_string(),
                    product_id: product_id.clone(),
                });
            }
            return self
                .selection_column(product_id, *price)
                .map(|column| LinearExpr::from_var(column, 1.0))
                .ok_or_else(|| InjectionError::UnknownPrice {
                    product_id: product_id.clone(),
                    price: *price,
                });
        }

        let Some(map) = self.derived(name) else {
            return Err(InjectionError::UndefinedName(name.to_string()));
        };
        let Key::Product(product_id) = key else {
            return Err(InjectionError::WrongKey {
                name: name.to_string(),
                usage: PRODUCT_USAGE,
            });
        };
        map.get(product_id)
            .cloned()
            .ok_or_else(|| InjectionError::UnknownProduct {
                name: name.to_string(),
                product_id: product_id.clone(),
            })
    }

    /// Parses and evaluates `expression` into a dense model constraint
    pub fn compile(&self, expression: &str) -> Result<Constraint, InjectionError> {
        let relation = Parser::parse(expression)?;
        let lhs = self.evaluate(&relation.lhs)?;
        let rhs = self.evaluate(&relation.rhs)?;
        Ok(lhs
            .sub(rhs)
            .into_constraint(relation.comparator, self.num_vars)
            .with_name(expression.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionStatus {
    Success,
    Error,
}

impl fmt::Display for InjectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectionStatus::Success => write!(f, "success"),
            InjectionStatus::Error => write!(f, "error"),
        }
    }
}

/// Report for one injected expression
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionResult {
    pub expression: String,
    pub status: InjectionStatus,
    pub message: String,
}

impl InjectionResult {
    pub fn success(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            status: InjectionStatus::Success,
            message: "Constraint added successfully.".to_string(),
        }
    }

    pub fn error(expression: impl Into<String>, error: &InjectionError) -> Self {
        Self {
            expression: expression.into(),
            status: InjectionStatus::Error,
            message: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == InjectionStatus::Success
    }
}

/// Compiles `expression` and, when it is a valid linear relation, appends it to `problem`
///
/// Never fails: malformed input is reported through the returned status and
/// leaves `problem` untouched.
pub fn inject_constraint(
    expression: &str,
    symbols: &SymbolTable,
    problem: &mut OptimizationProblem,
) -> InjectionResult {
    tracing::info!(constraint = expression, "Injecting custom constraint");

    match symbols.compile(expression) {
        Ok(constraint) => {
            problem.constraints.push(constraint);
            InjectionResult::success(expression)
        }
        Err(e) => {
            tracing::error!(constraint = expression, error = %e, "Rejected custom constraint");
            InjectionResult::error(expression, &e)
        }
    }
}

/// Reports what [`inject_constraint`] would do, without touching any model
pub fn check_constraint(expression: &str, symbols: &SymbolTable) -> InjectionResult {
    match symbols.compile(expression) {
        Ok(_) => InjectionResult::success(expression),
        Err(e) => InjectionResult::error(expression, &e),
    }
}
