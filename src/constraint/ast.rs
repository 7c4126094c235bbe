use super::lexer::Span;
use crate::domain::ConstraintType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Subscript inside `name[...]`
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    /// `product_price['A']`
    Product(String),
    /// `x['A', 1.5]` or `x[('A', 1.5)]`
    ProductPrice(String, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number {
        value: f64,
        span: Span,
    },
    /// Bare name, e.g. `solver`
    Name {
        name: String,
        span: Span,
    },
    Subscript {
        name: String,
        key: Key,
        span: Span,
    },
    Neg {
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Number { span, .. }
            | Expr::Name { span, .. }
            | Expr::Subscript { span, .. }
            | Expr::Neg { span, .. }
            | Expr::Binary { span, .. } => *span,
        }
    }
}

/// A parsed `lhs (<= | >= | ==) rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub lhs: Expr,
    pub comparator: ConstraintType,
    pub rhs: Expr,
}
