use super::lexer::Span;
use thiserror::Error;

/// Why an injected constraint expression was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InjectionError {
    #[error("unexpected token: expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("invalid character '{text}' at {span}")]
    InvalidCharacter { text: String, span: Span },

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("strict inequality '{op}' at {span} is not supported by linear constraints, use '<=' or '>='")]
    StrictInequality { op: String, span: Span },

    #[error("'!=' at {span} is not supported by linear constraints")]
    NotEqual { span: Span },

    #[error("'=' at {span} is an assignment, use '==' for equality")]
    Assignment { span: Span },

    #[error("chained comparison at {span} is not supported, split it into separate constraints")]
    ChainedComparison { span: Span },

    #[error("expression is not a relation, expected one of '<=', '>=', '=='")]
    MissingComparator,

    #[error("expression nested deeper than {limit} levels at {span}")]
    TooDeep { limit: usize, span: Span },

    #[error("expression has more than {limit} operators, limit reached at {span}")]
    TooManyOperators { limit: usize, span: Span },

    #[error("name '{0}' is not defined")]
    UndefinedName(String),

    #[error("'solver' is the model handle and cannot be used as a value inside a constraint")]
    SolverHandle,

    #[error("'{name}' must be subscripted as {usage}")]
    NotSubscripted { name: String, usage: &'static str },

    #[error("'{name}' is not subscriptable")]
    NotSubscriptable { name: String },

    #[error("wrong key for '{name}': expected {usage}")]
    WrongKey { name: String, usage: &'static str },

    #[error("unknown product '{product_id}' in '{name}'")]
    UnknownProduct { name: String, product_id: String },

    #[error("price {price} is not on the conversion curve of product '{product_id}'")]
    UnknownPrice { product_id: String, price: f64 },

    #[error("non-linear term at {span}: cannot multiply two model expressions")]
    NonLinear { span: Span },

    #[error("cannot divide by a model expression at {span}")]
    NonConstantDivisor { span: Span },

    #[error("division by zero at {span}")]
    DivisionByZero { span: Span },
}
