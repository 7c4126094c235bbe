// Caller-supplied constraints over the pricing model
// Expressions such as `product_price['A'] <= product_price['B']` are parsed into a
// typed tree and evaluated against a SymbolTable that exposes only the selection
// variables and derived per-product expressions. Nothing is executed.

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod linear;
pub mod parser;

pub use error::InjectionError;
pub use eval::{
    check_constraint, inject_constraint, InjectionResult, InjectionStatus, SymbolTable,
};
pub use linear::LinearExpr;
pub use parser::Parser;
