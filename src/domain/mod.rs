// Domain module: pricing schema, generic MIP model and the solver contract

pub mod models;
pub mod pricing;
pub mod solver_service;
pub mod value_objects;

pub use models::*;
pub use pricing::*;
pub use solver_service::*;
pub use value_objects::*;
