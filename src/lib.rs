// Domain layer: pricing schema, model types and the solver port
pub mod domain;

// Constraint language: typed parsing and evaluation of caller constraints
pub mod constraint;

// Pricing optimizer: model building, injection and solve/extract
pub mod optimizer;

// Solver adapters: Concrete implementations of SolverService
pub mod solver;

// Configuration file loading
pub mod config;

// Infrastructure layer: logging and the gRPC server
pub mod infrastructure;

// Application layer: gRPC service and protobuf mapping
#[cfg(feature = "server")]
pub mod application;

// Re-export commonly used types
pub use domain::{
    ConversionRateCurve, Inventory, MarketSize, OptimizationProblem, Prediction,
    PricingOptimizerInput, PricingOptimizerOutput, PricingRequest, ProductResult, Solution,
    SolutionStatus, SolverBackend, SolverConfig, SolverError, SolverService,
};

pub use constraint::{check_constraint, inject_constraint, InjectionResult, InjectionStatus};

pub use optimizer::{
    get_default_pricing_parameters, optimize_pricing, OptimizerError, PricingOptimizer,
    PricingSession,
};

pub use config::{Config, ConfigError};

pub use solver::SolverFactory;

#[cfg(feature = "server")]
pub use application::GrpcPricingService;

#[cfg(feature = "server")]
pub use infrastructure::{start_server, ServerConfig};
