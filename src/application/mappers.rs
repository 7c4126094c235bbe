// Mappers: Convert between gRPC protobuf types and domain models
// Protobuf types stay in this module; the optimizer only sees domain values

use crate::constraint::{InjectionResult, InjectionStatus};
use crate::domain::{
    ConversionRateCurve, Inventory, MarketSize, Prediction, PricingOptimizerInput,
    PricingOptimizerOutput, PricingRequest, SolverError,
};
use crate::optimizer::OptimizerError;
use tonic::Status;

pub mod pricing_optimizer {
    tonic::include_proto!("pricing_optimizer");
}

use pricing_optimizer as proto;

fn proto_to_domain_inventory(proto_inv: proto::Inventory) -> Inventory {
    Inventory::new(proto_inv.product_id, proto_inv.inventory)
}

fn proto_to_domain_market_size(proto_size: proto::MarketSize) -> MarketSize {
    MarketSize::new(proto_size.product_id, proto_size.market_size)
}

/// Convert protobuf OptimizeRequest to a domain PricingRequest
pub fn proto_to_domain_request(proto_req: proto::OptimizeRequest) -> PricingRequest {
    PricingRequest {
        product_ids: proto_req.product_ids,
        inventories: proto_req
            .inventories
            .into_iter()
            .map(proto_to_domain_inventory)
            .collect(),
        market_sizes: proto_req
            .market_sizes
            .into_iter()
            .map(proto_to_domain_market_size)
            .collect(),
        adhoc_constraints: proto_req.adhoc_constraints,
    }
}

/// Convert protobuf ValidateConstraintsRequest to a domain PricingRequest
pub fn proto_validate_to_domain_request(
    proto_req: proto::ValidateConstraintsRequest,
) -> PricingRequest {
    proto_to_domain_request(proto::OptimizeRequest {
        product_ids: proto_req.product_ids,
        inventories: proto_req.inventories,
        market_sizes: proto_req.market_sizes,
        adhoc_constraints: proto_req.adhoc_constraints,
    })
}

/// Convert the domain default input to protobuf PricingParameters
pub fn domain_to_proto_parameters(input: &PricingOptimizerInput) -> proto::PricingParameters {
    proto::PricingParameters {
        product_ids: input.product_ids.clone(),
        conversion_rate_curves: input
            .conversion_rate_curves
            .iter()
            .map(domain_to_proto_curve)
            .collect(),
        inventories: input
            .inventories
            .iter()
            .map(|i| proto::Inventory {
                product_id: i.product_id.clone(),
                inventory: i.inventory,
            })
            .collect(),
        market_sizes: input
            .market_sizes
            .iter()
            .map(|m| proto::MarketSize {
                product_id: m.product_id.clone(),
                market_size: m.market_size,
            })
            .collect(),
        adhoc_constraints: input.adhoc_constraints.clone(),
    }
}

fn domain_to_proto_curve(curve: &ConversionRateCurve) -> proto::ConversionRateCurve {
    proto::ConversionRateCurve {
        product_id: curve.product_id.clone(),
        curve: curve
            .curve
            .iter()
            .map(|p: &Prediction| proto::Prediction {
                price: p.price,
                conversion_rate: p.conversion_rate,
            })
            .collect(),
    }
}

/// Convert domain PricingOptimizerOutput to protobuf OptimizeResponse
pub fn domain_to_proto_output(
    output: PricingOptimizerOutput,
    solve_time_ms: f64,
) -> proto::OptimizeResponse {
    let total_revenue = output.total_revenue();
    proto::OptimizeResponse {
        product_results: output
            .product_results
            .into_iter()
            .map(|r| proto::ProductResult {
                product_id: r.product_id,
                price: r.price,
                revenue: r.revenue,
                sales: r.sales,
            })
            .collect(),
        total_revenue,
        solve_time_ms,
    }
}

/// Convert constraint check results to protobuf ValidateConstraintsResponse
pub fn domain_to_proto_checks(results: Vec<InjectionResult>) -> proto::ValidateConstraintsResponse {
    let all_valid = results.iter().all(InjectionResult::is_success);
    proto::ValidateConstraintsResponse {
        all_valid,
        results: results
            .into_iter()
            .map(|r| proto::ConstraintCheck {
                expression: r.expression,
                status: match r.status {
                    InjectionStatus::Success => proto::constraint_check::Status::Success as i32,
                    InjectionStatus::Error => proto::constraint_check::Status::Error as i32,
                },
                message: r.message,
            })
            .collect(),
    }
}

/// Map an optimizer failure onto a gRPC status
pub fn optimizer_error_to_status(error: OptimizerError) -> Status {
    let message = error.to_string();
    match error {
        OptimizerError::Injection { .. } => Status::invalid_argument(message),
        OptimizerError::UnknownProduct { .. } => Status::not_found(message),
        OptimizerError::InfeasibleOrUnbounded(_) => Status::failed_precondition(message),
        OptimizerError::Solver(SolverError::SolverNotAvailable(_)) => Status::unavailable(message),
        OptimizerError::InvalidModel(_)
        | OptimizerError::SolveFailed(_)
        | OptimizerError::SelectionViolated { .. }
        | OptimizerError::Solver(_) => Status::internal(message),
    }
}
