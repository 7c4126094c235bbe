// Entry points an orchestration layer calls: fetch defaults, optimize a request

use super::error::Result;
use super::PricingOptimizer;
use crate::config::Config;
use crate::domain::{PricingOptimizerInput, PricingOptimizerOutput, PricingRequest};

/// Default pricing parameters (curves, inventories, market sizes) from the `[defaults]` section
pub fn get_default_pricing_parameters(config: &Config) -> PricingOptimizerInput {
    config.defaults.clone()
}

/// Combines a request with the defaults
///
/// Product ids and constraints come from the request and conversion curves
/// always come from the defaults. An inventory or market size the request
/// does not mention falls back to the default for that product.
pub fn merge_request(
    defaults: &PricingOptimizerInput,
    request: PricingRequest,
) -> PricingOptimizerInput {
    let mut inventories = request.inventories;
    for default in &defaults.inventories {
        if !inventories.iter().any(|i| i.product_id == default.product_id) {
            inventories.push(default.clone());
        }
    }

    let mut market_sizes = request.market_sizes;
    for default in &defaults.market_sizes {
        if !market_sizes.iter().any(|m| m.product_id == default.product_id) {
            market_sizes.push(default.clone());
        }
    }

    PricingOptimizerInput {
        product_ids: request.product_ids,
        conversion_rate_curves: defaults.conversion_rate_curves.clone(),
        inventories,
        market_sizes,
        adhoc_constraints: request.adhoc_constraints,
    }
}

/// Runs the pricing optimizer for a request against the default data
pub fn optimize_pricing(
    optimizer: &PricingOptimizer,
    defaults: &PricingOptimizerInput,
    request: PricingRequest,
) -> Result<PricingOptimizerOutput> {
    let input = merge_request(defaults, request);
    optimizer.optimize(&input)
}
