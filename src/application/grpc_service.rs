use std::sync::Arc;
use std::time::Instant;

use tonic::{Request, Response, Status};

use super::mappers::{self, pricing_optimizer as proto};
use crate::domain::PricingOptimizerInput;
use crate::optimizer::{merge_request, optimize_pricing, PricingOptimizer};

/// gRPC service implementation
#[derive(Clone)]
pub struct GrpcPricingService {
    optimizer: PricingOptimizer,
    defaults: Arc<PricingOptimizerInput>,
}

impl GrpcPricingService {
    pub fn new(optimizer: PricingOptimizer, defaults: PricingOptimizerInput) -> Self {
        Self {
            optimizer,
            defaults: Arc::new(defaults),
        }
    }
}

#[tonic::async_trait]
impl proto::pricing_optimizer_server::PricingOptimizer for GrpcPricingService {
    async fn optimize(
        &self,
        request: Request<proto::OptimizeRequest>,
    ) -> Result<Response<proto::OptimizeResponse>, Status> {
        let domain_request = mappers::proto_to_domain_request(request.into_inner());
        tracing::info!(
            products = domain_request.product_ids.len(),
            constraints = domain_request.adhoc_constraints.len(),
            "Optimize request received"
        );

        let optimizer = self.optimizer.clone();
        let defaults = Arc::clone(&self.defaults);

        // Solving is CPU bound and blocking
        let started = Instant::now();
        let output = tokio::task::spawn_blocking(move || {
            optimize_pricing(&optimizer, &defaults, domain_request)
        })
        .await
        .map_err(|e| Status::internal(format!("Optimization task failed: {}", e)))?
        .map_err(|e| {
            tracing::warn!(error = %e, "Optimization failed");
            mappers::optimizer_error_to_status(e)
        })?;
        let solve_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        tracing::info!(
            revenue = output.total_revenue(),
            solve_time_ms,
            "Optimize request completed"
        );

        Ok(Response::new(mappers::domain_to_proto_output(
            output,
            solve_time_ms,
        )))
    }

    async fn get_default_parameters(
        &self,
        _request: Request<proto::Empty>,
    ) -> Result<Response<proto::PricingParameters>, Status> {
        Ok(Response::new(mappers::domain_to_proto_parameters(
            &self.defaults,
        )))
    }

    async fn validate_constraints(
        &self,
        request: Request<proto::ValidateConstraintsRequest>,
    ) -> Result<Response<proto::ValidateConstraintsResponse>, Status> {
        let domain_request = mappers::proto_validate_to_domain_request(request.into_inner());
        let optimizer = self.optimizer.clone();
        let defaults = Arc::clone(&self.defaults);

        let results = tokio::task::spawn_blocking(move || {
            let input = merge_request(&defaults, domain_request);
            optimizer.validate_constraints(&input)
        })
        .await
        .map_err(|e| Status::internal(format!("Validation task failed: {}", e)))?
        .map_err(mappers::optimizer_error_to_status)?;

        tracing::debug!(
            checked = results.len(),
            failed = results.iter().filter(|r| !r.is_success()).count(),
            "Constraints validated"
        );

        Ok(Response::new(mappers::domain_to_proto_checks(results)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConversionRateCurve, Inventory, MarketSize, Prediction};
    use proto::pricing_optimizer_server::PricingOptimizer as _;
    use tonic::Code;

    fn service() -> GrpcPricingService {
        let defaults = PricingOptimizerInput::new(
            vec!["A".into()],
            vec![ConversionRateCurve::new(
                "A",
                vec![
                    Prediction::new(1.0, 0.5),
                    Prediction::new(2.0, 0.2),
                    Prediction::new(3.0, 0.05),
                ],
            )],
            vec![Inventory::new("A", 100)],
            vec![MarketSize::new("A", 1000)],
        );
        GrpcPricingService::new(PricingOptimizer::default(), defaults)
    }

    #[tokio::test]
    async fn test_default_parameters() {
        let response = service()
            .get_default_parameters(Request::new(proto::Empty {}))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.product_ids, vec!["A".to_string()]);
        assert_eq!(response.conversion_rate_curves[0].curve.len(), 3);
    }

    #[tokio::test]
    async fn test_validate_reports_each_expression() {
        let response = service()
            .validate_constraints(Request::new(proto::ValidateConstraintsRequest {
                product_ids: vec!["A".into()],
                adhoc_constraints: vec![
                    "product_price['A'] <= 2".into(),
                    "product_price['A'] < 2".into(),
                ],
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!response.all_valid);
        assert_eq!(response.results.len(), 2);
    }

    #[tokio::test]
    async fn test_deeply_nested_expression_is_reported() {
        let nested = format!("{}1{} <= 1", "(".repeat(10_000), ")".repeat(10_000));
        let response = service()
            .validate_constraints(Request::new(proto::ValidateConstraintsRequest {
                product_ids: vec!["A".into()],
                adhoc_constraints: vec![nested],
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!response.all_valid);
        assert_eq!(
            response.results[0].status,
            proto::constraint_check::Status::Error as i32
        );
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let status = service()
            .optimize(Request::new(proto::OptimizeRequest {
                product_ids: vec!["Z".into()],
                ..Default::default()
            }))
            .await
            .err()
            .expect("unknown product must fail");
        assert_eq!(status.code(), Code::NotFound);
    }

    #[cfg(feature = "microlp")]
    #[tokio::test]
    async fn test_optimize_picks_best_price() {
        let response = service()
            .optimize(Request::new(proto::OptimizeRequest {
                product_ids: vec!["A".into()],
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.product_results[0].price, 2.0);
        assert_eq!(response.product_results[0].sales, 100);
        assert!((response.total_revenue - 200.0).abs() < 1e-6);
    }
}
