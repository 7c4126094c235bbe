// Infrastructure: Server setup and configuration

use std::net::SocketAddr;
use tonic::transport::Server;

use crate::application::mappers::pricing_optimizer::pricing_optimizer_server::PricingOptimizerServer;
use crate::application::GrpcPricingService;
use crate::domain::PricingOptimizerInput;
use crate::optimizer::PricingOptimizer;
use crate::solver::SolverFactory;

pub struct ServerConfig {
    pub address: SocketAddr,
    pub optimizer: PricingOptimizer,
    pub defaults: PricingOptimizerInput,
}

impl ServerConfig {
    pub fn new(
        address: SocketAddr,
        optimizer: PricingOptimizer,
        defaults: PricingOptimizerInput,
    ) -> Self {
        Self {
            address,
            optimizer,
            defaults,
        }
    }
}

pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Fail at startup rather than on the first request
    let solver = SolverFactory::create_from_backend(config.optimizer.config().backend)?;

    tracing::info!(
        address = %config.address,
        solver = solver.name(),
        default_products = config.defaults.product_ids.len(),
        "Starting pricing optimizer server"
    );

    let service = GrpcPricingService::new(config.optimizer, config.defaults);

    Server::builder()
        .add_service(PricingOptimizerServer::new(service))
        .serve(config.address)
        .await?;

    Ok(())
}
