use letsprice::infrastructure::{start_server, ServerConfig};
use letsprice::{get_default_pricing_parameters, Config, PricingOptimizer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional config path; built-in defaults otherwise
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    config.logging.init();

    let address = config.server.socket_addr()?;
    let optimizer = PricingOptimizer::new(config.solver.to_solver_config());
    let defaults = get_default_pricing_parameters(&config);

    start_server(ServerConfig::new(address, optimizer, defaults)).await?;

    Ok(())
}
