// Example client for the pricing optimizer gRPC service
//
// Start the server with the sample configuration first:
//   cargo run --features server --bin letsprice-server -- config/letsprice.toml
//
// The client fetches the default parameters, checks two constraint
// expressions, then optimizes with and without a price-ordering constraint.

use tonic::Request;

pub mod pricing_optimizer {
    tonic::include_proto!("pricing_optimizer");
}

use pricing_optimizer::{
    constraint_check::Status, pricing_optimizer_client::PricingOptimizerClient, Empty,
    OptimizeRequest, OptimizeResponse, ValidateConstraintsRequest,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = PricingOptimizerClient::connect("http://127.0.0.1:50051").await?;

    let defaults = client
        .get_default_parameters(Request::new(Empty {}))
        .await?
        .into_inner();

    println!("=== Default Parameters ===\n");
    for curve in &defaults.conversion_rate_curves {
        let prices: Vec<String> = curve
            .curve
            .iter()
            .map(|p| format!("{:.2} ({:.0}%)", p.price, p.conversion_rate * 100.0))
            .collect();
        println!("  {:<12} {}", curve.product_id, prices.join(", "));
    }

    let product_ids = defaults.product_ids.clone();
    let ordering = match product_ids.as_slice() {
        [first, second, ..] => format!(
            "product_price['{}'] <= product_price['{}']",
            first, second
        ),
        _ => {
            println!("\nNeed at least two default products for this demo");
            return Ok(());
        }
    };

    println!("\n=== Constraint Validation ===\n");
    let checks = client
        .validate_constraints(Request::new(ValidateConstraintsRequest {
            product_ids: product_ids.clone(),
            adhoc_constraints: vec![
                ordering.clone(),
                format!("product_price['{}'] < 2", product_ids[0]),
            ],
            ..Default::default()
        }))
        .await?
        .into_inner();

    for check in &checks.results {
        let ok = check.status == Status::Success as i32;
        println!(
            "  {} {}{}",
            if ok { "✓" } else { "✗" },
            check.expression,
            if ok { String::new() } else { format!("\n      {}", check.message) }
        );
    }

    println!("\n=== Unconstrained ===\n");
    let response = client
        .optimize(Request::new(OptimizeRequest {
            product_ids: product_ids.clone(),
            ..Default::default()
        }))
        .await?
        .into_inner();
    print_response(&response);

    println!("\n=== With {} ===\n", ordering);
    match client
        .optimize(Request::new(OptimizeRequest {
            product_ids,
            adhoc_constraints: vec![ordering],
            ..Default::default()
        }))
        .await
    {
        Ok(response) => print_response(&response.into_inner()),
        Err(status) => println!("  ✗ {:?}: {}", status.code(), status.message()),
    }

    Ok(())
}

fn print_response(response: &OptimizeResponse) {
    println!("  {:<12} {:>8} {:>8} {:>10}", "Product", "Price", "Sales", "Revenue");
    for result in &response.product_results {
        println!(
            "  {:<12} {:>8.2} {:>8} {:>10.2}",
            result.product_id, result.price, result.sales, result.revenue
        );
    }
    println!(
        "\n  Total revenue: {:.2} (solved in {:.1} ms)",
        response.total_revenue, response.solve_time_ms
    );
}
