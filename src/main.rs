//! This file defines the climate-api binary entry point.

use climate_api::app;
use climate_api::cli;
use climate_api::metrics;
use climate_api::server;
use climate_api::tracing;

use std::error::Error;
use std::process::exit;

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing(&args);
    metrics::register_metrics();
    let service = match app::service(&args) {
        Ok(service) => service,
        Err(err) => {
            ::tracing::error!("Failed to start climate API: {}", err);
            let mut current = err.source();
            while let Some(source) = current {
                ::tracing::error!("Caused by: {}", source);
                current = source.source();
            }
            tracing::shutdown_tracing();
            exit(1)
        }
    };
    server::serve(&args, service).await;
    tracing::shutdown_tracing();
}
