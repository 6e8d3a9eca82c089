//! Natours booking server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ static files ──▶ security headers ──▶ dev request log
//!                                                              │
//!                     ┌────────────────────────────────────────┘
//!                     ▼
//!                rate limit (/api) ──▶ input pipeline ──▶ route groups
//!                                     body → cookies →     /            views
//!                                     mongo_sanitize →     /api/v1/tours
//!                                     xss_clean → hpp →    /api/v1/users
//!                                     request_time         /api/v1/reviews
//!                                                          /api/v1/bookings
//!                                                          └▶ not found
//!     Client Response                                          │
//!     ◀────────────── global error handler (JSON or HTML) ◀────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use natours::config::load_or_default;
use natours::http::HttpServer;
use natours::lifecycle::{signals, Shutdown};
use natours::net::tls::load_tls_config;
use natours::observability::{logging, metrics};
use natours::resources::Store;

#[derive(Parser)]
#[command(name = "natours")]
#[command(about = "Natours booking server", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "NATOURS_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;

    logging::init_logging(&config.observability, config.environment.mode);
    tracing::info!("natours v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        mode = %config.environment.mode,
        rate_limit_enabled = config.rate_limit.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = Arc::new(Store::from_config(&config.data)?);

    let shutdown = Shutdown::new();
    tokio::spawn(signals::wait_for_shutdown(shutdown.clone()));

    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, store);

    match tls {
        Some(tls) => {
            let rustls = load_tls_config(&tls).await?;
            server.run_tls(bind_address.parse()?, rustls, &shutdown).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            server.run(listener, &shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
