mod error;
mod handlers;
mod metrics;
mod routes;
mod security;
mod validation;

use judge_relay_common::config::Config;
use judge_relay_engine::{Judge0Client, Orchestrator};
use security::RateLimiter;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

pub struct AppState {
    pub orchestrator: Orchestrator,
    pub config: Config,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    info!("Judge relay API booting...");

    let config = Config::from_env();

    let client = Judge0Client::new(&config).expect("Failed to create Judge0 client");

    info!(
        judge0_url = %config.judge0_url,
        timeout_secs = config.request_timeout.as_secs(),
        max_batch_size = config.max_batch_size,
        "Execution backend configured"
    );

    info!(
        max_requests = config.rate_limit_max,
        window_secs = config.rate_limit_window.as_secs(),
        "Per-client rate limit configured"
    );
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_max,
        config.rate_limit_window,
    ));

    let addr = config.bind_addr();
    let state = Arc::new(AppState {
        orchestrator: Orchestrator::new(Arc::new(client)),
        config,
    });

    // Build router
    let app = routes::routes(limiter).with_state(state);

    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!("HTTP server listening on {}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            warn!("Received shutdown signal, finishing in-flight requests...");
        })
        .await
        .expect("Server error");

    info!("API shutdown complete");
}
