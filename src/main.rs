use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weather_proxy::{routes, services::spawn_expiry_sweep, AppState, Config};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let addr = config.addr();
    let state = AppState::new(config);

    if let Some(period) = state.config.cache_check_period() {
        spawn_expiry_sweep(state.clone(), period);
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutting down");
    };

    let (addr, server) = match warp::serve(routes(state)).try_bind_with_graceful_shutdown(addr, shutdown) {
        Ok(bound) => bound,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("API proxy server running on http://{}", addr);
    server.await;
}
