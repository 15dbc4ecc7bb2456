use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use portal_auth::{
    AppState,
    config::{Config, Environment},
    routes,
    token::SystemClock,
};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // A missing secret in production stops startup here.
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!("Loaded configuration: {:?}", config);

    let state =
        AppState::new(config.clone(), Arc::new(SystemClock)).expect("Failed to build token signer");

    let router = routes::app(state);

    let router = if config.environment == Environment::Development {
        tracing::debug!("Adding permissive CORS layer for development");
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router,
    )
    .await
    .expect("Failed to start server");
}
