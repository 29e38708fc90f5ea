use apiv2_api::{build_app, AppState};
use apiv2_core::AppConfig;

#[tokio::main]
async fn main() {
    apiv2_observability::init();

    let config = AppConfig::from_env();

    #[cfg(feature = "s3")]
    let state = AppState::s3(&config).await;
    #[cfg(not(feature = "s3"))]
    let state = AppState::in_memory(&config);

    let app = build_app(&config, state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.expect("failed to bind listener");

    tracing::info!(addr = %listener.local_addr().unwrap(), "listening");

    axum::serve(listener, app).await.unwrap();
}
