//! Lambda entry point: wraps the same router `main.rs` serves over TCP with
//! `lambda_http`'s tower adapter, so the handler logic never forks between
//! deployment targets (spec §4.7 "a `lambda` feature binary").

use apiv2_api::{build_app, AppState};
use apiv2_core::AppConfig;

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    apiv2_observability::init();

    let config = AppConfig::from_env();

    #[cfg(feature = "s3")]
    let state = AppState::s3(&config).await;
    #[cfg(not(feature = "s3"))]
    let state = AppState::in_memory(&config);

    let app = build_app(&config, state);

    lambda_http::run(app).await
}
