//! Top-level router assembly: CORS → content-type → authentication →
//! (per-route) role guard → handler (spec §4.9, §6.1), stacked with
//! `tower::ServiceBuilder` the way the teacher layers `TraceLayer` around
//! its own router.

use std::sync::Arc;

use apiv2_auth::{HttpKeySource, JwksCache, JwksJwtValidator, JwtValidator};
use apiv2_core::AppConfig;
use axum::middleware::from_fn_with_state;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::{self, AuthState, ContentTypeState, CorsState, RoleGuardState};
use crate::routes;
use crate::state::AppState;

const ADMIN_ROLES: &[&str] = &["admin"];
const SESSION_COOKIE: &str = "session";

/// Builds the full router: `/health` is reachable unauthenticated;
/// `/apiv2/external/*` requires any valid token; `/apiv2/internal/*`
/// additionally requires the `admin` role.
pub fn build_app(config: &AppConfig, state: AppState) -> Router {
    let jwks = Arc::new(JwksCache::new(HttpKeySource::new(config.jwks_url.clone()), config.jwks_cache_ttl));
    let validator: Arc<dyn JwtValidator> =
        Arc::new(JwksJwtValidator::new(config.user_pool_issuer.clone(), config.client_id.clone(), jwks));

    build_app_with_validator(config, state, validator)
}

/// Same assembly as `build_app`, but with the token validator supplied
/// directly instead of wired from `config.jwks_url` — lets tests swap in a
/// `StaticKeySource`-backed validator and avoid a real JWKS fetch.
pub fn build_app_with_validator(config: &AppConfig, state: AppState, validator: Arc<dyn JwtValidator>) -> Router {
    let cors_state = CorsState { allow_origin: config.cors_origin.clone() };
    let content_type_state = ContentTypeState { max_body_bytes: config.max_body_bytes };
    let auth_state = AuthState { validator, session_cookie: SESSION_COOKIE };
    let admin_guard = RoleGuardState { allowed: ADMIN_ROLES };

    let internal = Router::new()
        .nest("/documents", routes::documents::router())
        .nest("/users", routes::users::router())
        .nest("/games", routes::games::router())
        .route_layer(from_fn_with_state(admin_guard, middleware::role_guard));

    let authenticated = Router::new()
        .nest("/internal", internal)
        .nest("/external", routes::external::router())
        .route_layer(from_fn_with_state(auth_state, middleware::auth_middleware));

    Router::new()
        .nest("/apiv2", authenticated)
        .merge(routes::system::router())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn_with_state(cors_state, middleware::cors_middleware))
                .layer(from_fn_with_state(content_type_state, middleware::content_type_middleware)),
        )
}
