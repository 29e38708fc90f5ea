//! The middleware chain: CORS → content-type → authentication → (per-route)
//! role guard (spec §4.9), stacked with `axum::middleware::from_fn[_with_state]`
//! the way the teacher stacks `auth_middleware`.

use std::sync::Arc;

use apiv2_auth::{AuthenticatedUser, JwtValidator};
use apiv2_core::AppConfig;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::httpx::problem_response;

#[derive(Clone)]
pub struct CorsState {
    pub allow_origin: String,
}

const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "content-type, authorization, if-match, if-none-match";

/// Answers `OPTIONS` preflight directly (204, no body, bypasses
/// authentication) and annotates every other response — including error
/// responses — with `Access-Control-Allow-Origin` (spec §7).
pub async fn cors_middleware(
    State(state): State<CorsState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if req.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(&state, response.headers_mut());
        return response;
    }

    let mut response = next.run(req).await;
    apply_cors_headers(&state, response.headers_mut());
    response
}

fn apply_cors_headers(state: &CorsState, headers: &mut HeaderMap) {
    if let Ok(origin) = HeaderValue::from_str(&state.allow_origin) {
        headers.insert(axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
    headers.insert(axum::http::header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(axum::http::header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));
}

#[derive(Clone)]
pub struct ContentTypeState {
    pub max_body_bytes: usize,
}

/// For mutating methods, requires `Content-Type: application/json` and a
/// body within the configured size cap. The size check is a fast-path on
/// `Content-Length`; a client that lies about it is still bounded by the
/// store/serde layer rejecting the oversized body downstream.
pub async fn content_type_middleware(
    State(state): State<ContentTypeState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let mutating = matches!(*req.method(), Method::POST | Method::PUT | Method::PATCH);
    if mutating {
        let content_type_ok = req
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim() == "application/json")
            .unwrap_or(false);
        if !content_type_ok {
            return problem_response(apiv2_core::DomainError::UnsupportedMediaType, req.uri().path());
        }

        let too_large = req
            .headers()
            .get(axum::http::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok())
            .map(|len| len > state.max_body_bytes)
            .unwrap_or(false);
        if too_large {
            return problem_response(apiv2_core::DomainError::PayloadTooLarge, req.uri().path());
        }
    }

    next.run(req).await
}

#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<dyn JwtValidator>,
    pub session_cookie: &'static str,
}

/// Extracts a bearer token from `Authorization` or the configured cookie,
/// verifies it, and attaches the resulting `AuthenticatedUser` to the
/// request's extensions for downstream extractors (spec §4.9).
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_token(req.headers(), state.session_cookie) {
        Some(token) => token,
        None => return problem_response(apiv2_core::DomainError::Unauthorized, req.uri().path()),
    };

    match state.validator.validate(&token).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(_) => problem_response(apiv2_core::DomainError::Unauthorized, req.uri().path()),
    }
}

fn extract_token(headers: &HeaderMap, session_cookie: &str) -> Option<String> {
    if let Some(header) = headers.get(axum::http::header::AUTHORIZATION) {
        let header = header.to_str().ok()?;
        let token = header.strip_prefix("Bearer ")?.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    let cookie_header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|kv| {
        let (name, value) = kv.trim().split_once('=')?;
        (name == session_cookie).then(|| value.to_string())
    })
}

#[derive(Clone)]
pub struct RoleGuardState {
    pub allowed: &'static [&'static str],
}

/// Per-route role guard: `Forbidden` when the authenticated user's role is
/// not in the allowed set (spec §4.9).
pub async fn role_guard(
    State(state): State<RoleGuardState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let user = req.extensions().get::<AuthenticatedUser>().cloned();
    match user {
        Some(user) if state.allowed.contains(&user.role.as_str()) => next.run(req).await,
        Some(_) => problem_response(apiv2_core::DomainError::Forbidden, req.uri().path()),
        None => problem_response(apiv2_core::DomainError::Unauthorized, req.uri().path()),
    }
}

pub fn default_config_from(config: &AppConfig) -> (CorsState, ContentTypeState) {
    (CorsState { allow_origin: config.cors_origin.clone() }, ContentTypeState { max_body_bytes: config.max_body_bytes })
}
