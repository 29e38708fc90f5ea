//! HTTP plumbing: a small response builder and the RFC 7807 problem-body
//! constructor (spec §4.7, §6.1, §7). `axum::http::HeaderMap` is already
//! case-insensitive and `axum::extract::Path`/`Query` already provide
//! `params`/`query`, so this module only adds the fluent response helpers
//! the spec's framework-agnostic `HttpResponse` describes.

use apiv2_core::DomainError;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

/// RFC 7807 problem body.
#[derive(Debug, Serialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub title: &'static str,
    pub status: u16,
    pub detail: String,
    pub instance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Problem {
    pub fn from_domain_error(error: &DomainError, instance: impl Into<String>) -> Self {
        let field = match error {
            DomainError::Validation { field, .. } => field.clone(),
            _ => None,
        };
        Self {
            type_: "about:blank",
            title: error.title(),
            status: error.status_code(),
            detail: error.to_string(),
            instance: instance.into(),
            field,
        }
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self)).into_response();
        response
            .headers_mut()
            .insert(axum::http::header::CONTENT_TYPE, HeaderValue::from_static("application/problem+json"));
        response
    }
}

/// Turns a domain-level failure (logged once, per §4.1) into the RFC 7807
/// response the controller returns. `NotModified` is handled separately by
/// callers since it carries no body.
pub fn problem_response(error: DomainError, instance: &str) -> Response {
    if error.status_code() >= 500 {
        tracing::error!(instance, error = %error, "request failed");
    } else {
        tracing::warn!(instance, error = %error, "request rejected");
    }
    Problem::from_domain_error(&error, instance).into_response()
}

/// Fluent builder mirroring the spec's `HttpResponse`: `.withETag()`,
/// `.withLocation()`, `.withCacheControl()`, plus per-status constructors.
pub struct ResponseBuilder {
    status: StatusCode,
    body: Option<serde_json::Value>,
    headers: Vec<(axum::http::HeaderName, HeaderValue)>,
}

impl ResponseBuilder {
    pub fn status(status: StatusCode) -> Self {
        Self { status, body: None, headers: Vec::new() }
    }

    pub fn ok(body: impl Serialize) -> Self {
        Self::status(StatusCode::OK).with_body(body)
    }

    pub fn created(body: impl Serialize) -> Self {
        Self::status(StatusCode::CREATED).with_body(body)
    }

    pub fn no_content() -> Self {
        Self::status(StatusCode::NO_CONTENT)
    }

    pub fn not_modified() -> Self {
        Self::status(StatusCode::NOT_MODIFIED)
    }

    pub fn with_body(mut self, body: impl Serialize) -> Self {
        self.body = Some(serde_json::to_value(body).unwrap_or(json!(null)));
        self
    }

    /// Quotes the etag if the caller passed an unquoted value.
    pub fn with_etag(mut self, etag: &str) -> Self {
        let quoted = if etag.starts_with('"') { etag.to_string() } else { format!("\"{etag}\"") };
        if let Ok(value) = HeaderValue::from_str(&quoted) {
            self.headers.push((axum::http::header::ETAG, value));
        }
        self
    }

    pub fn with_location(mut self, path: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(path) {
            self.headers.push((axum::http::header::LOCATION, value));
        }
        self
    }

    pub fn with_cache_control(mut self, directive: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(directive) {
            self.headers.push((axum::http::header::CACHE_CONTROL, value));
        }
        self
    }
}

impl IntoResponse for ResponseBuilder {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        };
        let headers = response.headers_mut();
        for (name, value) in self.headers {
            headers.insert(name, value);
        }
        response
    }
}
