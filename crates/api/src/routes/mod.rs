//! Route composition: one controller module per resource kind, nested
//! under `/apiv2/internal` (admin-only) and `/apiv2/external` (any
//! authenticated role) the way the teacher nests one router file per
//! ERP domain area under `app::routes` (spec §4.10, §6.1).

pub mod documents;
pub mod external;
pub mod games;
pub mod system;
pub mod users;

use axum::http::HeaderMap;

pub(crate) fn if_match(headers: &HeaderMap) -> Option<String> {
    headers.get(axum::http::header::IF_MATCH).and_then(|v| v.to_str().ok()).map(str::to_string)
}

pub(crate) fn if_none_match(headers: &HeaderMap) -> Option<String> {
    headers.get(axum::http::header::IF_NONE_MATCH).and_then(|v| v.to_str().ok()).map(str::to_string)
}
