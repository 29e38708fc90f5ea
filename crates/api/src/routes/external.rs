//! `/apiv2/external` controller: the small surface reachable by any
//! authenticated role, not just admins (spec §4.10, §6.1 "GET /me").

use apiv2_auth::AuthenticatedUser;
use apiv2_core::Identifier;
use axum::extract::{Extension, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::httpx::{problem_response, ResponseBuilder};
use crate::services::GetResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

async fn me(State(state): State<AppState>, Extension(user): Extension<AuthenticatedUser>) -> Response {
    let id = match Identifier::parse(user.user_id.clone()) {
        Ok(id) => id,
        Err(e) => return problem_response(e, "/apiv2/external/me"),
    };
    match state.users.get(&id, None).await {
        Ok(GetResult::Found(resp)) => ResponseBuilder::ok(&resp).with_etag(&resp.etag).into_response(),
        Ok(GetResult::NotModified { .. }) => {
            unreachable!("If-None-Match is never supplied here, so NotModified is never returned")
        }
        Err(e) => problem_response(e, "/apiv2/external/me"),
    }
}
