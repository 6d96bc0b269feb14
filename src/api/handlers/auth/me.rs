use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use tracing::error;

use super::service;
use super::session;
use super::store::PgUserStore;
use super::types::UserBody;

#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "The current session's user, or null when there is no usable session", body = UserBody),
        (status = 500, description = "Store failure")
    ),
    tag = "account"
)]
pub async fn me(headers: HeaderMap, pool: Extension<PgPool>) -> impl IntoResponse {
    // Missing or expired cookies resolve to an empty slot, not an error.
    let session_state = match session::resolve(&headers, &pool).await {
        Ok(state) => state,
        Err(err) => {
            error!("Failed to resolve session: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let store = PgUserStore::new(pool.0.clone());
    match service::current_user(&store, &session_state).await {
        Ok(user) => (StatusCode::OK, Json(user.map(UserBody::from))).into_response(),
        Err(err) => {
            error!("Failed to fetch current user: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
