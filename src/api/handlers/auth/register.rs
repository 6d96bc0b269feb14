use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use tracing::error;

use super::service;
use super::session::{self, SessionState};
use super::state::AuthConfig;
use super::store::PgUserStore;
use super::types::{CredentialsInput, UserResponse};

#[utoipa::path(
    post,
    path = "/register",
    request_body = CredentialsInput,
    responses(
        (status = 200, description = "Registration outcome: a user, or field errors for invalid or taken input", body = UserResponse),
        (status = 400, description = "Missing payload", body = String),
        (status = 500, description = "Store or hashing failure")
    ),
    tag = "account"
)]
pub async fn register(
    pool: Extension<PgPool>,
    config: Extension<AuthConfig>,
    payload: Option<Json<CredentialsInput>>,
) -> impl IntoResponse {
    let Some(Json(input)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let store = PgUserStore::new(pool.0.clone());
    let mut session_state = SessionState::empty();

    let response: UserResponse =
        match service::register(&store, &mut session_state, &input.username, &input.password).await
        {
            Ok(response) => response,
            Err(err) => {
                error!("Registration failed: {err}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

    // A populated slot means the user was persisted; bind it to a cookie.
    let mut response_headers = HeaderMap::new();
    if let Some(user_id) = session_state.user_id() {
        match session::establish(&pool, &config, user_id).await {
            Ok(cookie) => {
                response_headers.insert(SET_COOKIE, cookie);
            }
            Err(err) => {
                error!("Failed to establish session: {err}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    (StatusCode::OK, response_headers, Json(response)).into_response()
}
