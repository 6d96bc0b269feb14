//! Cookie-backed session plumbing.
//!
//! `SessionState` is the per-request session slot the account flows write
//! into: one optional numeric user id, nothing else. The HTTP layer binds
//! the slot to an opaque random cookie token whose SHA-256 hash is stored
//! server-side; never compare raw tokens against the database.

use anyhow::{anyhow, Context, Result};
use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use sqlx::{PgPool, Row};
use tracing::Instrument;

use super::state::AuthConfig;
use super::utils::{generate_session_token, hash_session_token, is_unique_violation};

const SESSION_COOKIE_NAME: &str = "konto_session";

/// The session slot for the current request chain.
/// Empty means unauthenticated; the flows only ever write on auth success.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionState {
    user_id: Option<i64>,
}

impl SessionState {
    #[must_use]
    pub const fn empty() -> Self {
        Self { user_id: None }
    }

    #[must_use]
    pub const fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub(super) fn set_user_id(&mut self, user_id: i64) {
        self.user_id = Some(user_id);
    }
}

/// Resolve the presented cookie into a session slot.
///
/// A missing, unknown, or expired cookie yields an empty slot; only a store
/// failure is an error.
pub(super) async fn resolve(headers: &HeaderMap, pool: &PgPool) -> Result<SessionState> {
    let Some(token) = extract_session_token(headers) else {
        return Ok(SessionState::empty());
    };
    let token_hash = hash_session_token(&token);
    let user_id = lookup_session(pool, &token_hash).await?;
    Ok(SessionState { user_id })
}

/// Persist a freshly authenticated session and return the cookie to set.
pub(super) async fn establish(
    pool: &PgPool,
    config: &AuthConfig,
    user_id: i64,
) -> Result<HeaderValue> {
    let token = insert_session(pool, user_id, config.session_ttl_seconds()).await?;
    session_cookie(config, &token).context("failed to build session cookie")
}

/// Build a secure `HttpOnly` cookie for the session token.
pub(super) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    // Only mark cookies secure when the frontend is served over HTTPS.
    let secure = config.session_cookie_secure();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(super) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}

async fn insert_session(pool: &PgPool, user_id: i64, ttl_seconds: i64) -> Result<String> {
    // Generate a random token, store only its hash, and return the raw value
    // so the caller can set the session cookie.
    let query = r"
        INSERT INTO user_sessions (user_id, session_hash, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );

    for _ in 0..3 {
        let token = generate_session_token()?;
        let token_hash = hash_session_token(&token);
        let result = sqlx::query(query)
            .bind(user_id)
            .bind(token_hash)
            .bind(ttl_seconds)
            .execute(pool)
            .instrument(span.clone())
            .await;

        match result {
            Ok(_) => return Ok(token),
            Err(err) if is_unique_violation(&err) => {}
            Err(err) => return Err(err).context("failed to insert session"),
        }
    }

    Err(anyhow!("failed to generate unique session token"))
}

async fn lookup_session(pool: &PgPool, token_hash: &[u8]) -> Result<Option<i64>> {
    // Only accept unexpired sessions.
    let query = r"
        SELECT user_id
        FROM user_sessions
        WHERE session_hash = $1
          AND expires_at > NOW()
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token_hash)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup session")?;

    Ok(row.map(|row| row.get("user_id")))
}
