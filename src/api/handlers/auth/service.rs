//! The account flows: registration, login, and current-session lookup.
//!
//! Each flow is written against the `UserStore` seam and an explicit
//! `SessionState` slot so the decision logic stays independent of HTTP and
//! PostgreSQL. Validation and conflict failures come back as `FieldError`
//! data inside the response; store or hashing faults propagate as errors and
//! are never translated into field errors.

use anyhow::Result;

use super::password::{hash_password_blocking, verify_password_blocking};
use super::session::SessionState;
use super::state::AuthConfig;
use super::store::{InsertOutcome, User, UserStore};
use super::types::{
    FieldError, UserResponse, FIELD_PASSWORD, FIELD_USERNAME, MSG_PASSWORD_INCORRECT,
    MSG_USERNAME_NOT_FOUND, MSG_USERNAME_TAKEN,
};
use super::validate::validate_credentials;

/// Register a new user.
///
/// Invalid input returns the single field error without touching the hasher
/// or the store. A duplicate username reported by the store becomes a field
/// error; on success the new user id is written into the session slot.
pub(super) async fn register(
    store: &dyn UserStore,
    session: &mut SessionState,
    username: &str,
    password: &str,
) -> Result<UserResponse> {
    if let Some(error) = validate_credentials(username, password) {
        return Ok(UserResponse::failure(error));
    }

    let password_hash = hash_password_blocking(password.to_string()).await?;

    match store.insert(username, &password_hash).await? {
        InsertOutcome::Created(user) => {
            // Keep them logged in right away.
            session.set_user_id(user.id);
            Ok(UserResponse::success(user))
        }
        InsertOutcome::DuplicateUsername => Ok(UserResponse::failure(FieldError::new(
            FIELD_USERNAME,
            MSG_USERNAME_TAKEN,
        ))),
    }
}

/// Log an existing user in.
///
/// No pre-validation here; any username goes straight to the store lookup.
/// The session write on success is configuration-gated.
pub(super) async fn login(
    store: &dyn UserStore,
    session: &mut SessionState,
    config: &AuthConfig,
    username: &str,
    password: &str,
) -> Result<UserResponse> {
    let Some(user) = store.find_by_username(username).await? else {
        return Ok(UserResponse::failure(FieldError::new(
            FIELD_USERNAME,
            MSG_USERNAME_NOT_FOUND,
        )));
    };

    let valid = verify_password_blocking(user.password_hash.clone(), password.to_string()).await?;
    if !valid {
        return Ok(UserResponse::failure(FieldError::new(
            FIELD_PASSWORD,
            MSG_PASSWORD_INCORRECT,
        )));
    }

    if config.login_establishes_session() {
        session.set_user_id(user.id);
    }

    Ok(UserResponse::success(user))
}

/// Resolve the session slot to a user.
///
/// An empty slot is not an error, and neither is an id that no longer
/// resolves (the row may have been deleted out-of-band); both are "no
/// identity".
pub(super) async fn current_user(
    store: &dyn UserStore,
    session: &SessionState,
) -> Result<Option<User>> {
    let Some(user_id) = session.user_id() else {
        return Ok(None);
    };
    store.find_by_id(user_id).await
}
