//! Wire shapes for the account operations.
//!
//! Message texts are part of the external contract (clients match on them),
//! so they live here as constants and are never rephrased. This includes the
//! historical "exsist" spelling.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::store::User;

pub(crate) const FIELD_USERNAME: &str = "username";
pub(crate) const FIELD_PASSWORD: &str = "password";

pub(crate) const MSG_USERNAME_TOO_SMALL: &str =
    "username is too small, must be longer than 2 characters";
pub(crate) const MSG_PASSWORD_TOO_SMALL: &str =
    "password is too small, must be longer than 3 characters";
pub(crate) const MSG_USERNAME_TAKEN: &str = "username already been taken";
pub(crate) const MSG_USERNAME_NOT_FOUND: &str = "username does not exsist";
pub(crate) const MSG_PASSWORD_INCORRECT: &str = "password is incorrect";

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CredentialsInput {
    pub username: String,
    pub password: String,
}

/// One validation or conflict failure, tied to a single input field.
/// Always returned as data in the response body, never as an HTTP fault.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub(crate) fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Public view of a user row. The password hash never leaves the store layer.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserBody {
    pub id: i64,
    pub username: String,
}

impl From<User> for UserBody {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Result of register/login: a non-empty `errors` list or a `user`, never both.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserBody>,
}

impl UserResponse {
    pub(crate) fn success(user: User) -> Self {
        Self {
            errors: None,
            user: Some(UserBody::from(user)),
        }
    }

    pub(crate) fn failure(error: FieldError) -> Self {
        Self {
            errors: Some(vec![error]),
            user: None,
        }
    }
}
