//! Registration input gate. Runs before any hashing or database work.

use super::types::{
    FieldError, FIELD_PASSWORD, FIELD_USERNAME, MSG_PASSWORD_TOO_SMALL, MSG_USERNAME_TOO_SMALL,
};

/// Check registration credentials. Returns the first failure only; the
/// username check short-circuits the password check. Lengths are counted in
/// characters, not bytes.
pub(super) fn validate_credentials(username: &str, password: &str) -> Option<FieldError> {
    if username.chars().count() <= 2 {
        return Some(FieldError::new(FIELD_USERNAME, MSG_USERNAME_TOO_SMALL));
    }

    if password.chars().count() <= 3 {
        return Some(FieldError::new(FIELD_PASSWORD, MSG_PASSWORD_TOO_SMALL));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_two_character_username() {
        let error = validate_credentials("ab", "password123").expect("expected username error");
        assert_eq!(error.field, "username");
        assert_eq!(
            error.message,
            "username is too small, must be longer than 2 characters"
        );
    }

    #[test]
    fn accepts_three_character_username() {
        assert_eq!(validate_credentials("bob", "longenough"), None);
    }

    #[test]
    fn rejects_three_character_password() {
        let error = validate_credentials("validuser", "abc").expect("expected password error");
        assert_eq!(error.field, "password");
        assert_eq!(
            error.message,
            "password is too small, must be longer than 3 characters"
        );
    }

    #[test]
    fn accepts_four_character_password() {
        assert_eq!(validate_credentials("validuser", "abcd"), None);
    }

    #[test]
    fn username_failure_short_circuits_password_check() {
        // Both inputs are too short; only the username error is reported.
        let error = validate_credentials("ab", "x").expect("expected an error");
        assert_eq!(error.field, "username");
    }

    #[test]
    fn lengths_are_counted_in_characters() {
        // Three non-ASCII characters pass even though the byte length is larger.
        assert_eq!(validate_credentials("äöü", "pässwörd"), None);
        let error = validate_credentials("äö", "pässwörd").expect("expected username error");
        assert_eq!(error.field, "username");
    }

    #[test]
    fn empty_inputs_fail_on_username_first() {
        let error = validate_credentials("", "").expect("expected an error");
        assert_eq!(error.field, "username");
    }
}
