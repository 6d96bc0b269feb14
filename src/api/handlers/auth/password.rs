//! Password hashing and verification.
//!
//! Argon2id with a fresh random salt per call. Hashing is CPU and memory
//! bound, so the async wrappers run it on the blocking pool; one request
//! hashing never stalls another.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tokio::task;

/// Hash a password using Argon2id.
pub(super) fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a stored hash.
/// A malformed hash or any mismatch verifies as false; this never raises.
pub(super) fn verify_password(hash: &str, plain: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Hash on the blocking pool. A join failure is an infrastructure fault.
pub(super) async fn hash_password_blocking(plain: String) -> Result<String> {
    task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("password hashing task failed")?
}

/// Verify on the blocking pool. A join failure is an infrastructure fault.
pub(super) async fn verify_password_blocking(hash: String, plain: String) -> Result<bool> {
    task::spawn_blocking(move || verify_password(&hash, &plain))
        .await
        .context("password verification task failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trips() {
        let hash = hash_password("CorrectHorseBatteryStaple").expect("hashing failed");
        assert!(verify_password(&hash, "CorrectHorseBatteryStaple"));
        assert!(!verify_password(&hash, "correcthorsebatterystaple"));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("hunter42").expect("hashing failed");
        let second = hash_password("hunter42").expect("hashing failed");
        assert_ne!(first, second);
        assert!(verify_password(&first, "hunter42"));
        assert!(verify_password(&second, "hunter42"));
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let hash = hash_password("hunter42").expect("hashing failed");
        assert!(!hash.contains("hunter42"));
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn malformed_hash_verifies_false() {
        assert!(!verify_password("not-a-phc-string", "hunter42"));
        assert!(!verify_password("", "hunter42"));
    }

    #[tokio::test]
    async fn blocking_wrappers_round_trip() {
        let hash = hash_password_blocking("hunter42".to_string())
            .await
            .expect("hashing failed");
        let valid = verify_password_blocking(hash.clone(), "hunter42".to_string())
            .await
            .expect("verification task failed");
        assert!(valid);
        let invalid = verify_password_blocking(hash, "wrong".to_string())
            .await
            .expect("verification task failed");
        assert!(!invalid);
    }
}
