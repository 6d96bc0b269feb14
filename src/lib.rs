//! # Konto (User Accounts & Sessions)
//!
//! `konto` is a small account authority. It handles user registration,
//! password login, and cookie-backed session lookup over PostgreSQL.
//!
//! ## Credentials
//!
//! Passwords are hashed with Argon2id (per-call random salt) and only the
//! hash is stored. Registration input is gated by length checks before any
//! hashing or database work happens; validation and conflict failures are
//! returned as structured field errors in the response body, never as HTTP
//! faults.
//!
//! ## Sessions
//!
//! A successful registration (and, by default, a successful login) issues an
//! opaque random token in an `HttpOnly` cookie. The database stores only the
//! SHA-256 hash of the token together with the authenticated user id; `GET
//! /me` resolves the cookie back to the user, returning `null` when there is
//! no usable session.
//!
//! ## Uniqueness
//!
//! Usernames are unique. Registration relies on the database constraint and
//! maps SQLSTATE 23505 to a "username already been taken" field error; every
//! other database failure surfaces as an internal error.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
