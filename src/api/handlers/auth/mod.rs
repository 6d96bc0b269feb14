//! Account handlers and supporting modules.
//!
//! This module coordinates registration, password login, and cookie session
//! lookup.
//!
//! ## Flow
//!
//! Registration runs validate, hash, insert, session-write in that order and
//! stops at the first failing stage. Login looks the user up, verifies the
//! password, and (by default) writes the session. `/me` resolves the cookie
//! back to a user and treats every kind of absence as "no identity".
//!
//! ## Error channels
//!
//! User-facing validation and conflict failures travel as `FieldError` data
//! inside a 200 response. Store and hashing faults surface as 500 and are
//! logged; the two channels never mix.

pub(crate) mod login;
pub(crate) mod me;
pub(crate) mod register;
mod service;
mod session;
mod state;
mod store;
pub(crate) mod types;
mod utils;
mod validate;

mod password;

pub use state::AuthConfig;

#[cfg(test)]
mod tests;
