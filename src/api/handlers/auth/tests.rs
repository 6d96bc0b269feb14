//! Flow tests for the account operations, run against an in-memory store
//! double that counts calls.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::service;
use super::session::SessionState;
use super::state::AuthConfig;
use super::store::{InsertOutcome, User, UserStore};
use super::types::UserResponse;

struct MemoryStore {
    users: Mutex<Vec<User>>,
    next_id: AtomicI64,
    find_by_id_calls: AtomicUsize,
    find_by_username_calls: AtomicUsize,
    insert_calls: AtomicUsize,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            find_by_id_calls: AtomicUsize::new(0),
            find_by_username_calls: AtomicUsize::new(0),
            insert_calls: AtomicUsize::new(0),
        }
    }

    fn store_calls(&self) -> usize {
        self.find_by_id_calls.load(Ordering::SeqCst)
            + self.find_by_username_calls.load(Ordering::SeqCst)
            + self.insert_calls.load(Ordering::SeqCst)
    }

    fn rows_for(&self, username: &str) -> usize {
        self.users
            .lock()
            .expect("users lock poisoned")
            .iter()
            .filter(|user| user.username == username)
            .count()
    }

    fn stored_hash(&self, username: &str) -> Option<String> {
        self.users
            .lock()
            .expect("users lock poisoned")
            .iter()
            .find(|user| user.username == username)
            .map(|user| user.password_hash.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        self.find_by_id_calls.fetch_add(1, Ordering::SeqCst);
        let users = self.users.lock().expect("users lock poisoned");
        Ok(users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_by_username_calls.fetch_add(1, Ordering::SeqCst);
        let users = self.users.lock().expect("users lock poisoned");
        Ok(users.iter().find(|user| user.username == username).cloned())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<InsertOutcome> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().expect("users lock poisoned");
        if users.iter().any(|user| user.username == username) {
            return Ok(InsertOutcome::DuplicateUsername);
        }
        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.push(user.clone());
        Ok(InsertOutcome::Created(user))
    }
}

/// Store double whose every call fails, for the fatal error channel.
struct FailingStore;

#[async_trait]
impl UserStore for FailingStore {
    async fn find_by_id(&self, _id: i64) -> Result<Option<User>> {
        Err(anyhow!("store unavailable"))
    }

    async fn find_by_username(&self, _username: &str) -> Result<Option<User>> {
        Err(anyhow!("store unavailable"))
    }

    async fn insert(&self, _username: &str, _password_hash: &str) -> Result<InsertOutcome> {
        Err(anyhow!("store unavailable"))
    }
}

/// Errors and user must never both be present (or both absent).
fn assert_exclusive(response: &UserResponse) {
    assert!(
        response.errors.is_some() ^ response.user.is_some(),
        "response must carry errors xor user: {response:?}"
    );
}

fn single_error(response: &UserResponse) -> (String, String) {
    assert_exclusive(response);
    let errors = response.errors.as_ref().expect("expected errors");
    assert_eq!(errors.len(), 1, "expected exactly one field error");
    (errors[0].field.clone(), errors[0].message.clone())
}

#[tokio::test]
async fn register_rejects_short_username_without_store_calls() {
    let store = MemoryStore::new();
    let mut session = SessionState::empty();

    let response = service::register(&store, &mut session, "ab", "password123")
        .await
        .expect("register failed");

    let (field, message) = single_error(&response);
    assert_eq!(field, "username");
    assert_eq!(
        message,
        "username is too small, must be longer than 2 characters"
    );
    assert_eq!(store.store_calls(), 0);
    assert_eq!(session.user_id(), None);
}

#[tokio::test]
async fn register_rejects_short_password_without_store_calls() {
    let store = MemoryStore::new();
    let mut session = SessionState::empty();

    let response = service::register(&store, &mut session, "validuser", "abc")
        .await
        .expect("register failed");

    let (field, message) = single_error(&response);
    assert_eq!(field, "password");
    assert_eq!(
        message,
        "password is too small, must be longer than 3 characters"
    );
    assert_eq!(store.store_calls(), 0);
    assert_eq!(session.user_id(), None);
}

#[tokio::test]
async fn register_assigns_id_and_sets_session() {
    let store = MemoryStore::new();
    let mut session = SessionState::empty();

    let response = service::register(&store, &mut session, "alice", "hunter42")
        .await
        .expect("register failed");

    assert_exclusive(&response);
    let user = response.user.expect("expected a user");
    assert_eq!(user.id, 1);
    assert_eq!(user.username, "alice");
    assert_eq!(session.user_id(), Some(1));

    // Stored secret is a hash, not the password.
    let hash = store.stored_hash("alice").expect("user row missing");
    assert_ne!(hash, "hunter42");
    assert!(hash.starts_with("$argon2"));
}

#[tokio::test]
async fn register_then_login_round_trip() {
    let store = MemoryStore::new();
    let config = AuthConfig::new();

    let mut register_session = SessionState::empty();
    let registered = service::register(&store, &mut register_session, "alice", "hunter42")
        .await
        .expect("register failed");
    let registered_user = registered.user.expect("expected a user");

    let mut login_session = SessionState::empty();
    let logged_in = service::login(
        &store,
        &mut login_session,
        &config,
        "alice",
        "hunter42",
    )
    .await
    .expect("login failed");

    assert_exclusive(&logged_in);
    let login_user = logged_in.user.expect("expected a user");
    assert_eq!(login_user.id, registered_user.id);
    assert_eq!(login_user.username, registered_user.username);
    assert_eq!(login_session.user_id(), Some(registered_user.id));

    // The session written by login resolves back to the same identity.
    let current = service::current_user(&store, &login_session)
        .await
        .expect("lookup failed")
        .expect("expected an identity");
    assert_eq!(current.id, registered_user.id);
    assert_eq!(current.username, registered_user.username);
}

#[tokio::test]
async fn register_duplicate_username_is_a_field_error() {
    let store = MemoryStore::new();

    let mut first_session = SessionState::empty();
    let first = service::register(&store, &mut first_session, "bob", "longenough")
        .await
        .expect("register failed");
    assert!(first.user.is_some());

    let mut second_session = SessionState::empty();
    let second = service::register(&store, &mut second_session, "bob", "other12345")
        .await
        .expect("register failed");

    let (field, message) = single_error(&second);
    assert_eq!(field, "username");
    assert_eq!(message, "username already been taken");
    assert_eq!(second_session.user_id(), None);
    assert_eq!(store.rows_for("bob"), 1);
}

#[tokio::test]
async fn login_unknown_username_is_a_field_error() {
    let store = MemoryStore::new();
    let config = AuthConfig::new();
    let mut session = SessionState::empty();

    let response = service::login(&store, &mut session, &config, "nobody", "whatever")
        .await
        .expect("login failed");

    let (field, message) = single_error(&response);
    assert_eq!(field, "username");
    assert_eq!(message, "username does not exsist");
    assert_eq!(session.user_id(), None);
}

#[tokio::test]
async fn login_wrong_password_is_a_field_error() {
    let store = MemoryStore::new();
    let config = AuthConfig::new();

    let mut register_session = SessionState::empty();
    service::register(&store, &mut register_session, "carol", "rightpassword")
        .await
        .expect("register failed");

    let mut session = SessionState::empty();
    let response = service::login(&store, &mut session, &config, "carol", "wrongpassword")
        .await
        .expect("login failed");

    let (field, message) = single_error(&response);
    assert_eq!(field, "password");
    assert_eq!(message, "password is incorrect");
    assert_eq!(session.user_id(), None);
}

#[tokio::test]
async fn login_session_write_is_configuration_gated() {
    let store = MemoryStore::new();
    let mut register_session = SessionState::empty();
    service::register(&store, &mut register_session, "dora", "hunter42")
        .await
        .expect("register failed");

    // Variant that never authenticates the session on login.
    let detached = AuthConfig::new().with_login_establishes_session(false);
    let mut session = SessionState::empty();
    let response = service::login(&store, &mut session, &detached, "dora", "hunter42")
        .await
        .expect("login failed");
    assert!(response.user.is_some());
    assert_eq!(session.user_id(), None);

    // Default variant writes the slot.
    let attached = AuthConfig::new();
    let mut session = SessionState::empty();
    let response = service::login(&store, &mut session, &attached, "dora", "hunter42")
        .await
        .expect("login failed");
    assert!(response.user.is_some());
    assert_eq!(session.user_id(), Some(1));
}

#[tokio::test]
async fn current_user_without_session_is_no_identity() {
    let store = MemoryStore::new();
    let session = SessionState::empty();

    let user = service::current_user(&store, &session)
        .await
        .expect("lookup failed");

    assert_eq!(user, None);
    // An empty slot never reaches the store.
    assert_eq!(store.store_calls(), 0);
}

#[tokio::test]
async fn current_user_after_register_matches() {
    let store = MemoryStore::new();
    let mut session = SessionState::empty();

    let registered = service::register(&store, &mut session, "erin", "hunter42")
        .await
        .expect("register failed");
    let registered_user = registered.user.expect("expected a user");

    let user = service::current_user(&store, &session)
        .await
        .expect("lookup failed")
        .expect("expected an identity");

    assert_eq!(user.id, registered_user.id);
    assert_eq!(user.username, registered_user.username);
}

#[tokio::test]
async fn current_user_with_stale_id_is_no_identity() {
    let store = MemoryStore::new();
    let mut session = SessionState::empty();
    // Slot points at a user that no longer exists; that is not a fault.
    session.set_user_id(999);

    let user = service::current_user(&store, &session)
        .await
        .expect("lookup failed");

    assert_eq!(user, None);
}

#[tokio::test]
async fn store_failure_is_fatal_not_a_field_error() {
    let store = FailingStore;
    let config = AuthConfig::new();

    let mut session = SessionState::empty();
    let register_result = service::register(&store, &mut session, "frank", "hunter42").await;
    assert!(register_result.is_err());
    assert_eq!(session.user_id(), None);

    let mut session = SessionState::empty();
    let login_result = service::login(&store, &mut session, &config, "frank", "hunter42").await;
    assert!(login_result.is_err());
    assert_eq!(session.user_id(), None);
}
