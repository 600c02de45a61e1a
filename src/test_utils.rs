//! Test utilities and helpers.
//!
//! Provides common test infrastructure used across multiple test modules.
//! This module is only compiled when running tests.

#![cfg(test)]

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::cache::AppCache;
use crate::config::Config;
use crate::constants::TEST_DB_URI_PREFIX;
use crate::db::{init_pool, run_migrations, DbPool};
use crate::models::SignupForm;
use crate::services;
use crate::session::{Session, SessionStore};

static NEXT_TEST_DB: AtomicUsize = AtomicUsize::new(0);

/// Create an in-memory database pool for testing.
///
/// Each call creates a fresh database instance shared by every connection
/// in the returned pool.
pub fn setup_test_db() -> DbPool {
    let n = NEXT_TEST_DB.fetch_add(1, Ordering::SeqCst);
    let uri = format!("{}{}?mode=memory&cache=shared", TEST_DB_URI_PREFIX, n);
    let pool = init_pool(&uri).expect("Failed to create test pool");
    run_migrations(&pool).expect("Failed to run migrations");
    pool
}

/// Create a default test configuration.
pub fn test_config() -> Config {
    Config::default()
}

/// Create a default test cache.
pub fn test_cache() -> AppCache {
    AppCache::default()
}

/// Session store with the default cookie name and lifetime.
pub fn test_sessions() -> SessionStore {
    let config = test_config();
    SessionStore::new(config.session_cookie_name.clone(), config.session_lifetime())
}

/// Signup form for `username`, with the remaining fields filled in.
pub fn signup_form(username: &str, password: &str) -> SignupForm {
    SignupForm {
        name: "Alice".to_string(),
        age: "30".to_string(),
        born: "2000-01-01".to_string(),
        username: username.to_string(),
        password: password.to_string(),
    }
}

/// Helper to create a test account; returns its id.
pub fn create_test_account(pool: &DbPool, username: &str, password: &str) -> i64 {
    services::signup(pool, &signup_form(username, password)).expect("Failed to create test account")
}

/// Sign up `username` and return a fresh session signed in as them.
pub fn signed_in_session(pool: &DbPool, sessions: &SessionStore, username: &str) -> Session {
    create_test_account(pool, username, "password");
    let mut session = sessions.resolve(None).session;
    services::signin(pool, sessions, &mut session, username, "password")
        .expect("Failed to sign in test account");
    session
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_test_db_is_isolated() {
        let first = setup_test_db();
        create_test_account(&first, "alice", "pw");

        let second = setup_test_db();
        create_test_account(&second, "alice", "pw");
    }

    #[test]
    fn test_signed_in_session() {
        let pool = setup_test_db();
        let sessions = test_sessions();
        let session = signed_in_session(&pool, &sessions, "alice");
        assert!(session.signed_in);
        assert!(session.account_id > 0);
    }
}
