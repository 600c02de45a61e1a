//! Account signup, signin and profile services.

use rusqlite::{params, OptionalExtension};

use super::helpers::{
    is_unique_violation, map_credentials_row, map_profile_row, require_signed_in,
};
use super::links::list_links;
use crate::credentials::{hash_password, verify_password};
use crate::db::{get_conn, DbPool};
use crate::errors::AppError;
use crate::models::{AccountResponse, SignupForm};
use crate::queries::{Accounts, Profiles};
use crate::session::{Session, SessionStore};

// ============================================================================
// Signup
// ============================================================================

/// Create an account with its profile. Does not sign anyone in.
///
/// Credentials and profile are written in one transaction. The UNIQUE index
/// on `accounts.username` is the authority on duplicates; the pre-check only
/// avoids hashing a password for a name that is obviously taken.
///
/// Returns the new account id.
pub fn signup(pool: &DbPool, form: &SignupForm) -> Result<i64, AppError> {
    let SignupForm {
        name,
        age,
        born,
        username,
        password,
    } = form;

    log::info!("Attempting to sign up {}", username);

    if [name, age, born, username, password]
        .iter()
        .any(|field| field.is_empty())
    {
        log::info!("Rejecting signup with empty fields");
        return Err(AppError::invalid_input("All fields are required"));
    }

    if username_exists(pool, username)? {
        log::warn!("Username {} already exists", username);
        return Err(AppError::username_taken(username));
    }

    let digest = hash_password(password)?;

    let mut conn = get_conn(pool)?;
    let tx = conn.transaction()?;

    tx.execute(Accounts::INSERT, params![username, &digest[..]])
        .map_err(|e| {
            if is_unique_violation(&e) {
                log::warn!("Username {} was taken concurrently", username);
                return AppError::username_taken(username);
            }
            log::error!("insert-credentials failed for {}: {}", username, e);
            AppError::DatabaseError(e.to_string())
        })?;

    let account_id: i64 = tx
        .query_row(Accounts::SELECT_ID_BY_USERNAME, params![username], |row| {
            row.get(0)
        })
        .map_err(|e| {
            log::error!("lookup-id-by-username failed for {}: {}", username, e);
            AppError::from(e)
        })?;

    tx.execute(Profiles::INSERT, params![account_id, name, age, born])
        .map_err(|e| {
            log::error!("insert-profile failed for account {}: {}", account_id, e);
            AppError::from(e)
        })?;

    tx.commit()?;

    log::info!("Signed up user {} with account id {}", username, account_id);
    Ok(account_id)
}

fn username_exists(pool: &DbPool, username: &str) -> Result<bool, AppError> {
    let conn = get_conn(pool)?;
    conn.query_row(Accounts::USERNAME_EXISTS, params![username], |row| row.get(0))
        .map_err(|e| {
            log::error!("check-username-exists failed for {}: {}", username, e);
            AppError::from(e)
        })
}

// ============================================================================
// Signin
// ============================================================================

/// Verify a username/password pair and elevate `session` on success.
///
/// Both the shared store entry and the caller's copy of the session are
/// updated, so later calls in the same request see the signed-in state.
pub fn signin(
    pool: &DbPool,
    sessions: &SessionStore,
    session: &mut Session,
    username: &str,
    password: &str,
) -> Result<(), AppError> {
    log::info!("Attempting to sign in {} on session {}", username, session.log_id());

    let credentials = {
        let conn = get_conn(pool)?;
        conn.query_row(
            Accounts::SELECT_CREDENTIALS_BY_USERNAME,
            params![username],
            map_credentials_row,
        )
        .optional()
        .map_err(|e| {
            log::error!("lookup-credentials-by-username failed for {}: {}", username, e);
            AppError::from(e)
        })?
    };

    let credentials = match credentials {
        Some(c) => c,
        None => {
            log::info!("No credentials stored for {}", username);
            return Err(AppError::no_such_user(username));
        }
    };

    if !verify_password(password, &credentials.password_hash)? {
        log::info!("Wrong password for {}", username);
        return Err(AppError::Unauthorized("Username or password incorrect".into()));
    }

    sessions.elevate(&session.id, credentials.account_id)?;
    session.signed_in = true;
    session.account_id = credentials.account_id;

    log::info!(
        "Session {} signed in as {} (account {})",
        session.log_id(),
        credentials.username,
        credentials.account_id
    );
    Ok(())
}

// ============================================================================
// Profile
// ============================================================================

/// Username, profile and links of the signed-in account
pub fn get_account(pool: &DbPool, session: &Session) -> Result<AccountResponse, AppError> {
    require_signed_in(session)?;

    let (username, profile) = {
        let conn = get_conn(pool)?;

        let username: Option<String> = conn
            .query_row(
                Accounts::SELECT_USERNAME_BY_ID,
                params![session.account_id],
                |row| row.get(0),
            )
            .optional()?;

        let profile = conn
            .query_row(
                Profiles::SELECT_BY_ACCOUNT_ID,
                params![session.account_id],
                map_profile_row,
            )
            .optional()?;

        (username, profile)
    };

    let (username, profile) = match (username, profile) {
        (Some(username), Some(profile)) => (username, profile),
        _ => {
            log::error!("Account {} has no profile", session.account_id);
            return Err(AppError::NotFound(format!(
                "Account '{}' not found",
                session.account_id
            )));
        }
    };

    let links = list_links(pool, session)?;

    Ok(AccountResponse {
        username,
        profile,
        links,
    })
}
