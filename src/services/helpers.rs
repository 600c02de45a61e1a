//! Shared utilities used across all service domains.
//!
//! Contains row mapping helpers and the signed-in guard.

use crate::errors::AppError;
use crate::models::{Credentials, Link, Profile};
use crate::session::Session;

// ============================================================================
// Row Mapping Helpers
// ============================================================================

/// Map a database row to a Credentials struct
pub(super) fn map_credentials_row(row: &rusqlite::Row) -> rusqlite::Result<Credentials> {
    Ok(Credentials {
        account_id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
    })
}

/// Map a database row to a Profile struct
pub(super) fn map_profile_row(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        born: row.get(3)?,
    })
}

/// Map a database row to a Link struct
pub(super) fn map_link_row(row: &rusqlite::Row) -> rusqlite::Result<Link> {
    Ok(Link {
        short: row.get(0)?,
        long: row.get(1)?,
    })
}

/// True only for UNIQUE or PRIMARY KEY violations, not for foreign key or
/// CHECK failures
pub(super) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    use rusqlite::ffi::{SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE};

    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Reject sessions that have not signed in
pub(super) fn require_signed_in(session: &Session) -> Result<(), AppError> {
    if session.signed_in {
        Ok(())
    } else {
        log::info!("Rejecting anonymous session {}", session.log_id());
        Err(AppError::not_signed_in())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use std::time::Duration;

    #[test]
    fn test_require_signed_in() {
        let store = SessionStore::new("session_id", Duration::from_secs(60));
        let mut session = store.resolve(None).session;
        assert!(matches!(
            require_signed_in(&session),
            Err(AppError::Unauthorized(_))
        ));

        session.signed_in = true;
        session.account_id = 1;
        assert!(require_signed_in(&session).is_ok());
    }
}
