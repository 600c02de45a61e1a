//! Short link services: add, list, remove and redirect lookups.
//!
//! Every mutation is scoped to the account of the signed-in session.

use rusqlite::{params, OptionalExtension};

use super::helpers::{is_unique_violation, map_link_row, require_signed_in};
use crate::cache::AppCache;
use crate::constants::{MAX_LONG_URL_LENGTH, RESERVED_PATHS, SHORT_CODE_LENGTH};
use crate::db::{get_conn, DbPool};
use crate::errors::AppError;
use crate::metrics::AppMetrics;
use crate::models::Link;
use crate::queries::Links;
use crate::session::Session;

/// Map `short_code` to `long_url`, owned by the session's account
pub fn add_link(
    pool: &DbPool,
    session: &Session,
    short_code: &str,
    long_url: &str,
) -> Result<(), AppError> {
    require_signed_in(session)?;

    if short_code.chars().count() != SHORT_CODE_LENGTH {
        log::info!(
            "Rejecting short code of length {} from session {}",
            short_code.chars().count(),
            session.log_id()
        );
        return Err(AppError::short_code_length(short_code, SHORT_CODE_LENGTH));
    }

    if RESERVED_PATHS.contains(&short_code) {
        log::info!("Rejecting reserved short code {}", short_code);
        return Err(AppError::BadRequest(format!(
            "Short code '{}' is reserved",
            short_code
        )));
    }

    if long_url.chars().count() > MAX_LONG_URL_LENGTH {
        log::info!("Rejecting oversized long URL from session {}", session.log_id());
        return Err(AppError::long_url_too_long(MAX_LONG_URL_LENGTH));
    }

    let conn = get_conn(pool)?;

    let exists: bool = conn
        .query_row(Links::CODE_EXISTS, params![short_code], |row| row.get(0))
        .map_err(|e| {
            log::error!("check-short-code-exists failed for {}: {}", short_code, e);
            AppError::from(e)
        })?;

    if exists {
        log::info!("Rejecting existing short code {}", short_code);
        return Err(AppError::duplicate_code(short_code));
    }

    conn.execute(
        Links::INSERT,
        params![short_code, long_url, session.account_id],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            return AppError::duplicate_code(short_code);
        }
        log::error!("insert-mapping failed for {}: {}", short_code, e);
        AppError::DatabaseError(e.to_string())
    })?;

    log::info!(
        "Added link {} -> {} (account {})",
        short_code,
        long_url,
        session.account_id
    );
    Ok(())
}

/// All links owned by the session's account
pub fn list_links(pool: &DbPool, session: &Session) -> Result<Vec<Link>, AppError> {
    require_signed_in(session)?;

    let conn = get_conn(pool)?;
    let mut stmt = conn.prepare(Links::SELECT_BY_OWNER)?;

    let links = stmt
        .query_map(params![session.account_id], map_link_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            log::error!(
                "list-mappings-by-owner failed for account {}: {}",
                session.account_id,
                e
            );
            AppError::from(e)
        })?;

    Ok(links)
}

/// Remove a link owned by the session's account and drop it from the redirect cache
pub fn remove_link(
    pool: &DbPool,
    cache: Option<&AppCache>,
    session: &Session,
    short_code: &str,
) -> Result<(), AppError> {
    require_signed_in(session)?;

    let conn = get_conn(pool)?;

    let owner: Option<i64> = conn
        .query_row(Links::SELECT_OWNER_BY_CODE, params![short_code], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e| {
            log::error!("lookup-owner-by-short-code failed for {}: {}", short_code, e);
            AppError::from(e)
        })?;

    if owner != Some(session.account_id) {
        log::info!(
            "Session {} may not remove {} (owner {:?})",
            session.log_id(),
            short_code,
            owner
        );
        return Err(AppError::not_owner(short_code));
    }

    // Owner is re-checked in the DELETE itself.
    let rows_affected = conn
        .execute(
            Links::DELETE_BY_CODE_AND_OWNER,
            params![short_code, session.account_id],
        )
        .map_err(|e| {
            log::error!("delete-mapping failed for {}: {}", short_code, e);
            AppError::from(e)
        })?;

    if rows_affected == 0 {
        log::error!(
            "delete-mapping removed nothing for {} (account {})",
            short_code,
            session.account_id
        );
        return Err(AppError::internal(format!(
            "Link '{}' was not removed",
            short_code
        )));
    }

    if let Some(cache) = cache {
        cache.invalidate(short_code);
    }

    log::info!(
        "Removed link {} (account {})",
        short_code,
        session.account_id
    );
    Ok(())
}

/// Long URL for a short code, or `None` if the code is not mapped
pub fn lookup_long_url(pool: &DbPool, short_code: &str) -> Result<Option<String>, AppError> {
    let conn = get_conn(pool)?;

    conn.query_row(Links::SELECT_LONG_URL_BY_CODE, params![short_code], |row| {
        row.get(0)
    })
    .optional()
    .map_err(|e| {
        log::error!("lookup-long-url-by-short-code failed for {}: {}", short_code, e);
        AppError::from(e)
    })
}

/// Long URL for a short code, served from the cache when possible.
///
/// Misses are not cached, so a code added later resolves immediately.
pub fn lookup_long_url_cached(
    pool: &DbPool,
    cache: &AppCache,
    short_code: &str,
    metrics: Option<&AppMetrics>,
) -> Result<Option<String>, AppError> {
    if let Some(long_url) = cache.get(short_code) {
        log::debug!("Cache hit for short code: {}", short_code);
        if let Some(m) = metrics {
            m.record_cache_hit();
        }
        return Ok(Some(long_url));
    }

    log::debug!("Cache miss for short code: {}, querying database", short_code);
    if let Some(m) = metrics {
        m.record_cache_miss();
    }

    let long_url = lookup_long_url(pool, short_code)?;
    if let Some(url) = &long_url {
        cache.insert(short_code, url);
    }
    Ok(long_url)
}
