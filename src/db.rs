//! Database module for SQLite connection and migrations.
//!
//! Uses r2d2 connection pool for efficient connection management.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::errors::AppError;
use crate::queries::Schema;

/// Type alias for the SQLite connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Initialize the database connection pool
///
/// Every pooled connection has foreign keys enabled.
///
/// # Arguments
/// * `database_url` - Path (or SQLite URI) of the database
pub fn init_pool(database_url: &str) -> Result<DbPool, AppError> {
    let manager = SqliteConnectionManager::file(database_url)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    let pool = Pool::builder()
        .max_size(10)
        .build(manager)
        .map_err(|e| AppError::DatabaseError(format!("Failed to create pool: {}", e)))?;

    Ok(pool)
}

/// Run database migrations to create necessary tables
pub fn run_migrations(pool: &DbPool) -> Result<(), AppError> {
    let conn = get_conn(pool)?;

    let steps = [
        ("accounts table", Schema::CREATE_ACCOUNTS_TABLE),
        ("profiles table", Schema::CREATE_PROFILES_TABLE),
        ("links table", Schema::CREATE_LINKS_TABLE),
        ("links owner index", Schema::CREATE_LINKS_OWNER_INDEX),
    ];

    for (what, sql) in steps {
        conn.execute(sql, [])
            .map_err(|e| AppError::DatabaseError(format!("Failed to create {}: {}", what, e)))?;
    }

    log::info!("Database migrations completed successfully");
    Ok(())
}

/// Get a connection from the pool
pub fn get_conn(pool: &DbPool) -> Result<DbConnection, AppError> {
    pool.get()
        .map_err(|e| AppError::DatabaseError(format!("Failed to get connection: {}", e)))
}
