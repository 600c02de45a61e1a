//! Application-wide constants.
//!
//! Centralizes magic numbers and strings for better maintainability.

// ============================================================================
// Link Constants
// ============================================================================

/// Exact length every short code must have
pub const SHORT_CODE_LENGTH: usize = 6;

/// Maximum allowed long URL length in characters
pub const MAX_LONG_URL_LENGTH: usize = 1024;

/// Paths under `/` that are never resolved as short codes.
///
/// Includes every top-level route, since those are matched before
/// `/{short_code}` and would shadow a link of the same name.
pub const RESERVED_PATHS: [&str; 9] = [
    "favicon.ico",
    "robots.txt",
    "api",
    "health",
    "metrics",
    "manage",
    "notfound",
    "signin",
    "signup",
];

// ============================================================================
// Credential Constants
// ============================================================================

/// Argon2 passes over memory
pub const HASH_TIME_COST: u32 = 2;

/// Argon2 working set in KiB (32 MiB)
pub const HASH_MEMORY_KIB: u32 = 32 * 1024;

/// Argon2 lanes
pub const HASH_PARALLELISM: u32 = 4;

/// Length of the stored password digest in bytes
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// Fixed salt shared by every account.
///
/// Stored digests are unsalted per account, so this value is part of the
/// on-disk credential format and must never change.
pub const HASH_SALT: &[u8] = b"shortlink.credentials.v1";

// ============================================================================
// Session Constants
// ============================================================================

/// Number of random bytes in a session id (128 bits)
pub const SESSION_ID_BYTES: usize = 16;

/// Account id carried by sessions that have not signed in
pub const ANONYMOUS_ACCOUNT_ID: i64 = 0;

// ============================================================================
// Route Constants
// ============================================================================

/// Where a successful `add` sends the browser
pub const MANAGE_PATH: &str = "/manage";

/// Where unknown links and endpoints are sent
pub const NOT_FOUND_PATH: &str = "/notfound";

/// Sign-in page, with the return path attached
pub const SIGNIN_REDIRECT_PATH: &str = "/signin?redirect=/manage";

/// Profile and link listing for the signed-in account
pub const ACCOUNT_PATH: &str = "/api/me";

// ============================================================================
// Test Constants
// ============================================================================

/// Prefix of the per-test in-memory SQLite URI; a counter is appended so
/// every test gets its own database shared by all pooled connections
#[cfg(test)]
pub const TEST_DB_URI_PREFIX: &str = "file:shortlink_test_";
