//! SQL query constants for the link shortener.
//!
//! Centralizes all SQL queries for better maintainability and consistency.
//! Every statement takes positional parameters (`?1`, `?2`, ...).

/// Schema-related queries for database setup and migrations.
pub struct Schema;

impl Schema {
    pub const CREATE_ACCOUNTS_TABLE: &'static str = "
        CREATE TABLE IF NOT EXISTS accounts (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            username        TEXT NOT NULL UNIQUE,
            password_hash   BLOB NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        )";

    pub const CREATE_PROFILES_TABLE: &'static str = "
        CREATE TABLE IF NOT EXISTS profiles (
            account_id  INTEGER PRIMARY KEY,
            name        TEXT NOT NULL,
            age         TEXT NOT NULL,
            born        TEXT NOT NULL,
            FOREIGN KEY (account_id) REFERENCES accounts (id) ON DELETE CASCADE
        )";

    pub const CREATE_LINKS_TABLE: &'static str = "
        CREATE TABLE IF NOT EXISTS links (
            short_code  TEXT PRIMARY KEY,
            long_url    TEXT NOT NULL CHECK (length(long_url) <= 1024),
            owner_id    INTEGER NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (owner_id) REFERENCES accounts (id) ON DELETE CASCADE
        )";

    pub const CREATE_LINKS_OWNER_INDEX: &'static str =
        "CREATE INDEX IF NOT EXISTS idx_links_owner ON links (owner_id)";

    #[cfg(test)]
    pub const TABLE_EXISTS: &'static str =
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1";
}

/// Credential queries.
pub struct Accounts;

impl Accounts {
    pub const SELECT_CREDENTIALS_BY_USERNAME: &'static str =
        "SELECT id, username, password_hash FROM accounts WHERE username = ?1";

    pub const SELECT_USERNAME_BY_ID: &'static str =
        "SELECT username FROM accounts WHERE id = ?1";

    pub const SELECT_ID_BY_USERNAME: &'static str =
        "SELECT id FROM accounts WHERE username = ?1";

    pub const USERNAME_EXISTS: &'static str =
        "SELECT EXISTS(SELECT 1 FROM accounts WHERE username = ?1)";

    pub const INSERT: &'static str =
        "INSERT INTO accounts (username, password_hash) VALUES (?1, ?2)";
}

/// Profile queries.
pub struct Profiles;

impl Profiles {
    pub const SELECT_BY_ACCOUNT_ID: &'static str =
        "SELECT account_id, name, age, born FROM profiles WHERE account_id = ?1";

    pub const INSERT: &'static str =
        "INSERT INTO profiles (account_id, name, age, born) VALUES (?1, ?2, ?3, ?4)";
}

/// Short link queries.
pub struct Links;

impl Links {
    pub const SELECT_LONG_URL_BY_CODE: &'static str =
        "SELECT long_url FROM links WHERE short_code = ?1";

    pub const CODE_EXISTS: &'static str =
        "SELECT EXISTS(SELECT 1 FROM links WHERE short_code = ?1)";

    pub const SELECT_OWNER_BY_CODE: &'static str =
        "SELECT owner_id FROM links WHERE short_code = ?1";

    pub const INSERT: &'static str =
        "INSERT INTO links (short_code, long_url, owner_id) VALUES (?1, ?2, ?3)";

    pub const SELECT_BY_OWNER: &'static str =
        "SELECT short_code, long_url FROM links WHERE owner_id = ?1 ORDER BY created_at, short_code";

    pub const DELETE_BY_CODE_AND_OWNER: &'static str =
        "DELETE FROM links WHERE short_code = ?1 AND owner_id = ?2";
}
