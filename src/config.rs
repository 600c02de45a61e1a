//! Application configuration module.
//!
//! Handles loading configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database file path
    pub database_url: String,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Name of the cookie carrying the session id
    pub session_cookie_name: String,
    /// How long a fresh session stays valid, in seconds
    pub session_lifetime_secs: u64,
    /// Start-to-start interval of the expired-session sweep, in seconds
    pub session_sweep_interval_secs: u64,
    /// Redirect cache TTL in seconds
    pub redirect_cache_ttl_secs: u64,
    /// Redirect cache maximum capacity
    pub redirect_cache_max_capacity: u64,
    /// Enable Prometheus metrics endpoint
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Environment Variables
    /// - `DATABASE_URL`: Path to SQLite database (default: "shortlink.db")
    /// - `HOST`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `SESSION_COOKIE_NAME`: Session cookie name (default: "session_id")
    /// - `SESSION_LIFETIME_SECS`: Session lifetime (default: 3600)
    /// - `SESSION_SWEEP_INTERVAL_SECS`: Expired-session sweep interval (default: 1800)
    /// - `REDIRECT_CACHE_TTL_SECS`: Redirect cache TTL in seconds (default: 300)
    /// - `REDIRECT_CACHE_MAX_CAPACITY`: Redirect cache max capacity (default: 10000)
    /// - `METRICS_ENABLED`: Enable Prometheus metrics endpoint (default: true)
    ///
    /// # Panics
    /// Panics when a numeric variable is set but cannot be parsed; the
    /// process cannot start with a half-valid configuration.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port),
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or(defaults.session_cookie_name),
            session_lifetime_secs: parse_var("SESSION_LIFETIME_SECS", defaults.session_lifetime_secs),
            session_sweep_interval_secs: parse_var(
                "SESSION_SWEEP_INTERVAL_SECS",
                defaults.session_sweep_interval_secs,
            ),
            redirect_cache_ttl_secs: parse_var(
                "REDIRECT_CACHE_TTL_SECS",
                defaults.redirect_cache_ttl_secs,
            ),
            redirect_cache_max_capacity: parse_var(
                "REDIRECT_CACHE_MAX_CAPACITY",
                defaults.redirect_cache_max_capacity,
            ),
            metrics_enabled: env::var("METRICS_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Session lifetime as a `Duration`
    pub fn session_lifetime(&self) -> Duration {
        Duration::from_secs(self.session_lifetime_secs)
    }

    /// Sweep interval as a `Duration`
    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_secs)
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{} must be a valid number", name)),
        Err(_) => default,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "shortlink.db".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            session_cookie_name: "session_id".to_string(),
            session_lifetime_secs: 3600,
            session_sweep_interval_secs: 1800,
            redirect_cache_ttl_secs: 300,
            redirect_cache_max_capacity: 10_000,
            metrics_enabled: true,
        }
    }
}
