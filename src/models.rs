//! Data models and DTOs (Data Transfer Objects) for the link shortener.
//!
//! Contains structures for database entities and API request/response types.

use serde::{Deserialize, Serialize};
use validator::Validate;

// ============================================================================
// Database Models
// ============================================================================

/// Stored credentials for an account
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account identifier
    pub account_id: i64,
    /// Unique login name
    pub username: String,
    /// Argon2 digest of the password
    pub password_hash: Vec<u8>,
}

/// Free-form profile captured at signup, 1:1 with an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub age: String,
    pub born: String,
}

/// A short code mapped to its long URL, as exposed to owners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// The 6-character short code
    pub short: String,
    /// The target URL
    pub long: String,
}

// ============================================================================
// API Request DTOs
// ============================================================================

/// Form body for `POST /api/signup`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "age is required"))]
    pub age: String,
    #[serde(default, alias = "bornDate")]
    #[validate(length(min = 1, message = "born is required"))]
    pub born: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Form body for `POST /api/auth`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SigninForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Form body for `POST /api/add`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddLinkForm {
    #[serde(default)]
    pub short: String,
    #[serde(default)]
    pub long: String,
}

/// Query string for `DELETE /api/delete`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteLinkQuery {
    pub short: Option<String>,
}

// ============================================================================
// API Response DTOs
// ============================================================================

/// Profile plus owned links for the signed-in account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub username: String,
    pub profile: Profile,
    pub links: Vec<Link>,
}

/// Standard error response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code (for programmatic handling)
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Generic success message response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
