//! Custom error types for the link shortener.
//!
//! Implements proper error handling with automatic HTTP response conversion.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

use crate::models::ErrorResponse;

/// Message shown to clients for any failure not attributable to them
const GENERIC_SERVER_MESSAGE: &str = "Internal server error";

/// Application-level errors
#[derive(Debug)]
pub enum AppError {
    /// A required field was missing or empty
    InvalidInput(String),
    /// Not signed in, or failed an ownership check
    Unauthorized(String),
    /// Short code does not have the required length
    InvalidShortCode(String),
    /// Well-formed but rejected request (duplicate code, oversized URL)
    BadRequest(String),
    /// No credentials stored for the given username
    NoSuchUser(String),
    /// Username already has credentials
    UsernameTaken(String),
    /// Resource was not found
    NotFound(String),
    /// Database operation failed
    DatabaseError(String),
    /// A UNIQUE or CHECK constraint rejected a write
    ConstraintViolation(String),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::InvalidShortCode(msg) => write!(f, "Invalid short code: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NoSuchUser(msg) => write!(f, "No such user: {}", msg),
            AppError::UsernameTaken(msg) => write!(f, "Username taken: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::ConstraintViolation(msg) => write!(f, "Constraint violation: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// ============================================================================
// Constructor Methods
// ============================================================================

impl AppError {
    /// Create an Unauthorized error for a session that has not signed in
    pub fn not_signed_in() -> Self {
        AppError::Unauthorized("Sign in required".into())
    }

    /// Create an Unauthorized error for a link owned by someone else
    pub fn not_owner(short_code: &str) -> Self {
        AppError::Unauthorized(format!(
            "Cannot remove short link {} because you are unauthorized",
            short_code
        ))
    }

    /// Create an InvalidShortCode error
    pub fn short_code_length(short_code: &str, expected: usize) -> Self {
        AppError::InvalidShortCode(format!(
            "Short code '{}' must be exactly {} characters",
            short_code, expected
        ))
    }

    /// Create a BadRequest error for a code that is already mapped
    pub fn duplicate_code(short_code: &str) -> Self {
        AppError::BadRequest(format!("Short code '{}' already exists", short_code))
    }

    /// Create a BadRequest error for an oversized long URL
    pub fn long_url_too_long(max: usize) -> Self {
        AppError::BadRequest(format!("Long URL exceeds {} characters", max))
    }

    /// Create a UsernameTaken error
    pub fn username_taken(username: &str) -> Self {
        AppError::UsernameTaken(format!("Username '{}' is already taken", username))
    }

    /// Create a NoSuchUser error
    pub fn no_such_user(username: &str) -> Self {
        AppError::NoSuchUser(format!("User '{}' does not exist", username))
    }

    /// Create an InvalidInput error with a message
    pub fn invalid_input(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }

    /// Create an InternalError with a message
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::InternalError(message.into())
    }

    /// True for the two store-level failures a caller cannot fix
    pub fn is_server_side(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseError(_) | AppError::InternalError(_)
        )
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            // Existing clients treat a wrong-length code as 401, not 400.
            AppError::InvalidShortCode(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NoSuchUser(_) => StatusCode::UNAUTHORIZED,
            AppError::UsernameTaken(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConstraintViolation(_) => StatusCode::BAD_REQUEST,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone()),
            AppError::Unauthorized(msg) => ("UNAUTHORIZED", msg.clone()),
            AppError::InvalidShortCode(msg) => ("INVALID_SHORT_CODE", msg.clone()),
            AppError::BadRequest(msg) => ("BAD_REQUEST", msg.clone()),
            AppError::NoSuchUser(msg) => ("NO_SUCH_USER", msg.clone()),
            AppError::UsernameTaken(msg) => ("USERNAME_TAKEN", msg.clone()),
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::DatabaseError(_) => ("DATABASE_ERROR", GENERIC_SERVER_MESSAGE.to_string()),
            AppError::ConstraintViolation(_) => {
                ("CONSTRAINT_VIOLATION", "Request conflicts with existing data".to_string())
            }
            AppError::InternalError(_) => ("INTERNAL_ERROR", GENERIC_SERVER_MESSAGE.to_string()),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse::new(message, error_code))
    }
}

/// Convert rusqlite errors to AppError
impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(sqlite_err, _) = &err {
            if sqlite_err.code == rusqlite::ErrorCode::ConstraintViolation {
                log::warn!("Constraint violation: {:?}", err);
                return AppError::ConstraintViolation(err.to_string());
            }
        }
        log::error!("Database error: {:?}", err);
        AppError::DatabaseError(err.to_string())
    }
}

/// Convert r2d2 pool errors to AppError
impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        log::error!("Connection pool error: {:?}", err);
        AppError::DatabaseError(format!("Connection pool error: {}", err))
    }
}

/// Convert a failed `web::block` call (worker pool gone) to AppError
impl From<actix_web::error::BlockingError> for AppError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        log::error!("Blocking task failed: {:?}", err);
        AppError::InternalError(format!("Blocking task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::not_signed_in().status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::short_code_length("abc", 6).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::duplicate_code("abc123").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::long_url_too_long(1024).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("test".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::DatabaseError("test".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::InternalError("test".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_short_code_length_is_its_own_kind() {
        let err = AppError::short_code_length("abc", 6);
        assert!(matches!(err, AppError::InvalidShortCode(_)));
        assert!(!matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = AppError::DatabaseError("no such table: links".into());
        let body = err.error_response().into_body().try_into_bytes().unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("links"));
        assert!(text.contains(GENERIC_SERVER_MESSAGE));
    }

    #[test]
    fn test_all_error_variants_have_responses() {
        let errors = vec![
            AppError::InvalidInput("test".into()),
            AppError::Unauthorized("test".into()),
            AppError::InvalidShortCode("test".into()),
            AppError::BadRequest("test".into()),
            AppError::NoSuchUser("test".into()),
            AppError::UsernameTaken("test".into()),
            AppError::NotFound("test".into()),
            AppError::DatabaseError("test".into()),
            AppError::ConstraintViolation("test".into()),
            AppError::InternalError("test".into()),
        ];

        for err in errors {
            let response = err.error_response();
            assert!(response.status().is_client_error() || response.status().is_server_error());
        }
    }

    #[test]
    fn test_constructor_messages() {
        let err = AppError::not_owner("abc123");
        assert!(err.to_string().contains("abc123"));

        let err = AppError::username_taken("alice");
        assert!(err.to_string().contains("alice"));

        let err = AppError::no_such_user("bob");
        assert!(matches!(err, AppError::NoSuchUser(_)));
    }

    #[test]
    fn test_is_server_side() {
        assert!(AppError::DatabaseError("x".into()).is_server_side());
        assert!(AppError::internal("x").is_server_side());
        assert!(!AppError::not_signed_in().is_server_side());
    }
}
