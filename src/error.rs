//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management, providing a consistent way to handle and represent
//! failures ranging from bad credentials to database and export errors.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can return it
//! directly and have it rendered as a JSON body of the form `{"error": "..."}`.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error`, `bcrypt::BcryptError` and `csv::Error` allow
//! propagation with the `?` operator.

use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
///
/// Each variant maps to exactly one HTTP status code, see [`AppError::status_code`].
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is missing (HTTP 401).
    Unauthorized(String),
    /// Malformed or conflicting request, e.g. an already registered email (HTTP 400).
    BadRequest(String),
    /// The resource does not exist or is not visible to the caller (HTTP 404).
    NotFound(String),
    /// Input failed validation (HTTP 422 Unprocessable Entity).
    ValidationError(String),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
    /// Failure reported by the database (HTTP 500).
    /// The message is logged but never sent to the client.
    DatabaseError(String),
    /// Missing or invalid configuration detected at startup (HTTP 500).
    Configuration(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalServerError(_)
            | AppError::DatabaseError(_)
            | AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        let message = match self {
            AppError::Unauthorized(msg) => {
                response.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
                msg.clone()
            }
            AppError::DatabaseError(msg) => {
                log::error!("database error: {}", msg);
                "Internal database error".to_string()
            }
            AppError::InternalServerError(msg) | AppError::Configuration(msg) => {
                log::error!("internal error: {}", msg);
                msg.clone()
            }
            AppError::BadRequest(msg) | AppError::NotFound(msg) | AppError::ValidationError(msg) => {
                msg.clone()
            }
        };
        response.json(json!({ "error": message }))
    }
}

/// `RowNotFound` becomes `NotFound`; everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(format!("Migration failed: {}", error))
    }
}

/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(error: actix_web::error::BlockingError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(error: csv::Error) -> AppError {
        AppError::InternalServerError(format!("Failed to write CSV: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_responses() {
        let response = AppError::Unauthorized("Invalid token".into()).error_response();
        assert_eq!(response.status(), 401);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let response = AppError::BadRequest("Email already registered".into()).error_response();
        assert_eq!(response.status(), 400);

        let response = AppError::NotFound("Task not found".into()).error_response();
        assert_eq!(response.status(), 404);

        let response = AppError::ValidationError("title: too long".into()).error_response();
        assert_eq!(response.status(), 422);

        let response = AppError::DatabaseError("disk I/O error".into()).error_response();
        assert_eq!(response.status(), 500);

        let response = AppError::Configuration("JWT_SECRET must be set".into()).error_response();
        assert_eq!(response.status(), 500);
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, AppError::NotFound(_)));
    }
}
