//! # API Error Type
//!
//! Unified error type for app commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in BizHome                                │
//! │                                                                         │
//! │  UI                          Rust Backend                               │
//! │  ──                          ────────────                               │
//! │                                                                         │
//! │  call('record_sale')                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │  Command Function                                                │   │
//! │  │  Result<T, ApiError>                                             │   │
//! │  │         │                                                        │   │
//! │  │         ▼                                                        │   │
//! │  │  DbError ──────────┐                                             │   │
//! │  │  CoreError ────────┤                                             │   │
//! │  │  SecurityError ────┼──► ApiError { code, message } ─────────────►│   │
//! │  │  LicenseError ─────┤                                             │   │
//! │  │  ValidationError ──┘                                             │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  switch (e.code) {                                                      │
//! │    case 'INSUFFICIENT_STOCK': ...                                       │
//! │    case 'LOCKED_OUT': ...                                               │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage and query internals are logged and replaced by generic messages.

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use bizhome_core::{CoreError, LicenseError, SecurityError, ValidationError};
use bizhome_db::DbError;

/// API error returned from commands.
///
/// ## Serialization
/// This is what the UI receives when a command fails:
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Arroz: 3 available, 5 requested"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Entity doesn't exist
    NotFound,

    /// Unique name taken, category still in use, dangling reference
    ConstraintViolation,

    /// Input failed validation
    ValidationError,

    /// Sale needs more stock than available
    InsufficientStock,

    /// Wrong PIN/password
    InvalidCredential,

    /// Too many failed unlock attempts
    LockedOut,

    /// App lock enabled without a configured method
    NoMethodConfigured,

    /// License blob unreadable
    InvalidFormat,

    /// License past its validity date
    Expired,

    /// License issued for another device
    DeviceMismatch,

    /// No license activated yet
    NotActivated,

    /// Database can't be reached
    StorageUnavailable,

    /// Query failed for another reason
    DatabaseError,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ConstraintViolation,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::new(
                    ErrorCode::ConstraintViolation,
                    "Record is referenced by other records or references a missing one",
                )
            }
            DbError::CheckViolation { message } => {
                error!("Check constraint violation: {}", message);
                ApiError::new(ErrorCode::ConstraintViolation, "Invalid value for stored field")
            }
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::StorageUnavailable, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::StorageUnavailable, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::StorageUnavailable, "Database pool exhausted")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Domain(e) => e.into(),
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", id),
            CoreError::CategoryNotFound(id) => ApiError::not_found("Category", id),
            CoreError::SaleNotFound(id) => ApiError::not_found("Sale", id),
            CoreError::ExpenseNotFound(id) => ApiError::not_found("Expense", id),
            CoreError::InsufficientStock {
                product,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: {} available, {} requested",
                    product, available, requested
                ),
            ),
            e @ CoreError::CategoryInUse { .. } => {
                ApiError::new(ErrorCode::ConstraintViolation, e.to_string())
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            e @ ValidationError::Duplicate { .. } => {
                ApiError::new(ErrorCode::ConstraintViolation, e.to_string())
            }
            other => ApiError::validation(other.to_string()),
        }
    }
}

impl From<SecurityError> for ApiError {
    fn from(err: SecurityError) -> Self {
        match err {
            e @ SecurityError::NoMethodConfigured => {
                ApiError::new(ErrorCode::NoMethodConfigured, e.to_string())
            }
            e @ SecurityError::InvalidCredential { .. } => {
                ApiError::new(ErrorCode::InvalidCredential, e.to_string())
            }
            e @ SecurityError::LockedOut { .. } => ApiError::new(ErrorCode::LockedOut, e.to_string()),
            SecurityError::Validation(e) => e.into(),
        }
    }
}

impl From<LicenseError> for ApiError {
    fn from(err: LicenseError) -> Self {
        match err {
            e @ LicenseError::InvalidFormat(_) => {
                ApiError::new(ErrorCode::InvalidFormat, e.to_string())
            }
            e @ LicenseError::Expired { .. } => ApiError::new(ErrorCode::Expired, e.to_string()),
            e @ LicenseError::DeviceMismatch { .. } => {
                ApiError::new(ErrorCode::DeviceMismatch, e.to_string())
            }
            e @ LicenseError::NotActivated => ApiError::new(ErrorCode::NotActivated, e.to_string()),
            LicenseError::Validation(e) => e.into(),
        }
    }
}

/// Result type for commands.
pub type ApiResult<T> = Result<T, ApiError>;
