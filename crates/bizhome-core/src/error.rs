//! # Error Types
//!
//! Domain-specific error types for bizhome-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bizhome-core errors (this file)                                        │
//! │  ├── CoreError        - Ledger rule violations                          │
//! │  ├── ValidationError  - Input validation failures                       │
//! │  ├── SecurityError    - App-lock failures                               │
//! │  └── LicenseError     - License blob failures                           │
//! │                                                                         │
//! │  bizhome-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  App errors                                                             │
//! │  └── ApiError         - What the UI sees (serialized)                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → UI            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ID, field, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger business rule errors.
///
/// These errors represent business rule violations in the sales/expense
/// ledger. They are translated to user-friendly messages by the app layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    ///
    /// ## When This Occurs
    /// - Recording a sale for a product id that doesn't exist
    /// - Editing or adjusting stock of a deleted product
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Category cannot be found.
    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    /// Sale not found.
    #[error("Sale not found: {0}")]
    SaleNotFound(i64),

    /// Expense not found.
    #[error("Expense not found: {0}")]
    ExpenseNotFound(i64),

    /// Insufficient stock to complete a sale.
    ///
    /// ## When This Occurs
    /// - Recording a sale larger than the current stock
    /// - Editing a sale upward by more than the remaining stock
    ///
    /// ## User Workflow
    /// ```text
    /// Record sale (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Arroz", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Arroz in stock"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: f64,
        requested: f64,
    },

    /// Category still referenced by products.
    ///
    /// ## When This Occurs
    /// - Deleting a category that has at least one product
    #[error("Category {id} still has {products} product(s)")]
    CategoryInUse { id: i64, products: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before anything touches the database.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., non-numeric PIN, bad month token).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Confirmation value differs from the original.
    #[error("{field} confirmation does not match")]
    Mismatch { field: String },

    /// Sale price doesn't leave the minimum margin over cost.
    #[error("margin {margin:.2}% is below the minimum of {min}%")]
    MarginTooLow { margin: f64, min: f64 },

    /// Sale price is not above purchase price.
    #[error("sale price must be greater than purchase price")]
    PriceNotAboveCost,

    /// Duplicate value (e.g., duplicate category name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Security Error
// =============================================================================

/// App-lock failures.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// Enabling the lock without any method hash stored.
    #[error("No security method configured")]
    NoMethodConfigured,

    /// Secret didn't match the stored hash.
    ///
    /// ## When This Occurs
    /// - Wrong PIN/password entered while not locked out
    /// - Verifying with a method that was never configured
    #[error("Invalid credential ({attempts_remaining} attempt(s) remaining)")]
    InvalidCredential { attempts_remaining: u32 },

    /// Too many failed attempts; no verification until the lockout ends.
    #[error("Locked out for {remaining_seconds} more second(s)")]
    LockedOut { remaining_seconds: i64 },

    /// Secret doesn't meet the method's rules.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// License Error
// =============================================================================

/// License blob failures.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Blob isn't base64, fails to decrypt, or lacks required fields.
    #[error("Invalid license format: {0}")]
    InvalidFormat(String),

    /// `validUntil` lies in the past.
    #[error("License expired at {valid_until}")]
    Expired { valid_until: i64 },

    /// License was issued for another device.
    #[error("License belongs to device {licensed}, not {current}")]
    DeviceMismatch { licensed: String, current: String },

    /// No license has been activated on this device.
    #[error("No license activated")]
    NotActivated,

    /// Validity outside the allowed number of months.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for Results with SecurityError.
pub type SecurityResult<T> = Result<T, SecurityError>;

/// Convenience type alias for Results with LicenseError.
pub type LicenseResult<T> = Result<T, LicenseError>;

// =============================================================================
// Unit Tests
// =============================================================================
