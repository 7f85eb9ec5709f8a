//! # bizhome-core: Pure Business Logic for BizHome
//!
//! This crate holds the business rules of the BizHome point-of-sale and
//! household budget app as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BizHome Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Hybrid UI (external)                         │   │
//! │  │    Products ──► Sales ──► Expenses ──► Dashboard ──► Unlock     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                bizhome-app (commands + store)                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ bizhome-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  retention · summary · security · license · expense_category    │   │
//! │  │  types · money · validation · error                             │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   bizhome-db (SQLite ledger)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Category, Product, Sale, Expense, ...)
//! - [`money`] - Amount wrapper and two-decimal display formatting
//! - [`retention`] - Gross/retention/net profit of a sale
//! - [`summary`] - Day/week/month windows, comparisons and rankings
//! - [`budget`] - Daily expense limit status and once-per-day alert gate
//! - [`expense_category`] - Keyword rules that classify expenses
//! - [`security`] - App-lock secret hashing and unlock attempt evaluation
//! - [`license`] - Device-bound offline license blobs
//! - [`validation`] - Form-level input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bizhome_core::retention::{RetentionPolicy, SaleFigures};
//!
//! let policy = RetentionPolicy::enabled(20.0);
//! let figures = SaleFigures::compute(3.0, 15.0, 10.0, policy);
//!
//! assert_eq!(figures.total, 45.0);
//! assert!((figures.retention - 3.0).abs() < 1e-9);
//! assert!((figures.net_profit - 12.0).abs() < 1e-9);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod budget;
pub mod error;
pub mod expense_category;
pub mod license;
pub mod money;
pub mod retention;
pub mod security;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, LicenseError, SecurityError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Retention percentage used when `porcentaje_retencion` is absent or unparsable.
pub const DEFAULT_RETENTION_PERCENT: f64 = 10.0;

/// Daily expense ceiling used when `limite_diario_gastos` is absent or invalid.
pub const DEFAULT_DAILY_LIMIT: f64 = 500.0;

/// Number of entries in the "top sales days" / "top expense days" rankings.
pub const DEFAULT_TOP_DAYS: usize = 5;

/// Products with stock below this value are listed as low stock.
pub const LOW_STOCK_THRESHOLD: f64 = 10.0;

/// Minimum markup of sale price over purchase price, in percent.
///
/// ## Business Reason
/// Products priced below this margin barely cover their cost once retention
/// is withheld, so the product form rejects them.
pub const MIN_MARGIN_PERCENT: f64 = 5.0;
