//! # bizhome-db: Database Layer for BizHome
//!
//! This crate provides database access for the BizHome ledger.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BizHome Data Flow                                │
//! │                                                                         │
//! │  App command (record_sale)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                    bizhome-db (THIS CRATE)                      │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐   │    │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │   │    │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │   │    │
//! │  │   │               │    │ CategoryRepo   │    │              │   │    │
//! │  │   │ SqlitePool    │◄───│ ProductRepo    │    │ 001_initial  │   │    │
//! │  │   │ Connection    │    │ SaleRepo       │    │ 002_seed     │   │    │
//! │  │   │ Management    │    │ ExpenseRepo    │    │              │   │    │
//! │  │   │               │    │ Config/Notif/  │    │              │   │    │
//! │  │   │               │    │ SecurityRepo   │    │              │   │    │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘   │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     SQLite Database                             │    │
//! │  │   <data dir>/bizhome/bizhome.db                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (one per table)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bizhome_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/bizhome.db")).await?;
//!
//! let products = db.products().list().await?;
//! let sale = db.sales().record(&new_sale).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::config::ConfigRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::notification::NotificationRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::security::SecurityRepository;
