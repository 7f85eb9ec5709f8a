//! # Repository Module
//!
//! Database repository implementations for BizHome.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  App command                                                            │
//! │       │                                                                 │
//! │       │  db.sales().record(&new_sale)                                   │
//! │       ▼                                                                 │
//! │  SaleRepository                                                         │
//! │  ├── list(&self)                                                        │
//! │  ├── record(&self, sale)        ─┐                                      │
//! │  ├── update(&self, id, sale)     ├─ sale row + stock in one tx          │
//! │  └── delete(&self, id)          ─┘                                      │
//! │       │                                                                 │
//! │       │  SQL (Spanish column names aliased to struct fields)            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`category::CategoryRepository`] - Categories, product counts, sales per category
//! - [`product::ProductRepository`] - Product CRUD and stock adjustments
//! - [`sale::SaleRepository`] - Sales with retention accounting
//! - [`expense::ExpenseRepository`] - Household expenses
//! - [`config::ConfigRepository`] - Key/value settings
//! - [`notification::NotificationRepository`] - Notification preference singleton
//! - [`security::SecurityRepository`] - App-lock singleton

pub mod category;
pub mod config;
pub mod expense;
pub mod notification;
pub mod product;
pub mod sale;
pub mod security;
