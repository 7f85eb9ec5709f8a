//! # Commands Module
//!
//! Every operation the hybrid UI can call.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs           ◄─── You are here (exports)
//! ├── category.rs      ◄─── Category CRUD, sales per category
//! ├── product.rs       ◄─── Product CRUD, stock adjustment
//! ├── sale.rs          ◄─── Sale ledger with retention accounting
//! ├── expense.rs       ◄─── Expenses, summary, daily limit alert
//! ├── dashboard.rs     ◄─── Sales dashboard and window totals
//! ├── settings.rs      ◄─── Retention and daily limit settings
//! ├── notification.rs  ◄─── Notifications preference
//! ├── security.rs      ◄─── App lock and session unlock
//! └── license.rs       ◄─── License generation and activation
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs database
//! async fn list_products(db: &DbState)
//!
//! // Needs "now"
//! async fn record_sale(db: &DbState, clock: &dyn Clock, ...)
//!
//! // Raises events
//! async fn add_expense(db: &DbState, clock: &dyn Clock, notifier: &dyn Notifier, ...)
//!
//! // Touches the in-memory session
//! async fn verify_unlock(db: &DbState, clock: &dyn Clock, session: &SessionState, ...)
//! ```
//!
//! All commands return [`ApiResult`](crate::error::ApiResult).

pub mod category;
pub mod dashboard;
pub mod expense;
pub mod license;
pub mod notification;
pub mod product;
pub mod sale;
pub mod security;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::state::{DbState, ManualClock};
    use bizhome_core::{NewCategory, NewProduct, Product, UnitType};
    use bizhome_db::{Database, DbConfig};

    pub async fn setup() -> DbState {
        DbState::new(Database::new(DbConfig::in_memory()).await.unwrap())
    }

    pub fn clock_at(year: i32, month: u32, day: u32, hour: u32) -> ManualClock {
        ManualClock::at(
            NaiveDate::from_ymd_opt(year, month, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        )
    }

    pub fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            description: None,
            icon: None,
        }
    }

    pub fn new_product(category_id: i64, name: &str, stock: f64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            category_id,
            purchase_price: 10.0,
            sale_price: 15.0,
            unit_type: UnitType::Unidad,
            stock,
            description: None,
            image_path: None,
            barcode: None,
        }
    }

    /// Product in a shared "General" category.
    pub async fn seed_product(db: &DbState, cost: f64, price: f64, stock: f64) -> Product {
        let categories = db.inner().categories();
        let existing = categories.list().await.unwrap();
        let category = match existing.into_iter().find(|c| c.name == "General") {
            Some(c) => c,
            None => categories.insert(&new_category("General")).await.unwrap(),
        };

        let count = db.inner().products().count().await.unwrap();
        let mut input = new_product(category.id, &format!("Producto {}", count + 1), stock);
        input.purchase_price = cost;
        input.sale_price = price;
        db.inner().products().insert(&input).await.unwrap()
    }
}
