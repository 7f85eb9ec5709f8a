//! # Sale Repository
//!
//! Database operations for sales, the revenue side of the ledger.
//!
//! ## Recording a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    record(NewSale)  (one transaction)                   │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── load product ─────────────── missing → ProductNotFound           │
//! │    ├── quantity > stock ? ───────── yes → InsufficientStock             │
//! │    ├── read retener_ganancias / porcentaje_retencion                    │
//! │    ├── SaleFigures::compute(qty, price, cost, policy)                   │
//! │    │     total = qty × price                                            │
//! │    │     gross = total − cost × qty                                     │
//! │    │     retention = gross × percent / 100  (0 when disabled)           │
//! │    │     net = gross − retention                                        │
//! │    ├── INSERT INTO ventas                                               │
//! │    └── UPDATE productos SET stock = stock − qty                         │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Derived fields are frozen when written. Changing the retention settings
//! later does not touch existing rows; editing a sale recomputes them from
//! the settings and purchase price current at the time of the edit.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::config::read_retention_policy;
use crate::repository::product::{apply_stock_delta, fetch_product};
use bizhome_core::retention::SaleFigures;
use bizhome_core::validation::{validate_sale_quantity, validate_unit_price};
use bizhome_core::{CoreError, NewSale, Product, Sale};

const SELECT_SALE: &str = r#"
    SELECT
        v.id,
        v.producto_id AS product_id,
        p.nombre AS product_name,
        p.tipo_unidad AS unit_type,
        v.cantidad AS quantity,
        v.precio_unitario AS unit_price,
        v.total,
        v.ganancia_bruta AS gross_profit,
        v.retencion AS retention,
        v.ganancia_neta AS net_profit,
        v.fecha AS date
    FROM ventas v
    LEFT JOIN productos p ON p.id = v.producto_id
"#;

async fn fetch_sale(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Sale>> {
    let sql = format!("{SELECT_SALE} WHERE v.id = ?1");
    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(sale)
}

async fn load_product(conn: &mut SqliteConnection, id: i64) -> DbResult<Product> {
    fetch_product(conn, id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(id).into())
}

fn ensure_stock(product: &Product, requested: f64) -> DbResult<()> {
    if !product.can_sell(requested) {
        return Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available: product.stock,
            requested,
        }
        .into());
    }
    Ok(())
}

fn validate_new_sale(sale: &NewSale) -> DbResult<()> {
    validate_sale_quantity(sale.quantity)?;
    validate_unit_price(sale.unit_price)?;
    Ok(())
}

/// Repository for sale database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.sales();
///
/// let sale = repo.record(&NewSale { product_id: 3, quantity: 2.0, unit_price: 15.0, date }).await?;
/// let history = repo.list().await?;
/// repo.delete(sale.id).await?; // stock comes back
/// ```
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// All sales, newest first, with product name and unit type.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let sql = format!("{SELECT_SALE} ORDER BY v.fecha DESC, v.id DESC");
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = sales.len(), "Listed sales");
        Ok(sales)
    }

    /// Gets a sale by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        fetch_sale(&mut *conn, id).await
    }

    /// Records a sale and takes its quantity from stock.
    ///
    /// ## Returns
    /// * `Ok(Sale)` - Stored sale with its derived money fields
    /// * `Err(CoreError::ProductNotFound)` - Unknown product
    /// * `Err(CoreError::InsufficientStock)` - Quantity exceeds stock
    /// * `Err(ValidationError)` - Quantity not positive
    pub async fn record(&self, sale: &NewSale) -> DbResult<Sale> {
        validate_new_sale(sale)?;
        debug!(product_id = sale.product_id, quantity = sale.quantity, "Recording sale");

        let mut tx = self.pool.begin().await?;

        let product = load_product(&mut *tx, sale.product_id).await?;
        ensure_stock(&product, sale.quantity)?;

        let policy = read_retention_policy(&mut *tx).await?;
        let figures = SaleFigures::compute(
            sale.quantity,
            sale.unit_price,
            product.purchase_price,
            policy,
        );

        let result = sqlx::query(
            r#"
            INSERT INTO ventas (
                producto_id, cantidad, precio_unitario,
                total, ganancia_bruta, retencion, ganancia_neta, fecha
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(sale.product_id)
        .bind(sale.quantity)
        .bind(sale.unit_price)
        .bind(figures.total)
        .bind(figures.gross_profit)
        .bind(figures.retention)
        .bind(figures.net_profit)
        .bind(sale.date)
        .execute(&mut *tx)
        .await?;
        let id = result.last_insert_rowid();

        apply_stock_delta(&mut *tx, sale.product_id, -sale.quantity).await?;

        let stored = fetch_sale(&mut *tx, id)
            .await?
            .ok_or(CoreError::SaleNotFound(id))?;
        tx.commit().await?;

        info!(
            id,
            product_id = sale.product_id,
            total = figures.total,
            retention = figures.retention,
            "Sale recorded"
        );
        Ok(stored)
    }

    /// Edits a sale and moves stock by the difference.
    ///
    /// Derived fields are recomputed from the current retention settings and
    /// the product's current purchase price. When the product changes, the
    /// old product gets its quantity back and the new one is charged in full.
    pub async fn update(&self, id: i64, sale: &NewSale) -> DbResult<Sale> {
        validate_new_sale(sale)?;
        debug!(id, product_id = sale.product_id, quantity = sale.quantity, "Updating sale");

        let mut tx = self.pool.begin().await?;

        let previous = fetch_sale(&mut *tx, id)
            .await?
            .ok_or(CoreError::SaleNotFound(id))?;
        let product = load_product(&mut *tx, sale.product_id).await?;

        if previous.product_id == sale.product_id {
            let increase = sale.quantity - previous.quantity;
            if increase > 0.0 {
                ensure_stock(&product, increase)?;
            }
            apply_stock_delta(&mut *tx, product.id, -increase).await?;
        } else {
            ensure_stock(&product, sale.quantity)?;
            apply_stock_delta(&mut *tx, previous.product_id, previous.quantity).await?;
            apply_stock_delta(&mut *tx, product.id, -sale.quantity).await?;
        }

        let policy = read_retention_policy(&mut *tx).await?;
        let figures = SaleFigures::compute(
            sale.quantity,
            sale.unit_price,
            product.purchase_price,
            policy,
        );

        sqlx::query(
            r#"
            UPDATE ventas SET
                producto_id = ?2,
                cantidad = ?3,
                precio_unitario = ?4,
                total = ?5,
                ganancia_bruta = ?6,
                retencion = ?7,
                ganancia_neta = ?8,
                fecha = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(sale.product_id)
        .bind(sale.quantity)
        .bind(sale.unit_price)
        .bind(figures.total)
        .bind(figures.gross_profit)
        .bind(figures.retention)
        .bind(figures.net_profit)
        .bind(sale.date)
        .execute(&mut *tx)
        .await?;

        let stored = fetch_sale(&mut *tx, id)
            .await?
            .ok_or(CoreError::SaleNotFound(id))?;
        tx.commit().await?;

        info!(id, total = figures.total, "Sale updated");
        Ok(stored)
    }

    /// Deletes a sale and returns its quantity to stock.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting sale");

        let mut tx = self.pool.begin().await?;

        let previous = fetch_sale(&mut *tx, id)
            .await?
            .ok_or(CoreError::SaleNotFound(id))?;

        apply_stock_delta(&mut *tx, previous.product_id, previous.quantity).await?;
        sqlx::query("DELETE FROM ventas WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(id, restored = previous.quantity, "Sale deleted");
        Ok(())
    }

    /// Sum of the retention set aside over every sale.
    pub async fn accumulated_retention(&self) -> DbResult<f64> {
        let total: f64 = sqlx::query_scalar("SELECT TOTAL(retencion) FROM ventas")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Number of sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ventas")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};
    use bizhome_core::{NewCategory, NewProduct, UnitType};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    async fn setup() -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cat = db
            .categories()
            .insert(&NewCategory {
                name: "Abarrotes".to_string(),
                description: None,
                icon: None,
            })
            .await
            .unwrap();
        let product = db
            .products()
            .insert(&NewProduct {
                name: "Arroz".to_string(),
                category_id: cat.id,
                purchase_price: 10.0,
                sale_price: 15.0,
                unit_type: UnitType::Libra,
                stock: 10.0,
                description: None,
                image_path: None,
                barcode: None,
            })
            .await
            .unwrap();
        (db, product)
    }

    fn sale(product_id: i64, quantity: f64) -> NewSale {
        NewSale {
            product_id,
            quantity,
            unit_price: 15.0,
            date: at(13, 10),
        }
    }

    async fn stock_of(db: &Database, id: i64) -> f64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_record_without_retention() {
        let (db, product) = setup().await;
        let stored = db.sales().record(&sale(product.id, 3.0)).await.unwrap();

        assert_eq!(stored.total, 45.0);
        assert_eq!(stored.gross_profit, 15.0);
        assert_eq!(stored.retention, 0.0);
        assert_eq!(stored.net_profit, stored.gross_profit);
        assert_eq!(stored.product_name.as_deref(), Some("Arroz"));
        assert_eq!(stored.unit_type, Some(UnitType::Libra));
        assert_eq!(stored.date, at(13, 10));
        assert_eq!(stock_of(&db, product.id).await, 7.0);
    }

    #[tokio::test]
    async fn test_record_with_retention() {
        let (db, product) = setup().await;
        db.config().set_retention(true, 20.0).await.unwrap();

        let stored = db.sales().record(&sale(product.id, 3.0)).await.unwrap();
        assert_eq!(stored.total, 45.0);
        assert_eq!(stored.gross_profit, 15.0);
        assert!((stored.retention - 3.0).abs() < 1e-9);
        assert!((stored.net_profit - 12.0).abs() < 1e-9);
        assert!((db.sales().accumulated_retention().await.unwrap() - 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_record_unknown_product() {
        let (db, _) = setup().await;
        let err = db.sales().record(&sale(999, 1.0)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(999))));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_record_insufficient_stock_leaves_no_trace() {
        let (db, product) = setup().await;
        let err = db.sales().record(&sale(product.id, 11.0)).await.unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock { .. })));
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(stock_of(&db, product.id).await, 10.0);
    }

    #[tokio::test]
    async fn test_record_rejects_zero_quantity() {
        let (db, product) = setup().await;
        let err = db.sales().record(&sale(product.id, 0.0)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_restores_stock() {
        let (db, product) = setup().await;
        let stored = db.sales().record(&sale(product.id, 4.0)).await.unwrap();
        assert_eq!(stock_of(&db, product.id).await, 6.0);

        db.sales().delete(stored.id).await.unwrap();
        assert_eq!(stock_of(&db, product.id).await, 10.0);
        assert!(db.sales().get_by_id(stored.id).await.unwrap().is_none());

        let err = db.sales().delete(stored.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::SaleNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_moves_stock_by_difference() {
        let (db, product) = setup().await;
        let stored = db.sales().record(&sale(product.id, 2.0)).await.unwrap();

        let updated = db.sales().update(stored.id, &sale(product.id, 5.0)).await.unwrap();
        assert_eq!(updated.total, 75.0);
        assert_eq!(stock_of(&db, product.id).await, 5.0);

        db.sales().update(stored.id, &sale(product.id, 1.0)).await.unwrap();
        assert_eq!(stock_of(&db, product.id).await, 9.0);

        // Increase of 10 with only 9 left
        let err = db.sales().update(stored.id, &sale(product.id, 11.0)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock { .. })));
        assert_eq!(stock_of(&db, product.id).await, 9.0);
    }

    #[tokio::test]
    async fn test_update_uses_current_settings() {
        let (db, product) = setup().await;
        let stored = db.sales().record(&sale(product.id, 3.0)).await.unwrap();
        assert_eq!(stored.retention, 0.0);

        db.config().set_retention(true, 20.0).await.unwrap();
        let updated = db.sales().update(stored.id, &sale(product.id, 3.0)).await.unwrap();
        assert!((updated.retention - 3.0).abs() < 1e-9);
        assert!((updated.net_profit - 12.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (db, product) = setup().await;
        let mut early = sale(product.id, 1.0);
        early.date = at(10, 9);
        db.sales().record(&early).await.unwrap();
        db.sales().record(&sale(product.id, 1.0)).await.unwrap();

        let dates: Vec<_> = db.sales().list().await.unwrap().into_iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![at(13, 10), at(10, 9)]);
    }
}
