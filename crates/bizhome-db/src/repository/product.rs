//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Listing with the joined category name
//! - CRUD operations
//! - Direct stock adjustments
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Moves Stock                                      │
//! │                                                                         │
//! │  SaleRepository::record   → stock - quantity      (guarded, same tx)    │
//! │  SaleRepository::update   → stock - (new - old)   (guarded, same tx)    │
//! │  SaleRepository::delete   → stock + quantity      (same tx)             │
//! │  ProductRepository::adjust_stock → stock + delta  (unguarded)           │
//! │                                                                         │
//! │  All of them are delta updates:                                         │
//! │     UPDATE productos SET stock = stock + ?2 WHERE id = ?1               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;
use bizhome_core::validation::{validate_product, validate_stock_delta};
use bizhome_core::{CoreError, NewProduct, Product};

const SELECT_PRODUCT: &str = r#"
    SELECT
        p.id,
        p.nombre AS name,
        p.categoria_id AS category_id,
        c.nombre AS category_name,
        p.precio_compra AS purchase_price,
        p.precio_venta AS sale_price,
        p.tipo_unidad AS unit_type,
        p.stock,
        p.descripcion AS description,
        p.imagen_path AS image_path,
        p.codigo_barras AS barcode,
        p.created_at
    FROM productos p
    LEFT JOIN categorias c ON c.id = p.categoria_id
"#;

/// Loads a product on an existing connection (used inside sale transactions).
pub(crate) async fn fetch_product(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Product>> {
    let sql = format!("{SELECT_PRODUCT} WHERE p.id = ?1");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

/// Applies a stock delta on an existing connection.
pub(crate) async fn apply_stock_delta(conn: &mut SqliteConnection, id: i64, delta: f64) -> DbResult<()> {
    let result = sqlx::query("UPDATE productos SET stock = stock + ?2 WHERE id = ?1")
        .bind(id)
        .bind(delta)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::ProductNotFound(id).into());
    }
    Ok(())
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let products = repo.list().await?;
/// let arroz = repo.get_by_id(3).await?;
/// let remaining = repo.adjust_stock(3, 25.0).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products by name, with their category name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCT} ORDER BY p.nombre");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Lists the products of one category.
    pub async fn list_by_category(&self, category_id: i64) -> DbResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE p.categoria_id = ?1 ORDER BY p.nombre");
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut *conn, id).await
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Stored product with generated id
    /// * `Err(ValidationError)` - Name, prices or margin rejected
    /// * `Err(DbError::ForeignKeyViolation)` - Category doesn't exist
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        validate_product(product)?;
        debug!(name = %product.name, category_id = product.category_id, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO productos (
                nombre, categoria_id, precio_compra, precio_venta,
                tipo_unidad, stock, descripcion, imagen_path, codigo_barras
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(product.name.trim())
        .bind(product.category_id)
        .bind(product.purchase_price)
        .bind(product.sale_price)
        .bind(product.unit_type)
        .bind(product.stock)
        .bind(&product.description)
        .bind(&product.image_path)
        .bind(&product.barcode)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(id, name = %product.name, "Product created");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id).into())
    }

    /// Replaces every editable field of a product, stock included.
    pub async fn update(&self, id: i64, product: &NewProduct) -> DbResult<Product> {
        validate_product(product)?;
        debug!(id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE productos SET
                nombre = ?2,
                categoria_id = ?3,
                precio_compra = ?4,
                precio_venta = ?5,
                tipo_unidad = ?6,
                stock = ?7,
                descripcion = ?8,
                imagen_path = ?9,
                codigo_barras = ?10
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(product.name.trim())
        .bind(product.category_id)
        .bind(product.purchase_price)
        .bind(product.sale_price)
        .bind(product.unit_type)
        .bind(product.stock)
        .bind(&product.description)
        .bind(&product.image_path)
        .bind(&product.barcode)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id).into());
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id).into())
    }

    /// Deletes a product.
    ///
    /// Products with recorded sales are kept: the sale rows reference them and
    /// the delete fails with `DbError::ForeignKeyViolation`.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM productos WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id).into());
        }

        info!(id, "Product deleted");
        Ok(())
    }

    /// Adds `delta` to the stock (negative to remove) and returns the new level.
    ///
    /// Not clamped: restocks and manual corrections may leave any value.
    pub async fn adjust_stock(&self, id: i64, delta: f64) -> DbResult<f64> {
        validate_stock_delta(delta)?;
        debug!(id, delta, "Adjusting stock");

        let mut tx = self.pool.begin().await?;
        apply_stock_delta(&mut *tx, id, delta).await?;
        let stock: f64 = sqlx::query_scalar("SELECT stock FROM productos WHERE id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(stock)
    }

    /// Number of products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM productos")
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
    use bizhome_core::{NewCategory, NewSale, UnitType, ValidationError};
    use chrono::NaiveDate;

    async fn setup() -> (Database, i64) {
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
        (db, cat.id)
    }

    fn arroz(category_id: i64) -> NewProduct {
        NewProduct {
            name: "Arroz".to_string(),
            category_id,
            purchase_price: 10.0,
            sale_price: 15.0,
            unit_type: UnitType::Libra,
            stock: 20.0,
            description: None,
            image_path: None,
            barcode: Some("7401234567890".to_string()),
        }
    }

    #[tokio::test]
    async fn test_insert_joins_category_name() {
        let (db, cat) = setup().await;
        let product = db.products().insert(&arroz(cat)).await.unwrap();

        assert_eq!(product.category_name.as_deref(), Some("Abarrotes"));
        assert_eq!(product.unit_type, UnitType::Libra);
        assert_eq!(product.stock, 20.0);
        assert_eq!(db.products().list_by_category(cat).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_low_margin() {
        let (db, cat) = setup().await;
        let mut product = arroz(cat);
        product.sale_price = 10.4;

        let err = db.products().insert(&product).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::MarginTooLow { .. }))
        ));
    }

    #[tokio::test]
    async fn test_insert_unknown_category_fails() {
        let (db, _) = setup().await;
        let err = db.products().insert(&arroz(999)).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_adjust_stock_is_unclamped() {
        let (db, cat) = setup().await;
        let product = db.products().insert(&arroz(cat)).await.unwrap();

        assert_eq!(db.products().adjust_stock(product.id, 5.5).await.unwrap(), 25.5);
        assert_eq!(db.products().adjust_stock(product.id, -30.0).await.unwrap(), -4.5);

        let err = db.products().adjust_stock(404, 1.0).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(404))));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (db, cat) = setup().await;
        let product = db.products().insert(&arroz(cat)).await.unwrap();

        let mut edit = arroz(cat);
        edit.name = "Arroz Blanco".to_string();
        edit.sale_price = 16.0;
        let updated = db.products().update(product.id, &edit).await.unwrap();
        assert_eq!(updated.name, "Arroz Blanco");
        assert_eq!(updated.sale_price, 16.0);

        db.products().delete(product.id).await.unwrap();
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_product_with_sales_cannot_be_deleted() {
        let (db, cat) = setup().await;
        let product = db.products().insert(&arroz(cat)).await.unwrap();
        db.sales()
            .record(&NewSale {
                product_id: product.id,
                quantity: 1.0,
                unit_price: 15.0,
                date: NaiveDate::from_ymd_opt(2024, 6, 13)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap(),
            })
            .await
            .unwrap();

        let err = db.products().delete(product.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
