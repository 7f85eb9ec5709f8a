//! # Category Repository
//!
//! Database operations for product categories.
//!
//! ## Deletion Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Deleting a Category                                  │
//! │                                                                         │
//! │  delete(4)                                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT COUNT(*) FROM productos WHERE categoria_id = 4                  │
//! │       │                                                                 │
//! │       ├── > 0 → CategoryInUse { id: 4, products: n }  (nothing deleted) │
//! │       │                                                                 │
//! │       └── = 0 → DELETE FROM categorias WHERE id = 4                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use bizhome_core::validation::validate_category;
use bizhome_core::{Category, CategorySales, CoreError, NewCategory};

/// Icon used when a category is saved without one.
pub const DEFAULT_CATEGORY_ICON: &str = "folder";

const SELECT_CATEGORY: &str = r#"
    SELECT
        c.id,
        c.nombre AS name,
        c.descripcion AS description,
        c.icono AS icon,
        (SELECT COUNT(*) FROM productos p WHERE p.categoria_id = c.id) AS product_count,
        c.created_at
    FROM categorias c
"#;

/// Repository for category database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.categories();
///
/// let bebidas = repo.insert(&NewCategory { name: "Bebidas".into(), ..Default::default() }).await?;
/// let all = repo.list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories by name, each with its product count.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let sql = format!("{SELECT_CATEGORY} ORDER BY c.nombre");
        let categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = categories.len(), "Listed categories");
        Ok(categories)
    }

    /// Gets a category by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Category))` - Category found
    /// * `Ok(None)` - Category not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let sql = format!("{SELECT_CATEGORY} WHERE c.id = ?1");
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    /// Inserts a new category.
    ///
    /// ## Returns
    /// * `Ok(Category)` - Stored category with generated id
    /// * `Err(DbError::UniqueViolation)` - Name already exists
    pub async fn insert(&self, category: &NewCategory) -> DbResult<Category> {
        validate_category(category)?;
        let name = category.name.trim();
        debug!(name = %name, "Inserting category");

        let result = sqlx::query(
            "INSERT INTO categorias (nombre, descripcion, icono) VALUES (?1, ?2, ?3)",
        )
        .bind(name)
        .bind(&category.description)
        .bind(icon_or_default(category))
        .execute(&self.pool)
        .await
        .map_err(|e| map_duplicate(e, name))?;

        let id = result.last_insert_rowid();
        info!(id, name = %name, "Category created");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Updates name, description and icon.
    pub async fn update(&self, id: i64, category: &NewCategory) -> DbResult<Category> {
        validate_category(category)?;
        let name = category.name.trim();
        debug!(id, name = %name, "Updating category");

        let result = sqlx::query(
            "UPDATE categorias SET nombre = ?2, descripcion = ?3, icono = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(name)
        .bind(&category.description)
        .bind(icon_or_default(category))
        .execute(&self.pool)
        .await
        .map_err(|e| map_duplicate(e, name))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::CategoryNotFound(id).into());
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::CategoryNotFound(id).into())
    }

    /// Deletes a category that no product references.
    ///
    /// ## Returns
    /// * `Err(CoreError::CategoryInUse)` - Products still reference it
    /// * `Err(CoreError::CategoryNotFound)` - No such category
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting category");

        let mut tx = self.pool.begin().await?;

        let products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM productos WHERE categoria_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if products > 0 {
            return Err(CoreError::CategoryInUse { id, products }.into());
        }

        let result = sqlx::query("DELETE FROM categorias WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::CategoryNotFound(id).into());
        }

        tx.commit().await?;
        info!(id, "Category deleted");
        Ok(())
    }

    /// Categories with their sales total and sale count, best sellers first.
    pub async fn with_sales(&self) -> DbResult<Vec<CategorySales>> {
        let rows = sqlx::query_as::<_, CategorySales>(
            r#"
            SELECT
                c.id,
                c.nombre AS name,
                c.icono AS icon,
                TOTAL(v.total) AS total_sales,
                COUNT(v.id) AS sale_count
            FROM categorias c
            LEFT JOIN productos p ON p.categoria_id = c.id
            LEFT JOIN ventas v ON v.producto_id = p.id
            GROUP BY c.id, c.nombre, c.icono
            ORDER BY total_sales DESC, c.nombre
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Number of categories.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categorias")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn icon_or_default(category: &NewCategory) -> &str {
    category
        .icon
        .as_deref()
        .map(str::trim)
        .filter(|icon| !icon.is_empty())
        .unwrap_or(DEFAULT_CATEGORY_ICON)
}

fn map_duplicate(err: sqlx::Error, name: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("nombre", name),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use bizhome_core::{NewProduct, UnitType};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            description: None,
            icon: None,
        }
    }

    #[tokio::test]
    async fn test_insert_defaults_icon() {
        let db = setup().await;
        let cat = db.categories().insert(&new_category("Bebidas")).await.unwrap();

        assert_eq!(cat.name, "Bebidas");
        assert_eq!(cat.icon, DEFAULT_CATEGORY_ICON);
        assert_eq!(cat.product_count, 0);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = setup().await;
        db.categories().insert(&new_category("Bebidas")).await.unwrap();

        let err = db.categories().insert(&new_category("Bebidas")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "Bebidas"));
    }

    #[tokio::test]
    async fn test_delete_in_use_category_fails() {
        let db = setup().await;
        let cat = db.categories().insert(&new_category("Granos")).await.unwrap();
        db.products()
            .insert(&NewProduct {
                name: "Arroz".to_string(),
                category_id: cat.id,
                purchase_price: 1.0,
                sale_price: 1.5,
                unit_type: UnitType::Libra,
                stock: 20.0,
                description: None,
                image_path: None,
                barcode: None,
            })
            .await
            .unwrap();

        let err = db.categories().delete(cat.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::CategoryInUse { products: 1, .. })
        ));
        assert!(db.categories().get_by_id(cat.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_unused_category() {
        let db = setup().await;
        let cat = db.categories().insert(&new_category("Limpieza")).await.unwrap();

        db.categories().delete(cat.id).await.unwrap();
        assert!(db.categories().get_by_id(cat.id).await.unwrap().is_none());

        let err = db.categories().delete(cat.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::CategoryNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_and_list_order() {
        let db = setup().await;
        let repo = db.categories();
        let b = repo.insert(&new_category("Snacks")).await.unwrap();
        repo.insert(&new_category("Abarrotes")).await.unwrap();

        let updated = repo
            .update(
                b.id,
                &NewCategory {
                    name: "Bebidas".to_string(),
                    description: Some("Frías".to_string()),
                    icon: Some("cup".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.icon, "cup");

        let names: Vec<_> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Abarrotes", "Bebidas"]);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_with_sales_includes_empty_categories() {
        let db = setup().await;
        db.categories().insert(&new_category("Vacía")).await.unwrap();

        let rows = db.categories().with_sales().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_sales, 0.0);
        assert_eq!(rows[0].sale_count, 0);
    }
}
