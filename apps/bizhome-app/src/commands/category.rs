//! # Category Commands
//!
//! Catalog folders. A category can only be deleted once no product uses it.

use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::DbState;
use bizhome_core::{Category, CategorySales, NewCategory};

/// All categories with their product counts, by name.
pub async fn list_categories(db: &DbState) -> ApiResult<Vec<Category>> {
    debug!("list_categories command");
    Ok(db.inner().categories().list().await?)
}

pub async fn get_category(db: &DbState, id: i64) -> ApiResult<Category> {
    debug!(id, "get_category command");
    db.inner()
        .categories()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", id))
}

/// Creates a category. Names are unique; the icon defaults to `folder`.
pub async fn create_category(db: &DbState, input: NewCategory) -> ApiResult<Category> {
    debug!(name = %input.name, "create_category command");
    Ok(db.inner().categories().insert(&input).await?)
}

pub async fn update_category(db: &DbState, id: i64, input: NewCategory) -> ApiResult<Category> {
    debug!(id, name = %input.name, "update_category command");
    Ok(db.inner().categories().update(id, &input).await?)
}

/// Deletes a category.
///
/// ## Errors
/// - `CONSTRAINT_VIOLATION` while products still reference it
/// - `NOT_FOUND` when the id doesn't exist
pub async fn delete_category(db: &DbState, id: i64) -> ApiResult<()> {
    debug!(id, "delete_category command");
    Ok(db.inner().categories().delete(id).await?)
}

/// Categories with their sales total and sale count, best selling first.
pub async fn categories_with_sales(db: &DbState) -> ApiResult<Vec<CategorySales>> {
    debug!("categories_with_sales command");
    Ok(db.inner().categories().with_sales().await?)
}
