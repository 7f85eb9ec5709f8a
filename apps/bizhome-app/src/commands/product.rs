//! # Product Commands
//!
//! Catalog maintenance and direct stock adjustment.
//!
//! ## Stock Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Changes productos.stock                          │
//! │                                                                         │
//! │  create_product ──────────► initial stock                               │
//! │  adjust_stock(+/-delta) ──► stock + delta   (restock, shrinkage; may    │
//! │                                              go negative)               │
//! │  record_sale ─────────────► stock - quantity        ┐                   │
//! │  update_sale ─────────────► stock - (new - old)     ├─ same transaction │
//! │  delete_sale ─────────────► stock + quantity        ┘  as the sale row  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::DbState;
use bizhome_core::{NewProduct, Product};

/// Product as sent to the UI.
///
/// Adds the markup over purchase price the product form shows next to the
/// prices.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    #[serde(flatten)]
    pub product: Product,
    /// `None` when the purchase price is zero.
    pub margin_percent: Option<f64>,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        ProductDto {
            margin_percent: product.margin_percent(),
            product,
        }
    }
}

pub async fn list_products(db: &DbState) -> ApiResult<Vec<ProductDto>> {
    debug!("list_products command");
    let products = db.inner().products().list().await?;
    Ok(products.into_iter().map(ProductDto::from).collect())
}

pub async fn list_products_by_category(db: &DbState, category_id: i64) -> ApiResult<Vec<ProductDto>> {
    debug!(category_id, "list_products_by_category command");
    let products = db.inner().products().list_by_category(category_id).await?;
    Ok(products.into_iter().map(ProductDto::from).collect())
}

/// Gets a single product.
///
/// ## Returns
/// The product if found, or `NOT_FOUND`
pub async fn get_product(db: &DbState, id: i64) -> ApiResult<ProductDto> {
    debug!(id, "get_product command");
    let product = db
        .inner()
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;
    Ok(ProductDto::from(product))
}

pub async fn create_product(db: &DbState, input: NewProduct) -> ApiResult<ProductDto> {
    debug!(name = %input.name, category_id = input.category_id, "create_product command");
    let product = db.inner().products().insert(&input).await?;
    Ok(ProductDto::from(product))
}

pub async fn update_product(db: &DbState, id: i64, input: NewProduct) -> ApiResult<ProductDto> {
    debug!(id, "update_product command");
    let product = db.inner().products().update(id, &input).await?;
    Ok(ProductDto::from(product))
}

/// Deletes a product. Products with recorded sales can't be deleted.
pub async fn delete_product(db: &DbState, id: i64) -> ApiResult<()> {
    debug!(id, "delete_product command");
    Ok(db.inner().products().delete(id).await?)
}

/// Adds `delta` (negative to remove) to a product's stock.
///
/// ## Returns
/// The stock after the adjustment.
pub async fn adjust_stock(db: &DbState, id: i64, delta: f64) -> ApiResult<f64> {
    let stock = db.inner().products().adjust_stock(id, delta).await?;
    info!(id, delta, stock, "Stock adjusted");
    Ok(stock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::category::create_category;
    use crate::commands::test_support::{new_category, new_product, setup};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_create_reports_margin() {
        let db = setup().await;
        let cat = create_category(&db, new_category("Granos")).await.unwrap();

        let mut input = new_product(cat.id, "Arroz", 20.0);
        input.purchase_price = 10.0;
        input.sale_price = 15.0;
        let dto = create_product(&db, input).await.unwrap();

        assert_eq!(dto.margin_percent, Some(50.0));
        assert_eq!(dto.product.category_name.as_deref(), Some("Granos"));

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["name"], "Arroz");
        assert_eq!(json["marginPercent"], 50.0);
    }

    #[tokio::test]
    async fn test_adjust_stock_is_unclamped() {
        let db = setup().await;
        let cat = create_category(&db, new_category("Granos")).await.unwrap();
        let dto = create_product(&db, new_product(cat.id, "Arroz", 5.0)).await.unwrap();

        assert_eq!(adjust_stock(&db, dto.product.id, 10.0).await.unwrap(), 15.0);
        assert_eq!(adjust_stock(&db, dto.product.id, -20.0).await.unwrap(), -5.0);

        let err = adjust_stock(&db, dto.product.id, f64::NAN).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let db = setup().await;
        let err = get_product(&db, 404).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = adjust_stock(&db, 404, 1.0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let db = setup().await;
        let granos = create_category(&db, new_category("Granos")).await.unwrap();
        let bebidas = create_category(&db, new_category("Bebidas")).await.unwrap();
        create_product(&db, new_product(granos.id, "Arroz", 5.0)).await.unwrap();
        create_product(&db, new_product(bebidas.id, "Agua", 5.0)).await.unwrap();

        let only_granos = list_products_by_category(&db, granos.id).await.unwrap();
        assert_eq!(only_granos.len(), 1);
        assert_eq!(only_granos[0].product.name, "Arroz");
        assert_eq!(list_products(&db).await.unwrap().len(), 2);
    }
}
