//! # Sale Commands
//!
//! Records sales with retention accounting. The repository computes total,
//! gross profit, retention and net profit inside the same transaction that
//! moves the stock; these commands fill in defaults and log.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::{Clock, DbState};
use bizhome_core::{NewSale, Sale};

/// Sale form as submitted by the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaleRequest {
    pub product_id: i64,
    pub quantity: f64,
    /// Defaults to the product's current sale price.
    #[serde(default)]
    pub unit_price: Option<f64>,
    /// Defaults to the local time of the call.
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
}

/// All sales, newest first, with product name and unit type.
pub async fn list_sales(db: &DbState) -> ApiResult<Vec<Sale>> {
    debug!("list_sales command");
    Ok(db.inner().sales().list().await?)
}

pub async fn get_sale(db: &DbState, id: i64) -> ApiResult<Sale> {
    debug!(id, "get_sale command");
    db.inner()
        .sales()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", id))
}

/// Records a sale and takes its quantity out of stock.
///
/// ## Errors
/// - `VALIDATION_ERROR`: quantity not above zero, negative price
/// - `NOT_FOUND`: unknown product
/// - `INSUFFICIENT_STOCK`: quantity above the available stock
pub async fn record_sale(db: &DbState, clock: &dyn Clock, request: RecordSaleRequest) -> ApiResult<Sale> {
    let start = Instant::now();
    debug!(product_id = request.product_id, quantity = request.quantity, "record_sale command");

    let unit_price = match request.unit_price {
        Some(price) => price,
        None => {
            db.inner()
                .products()
                .get_by_id(request.product_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Product", request.product_id))?
                .sale_price
        }
    };

    let new_sale = NewSale {
        product_id: request.product_id,
        quantity: request.quantity,
        unit_price,
        date: request.date.unwrap_or_else(|| clock.now_local()),
    };
    let sale = db.inner().sales().record(&new_sale).await?;

    info!(
        sale_id = sale.id,
        total = sale.total,
        retention = sale.retention,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Sale recorded"
    );
    Ok(sale)
}

/// Edits a sale. Derived figures are recomputed from the current retention
/// settings and the product's current purchase price.
pub async fn update_sale(db: &DbState, id: i64, input: NewSale) -> ApiResult<Sale> {
    debug!(id, product_id = input.product_id, "update_sale command");
    let sale = db.inner().sales().update(id, &input).await?;
    info!(sale_id = sale.id, total = sale.total, "Sale updated");
    Ok(sale)
}

/// Deletes a sale and returns its quantity to stock.
pub async fn delete_sale(db: &DbState, id: i64) -> ApiResult<()> {
    debug!(id, "delete_sale command");
    db.inner().sales().delete(id).await?;
    info!(sale_id = id, "Sale deleted");
    Ok(())
}

/// Sum of the retention withheld over all sales.
pub async fn accumulated_retention(db: &DbState) -> ApiResult<f64> {
    Ok(db.inner().sales().accumulated_retention().await?)
}
