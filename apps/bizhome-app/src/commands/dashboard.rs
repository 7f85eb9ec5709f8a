//! # Dashboard Commands
//!
//! Sales figures for the home screen, computed from the full sales and
//! product tables on every call.

use tracing::debug;

use crate::error::ApiResult;
use crate::state::{AppConfig, Clock, DbState};
use bizhome_core::summary::{self, SalesDashboard, SalesTotals, Window};

/// Today vs yesterday, this week, weekly trend and the top/low lists.
pub async fn sales_dashboard(db: &DbState, config: &AppConfig, clock: &dyn Clock) -> ApiResult<SalesDashboard> {
    debug!("sales_dashboard command");
    let sales = db.inner().sales().list().await?;
    let products = db.inner().products().list().await?;
    Ok(SalesDashboard::build(
        &sales,
        &products,
        clock.today(),
        config.low_stock_threshold,
        config.top_days,
    ))
}

/// Sales total and net profit in one window around today.
pub async fn sales_summary(db: &DbState, clock: &dyn Clock, window: Window) -> ApiResult<SalesTotals> {
    debug!(?window, "sales_summary command");
    let sales = db.inner().sales().list().await?;
    Ok(summary::summarize_sales(&sales, window, clock.today()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sale::{record_sale, RecordSaleRequest};
    use crate::commands::test_support::{clock_at, seed_product, setup};
    use bizhome_core::summary::Direction;
    use chrono::{Duration, NaiveDate};

    #[tokio::test]
    async fn test_dashboard_compares_days() {
        let db = setup().await;
        let config = AppConfig::in_memory();
        let clock = clock_at(2024, 6, 13, 10);
        let product = seed_product(&db, 10.0, 15.0, 12.0).await;

        let yesterday = Some(clock.now_local() - Duration::days(1));
        for (quantity, date) in [(1.0, yesterday), (2.0, None)] {
            record_sale(
                &db,
                &clock,
                RecordSaleRequest {
                    product_id: product.id,
                    quantity,
                    unit_price: None,
                    date,
                },
            )
            .await
            .unwrap();
        }

        let dashboard = sales_dashboard(&db, &config, &clock).await.unwrap();
        assert_eq!(dashboard.today.total, 30.0);
        assert_eq!(dashboard.yesterday.total, 15.0);
        assert_eq!(dashboard.week.total, 45.0);
        assert_eq!(dashboard.sales_vs_yesterday.direction, Direction::Up);
        assert!(dashboard.sales_vs_yesterday.favorable);
        assert_eq!(dashboard.top_products[0].quantity, 3.0);
        assert_eq!(dashboard.top_days.len(), 2);
        assert_eq!(dashboard.top_days[0].date, clock.today());
        assert_eq!(dashboard.top_days[0].total, 30.0);
        // 12 - 3 = 9 left, under the threshold of 10
        assert_eq!(dashboard.low_stock.len(), 1);
        assert_eq!(dashboard.weekly_trend.len(), 7);
    }

    #[tokio::test]
    async fn test_summary_for_month() {
        let db = setup().await;
        let clock = clock_at(2024, 6, 13, 10);
        let product = seed_product(&db, 10.0, 15.0, 50.0).await;

        let may = NaiveDate::from_ymd_opt(2024, 5, 30).unwrap().and_hms_opt(9, 0, 0);
        record_sale(
            &db,
            &clock,
            RecordSaleRequest {
                product_id: product.id,
                quantity: 4.0,
                unit_price: None,
                date: may,
            },
        )
        .await
        .unwrap();

        let june = sales_summary(&db, &clock, Window::Month { month: None }).await.unwrap();
        assert_eq!(june.total, 0.0);

        let month = "2024-05".parse().ok();
        let may_totals = sales_summary(&db, &clock, Window::Month { month }).await.unwrap();
        assert_eq!(may_totals.total, 60.0);
        assert_eq!(may_totals.count, 1);
    }
}
