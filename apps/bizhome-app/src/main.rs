//! # BizHome Entry Point
//!
//! Opens the configured database and prints today's figures. The hybrid UI
//! embeds `bizhome_app` as a library; this binary is for checking a
//! database from a terminal.
//!
//! ## Usage
//! ```bash
//! BIZHOME_DB_PATH=./bizhome_dev.db cargo run -p bizhome-app
//! ```

use bizhome_app::state::{AppConfig, Clock};
use bizhome_app::store::{Action, Store};
use bizhome_app::{init_tracing, App};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::from_env();
    let money = |amount: f64| config.format_currency(amount);

    let app = App::open(config.clone()).await?;
    let store = Store::new(app.clone());
    store.dispatch(Action::Refresh).await?;
    let state = store.snapshot();

    println!("BizHome · {}", app.clock.today());
    println!("Database: {}", config.database_path.display());
    println!();

    if let Some(dashboard) = &state.sales_dashboard {
        println!("Sales");
        println!("  Today:      {} ({} sales)", money(dashboard.today.total), dashboard.today.count);
        println!("  Yesterday:  {}", money(dashboard.yesterday.total));
        println!("  This week:  {}", money(dashboard.week.total));
        println!("  Net profit: {}", money(dashboard.today.profit));
        for product in &dashboard.top_products {
            println!("  Top: {} x{}", product.name, product.quantity);
        }
        for day in &dashboard.top_days {
            println!("  Best day: {} {}", day.date, money(day.total));
        }
        for product in &dashboard.low_stock {
            println!("  Low stock: {} ({})", product.name, product.stock);
        }
    }
    println!("  Accumulated retention: {}", money(state.accumulated_retention));
    println!();

    if let Some(summary) = &state.expense_summary {
        println!("Expenses");
        println!("  Today:      {}", money(summary.today));
        println!("  This week:  {}", money(summary.week));
        println!("  This month: {}", money(summary.month));
    }
    if let Some(limit) = &state.daily_limit {
        let flag = if limit.exceeded { "  ⚠ over limit" } else { "" };
        println!(
            "  Daily limit: {} of {} ({:.0}%){}",
            money(limit.spent),
            money(limit.limit),
            limit.percentage,
            flag
        );
    }

    Ok(())
}
