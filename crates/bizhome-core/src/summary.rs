//! # Summary Aggregator
//!
//! Buckets sales and expenses into calendar windows, compares periods and
//! builds the rankings shown on the dashboards.
//!
//! ## Windows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  reference = Thu 2024-06-13                                             │
//! │                                                                         │
//! │  Today  ─────────────────────────────►  2024-06-13                      │
//! │  Week   ─────────────────────────────►  Mon 06-10 ..= Sun 06-16         │
//! │           (or an explicit inclusive {start, end} override)              │
//! │  Month  ─────────────────────────────►  (2024, 6)                       │
//! │           (or an explicit "YYYY-MM" token)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function rescans its input; nothing is cached. Sums stay `f64`
//! until display.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{Expense, Product, Sale};

// =============================================================================
// Ledger Entries
// =============================================================================

/// Anything with a timestamp and an amount that can be bucketed by day.
pub trait LedgerEntry {
    fn timestamp(&self) -> NaiveDateTime;
    fn amount(&self) -> f64;

    #[inline]
    fn day(&self) -> NaiveDate {
        self.timestamp().date()
    }
}

impl LedgerEntry for Sale {
    fn timestamp(&self) -> NaiveDateTime {
        self.date
    }

    fn amount(&self) -> f64 {
        self.total
    }
}

impl LedgerEntry for Expense {
    fn timestamp(&self) -> NaiveDateTime {
        self.date
    }

    fn amount(&self) -> f64 {
        self.amount
    }
}

// =============================================================================
// Date Ranges
// =============================================================================

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Days of the range in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Monday-to-Sunday week containing `date`.
///
/// ## Example
/// ```rust
/// use bizhome_core::summary::week_range;
/// use chrono::NaiveDate;
///
/// let week = week_range(NaiveDate::from_ymd_opt(2024, 6, 13).unwrap());
/// assert_eq!(week.start, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
/// assert_eq!(week.end, NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());
/// ```
pub fn week_range(date: NaiveDate) -> DateRange {
    let offset = date.weekday().num_days_from_monday() as i64;
    let start = date - Duration::days(offset);
    DateRange::new(start, start + Duration::days(6))
}

/// The calendar day before `date`.
#[inline]
pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

// =============================================================================
// Year/Month Token
// =============================================================================

/// A `YYYY-MM` month selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for YearMonth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "month".to_string(),
            reason: format!("expected YYYY-MM, got '{}'", s),
        };

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }

        Ok(YearMonth { year, month })
    }
}

// =============================================================================
// Windows
// =============================================================================

/// Which slice of the ledger to sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Window {
    /// The reference date.
    Today,
    /// Week of the reference date, or an explicit inclusive range.
    Week { range: Option<DateRange> },
    /// Month of the reference date, or an explicit month.
    Month { month: Option<YearMonth> },
}

impl Window {
    /// Whether `date` falls in this window relative to `reference`.
    pub fn contains(&self, date: NaiveDate, reference: NaiveDate) -> bool {
        match self {
            Window::Today => date == reference,
            Window::Week { range } => range.unwrap_or_else(|| week_range(reference)).contains(date),
            Window::Month { month } => month.unwrap_or_else(|| YearMonth::of(reference)).contains(date),
        }
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Sales sums for one window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesTotals {
    pub total: f64,
    /// Sum of net profit.
    pub profit: f64,
    pub count: usize,
}

/// Sums sales in `window`.
pub fn summarize_sales(sales: &[Sale], window: Window, reference: NaiveDate) -> SalesTotals {
    sales
        .iter()
        .filter(|s| window.contains(s.day(), reference))
        .fold(SalesTotals::default(), |acc, s| SalesTotals {
            total: acc.total + s.total,
            profit: acc.profit + s.net_profit,
            count: acc.count + 1,
        })
}

/// Sums expense amounts in `window`.
pub fn summarize_expenses(expenses: &[Expense], window: Window, reference: NaiveDate) -> f64 {
    sum_in(expenses, window, reference)
}

/// Sums the amounts of any ledger entries in `window`.
pub fn sum_in<T: LedgerEntry>(entries: &[T], window: Window, reference: NaiveDate) -> f64 {
    entries
        .iter()
        .filter(|e| window.contains(e.day(), reference))
        .map(LedgerEntry::amount)
        .sum()
}

// =============================================================================
// Comparison
// =============================================================================

/// Whether an increase is good news.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum Polarity {
    /// Sales, profit: up is good.
    Revenue,
    /// Expenses: up is bad.
    Cost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

/// Period-over-period change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub current: f64,
    pub previous: f64,
    /// `current - previous`.
    pub difference: f64,
    pub direction: Direction,
    /// An unchanged value counts as an increase.
    pub favorable: bool,
}

/// Compares two period totals.
///
/// ## Example
/// ```rust
/// use bizhome_core::summary::{compare, Polarity};
///
/// let c = compare(120.0, 100.0, Polarity::Cost);
/// assert_eq!(c.difference, 20.0);
/// assert!(!c.favorable);
/// ```
pub fn compare(current: f64, previous: f64, polarity: Polarity) -> Comparison {
    let difference = current - previous;
    let direction = if difference > 0.0 {
        Direction::Up
    } else if difference < 0.0 {
        Direction::Down
    } else {
        Direction::Flat
    };
    let increased = difference >= 0.0;
    let favorable = match polarity {
        Polarity::Revenue => increased,
        Polarity::Cost => !increased,
    };

    Comparison {
        current,
        previous,
        difference,
        direction,
        favorable,
    }
}

// =============================================================================
// Rankings
// =============================================================================

/// Per-day total used in rankings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DayTotal {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total: f64,
    pub count: usize,
}

/// Groups entries by calendar date and returns the `n` largest days.
///
/// Ties are broken by the more recent date first.
pub fn top_days<T: LedgerEntry>(entries: &[T], n: usize) -> Vec<DayTotal> {
    let mut by_day: BTreeMap<NaiveDate, DayTotal> = BTreeMap::new();
    for entry in entries {
        let day = entry.day();
        let bucket = by_day.entry(day).or_insert(DayTotal {
            date: day,
            total: 0.0,
            count: 0,
        });
        bucket.total += entry.amount();
        bucket.count += 1;
    }

    let mut days: Vec<DayTotal> = by_day.into_values().collect();
    days.sort_by(|a, b| b.total.total_cmp(&a.total).then(b.date.cmp(&a.date)));
    days.truncate(n);
    days
}

/// Quantity sold of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: i64,
    pub name: String,
    pub quantity: f64,
    pub total: f64,
}

/// Products ranked by total quantity sold.
pub fn top_products(sales: &[Sale], n: usize) -> Vec<ProductSales> {
    let mut by_product: BTreeMap<i64, ProductSales> = BTreeMap::new();
    for sale in sales {
        let bucket = by_product.entry(sale.product_id).or_insert_with(|| ProductSales {
            product_id: sale.product_id,
            name: sale.product_name.clone().unwrap_or_default(),
            quantity: 0.0,
            total: 0.0,
        });
        bucket.quantity += sale.quantity;
        bucket.total += sale.total;
    }

    let mut ranked: Vec<ProductSales> = by_product.into_values().collect();
    ranked.sort_by(|a, b| b.quantity.total_cmp(&a.quantity));
    ranked.truncate(n);
    ranked
}

/// Products whose stock is below `threshold`, lowest first.
pub fn low_stock(products: &[Product], threshold: f64, n: usize) -> Vec<Product> {
    let mut low: Vec<Product> = products
        .iter()
        .filter(|p| p.stock < threshold)
        .cloned()
        .collect();
    low.sort_by(|a, b| a.stock.total_cmp(&b.stock));
    low.truncate(n);
    low
}

/// One day of the weekly trend chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total: f64,
    pub net_profit: f64,
}

/// Seven Monday-first buckets of the reference week.
pub fn weekly_trend(sales: &[Sale], reference: NaiveDate) -> Vec<TrendPoint> {
    week_range(reference)
        .days()
        .map(|day| {
            let totals = summarize_sales(sales, Window::Today, day);
            TrendPoint {
                date: day,
                total: totals.total,
                net_profit: totals.profit,
            }
        })
        .collect()
}

// =============================================================================
// Bundles
// =============================================================================

/// Everything the expense screen shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub today: f64,
    pub yesterday: f64,
    pub week: f64,
    pub month: f64,
    pub vs_yesterday: Comparison,
    pub ranking: Vec<DayTotal>,
}

impl ExpenseSummary {
    pub fn build(
        expenses: &[Expense],
        reference: NaiveDate,
        week: Option<DateRange>,
        month: Option<YearMonth>,
        top_n: usize,
    ) -> Self {
        let today = summarize_expenses(expenses, Window::Today, reference);
        let yesterday = summarize_expenses(expenses, Window::Today, previous_day(reference));

        ExpenseSummary {
            today,
            yesterday,
            week: summarize_expenses(expenses, Window::Week { range: week }, reference),
            month: summarize_expenses(expenses, Window::Month { month }, reference),
            vs_yesterday: compare(today, yesterday, Polarity::Cost),
            ranking: top_days(expenses, top_n),
        }
    }
}

/// Everything the sales dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesDashboard {
    pub today: SalesTotals,
    pub yesterday: SalesTotals,
    pub week: SalesTotals,
    pub sales_vs_yesterday: Comparison,
    pub profit_vs_yesterday: Comparison,
    pub weekly_trend: Vec<TrendPoint>,
    pub top_products: Vec<ProductSales>,
    /// Best sales days by total, all time.
    pub top_days: Vec<DayTotal>,
    pub low_stock: Vec<Product>,
}

/// Rows shown in each dashboard list.
pub const DASHBOARD_LIST_LEN: usize = 3;

impl SalesDashboard {
    pub fn build(
        sales: &[Sale],
        products: &[Product],
        reference: NaiveDate,
        low_stock_threshold: f64,
        top_n: usize,
    ) -> Self {
        let today = summarize_sales(sales, Window::Today, reference);
        let yesterday = summarize_sales(sales, Window::Today, previous_day(reference));

        SalesDashboard {
            today,
            yesterday,
            week: summarize_sales(sales, Window::Week { range: None }, reference),
            sales_vs_yesterday: compare(today.total, yesterday.total, Polarity::Revenue),
            profit_vs_yesterday: compare(today.profit, yesterday.profit, Polarity::Revenue),
            weekly_trend: weekly_trend(sales, reference),
            top_products: top_products(sales, DASHBOARD_LIST_LEN),
            top_days: top_days(sales, top_n),
            low_stock: low_stock(products, low_stock_threshold, DASHBOARD_LIST_LEN),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UnitType;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(date: NaiveDate, hour: u32) -> NaiveDateTime {
        date.and_hms_opt(hour, 0, 0).unwrap()
    }

    fn sale(id: i64, product_id: i64, date: NaiveDate, qty: f64, total: f64, net: f64) -> Sale {
        Sale {
            id,
            product_id,
            product_name: Some(format!("P{}", product_id)),
            unit_type: Some(UnitType::Unidad),
            quantity: qty,
            unit_price: total / qty,
            total,
            gross_profit: net,
            retention: 0.0,
            net_profit: net,
            date: at(date, 10),
        }
    }

    fn expense(id: i64, date: NaiveDate, amount: f64) -> Expense {
        Expense {
            id,
            description: "gasto".to_string(),
            amount,
            date: at(date, 9),
        }
    }

    fn product(id: i64, stock: f64) -> Product {
        Product {
            id,
            name: format!("P{}", id),
            category_id: 1,
            category_name: None,
            purchase_price: 1.0,
            sale_price: 2.0,
            unit_type: UnitType::Unidad,
            stock,
            description: None,
            image_path: None,
            barcode: None,
            created_at: at(d(2024, 1, 1), 0),
        }
    }

    #[test]
    fn test_week_range_monday_to_sunday() {
        let week = week_range(d(2024, 6, 13));
        assert_eq!(week, DateRange::new(d(2024, 6, 10), d(2024, 6, 16)));

        // Sunday belongs to the week that started six days earlier
        assert_eq!(week_range(d(2024, 6, 16)).start, d(2024, 6, 10));
        assert_eq!(week_range(d(2024, 6, 10)).start, d(2024, 6, 10));
    }

    #[test]
    fn test_year_month_parse() {
        assert_eq!("2024-06".parse::<YearMonth>().unwrap(), YearMonth { year: 2024, month: 6 });
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("2024/06".parse::<YearMonth>().is_err());
        assert!("24-06".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_windows() {
        let reference = d(2024, 6, 13);
        let sales = vec![
            sale(1, 1, d(2024, 6, 13), 1.0, 10.0, 4.0),
            sale(2, 1, d(2024, 6, 12), 2.0, 20.0, 8.0),
            sale(3, 2, d(2024, 6, 3), 1.0, 5.0, 1.0),
            sale(4, 2, d(2024, 5, 31), 1.0, 7.0, 2.0),
        ];

        let today = summarize_sales(&sales, Window::Today, reference);
        assert_eq!(today, SalesTotals { total: 10.0, profit: 4.0, count: 1 });

        let week = summarize_sales(&sales, Window::Week { range: None }, reference);
        assert_eq!(week.total, 30.0);

        let month = summarize_sales(&sales, Window::Month { month: None }, reference);
        assert_eq!(month.total, 35.0);

        let may = summarize_sales(
            &sales,
            Window::Month { month: Some(YearMonth { year: 2024, month: 5 }) },
            reference,
        );
        assert_eq!(may.total, 7.0);

        let custom = summarize_sales(
            &sales,
            Window::Week { range: Some(DateRange::new(d(2024, 5, 31), d(2024, 6, 3))) },
            reference,
        );
        assert_eq!(custom.total, 12.0);
    }

    #[test]
    fn test_compare_polarity() {
        let up = compare(150.0, 100.0, Polarity::Revenue);
        assert_eq!(up.direction, Direction::Up);
        assert!(up.favorable);

        let flat = compare(100.0, 100.0, Polarity::Revenue);
        assert_eq!(flat.direction, Direction::Flat);
        assert!(flat.favorable);

        let cheaper = compare(80.0, 100.0, Polarity::Cost);
        assert_eq!(cheaper.difference, -20.0);
        assert!(cheaper.favorable);
    }

    #[test]
    fn test_top_days_groups_and_ranks() {
        let expenses = vec![
            expense(1, d(2024, 6, 1), 100.0),
            expense(2, d(2024, 6, 1), 50.0),
            expense(3, d(2024, 6, 2), 300.0),
            expense(4, d(2024, 6, 3), 10.0),
        ];

        let ranking = top_days(&expenses, 2);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].date, d(2024, 6, 2));
        assert_eq!(ranking[1].date, d(2024, 6, 1));
        assert_eq!(ranking[1].total, 150.0);
        assert_eq!(ranking[1].count, 2);
    }

    #[test]
    fn test_top_products_and_low_stock() {
        let sales = vec![
            sale(1, 1, d(2024, 6, 1), 2.0, 4.0, 1.0),
            sale(2, 2, d(2024, 6, 1), 5.0, 5.0, 1.0),
            sale(3, 1, d(2024, 6, 2), 4.0, 8.0, 2.0),
        ];
        let top = top_products(&sales, 3);
        assert_eq!(top[0].product_id, 1);
        assert_eq!(top[0].quantity, 6.0);

        let products = vec![product(1, 12.0), product(2, 3.0), product(3, 0.5), product(4, 9.0), product(5, 1.0)];
        let low: Vec<i64> = low_stock(&products, 10.0, 3).iter().map(|p| p.id).collect();
        assert_eq!(low, vec![3, 5, 2]);
    }

    #[test]
    fn test_weekly_trend_has_seven_days() {
        let sales = vec![
            sale(1, 1, d(2024, 6, 10), 1.0, 10.0, 3.0),
            sale(2, 1, d(2024, 6, 16), 1.0, 20.0, 5.0),
            sale(3, 1, d(2024, 6, 17), 1.0, 99.0, 9.0),
        ];
        let trend = weekly_trend(&sales, d(2024, 6, 13));
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].date, d(2024, 6, 10));
        assert_eq!(trend[0].total, 10.0);
        assert_eq!(trend[6].total, 20.0);
        assert_eq!(trend[6].net_profit, 5.0);
    }

    #[test]
    fn test_expense_summary_bundle() {
        let expenses = vec![
            expense(1, d(2024, 6, 13), 550.0),
            expense(2, d(2024, 6, 12), 100.0),
            expense(3, d(2024, 5, 2), 40.0),
        ];
        let summary = ExpenseSummary::build(&expenses, d(2024, 6, 13), None, None, 5);
        assert_eq!(summary.today, 550.0);
        assert_eq!(summary.yesterday, 100.0);
        assert_eq!(summary.week, 650.0);
        assert_eq!(summary.month, 650.0);
        assert!(!summary.vs_yesterday.favorable);
        assert_eq!(summary.ranking.len(), 3);
    }

    #[test]
    fn test_sales_dashboard_ranks_days() {
        let sales = vec![
            sale(1, 1, d(2024, 6, 11), 1.0, 40.0, 10.0),
            sale(2, 2, d(2024, 6, 11), 1.0, 35.0, 10.0),
            sale(3, 1, d(2024, 6, 12), 1.0, 60.0, 10.0),
            sale(4, 1, d(2024, 6, 13), 1.0, 5.0, 1.0),
        ];
        let dashboard = SalesDashboard::build(&sales, &[], d(2024, 6, 13), 10.0, 2);

        assert_eq!(dashboard.top_days.len(), 2);
        assert_eq!(dashboard.top_days[0].date, d(2024, 6, 11));
        assert_eq!(dashboard.top_days[0].total, 75.0);
        assert_eq!(dashboard.top_days[0].count, 2);
        assert_eq!(dashboard.top_days[1].date, d(2024, 6, 12));
    }
}
