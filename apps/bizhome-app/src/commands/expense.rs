//! # Expense Commands
//!
//! Household expenses, their summaries, and the daily spending limit.
//!
//! ## Daily Limit Alert
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_expense / update_expense                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  check_daily_limit                                                      │
//! │       │  spent = SUM(gastos_hogar today)   limit = limite_diario_gastos │
//! │       ▼                                                                 │
//! │  exceeded AND ultima_alerta_limite != today ?                           │
//! │       │ yes                               │ no                          │
//! │       ▼                                   ▼                             │
//! │  notifier.notify(DailyLimitExceeded)     (nothing)                      │
//! │  ultima_alerta_limite = today                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The alert fires whether or not notifications are enabled in settings.
//! A failed check is logged and never fails the save that triggered it.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::{AppConfig, Clock, DbState, NotificationEvent, Notifier};
use bizhome_core::budget::{should_alert, DailyLimitStatus};
use bizhome_core::expense_category::{classify, CategoryLabel};
use bizhome_core::summary::{DateRange, ExpenseSummary, YearMonth};
use bizhome_core::{Expense, NewExpense};

/// Expense with its keyword category, as listed in the UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDto {
    #[serde(flatten)]
    pub expense: Expense,
    pub category: CategoryLabel,
}

impl From<Expense> for ExpenseDto {
    fn from(expense: Expense) -> Self {
        ExpenseDto {
            category: classify(&expense.description).label(),
            expense,
        }
    }
}

/// Expense form as submitted by the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddExpenseRequest {
    pub description: String,
    pub amount: f64,
    /// Defaults to the local time of the call.
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
}

/// Optional overrides of the summary windows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    /// Inclusive start of a custom week. Needs `week_end`.
    pub week_start: Option<NaiveDate>,
    /// Inclusive end of a custom week. Needs `week_start`.
    pub week_end: Option<NaiveDate>,
    /// `YYYY-MM`
    pub month: Option<String>,
}

impl SummaryQuery {
    fn week(&self) -> ApiResult<Option<DateRange>> {
        match (self.week_start, self.week_end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) if start <= end => Ok(Some(DateRange::new(start, end))),
            (Some(_), Some(_)) => Err(ApiError::validation("Week start must not be after week end")),
            _ => Err(ApiError::validation("A custom week needs both start and end")),
        }
    }

    fn month(&self) -> ApiResult<Option<YearMonth>> {
        self.month
            .as_deref()
            .map(|m| m.parse::<YearMonth>().map_err(ApiError::from))
            .transpose()
    }
}

/// All expenses, newest first.
pub async fn list_expenses(db: &DbState) -> ApiResult<Vec<ExpenseDto>> {
    debug!("list_expenses command");
    let expenses = db.inner().expenses().list().await?;
    Ok(expenses.into_iter().map(ExpenseDto::from).collect())
}

/// Records an expense, then checks today's total against the daily limit.
pub async fn add_expense(
    db: &DbState,
    clock: &dyn Clock,
    notifier: &dyn Notifier,
    request: AddExpenseRequest,
) -> ApiResult<ExpenseDto> {
    debug!(amount = request.amount, "add_expense command");

    let new_expense = NewExpense {
        description: request.description,
        amount: request.amount,
        date: request.date.unwrap_or_else(|| clock.now_local()),
    };
    let expense = db.inner().expenses().insert(&new_expense).await?;
    info!(expense_id = expense.id, amount = expense.amount, "Expense recorded");

    alert_if_over_limit(db, clock, notifier).await;
    Ok(ExpenseDto::from(expense))
}

pub async fn update_expense(
    db: &DbState,
    clock: &dyn Clock,
    notifier: &dyn Notifier,
    id: i64,
    input: NewExpense,
) -> ApiResult<ExpenseDto> {
    debug!(id, "update_expense command");
    let expense = db.inner().expenses().update(id, &input).await?;
    alert_if_over_limit(db, clock, notifier).await;
    Ok(ExpenseDto::from(expense))
}

/// Runs the limit check after a committed write.
async fn alert_if_over_limit(db: &DbState, clock: &dyn Clock, notifier: &dyn Notifier) {
    if let Err(e) = check_daily_limit(db, clock, notifier).await {
        warn!(code = ?e.code, error = %e.message, "Daily limit check failed");
    }
}

pub async fn delete_expense(db: &DbState, id: i64) -> ApiResult<()> {
    debug!(id, "delete_expense command");
    Ok(db.inner().expenses().delete(id).await?)
}

/// Today's spending against the configured limit.
pub async fn daily_limit_status(db: &DbState, clock: &dyn Clock) -> ApiResult<DailyLimitStatus> {
    let today = clock.today();
    let spent = db.inner().expenses().total_for_day(today).await?;
    let limit = db.inner().config().daily_limit().await?;
    Ok(DailyLimitStatus::evaluate(spent, limit))
}

/// Evaluates the daily limit and raises the alert at most once per day.
pub async fn check_daily_limit(
    db: &DbState,
    clock: &dyn Clock,
    notifier: &dyn Notifier,
) -> ApiResult<DailyLimitStatus> {
    let today = clock.today();
    let status = daily_limit_status(db, clock).await?;
    let last_alert = db.inner().config().last_limit_alert().await?;

    if should_alert(&status, last_alert, today) {
        notifier.notify(&NotificationEvent::DailyLimitExceeded {
            date: today,
            spent: status.spent,
            limit: status.limit,
        });
        db.inner().config().set_last_limit_alert(today).await?;
        info!(%today, spent = status.spent, limit = status.limit, "Daily limit alert raised");
    }

    Ok(status)
}

/// Today / yesterday / week / month totals and the top spending days.
pub async fn expense_summary(
    db: &DbState,
    config: &AppConfig,
    clock: &dyn Clock,
    query: SummaryQuery,
) -> ApiResult<ExpenseSummary> {
    debug!(?query, "expense_summary command");
    let week = query.week()?;
    let month = query.month()?;

    let expenses = db.inner().expenses().list().await?;
    Ok(ExpenseSummary::build(&expenses, clock.today(), week, month, config.top_days))
}

/// Category the classifier assigns to a description.
pub fn classify_expense(description: &str) -> CategoryLabel {
    classify(description).label()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::settings::set_daily_limit;
    use crate::commands::test_support::{clock_at, setup};
    use crate::error::ErrorCode;
    use crate::state::RecordingNotifier;
    use chrono::Duration;

    fn request(description: &str, amount: f64) -> AddExpenseRequest {
        AddExpenseRequest {
            description: description.to_string(),
            amount,
            date: None,
        }
    }

    #[tokio::test]
    async fn test_add_classifies() {
        let db = setup().await;
        let clock = clock_at(2024, 6, 13, 9);
        let notifier = RecordingNotifier::new();

        let dto = add_expense(&db, &clock, &notifier, request("Almuerzo con clientes", 12.0))
            .await
            .unwrap();
        assert_eq!(dto.category.name, "Alimentación");
        assert_eq!(dto.expense.date, clock.now_local());

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["amount"], 12.0);
        assert_eq!(json["category"]["icon"], "restaurant");
    }

    #[tokio::test]
    async fn test_limit_alert_once_per_day() {
        let db = setup().await;
        let clock = clock_at(2024, 6, 13, 9);
        let notifier = RecordingNotifier::new();

        add_expense(&db, &clock, &notifier, request("Supermercado", 300.0)).await.unwrap();
        assert!(notifier.events().is_empty());

        add_expense(&db, &clock, &notifier, request("Gasolina", 250.0)).await.unwrap();
        add_expense(&db, &clock, &notifier, request("Farmacia", 20.0)).await.unwrap();

        let today = clock.today();
        assert_eq!(
            notifier.events(),
            vec![NotificationEvent::DailyLimitExceeded {
                date: today,
                spent: 550.0,
                limit: 500.0,
            }]
        );
        assert_eq!(db.inner().config().last_limit_alert().await.unwrap(), Some(today));

        // Next day starts from zero
        clock.advance(Duration::days(1));
        add_expense(&db, &clock, &notifier, request("Cine", 600.0)).await.unwrap();
        assert_eq!(notifier.events().len(), 2);
    }

    #[tokio::test]
    async fn test_save_survives_failed_limit_check() {
        let db = setup().await;
        let clock = clock_at(2024, 6, 13, 9);
        let notifier = RecordingNotifier::new();
        sqlx::query("DROP TABLE configuracion")
            .execute(db.inner().pool())
            .await
            .unwrap();

        let dto = add_expense(&db, &clock, &notifier, request("Gasolina", 900.0))
            .await
            .unwrap();
        let input = NewExpense {
            description: "Gasolina".to_string(),
            amount: 950.0,
            date: dto.expense.date,
        };
        let updated = update_expense(&db, &clock, &notifier, dto.expense.id, input)
            .await
            .unwrap();

        assert_eq!(updated.expense.amount, 950.0);
        assert_eq!(list_expenses(&db).await.unwrap().len(), 1);
        assert!(notifier.events().is_empty());
        assert!(check_daily_limit(&db, &clock, &notifier).await.is_err());
    }

    #[tokio::test]
    async fn test_status_uses_configured_limit() {
        let db = setup().await;
        let clock = clock_at(2024, 6, 13, 9);
        let notifier = RecordingNotifier::new();
        set_daily_limit(&db, 100.0).await.unwrap();

        add_expense(&db, &clock, &notifier, request("Luz", 80.0)).await.unwrap();
        let status = daily_limit_status(&db, &clock).await.unwrap();
        assert_eq!(status.limit, 100.0);
        assert_eq!(status.percentage, 80.0);
        assert!(!status.exceeded);
    }

    #[tokio::test]
    async fn test_summary_windows() {
        let db = setup().await;
        let config = AppConfig::in_memory();
        let clock = clock_at(2024, 6, 13, 9);
        let notifier = RecordingNotifier::new();

        let on = |day: u32| {
            NaiveDate::from_ymd_opt(2024, 6, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
        };
        for (day, amount) in [(13, 40.0), (12, 60.0), (3, 100.0)] {
            add_expense(
                &db,
                &clock,
                &notifier,
                AddExpenseRequest {
                    description: "Compras".to_string(),
                    amount,
                    date: on(day),
                },
            )
            .await
            .unwrap();
        }

        let summary = expense_summary(&db, &config, &clock, SummaryQuery::default())
            .await
            .unwrap();
        assert_eq!(summary.today, 40.0);
        assert_eq!(summary.yesterday, 60.0);
        assert_eq!(summary.week, 100.0);
        assert_eq!(summary.month, 200.0);
        assert_eq!(summary.ranking[0].total, 100.0);

        let query = SummaryQuery {
            month: Some("2024-05".to_string()),
            ..SummaryQuery::default()
        };
        let summary = expense_summary(&db, &config, &clock, query).await.unwrap();
        assert_eq!(summary.month, 0.0);

        let query = SummaryQuery {
            month: Some("junio".to_string()),
            ..SummaryQuery::default()
        };
        let err = expense_summary(&db, &config, &clock, query).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_classify_fallback() {
        assert_eq!(classify_expense("???").name, "Otros");
    }
}
