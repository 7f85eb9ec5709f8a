//! # View-State Store
//!
//! Single owner of what the UI renders. UI actions go through
//! [`Store::dispatch`]; subscribers get a fresh snapshot after every action.
//!
//! ## Dispatch Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  UI ──dispatch(Action)──► Store                                         │
//! │                             │                                           │
//! │                             ├─► loading = true ──► publish              │
//! │                             │                                           │
//! │                             ├─► run command (commands::*)               │
//! │                             │        │                                  │
//! │                             │        ├── Err ──► last_error ──► publish │
//! │                             │        ▼                                  │
//! │                             ├─► refresh: re-read full tables,           │
//! │                             │   recompute dashboard + summaries         │
//! │                             │                                           │
//! │                             └─► loading = false ──► publish             │
//! │                                                        │                │
//! │  subscribers ◄──── watch::Receiver<ViewState> ◄────────┘                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is cached between actions: every refresh rescans the ledger.

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::commands::expense::{AddExpenseRequest, ExpenseDto, SummaryQuery};
use crate::commands::sale::RecordSaleRequest;
use crate::commands::{category, dashboard, expense, product, sale, settings};
use crate::error::{ApiError, ApiResult};
use crate::App;
use bizhome_core::budget::DailyLimitStatus;
use bizhome_core::retention::RetentionPolicy;
use bizhome_core::summary::{ExpenseSummary, SalesDashboard};
use bizhome_core::{Category, NewCategory, NewExpense, NewProduct, NewSale, Product, Sale};

/// Everything the screens render.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub sales: Vec<Sale>,
    pub expenses: Vec<ExpenseDto>,
    pub sales_dashboard: Option<SalesDashboard>,
    pub expense_summary: Option<ExpenseSummary>,
    /// Window overrides for `expense_summary`.
    pub expense_query: SummaryQuery,
    pub daily_limit: Option<DailyLimitStatus>,
    pub retention: Option<RetentionPolicy>,
    pub accumulated_retention: f64,
    pub loading: bool,
    /// Error of the last failed action, cleared by the next success.
    pub last_error: Option<ApiError>,
}

/// A UI action.
#[derive(Debug, Clone)]
pub enum Action {
    /// Re-read everything.
    Refresh,

    CreateCategory(NewCategory),
    UpdateCategory { id: i64, input: NewCategory },
    DeleteCategory(i64),

    CreateProduct(NewProduct),
    UpdateProduct { id: i64, input: NewProduct },
    DeleteProduct(i64),
    AdjustStock { id: i64, delta: f64 },

    RecordSale(RecordSaleRequest),
    UpdateSale { id: i64, input: NewSale },
    DeleteSale(i64),

    AddExpense(AddExpenseRequest),
    UpdateExpense { id: i64, input: NewExpense },
    DeleteExpense(i64),
    /// Changes the week/month the expense summary covers.
    SetExpenseQuery(SummaryQuery),

    SetRetention { enabled: bool, percent: f64 },
    SetDailyLimit(f64),
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::Refresh => "refresh",
            Action::CreateCategory(_) => "create_category",
            Action::UpdateCategory { .. } => "update_category",
            Action::DeleteCategory(_) => "delete_category",
            Action::CreateProduct(_) => "create_product",
            Action::UpdateProduct { .. } => "update_product",
            Action::DeleteProduct(_) => "delete_product",
            Action::AdjustStock { .. } => "adjust_stock",
            Action::RecordSale(_) => "record_sale",
            Action::UpdateSale { .. } => "update_sale",
            Action::DeleteSale(_) => "delete_sale",
            Action::AddExpense(_) => "add_expense",
            Action::UpdateExpense { .. } => "update_expense",
            Action::DeleteExpense(_) => "delete_expense",
            Action::SetExpenseQuery(_) => "set_expense_query",
            Action::SetRetention { .. } => "set_retention",
            Action::SetDailyLimit(_) => "set_daily_limit",
        }
    }
}

/// Owns the view state and runs actions against the app.
#[derive(Debug)]
pub struct Store {
    app: App,
    tx: watch::Sender<ViewState>,
}

impl Store {
    /// Creates a store with an empty state. Dispatch [`Action::Refresh`] to load.
    pub fn new(app: App) -> Self {
        let (tx, _rx) = watch::channel(ViewState::default());
        Store { app, tx }
    }

    /// Receiver that sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.tx.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ViewState {
        self.tx.borrow().clone()
    }

    /// Runs `action`, refreshes, and publishes the result.
    ///
    /// On failure the state keeps its previous data, `last_error` is set,
    /// and the error is also returned.
    pub async fn dispatch(&self, action: Action) -> ApiResult<()> {
        let name = action.name();
        debug!(action = name, "Dispatching");
        self.tx.send_modify(|state| state.loading = true);

        let result = match self.apply(action).await {
            Ok(()) => self.refresh().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(next) => {
                self.tx.send_replace(next);
                Ok(())
            }
            Err(e) => {
                warn!(action = name, code = ?e.code, "Action failed");
                self.tx.send_modify(|state| {
                    state.loading = false;
                    state.last_error = Some(e.clone());
                });
                Err(e)
            }
        }
    }

    async fn apply(&self, action: Action) -> ApiResult<()> {
        let app = &self.app;
        let db = &app.db;
        let clock = app.clock.as_ref();
        let notifier = app.notifier.as_ref();

        match action {
            Action::Refresh => {}

            Action::CreateCategory(input) => {
                category::create_category(db, input).await?;
            }
            Action::UpdateCategory { id, input } => {
                category::update_category(db, id, input).await?;
            }
            Action::DeleteCategory(id) => category::delete_category(db, id).await?,

            Action::CreateProduct(input) => {
                product::create_product(db, input).await?;
            }
            Action::UpdateProduct { id, input } => {
                product::update_product(db, id, input).await?;
            }
            Action::DeleteProduct(id) => product::delete_product(db, id).await?,
            Action::AdjustStock { id, delta } => {
                product::adjust_stock(db, id, delta).await?;
            }

            Action::RecordSale(request) => {
                sale::record_sale(db, clock, request).await?;
            }
            Action::UpdateSale { id, input } => {
                sale::update_sale(db, id, input).await?;
            }
            Action::DeleteSale(id) => sale::delete_sale(db, id).await?,

            Action::AddExpense(request) => {
                expense::add_expense(db, clock, notifier, request).await?;
            }
            Action::UpdateExpense { id, input } => {
                expense::update_expense(db, clock, notifier, id, input).await?;
            }
            Action::DeleteExpense(id) => expense::delete_expense(db, id).await?,
            Action::SetExpenseQuery(query) => {
                // Validate before storing so a bad token never reaches refresh
                expense::expense_summary(db, &app.config, clock, query.clone()).await?;
                self.tx.send_modify(|state| state.expense_query = query);
            }

            Action::SetRetention { enabled, percent } => {
                settings::set_retention_settings(db, enabled, percent).await?;
            }
            Action::SetDailyLimit(limit) => {
                settings::set_daily_limit(db, limit).await?;
            }
        }

        Ok(())
    }

    /// Builds a new state from the full tables.
    async fn refresh(&self) -> ApiResult<ViewState> {
        let app = &self.app;
        let db = &app.db;
        let clock = app.clock.as_ref();
        let query = self.tx.borrow().expense_query.clone();

        let sales = db.inner().sales().list().await?;
        let products = db.inner().products().list().await?;
        let expenses = expense::list_expenses(db).await?;

        Ok(ViewState {
            categories: category::list_categories(db).await?,
            sales_dashboard: Some(dashboard::sales_dashboard(db, &app.config, clock).await?),
            expense_summary: Some(expense::expense_summary(db, &app.config, clock, query.clone()).await?),
            expense_query: query,
            daily_limit: Some(expense::daily_limit_status(db, clock).await?),
            retention: Some(settings::get_retention_settings(db).await?),
            accumulated_retention: sale::accumulated_retention(db).await?,
            products,
            sales,
            expenses,
            loading: false,
            last_error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{clock_at, new_category, new_product};
    use crate::error::ErrorCode;
    use crate::state::{AppConfig, Clock, ManualClock, NotificationEvent, RecordingNotifier};
    use std::sync::Arc;

    async fn store() -> (Store, Arc<RecordingNotifier>, Arc<ManualClock>) {
        let clock = Arc::new(clock_at(2024, 6, 13, 10));
        let notifier = Arc::new(RecordingNotifier::new());
        let app = App::open(AppConfig::in_memory())
            .await
            .unwrap()
            .with_clock(clock.clone())
            .with_notifier(notifier.clone());
        (Store::new(app), notifier, clock)
    }

    async fn stocked(store: &Store) -> i64 {
        store
            .dispatch(Action::CreateCategory(new_category("Granos")))
            .await
            .unwrap();
        let category_id = store.snapshot().categories[0].id;
        store
            .dispatch(Action::CreateProduct(new_product(category_id, "Arroz", 20.0)))
            .await
            .unwrap();
        store.snapshot().products[0].id
    }

    #[tokio::test]
    async fn test_sale_refreshes_everything() {
        let (store, _, _) = store().await;
        let mut rx = store.subscribe();
        let product_id = stocked(&store).await;

        store
            .dispatch(Action::SetRetention {
                enabled: true,
                percent: 20.0,
            })
            .await
            .unwrap();
        store
            .dispatch(Action::RecordSale(RecordSaleRequest {
                product_id,
                quantity: 3.0,
                unit_price: None,
                date: None,
            }))
            .await
            .unwrap();

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert!(!state.loading);
        assert_eq!(state.sales.len(), 1);
        assert_eq!(state.products[0].stock, 17.0);
        assert!((state.accumulated_retention - 3.0).abs() < 1e-9);
        assert_eq!(state.sales_dashboard.unwrap().today.total, 45.0);
        assert_eq!(state.categories[0].product_count, 1);
    }

    #[tokio::test]
    async fn test_failed_action_keeps_data() {
        let (store, _, _) = store().await;
        let product_id = stocked(&store).await;

        let err = store
            .dispatch(Action::RecordSale(RecordSaleRequest {
                product_id,
                quantity: 50.0,
                unit_price: None,
                date: None,
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let state = store.snapshot();
        assert!(!state.loading);
        assert_eq!(state.products.len(), 1);
        assert_eq!(state.last_error.map(|e| e.code), Some(ErrorCode::InsufficientStock));

        store.dispatch(Action::Refresh).await.unwrap();
        assert!(store.snapshot().last_error.is_none());
    }

    #[tokio::test]
    async fn test_expenses_and_limit_alert() {
        let (store, notifier, clock) = store().await;

        for amount in [300.0, 250.0] {
            store
                .dispatch(Action::AddExpense(AddExpenseRequest {
                    description: "Supermercado".to_string(),
                    amount,
                    date: None,
                }))
                .await
                .unwrap();
        }

        let state = store.snapshot();
        assert_eq!(state.expenses.len(), 2);
        assert_eq!(state.expense_summary.unwrap().today, 550.0);
        assert!(state.daily_limit.unwrap().exceeded);
        assert_eq!(
            notifier.events(),
            vec![NotificationEvent::DailyLimitExceeded {
                date: clock.today(),
                spent: 550.0,
                limit: 500.0,
            }]
        );
    }

    #[tokio::test]
    async fn test_bad_month_query_is_rejected() {
        let (store, _, _) = store().await;
        let query = SummaryQuery {
            month: Some("2024-13".to_string()),
            ..SummaryQuery::default()
        };

        let err = store.dispatch(Action::SetExpenseQuery(query)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(store.snapshot().expense_query.month.is_none());
    }
}
