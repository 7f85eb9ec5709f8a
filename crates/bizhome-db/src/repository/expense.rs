//! # Expense Repository
//!
//! Household expenses (`gastos_hogar`), the cost side of the ledger.
//! Expenses don't touch stock; the daily-limit check reads
//! [`ExpenseRepository::total_for_day`].

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use bizhome_core::validation::validate_expense;
use bizhome_core::{CoreError, Expense, NewExpense};

const SELECT_EXPENSE: &str = r#"
    SELECT
        id,
        descripcion AS description,
        cantidad AS amount,
        fecha AS date
    FROM gastos_hogar
"#;

/// Repository for household expense operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// All expenses, newest first.
    pub async fn list(&self) -> DbResult<Vec<Expense>> {
        let sql = format!("{SELECT_EXPENSE} ORDER BY fecha DESC, id DESC");
        let expenses = sqlx::query_as::<_, Expense>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = expenses.len(), "Listed expenses");
        Ok(expenses)
    }

    /// Expenses dated on `day` (local calendar date), newest first.
    pub async fn list_for_day(&self, day: NaiveDate) -> DbResult<Vec<Expense>> {
        let sql = format!("{SELECT_EXPENSE} WHERE date(fecha) = ?1 ORDER BY fecha DESC, id DESC");
        let expenses = sqlx::query_as::<_, Expense>(&sql)
            .bind(day)
            .fetch_all(&self.pool)
            .await?;

        Ok(expenses)
    }

    /// Gets an expense by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Expense>> {
        let sql = format!("{SELECT_EXPENSE} WHERE id = ?1");
        let expense = sqlx::query_as::<_, Expense>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(expense)
    }

    /// Inserts a new expense.
    pub async fn insert(&self, expense: &NewExpense) -> DbResult<Expense> {
        validate_expense(expense)?;
        debug!(amount = expense.amount, "Inserting expense");

        let result = sqlx::query(
            "INSERT INTO gastos_hogar (descripcion, cantidad, fecha) VALUES (?1, ?2, ?3)",
        )
        .bind(expense.description.trim())
        .bind(expense.amount)
        .bind(expense.date)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(id, amount = expense.amount, "Expense recorded");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ExpenseNotFound(id).into())
    }

    /// Replaces description, amount and date.
    pub async fn update(&self, id: i64, expense: &NewExpense) -> DbResult<Expense> {
        validate_expense(expense)?;
        debug!(id, "Updating expense");

        let result = sqlx::query(
            "UPDATE gastos_hogar SET descripcion = ?2, cantidad = ?3, fecha = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(expense.description.trim())
        .bind(expense.amount)
        .bind(expense.date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ExpenseNotFound(id).into());
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ExpenseNotFound(id).into())
    }

    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM gastos_hogar WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ExpenseNotFound(id).into());
        }

        info!(id, "Expense deleted");
        Ok(())
    }

    /// Total spent on `day`. Zero when nothing was recorded.
    pub async fn total_for_day(&self, day: NaiveDate) -> DbResult<f64> {
        let total: f64 =
            sqlx::query_scalar("SELECT TOTAL(cantidad) FROM gastos_hogar WHERE date(fecha) = ?1")
                .bind(day)
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
