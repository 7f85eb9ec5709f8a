//! # Configuration Repository
//!
//! Key/value settings stored in `configuracion`.
//!
//! ## Known Keys
//! ```text
//! ┌──────────────────────────┬──────────────┬────────────────────────────┐
//! │ clave                    │ seeded valor │ read as                    │
//! ├──────────────────────────┼──────────────┼────────────────────────────┤
//! │ retener_ganancias        │ 'false'      │ RetentionPolicy.enabled    │
//! │ porcentaje_retencion     │ '10'         │ RetentionPolicy.percent    │
//! │ limite_diario_gastos     │ '500'        │ f64 (fallback 500)         │
//! │ licencia                 │ (absent)     │ activated license blob     │
//! │ ultima_alerta_limite     │ (absent)     │ NaiveDate of last alert    │
//! └──────────────────────────┴──────────────┴────────────────────────────┘
//! ```
//!
//! Writes are upserts: setting an unknown key creates it.

use bizhome_core::budget::parse_daily_limit;
use bizhome_core::retention::RetentionPolicy;
use bizhome_core::validation::{validate_daily_limit, validate_retention_percent};
use bizhome_core::{config_keys, ConfigEntry};
use chrono::NaiveDate;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reads one value with any executor (pool or open transaction).
pub(crate) async fn read_value<'e, E>(executor: E, key: &str) -> DbResult<Option<String>>
where
    E: SqliteExecutor<'e>,
{
    let value: Option<String> = sqlx::query_scalar("SELECT valor FROM configuracion WHERE clave = ?1")
        .bind(key)
        .fetch_optional(executor)
        .await?;
    Ok(value)
}

/// Upserts one value with any executor.
pub(crate) async fn write_value<'e, E>(executor: E, key: &str, value: &str) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO configuracion (clave, valor) VALUES (?1, ?2)
        ON CONFLICT(clave) DO UPDATE SET valor = excluded.valor
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(executor)
    .await?;
    Ok(())
}

/// Reads the retention policy on one connection (pooled or inside a transaction).
pub(crate) async fn read_retention_policy(
    conn: &mut sqlx::SqliteConnection,
) -> DbResult<RetentionPolicy> {
    let retain = read_value(&mut *conn, config_keys::RETAIN_PROFITS).await?;
    let percent = read_value(&mut *conn, config_keys::RETENTION_PERCENT).await?;
    Ok(RetentionPolicy::from_settings(retain.as_deref(), percent.as_deref()))
}

/// Repository for `configuracion`.
#[derive(Debug, Clone)]
pub struct ConfigRepository {
    pool: SqlitePool,
}

impl ConfigRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ConfigRepository { pool }
    }

    /// Raw value of `key`, if set.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        debug!(key = %key, "Reading config value");
        read_value(&self.pool, key).await
    }

    /// Creates or replaces `key`.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, "Writing config value");
        write_value(&self.pool, key, value).await
    }

    /// Deletes `key`. Returns whether it existed.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM configuracion WHERE clave = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All entries, sorted by key.
    pub async fn all(&self) -> DbResult<Vec<ConfigEntry>> {
        let entries = sqlx::query_as::<_, ConfigEntry>(
            "SELECT clave AS key, valor AS value FROM configuracion ORDER BY clave",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    // -------------------------------------------------------------------------
    // Typed accessors
    // -------------------------------------------------------------------------

    pub async fn retention_policy(&self) -> DbResult<RetentionPolicy> {
        let mut conn = self.pool.acquire().await?;
        read_retention_policy(&mut *conn).await
    }

    /// Stores both retention settings atomically.
    pub async fn set_retention(&self, enabled: bool, percent: f64) -> DbResult<RetentionPolicy> {
        validate_retention_percent(percent)?;

        let mut tx = self.pool.begin().await?;
        write_value(&mut *tx, config_keys::RETAIN_PROFITS, if enabled { "true" } else { "false" }).await?;
        write_value(&mut *tx, config_keys::RETENTION_PERCENT, &percent.to_string()).await?;
        tx.commit().await?;

        info!(enabled, percent, "Retention settings updated");
        Ok(RetentionPolicy { enabled, percent })
    }

    /// Daily expense limit, 500 when unset or invalid.
    pub async fn daily_limit(&self) -> DbResult<f64> {
        let raw = self.get(config_keys::DAILY_EXPENSE_LIMIT).await?;
        Ok(parse_daily_limit(raw.as_deref()))
    }

    pub async fn set_daily_limit(&self, limit: f64) -> DbResult<()> {
        validate_daily_limit(limit)?;
        self.set(config_keys::DAILY_EXPENSE_LIMIT, &limit.to_string()).await?;
        info!(limit, "Daily expense limit updated");
        Ok(())
    }

    /// Activated license blob.
    pub async fn license(&self) -> DbResult<Option<String>> {
        self.get(config_keys::LICENSE).await
    }

    pub async fn set_license(&self, blob: &str) -> DbResult<()> {
        self.set(config_keys::LICENSE, blob).await
    }

    /// Forgets the activated license.
    pub async fn clear_license(&self) -> DbResult<()> {
        self.remove(config_keys::LICENSE).await?;
        info!("License cleared");
        Ok(())
    }

    /// Local date of the last daily-limit alert. Unparsable values read as none.
    pub async fn last_limit_alert(&self) -> DbResult<Option<NaiveDate>> {
        let raw = self.get(config_keys::LAST_LIMIT_ALERT).await?;
        Ok(raw.and_then(|v| NaiveDate::parse_from_str(v.trim(), DATE_FORMAT).ok()))
    }

    pub async fn set_last_limit_alert(&self, date: NaiveDate) -> DbResult<()> {
        self.set(config_keys::LAST_LIMIT_ALERT, &date.format(DATE_FORMAT).to_string())
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
