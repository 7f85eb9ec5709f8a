//! # Security Repository
//!
//! Storage for the app-lock singleton (`seguridad`, id = 1).
//!
//! This repository only loads and saves the row. Every decision (configure,
//! enable, unlock attempt, lockout) is made by `bizhome_core::security`
//! on the loaded value, and the result is written back with [`SecurityRepository::save`].
//!
//! ```text
//! load ──► SecurityConfig ──► security::evaluate_attempt(..) ──► Attempt
//!                                                                  │
//!                          save(attempt.config) ◄── if changed ────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bizhome_core::SecurityConfig;

#[derive(Debug, Clone)]
pub struct SecurityRepository {
    pool: SqlitePool,
}

impl SecurityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SecurityRepository { pool }
    }

    /// Loads the security row, seeding a disabled one if it's missing.
    pub async fn get(&self) -> DbResult<SecurityConfig> {
        sqlx::query(
            "INSERT OR IGNORE INTO seguridad (id, activado, metodo, intentos_fallidos) VALUES (1, 0, NULL, 0)",
        )
        .execute(&self.pool)
        .await?;

        let config = sqlx::query_as::<_, SecurityConfig>(
            r#"
            SELECT
                activado AS enabled,
                metodo AS method,
                pin_hash,
                password_hash,
                patron_hash AS pattern_hash,
                intentos_fallidos AS failed_attempts,
                bloqueado_hasta AS locked_until,
                ultima_actualizacion AS updated_at
            FROM seguridad
            WHERE id = 1
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(config)
    }

    /// Writes every field of the security row.
    pub async fn save(&self, config: &SecurityConfig) -> DbResult<()> {
        debug!(
            enabled = config.enabled,
            method = ?config.method,
            failed_attempts = config.failed_attempts,
            "Saving security config"
        );

        sqlx::query(
            r#"
            INSERT INTO seguridad (
                id, activado, metodo, pin_hash, password_hash, patron_hash,
                intentos_fallidos, bloqueado_hasta, ultima_actualizacion
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                activado = excluded.activado,
                metodo = excluded.metodo,
                pin_hash = excluded.pin_hash,
                password_hash = excluded.password_hash,
                patron_hash = excluded.patron_hash,
                intentos_fallidos = excluded.intentos_fallidos,
                bloqueado_hasta = excluded.bloqueado_hasta,
                ultima_actualizacion = excluded.ultima_actualizacion
            "#,
        )
        .bind(config.enabled)
        .bind(config.method)
        .bind(&config.pin_hash)
        .bind(&config.password_hash)
        .bind(&config.pattern_hash)
        .bind(config.failed_attempts)
        .bind(config.locked_until)
        .bind(config.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use bizhome_core::security::{configure_method, evaluate_attempt, AttemptOutcome};
    use bizhome_core::SecurityMethod;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_seeded_row_is_disabled() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = db.security().get().await.unwrap();

        assert!(!config.enabled);
        assert_eq!(config.method, None);
        assert_eq!(config.failed_attempts, 0);
        assert!(!config.has_any_method());
    }

    #[tokio::test]
    async fn test_save_round_trips_lockout() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 13, 12, 0, 0).unwrap();

        let mut config = db.security().get().await.unwrap();
        config = configure_method(&config, SecurityMethod::Pin, "1234", "1234", now).unwrap();
        for _ in 0..3 {
            config = evaluate_attempt(&config, SecurityMethod::Pin, "0000", now).config;
        }
        db.security().save(&config).await.unwrap();

        let loaded = db.security().get().await.unwrap();
        assert!(loaded.enabled);
        assert_eq!(loaded.method, Some(SecurityMethod::Pin));
        assert_eq!(loaded.failed_attempts, 3);
        assert_eq!(loaded.locked_until, config.locked_until);

        let attempt = evaluate_attempt(&loaded, SecurityMethod::Pin, "1234", now);
        assert!(matches!(attempt.outcome, AttemptOutcome::LockedOut { .. }));
    }
}
