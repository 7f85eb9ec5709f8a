//! # Notification Repository
//!
//! The single `notificaciones` row (id = 1): whether the user allowed
//! reminders and alerts. Seeded by migration; reads re-seed it if missing.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;
use bizhome_core::NotificationState;

#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    /// Current preference (disabled by default).
    pub async fn get(&self) -> DbResult<NotificationState> {
        sqlx::query("INSERT OR IGNORE INTO notificaciones (id, activadas) VALUES (1, 0)")
            .execute(&self.pool)
            .await?;

        let state = sqlx::query_as::<_, NotificationState>(
            r#"
            SELECT activadas AS enabled, ultima_actualizacion AS updated_at
            FROM notificaciones
            WHERE id = 1
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(state)
    }

    pub async fn set_enabled(&self, enabled: bool) -> DbResult<NotificationState> {
        sqlx::query(
            r#"
            INSERT INTO notificaciones (id, activadas, ultima_actualizacion)
            VALUES (1, ?1, CURRENT_TIMESTAMP)
            ON CONFLICT(id) DO UPDATE SET
                activadas = excluded.activadas,
                ultima_actualizacion = excluded.ultima_actualizacion
            "#,
        )
        .bind(enabled)
        .execute(&self.pool)
        .await?;

        info!(enabled, "Notification preference updated");
        self.get().await
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_toggle() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(!db.notifications().get().await.unwrap().enabled);

        let state = db.notifications().set_enabled(true).await.unwrap();
        assert!(state.enabled);
        assert!(state.updated_at.is_some());

        assert!(!db.notifications().set_enabled(false).await.unwrap().enabled);
    }

    #[tokio::test]
    async fn test_missing_row_is_reseeded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("DELETE FROM notificaciones")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(!db.notifications().get().await.unwrap().enabled);
    }
}
