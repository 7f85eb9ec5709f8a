//! # BizHome Application Library
//!
//! Application layer of BizHome: the commands the hybrid UI calls, the
//! view-state store, and startup (logging, configuration, database).
//!
//! ## Module Organization
//! ```text
//! bizhome_app/
//! ├── lib.rs          ◄─── You are here (App bundle, startup)
//! ├── main.rs         ◄─── CLI entry: prints today's figures
//! ├── store.rs        ◄─── View state, Action dispatch, subscribers
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   ├── config.rs   ◄─── AppConfig (env + defaults)
//! │   ├── clock.rs    ◄─── System / manual clock
//! │   ├── session.rs  ◄─── In-memory lock session
//! │   └── notifier.rs ◄─── Outbound notification events
//! ├── commands/       ◄─── One module per screen
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default: info,bizhome=debug,sqlx=warn; override with RUST_LOG     │
//! │                                                                         │
//! │  2. Load AppConfig ───────────────────────────────────────────────────► │
//! │     • BIZHOME_* environment overrides                                   │
//! │     • Default database in the platform data directory                   │
//! │                                                                         │
//! │  3. Connect to Database ──────────────────────────────────────────────► │
//! │     • SQLite with WAL mode                                              │
//! │     • Run pending migrations (seeds config, notification, security)     │
//! │                                                                         │
//! │  4. Build App ────────────────────────────────────────────────────────► │
//! │     • DbState, AppConfig, SystemClock, locked SessionState, LogNotifier │
//! │                                                                         │
//! │  5. Store::new(app) + dispatch(Refresh)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;
pub mod store;

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bizhome_db::pool::IN_MEMORY_PATH;
use bizhome_db::{Database, DbConfig};
use error::{ApiError, ApiResult, ErrorCode};
use state::{AppConfig, Clock, DbState, LogNotifier, Notifier, SessionState, SystemClock};

/// Everything a command may need, bundled for the host and the store.
///
/// Cheap to clone: every field is a shared handle.
#[derive(Debug, Clone)]
pub struct App {
    pub db: DbState,
    pub config: AppConfig,
    pub clock: Arc<dyn Clock>,
    pub session: SessionState,
    pub notifier: Arc<dyn Notifier>,
}

impl App {
    /// Connects to the configured database and builds the default state.
    pub async fn open(config: AppConfig) -> ApiResult<Self> {
        let db_config = if config.database_path.as_os_str() == IN_MEMORY_PATH {
            DbConfig::in_memory()
        } else {
            if let Some(dir) = config.database_path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).map_err(|e| {
                    tracing::error!(dir = %dir.display(), error = %e, "Cannot create data directory");
                    ApiError::new(ErrorCode::StorageUnavailable, "Cannot create data directory")
                })?;
            }
            DbConfig::new(&config.database_path)
        };

        info!(path = %config.database_path.display(), "Opening database");
        let db = Database::new(db_config).await?;
        info!("Database connected and migrations applied");

        Ok(App {
            db: DbState::new(db),
            config,
            clock: Arc::new(SystemClock),
            session: SessionState::new(),
            notifier: Arc::new(LogNotifier),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bizhome=trace` - Show trace for bizhome crates only
/// - Default: `info,bizhome=debug,sqlx=warn`
///
/// Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bizhome=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let app = App::open(AppConfig::in_memory()).await.unwrap();
        assert!(app.db.inner().health_check().await);
        assert!(!app.session.is_unlocked());
    }

    #[tokio::test]
    async fn test_open_creates_data_dir() {
        let dir = std::env::temp_dir().join(format!("bizhome-test-{}", std::process::id()));
        let config = AppConfig {
            database_path: dir.join("nested").join("bizhome.db"),
            ..AppConfig::in_memory()
        };

        let app = App::open(config).await.unwrap();
        assert!(dir.join("nested").is_dir());
        app.db.inner().close().await;
        let _ = std::fs::remove_dir_all(&dir);
    }
}
