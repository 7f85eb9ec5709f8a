//! # State Module
//!
//! Long-lived objects the commands receive.
//!
//! ## Multiple State Types
//! Instead of a single `AppState` struct containing everything, each concern
//! has its own type and a command takes only the ones it uses.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐                  │
//! │  │   DbState    │  │  AppConfig   │  │ dyn Clock    │                  │
//! │  │  Database    │  │  db path     │  │ SystemClock  │                  │
//! │  │  (SQLite     │  │  currency    │  │ ManualClock  │                  │
//! │  │   pool)      │  │  thresholds  │  │  (tests)     │                  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘                  │
//! │  ┌──────────────┐  ┌──────────────────┐                                │
//! │  │ SessionState │  │  dyn Notifier    │                                │
//! │  │ Arc<Mutex<   │  │  LogNotifier     │                                │
//! │  │   Session>>  │  │  RecordingNotif. │                                │
//! │  └──────────────┘  └──────────────────┘                                │
//! │                                                                         │
//! │  THREAD SAFETY:                                                         │
//! │  • DbState: Database has internal connection pool (thread-safe)         │
//! │  • SessionState: Protected by Arc<Mutex<T>>                             │
//! │  • AppConfig: Read-only after initialization                            │
//! │  • Clock / Notifier: Send + Sync trait objects                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod clock;
mod config;
mod db;
mod notifier;
mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{default_database_path, AppConfig, DATABASE_FILE};
pub use db::DbState;
pub use notifier::{LogNotifier, NotificationEvent, Notifier, RecordingNotifier};
pub use session::{Session, SessionState};
