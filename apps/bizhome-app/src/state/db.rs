//! # Database State
//!
//! Wraps the `Database` connection for use in commands.
//!
//! ## Thread Safety
//! The `Database` struct from `bizhome-db` contains a `SqlitePool` which
//! is inherently thread-safe. Multiple commands can execute queries
//! concurrently without explicit locking.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn list_products(db: &DbState) -> ApiResult<Vec<Product>> {
//!     Ok(db.inner().products().list().await?)
//! }
//! ```

use bizhome_db::Database;

/// Wrapper around `Database` handed to commands.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let sales = db_state.inner().sales().list().await?;
    /// ```
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
