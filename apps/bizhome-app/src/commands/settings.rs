//! # Settings Commands
//!
//! Business settings stored in `configuracion`: profit retention and the
//! daily expense limit.

use tracing::debug;

use crate::error::ApiResult;
use crate::state::DbState;
use bizhome_core::retention::RetentionPolicy;
use bizhome_core::ConfigEntry;

/// Current retention setting. The percent falls back to 10 when unreadable.
pub async fn get_retention_settings(db: &DbState) -> ApiResult<RetentionPolicy> {
    debug!("get_retention_settings command");
    Ok(db.inner().config().retention_policy().await?)
}

/// Sets retention on/off and its percent (0-100).
///
/// Applies to sales recorded or edited afterwards; existing sales keep
/// their stored figures.
pub async fn set_retention_settings(db: &DbState, enabled: bool, percent: f64) -> ApiResult<RetentionPolicy> {
    debug!(enabled, percent, "set_retention_settings command");
    Ok(db.inner().config().set_retention(enabled, percent).await?)
}

pub async fn get_daily_limit(db: &DbState) -> ApiResult<f64> {
    Ok(db.inner().config().daily_limit().await?)
}

pub async fn set_daily_limit(db: &DbState, limit: f64) -> ApiResult<f64> {
    debug!(limit, "set_daily_limit command");
    db.inner().config().set_daily_limit(limit).await?;
    Ok(limit)
}

/// Every stored key/value pair, by key.
pub async fn list_settings(db: &DbState) -> ApiResult<Vec<ConfigEntry>> {
    Ok(db.inner().config().all().await?)
}
