//! # Notification Commands
//!
//! The notifications on/off preference. Scheduling and display happen on
//! the host platform.

use tracing::debug;

use crate::error::ApiResult;
use crate::state::DbState;
use bizhome_core::NotificationState;

pub async fn get_notification_state(db: &DbState) -> ApiResult<NotificationState> {
    debug!("get_notification_state command");
    Ok(db.inner().notifications().get().await?)
}

pub async fn set_notifications_enabled(db: &DbState, enabled: bool) -> ApiResult<NotificationState> {
    debug!(enabled, "set_notifications_enabled command");
    Ok(db.inner().notifications().set_enabled(enabled).await?)
}
