//! # License Commands
//!
//! Device-bound offline licenses.
//!
//! ## Activation Flow
//! ```text
//! ┌──────────────────────┐   QR (device JSON)   ┌──────────────────────────┐
//! │  Customer device     │ ───────────────────► │  Vendor device           │
//! │  device_qr_payload() │                      │  generate_license(json,  │
//! │                      │ ◄─────────────────── │                  months) │
//! │  activate_license()  │   base64 blob        └──────────────────────────┘
//! │    verify + device   │
//! │    check, then store │
//! │    under `licencia`  │
//! └──────────────────────┘
//! ```
//!
//! The device identity comes from the host platform and is passed in.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::{Clock, DbState};
use bizhome_core::license::{self, LicensePayload, LicenseStatus};
use bizhome_core::DeviceInfo;

/// License request as entered on the vendor device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateLicenseRequest {
    /// Scanned device QR payload.
    pub device_payload: String,
    /// 1 to 36.
    pub validity_months: u32,
}

/// JSON encoded into the device QR code.
pub fn device_qr_payload(device: &DeviceInfo) -> ApiResult<String> {
    Ok(device.to_qr_payload()?)
}

/// Parses a scanned device QR payload.
pub fn parse_device_payload(json: &str) -> ApiResult<DeviceInfo> {
    Ok(DeviceInfo::from_qr_payload(json)?)
}

/// Issues a license blob for the scanned device.
pub fn generate_license(clock: &dyn Clock, request: GenerateLicenseRequest) -> ApiResult<String> {
    let device = DeviceInfo::from_qr_payload(&request.device_payload)?;
    let blob = license::generate_license(&device, request.validity_months, clock.now_utc())?;
    info!(
        device_id = %device.device_id,
        months = request.validity_months,
        "License generated"
    );
    Ok(blob)
}

/// Decrypts and checks a blob without storing it.
pub fn verify_license(clock: &dyn Clock, blob: &str) -> ApiResult<LicensePayload> {
    Ok(license::verify_license(blob.trim(), clock.now_utc())?)
}

/// Verifies a blob for this device and stores it.
///
/// ## Errors
/// - `INVALID_FORMAT`: not a license blob
/// - `EXPIRED`: past its validity
/// - `DEVICE_MISMATCH`: issued for another device
pub async fn activate_license(
    db: &DbState,
    clock: &dyn Clock,
    blob: String,
    current_device_id: &str,
) -> ApiResult<LicensePayload> {
    debug!(device_id = %current_device_id, "activate_license command");
    let blob = blob.trim();
    let payload = license::activate(blob, current_device_id, clock.now_utc())?;
    db.inner().config().set_license(blob).await?;

    info!(device_id = %payload.device_id, valid_until = payload.valid_until, "License activated");
    Ok(payload)
}

/// Status of the stored license. `NOT_ACTIVATED` when none is stored.
pub async fn license_status(db: &DbState, clock: &dyn Clock) -> ApiResult<LicenseStatus> {
    let stored = db.inner().config().license().await?;
    Ok(license::license_status(stored.as_deref(), clock.now_utc())?)
}

pub async fn clear_license(db: &DbState) -> ApiResult<()> {
    Ok(db.inner().config().clear_license().await?)
}
