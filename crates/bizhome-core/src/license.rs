//! # License Gate
//!
//! Offline, device-bound, time-limited licenses.
//!
//! ## Blob Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base64( nonce[12] ‖ AES-256-GCM( json(LicensePayload) ) )             │
//! │                                                                         │
//! │  key   = SHA-256(embedded passphrase)                                   │
//! │  nonce = random per license                                             │
//! │                                                                         │
//! │  LicensePayload (camelCase JSON)                                        │
//! │  ├── deviceId, model, platform, manufacturer                           │
//! │  ├── validUntil      epoch ms, generation time + N calendar months     │
//! │  ├── generatedAt     epoch ms                                          │
//! │  └── validityMonths  1..=36                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Workflow
//! ```text
//! Device shows QR(DeviceInfo) ──► vendor tool: generate_license(info, months)
//!                                            │
//!          activate(blob) ◄──────────────────┘ (blob typed or pasted back)
//!            ├── verify_license(blob, now)     InvalidFormat / Expired
//!            ├── check_device(payload, id)     DeviceMismatch
//!            └── persist blob
//! ```

use aes_gcm::aead::{rand_core::RngCore, Aead, OsRng};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ts_rs::TS;

use crate::error::{LicenseError, LicenseResult, ValidationError};
use crate::types::DeviceInfo;
use crate::validation::validate_validity_months;

/// Passphrase the license key is derived from.
const LICENSE_PASSPHRASE: &str = "BizHome_Secret_2025!";

const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length.
const TAG_LEN: usize = 16;

pub const MIN_VALIDITY_MONTHS: u32 = 1;
pub const MAX_VALIDITY_MONTHS: u32 = 36;

/// Days of remaining validity at or below which the license is flagged.
pub const EXPIRY_WARNING_DAYS: i64 = 7;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

// =============================================================================
// Payload
// =============================================================================

/// Decrypted contents of a license blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LicensePayload {
    pub device_id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub manufacturer: String,
    /// Epoch milliseconds.
    pub valid_until: i64,
    /// Epoch milliseconds.
    pub generated_at: i64,
    #[serde(default)]
    pub validity_months: u32,
}

impl LicensePayload {
    pub fn device(&self) -> DeviceInfo {
        DeviceInfo {
            device_id: self.device_id.clone(),
            model: self.model.clone(),
            platform: self.platform.clone(),
            manufacturer: self.manufacturer.clone(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until < now.timestamp_millis()
    }

    /// Whole days left, rounded up. Zero or negative once expired.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        let ms = self.valid_until - now.timestamp_millis();
        if ms <= 0 {
            ms / MS_PER_DAY
        } else {
            (ms + MS_PER_DAY - 1) / MS_PER_DAY
        }
    }
}

// =============================================================================
// Device QR Payload
// =============================================================================

impl DeviceInfo {
    /// JSON encoded into the device QR code.
    pub fn to_qr_payload(&self) -> LicenseResult<String> {
        serde_json::to_string(self).map_err(|e| LicenseError::InvalidFormat(e.to_string()))
    }

    /// Parses a scanned device QR payload.
    pub fn from_qr_payload(json: &str) -> LicenseResult<Self> {
        let device: DeviceInfo = serde_json::from_str(json.trim())
            .map_err(|e| LicenseError::InvalidFormat(format!("device payload: {}", e)))?;
        if device.device_id.trim().is_empty() {
            return Err(LicenseError::InvalidFormat("device payload lacks deviceId".to_string()));
        }
        Ok(device)
    }
}

// =============================================================================
// Crypto
// =============================================================================

fn cipher() -> LicenseResult<Aes256Gcm> {
    let key = Sha256::digest(LICENSE_PASSPHRASE.as_bytes());
    Aes256Gcm::new_from_slice(&key).map_err(|e| LicenseError::InvalidFormat(e.to_string()))
}

fn encrypt(plaintext: &[u8]) -> LicenseResult<String> {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher()?
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| LicenseError::InvalidFormat(format!("encryption failed: {}", e)))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(blob))
}

fn decrypt(blob: &str) -> LicenseResult<Vec<u8>> {
    let blob = blob.trim();
    let looks_base64 = !blob.is_empty()
        && blob
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=');
    if !looks_base64 {
        return Err(LicenseError::InvalidFormat("not base64 text".to_string()));
    }

    let bytes = BASE64
        .decode(blob)
        .map_err(|e| LicenseError::InvalidFormat(e.to_string()))?;
    if bytes.len() < NONCE_LEN + TAG_LEN {
        return Err(LicenseError::InvalidFormat("blob too short".to_string()));
    }

    let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
    cipher()?
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| LicenseError::InvalidFormat("decryption failed".to_string()))
}

// =============================================================================
// Operations
// =============================================================================

/// Issues a license for `device`, valid for `months` calendar months from
/// `now`.
///
/// End-of-month dates clamp: a license generated on Jan 31 for one month
/// ends on the last day of February.
pub fn generate_license(device: &DeviceInfo, months: u32, now: DateTime<Utc>) -> LicenseResult<String> {
    validate_validity_months(months)?;
    if device.device_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "deviceId".to_string(),
        }
        .into());
    }

    let valid_until = now
        .checked_add_months(Months::new(months))
        .ok_or_else(|| LicenseError::InvalidFormat("validity overflows the calendar".to_string()))?;

    let payload = LicensePayload {
        device_id: device.device_id.clone(),
        model: device.model.clone(),
        platform: device.platform.clone(),
        manufacturer: device.manufacturer.clone(),
        valid_until: valid_until.timestamp_millis(),
        generated_at: now.timestamp_millis(),
        validity_months: months,
    };

    let json = serde_json::to_vec(&payload).map_err(|e| LicenseError::InvalidFormat(e.to_string()))?;
    encrypt(&json)
}

/// Decrypts and checks a license blob at `now`.
pub fn verify_license(blob: &str, now: DateTime<Utc>) -> LicenseResult<LicensePayload> {
    let plaintext = decrypt(blob)?;
    let payload: LicensePayload = serde_json::from_slice(&plaintext)
        .map_err(|e| LicenseError::InvalidFormat(format!("payload: {}", e)))?;

    if payload.device_id.is_empty() {
        return Err(LicenseError::InvalidFormat("payload lacks deviceId".to_string()));
    }
    if payload.is_expired(now) {
        return Err(LicenseError::Expired {
            valid_until: payload.valid_until,
        });
    }

    Ok(payload)
}

/// Rejects a payload issued for another device.
pub fn check_device(payload: &LicensePayload, current_device_id: &str) -> LicenseResult<()> {
    if payload.device_id != current_device_id {
        return Err(LicenseError::DeviceMismatch {
            licensed: payload.device_id.clone(),
            current: current_device_id.to_string(),
        });
    }
    Ok(())
}

/// Verifies a blob and checks it belongs to `current_device_id`.
///
/// The caller persists the blob once this succeeds.
pub fn activate(blob: &str, current_device_id: &str, now: DateTime<Utc>) -> LicenseResult<LicensePayload> {
    let payload = verify_license(blob, now)?;
    check_device(&payload, current_device_id)?;
    Ok(payload)
}

/// What the license screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LicenseStatus {
    pub payload: LicensePayload,
    pub days_remaining: i64,
    pub expiring_soon: bool,
}

/// Status of the stored license blob, if any.
pub fn license_status(stored: Option<&str>, now: DateTime<Utc>) -> LicenseResult<LicenseStatus> {
    let blob = stored
        .filter(|b| !b.trim().is_empty())
        .ok_or(LicenseError::NotActivated)?;
    let payload = verify_license(blob, now)?;
    let days_remaining = payload.days_remaining(now);

    Ok(LicenseStatus {
        expiring_soon: days_remaining > 0 && days_remaining <= EXPIRY_WARNING_DAYS,
        days_remaining,
        payload,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
