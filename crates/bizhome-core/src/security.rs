//! # Security Gate
//!
//! Pure state transitions of the app lock. The caller loads the singleton
//! [`SecurityConfig`], runs one of these functions with the current instant,
//! and persists the returned config when it changed.
//!
//! ## Unlock Attempt Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  evaluate_attempt(config, method, input, now)                           │
//! │       │                                                                 │
//! │       ├── disabled? ─────────────────────────────► Granted              │
//! │       │                                                                 │
//! │       ├── now < locked_until? ───────────────────► LockedOut(secs)      │
//! │       │                                  (no attempt consumed)          │
//! │       ├── lockout expired? → clear it, counter = 0                      │
//! │       │                                                                 │
//! │       ├── sha256(input) == stored hash? ─────────► Granted, counter = 0 │
//! │       │                                                                 │
//! │       └── mismatch → counter + 1                                        │
//! │                 ├── counter >= 3 → locked_until = now + 60s             │
//! │                 └────────────────────────────────► Rejected             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ts_rs::TS;

use crate::error::{SecurityError, SecurityResult};
use crate::types::{SecurityConfig, SecurityMethod};
use crate::validation::validate_secret;

/// Failed attempts that trigger a lockout.
pub const MAX_FAILED_ATTEMPTS: i64 = 3;

/// Lockout length. Fixed, not escalating.
pub const LOCKOUT_SECONDS: i64 = 60;

// =============================================================================
// Hashing
// =============================================================================

/// Lowercase hex SHA-256 digest of a secret.
///
/// ## Example
/// ```rust
/// use bizhome_core::security::hash_secret;
///
/// assert_eq!(
///     hash_secret("1234"),
///     "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
/// );
/// ```
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

// =============================================================================
// Configuration Transitions
// =============================================================================

/// Stores a new secret for `method`, makes it the active method and enables
/// the lock.
pub fn configure_method(
    config: &SecurityConfig,
    method: SecurityMethod,
    secret: &str,
    confirmation: &str,
    now: DateTime<Utc>,
) -> SecurityResult<SecurityConfig> {
    validate_secret(method, secret, confirmation)?;

    let mut next = config.clone();
    next.set_hash(method, hash_secret(secret));
    next.method = Some(method);
    next.enabled = true;
    next.failed_attempts = 0;
    next.locked_until = None;
    next.updated_at = Some(now);
    Ok(next)
}

/// Turns the lock on. Requires at least one configured method.
pub fn enable(config: &SecurityConfig, now: DateTime<Utc>) -> SecurityResult<SecurityConfig> {
    let configured = config.configured_methods();
    let Some(first) = configured.first().copied() else {
        return Err(SecurityError::NoMethodConfigured);
    };

    let mut next = config.clone();
    next.enabled = true;
    if next.method.map_or(true, |m| config.hash_for(m).is_none()) {
        next.method = Some(first);
    }
    next.updated_at = Some(now);
    Ok(next)
}

/// Turns the lock off. Stored hashes are kept.
pub fn disable(config: &SecurityConfig, now: DateTime<Utc>) -> SecurityConfig {
    let mut next = config.clone();
    next.enabled = false;
    next.failed_attempts = 0;
    next.locked_until = None;
    next.updated_at = Some(now);
    next
}

// =============================================================================
// Unlock Attempts
// =============================================================================

/// Result of one unlock attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum AttemptOutcome {
    Granted,
    #[serde(rename_all = "camelCase")]
    Rejected { attempts_remaining: u32 },
    #[serde(rename_all = "camelCase")]
    LockedOut { remaining_seconds: i64 },
}

/// An evaluated attempt and the config to persist afterwards.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub outcome: AttemptOutcome,
    pub config: SecurityConfig,
    /// Whether `config` differs from the input and must be saved.
    pub changed: bool,
}

impl Attempt {
    pub fn into_result(self) -> SecurityResult<()> {
        match self.outcome {
            AttemptOutcome::Granted => Ok(()),
            AttemptOutcome::Rejected { attempts_remaining } => {
                Err(SecurityError::InvalidCredential { attempts_remaining })
            }
            AttemptOutcome::LockedOut { remaining_seconds } => {
                Err(SecurityError::LockedOut { remaining_seconds })
            }
        }
    }
}

/// Whole seconds left until `until`, rounded up.
fn seconds_until(until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (until - now).num_milliseconds().max(0);
    (ms + 999) / 1000
}

/// Evaluates an unlock attempt at `now`.
pub fn evaluate_attempt(
    config: &SecurityConfig,
    method: SecurityMethod,
    input: &str,
    now: DateTime<Utc>,
) -> Attempt {
    if !config.enabled {
        return Attempt {
            outcome: AttemptOutcome::Granted,
            config: config.clone(),
            changed: false,
        };
    }

    if let Some(until) = config.locked_until {
        if now < until {
            return Attempt {
                outcome: AttemptOutcome::LockedOut {
                    remaining_seconds: seconds_until(until, now),
                },
                config: config.clone(),
                changed: false,
            };
        }
    }

    let mut next = config.clone();
    if next.locked_until.take().is_some() {
        next.failed_attempts = 0;
    }

    let digest = hash_secret(input);
    let matches = config.hash_for(method).is_some_and(|stored| stored == digest);

    let outcome = if matches {
        next.failed_attempts = 0;
        AttemptOutcome::Granted
    } else {
        next.failed_attempts += 1;
        if next.failed_attempts >= MAX_FAILED_ATTEMPTS {
            next.locked_until = Some(now + Duration::seconds(LOCKOUT_SECONDS));
        }
        AttemptOutcome::Rejected {
            attempts_remaining: (MAX_FAILED_ATTEMPTS - next.failed_attempts).max(0) as u32,
        }
    };

    let changed = next.failed_attempts != config.failed_attempts
        || next.locked_until != config.locked_until;
    if changed {
        next.updated_at = Some(now);
    }

    Attempt {
        outcome,
        config: next,
        changed,
    }
}

// =============================================================================
// Status
// =============================================================================

/// What the settings screen shows about the lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SecurityStatus {
    pub enabled: bool,
    pub method: Option<SecurityMethod>,
    pub configured_methods: Vec<SecurityMethod>,
    pub failed_attempts: i64,
    /// Seconds until the current lockout ends, if one is active.
    pub lockout_remaining_seconds: Option<i64>,
}

pub fn status(config: &SecurityConfig, now: DateTime<Utc>) -> SecurityStatus {
    SecurityStatus {
        enabled: config.enabled,
        method: config.method,
        configured_methods: config.configured_methods(),
        failed_attempts: config.failed_attempts,
        lockout_remaining_seconds: config
            .locked_until
            .filter(|until| now < *until)
            .map(|until| seconds_until(until, now)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 13, 10, 0, 0).unwrap()
    }

    fn pin_config() -> SecurityConfig {
        configure_method(&SecurityConfig::default(), SecurityMethod::Pin, "1234", "1234", t0()).unwrap()
    }

    #[test]
    fn test_configure_stores_digest_and_enables() {
        let config = pin_config();
        assert!(config.enabled);
        assert_eq!(config.method, Some(SecurityMethod::Pin));
        assert_eq!(config.pin_hash.as_deref(), Some(hash_secret("1234").as_str()));
    }

    #[test]
    fn test_configure_rejects_bad_secrets() {
        let base = SecurityConfig::default();
        assert!(configure_method(&base, SecurityMethod::Pin, "12a4", "12a4", t0()).is_err());
        assert!(configure_method(&base, SecurityMethod::Pin, "1234", "1235", t0()).is_err());
        assert!(configure_method(&base, SecurityMethod::Password, "abc", "abc", t0()).is_err());
    }

    #[test]
    fn test_enable_requires_method() {
        let err = enable(&SecurityConfig::default(), t0()).unwrap_err();
        assert!(matches!(err, SecurityError::NoMethodConfigured));

        let disabled = disable(&pin_config(), t0());
        assert!(!disabled.enabled);
        assert!(enable(&disabled, t0()).unwrap().enabled);
    }

    #[test]
    fn test_disabled_always_grants() {
        let attempt = evaluate_attempt(&SecurityConfig::default(), SecurityMethod::Pin, "0000", t0());
        assert_eq!(attempt.outcome, AttemptOutcome::Granted);
        assert!(!attempt.changed);
    }

    #[test]
    fn test_three_failures_lock_out_then_recover() {
        let mut config = pin_config();

        for expected_remaining in [2, 1, 0] {
            let attempt = evaluate_attempt(&config, SecurityMethod::Pin, "9999", t0());
            assert_eq!(
                attempt.outcome,
                AttemptOutcome::Rejected { attempts_remaining: expected_remaining }
            );
            config = attempt.config;
        }
        assert_eq!(config.locked_until, Some(t0() + Duration::seconds(60)));

        // Correct secret is refused while locked out, without consuming an attempt
        let locked = evaluate_attempt(&config, SecurityMethod::Pin, "1234", t0() + Duration::seconds(30));
        assert_eq!(locked.outcome, AttemptOutcome::LockedOut { remaining_seconds: 30 });
        assert_eq!(locked.config.failed_attempts, 3);

        // After the window a correct verify succeeds and resets everything
        let ok = evaluate_attempt(&config, SecurityMethod::Pin, "1234", t0() + Duration::seconds(60));
        assert_eq!(ok.outcome, AttemptOutcome::Granted);
        assert_eq!(ok.config.failed_attempts, 0);
        assert_eq!(ok.config.locked_until, None);
        assert!(ok.changed);
    }

    #[test]
    fn test_expired_lockout_resets_counter_before_wrong_attempt() {
        let mut config = pin_config();
        config.failed_attempts = 3;
        config.locked_until = Some(t0());

        let attempt = evaluate_attempt(&config, SecurityMethod::Pin, "0000", t0() + Duration::seconds(5));
        assert_eq!(attempt.outcome, AttemptOutcome::Rejected { attempts_remaining: 2 });
        assert_eq!(attempt.config.failed_attempts, 1);
        assert_eq!(attempt.config.locked_until, None);
    }

    #[test]
    fn test_unconfigured_method_is_rejected() {
        let attempt = evaluate_attempt(&pin_config(), SecurityMethod::Password, "1234", t0());
        assert!(matches!(
            attempt.into_result(),
            Err(SecurityError::InvalidCredential { attempts_remaining: 2 })
        ));
    }

    #[test]
    fn test_status_reports_lockout() {
        let mut config = pin_config();
        config.locked_until = Some(t0() + Duration::milliseconds(1500));
        let s = status(&config, t0());
        assert_eq!(s.lockout_remaining_seconds, Some(2));
        assert_eq!(s.configured_methods, vec![SecurityMethod::Pin]);

        assert_eq!(status(&config, t0() + Duration::seconds(2)).lockout_remaining_seconds, None);
    }
}
