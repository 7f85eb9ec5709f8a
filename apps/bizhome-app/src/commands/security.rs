//! # Security Commands
//!
//! App lock: configure a PIN, password or pattern, turn the lock on or off,
//! and unlock the session.
//!
//! ## Unlock Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  verify_unlock(method, input)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load seguridad row ──► evaluate_attempt(config, method, input, now)    │
//! │                               │                                         │
//! │            ┌──────────────────┼──────────────────────┐                  │
//! │            ▼                  ▼                      ▼                  │
//! │        Granted            Rejected               LockedOut              │
//! │   counter = 0         counter + 1; at 3:      attempt not counted       │
//! │   session unlocked    locked 60 s                                       │
//! │            │                  │                      │                  │
//! │            └──────── save row if changed ────────────┘                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiResult;
use crate::state::{Clock, DbState, SessionState};
use bizhome_core::security::{self, AttemptOutcome, SecurityStatus};
use bizhome_core::SecurityMethod;

/// Lock status plus whether this session got past it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockState {
    #[serde(flatten)]
    pub status: SecurityStatus,
    pub unlocked: bool,
    /// Whether app content may be shown: lock disabled or session unlocked.
    pub open: bool,
}

pub async fn security_status(db: &DbState, clock: &dyn Clock, session: &SessionState) -> ApiResult<LockState> {
    let config = db.inner().security().get().await?;
    let status = security::status(&config, clock.now_utc());
    Ok(LockState {
        unlocked: session.is_unlocked(),
        open: session.is_open(config.enabled),
        status,
    })
}

/// Stores a new secret for `method`, makes it active and enables the lock.
///
/// The current session stays unlocked; the lock applies from the next
/// `lock_session` or launch.
pub async fn configure_security_method(
    db: &DbState,
    clock: &dyn Clock,
    session: &SessionState,
    method: SecurityMethod,
    secret: String,
    confirmation: String,
) -> ApiResult<SecurityStatus> {
    debug!(%method, "configure_security_method command");
    let now = clock.now_utc();

    let current = db.inner().security().get().await?;
    let next = security::configure_method(&current, method, &secret, &confirmation, now)?;
    db.inner().security().save(&next).await?;
    session.with_session_mut(|s| s.unlock(Some(method), now));

    info!(%method, "Security method configured");
    Ok(security::status(&next, now))
}

/// Turns the lock on. Fails with `NO_METHOD_CONFIGURED` if no secret is stored.
pub async fn enable_security(db: &DbState, clock: &dyn Clock, session: &SessionState) -> ApiResult<SecurityStatus> {
    let now = clock.now_utc();
    let current = db.inner().security().get().await?;
    let next = security::enable(&current, now)?;
    db.inner().security().save(&next).await?;
    session.with_session_mut(|s| s.unlock(next.method, now));

    info!("Security enabled");
    Ok(security::status(&next, now))
}

/// Turns the lock off. Stored secrets are kept.
pub async fn disable_security(db: &DbState, clock: &dyn Clock) -> ApiResult<SecurityStatus> {
    let now = clock.now_utc();
    let current = db.inner().security().get().await?;
    let next = security::disable(&current, now);
    db.inner().security().save(&next).await?;

    info!("Security disabled");
    Ok(security::status(&next, now))
}

/// Checks an unlock attempt and unlocks the session on success.
///
/// ## Errors
/// - `INVALID_CREDENTIAL` with the attempts left
/// - `LOCKED_OUT` with the seconds left, even for the right secret
pub async fn verify_unlock(
    db: &DbState,
    clock: &dyn Clock,
    session: &SessionState,
    method: SecurityMethod,
    input: String,
) -> ApiResult<()> {
    debug!(%method, "verify_unlock command");
    let now = clock.now_utc();

    let current = db.inner().security().get().await?;
    let attempt = security::evaluate_attempt(&current, method, &input, now);
    if attempt.changed {
        db.inner().security().save(&attempt.config).await?;
    }

    match attempt.outcome {
        AttemptOutcome::Granted => {
            session.with_session_mut(|s| s.unlock(Some(method), now));
            info!(%method, "Session unlocked");
        }
        AttemptOutcome::Rejected { attempts_remaining } => {
            warn!(%method, attempts_remaining, "Unlock rejected");
        }
        AttemptOutcome::LockedOut { remaining_seconds } => {
            warn!(remaining_seconds, "Unlock attempted during lockout");
        }
    }

    Ok(attempt.into_result()?)
}

/// Locks the current session.
pub fn lock_session(session: &SessionState) {
    session.with_session_mut(|s| s.lock());
    info!("Session locked");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{clock_at, setup};
    use crate::error::ErrorCode;
    use chrono::Duration;

    async fn configured() -> (DbState, crate::state::ManualClock, SessionState) {
        let db = setup().await;
        let clock = clock_at(2024, 6, 13, 8);
        let session = SessionState::new();
        configure_security_method(
            &db,
            &clock,
            &session,
            SecurityMethod::Pin,
            "1234".to_string(),
            "1234".to_string(),
        )
        .await
        .unwrap();
        lock_session(&session);
        (db, clock, session)
    }

    #[tokio::test]
    async fn test_disabled_lock_is_open() {
        let db = setup().await;
        let clock = clock_at(2024, 6, 13, 8);
        let session = SessionState::new();

        let state = security_status(&db, &clock, &session).await.unwrap();
        assert!(!state.status.enabled);
        assert!(state.open);

        verify_unlock(&db, &clock, &session, SecurityMethod::Pin, "0000".to_string())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_enable_without_method_fails() {
        let db = setup().await;
        let clock = clock_at(2024, 6, 13, 8);
        let err = enable_security(&db, &clock, &SessionState::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoMethodConfigured);
    }

    #[tokio::test]
    async fn test_pin_must_be_four_digits() {
        let db = setup().await;
        let clock = clock_at(2024, 6, 13, 8);
        let err = configure_security_method(
            &db,
            &clock,
            &SessionState::new(),
            SecurityMethod::Pin,
            "12a4".to_string(),
            "12a4".to_string(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_unlock_with_correct_pin() {
        let (db, clock, session) = configured().await;
        assert!(!security_status(&db, &clock, &session).await.unwrap().open);

        verify_unlock(&db, &clock, &session, SecurityMethod::Pin, "1234".to_string())
            .await
            .unwrap();
        let state = security_status(&db, &clock, &session).await.unwrap();
        assert!(state.unlocked);
        assert!(state.open);
    }

    #[tokio::test]
    async fn test_lockout_after_three_failures() {
        let (db, clock, session) = configured().await;
        let pin = |s: &str| s.to_string();

        for remaining in [2u32, 1, 0] {
            let err = verify_unlock(&db, &clock, &session, SecurityMethod::Pin, pin("9999"))
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidCredential);
            assert!(err.message.contains(&remaining.to_string()));
        }

        // Correct secret still refused while locked out
        clock.advance(Duration::seconds(30));
        let err = verify_unlock(&db, &clock, &session, SecurityMethod::Pin, pin("1234"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::LockedOut);
        assert!(!session.is_unlocked());

        let status = security_status(&db, &clock, &session).await.unwrap().status;
        assert_eq!(status.lockout_remaining_seconds, Some(30));

        clock.advance(Duration::seconds(31));
        verify_unlock(&db, &clock, &session, SecurityMethod::Pin, pin("1234"))
            .await
            .unwrap();
        let status = security_status(&db, &clock, &session).await.unwrap().status;
        assert_eq!(status.failed_attempts, 0);
        assert_eq!(status.lockout_remaining_seconds, None);
    }

    #[tokio::test]
    async fn test_disable_keeps_secret() {
        let (db, clock, session) = configured().await;
        disable_security(&db, &clock).await.unwrap();
        assert!(security_status(&db, &clock, &session).await.unwrap().open);

        let status = enable_security(&db, &clock, &session).await.unwrap();
        assert!(status.enabled);
        assert_eq!(status.method, Some(SecurityMethod::Pin));
    }
}
