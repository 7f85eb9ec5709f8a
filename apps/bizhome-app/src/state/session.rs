//! # Session State
//!
//! In-memory lock state of the running app. The persisted security row says
//! whether the lock is enabled; this says whether the user got past it in
//! this process.
//!
//! ```text
//!   start ──► Locked ──verify ok──► Unlocked ──lock()──► Locked
//! ```
//!
//! Never persisted: every launch starts locked.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};

use bizhome_core::SecurityMethod;

/// Current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Set by a successful unlock, cleared by `lock()`.
    pub unlocked_at: Option<DateTime<Utc>>,
    /// Method used for the last unlock.
    pub method: Option<SecurityMethod>,
}

impl Session {
    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }

    pub fn unlock(&mut self, method: Option<SecurityMethod>, now: DateTime<Utc>) {
        self.unlocked_at = Some(now);
        self.method = method;
    }

    pub fn lock(&mut self) {
        self.unlocked_at = None;
        self.method = None;
    }
}

/// Shared session handle.
///
/// ## Thread Safety
/// `Arc<Mutex<Session>>`: operations are a field write or two.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    session: Arc<Mutex<Session>>,
}

impl SessionState {
    /// Creates a locked session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the session.
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Session) -> R,
    {
        let session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        f(&session)
    }

    /// Executes a function with write access to the session.
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut session)
    }

    pub fn is_unlocked(&self) -> bool {
        self.with_session(Session::is_unlocked)
    }

    /// Whether the UI may show app content, given the persisted enabled flag.
    pub fn is_open(&self, lock_enabled: bool) -> bool {
        !lock_enabled || self.is_unlocked()
    }

    pub fn snapshot(&self) -> Session {
        self.with_session(Session::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_locked() {
        let state = SessionState::new();
        assert!(!state.is_unlocked());
        assert!(state.is_open(false));
        assert!(!state.is_open(true));
    }

    #[test]
    fn test_unlock_then_lock() {
        let state = SessionState::new();
        let now = Utc::now();

        state.with_session_mut(|s| s.unlock(Some(SecurityMethod::Pin), now));
        assert!(state.is_open(true));
        assert_eq!(state.snapshot().method, Some(SecurityMethod::Pin));

        state.with_session_mut(Session::lock);
        assert!(!state.is_unlocked());
        assert_eq!(state.snapshot(), Session::default());
    }
}
