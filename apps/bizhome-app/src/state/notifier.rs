//! # Notifier
//!
//! Outbound events the host platform turns into user notifications.
//! Scheduling and display belong to the host; the app only decides
//! *when* an event fires.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Mutex;
use tracing::warn;

/// Event raised by a command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NotificationEvent {
    /// Today's expenses went over the daily limit. At most one per local day.
    #[serde(rename_all = "camelCase")]
    DailyLimitExceeded {
        date: NaiveDate,
        spent: f64,
        limit: f64,
    },
}

pub trait Notifier: Send + Sync + Debug {
    fn notify(&self, event: &NotificationEvent);
}

/// Writes events to the log. Used when no host bridge is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &NotificationEvent) {
        match event {
            NotificationEvent::DailyLimitExceeded { date, spent, limit } => {
                warn!(%date, spent, limit, "Daily expense limit exceeded");
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &NotificationEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}
