//! # Daily Expense Limit
//!
//! Status of today's spending against `limite_diario_gastos` and the gate
//! that keeps the over-limit alert to once per calendar day.
//!
//! ```text
//!  today's expenses ──► evaluate(spent, limit) ──► exceeded? ──┐
//!                                                              │
//!  ultima_alerta_limite ──► should_alert(status, last, today) ◄┘
//!                                  │
//!                                  ▼ true at most once per day
//!                         DailyLimitExceeded event
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::DEFAULT_DAILY_LIMIT;

/// Today's spending against the daily limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailyLimitStatus {
    pub spent: f64,
    pub limit: f64,
    /// `spent / limit × 100`, unclamped.
    pub percentage: f64,
    /// Strictly above the limit.
    pub exceeded: bool,
}

impl DailyLimitStatus {
    /// ## Example
    /// ```rust
    /// use bizhome_core::budget::DailyLimitStatus;
    ///
    /// let status = DailyLimitStatus::evaluate(600.0, 500.0);
    /// assert!(status.exceeded);
    /// assert_eq!(status.percentage, 120.0);
    /// ```
    pub fn evaluate(spent: f64, limit: f64) -> Self {
        let percentage = if limit > 0.0 {
            spent / limit * 100.0
        } else {
            0.0
        };

        DailyLimitStatus {
            spent,
            limit,
            percentage,
            exceeded: spent > limit,
        }
    }

    /// Amount left before the limit, never negative.
    pub fn remaining(&self) -> f64 {
        (self.limit - self.spent).max(0.0)
    }
}

/// Reads the stored limit, falling back to 500 when it is absent, not a
/// number, or not positive.
pub fn parse_daily_limit(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(DEFAULT_DAILY_LIMIT)
}

/// Whether the over-limit alert should fire now.
///
/// Fires only when the limit is exceeded and no alert was sent on `today`.
pub fn should_alert(status: &DailyLimitStatus, last_alert: Option<NaiveDate>, today: NaiveDate) -> bool {
    status.exceeded && last_alert != Some(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    #[test]
    fn test_evaluate() {
        let under = DailyLimitStatus::evaluate(250.0, 500.0);
        assert!(!under.exceeded);
        assert_eq!(under.percentage, 50.0);
        assert_eq!(under.remaining(), 250.0);

        let exact = DailyLimitStatus::evaluate(500.0, 500.0);
        assert!(!exact.exceeded);

        let over = DailyLimitStatus::evaluate(550.0, 500.0);
        assert!(over.exceeded);
        assert_eq!(over.remaining(), 0.0);
    }

    #[test]
    fn test_parse_daily_limit_fallbacks() {
        assert_eq!(parse_daily_limit(Some("750.5")), 750.5);
        assert_eq!(parse_daily_limit(Some("abc")), DEFAULT_DAILY_LIMIT);
        assert_eq!(parse_daily_limit(Some("0")), DEFAULT_DAILY_LIMIT);
        assert_eq!(parse_daily_limit(None), DEFAULT_DAILY_LIMIT);
    }

    #[test]
    fn test_alert_once_per_day() {
        let over = DailyLimitStatus::evaluate(550.0, 500.0);
        assert!(should_alert(&over, None, d(13)));
        assert!(!should_alert(&over, Some(d(13)), d(13)));
        assert!(should_alert(&over, Some(d(12)), d(13)));

        let under = DailyLimitStatus::evaluate(100.0, 500.0);
        assert!(!should_alert(&under, None, d(13)));
    }
}
