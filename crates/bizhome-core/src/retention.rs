//! # Retention Accounting
//!
//! Derives the stored money fields of a sale at write time.
//!
//! ## Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  quantity=3, unit_price=15.00, purchase_price=10.00, retention 20%      │
//! │                                                                         │
//! │  total        = quantity × unit_price           = 45.00                 │
//! │  gross_profit = total − purchase_price × qty    = 15.00                 │
//! │  retention    = gross_profit × percent / 100    =  3.00  (if enabled)   │
//! │  net_profit   = gross_profit − retention        = 12.00                 │
//! │                                                                         │
//! │  Disabled: retention = 0, net_profit = gross_profit                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A loss (negative gross) produces a negative retention when enabled; the
//! figures are not clamped.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::DEFAULT_RETENTION_PERCENT;

// =============================================================================
// Retention Policy
// =============================================================================

/// Whether and how much of each sale's gross profit is set aside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RetentionPolicy {
    pub enabled: bool,
    /// 0-100.
    pub percent: f64,
}

impl RetentionPolicy {
    /// Retention switched on at `percent`.
    pub fn enabled(percent: f64) -> Self {
        RetentionPolicy {
            enabled: true,
            percent,
        }
    }

    /// Retention switched off (the percent is kept for display).
    pub fn disabled() -> Self {
        RetentionPolicy {
            enabled: false,
            percent: DEFAULT_RETENTION_PERCENT,
        }
    }

    /// Builds the policy from raw `configuracion` values.
    ///
    /// ## Rules
    /// - `retener_ganancias` must be exactly `"true"` to enable
    /// - `porcentaje_retencion` falls back to 10 when absent, unparsable or
    ///   outside 0..=100
    ///
    /// ## Example
    /// ```rust
    /// use bizhome_core::retention::RetentionPolicy;
    ///
    /// let policy = RetentionPolicy::from_settings(Some("true"), Some("abc"));
    /// assert!(policy.enabled);
    /// assert_eq!(policy.percent, 10.0);
    /// ```
    pub fn from_settings(retain: Option<&str>, percent: Option<&str>) -> Self {
        let enabled = retain.map(|v| v.trim() == "true").unwrap_or(false);
        let percent = percent
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|p| (0.0..=100.0).contains(p))
            .unwrap_or(DEFAULT_RETENTION_PERCENT);

        RetentionPolicy { enabled, percent }
    }

    /// Amount withheld from `gross_profit`.
    #[inline]
    pub fn retention_of(&self, gross_profit: f64) -> f64 {
        if self.enabled {
            gross_profit * self.percent / 100.0
        } else {
            0.0
        }
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy::disabled()
    }
}

// =============================================================================
// Sale Figures
// =============================================================================

/// The four derived money fields persisted with a sale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleFigures {
    pub total: f64,
    pub gross_profit: f64,
    pub retention: f64,
    pub net_profit: f64,
}

impl SaleFigures {
    /// Computes the stored figures of a sale.
    ///
    /// `purchase_price` is the product's cost at the time of the write.
    pub fn compute(
        quantity: f64,
        unit_price: f64,
        purchase_price: f64,
        policy: RetentionPolicy,
    ) -> Self {
        let total = quantity * unit_price;
        let gross_profit = total - purchase_price * quantity;
        let retention = policy.retention_of(gross_profit);

        SaleFigures {
            total,
            gross_profit,
            retention,
            net_profit: gross_profit - retention,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_worked_example_twenty_percent() {
        let f = SaleFigures::compute(3.0, 15.0, 10.0, RetentionPolicy::enabled(20.0));
        assert_eq!(f.total, 45.0);
        assert!(close(f.gross_profit, 15.0));
        assert!(close(f.retention, 3.0));
        assert!(close(f.net_profit, 12.0));
    }

    #[test]
    fn test_disabled_keeps_full_gross() {
        let f = SaleFigures::compute(2.5, 4.0, 3.0, RetentionPolicy::disabled());
        assert_eq!(f.total, 2.5 * 4.0);
        assert_eq!(f.retention, 0.0);
        assert_eq!(f.net_profit, f.gross_profit);
    }

    #[test]
    fn test_loss_is_not_clamped() {
        let f = SaleFigures::compute(1.0, 8.0, 10.0, RetentionPolicy::enabled(10.0));
        assert!(close(f.gross_profit, -2.0));
        assert!(close(f.retention, -0.2));
        assert!(close(f.net_profit, -1.8));
    }

    #[test]
    fn test_from_settings() {
        let p = RetentionPolicy::from_settings(Some("false"), Some("25"));
        assert!(!p.enabled);
        assert_eq!(p.percent, 25.0);

        let p = RetentionPolicy::from_settings(Some("true"), None);
        assert!(p.enabled);
        assert_eq!(p.percent, DEFAULT_RETENTION_PERCENT);

        let p = RetentionPolicy::from_settings(None, Some(" 12.5 "));
        assert!(!p.enabled);
        assert_eq!(p.percent, 12.5);

        let p = RetentionPolicy::from_settings(Some("true"), Some("NaN"));
        assert_eq!(p.percent, DEFAULT_RETENTION_PERCENT);
    }

    #[test]
    fn test_from_settings_rejects_out_of_range() {
        for raw in ["150", "-5", "100.01"] {
            let p = RetentionPolicy::from_settings(Some("true"), Some(raw));
            assert_eq!(p.percent, DEFAULT_RETENTION_PERCENT, "{}", raw);
        }

        let p = RetentionPolicy::from_settings(Some("true"), Some("100"));
        assert_eq!(p.percent, 100.0);
        let p = RetentionPolicy::from_settings(Some("true"), Some("0"));
        assert_eq!(p.percent, 0.0);
    }
}
