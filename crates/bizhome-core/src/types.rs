//! # Domain Types
//!
//! Core domain types used throughout BizHome.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │◄──│    Product      │◄──│      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  name (unique)  │   │  category_id    │   │  product_id     │       │
//! │  │  icon           │   │  purchase_price │   │  total          │       │
//! │  │  product_count  │   │  sale_price     │   │  gross_profit   │       │
//! │  └─────────────────┘   │  stock (real)   │   │  retention      │       │
//! │                        └─────────────────┘   │  net_profit     │       │
//! │  ┌─────────────────┐                         └─────────────────┘       │
//! │  │    Expense      │   Singletons: NotificationState, SecurityConfig   │
//! │  │  description    │   Key/value:  ConfigEntry                         │
//! │  │  amount         │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Timestamps
//! Sale and expense dates are local wall-clock `NaiveDateTime`: "today" and
//! "this week" are calendar notions of the shop's own clock. Lockout instants
//! use `DateTime<Utc>`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Unit Type
// =============================================================================

/// How a product is measured when sold.
///
/// Stored with the Spanish tokens of the `productos.tipo_unidad` CHECK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    /// Sold per piece.
    Unidad,
    /// Pound.
    Libra,
    /// Kilogram.
    Kg,
    /// Liter.
    Litro,
    /// Package.
    Paquete,
}

impl UnitType {
    pub const ALL: [UnitType; 5] = [
        UnitType::Unidad,
        UnitType::Libra,
        UnitType::Kg,
        UnitType::Litro,
        UnitType::Paquete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Unidad => "unidad",
            UnitType::Libra => "libra",
            UnitType::Kg => "kg",
            UnitType::Litro => "litro",
            UnitType::Paquete => "paquete",
        }
    }

    /// Whether quantities of this unit are usually fractional.
    pub fn is_weighed(&self) -> bool {
        matches!(self, UnitType::Libra | UnitType::Kg | UnitType::Litro)
    }
}

impl Default for UnitType {
    fn default() -> Self {
        UnitType::Unidad
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitType::ALL
            .into_iter()
            .find(|u| u.as_str() == s.trim())
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "tipo_unidad".to_string(),
                reason: format!("unknown unit '{}'", s),
            })
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,

    /// Unique display name.
    pub name: String,

    pub description: Option<String>,

    /// Material icon name, `folder` when not chosen.
    pub icon: String,

    /// Number of products currently referencing this category.
    pub product_count: i64,

    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

/// Input for creating or editing a category.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    /// Falls back to `folder` when absent.
    pub icon: Option<String>,
}

/// Per-category sales totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CategorySales {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub total_sales: f64,
    pub sale_count: i64,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,

    pub name: String,

    pub category_id: i64,

    /// Joined from `categorias` on reads.
    pub category_name: Option<String>,

    /// Cost paid per unit. Snapshot into a sale's gross profit at write time.
    pub purchase_price: f64,

    /// Suggested price per unit.
    pub sale_price: f64,

    pub unit_type: UnitType,

    /// Current stock in `unit_type` units (fractional for weighed goods).
    pub stock: f64,

    pub description: Option<String>,

    pub image_path: Option<String>,

    pub barcode: Option<String>,

    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

impl Product {
    /// Markup of sale price over purchase price, in percent.
    ///
    /// Returns `None` when the purchase price is zero.
    pub fn margin_percent(&self) -> Option<f64> {
        margin_percent(self.purchase_price, self.sale_price)
    }

    /// Whether `quantity` can be taken from stock.
    pub fn can_sell(&self, quantity: f64) -> bool {
        quantity <= self.stock
    }
}

/// Markup of `sale` over `cost`, in percent.
pub fn margin_percent(cost: f64, sale: f64) -> Option<f64> {
    if cost > 0.0 {
        Some((sale - cost) / cost * 100.0)
    } else {
        None
    }
}

/// Input for creating or editing a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub category_id: i64,
    pub purchase_price: f64,
    pub sale_price: f64,
    pub unit_type: UnitType,
    pub stock: f64,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub barcode: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale.
///
/// `total`, `gross_profit`, `retention` and `net_profit` are frozen at write
/// time and never recomputed on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    pub product_id: i64,
    /// Joined from `productos` on reads.
    pub product_name: Option<String>,
    /// Joined from `productos` on reads.
    pub unit_type: Option<UnitType>,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
    pub gross_profit: f64,
    pub retention: f64,
    pub net_profit: f64,
    #[ts(as = "String")]
    pub date: NaiveDateTime,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::new(self.total)
    }

    #[inline]
    pub fn net_profit(&self) -> Money {
        Money::new(self.net_profit)
    }
}

/// Input for recording or editing a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub product_id: i64,
    pub quantity: f64,
    pub unit_price: f64,
    #[ts(as = "String")]
    pub date: NaiveDateTime,
}

// =============================================================================
// Expense
// =============================================================================

/// A household expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: i64,
    /// Free text, also fed to the keyword classifier.
    pub description: String,
    pub amount: f64,
    #[ts(as = "String")]
    pub date: NaiveDateTime,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::new(self.amount)
    }
}

/// Input for recording or editing an expense.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    #[ts(as = "String")]
    pub date: NaiveDateTime,
}

// =============================================================================
// Configuration
// =============================================================================

/// A key/value row from `configuracion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

/// Well-known configuration keys.
pub mod config_keys {
    /// `"true"` / `"false"`.
    pub const RETAIN_PROFITS: &str = "retener_ganancias";
    /// Decimal 0-100.
    pub const RETENTION_PERCENT: &str = "porcentaje_retencion";
    /// Decimal amount.
    pub const DAILY_EXPENSE_LIMIT: &str = "limite_diario_gastos";
    /// Activated license blob.
    pub const LICENSE: &str = "licencia";
    /// `YYYY-MM-DD` of the last daily-limit alert.
    pub const LAST_LIMIT_ALERT: &str = "ultima_alerta_limite";
}

// =============================================================================
// Notification State
// =============================================================================

/// Singleton notification preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct NotificationState {
    pub enabled: bool,
    #[ts(as = "Option<String>")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Default for NotificationState {
    fn default() -> Self {
        NotificationState {
            enabled: false,
            updated_at: None,
        }
    }
}

// =============================================================================
// Security
// =============================================================================

/// App-lock method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SecurityMethod {
    /// Exactly four digits.
    Pin,
    /// Six or more characters.
    Password,
    /// Unlock pattern, stored like a password.
    #[serde(rename = "patron")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "patron"))]
    Pattern,
}

impl SecurityMethod {
    pub const ALL: [SecurityMethod; 3] = [
        SecurityMethod::Pin,
        SecurityMethod::Password,
        SecurityMethod::Pattern,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityMethod::Pin => "pin",
            SecurityMethod::Password => "password",
            SecurityMethod::Pattern => "patron",
        }
    }
}

impl fmt::Display for SecurityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Singleton app-lock configuration.
///
/// ## State Machine
/// ```text
/// Disabled ──enable()──► Enabled/Locked ──verify ok──► Enabled/Unlocked
///    ▲                        │    ▲                    (session only)
///    └───────disable()────────┘    │
///                                  │ 3rd failure
///                                  ▼
///                           LockedOut(until now + 60s)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SecurityConfig {
    pub enabled: bool,
    pub method: Option<SecurityMethod>,
    #[serde(skip_serializing)]
    pub pin_hash: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(skip_serializing)]
    pub pattern_hash: Option<String>,
    pub failed_attempts: i64,
    #[ts(as = "Option<String>")]
    pub locked_until: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SecurityConfig {
    /// Stored digest for `method`, if configured.
    pub fn hash_for(&self, method: SecurityMethod) -> Option<&str> {
        match method {
            SecurityMethod::Pin => self.pin_hash.as_deref(),
            SecurityMethod::Password => self.password_hash.as_deref(),
            SecurityMethod::Pattern => self.pattern_hash.as_deref(),
        }
    }

    pub fn set_hash(&mut self, method: SecurityMethod, digest: String) {
        match method {
            SecurityMethod::Pin => self.pin_hash = Some(digest),
            SecurityMethod::Password => self.password_hash = Some(digest),
            SecurityMethod::Pattern => self.pattern_hash = Some(digest),
        }
    }

    /// Methods with a stored digest.
    pub fn configured_methods(&self) -> Vec<SecurityMethod> {
        SecurityMethod::ALL
            .into_iter()
            .filter(|m| self.hash_for(*m).is_some())
            .collect()
    }

    pub fn has_any_method(&self) -> bool {
        !self.configured_methods().is_empty()
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        SecurityConfig {
            enabled: false,
            method: None,
            pin_hash: None,
            password_hash: None,
            pattern_hash: None,
            failed_attempts: 0,
            locked_until: None,
            updated_at: None,
        }
    }
}

// =============================================================================
// Device Identity
// =============================================================================

/// Identity of the device a license is bound to.
///
/// Exchanged as the JSON payload of the device QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub device_id: String,
    pub model: String,
    pub platform: String,
    pub manufacturer: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_unit_type_round_trips_spanish_tokens() {
        assert_eq!("kg".parse::<UnitType>().unwrap(), UnitType::Kg);
        assert_eq!(UnitType::Paquete.to_string(), "paquete");
        assert!("docena".parse::<UnitType>().is_err());
        assert_eq!(serde_json::to_string(&UnitType::Litro).unwrap(), "\"litro\"");
    }

    #[test]
    fn test_security_method_pattern_token() {
        assert_eq!(SecurityMethod::Pattern.as_str(), "patron");
        assert_eq!(
            serde_json::from_str::<SecurityMethod>("\"patron\"").unwrap(),
            SecurityMethod::Pattern
        );
    }

    #[test]
    fn test_configured_methods() {
        let mut config = SecurityConfig::default();
        assert!(!config.has_any_method());

        config.set_hash(SecurityMethod::Password, "abc".to_string());
        assert_eq!(config.configured_methods(), vec![SecurityMethod::Password]);
        assert_eq!(config.hash_for(SecurityMethod::Pin), None);
    }

    #[test]
    fn test_security_config_hides_hashes() {
        let mut config = SecurityConfig::default();
        config.set_hash(SecurityMethod::Pin, "secret-digest".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret-digest"));
    }

    #[test]
    fn test_product_margin() {
        let product = Product {
            id: 1,
            name: "Arroz".to_string(),
            category_id: 1,
            category_name: None,
            purchase_price: 10.0,
            sale_price: 15.0,
            unit_type: UnitType::Kg,
            stock: 4.5,
            description: None,
            image_path: None,
            barcode: None,
            created_at: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        };

        assert_eq!(product.margin_percent(), Some(50.0));
        assert!(product.can_sell(4.5));
        assert!(!product.can_sell(5.0));
        assert_eq!(margin_percent(0.0, 3.0), None);
    }

    #[test]
    fn test_device_info_camel_case() {
        let device = DeviceInfo {
            device_id: "abc".to_string(),
            model: "Pixel".to_string(),
            platform: "android".to_string(),
            manufacturer: "Google".to_string(),
        };
        let json = serde_json::to_string(&device).unwrap();
        assert!(json.contains("\"deviceId\":\"abc\""));
    }
}
