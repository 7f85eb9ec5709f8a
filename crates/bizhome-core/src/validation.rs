//! # Validation Module
//!
//! Input validation for BizHome forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI form                                                       │
//! │  └── Immediate feedback (empty fields, number inputs)                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: App command (Rust)                                            │
//! │  └── THIS MODULE: business rule validation                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  ├── UNIQUE(categorias.nombre), UNIQUE(configuracion.clave)             │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bizhome_core::validation::{validate_pin, validate_sale_quantity};
//!
//! assert!(validate_pin("1234", "1234").is_ok());
//! assert!(validate_sale_quantity(0.0).is_err());
//! ```

use crate::error::ValidationError;
use crate::license::{MAX_VALIDITY_MONTHS, MIN_VALIDITY_MONTHS};
use crate::types::{margin_percent, NewCategory, NewExpense, NewProduct, SecurityMethod};
use crate::MIN_MARGIN_PERCENT;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MIN_PRODUCT_NAME_LEN: usize = 2;
pub const PIN_LEN: usize = 4;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_PATTERN_LEN: usize = 4;

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a number".to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn positive(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a category form.
///
/// ## Rules
/// - Name must not be empty
pub fn validate_category(category: &NewCategory) -> ValidationResult<()> {
    required("nombre", &category.name)
}

/// Validates a product form.
///
/// ## Rules
/// - Name at least 2 characters
/// - Prices and stock are numbers >= 0
/// - Sale price strictly above purchase price
/// - Markup at least [`MIN_MARGIN_PERCENT`]
///
/// ## Example
/// ```text
/// cost 10.00, price 10.40 → margin 4%  → MarginTooLow
/// cost 10.00, price 10.50 → margin 5%  → OK
/// cost 10.00, price  9.00 →            → PriceNotAboveCost
/// ```
pub fn validate_product(product: &NewProduct) -> ValidationResult<()> {
    let name = product.name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "nombre".to_string(),
        });
    }
    if name.chars().count() < MIN_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooShort {
            field: "nombre".to_string(),
            min: MIN_PRODUCT_NAME_LEN,
        });
    }

    non_negative("precio_compra", product.purchase_price)?;
    non_negative("precio_venta", product.sale_price)?;
    non_negative("stock", product.stock)?;

    if product.purchase_price >= product.sale_price {
        return Err(ValidationError::PriceNotAboveCost);
    }

    if let Some(margin) = margin_percent(product.purchase_price, product.sale_price) {
        // Tolerate float noise right at the boundary (10.00 → 10.50 is 5%)
        if margin + 1e-9 < MIN_MARGIN_PERCENT {
            return Err(ValidationError::MarginTooLow {
                margin,
                min: MIN_MARGIN_PERCENT,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Ledger Validators
// =============================================================================

/// Sale quantities must be strictly positive.
pub fn validate_sale_quantity(quantity: f64) -> ValidationResult<()> {
    positive("cantidad", quantity)
}

/// Unit prices are accepted as given, provided they are numbers >= 0.
pub fn validate_unit_price(unit_price: f64) -> ValidationResult<()> {
    non_negative("precio_unitario", unit_price)
}

/// Validates an expense form.
///
/// ## Rules
/// - Description must not be empty
/// - Amount strictly positive
pub fn validate_expense(expense: &NewExpense) -> ValidationResult<()> {
    required("descripcion", &expense.description)?;
    positive("cantidad", expense.amount)
}

/// Stock adjustments must be finite; the sign is free.
pub fn validate_stock_delta(delta: f64) -> ValidationResult<()> {
    if !delta.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "stock".to_string(),
            reason: "must be a number".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Settings Validators
// =============================================================================

/// Retention percent must lie in 0..=100.
pub fn validate_retention_percent(percent: f64) -> ValidationResult<()> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(ValidationError::OutOfRange {
            field: "porcentaje_retencion".to_string(),
            min: 0.0,
            max: 100.0,
        });
    }
    Ok(())
}

/// Daily expense limit must be a positive number.
pub fn validate_daily_limit(limit: f64) -> ValidationResult<()> {
    positive("limite_diario_gastos", limit)
}

/// License validity must lie in 1..=36 months.
pub fn validate_validity_months(months: u32) -> ValidationResult<()> {
    if !(MIN_VALIDITY_MONTHS..=MAX_VALIDITY_MONTHS).contains(&months) {
        return Err(ValidationError::OutOfRange {
            field: "validityMonths".to_string(),
            min: MIN_VALIDITY_MONTHS as f64,
            max: MAX_VALIDITY_MONTHS as f64,
        });
    }
    Ok(())
}

// =============================================================================
// Secret Validators
// =============================================================================

fn confirm(field: &str, secret: &str, confirmation: &str) -> ValidationResult<()> {
    if secret != confirmation {
        return Err(ValidationError::Mismatch {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// PIN: exactly four ASCII digits, matching its confirmation.
pub fn validate_pin(pin: &str, confirmation: &str) -> ValidationResult<()> {
    if pin.len() != PIN_LEN || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "pin".to_string(),
            reason: format!("must be exactly {} digits", PIN_LEN),
        });
    }
    confirm("pin", pin, confirmation)
}

/// Password: at least six characters, matching its confirmation.
pub fn validate_password(password: &str, confirmation: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    confirm("password", password, confirmation)
}

/// Pattern: sequence of at least four grid points, matching its confirmation.
pub fn validate_pattern(pattern: &str, confirmation: &str) -> ValidationResult<()> {
    if pattern.chars().count() < MIN_PATTERN_LEN {
        return Err(ValidationError::TooShort {
            field: "patron".to_string(),
            min: MIN_PATTERN_LEN,
        });
    }
    confirm("patron", pattern, confirmation)
}

/// Dispatches to the validator of `method`.
pub fn validate_secret(method: SecurityMethod, secret: &str, confirmation: &str) -> ValidationResult<()> {
    match method {
        SecurityMethod::Pin => validate_pin(secret, confirmation),
        SecurityMethod::Password => validate_password(secret, confirmation),
        SecurityMethod::Pattern => validate_pattern(secret, confirmation),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
