//! # Validation Module
//!
//! Input validation utilities for the Lavka backend.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Mini-app frontend (TypeScript)                               │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engine facade (Rust)                                         │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE constraints                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note the deliberate asymmetry: negative *quantities* are
//! rejected here, while negative *point requests* are clamped to zero by
//! the settlement calculator and never reach validation.

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_PROMO_CODE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a promo code AFTER normalization
/// ([`crate::settlement::normalize_promo_code`]).
///
/// ## Rules
/// - Must not be empty
/// - Maximum 50 characters
/// - Only letters, digits, hyphens, underscores
///
/// This guards code *creation* by admins. Shopper-supplied codes at
/// checkout are never validated: an unknown or malformed code simply
/// applies no discount.
pub fn validate_promo_code(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_PROMO_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_PROMO_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be positive (> 0) — negative quantities are REJECTED, not clamped
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a sale price in minor units.
///
/// ## Rules
/// - Must be strictly positive; there are no free items in the catalog
pub fn validate_price_minor(minor: i64) -> ValidationResult<()> {
    if minor <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a cost price in minor units.
///
/// ## Rules
/// - Must be non-negative; zero means "cost unknown" and the product
///   contributes nothing to COGS in reports
pub fn validate_cost_minor(minor: i64) -> ValidationResult<()> {
    if minor < 0 {
        return Err(ValidationError::OutOfRange {
            field: "cost".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a promo discount percent.
///
/// ## Rules
/// - Must be between 1 and 100 inclusive
pub fn validate_promo_percent(percent: i64) -> ValidationResult<()> {
    if !(1..=100).contains(&percent) {
        return Err(ValidationError::OutOfRange {
            field: "discount_percent".to_string(),
            min: 1,
            max: 100,
        });
    }

    Ok(())
}

/// Validates an expense amount in minor units.
pub fn validate_expense_amount(minor: i64) -> ValidationResult<()> {
    if minor <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
