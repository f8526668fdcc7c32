//! # Error Types
//!
//! Domain-specific error types for lavka-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lavka-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  lavka-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  lavka-engine errors (separate crate)                                  │
//! │  └── EngineError      - Caller-safe taxonomy the API surface sees      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → EngineError → Caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (order id, field name, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout was attempted against a cart with no lines.
    ///
    /// Also raised when a concurrent checkout consumed the cart between
    /// the caller's snapshot and the settlement transaction.
    #[error("Cart is empty")]
    EmptyCart,

    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Order is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Completing an already completed order (completion is NOT
    ///   idempotent; the second attempt is rejected)
    /// - Editing a completed order
    #[error("Order {order_id} is {current_status}, cannot perform operation")]
    InvalidOrderStatus {
        order_id: i64,
        current_status: String,
    },

    /// Cart has exceeded maximum allowed distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// The stored order line snapshot could not be decoded.
    #[error("Corrupt order snapshot: {0}")]
    CorruptSnapshot(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparsable number or amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidOrderStatus {
            order_id: 42,
            current_status: "completed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Order 42 is completed, cannot perform operation"
        );

        assert_eq!(CoreError::EmptyCart.to_string(), "Cart is empty");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::OutOfRange {
            field: "discount_percent".to_string(),
            min: 1,
            max: 100,
        };
        assert_eq!(
            err.to_string(),
            "discount_percent must be between 1 and 100"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
