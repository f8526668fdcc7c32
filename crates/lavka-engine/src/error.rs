//! # Engine Error Types
//!
//! The caller-safe error taxonomy. Every fallible engine operation fails
//! with exactly one of these variants; the transport layer (bot handler,
//! HTTP adapter) maps them to user-visible replies without inspecting
//! lower-layer errors.
//!
//! ## Mapping Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Taxonomy Mapping                               │
//! │                                                                         │
//! │  lavka-core                      →  EngineError                        │
//! │  ──────────                         ───────────                        │
//! │  EmptyCart                       →  EmptyCart                          │
//! │  Validation(_)                   →  InvalidInput                       │
//! │  InvalidOrderStatus / NotFound*  →  NotFound (existence is not        │
//! │                                     revealed beyond "no such thing")   │
//! │                                                                         │
//! │  lavka-db                        →  EngineError                        │
//! │  ────────                           ───────────                        │
//! │  NotFound                        →  NotFound                           │
//! │  Conflict / UniqueViolation      →  Conflict                           │
//! │  ConnectionFailed / Pool…        →  StoreUnavailable                   │
//! │  everything else                 →  StoreUnavailable                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use lavka_core::{CoreError, ValidationError};
use lavka_db::DbError;

/// Engine operation errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The caller is not allowed to perform this operation.
    #[error("User {user_id} is not an administrator")]
    Forbidden { user_id: i64 },

    /// Checkout attempted against an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Caller-supplied data failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A concurrent mutation invalidated this operation; retrying may
    /// succeed.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The store backend is unreachable or failing; nothing the caller
    /// can fix.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl EngineError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EngineError::NotFound { entity, id },

            DbError::UniqueViolation { field, value } => {
                EngineError::Conflict(format!("duplicate {field}: {value}"))
            }

            DbError::Conflict(msg) => EngineError::Conflict(msg),

            DbError::Domain(core) => core.into(),

            // FK violations surface when a referenced row vanished
            // between read and write
            DbError::ForeignKeyViolation { message } => EngineError::Conflict(message),

            DbError::ConnectionFailed(msg)
            | DbError::MigrationFailed(msg)
            | DbError::QueryFailed(msg)
            | DbError::Internal(msg) => EngineError::StoreUnavailable(msg),

            DbError::PoolExhausted => {
                EngineError::StoreUnavailable("connection pool exhausted".to_string())
            }
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyCart => EngineError::EmptyCart,

            CoreError::ProductNotFound(id) => EngineError::not_found("Product", id),

            // A completed order is gone as far as "complete it" goes:
            // completion is not idempotent, and a second attempt is
            // rejected the same way as an unknown order.
            CoreError::InvalidOrderStatus { order_id, .. } => {
                EngineError::not_found("Active order", order_id)
            }

            CoreError::CartTooLarge { max } => {
                EngineError::InvalidInput(format!("cart exceeds {max} distinct items"))
            }

            CoreError::CorruptSnapshot(msg) => EngineError::StoreUnavailable(msg),

            CoreError::Validation(v) => v.into(),
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::InvalidInput(err.to_string())
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_maps_through() {
        let err: EngineError = DbError::not_found("Order", 42).into();
        assert!(matches!(err, EngineError::NotFound { .. }));
        assert_eq!(err.to_string(), "Order not found: 42");
    }

    #[test]
    fn test_empty_cart_maps_through_domain_wrapper() {
        let err: EngineError = DbError::Domain(CoreError::EmptyCart).into();
        assert!(matches!(err, EngineError::EmptyCart));
    }

    #[test]
    fn test_completed_order_rejected_as_not_found() {
        let err: EngineError = DbError::Domain(CoreError::InvalidOrderStatus {
            order_id: 9,
            current_status: "completed".to_string(),
        })
        .into();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[test]
    fn test_infrastructure_failures_are_store_unavailable() {
        let err: EngineError = DbError::PoolExhausted.into();
        assert!(matches!(err, EngineError::StoreUnavailable(_)));
    }
}
