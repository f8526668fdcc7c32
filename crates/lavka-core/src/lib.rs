//! # lavka-core: Pure Business Logic for the Lavka Storefront
//!
//! This crate is the **heart** of the order-management backend. It contains
//! the one piece of logic with invariants worth protecting — the discount
//! settlement pipeline — as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lavka Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Mini-app frontend / Admin bot (external)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  lavka-engine (facade)                          │   │
//! │  │    place_order, complete_order, wizard, reports                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lavka-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ settlement │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  settle()  │  │   rules   │  │   │
//! │  │   │   Order   │  │  parsing  │  │  cashback  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    lavka-db (Database Layer)                    │   │
//! │  │         SQLite queries, migrations, repositories, txns          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Product, Order, PromoCode, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`settlement`] - The discount pipeline: promo → points → ceiling
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are minor units (i64), no floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use lavka_core::money::Money;
//! use lavka_core::settlement::settle;
//!
//! // Subtotal 1000, 10% promo, 200 points requested against a balance
//! // of 500: the cap is 15% of the post-promo amount.
//! let s = settle(Money::from_minor(1000), 10, 200, 500);
//! assert_eq!(s.total.minor(), 765);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod settlement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use lavka_core::Money` instead of
// `use lavka_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use settlement::{
    applicable_percent, cashback_points, normalize_promo_code, settle, Settlement,
    POINTS_CAP_PERCENT,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps the admin order summary readable.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in a cart line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of a promo code after normalization.
pub const MAX_PROMO_CODE_LEN: usize = 50;

/// Loyalty points granted to a freshly registered user.
///
/// Carried over from the storefront this backend replaces; override via
/// the engine configuration.
pub const DEFAULT_SIGNUP_BONUS_POINTS: i64 = 500;

/// Default cashback rate in basis points. Cashback is opt-in: early
/// revisions of the store ran without it, so 0 is the safe default.
/// The observed production rate was 5% (500 bps).
pub const DEFAULT_CASHBACK_RATE_BPS: u32 = 0;
