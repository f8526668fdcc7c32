//! # Settlement Module
//!
//! The pricing pipeline that turns a cart subtotal into a final charge.
//!
//! ## The Fixed Discount Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Settlement Pipeline                                  │
//! │                                                                         │
//! │  subtotal                                                              │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  1. promo code      after_promo = subtotal × (1 − percent/100)         │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  2. loyalty points  cap = floor(after_promo × 0.15)                    │
//! │     │               spent = min(requested, balance, cap)               │
//! │     ▼                                                                   │
//! │  3. rounding        total = max(0, ceil(after_promo − spent))          │
//! │                                                                         │
//! │  The ORDER is the business rule: the points cap is computed on the     │
//! │  post-promo amount, so stacking promo + points can never exceed        │
//! │  promo% plus 15% of the remainder.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All arithmetic is exact integer math. The only fractional intermediate
//! is the promo division, carried in hundredths of a minor unit (i128),
//! and collapsed with an explicit ceiling so the store never
//! under-collects a fractional unit.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::PromoCode;

/// Loyalty points may never cover more than this percent of the
/// post-promo price.
pub const POINTS_CAP_PERCENT: i64 = 15;

// =============================================================================
// Settlement Result
// =============================================================================

/// The outcome of the discount pipeline. Pure data: persisting it and
/// debiting the balance is the order transaction's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Settlement {
    /// Cart subtotal the pipeline started from.
    pub subtotal: Money,

    /// Percent actually applied (0 when no valid promo).
    pub promo_percent: i64,

    /// Loyalty points redeemed. Always within the cap, the balance and
    /// the request.
    pub points_spent: i64,

    /// Final charge. Never negative.
    pub total: Money,
}

// =============================================================================
// Promo Code Normalization
// =============================================================================

/// Normalizes operator/user promo input: trim and case-fold to uppercase.
///
/// Lookup happens against normalized text, so `" sale10 "` and `"SALE10"`
/// are the same code.
pub fn normalize_promo_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Percent contributed by an optional promo lookup result.
///
/// A missing or inactive code contributes 0% and is NOT an error: an
/// unknown promo simply does not apply, and the order proceeds at full
/// price.
pub fn applicable_percent(promo: Option<&PromoCode>) -> i64 {
    match promo {
        Some(p) if p.is_active => p.discount_percent.clamp(0, 100),
        _ => 0,
    }
}

// =============================================================================
// The Calculator
// =============================================================================

/// Runs the discount pipeline.
///
/// ## Arguments
/// * `subtotal` - cart subtotal, expected positive
/// * `promo_percent` - 0-100; out-of-range input is clamped
/// * `points_requested` - caller's "use points" intent; negative or
///   garbage values clamp to 0, never an error
/// * `balance` - the user's current point balance
///
/// ## Guarantees
/// * `points_spent ≤ floor(after_promo × 0.15)`
/// * `points_spent ≤ balance` and `points_spent ≤ points_requested`
/// * `total = max(0, ceil(after_promo − points_spent))`
///
/// ## Example
/// ```rust
/// use lavka_core::money::Money;
/// use lavka_core::settlement::settle;
///
/// // subtotal of 1000 units, 10% promo, 200 points requested, 500 held:
/// // after_promo 900, cap 135 → spend 135 → total 765
/// let s = settle(Money::from_minor(1000), 10, 200, 500);
/// assert_eq!(s.points_spent, 135);
/// assert_eq!(s.total.minor(), 765);
/// ```
pub fn settle(subtotal: Money, promo_percent: i64, points_requested: i64, balance: i64) -> Settlement {
    let percent = promo_percent.clamp(0, 100);
    let requested = points_requested.max(0);
    let balance = balance.max(0);

    // Exact post-promo value in hundredths of a minor unit.
    // i128 keeps the multiplication overflow-free for any realistic cart.
    let after_promo_h: i128 = subtotal.minor().max(0) as i128 * (100 - percent) as i128;

    // floor(after_promo × 15%), in whole minor units (one point = one unit)
    let points_cap = (after_promo_h * POINTS_CAP_PERCENT as i128 / 10_000) as i64;

    let points_spent = requested.min(balance).min(points_cap);

    // ceil(after_promo − points_spent), floored at zero
    let remainder_h = after_promo_h - points_spent as i128 * 100;
    let total_minor = if remainder_h <= 0 {
        0
    } else {
        ((remainder_h + 99) / 100) as i64
    };

    Settlement {
        subtotal,
        promo_percent: percent,
        points_spent,
        total: Money::from_minor(total_minor),
    }
}

// =============================================================================
// Cashback
// =============================================================================

/// Points credited back to the purchaser on fulfillment:
/// `floor(total × rate_bps / 10000)`.
///
/// A rate of 0 (the default) disables cashback entirely.
pub fn cashback_points(total: Money, rate_bps: u32) -> i64 {
    (total.minor().max(0) as i128 * rate_bps as i128 / 10_000) as i64
}

// =============================================================================
// Unit Tests
// =============================================================================
