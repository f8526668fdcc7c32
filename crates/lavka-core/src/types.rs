//! # Domain Types
//!
//! Core domain types used throughout the Lavka backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     User        │   │    Product      │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  telegram_id    │   │  id             │   │  id             │       │
//! │  │  points         │   │  price_minor    │   │  details (JSON) │       │
//! │  │  referral_code  │   │  stock          │   │  total_minor    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   CartLine      │   │   OrderLine     │   │   OrderStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  (user,product) │   │  frozen price + │   │  Active         │       │
//! │  │  quantity       │   │  name snapshot  │   │  Completed      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity Conventions
//! - Users are keyed by their opaque chat-platform id (`telegram_id`),
//!   never by a surrogate.
//! - Products, orders and expenses use autoincrement integer row ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// Current version of the order line snapshot format stored in
/// `orders.details`. Bump when the line record shape changes; readers
/// must keep decoding every past version.
pub const SNAPSHOT_VERSION: u32 = 1;

// =============================================================================
// User
// =============================================================================

/// A registered shopper.
///
/// Users are never deleted in the normal flow; the loyalty point balance
/// is debited at checkout and credited by fulfillment cashback.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    /// Opaque chat-platform user id (unique).
    pub telegram_id: i64,

    /// Display name.
    pub name: Option<String>,

    /// Contact phone.
    pub phone: Option<String>,

    /// Display handle on the chat platform.
    pub username: Option<String>,

    /// Loyalty point balance. Never negative; one point redeems one
    /// smallest currency unit at checkout.
    pub points: i64,

    /// Unique referral code handed out at registration.
    pub referral_code: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique row id.
    pub id: i64,

    /// Display name shown in the mini-app and in order summaries.
    pub name: String,

    /// Free-text category tag.
    pub category: Option<String>,

    /// Optional description.
    pub description: Option<String>,

    /// Sale price in minor units. Always positive.
    pub price_minor: i64,

    /// Cost price in minor units, used only for margin reporting.
    pub cost_minor: i64,

    /// Opaque image reference (media-store handle or URL).
    pub image_ref: Option<String>,

    /// Current stock level. May go negative when an order oversells;
    /// fulfillment decrements without a floor.
    pub stock: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price_minor)
    }

    /// Returns the cost price as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_minor(self.cost_minor)
    }
}

/// Input for creating a product (admin wizard output).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price_minor: i64,
    pub cost_minor: i64,
    pub image_ref: Option<String>,
    pub stock: i64,
}

// =============================================================================
// Cart
// =============================================================================

/// A line in a user's cart: one row per (user, product) pair.
///
/// Adding an existing pair increments `quantity` instead of duplicating
/// the row. The whole cart is deleted when an order is placed from it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartLine {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

/// A priced view of a cart at checkout time.
///
/// Prices are read live from the catalog when the snapshot is taken, so a
/// price change between add-to-cart and checkout is reflected here.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSnapshot {
    pub lines: Vec<OrderLine>,
    pub subtotal_minor: i64,
}

impl CartSnapshot {
    /// Builds a snapshot from priced lines, computing the subtotal.
    pub fn new(lines: Vec<OrderLine>) -> Self {
        let subtotal_minor = lines.iter().map(|l| l.line_total().minor()).sum();
        CartSnapshot {
            lines,
            subtotal_minor,
        }
    }

    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_minor(self.subtotal_minor)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Order Line Snapshot
// =============================================================================

/// A purchased line, frozen at order time.
///
/// ## Snapshot Pattern
/// Product name and unit price are copied here when the order is placed.
/// Later product edits or deletes never alter historical orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderLine {
    pub product_id: i64,
    /// Product name at order time (frozen).
    pub name: String,
    /// Unit price in minor units at order time (frozen).
    pub unit_price_minor: i64,
    pub quantity: i64,
}

impl OrderLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_minor(self.unit_price_minor)
    }

    /// Returns the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

/// The versioned value stored in `orders.details`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderSnapshot {
    #[serde(default = "default_snapshot_version")]
    pub version: u32,
    pub lines: Vec<OrderLine>,
}

fn default_snapshot_version() -> u32 {
    SNAPSHOT_VERSION
}

impl OrderSnapshot {
    pub fn new(lines: Vec<OrderLine>) -> Self {
        OrderSnapshot {
            version: SNAPSHOT_VERSION,
            lines,
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of an order.
///
/// `Active` orders await fulfillment; `Completed` orders are immutable
/// except for the cashback credit completion already triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Active,
    Completed,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Active
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order.
///
/// Invariant: `total = max(0, ceil(subtotal·(1−promo_percent/100) −
/// points_spent))`, established by the settlement calculator and never
/// recomputed after the row is written.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    /// JSON-serialized [`OrderSnapshot`].
    pub details: String,
    pub subtotal_minor: i64,
    /// Promo code actually applied, normalized uppercase. `None` when no
    /// valid code was supplied.
    pub promo_code: Option<String>,
    /// Percent actually applied (0 when no promo). Deactivating the code
    /// later does not change this.
    pub promo_percent: i64,
    /// Loyalty points redeemed against this order.
    pub points_spent: i64,
    pub total_minor: i64,
    pub address: Option<String>,
    pub comment: Option<String>,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_minor(self.subtotal_minor)
    }

    /// Returns the final charged total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_minor)
    }

    /// Decodes the frozen line snapshot.
    pub fn snapshot(&self) -> CoreResult<OrderSnapshot> {
        serde_json::from_str(&self.details)
            .map_err(|e| CoreError::CorruptSnapshot(e.to_string()))
    }
}

// =============================================================================
// Promo Code
// =============================================================================

/// A reusable percentage discount token.
///
/// Codes are stored normalized (trimmed, uppercase). Many orders may
/// reference one code; orders record the percent they actually applied.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PromoCode {
    pub code: String,
    /// Discount percent, 1-100.
    pub discount_percent: i64,
    pub is_active: bool,
}

// =============================================================================
// Expense
// =============================================================================

/// A manual operating cost, used only by the monthly report.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: i64,
    pub amount_minor: i64,
    pub comment: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_minor(self.amount_minor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i64, price: i64, qty: i64) -> OrderLine {
        OrderLine {
            product_id,
            name: format!("product-{product_id}"),
            unit_price_minor: price,
            quantity: qty,
        }
    }

    #[test]
    fn test_cart_snapshot_subtotal() {
        let snapshot = CartSnapshot::new(vec![line(1, 1000, 2), line(2, 250, 1)]);
        assert_eq!(snapshot.subtotal_minor, 2250);
        assert!(!snapshot.is_empty());

        let empty = CartSnapshot::new(vec![]);
        assert_eq!(empty.subtotal_minor, 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_order_line_totals() {
        let l = line(1, 299, 3);
        assert_eq!(l.line_total().minor(), 897);
    }

    #[test]
    fn test_order_snapshot_round_trip() {
        let snapshot = OrderSnapshot::new(vec![line(1, 1000, 2)]);
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: OrderSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.version, SNAPSHOT_VERSION);
        assert_eq!(back.lines, snapshot.lines);
    }

    #[test]
    fn test_order_snapshot_tolerates_missing_version() {
        // Rows written before the version field existed decode as v1.
        let json = r#"{"lines":[{"product_id":1,"name":"x","unit_price_minor":100,"quantity":1}]}"#;
        let snapshot: OrderSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
    }

    #[test]
    fn test_order_snapshot_decode_failure() {
        let order = Order {
            id: 1,
            user_id: 7,
            details: "not json".to_string(),
            subtotal_minor: 0,
            promo_code: None,
            promo_percent: 0,
            points_spent: 0,
            total_minor: 0,
            address: None,
            comment: None,
            status: OrderStatus::Active,
            created_at: Utc::now(),
        };
        assert!(matches!(
            order.snapshot(),
            Err(CoreError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Active);
    }
}
