//! # Notification Sink
//!
//! Post-commit admin notifications for new orders.
//!
//! ## Best-Effort Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Notification Guarantees                              │
//! │                                                                         │
//! │  place_order                                                           │
//! │     │                                                                   │
//! │     ├── transaction commits        ← the order EXISTS from here on     │
//! │     │                                                                   │
//! │     └── notifier.order_placed(…)   ← AFTER commit, failures logged     │
//! │                                      and swallowed                      │
//! │                                                                         │
//! │  A down chat platform must never fail a checkout. The admin order      │
//! │  list is the source of truth; the push message is a convenience.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine owns a `Box<dyn Notifier>`; production wires a chat-platform
//! sender, tests plug in recorders and failure injectors.

use async_trait::async_trait;
use tracing::info;

use lavka_core::{Money, Order, OrderSnapshot};

/// Notification delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The downstream channel rejected or never received the message.
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// A sink for order notifications.
///
/// Implementations must not block for long: the engine awaits delivery
/// inline after commit, so a slow sink delays the checkout response
/// (never its success).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announces a freshly placed order to the given admin ids.
    async fn order_placed(
        &self,
        admin_ids: &[i64],
        order: &Order,
        snapshot: &OrderSnapshot,
    ) -> Result<(), NotifyError>;
}

/// Renders the human-readable order summary sent to admins.
pub fn format_order_summary(order: &Order, snapshot: &OrderSnapshot) -> String {
    let mut out = format!("New order #{}\n", order.id);

    for line in &snapshot.lines {
        out.push_str(&format!(
            "  {} x{} = {}\n",
            line.name,
            line.quantity,
            line.line_total()
        ));
    }

    out.push_str(&format!("Subtotal: {}\n", order.subtotal()));
    if let Some(code) = &order.promo_code {
        out.push_str(&format!("Promo: {} (-{}%)\n", code, order.promo_percent));
    }
    if order.points_spent > 0 {
        out.push_str(&format!(
            "Points: -{}\n",
            Money::from_minor(order.points_spent)
        ));
    }
    out.push_str(&format!("Total: {}\n", order.total()));

    if let Some(address) = &order.address {
        out.push_str(&format!("Address: {address}\n"));
    }
    if let Some(comment) = &order.comment {
        out.push_str(&format!("Comment: {comment}\n"));
    }

    out
}

/// A notifier that writes the summary to the log.
///
/// The default sink for development and for deployments that have not
/// wired a chat-platform sender yet.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn order_placed(
        &self,
        admin_ids: &[i64],
        order: &Order,
        snapshot: &OrderSnapshot,
    ) -> Result<(), NotifyError> {
        info!(
            order_id = order.id,
            admins = admin_ids.len(),
            summary = %format_order_summary(order, snapshot),
            "Order notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lavka_core::{OrderLine, OrderStatus};

    fn sample_order() -> (Order, OrderSnapshot) {
        let snapshot = OrderSnapshot::new(vec![OrderLine {
            product_id: 1,
            name: "Mango 30ml".to_string(),
            unit_price_minor: 1000,
            quantity: 2,
        }]);
        let order = Order {
            id: 42,
            user_id: 7,
            details: serde_json::to_string(&snapshot).unwrap(),
            subtotal_minor: 2000,
            promo_code: Some("SALE10".to_string()),
            promo_percent: 10,
            points_spent: 100,
            total_minor: 1700,
            address: Some("Main St 1".to_string()),
            comment: None,
            status: OrderStatus::Active,
            created_at: Utc::now(),
        };
        (order, snapshot)
    }

    #[test]
    fn test_format_order_summary() {
        let (order, snapshot) = sample_order();
        let summary = format_order_summary(&order, &snapshot);

        assert!(summary.contains("New order #42"));
        assert!(summary.contains("Mango 30ml x2 = 20.00"));
        assert!(summary.contains("Promo: SALE10 (-10%)"));
        assert!(summary.contains("Points: -1.00"));
        assert!(summary.contains("Total: 17.00"));
        assert!(summary.contains("Address: Main St 1"));
        assert!(!summary.contains("Comment:"));
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let (order, snapshot) = sample_order();
        assert!(LogNotifier
            .order_placed(&[10, 20], &order, &snapshot)
            .await
            .is_ok());
    }
}
