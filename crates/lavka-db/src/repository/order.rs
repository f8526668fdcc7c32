//! # Order Repository
//!
//! Order placement and fulfillment. The two write paths here are the only
//! multi-statement transactions in the system.
//!
//! ## Placement Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    place(params)                                        │
//! │                                                                         │
//! │  BEGIN IMMEDIATE         ← write lock up front; rivals queue here       │
//! │    1. read point balance (user must exist → NotFound)                   │
//! │    2. read priced cart (join against live catalog)                      │
//! │    3. empty cart → abort (domain rule, rolls back)                      │
//! │    4. run settlement pipeline (pure, in lavka-core)                     │
//! │    5. INSERT order with frozen line snapshot                            │
//! │    6. conditional debit: UPDATE ... WHERE points >= spent               │
//! │       (0 rows → Conflict, rolls back)                                   │
//! │    7. DELETE cart lines                                                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Notification happens AFTER commit, outside this module.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fulfillment Transaction
//! Completion re-reads the frozen snapshot, decrements stock per line
//! (silently skipping products deleted since placement), credits optional
//! cashback, and flips status with a guard on the previous status so a
//! racing double-complete fails instead of decrementing stock twice.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use lavka_core::{
    applicable_percent, cashback_points, settle, CoreError, Money, Order, OrderLine,
    OrderSnapshot, OrderStatus, PromoCode, Settlement, MAX_CART_ITEMS,
};

// =============================================================================
// Inputs / Outputs
// =============================================================================

/// Input for placing an order.
#[derive(Debug, Clone)]
pub struct PlaceOrderParams {
    pub user_id: i64,

    /// Promo to apply, already resolved against the active set. `None`
    /// (or an inactive code) contributes 0%.
    pub promo: Option<PromoCode>,

    /// How many loyalty points the user asked to redeem. Clamped by the
    /// settlement pipeline; negative input spends nothing.
    pub points_requested: i64,

    pub address: Option<String>,
    pub comment: Option<String>,
}

/// A successfully placed order, with the settlement that produced it.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub settlement: Settlement,
    pub snapshot: OrderSnapshot,
}

/// Outcome of completing an order.
#[derive(Debug, Clone)]
pub struct CompletedOrder {
    pub order_id: i64,
    pub user_id: i64,
    pub total_minor: i64,

    /// Points credited back to the purchaser (0 when cashback is off).
    pub cashback_points: i64,

    /// Product ids from the snapshot that no longer exist in the catalog;
    /// their stock decrement was skipped.
    pub skipped_products: Vec<i64>,
}

/// An order joined with the purchaser's contact details.
///
/// The admin fulfillment view needs someone to call: the order row
/// carries the address, the user row carries name/phone/handle.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderWithContact {
    #[sqlx(flatten)]
    pub order: Order,

    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_username: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Places an order from the user's current cart.
    ///
    /// Atomic: the order insert, the point debit and the cart clear all
    /// commit together or not at all. The cart is priced inside the
    /// transaction, so a concurrent checkout of the same cart finds it
    /// empty and fails with [`CoreError::EmptyCart`].
    pub async fn place(&self, params: PlaceOrderParams) -> DbResult<PlacedOrder> {
        debug!(user_id = params.user_id, "Placing order");

        // IMMEDIATE takes the write lock up front, so two concurrent
        // checkouts serialize here instead of both snapshotting the cart
        // and colliding at commit.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        // 1. The user must exist before the cart is even looked at; an
        //    unregistered caller gets NotFound, not EmptyCart.
        let balance: i64 =
            sqlx::query_scalar("SELECT points FROM users WHERE telegram_id = ?1")
                .bind(params.user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("User", params.user_id))?;

        // 2. Price the cart against the live catalog.
        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT c.product_id,
                   p.name,
                   p.price_minor AS unit_price_minor,
                   c.quantity
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            WHERE c.user_id = ?1
            ORDER BY p.name
            "#,
        )
        .bind(params.user_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        if lines.len() > MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            }
            .into());
        }

        // 3. Settlement (pure arithmetic).
        let snapshot = OrderSnapshot::new(lines);
        let subtotal: i64 = snapshot.lines.iter().map(|l| l.line_total().minor()).sum();
        let promo_percent = applicable_percent(params.promo.as_ref());
        let settlement = settle(
            Money::from_minor(subtotal),
            promo_percent,
            params.points_requested,
            balance,
        );

        let details = serde_json::to_string(&snapshot)
            .map_err(|e| DbError::Internal(e.to_string()))?;
        let promo_code = params.promo.as_ref().map(|p| p.code.clone());
        let created_at = Utc::now();

        // 4. Insert the order with its frozen snapshot.
        let order_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders
                (user_id, details, subtotal_minor, promo_code, promo_percent,
                 points_spent, total_minor, address, comment, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'active', ?10)
            RETURNING id
            "#,
        )
        .bind(params.user_id)
        .bind(&details)
        .bind(subtotal)
        .bind(&promo_code)
        .bind(settlement.promo_percent)
        .bind(settlement.points_spent)
        .bind(settlement.total.minor())
        .bind(&params.address)
        .bind(&params.comment)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await?;

        // 5. Conditional point debit. The WHERE guard re-checks the
        //    balance so a racing spend cannot drive it negative.
        if settlement.points_spent > 0 {
            let debited = sqlx::query(
                "UPDATE users SET points = points - ?2 WHERE telegram_id = ?1 AND points >= ?2",
            )
            .bind(params.user_id)
            .bind(settlement.points_spent)
            .execute(&mut *tx)
            .await?;

            if debited.rows_affected() == 0 {
                return Err(DbError::Conflict(format!(
                    "point balance changed under checkout for user {}",
                    params.user_id
                )));
            }
        }

        // 6. Clear the cart.
        sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(params.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            order_id,
            user_id = params.user_id,
            total_minor = settlement.total.minor(),
            points_spent = settlement.points_spent,
            "Order placed"
        );

        let order = Order {
            id: order_id,
            user_id: params.user_id,
            details,
            subtotal_minor: subtotal,
            promo_code,
            promo_percent: settlement.promo_percent,
            points_spent: settlement.points_spent,
            total_minor: settlement.total.minor(),
            address: params.address,
            comment: params.comment,
            status: OrderStatus::Active,
            created_at,
        };

        Ok(PlacedOrder {
            order,
            settlement,
            snapshot,
        })
    }

    /// Completes an active order: decrements stock from the frozen
    /// snapshot, credits cashback at `cashback_rate_bps`, and flips the
    /// status. Completing a completed order fails; completion is NOT
    /// idempotent because it moves stock and points.
    pub async fn complete(&self, order_id: i64, cashback_rate_bps: u32) -> DbResult<CompletedOrder> {
        debug!(order_id, "Completing order");

        // Same IMMEDIATE start as placement: a racing double-complete
        // serializes on the write lock and the loser reads the flipped
        // status instead of a stale snapshot.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        if order.status != OrderStatus::Active {
            return Err(CoreError::InvalidOrderStatus {
                order_id,
                current_status: "completed".to_string(),
            }
            .into());
        }

        let snapshot = order.snapshot()?;

        // Decrement stock per line. A product deleted since placement has
        // no row to update; skip it and keep going.
        let mut skipped_products = Vec::new();
        for line in &snapshot.lines {
            let result = sqlx::query("UPDATE products SET stock = stock - ?1 WHERE id = ?2")
                .bind(line.quantity)
                .bind(line.product_id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                debug!(
                    order_id,
                    product_id = line.product_id,
                    "Product gone, skipping stock decrement"
                );
                skipped_products.push(line.product_id);
            }
        }

        let cashback = cashback_points(order.total(), cashback_rate_bps);
        if cashback > 0 {
            sqlx::query("UPDATE users SET points = points + ?2 WHERE telegram_id = ?1")
                .bind(order.user_id)
                .bind(cashback)
                .execute(&mut *tx)
                .await?;
        }

        // Guarded flip: a racing complete loses here and rolls back its
        // stock/cashback writes.
        let flipped = sqlx::query(
            "UPDATE orders SET status = 'completed' WHERE id = ?1 AND status = 'active'",
        )
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            return Err(DbError::Conflict(format!(
                "order {order_id} was completed concurrently"
            )));
        }

        tx.commit().await?;

        info!(
            order_id,
            user_id = order.user_id,
            cashback,
            skipped = skipped_products.len(),
            "Order completed"
        );

        Ok(CompletedOrder {
            order_id,
            user_id: order.user_id,
            total_minor: order.total_minor,
            cashback_points: cashback,
            skipped_products,
        })
    }

    /// Gets an order by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Updates an active order's delivery address and comment.
    ///
    /// Completed orders are immutable; the status guard rejects them the
    /// same way as an unknown id. The line snapshot and settlement
    /// fields are never editable.
    pub async fn update_details(
        &self,
        order_id: i64,
        address: Option<&str>,
        comment: Option<&str>,
    ) -> DbResult<()> {
        debug!(order_id, "Updating order details");

        let result = sqlx::query(
            "UPDATE orders SET address = ?2, comment = ?3 WHERE id = ?1 AND status = 'active'",
        )
        .bind(order_id)
        .bind(address)
        .bind(comment)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Active order", order_id));
        }

        Ok(())
    }

    /// Lists orders in a status, newest first, capped at 50 rows.
    pub async fn list_by_status(&self, status: OrderStatus) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE status = ?1 ORDER BY created_at DESC, id DESC LIMIT 50",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists orders in a status joined with purchaser contact details,
    /// newest first, capped at 50 rows. Backs the admin fulfillment view.
    pub async fn list_by_status_with_contact(
        &self,
        status: OrderStatus,
    ) -> DbResult<Vec<OrderWithContact>> {
        let orders = sqlx::query_as::<_, OrderWithContact>(
            r#"
            SELECT o.*,
                   u.name     AS contact_name,
                   u.phone    AS contact_phone,
                   u.username AS contact_username
            FROM orders o
            LEFT JOIN users u ON u.telegram_id = o.user_id
            WHERE o.status = ?1
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT 50
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists a user's orders, newest first.
    pub async fn list_for_user(&self, user_id: i64) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Completed orders created in `[from, to)`, for the monthly report.
    pub async fn list_completed_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE status = 'completed' AND created_at >= ?1 AND created_at < ?2
            ORDER BY created_at
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::user::NewUser;
    use lavka_core::NewProduct;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_user(db: &Database, id: i64, points: i64) {
        db.users()
            .insert(&NewUser {
                telegram_id: id,
                name: Some("Alice".to_string()),
                phone: None,
                username: None,
                referral_code: format!("REF-{id:06}"),
                signup_bonus_points: points,
            })
            .await
            .unwrap();
    }

    async fn seed_product(db: &Database, name: &str, price: i64, stock: i64) -> i64 {
        db.products()
            .insert(&NewProduct {
                name: name.to_string(),
                category: None,
                description: None,
                price_minor: price,
                cost_minor: price / 2,
                image_ref: None,
                stock,
            })
            .await
            .unwrap()
            .id
    }

    fn params(user_id: i64) -> PlaceOrderParams {
        PlaceOrderParams {
            user_id,
            promo: None,
            points_requested: 0,
            address: Some("Main St 1".to_string()),
            comment: None,
        }
    }

    #[tokio::test]
    async fn test_place_order_debits_points_and_clears_cart() {
        let db = setup().await;
        seed_user(&db, 7, 500).await;
        let product = seed_product(&db, "Mango 30ml", 1000, 10).await;
        db.carts().add(7, product, 1).await.unwrap();

        let promo = db.promo_codes().create("SALE10", 10).await.unwrap();
        let placed = db
            .orders()
            .place(PlaceOrderParams {
                user_id: 7,
                promo: Some(promo),
                points_requested: 200,
                address: None,
                comment: None,
            })
            .await
            .unwrap();

        // 1000 → 900 after promo, cap 135, spend 135, total 765
        assert_eq!(placed.order.subtotal_minor, 1000);
        assert_eq!(placed.order.promo_percent, 10);
        assert_eq!(placed.order.points_spent, 135);
        assert_eq!(placed.order.total_minor, 765);
        assert_eq!(placed.order.status, OrderStatus::Active);

        let user = db.users().require(7).await.unwrap();
        assert_eq!(user.points, 365);
        assert_eq!(db.carts().distinct_count(7).await.unwrap(), 0);

        // stock untouched until fulfillment
        let p = db.products().get(product).await.unwrap().unwrap();
        assert_eq!(p.stock, 10);
    }

    #[tokio::test]
    async fn test_place_empty_cart_rejected() {
        let db = setup().await;
        seed_user(&db, 7, 0).await;

        let err = db.orders().place(params(7)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_place_unknown_user_rejected() {
        let db = setup().await;
        // the user check runs before the cart is looked at, so an
        // unregistered caller gets NotFound rather than EmptyCart
        let err = db.orders().place(params(99)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // even when stray cart rows exist for the id
        let product = seed_product(&db, "Mango 30ml", 1000, 10).await;
        db.carts().add(99, product, 1).await.unwrap();
        let err = db.orders().place(params(99)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_snapshot_freezes_name_and_price() {
        let db = setup().await;
        seed_user(&db, 7, 0).await;
        let product = seed_product(&db, "Mango 30ml", 1000, 10).await;
        db.carts().add(7, product, 2).await.unwrap();

        let placed = db.orders().place(params(7)).await.unwrap();
        assert_eq!(placed.order.total_minor, 2000);

        // mutate the catalog after placement
        let mut p = db.products().get(product).await.unwrap().unwrap();
        p.name = "Renamed".to_string();
        p.price_minor = 9999;
        db.products().update(&p).await.unwrap();

        let stored = db.orders().get(placed.order.id).await.unwrap().unwrap();
        let snapshot = stored.snapshot().unwrap();
        assert_eq!(snapshot.lines[0].name, "Mango 30ml");
        assert_eq!(snapshot.lines[0].unit_price_minor, 1000);
        assert_eq!(stored.total_minor, 2000);
    }

    #[tokio::test]
    async fn test_complete_decrements_stock_and_flips_status() {
        let db = setup().await;
        seed_user(&db, 7, 0).await;
        let product = seed_product(&db, "Mango 30ml", 1000, 10).await;
        db.carts().add(7, product, 3).await.unwrap();
        let placed = db.orders().place(params(7)).await.unwrap();

        let done = db.orders().complete(placed.order.id, 0).await.unwrap();
        assert_eq!(done.cashback_points, 0);
        assert!(done.skipped_products.is_empty());

        let p = db.products().get(product).await.unwrap().unwrap();
        assert_eq!(p.stock, 7);

        let order = db.orders().get(placed.order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_complete_twice_rejected() {
        let db = setup().await;
        seed_user(&db, 7, 0).await;
        let product = seed_product(&db, "Mango 30ml", 1000, 10).await;
        db.carts().add(7, product, 1).await.unwrap();
        let placed = db.orders().place(params(7)).await.unwrap();

        db.orders().complete(placed.order.id, 0).await.unwrap();
        let err = db.orders().complete(placed.order.id, 0).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidOrderStatus { .. })
        ));

        // stock decremented exactly once
        let p = db.products().get(product).await.unwrap().unwrap();
        assert_eq!(p.stock, 9);
    }

    #[tokio::test]
    async fn test_complete_skips_deleted_product() {
        let db = setup().await;
        seed_user(&db, 7, 0).await;
        let keep = seed_product(&db, "Berry 30ml", 1200, 5).await;
        let gone = seed_product(&db, "Mango 30ml", 1000, 5).await;
        db.carts().add(7, keep, 1).await.unwrap();
        db.carts().add(7, gone, 2).await.unwrap();
        let placed = db.orders().place(params(7)).await.unwrap();

        db.products().delete(gone).await.unwrap();

        let done = db.orders().complete(placed.order.id, 0).await.unwrap();
        assert_eq!(done.skipped_products, vec![gone]);

        let p = db.products().get(keep).await.unwrap().unwrap();
        assert_eq!(p.stock, 4);

        let order = db.orders().get(placed.order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_complete_credits_cashback() {
        let db = setup().await;
        seed_user(&db, 7, 100).await;
        let product = seed_product(&db, "Mango 30ml", 765, 10).await;
        db.carts().add(7, product, 1).await.unwrap();
        let placed = db.orders().place(params(7)).await.unwrap();

        // 5% of 765 = 38.25 → 38 points
        let done = db.orders().complete(placed.order.id, 500).await.unwrap();
        assert_eq!(done.cashback_points, 38);

        let user = db.users().require(7).await.unwrap();
        assert_eq!(user.points, 138);
    }

    #[tokio::test]
    async fn test_complete_unknown_order() {
        let db = setup().await;
        let err = db.orders().complete(404, 0).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_oversell_drives_stock_negative() {
        let db = setup().await;
        seed_user(&db, 7, 0).await;
        let product = seed_product(&db, "Mango 30ml", 1000, 1).await;
        db.carts().add(7, product, 3).await.unwrap();
        let placed = db.orders().place(params(7)).await.unwrap();

        db.orders().complete(placed.order.id, 0).await.unwrap();

        // no floor on stock: overselling is visible, not hidden
        let p = db.products().get(product).await.unwrap().unwrap();
        assert_eq!(p.stock, -2);
    }

    #[tokio::test]
    async fn test_listings() {
        let db = setup().await;
        seed_user(&db, 7, 0).await;
        let product = seed_product(&db, "Mango 30ml", 1000, 100).await;

        db.carts().add(7, product, 1).await.unwrap();
        let first = db.orders().place(params(7)).await.unwrap();
        db.carts().add(7, product, 1).await.unwrap();
        let second = db.orders().place(params(7)).await.unwrap();

        db.orders().complete(first.order.id, 0).await.unwrap();

        let active = db.orders().list_by_status(OrderStatus::Active).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.order.id);

        let mine = db.orders().list_for_user(7).await.unwrap();
        assert_eq!(mine.len(), 2);

        let now = Utc::now();
        let completed = db
            .orders()
            .list_completed_between(now - chrono::Duration::hours(1), now + chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, first.order.id);
    }

    #[tokio::test]
    async fn test_update_details_on_active_order() {
        let db = setup().await;
        seed_user(&db, 7, 0).await;
        let product = seed_product(&db, "Mango 30ml", 1000, 10).await;
        db.carts().add(7, product, 1).await.unwrap();
        let placed = db.orders().place(params(7)).await.unwrap();

        db.orders()
            .update_details(placed.order.id, Some("Oak Ave 5"), Some("ring twice"))
            .await
            .unwrap();

        let stored = db.orders().get(placed.order.id).await.unwrap().unwrap();
        assert_eq!(stored.address.as_deref(), Some("Oak Ave 5"));
        assert_eq!(stored.comment.as_deref(), Some("ring twice"));
        // settlement fields untouched
        assert_eq!(stored.total_minor, placed.order.total_minor);
    }

    #[tokio::test]
    async fn test_update_details_rejects_completed_order() {
        let db = setup().await;
        seed_user(&db, 7, 0).await;
        let product = seed_product(&db, "Mango 30ml", 1000, 10).await;
        db.carts().add(7, product, 1).await.unwrap();
        let placed = db.orders().place(params(7)).await.unwrap();
        db.orders().complete(placed.order.id, 0).await.unwrap();

        let err = db
            .orders()
            .update_details(placed.order.id, Some("Oak Ave 5"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let stored = db.orders().get(placed.order.id).await.unwrap().unwrap();
        assert_eq!(stored.address.as_deref(), Some("Main St 1"));
    }

    #[tokio::test]
    async fn test_listing_with_contact_joins_purchaser() {
        let db = setup().await;
        db.users()
            .insert(&NewUser {
                telegram_id: 7,
                name: Some("Alice".to_string()),
                phone: Some("+100200300".to_string()),
                username: Some("alice_v".to_string()),
                referral_code: "REF-000007".to_string(),
                signup_bonus_points: 0,
            })
            .await
            .unwrap();
        let product = seed_product(&db, "Mango 30ml", 1000, 10).await;
        db.carts().add(7, product, 1).await.unwrap();
        let placed = db.orders().place(params(7)).await.unwrap();

        let active = db
            .orders()
            .list_by_status_with_contact(OrderStatus::Active)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].order.id, placed.order.id);
        assert_eq!(active[0].contact_name.as_deref(), Some("Alice"));
        assert_eq!(active[0].contact_phone.as_deref(), Some("+100200300"));
        assert_eq!(active[0].contact_username.as_deref(), Some("alice_v"));
    }

    // -------------------------------------------------------------------------
    // Concurrency (file-backed, multiple connections)
    // -------------------------------------------------------------------------

    /// In-memory SQLite is pinned to one connection, so races need a real
    /// file with a pool wide enough for two writers.
    async fn setup_on_disk(tag: &str) -> Database {
        let path = std::env::temp_dir().join(format!("lavka-{tag}-{}.db", std::process::id()));
        let path = path.to_string_lossy().into_owned();
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{path}{suffix}"));
        }
        Database::new(DbConfig::new(path).max_connections(4))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_concurrent_checkout_consumes_cart_once() {
        let db = setup_on_disk("double-checkout").await;
        seed_user(&db, 7, 500).await;
        let product = seed_product(&db, "Mango 30ml", 1000, 10).await;
        db.carts().add(7, product, 1).await.unwrap();

        let orders = db.orders();
        let (a, b) = tokio::join!(orders.place(params(7)), orders.place(params(7)));

        // exactly one wins; the loser serialized behind the write lock and
        // found the cart already consumed
        let (_won, lost) = match (a, b) {
            (Ok(p), Err(e)) => (p, e),
            (Err(e), Ok(p)) => (p, e),
            (Ok(_), Ok(_)) => panic!("both checkouts succeeded"),
            (Err(_), Err(_)) => panic!("both checkouts failed"),
        };
        assert!(matches!(lost, DbError::Domain(CoreError::EmptyCart)));

        let mine = db.orders().list_for_user(7).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(db.carts().distinct_count(7).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_complete_moves_stock_once() {
        let db = setup_on_disk("double-complete").await;
        seed_user(&db, 7, 0).await;
        let product = seed_product(&db, "Mango 30ml", 1000, 10).await;
        db.carts().add(7, product, 3).await.unwrap();
        let placed = db.orders().place(params(7)).await.unwrap();

        let orders = db.orders();
        let (a, b) = tokio::join!(
            orders.complete(placed.order.id, 0),
            orders.complete(placed.order.id, 0)
        );

        let (_won, lost) = match (a, b) {
            (Ok(c), Err(e)) => (c, e),
            (Err(e), Ok(c)) => (c, e),
            (Ok(_), Ok(_)) => panic!("both completions succeeded"),
            (Err(_), Err(_)) => panic!("both completions failed"),
        };
        assert!(matches!(
            lost,
            DbError::Domain(CoreError::InvalidOrderStatus { .. }) | DbError::Conflict(_)
        ));

        // stock decremented exactly once despite the race
        let p = db.products().get(product).await.unwrap().unwrap();
        assert_eq!(p.stock, 7);
    }
}
