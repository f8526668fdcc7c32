//! # Cart Repository
//!
//! Cart line storage keyed by `(user_id, product_id)`.
//!
//! The cart stores quantities only. Names and prices are resolved at read
//! time via [`CartRepository::priced_lines`], so a price change between
//! "add to cart" and "checkout" is always reflected; nothing is frozen
//! until the order transaction writes its snapshot.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use lavka_core::{CartSnapshot, OrderLine};

/// A raw cart row (no product data joined in).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartRow {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Adds `quantity` units of a product to the user's cart.
    ///
    /// Re-adding an existing product increments its line instead of
    /// creating a duplicate. Returns the resulting line quantity.
    pub async fn add(&self, user_id: i64, product_id: i64, quantity: i64) -> DbResult<i64> {
        debug!(user_id, product_id, quantity, "Adding to cart");

        let new_quantity: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id, product_id)
                DO UPDATE SET quantity = quantity + excluded.quantity
            RETURNING quantity
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(new_quantity)
    }

    /// Removes one unit of a product from the cart, or the whole line when
    /// `remove_all` is set. Removing from a line at quantity 1 deletes it.
    ///
    /// Returns the remaining quantity (0 when the line is gone). Removing
    /// a product that is not in the cart is a no-op returning 0.
    pub async fn remove(&self, user_id: i64, product_id: i64, remove_all: bool) -> DbResult<i64> {
        debug!(user_id, product_id, remove_all, "Removing from cart");

        if !remove_all {
            let remaining: Option<i64> = sqlx::query_scalar(
                r#"
                UPDATE cart_items SET quantity = quantity - 1
                WHERE user_id = ?1 AND product_id = ?2 AND quantity > 1
                RETURNING quantity
                "#,
            )
            .bind(user_id)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(quantity) = remaining {
                return Ok(quantity);
            }
        }

        // remove_all, or the line was at quantity 1
        sqlx::query("DELETE FROM cart_items WHERE user_id = ?1 AND product_id = ?2")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        Ok(0)
    }

    /// Loads the cart joined against the live catalog, priced and ordered
    /// by product name. Lines whose product has been deleted do not
    /// survive the join (the FK cascade removes them anyway).
    pub async fn priced_lines(&self, user_id: i64) -> DbResult<Vec<OrderLine>> {
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
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Loads the priced cart as a snapshot with its subtotal computed.
    pub async fn snapshot(&self, user_id: i64) -> DbResult<CartSnapshot> {
        let lines = self.priced_lines(user_id).await?;
        Ok(CartSnapshot::new(lines))
    }

    /// Raw cart rows for a user (quantities only, no join).
    pub async fn lines(&self, user_id: i64) -> DbResult<Vec<CartRow>> {
        let rows = sqlx::query_as::<_, CartRow>(
            "SELECT user_id, product_id, quantity FROM cart_items WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Number of distinct products in the user's cart.
    pub async fn distinct_count(&self, user_id: i64) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE user_id = ?1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Empties the user's cart.
    pub async fn clear(&self, user_id: i64) -> DbResult<()> {
        debug!(user_id, "Clearing cart");

        sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
