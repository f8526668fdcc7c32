//! # Product Repository
//!
//! Catalog CRUD for the admin surface and the storefront listing.
//!
//! Stock is NOT mutated here: the only writer of `stock` is the
//! fulfillment transaction in [`crate::repository::order`], which
//! decrements it from the frozen order snapshot.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use lavka_core::{NewProduct, Product};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product and returns it with its assigned id.
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        debug!(name = %new.name, "Inserting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products (name, category, description, price_minor, cost_minor, image_ref, stock, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&new.name)
        .bind(&new.category)
        .bind(&new.description)
        .bind(new.price_minor)
        .bind(new.cost_minor)
        .bind(&new.image_ref)
        .bind(new.stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id: result.last_insert_rowid(),
            name: new.name.clone(),
            category: new.category.clone(),
            description: new.description.clone(),
            price_minor: new.price_minor,
            cost_minor: new.cost_minor,
            image_ref: new.image_ref.clone(),
            stock: new.stock,
            created_at: now,
        })
    }

    /// Gets a product by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists the catalog, newest first (the storefront's default view).
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Updates a product's editable fields.
    ///
    /// Historical orders are unaffected: they carry their own name/price
    /// snapshot.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                description = ?4,
                price_minor = ?5,
                cost_minor = ?6,
                image_ref = ?7,
                stock = ?8
            WHERE id = ?1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.description)
        .bind(product.price_minor)
        .bind(product.cost_minor)
        .bind(&product.image_ref)
        .bind(product.stock)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.id));
        }

        Ok(())
    }

    /// Deletes a product. Cart lines referencing it cascade away;
    /// order snapshots keep their frozen copy.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}
