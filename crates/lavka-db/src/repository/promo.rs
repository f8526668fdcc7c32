//! # Promo Code Repository
//!
//! Discount token storage. Codes are stored normalized (trimmed,
//! uppercase); lookups normalize their input the same way so the user
//! can type `" summer10 "` and still match `SUMMER10`.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use lavka_core::{normalize_promo_code, PromoCode};

/// Repository for promo code database operations.
#[derive(Debug, Clone)]
pub struct PromoCodeRepository {
    pool: SqlitePool,
}

impl PromoCodeRepository {
    /// Creates a new PromoCodeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PromoCodeRepository { pool }
    }

    /// Creates a promo code. The code is normalized before storage;
    /// a duplicate fails with [`DbError::UniqueViolation`].
    pub async fn create(&self, code: &str, discount_percent: i64) -> DbResult<PromoCode> {
        let code = normalize_promo_code(code);
        debug!(code = %code, discount_percent, "Creating promo code");

        sqlx::query(
            "INSERT INTO promo_codes (code, discount_percent, is_active) VALUES (?1, ?2, 1)",
        )
        .bind(&code)
        .bind(discount_percent)
        .execute(&self.pool)
        .await?;

        Ok(PromoCode {
            code,
            discount_percent,
            is_active: true,
        })
    }

    /// Looks up a code regardless of its active flag.
    pub async fn get(&self, code: &str) -> DbResult<Option<PromoCode>> {
        let code = normalize_promo_code(code);

        let promo = sqlx::query_as::<_, PromoCode>("SELECT * FROM promo_codes WHERE code = ?1")
            .bind(&code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(promo)
    }

    /// Looks up a code that is currently active. Inactive and unknown
    /// codes both come back as `None`; checkout treats them identically.
    pub async fn find_active(&self, code: &str) -> DbResult<Option<PromoCode>> {
        let code = normalize_promo_code(code);

        let promo = sqlx::query_as::<_, PromoCode>(
            "SELECT * FROM promo_codes WHERE code = ?1 AND is_active = 1",
        )
        .bind(&code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(promo)
    }

    /// Flips a code's active flag. Deactivation is the retirement path:
    /// codes are never deleted, so past orders keep a resolvable label.
    pub async fn set_active(&self, code: &str, active: bool) -> DbResult<()> {
        let code = normalize_promo_code(code);
        debug!(code = %code, active, "Updating promo code active flag");

        let result = sqlx::query("UPDATE promo_codes SET is_active = ?2 WHERE code = ?1")
            .bind(&code)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PromoCode", code));
        }

        Ok(())
    }

    /// Lists all codes, active first.
    pub async fn list(&self) -> DbResult<Vec<PromoCode>> {
        let codes = sqlx::query_as::<_, PromoCode>(
            "SELECT * FROM promo_codes ORDER BY is_active DESC, code",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_create_normalizes_code() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promo_codes();

        let promo = repo.create("  summer10 ", 10).await.unwrap();
        assert_eq!(promo.code, "SUMMER10");

        let found = repo.find_active("Summer10").await.unwrap().unwrap();
        assert_eq!(found.discount_percent, 10);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promo_codes();

        repo.create("SUMMER10", 10).await.unwrap();
        let err = repo.create("summer10", 20).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_inactive_code_hidden_from_find_active() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promo_codes();

        repo.create("SUMMER10", 10).await.unwrap();
        repo.set_active("SUMMER10", false).await.unwrap();

        assert!(repo.find_active("SUMMER10").await.unwrap().is_none());
        // still visible to the admin surface
        let promo = repo.get("SUMMER10").await.unwrap().unwrap();
        assert!(!promo.is_active);
    }

    #[tokio::test]
    async fn test_set_active_unknown_code() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.promo_codes().set_active("NOPE", true).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_orders_active_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promo_codes();

        repo.create("AAA", 5).await.unwrap();
        repo.create("BBB", 10).await.unwrap();
        repo.set_active("AAA", false).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].code, "BBB");
        assert!(!all[1].is_active);
    }
}
