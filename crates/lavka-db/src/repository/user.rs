//! # User Repository
//!
//! Registration and loyalty balance reads. The point *mutations* that
//! belong to settlement (checkout debit, cashback credit) live inside the
//! order transactions in [`crate::repository::order`], never here.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use lavka_core::User;

/// Input for registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub telegram_id: i64,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub username: Option<String>,
    /// Unique referral code generated by the caller.
    pub referral_code: String,
    /// Signup bonus credited immediately (0 to disable).
    pub signup_bonus_points: i64,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Registers a user.
    ///
    /// A second registration for the same platform id fails with
    /// [`DbError::UniqueViolation`]; users are never deleted, so there is
    /// no resurrect path to worry about.
    pub async fn insert(&self, new: &NewUser) -> DbResult<User> {
        debug!(telegram_id = new.telegram_id, "Registering user");

        let user = User {
            telegram_id: new.telegram_id,
            name: new.name.clone(),
            phone: new.phone.clone(),
            username: new.username.clone(),
            points: new.signup_bonus_points.max(0),
            referral_code: new.referral_code.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (telegram_id, name, phone, username, points, referral_code, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(user.telegram_id)
        .bind(&user.name)
        .bind(&user.phone)
        .bind(&user.username)
        .bind(user.points)
        .bind(&user.referral_code)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by platform id.
    pub async fn get(&self, telegram_id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE telegram_id = ?1")
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Gets a user, failing with NotFound when absent.
    pub async fn require(&self, telegram_id: i64) -> DbResult<User> {
        self.get(telegram_id)
            .await?
            .ok_or_else(|| DbError::not_found("User", telegram_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn new_user(id: i64) -> NewUser {
        NewUser {
            telegram_id: id,
            name: Some("Alice".to_string()),
            phone: Some("+100200300".to_string()),
            username: Some("alice".to_string()),
            referral_code: format!("REF-{id:06}"),
            signup_bonus_points: 500,
        }
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        let user = repo.insert(&new_user(7)).await.unwrap();
        assert_eq!(user.points, 500);

        let fetched = repo.get(7).await.unwrap().unwrap();
        assert_eq!(fetched.referral_code, "REF-000007");
        assert_eq!(fetched.points, 500);

        assert!(repo.get(8).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        repo.insert(&new_user(7)).await.unwrap();
        let err = repo.insert(&new_user(7)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_require_absent_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.users().require(99).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
