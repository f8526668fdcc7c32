//! # Expense Repository
//!
//! Manual cost ledger for the monthly profitability report.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use lavka_core::Expense;

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Records an expense.
    pub async fn insert(&self, amount_minor: i64, comment: Option<&str>) -> DbResult<Expense> {
        debug!(amount_minor, "Recording expense");

        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO expenses (amount_minor, comment, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(amount_minor)
        .bind(comment)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Expense {
            id: result.last_insert_rowid(),
            amount_minor,
            comment: comment.map(str::to_string),
            created_at: now,
        })
    }

    /// Lists expenses recorded in `[from, to)`, oldest first.
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT * FROM expenses
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;

    #[tokio::test]
    async fn test_insert_and_list_between() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.expenses();

        let expense = repo.insert(5000, Some("packaging")).await.unwrap();
        assert!(expense.id > 0);
        repo.insert(2500, None).await.unwrap();

        let now = Utc::now();
        let listed = repo
            .list_between(now - Duration::hours(1), now + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].comment.as_deref(), Some("packaging"));

        // window that excludes both rows
        let empty = repo
            .list_between(now + Duration::hours(1), now + Duration::hours(2))
            .await
            .unwrap();
        assert!(empty.is_empty());
    }
}
