//! # Monthly Profitability Report
//!
//! Admin-only aggregation over completed orders and the expense ledger.
//!
//! ## What Counts
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Monthly Report Inputs                                │
//! │                                                                         │
//! │  revenue   = Σ total of COMPLETED orders created in the month          │
//! │  cogs      = Σ (snapshot quantity × current product cost)              │
//! │              (deleted products contribute 0 cost)                      │
//! │  expenses  = Σ expense ledger rows in the month                        │
//! │                                                                         │
//! │  net profit = revenue − cogs − expenses                                │
//! │                                                                         │
//! │  Active (unfulfilled) orders count for nothing: revenue is             │
//! │  recognized at completion, keyed by the order's creation month.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use lavka_core::{Expense, Money};
use lavka_db::Database;

use crate::error::{EngineError, EngineResult};

/// One month's profitability summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,

    /// Completed orders counted into this report.
    pub orders_completed: usize,

    /// Sum of completed order totals, minor units.
    pub revenue_minor: i64,

    /// Cost of goods sold, from snapshot quantities priced at current
    /// product cost.
    pub cogs_minor: i64,

    /// Sum of the expense ledger for the month.
    pub expenses_minor: i64,

    /// `revenue − cogs − expenses`. May be negative.
    pub net_profit_minor: i64,

    /// The individual expense rows, for the admin breakdown view.
    pub expenses: Vec<Expense>,
}

impl MonthlyReport {
    #[inline]
    pub fn revenue(&self) -> Money {
        Money::from_minor(self.revenue_minor)
    }

    #[inline]
    pub fn net_profit(&self) -> Money {
        Money::from_minor(self.net_profit_minor)
    }
}

/// Returns the UTC window `[start of month, start of next month)`.
pub(crate) fn month_window(year: i32, month: u32) -> EngineResult<(DateTime<Utc>, DateTime<Utc>)> {
    if !(1..=12).contains(&month) {
        return Err(EngineError::InvalidInput(format!("month out of range: {month}")));
    }

    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| EngineError::InvalidInput(format!("invalid month: {year}-{month:02}")))?;

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| EngineError::InvalidInput(format!("invalid month: {year}-{month:02}")))?;

    Ok((start, end))
}

/// Builds the report for one calendar month (UTC).
pub(crate) async fn build_monthly_report(
    db: &Database,
    year: i32,
    month: u32,
) -> EngineResult<MonthlyReport> {
    let (from, to) = month_window(year, month)?;

    let orders = db.orders().list_completed_between(from, to).await?;

    let mut revenue_minor: i64 = 0;
    let mut cogs_minor: i64 = 0;

    for order in &orders {
        revenue_minor += order.total_minor;

        let snapshot = order.snapshot().map_err(EngineError::from)?;
        for line in &snapshot.lines {
            // cost is read from the live catalog; a product deleted since
            // the sale contributes zero cost
            if let Some(product) = db.products().get(line.product_id).await? {
                cogs_minor += product.cost_minor * line.quantity;
            }
        }
    }

    let expenses = db.expenses().list_between(from, to).await?;
    let expenses_minor: i64 = expenses.iter().map(|e| e.amount_minor).sum();

    Ok(MonthlyReport {
        year,
        month,
        orders_completed: orders.len(),
        revenue_minor,
        cogs_minor,
        expenses_minor,
        net_profit_minor: revenue_minor - cogs_minor - expenses_minor,
        expenses,
    })
}

/// Convenience: the window for the month containing `at`.
pub(crate) fn month_of(at: DateTime<Utc>) -> (i32, u32) {
    (at.year(), at.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_window_boundaries() {
        let (from, to) = month_window(2026, 8).unwrap();
        assert_eq!(from.to_rfc3339(), "2026-08-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2026-09-01T00:00:00+00:00");

        // December rolls into the next year
        let (from, to) = month_window(2026, 12).unwrap();
        assert_eq!(from.month(), 12);
        assert_eq!(to.year(), 2027);
        assert_eq!(to.month(), 1);
    }

    #[test]
    fn test_month_window_rejects_garbage() {
        assert!(month_window(2026, 0).is_err());
        assert!(month_window(2026, 13).is_err());
    }

    #[test]
    fn test_month_of() {
        let at = Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap();
        assert_eq!(month_of(at), (2026, 8));
    }
}
