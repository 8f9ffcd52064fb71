use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Point-in-time loan record; `balance` is the outstanding amount at `record_date`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSnapshot {
    pub record_date: DateTime<Utc>,
    pub balance: Decimal,
    /// Annual rate in percent (6.0 = 6%)
    pub interest_rate: Decimal,
    pub term_months: i32,
    #[serde(default)]
    pub loan_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LoanRow {
    pub record_date: NaiveDateTime,
    pub balance: Option<Decimal>,
    pub interest_rate: Option<Decimal>,
    pub term_months: Option<i32>,
    pub loan_type: Option<String>,
    pub status: Option<String>,
}

impl From<LoanRow> for LoanSnapshot {
    fn from(row: LoanRow) -> Self {
        Self {
            record_date: row.record_date.and_utc(),
            balance: row.balance.unwrap_or_default(),
            interest_rate: row.interest_rate.unwrap_or_default(),
            term_months: row.term_months.unwrap_or(0),
            loan_type: row.loan_type,
            status: row.status,
        }
    }
}
