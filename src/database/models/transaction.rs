use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Money movement direction as recorded by the upstream ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outflow,
    Inflow,
    /// Transfers, adjustments and anything else that is neither spending nor income
    Other,
}

impl Direction {
    /// Map the upstream `transactionType` column
    pub fn from_transaction_type(kind: &str) -> Self {
        match kind {
            "Withdrawal" => Direction::Outflow,
            "Deposit" => Direction::Inflow,
            _ => Direction::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: DateTime<Utc>,
    pub amount: Decimal,
    pub direction: Direction,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub merchant: Option<String>,
    /// Precomputed by the upstream store; never derived here
    #[serde(default)]
    pub anomalous: bool,
}

impl Transaction {
    pub fn outflow(date: DateTime<Utc>, amount: Decimal, category: &str, merchant: &str) -> Self {
        Self {
            date,
            amount,
            direction: Direction::Outflow,
            category: Some(category.to_string()),
            merchant: Some(merchant.to_string()),
            anomalous: false,
        }
    }

    pub fn inflow(date: DateTime<Utc>, amount: Decimal, merchant: &str) -> Self {
        Self {
            date,
            amount,
            direction: Direction::Inflow,
            category: None,
            merchant: Some(merchant.to_string()),
            anomalous: false,
        }
    }

    pub fn flagged(mut self) -> Self {
        self.anomalous = true;
        self
    }

    /// Category usable for aggregation (present and non-blank)
    pub fn spending_category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Row shape of the `Transaction` table (columns aliased in the query)
#[derive(Debug, Clone, FromRow)]
pub struct TransactionRow {
    pub transaction_date: NaiveDateTime,
    pub transaction_type: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub merchant: Option<String>,
    pub anomaly: Option<i32>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Self {
            date: row.transaction_date.and_utc(),
            amount: row.amount.unwrap_or_default(),
            direction: row
                .transaction_type
                .as_deref()
                .map(Direction::from_transaction_type)
                .unwrap_or(Direction::Other),
            category: row.category,
            merchant: row.merchant,
            anomalous: row.anomaly == Some(1),
        }
    }
}
