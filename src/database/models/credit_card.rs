use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Point-in-time credit card statement as recorded upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCardSnapshot {
    pub record_date: DateTime<Utc>,
    pub balance: Decimal,
    pub credit_limit: Decimal,
    #[serde(default)]
    pub minimum_payment_due: Decimal,
    #[serde(default)]
    pub payment_due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rewards_points: Option<i64>,
    #[serde(default)]
    pub card_type: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CreditCardRow {
    pub record_date: NaiveDateTime,
    pub balance: Option<Decimal>,
    pub credit_limit: Option<Decimal>,
    pub minimum_payment_due: Option<Decimal>,
    pub payment_due_date: Option<NaiveDateTime>,
    pub rewards_points: Option<i64>,
    pub card_type: Option<String>,
}

impl From<CreditCardRow> for CreditCardSnapshot {
    fn from(row: CreditCardRow) -> Self {
        Self {
            record_date: row.record_date.and_utc(),
            balance: row.balance.unwrap_or_default(),
            credit_limit: row.credit_limit.unwrap_or_default(),
            minimum_payment_due: row.minimum_payment_due.unwrap_or_default(),
            payment_due_date: row.payment_due_date.map(|d| d.and_utc()),
            rewards_points: row.rewards_points,
            card_type: row.card_type,
        }
    }
}
