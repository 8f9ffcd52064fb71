use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Compact per-run reduction of a customer's records. Size depends on the
/// number of distinct categories and flagged anomalies, never on raw volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub period: Period,
    pub spending_by_category: BTreeMap<String, CategorySpend>,
    pub anomalies: Vec<Anomaly>,
    pub totals: Totals,
    pub comparison: PeriodComparison,
    pub credit_card: Option<CreditSummary>,
    pub loan: Option<LoanSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start_date: NaiveDate,
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub total: Decimal,
    pub count: u32,
    pub average: Decimal,
    /// Change against the prior window of equal length; 0 when the prior total is 0
    pub change_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub date: DateTime<Utc>,
    pub amount: Decimal,
    pub merchant: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_spent: Decimal,
    pub total_income: Decimal,
    pub net_change: Decimal,
    pub daily_avg: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub previous_spent: Decimal,
    pub change_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditSummary {
    pub balance: Decimal,
    pub credit_limit: Decimal,
    /// Always recomputed from balance and limit
    pub utilization_pct: Decimal,
    pub minimum_payment: Decimal,
    pub days_until_due: Option<i64>,
    pub rewards_points: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub balance: Decimal,
    pub loan_type: Option<String>,
    pub interest_rate: Decimal,
    pub term_months: i32,
    pub monthly_payment: Decimal,
    pub months_remaining: Option<u32>,
    pub total_interest: Option<Decimal>,
    pub status: Option<String>,
}

/// Round to cents and pin the scale so values render as `1200.00`
pub fn money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Percentages carry one decimal place
pub fn percent(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(1);
    rounded
}
