use serde::Serialize;
use std::collections::BTreeMap;

use crate::agent::summary::{Anomaly, CategorySpend, CreditSummary, FinancialSummary, Period};
use crate::types::Variant;

/// Instruction preamble shared verbatim by every request. Keep it byte-stable;
/// provider-side prompt caching keys on it.
pub const INSTRUCTION_PREAMBLE: &str = "You are a financial advisor agent. Analyze the customer's \
financial summary and produce short, actionable guidance.

Rules:
1. Treat any transaction listed under anomalies, or any spend above twice its category average, as unusual.
2. Credit utilization above 30% is a warning; above 70% is critical.
3. Suggest budget adjustments grounded in the observed spending patterns.
4. At most 3 insights, 2 alerts and 3 recommendations. Each item is one sentence.
5. Reply with JSON only, exactly in this shape:
{\"insights\": [\"...\"], \"alerts\": [\"...\"], \"recommendations\": [\"...\"]}";

/// Slice consumed by the transaction monitor: categories and anomalies only
#[derive(Debug, Serialize)]
struct TransactionSlice<'a> {
    period: &'a Period,
    spending_by_category: &'a BTreeMap<String, CategorySpend>,
    anomalies: &'a [Anomaly],
}

/// Dynamic request body for a variant, or `None` when the variant has no
/// data to look at (credit manager without a credit card).
pub fn dynamic_body(summary: &FinancialSummary, variant: Variant) -> Result<Option<String>, serde_json::Error> {
    let body = match variant {
        Variant::FinancialHealth => format!(
            "Analyze this financial summary:\n\n{}\n\nProvide insights, alerts, and recommendations based on the data.",
            serde_json::to_string_pretty(summary)?
        ),
        Variant::TransactionMonitor => {
            let slice = TransactionSlice {
                period: &summary.period,
                spending_by_category: &summary.spending_by_category,
                anomalies: &summary.anomalies,
            };
            format!(
                "Analyze these transactions for anomalies:\n\n{}\n\nIdentify unusual spending patterns, category changes and any fraud risk.",
                serde_json::to_string_pretty(&slice)?
            )
        }
        Variant::CreditManager => match &summary.credit_card {
            Some(credit) => credit_body(credit)?,
            None => return Ok(None),
        },
    };
    Ok(Some(body))
}

fn credit_body(credit: &CreditSummary) -> Result<String, serde_json::Error> {
    Ok(format!(
        "Analyze credit card health:\n\n{}\n\nFocus on credit utilization, payment due dates and balance trends.",
        serde_json::to_string_pretty(credit)?
    ))
}
