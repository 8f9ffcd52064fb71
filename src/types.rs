// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable customer identity; the join key across the record store,
/// the dedup ledger and the connection registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CustomerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Analysis profile. Each variant consumes a different slice of the summary
/// and is pushed to the client under its own frame type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    FinancialHealth,
    TransactionMonitor,
    CreditManager,
}

impl Variant {
    pub const ALL: [Variant; 3] = [
        Variant::FinancialHealth,
        Variant::TransactionMonitor,
        Variant::CreditManager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::FinancialHealth => "financial-health",
            Variant::TransactionMonitor => "transaction-monitor",
            Variant::CreditManager => "credit-manager",
        }
    }

    /// Output token budget handed to the reasoning backend
    pub fn max_output_tokens(&self) -> u32 {
        match self {
            Variant::FinancialHealth => 1000,
            Variant::TransactionMonitor => 800,
            Variant::CreditManager => 600,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown analysis variant '{0}'")]
pub struct UnknownVariant(pub String);

impl FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "financial-health" | "financial_health" => Ok(Variant::FinancialHealth),
            "transaction-monitor" | "transaction_monitor" => Ok(Variant::TransactionMonitor),
            "credit-manager" | "credit_manager" => Ok(Variant::CreditManager),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_parses_both_spellings() {
        assert_eq!("credit-manager".parse::<Variant>(), Ok(Variant::CreditManager));
        assert_eq!("transaction_monitor".parse::<Variant>(), Ok(Variant::TransactionMonitor));
        assert!("weekly-digest".parse::<Variant>().is_err());
    }

    #[test]
    fn variant_round_trips_through_display() {
        for variant in Variant::ALL {
            assert_eq!(variant.to_string().parse::<Variant>(), Ok(variant));
        }
    }

    #[test]
    fn customer_id_serializes_as_plain_string() {
        let id = CustomerId::new("cust-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"cust-42\"");
    }
}
