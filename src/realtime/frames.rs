use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::InsightResult;
use crate::types::{CustomerId, Variant};

/// Frames pushed from the server to a connected client. Serialized as JSON
/// text with the variant name in the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Connected {
        message: String,
        #[serde(rename = "customerId")]
        customer_id: CustomerId,
    },
    AgentInsights {
        data: InsightResult,
        timestamp: DateTime<Utc>,
    },
    TransactionInsights {
        data: InsightResult,
        timestamp: DateTime<Utc>,
    },
    CreditInsights {
        data: InsightResult,
        timestamp: DateTime<Utc>,
    },
    Echo {
        data: serde_json::Value,
    },
}

impl ServerFrame {
    pub fn connected(customer: &CustomerId) -> Self {
        ServerFrame::Connected {
            message: "WebSocket connected".to_string(),
            customer_id: customer.clone(),
        }
    }

    /// Insight frame for the variant that produced `data`
    pub fn insights(variant: Variant, data: InsightResult, timestamp: DateTime<Utc>) -> Self {
        match variant {
            Variant::FinancialHealth => ServerFrame::AgentInsights { data, timestamp },
            Variant::TransactionMonitor => ServerFrame::TransactionInsights { data, timestamp },
            Variant::CreditManager => ServerFrame::CreditInsights { data, timestamp },
        }
    }

    pub fn frame_type(&self) -> &'static str {
        match self {
            ServerFrame::Connected { .. } => "connected",
            ServerFrame::AgentInsights { .. } => "agent_insights",
            ServerFrame::TransactionInsights { .. } => "transaction_insights",
            ServerFrame::CreditInsights { .. } => "credit_insights",
            ServerFrame::Echo { .. } => "echo",
        }
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
