use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::agent::clock::Clock;
use crate::agent::error::AgentError;
use crate::agent::prompts::{dynamic_body, INSTRUCTION_PREAMBLE};
use crate::agent::reasoning::ReasoningBackend;
use crate::agent::summary::FinancialSummary;
use crate::types::Variant;

pub const MAX_INSIGHTS: usize = 3;
pub const MAX_ALERTS: usize = 2;
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Validated structured output of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightResult {
    pub insights: Vec<String>,
    pub alerts: Vec<String>,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl InsightResult {
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self {
            insights: Vec::new(),
            alerts: Vec::new(),
            recommendations: Vec::new(),
            generated_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.insights.is_empty() && self.alerts.is_empty() && self.recommendations.is_empty()
    }
}

/// Wire shape expected from the reasoning backend. All three fields are required.
#[derive(Debug, Deserialize)]
struct RawInsights {
    insights: Vec<String>,
    alerts: Vec<String>,
    recommendations: Vec<String>,
}

/// Turns a summary into an `InsightResult` through the reasoning backend.
/// Has no side effects beyond the outbound call.
pub struct InsightEngine {
    backend: Arc<dyn ReasoningBackend>,
    clock: Arc<dyn Clock>,
}

impl InsightEngine {
    pub fn new(backend: Arc<dyn ReasoningBackend>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    pub async fn analyze(
        &self,
        summary: &FinancialSummary,
        variant: Variant,
    ) -> Result<InsightResult, AgentError> {
        let Some(body) = dynamic_body(summary, variant)? else {
            tracing::debug!("No data for {} analysis, returning empty result", variant);
            return Ok(InsightResult::empty(self.clock.now()));
        };

        let raw = self
            .backend
            .complete(INSTRUCTION_PREAMBLE, &body, variant.max_output_tokens())
            .await?;

        parse_insights(&raw, self.clock.now())
    }
}

/// Strip a surrounding markdown code fence (with or without a language tag)
pub fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };

    let inner = trimmed[open + 3..].trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let inner = match inner.rfind("```") {
        Some(close) => &inner[..close],
        None => inner,
    };
    inner.trim()
}

/// Parse and validate backend output. Items are trimmed, blanks dropped and
/// each list capped; a missing field or non-JSON text is a hard failure.
///
/// Bare JSON is tried first, so backticks inside string values never trigger
/// fence stripping.
pub fn parse_insights(raw: &str, generated_at: DateTime<Utc>) -> Result<InsightResult, AgentError> {
    let trimmed = raw.trim();
    let parsed: RawInsights = match serde_json::from_str(trimmed) {
        Ok(parsed) => parsed,
        Err(_) => {
            let cleaned = strip_fences(trimmed);
            serde_json::from_str(cleaned).map_err(|e| {
                let preview: String = cleaned.chars().take(200).collect();
                AgentError::malformed(format!("{} (response preview: {})", e, preview))
            })?
        }
    };

    Ok(InsightResult {
        insights: clean_items(parsed.insights, MAX_INSIGHTS),
        alerts: clean_items(parsed.alerts, MAX_ALERTS),
        recommendations: clean_items(parsed.recommendations, MAX_RECOMMENDATIONS),
        generated_at,
    })
}

fn clean_items(items: Vec<String>, cap: usize) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .take(cap)
        .collect()
}
