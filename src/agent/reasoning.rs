use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::agent::error::AgentError;
use crate::config::ReasoningConfig;

/// Black-box text completion used by the insight engine.
///
/// `preamble` is identical across calls so providers that support prompt
/// caching can reuse it; `body` carries the per-request summary slice.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    async fn complete(
        &self,
        preamble: &str,
        body: &str,
        max_output_tokens: u32,
    ) -> Result<String, AgentError>;
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: Vec<SystemBlock<'a>>,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct SystemBlock<'a> {
    #[serde(rename = "type")]
    block_type: &'static str,
    text: &'a str,
    cache_control: CacheControl,
}

#[derive(Debug, Serialize)]
struct CacheControl {
    #[serde(rename = "type")]
    control_type: &'static str,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

/// Anthropic Messages API backend. The preamble is sent as a system block
/// marked for ephemeral caching. No retries: a failed call fails the run.
pub struct AnthropicBackend {
    client: Client,
    api_base: String,
    api_version: String,
    model: String,
    api_key: String,
}

impl AnthropicBackend {
    pub fn new(config: &ReasoningConfig) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::reasoning(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ReasoningBackend for AnthropicBackend {
    async fn complete(
        &self,
        preamble: &str,
        body: &str,
        max_output_tokens: u32,
    ) -> Result<String, AgentError> {
        if self.api_key.is_empty() {
            return Err(AgentError::reasoning(
                "Anthropic API key is not configured. Set ANTHROPIC_API_KEY.",
            ));
        }

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: max_output_tokens,
            system: vec![SystemBlock {
                block_type: "text",
                text: preamble,
                cache_control: CacheControl {
                    control_type: "ephemeral",
                },
            }],
            messages: vec![RequestMessage {
                role: "user",
                content: body,
            }],
        };

        let response = self
            .client
            .post(format!("{}/messages", self.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::reasoning(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AgentError::reasoning(format!("API error ({}): {}", status, detail)));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AgentError::reasoning(format!("unreadable API response: {}", e)))?;

        let text = parsed
            .content
            .into_iter()
            .filter(|block| block.content_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(text)
    }
}
