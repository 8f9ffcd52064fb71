//! Fakes shared by unit tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::agent::error::AgentError;
use crate::agent::reasoning::ReasoningBackend;
use crate::database::{CreditCardSnapshot, LoanSnapshot, RecordStore, StoreError, Transaction};
use crate::types::CustomerId;

/// One request as seen by the scripted backend
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub preamble: String,
    pub body: String,
    pub max_output_tokens: u32,
}

enum Script {
    Reply(String),
    Fail(String),
}

/// Reasoning backend that answers every call with the same scripted outcome
/// and records what it was asked.
pub struct ScriptedBackend {
    script: Script,
    calls: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedBackend {
    pub fn replying(text: &str) -> Self {
        Self::with_script(Script::Reply(text.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_script(Script::Fail(message.to_string()))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningBackend for ScriptedBackend {
    async fn complete(
        &self,
        preamble: &str,
        body: &str,
        max_output_tokens: u32,
    ) -> Result<String, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(RecordedRequest {
            preamble: preamble.to_string(),
            body: body.to_string(),
            max_output_tokens,
        });

        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail(message) => Err(AgentError::reasoning(message.clone())),
        }
    }
}

/// Record store whose every read fails as unreachable
pub struct UnavailableStore;

#[async_trait]
impl RecordStore for UnavailableStore {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn list_transactions(
        &self,
        _customer: &CustomerId,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn latest_credit_snapshot(
        &self,
        _customer: &CustomerId,
    ) -> Result<Option<CreditCardSnapshot>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn latest_loan_snapshot(
        &self,
        _customer: &CustomerId,
    ) -> Result<Option<LoanSnapshot>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}
