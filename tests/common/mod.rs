#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use finsight_api::agent::{AgentError, ReasoningBackend, SystemClock};
use finsight_api::auth::{generate_jwt, Claims};
use finsight_api::config;
use finsight_api::database::{MemoryRecordStore, Transaction};
use finsight_api::routes::{app, AppState};
use finsight_api::types::CustomerId;

pub const REPLY: &str = r#"```json
{
  "insights": ["Spending is 40% of income", "Electronics was your largest purchase"],
  "alerts": ["A $450 purchase was flagged as unusual"],
  "recommendations": ["Review the flagged purchase", "Keep dining under $200"]
}
```"#;

/// Reasoning backend with a fixed reply, an optional delay and a call counter
pub struct StubBackend {
    reply: std::result::Result<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    bodies: Mutex<Vec<String>>,
}

impl StubBackend {
    pub fn replying(text: &str) -> Self {
        Self::new(Ok(text.to_string()), None)
    }

    pub fn failing(message: &str) -> Self {
        Self::new(Err(message.to_string()), None)
    }

    pub fn slow(text: &str, delay: Duration) -> Self {
        Self::new(Ok(text.to_string()), Some(delay))
    }

    fn new(reply: std::result::Result<String, String>, delay: Option<Duration>) -> Self {
        Self {
            reply,
            delay,
            calls: AtomicUsize::new(0),
            bodies: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }

    /// Poll until `expected` calls have been made or the timeout passes
    pub async fn wait_for_calls(&self, expected: usize, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while self.calls() < expected {
            if Instant::now() > deadline {
                anyhow::bail!("expected {} backend calls, saw {}", expected, self.calls());
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        Ok(())
    }
}

#[async_trait]
impl ReasoningBackend for StubBackend {
    async fn complete(
        &self,
        _preamble: &str,
        body: &str,
        _max_output_tokens: u32,
    ) -> std::result::Result<String, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies.lock().unwrap().push(body.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.reply.clone().map_err(AgentError::reasoning)
    }
}

pub struct TestServer {
    pub base_url: String,
    pub ws_url: String,
    pub state: AppState,
    pub backend: Arc<StubBackend>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn post_authed(&self, path: &str, customer: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token_for(customer)?)
            .send()
            .await?)
    }

    pub async fn get_authed(&self, path: &str, customer: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(token_for(customer)?)
            .send()
            .await?)
    }
}

/// Serve the real router on a free port with the given store and backend
pub async fn spawn_app(store: MemoryRecordStore, backend: StubBackend) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;

    let backend = Arc::new(backend);
    let state = AppState::assemble(
        Arc::new(store),
        backend.clone(),
        Arc::new(SystemClock),
        &config::config().agent,
    );

    let router = app(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        ws_url: format!("ws://127.0.0.1:{}/ws", port),
        state,
        backend,
        client: reqwest::Client::new(),
    })
}

pub fn token_for(customer: &str) -> Result<String> {
    Ok(generate_jwt(&Claims::new(CustomerId::from(customer)))?)
}

fn days_ago(days: i64) -> chrono::DateTime<Utc> {
    Utc::now() - chrono::Duration::days(days)
}

/// 30 days of activity: $1,200 out (including one flagged $450 purchase)
/// and $2,000 in
pub fn month_of_activity(customer: &str) -> MemoryRecordStore {
    let transactions = vec![
        Transaction::outflow(days_ago(2), Decimal::new(100, 0), "Groceries", "FreshMart"),
        Transaction::outflow(days_ago(9), Decimal::new(100, 0), "Groceries", "FreshMart"),
        Transaction::outflow(days_ago(16), Decimal::new(100, 0), "Groceries", "FreshMart"),
        Transaction::outflow(days_ago(4), Decimal::new(75, 0), "Dining", "Bistro 21"),
        Transaction::outflow(days_ago(11), Decimal::new(75, 0), "Dining", "Bistro 21"),
        Transaction::outflow(days_ago(6), Decimal::new(300, 0), "Utilities", "City Power"),
        Transaction::outflow(days_ago(3), Decimal::new(450, 0), "Electronics", "GadgetHub").flagged(),
        Transaction::inflow(days_ago(14), Decimal::new(2000, 0), "Payroll"),
    ];
    MemoryRecordStore::new().with_transactions(&CustomerId::from(customer), transactions)
}
