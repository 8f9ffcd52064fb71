use chrono::{FixedOffset, NaiveDate};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::agent::clock::Clock;
use crate::agent::engine::{InsightEngine, InsightResult};
use crate::agent::error::AgentError;
use crate::agent::ledger::RunLedger;
use crate::agent::reducer::SummaryReducer;
use crate::realtime::{ConnectionRegistry, ServerFrame};
use crate::types::{CustomerId, Variant};

/// Outcome of a login trigger. Never carries the analysis result.
#[derive(Debug)]
pub enum LoginTrigger {
    /// Background run started; the handle resolves once it has finished or failed
    Dispatched(JoinHandle<()>),
    AlreadyRanToday,
}

impl LoginTrigger {
    pub fn dispatched(&self) -> bool {
        matches!(self, LoginTrigger::Dispatched(_))
    }
}

/// Owns the per-customer run ledger and chains reduce, analyze and deliver.
pub struct RunCoordinator {
    reducer: SummaryReducer,
    engine: InsightEngine,
    registry: Arc<ConnectionRegistry>,
    ledger: RunLedger,
    clock: Arc<dyn Clock>,
    window_days: u32,
    reference_offset: FixedOffset,
}

impl RunCoordinator {
    pub fn new(
        reducer: SummaryReducer,
        engine: InsightEngine,
        registry: Arc<ConnectionRegistry>,
        clock: Arc<dyn Clock>,
        window_days: u32,
        reference_offset: FixedOffset,
    ) -> Self {
        Self {
            reducer,
            engine,
            registry,
            ledger: RunLedger::new(),
            clock,
            window_days: window_days.max(1),
            reference_offset,
        }
    }

    /// Calendar date of "now" in the reference timezone
    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.reference_offset).date_naive()
    }

    pub fn last_run(&self, customer: &CustomerId) -> Option<NaiveDate> {
        self.ledger.last_run(customer)
    }

    /// Fire-and-forget financial-health run, at most once per customer per
    /// calendar day. The day is claimed before the task is spawned. Failures
    /// reach `on_error` and nothing else.
    pub fn trigger_on_login<F>(self: &Arc<Self>, customer: CustomerId, on_error: F) -> LoginTrigger
    where
        F: FnOnce(&CustomerId, AgentError) + Send + 'static,
    {
        let today = self.today();
        if !self.ledger.try_mark(&customer, today) {
            tracing::info!("Agent already ran today for customer {}", customer);
            return LoginTrigger::AlreadyRanToday;
        }

        let coordinator = Arc::clone(self);
        let handle = tokio::spawn(async move {
            if let Err(err) = coordinator.execute(&customer, Variant::FinancialHealth).await {
                on_error(&customer, err);
            }
        });

        LoginTrigger::Dispatched(handle)
    }

    /// Explicit financial-health run. Ignores the ledger but still records
    /// today, so a later login the same day does not repeat the analysis.
    pub async fn run_now(&self, customer: &CustomerId) -> Result<InsightResult, AgentError> {
        self.ledger.record(customer, self.today());
        self.execute(customer, Variant::FinancialHealth).await
    }

    /// Explicit run of any variant. Only financial-health runs touch the ledger.
    pub async fn run_variant(
        &self,
        customer: &CustomerId,
        variant: Variant,
    ) -> Result<InsightResult, AgentError> {
        match variant {
            Variant::FinancialHealth => self.run_now(customer).await,
            other => self.execute(customer, other).await,
        }
    }

    async fn execute(&self, customer: &CustomerId, variant: Variant) -> Result<InsightResult, AgentError> {
        tracing::info!("Running {} analysis for customer {}", variant, customer);

        let summary = self.reducer.reduce(customer, self.window_days).await?;
        let result = self.engine.analyze(&summary, variant).await?;

        let frame = ServerFrame::insights(variant, result.clone(), self.clock.now());
        if !self.registry.deliver(customer, &frame) {
            tracing::info!("Customer {} not connected, {} not pushed", customer, frame.frame_type());
        }

        tracing::info!(
            "Completed {} analysis for customer {}: {} insights, {} alerts, {} recommendations",
            variant,
            customer,
            result.insights.len(),
            result.alerts.len(),
            result.recommendations.len()
        );
        Ok(result)
    }
}

/// Standard error sink for login-triggered runs
pub fn log_background_failure(customer: &CustomerId, error: AgentError) {
    tracing::error!("Background analysis failed for customer {}: {}", customer, error);
}
