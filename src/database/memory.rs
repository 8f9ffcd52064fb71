use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;

use crate::database::models::{CreditCardSnapshot, LoanSnapshot, Transaction};
use crate::database::store::{RecordStore, StoreError};
use crate::types::CustomerId;

#[derive(Debug, Clone, Default, Deserialize)]
struct CustomerRecords {
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    credit_cards: Vec<CreditCardSnapshot>,
    #[serde(default)]
    loans: Vec<LoanSnapshot>,
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    customers: HashMap<String, CustomerRecords>,
}

/// In-process record store for development and tests.
///
/// Seed it with the builder methods before sharing, or from a YAML fixture:
///
/// ```yaml
/// customers:
///   "1001":
///     transactions:
///       - { date: "2025-01-03T10:00:00Z", amount: "42.10", direction: outflow, category: Groceries, merchant: FreshMart }
///     credit_cards:
///       - { record_date: "2025-01-01T00:00:00Z", balance: "900", credit_limit: "3000" }
/// ```
#[derive(Default)]
pub struct MemoryRecordStore {
    customers: RwLock<HashMap<CustomerId, CustomerRecords>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, StoreError> {
        let fixture: FixtureFile =
            serde_yaml::from_str(source).map_err(|e| StoreError::Fixture(e.to_string()))?;

        let customers = fixture
            .customers
            .into_iter()
            .map(|(id, records)| (CustomerId::new(id), records))
            .collect();

        Ok(Self {
            customers: RwLock::new(customers),
        })
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Fixture(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&source)
    }

    pub fn with_transactions(mut self, customer: &CustomerId, transactions: Vec<Transaction>) -> Self {
        self.customers
            .get_mut()
            .entry(customer.clone())
            .or_default()
            .transactions
            .extend(transactions);
        self
    }

    pub fn with_credit_snapshot(mut self, customer: &CustomerId, snapshot: CreditCardSnapshot) -> Self {
        self.customers
            .get_mut()
            .entry(customer.clone())
            .or_default()
            .credit_cards
            .push(snapshot);
        self
    }

    pub fn with_loan_snapshot(mut self, customer: &CustomerId, snapshot: LoanSnapshot) -> Self {
        self.customers
            .get_mut()
            .entry(customer.clone())
            .or_default()
            .loans
            .push(snapshot);
        self
    }

    /// Append a transaction to a shared store
    pub async fn push_transaction(&self, customer: &CustomerId, transaction: Transaction) {
        self.customers
            .write()
            .await
            .entry(customer.clone())
            .or_default()
            .transactions
            .push(transaction);
    }

    pub async fn customer_count(&self) -> usize {
        self.customers.read().await.len()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_transactions(
        &self,
        customer: &CustomerId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, StoreError> {
        let customers = self.customers.read().await;
        let mut found: Vec<Transaction> = customers
            .get(customer)
            .map(|records| {
                records
                    .transactions
                    .iter()
                    .filter(|t| t.date >= from && t.date < to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        found.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(found)
    }

    async fn latest_credit_snapshot(
        &self,
        customer: &CustomerId,
    ) -> Result<Option<CreditCardSnapshot>, StoreError> {
        let customers = self.customers.read().await;
        Ok(customers
            .get(customer)
            .and_then(|records| records.credit_cards.iter().max_by_key(|c| c.record_date))
            .cloned())
    }

    async fn latest_loan_snapshot(
        &self,
        customer: &CustomerId,
    ) -> Result<Option<LoanSnapshot>, StoreError> {
        let customers = self.customers.read().await;
        Ok(customers
            .get(customer)
            .and_then(|records| records.loans.iter().max_by_key(|l| l.record_date))
            .cloned())
    }
}
