use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::database::models::{CreditCardSnapshot, LoanSnapshot, Transaction};
use crate::types::CustomerId;

/// Errors surfaced by a record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Read-only, customer-keyed view over the upstream financial records.
///
/// The pipeline never writes through this trait; persistence belongs to the
/// CRUD service that owns the tables.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store name for logging and health output
    fn name(&self) -> &'static str;

    /// Transactions dated in the half-open range `[from, to)`, newest first
    async fn list_transactions(
        &self,
        customer: &CustomerId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, StoreError>;

    async fn latest_credit_snapshot(
        &self,
        customer: &CustomerId,
    ) -> Result<Option<CreditCardSnapshot>, StoreError>;

    async fn latest_loan_snapshot(
        &self,
        customer: &CustomerId,
    ) -> Result<Option<LoanSnapshot>, StoreError>;

    /// Cheap connectivity probe
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
