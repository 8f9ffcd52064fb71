use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::models::credit_card::CreditCardRow;
use crate::database::models::loan::LoanRow;
use crate::database::models::transaction::TransactionRow;
use crate::database::models::{CreditCardSnapshot, LoanSnapshot, Transaction};
use crate::database::store::{RecordStore, StoreError};
use crate::types::CustomerId;

// Tables are owned by the upstream CRUD service; column names follow its
// camelCase schema and timestamps are stored as UTC.
const TRANSACTIONS_SQL: &str = r#"
    SELECT "transactionDate"::timestamp AS transaction_date,
           "transactionType" AS transaction_type,
           "transactionAmount"::numeric AS amount,
           "category" AS category,
           "merchant" AS merchant,
           "anomaly"::int4 AS anomaly
      FROM "Transaction"
     WHERE "customerId"::text = $1
       AND "transactionDate" >= $2
       AND "transactionDate" < $3
     ORDER BY "transactionDate" DESC
"#;

const LATEST_CREDIT_CARD_SQL: &str = r#"
    SELECT "recordDate"::timestamp AS record_date,
           "creditCardBalance"::numeric AS balance,
           "creditLimit"::numeric AS credit_limit,
           "minimumPaymentDue"::numeric AS minimum_payment_due,
           "paymentDueDate"::timestamp AS payment_due_date,
           "rewardsPoints"::int8 AS rewards_points,
           "cardType" AS card_type
      FROM "CreditCard"
     WHERE "customerId"::text = $1
     ORDER BY "recordDate" DESC
     LIMIT 1
"#;

const LATEST_LOAN_SQL: &str = r#"
    SELECT "recordDate"::timestamp AS record_date,
           "loanAmount"::numeric AS balance,
           "interestRate"::numeric AS interest_rate,
           "loanTerm"::int4 AS term_months,
           "loanType" AS loan_type,
           "loanStatus" AS status
      FROM "Loan"
     WHERE "customerId"::text = $1
     ORDER BY "recordDate" DESC
     LIMIT 1
"#;

/// Postgres-backed record store reading the upstream service's tables
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sqlx(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::Sqlx(other),
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn list_transactions(
        &self,
        customer: &CustomerId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, StoreError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(TRANSACTIONS_SQL)
            .bind(customer.as_str())
            .bind(from.naive_utc())
            .bind(to.naive_utc())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    async fn latest_credit_snapshot(
        &self,
        customer: &CustomerId,
    ) -> Result<Option<CreditCardSnapshot>, StoreError> {
        let row: Option<CreditCardRow> = sqlx::query_as(LATEST_CREDIT_CARD_SQL)
            .bind(customer.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(row.map(CreditCardSnapshot::from))
    }

    async fn latest_loan_snapshot(
        &self,
        customer: &CustomerId,
    ) -> Result<Option<LoanSnapshot>, StoreError> {
        let row: Option<LoanRow> = sqlx::query_as(LATEST_LOAN_SQL)
            .bind(customer.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(row.map(LoanSnapshot::from))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }
}
