pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

use std::sync::Arc;

use crate::config::AppConfig;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryRecordStore;
pub use models::{CreditCardSnapshot, Direction, LoanSnapshot, Transaction};
pub use postgres::PgRecordStore;
pub use store::{RecordStore, StoreError};

/// Record store chosen from configuration.
///
/// Postgres when `DATABASE_URL` is set (the manager is returned so the caller
/// can close the pool), otherwise the in-memory store, seeded from
/// `AGENT_FIXTURES` when that is set.
pub async fn open_record_store(
    config: &AppConfig,
) -> Result<(Arc<dyn RecordStore>, Option<DatabaseManager>), DatabaseError> {
    if config.database.url.is_some() {
        let manager = DatabaseManager::connect(&config.database).await?;
        let store: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(manager.pool()));
        return Ok((store, Some(manager)));
    }

    let store = match &config.agent.fixtures_path {
        Some(path) => {
            let store = MemoryRecordStore::from_yaml_file(path)?;
            tracing::info!("Loaded {} fixture customers from {}", store.customer_count().await, path);
            store
        }
        None => MemoryRecordStore::new(),
    };
    tracing::warn!("DATABASE_URL not set, using in-memory record store");

    let store: Arc<dyn RecordStore> = Arc::new(store);
    Ok((store, None))
}
