use std::sync::Arc;

use crate::agent::{SummaryReducer, SystemClock};
use crate::config;
use crate::database::open_record_store;
use crate::types::CustomerId;

/// Print the reduced summary exactly as the reasoning backend would see it
pub async fn handle(customer: String, days: Option<u32>) -> anyhow::Result<()> {
    let config = config::config();
    let customer = CustomerId::new(customer);
    let days = days.unwrap_or(config.agent.window_days);

    let (store, database) = open_record_store(config).await?;
    let reducer = SummaryReducer::new(store, Arc::new(SystemClock), config.agent.reference_offset());

    let outcome = reducer.reduce(&customer, days).await;
    if let Some(database) = database {
        database.close().await;
    }

    println!("{}", serde_json::to_string_pretty(&outcome?)?);
    Ok(())
}
