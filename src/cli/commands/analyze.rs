use std::sync::Arc;

use crate::agent::{AnthropicBackend, SystemClock};
use crate::cli::utils::{output_success, print_insights};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::open_record_store;
use crate::routes::AppState;
use crate::types::{CustomerId, Variant};

/// Run the full pipeline once. Nothing is connected to the registry here, so
/// delivery always misses and only the printed result remains.
pub async fn handle(customer: String, variant: Variant, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let customer = CustomerId::new(customer);

    let (store, database) = open_record_store(config).await?;
    let backend = Arc::new(AnthropicBackend::new(&config.reasoning)?);
    let state = AppState::assemble(store, backend, Arc::new(SystemClock), &config.agent);

    let outcome = state.coordinator.run_variant(&customer, variant).await;
    if let Some(database) = database {
        database.close().await;
    }
    let result = outcome?;

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            &format!("{} analysis for customer {}", variant, customer),
            &result,
        ),
        OutputFormat::Text => {
            println!("✓ {} analysis for customer {}", variant, customer);
            print_insights(&result);
            Ok(())
        }
    }
}
