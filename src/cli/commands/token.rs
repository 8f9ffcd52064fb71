use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::types::CustomerId;

pub fn handle(customer: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let claims = Claims::new(CustomerId::new(customer));
    let token = generate_jwt(&claims)?;

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            "Token issued",
            &json!({ "customer_id": claims.customer_id, "token": token, "expires_at": claims.exp }),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
