use serde::Serialize;
use serde_json::{json, Value};

use crate::agent::InsightResult;
use crate::cli::OutputFormat;

/// Print a success payload in the requested format
pub fn output_success<T: Serialize>(
    output_format: OutputFormat,
    message: &str,
    data: &T,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "success": true,
                "message": message,
                "data": serde_json::to_value(data)?
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            print_text(&serde_json::to_value(data)?);
        }
    }
    Ok(())
}

/// Insight lists rendered one bullet per item under their heading
pub fn print_insights(result: &InsightResult) {
    for (heading, items) in [
        ("Insights", &result.insights),
        ("Alerts", &result.alerts),
        ("Recommendations", &result.recommendations),
    ] {
        println!("\n{}:", heading);
        if items.is_empty() {
            println!("  (none)");
        }
        for item in items {
            println!("  - {}", item);
        }
    }
}

fn print_text(value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                match value {
                    Value::String(s) => println!("  {}: {}", key, s),
                    other => println!("  {}: {}", key, other),
                }
            }
        }
        Value::Null => {}
        other => println!("  {}", other),
    }
}
