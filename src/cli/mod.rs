pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

use crate::types::Variant;

#[derive(Parser)]
#[command(name = "finsight")]
#[command(about = "Finsight CLI - run the insight pipeline against configured records")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run one analysis for a customer and print the insights")]
    Analyze {
        #[arg(help = "Customer identifier")]
        customer: String,
        #[arg(long, default_value = "financial-health", help = "financial-health | transaction-monitor | credit-manager")]
        variant: Variant,
    },

    #[command(about = "Print the reduced financial summary (no reasoning call)")]
    Summary {
        #[arg(help = "Customer identifier")]
        customer: String,
        #[arg(long, help = "Reduction window in days (defaults to AGENT_WINDOW_DAYS)")]
        days: Option<u32>,
    },

    #[command(about = "Mint a JWT for a customer using the configured secret")]
    Token {
        #[arg(help = "Customer identifier")]
        customer: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Analyze { customer, variant } => {
            commands::analyze::handle(customer, variant, output_format).await
        }
        Commands::Summary { customer, days } => commands::summary::handle(customer, days).await,
        Commands::Token { customer } => commands::token::handle(customer, output_format),
    }
}
