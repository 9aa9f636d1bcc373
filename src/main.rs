use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use receipt_categorizer::{load_records, Categorizer, CategorizerConfig, PromptBuilder, ReceiptRecord, Taxonomy};

#[derive(Parser)]
#[command(name = "receipt-categorizer", version, about = "Assign taxonomy categories to receipt line records")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Categorize a JSON or CSV batch and print the enriched records
    Categorize {
        /// Records file (`.csv`, otherwise JSON)
        file: PathBuf,
    },

    /// Print the classifier prompt for a batch without sending it
    Prompt { file: PathBuf },

    /// Print the taxonomy reference text
    Taxonomy,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    receipt_categorizer::init_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Categorize { file } => run_categorize(file).await,
        Command::Prompt { file } => run_prompt(file),
        Command::Taxonomy => {
            println!("{}", Taxonomy::standard().reference_text());
            Ok(())
        }
    }
}

async fn run_categorize(file: PathBuf) -> Result<()> {
    let config = CategorizerConfig::from_env().context("Invalid categorizer configuration")?;
    let categorizer = Categorizer::from_config(&config)?;
    let records = load_records(&file)?;

    let outcome = categorizer.categorize_batch(records).await;
    eprintln!(
        "✓ Categorized {} records via {}",
        outcome.records.len(),
        outcome.source.label()
    );

    let output: Vec<serde_json::Value> = outcome
        .records
        .into_iter()
        .map(ReceiptRecord::into_value)
        .collect();
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_prompt(file: PathBuf) -> Result<()> {
    let records = load_records(&file)?;
    let taxonomy = Taxonomy::standard();
    println!("{}", PromptBuilder::new(&taxonomy).build(&records));
    Ok(())
}
