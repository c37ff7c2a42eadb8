//! Lead qualification CLI
//!
//! Runs one qualification conversation on the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Full run: LLM classifier + Google Sheets persistence
//! lead_cli
//!
//! # Offline dry run
//! lead_cli --no-classifier --no-persist
//!
//! # Raise the budget threshold and print the final record as JSON
//! lead_cli --min-budget 2500 --format json
//! ```
//!
//! Configuration is read from the environment (and `.env`):
//! `LEAD_MIN_BUDGET`, `LEAD_HTTP_TIMEOUT_SECS`, `LEAD_CLASSIFIER_BACKEND`,
//! `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `LEAD_SHEETS_SPREADSHEET_ID`,
//! `LEAD_SHEETS_TOKEN_PATH`. Diagnostics go to stderr, filtered by `RUST_LOG`.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::process::ExitCode;

use lead_qualifier::classifier::DisabledClassifier;
use lead_qualifier::{
    build_classifier, ClassifierConfig, Conversation, ConversationOutcome, EventClassifier,
    InMemoryLeadStore, LeadConfig, LeadStore, SaveOutcome, SheetsConfig, SheetsStore, StdConsole,
};

#[derive(Parser)]
#[command(name = "lead_cli")]
#[command(version = "0.1.0")]
#[command(about = "Qualify an event lead through a short conversation")]
#[command(long_about = None)]
struct Cli {
    /// Minimum budget in USD for a lead to qualify
    #[arg(long, env = "LEAD_MIN_BUDGET")]
    min_budget: Option<f64>,

    /// Keep the lead in memory instead of writing it to the spreadsheet
    #[arg(long, env = "LEAD_NO_PERSIST")]
    no_persist: bool,

    /// Skip the LLM classifier; descriptions are classified manually
    #[arg(long, env = "LEAD_NO_CLASSIFIER")]
    no_classifier: bool,

    /// How to print the final record
    #[arg(long, short = 'o', default_value = "pretty", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
    None,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(outcome) => {
            print_outcome(&outcome, cli.format);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "conversation aborted");
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<ConversationOutcome> {
    let mut config = LeadConfig::from_env().context("invalid lead configuration")?;
    if let Some(min_budget) = cli.min_budget {
        config = config.with_min_budget(min_budget)?;
    }

    let classifier: Box<dyn EventClassifier> = if cli.no_classifier {
        Box::new(DisabledClassifier::new("disabled with --no-classifier"))
    } else {
        let classifier_config = ClassifierConfig::from_env(config.http_timeout)
            .context("invalid classifier configuration")?;
        build_classifier(&classifier_config)
    };

    let store: Box<dyn LeadStore> = if cli.no_persist {
        Box::new(InMemoryLeadStore::new())
    } else {
        Box::new(SheetsStore::connect(SheetsConfig::from_env(config.http_timeout)).await)
    };

    let status = store.status().await;
    if !status.fully_available {
        tracing::warn!(
            reason = status.error_message.as_deref().unwrap_or("unknown"),
            "lead store unavailable, leads will not be saved"
        );
    }

    let mut console = StdConsole::new();
    let conversation = Conversation::new(
        &mut console,
        classifier.as_ref(),
        Some(store.as_ref()),
        config,
    );
    Ok(conversation.run().await?)
}

fn print_outcome(outcome: &ConversationOutcome, format: OutputFormat) {
    match format {
        OutputFormat::None => {}
        OutputFormat::Json => {
            let output = serde_json::json!({
                "lead": outcome.record,
                "rejection": outcome.qualification.reason().map(|r| r.code()),
                "saved": outcome.persistence == SaveOutcome::Saved,
            });
            match serde_json::to_string_pretty(&output) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("{}: {}", "error".red().bold(), e),
            }
        }
        OutputFormat::Pretty => {
            println!();
            if outcome.qualification.is_qualified() {
                println!("{} {}", "✓".green(), "Lead qualified".green().bold());
            } else {
                let code = outcome
                    .qualification
                    .reason()
                    .map(|r| r.code())
                    .unwrap_or("unknown");
                println!("{} {} ({})", "✗".red(), "Lead not qualified".red().bold(), code);
            }
            let persistence = match outcome.persistence {
                SaveOutcome::Saved => "saved".green(),
                SaveOutcome::NotSaved => "not saved".yellow(),
                SaveOutcome::Skipped => "skipped".dimmed(),
            };
            println!("  {}: {}", "storage".bold(), persistence);
        }
    }
}
