use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::CliConfig;

/// Assigns analytic accounts to posted transactions from a rules file.
#[derive(Debug, Parser)]
#[command(name = "tally", version, about)]
struct Cli {
    /// Config file (default: per-user tally.toml, or $TALLY_CONFIG).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `tally_analytics=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// JSON array of transactions.
    transactions: PathBuf,

    /// Rules file (TOML or JSON). Falls back to config and $TALLY_RULES.
    #[arg(long)]
    rules: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check every rule definition; exits 1 if any is invalid.
    Validate {
        /// Rules file (TOML or JSON).
        rules: Option<PathBuf>,
    },
    /// Classify a batch of transactions.
    Classify(BatchArgs),
    /// Report how many transactions the confirmed rules would cover.
    Coverage(BatchArgs),
    /// List ranked candidate rules for one transaction.
    Explain {
        #[command(flatten)]
        batch: BatchArgs,
        transaction_id: String,
    },
    /// Show which transactions a single rule would match, whatever its state.
    Preview {
        #[command(flatten)]
        batch: BatchArgs,
        rule_id: String,
    },
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(level)
        .map_err(|err| anyhow!("Invalid log filter {level:?}: {err}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!("Failed to initialise tracing: {err}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log_level))?;
    let pretty = cli.pretty || config.pretty;

    match cli.command {
        Command::Validate { rules } => {
            let path = config.rules_path(rules.as_deref())?;
            let output = commands::validate(&path).await?;
            commands::emit(&output, pretty)?;
            if !output.valid {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Classify(batch) => {
            let rules = rules_for(&config, &batch)?;
            let report = commands::classify(&batch.transactions, &rules).await?;
            commands::emit(&report, pretty)?;
        }
        Command::Coverage(batch) => {
            let rules = rules_for(&config, &batch)?;
            let report = commands::coverage(&batch.transactions, &rules).await?;
            commands::emit(&report, pretty)?;
        }
        Command::Explain {
            batch,
            transaction_id,
        } => {
            let rules = rules_for(&config, &batch)?;
            let explanation =
                commands::explain_transaction(&batch.transactions, &rules, &transaction_id)
                    .await?;
            commands::emit(&explanation, pretty)?;
        }
        Command::Preview { batch, rule_id } => {
            let rules = rules_for(&config, &batch)?;
            let preview = commands::preview(&batch.transactions, &rules, &rule_id).await?;
            commands::emit(&preview, pretty)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn rules_for(config: &CliConfig, batch: &BatchArgs) -> anyhow::Result<PathBuf> {
    Ok(config.rules_path(batch.rules.as_deref())?)
}
