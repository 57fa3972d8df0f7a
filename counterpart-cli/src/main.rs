//! Counterpart CLI - bank receipt reconciliation in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;
mod prompt;

use commands::{banks, customers, logs, run};

/// Counterpart - match bank receipts to customers and draft vouchers
#[derive(Parser)]
#[command(name = "cpt", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile statement files into voucher rows for one posting date
    Run {
        /// Statement CSV files (bank is detected from the filename)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Posting date as YYYYMMDD (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Customer reference table (overrides settings)
        #[arg(long)]
        customers: Option<PathBuf>,
        /// Output directory for voucher files (overrides settings)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Fuzzy acceptance threshold, 0-100 (overrides settings)
        #[arg(long)]
        threshold: Option<f64>,
        /// Accept every fuzzy candidate at/above the threshold without prompting
        #[arg(long)]
        batch: bool,
        /// Run the full pipeline without writing any files
        #[arg(long)]
        preview: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the known bank statement formats
    Banks {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the customer directory for one bank
    Customers {
        /// Bank token (see 'cpt banks')
        #[arg(long)]
        bank: String,
        /// Customer reference table (overrides settings)
        #[arg(long)]
        customers: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            files,
            date,
            customers,
            out_dir,
            threshold,
            batch,
            preview,
            json,
        } => run::run(
            files, date, customers, out_dir, threshold, batch, preview, json,
        ),
        Commands::Banks { json } => banks::run(json),
        Commands::Customers {
            bank,
            customers,
            json,
        } => customers::run(&bank, customers, json),
        Commands::Logs { command } => logs::run(command),
    }
}
