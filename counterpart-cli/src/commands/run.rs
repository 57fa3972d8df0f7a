//! Run command - reconcile statement files into voucher rows

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;

use counterpart_core::adapters::BatchPolicy;
use counterpart_core::config::Config;
use counterpart_core::ports::Prompter;
use counterpart_core::services::{LogEvent, RunReport};
use counterpart_core::CounterpartContext;

use super::{get_counterpart_dir, get_logger, log_event};
use crate::output;
use crate::prompt::TerminalPrompter;

#[allow(clippy::too_many_arguments)]
pub fn run(
    files: Vec<PathBuf>,
    date: Option<String>,
    customers: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    threshold: Option<f64>,
    batch: bool,
    preview: bool,
    json: bool,
) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("run"));

    if let Some(threshold) = threshold {
        if !(0.0..=100.0).contains(&threshold) {
            anyhow::bail!("--threshold must be between 0 and 100");
        }
    }

    let counterpart_dir = get_counterpart_dir();
    std::fs::create_dir_all(&counterpart_dir).with_context(|| {
        format!(
            "Failed to create counterpart directory: {:?}",
            counterpart_dir
        )
    })?;

    let mut config = Config::load(&counterpart_dir)?;
    if let Some(threshold) = threshold {
        config.fuzzy_threshold = threshold;
    }
    if let Some(customers) = customers {
        config.customers_file = Some(customers);
    }
    if let Some(out_dir) = out_dir {
        config.output_dir = Some(out_dir);
    }
    let ctx = CounterpartContext::with_config(&counterpart_dir, config);

    let posting_date = match date {
        Some(date) => date,
        None => Local::now().format("%Y%m%d").to_string(),
    };

    // Batch runs and piped stdin never see a prompt. The difference: --batch
    // books every candidate the engine would show, a pipe skips them.
    let prompter: Box<dyn Prompter> = if batch {
        Box::new(BatchPolicy::accept_all())
    } else if atty::isnt(atty::Stream::Stdin) {
        if !json {
            output::warning(
                "stdin is not a terminal; fuzzy candidates will be skipped (pass --batch to auto-accept)",
            );
        }
        Box::new(BatchPolicy::decline_all())
    } else {
        Box::new(TerminalPrompter::new())
    };

    let report = match ctx
        .reconcile_service
        .run(&files, &posting_date, prompter.as_ref(), preview)
    {
        Ok(report) => report,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("run_failed")
                    .with_command("run")
                    .with_error(format!("{e:#}")),
            );
            return Err(e);
        }
    };

    for file in report.files.iter().filter(|f| f.error.is_some()) {
        log_event(
            &logger,
            LogEvent::new("file_failed")
                .with_command("run")
                .with_posting_date(&report.posting_date)
                .with_error(file.error.clone().unwrap_or_default()),
        );
    }
    log_event(
        &logger,
        LogEvent::new("run_completed")
            .with_command("run")
            .with_posting_date(&report.posting_date),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&ctx, &report);
    }

    if report.failed_files() > 0 {
        anyhow::bail!(
            "{} of {} files failed",
            report.failed_files(),
            report.files.len()
        );
    }
    Ok(())
}

fn print_report(ctx: &CounterpartContext, report: &RunReport) {
    if report.preview {
        output::warning("PREVIEW MODE - No files written");
        println!();
    }
    for warning in &report.warnings {
        output::warning(warning);
    }

    for file in &report.files {
        if let Some(error) = &file.error {
            output::error(&format!("Error: {} - {}", file.file, error));
        }
    }

    // In preview, show what each file resolved to before the summary.
    if report.preview {
        for file in &report.files {
            if file.results.is_empty() {
                continue;
            }
            println!();
            println!(
                "{}",
                format!("{} ({})", file.file, file.bank.as_deref().unwrap_or("-")).bold()
            );

            let mut table = output::create_table();
            table.set_header(vec!["Description", "Amount", "Customer", "Via", "Score"]);
            for result in file.results.iter().take(10) {
                table.add_row(vec![
                    result.entry.raw_text.clone(),
                    format!("{:.2}", result.entry.amount),
                    result
                        .customer
                        .as_ref()
                        .map(|c| format!("{} [{}]", c.display_name, c.customer_id))
                        .unwrap_or_else(|| "-".to_string()),
                    result.method.as_str().to_string(),
                    result
                        .score
                        .map(|s| format!("{s:.1}"))
                        .unwrap_or_else(|| "-".to_string()),
                ]);
            }
            println!("{table}");
            if file.results.len() > 10 {
                println!("... and {} more", file.results.len() - 10);
            }
        }
    }

    println!();
    let mut table = output::create_table();
    table.set_header(vec![
        "File",
        "Bank",
        "Extracted",
        "Matched",
        "Skipped",
        "Written",
        "Duplicates",
    ]);
    for file in &report.files {
        table.add_row(vec![
            file.file.clone(),
            file.bank.clone().unwrap_or_else(|| "-".to_string()),
            file.extracted.to_string(),
            file.matched().to_string(),
            file.skipped.to_string(),
            file.written.to_string(),
            file.suppressed.to_string(),
        ]);
    }
    println!("{table}");
    println!();

    if report.preview {
        println!("  Would write: {} voucher rows", report.total_written());
    } else {
        output::success(&format!(
            "Wrote {} voucher rows to {}",
            report.total_written(),
            ctx.output_service.out_dir().display()
        ));
    }
    if report.total_suppressed() > 0 {
        println!(
            "  Already in today's output: {} rows",
            report.total_suppressed()
        );
    }
    if report.total_skipped() > 0 && !report.preview {
        output::info(&format!(
            "{} skipped entries recorded in {}",
            report.total_skipped(),
            ctx.output_service
                .skipped_path(&report.posting_date)
                .display()
        ));
    }
}
