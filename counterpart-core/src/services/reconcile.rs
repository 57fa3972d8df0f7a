//! Reconcile service - end-to-end statement-to-voucher pipeline
//!
//! One run covers one posting date and any number of statement files. The
//! duplicate ledger is seeded once from the day's existing output and shared
//! across files; it suppresses only what a prior run already persisted, so
//! repeated keys within the current run all book. A failure in one file is
//! reported on that file and the remaining files still process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{DuplicateLedger, MatchMethod, MatchResult};
use crate::ports::Prompter;
use crate::services::{DirectoryService, MatchEngine, OutputService, StatementService};

pub struct ReconcileService {
    statements: Arc<StatementService>,
    directory: Arc<DirectoryService>,
    output: Arc<OutputService>,
    threshold: f64,
}

impl ReconcileService {
    pub fn new(
        statements: Arc<StatementService>,
        directory: Arc<DirectoryService>,
        output: Arc<OutputService>,
        threshold: f64,
    ) -> Self {
        Self {
            statements,
            directory,
            output,
            threshold,
        }
    }

    /// Reconcile statement files for one posting date
    ///
    /// With `preview` the full pipeline runs, prompts included, but no
    /// voucher or audit file is written.
    pub fn run(
        &self,
        files: &[PathBuf],
        posting_date: &str,
        prompter: &dyn Prompter,
        preview: bool,
    ) -> Result<RunReport> {
        NaiveDate::parse_from_str(posting_date, "%Y%m%d")
            .with_context(|| format!("Invalid posting date '{posting_date}' (expected YYYYMMDD)"))?;

        let scan = self.output.scan_existing(posting_date);
        let mut ledger = DuplicateLedger::new(scan.counts);

        let mut report = RunReport {
            posting_date: posting_date.to_string(),
            preview,
            prior_keys: ledger.persisted_keys(),
            files: Vec::new(),
            warnings: scan.warnings,
        };

        for file in files {
            let file_report = match self.run_file(file, posting_date, prompter, preview, &mut ledger)
            {
                Ok(file_report) => file_report,
                Err(e) => FileReport::failed(file, &e),
            };
            report.files.push(file_report);
        }

        Ok(report)
    }

    fn run_file(
        &self,
        file: &Path,
        posting_date: &str,
        prompter: &dyn Prompter,
        preview: bool,
        ledger: &mut DuplicateLedger,
    ) -> Result<FileReport> {
        let format = self.statements.detect(file)?;
        let directory = self.directory.load(&format.display_name)?;
        let engine = MatchEngine::new(&directory, self.threshold)?;

        // Zero-amount rows are headers or filler, not entries to book.
        // Signed amounts stay: reversals book like any other entry.
        let entries: Vec<_> = self
            .statements
            .extract(file, format)?
            .into_iter()
            .filter(|e| e.amount != Decimal::ZERO)
            .collect();

        let results = engine.match_entries(&entries, prompter)?;

        let mut report = FileReport::new(file, &format.display_name);
        report.extracted = entries.len();
        for result in &results {
            match result.method {
                MatchMethod::Exact => report.exact += 1,
                MatchMethod::FuzzyAccepted => report.fuzzy_accepted += 1,
                MatchMethod::ManualOverride => report.manual_override += 1,
                MatchMethod::Skipped => report.skipped += 1,
            }
        }

        report.written =
            self.output
                .persist(&results, posting_date, &format.display_name, ledger, preview)?;
        report.suppressed = report.matched() - report.written;
        if !preview {
            self.output
                .export_skipped(&results, posting_date, &format.display_name)?;
        }

        report.results = results;
        Ok(report)
    }
}

/// Outcome of one run across all files
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub posting_date: String,
    pub preview: bool,
    /// Distinct posting keys found in the day's pre-existing output
    pub prior_keys: usize,
    pub files: Vec<FileReport>,
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn total_written(&self) -> usize {
        self.files.iter().map(|f| f.written).sum()
    }

    pub fn total_suppressed(&self) -> usize {
        self.files.iter().map(|f| f.suppressed).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.files.iter().map(|f| f.skipped).sum()
    }

    pub fn failed_files(&self) -> usize {
        self.files.iter().filter(|f| f.error.is_some()).count()
    }
}

/// Outcome of one statement file
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    /// Bank display name, absent when detection itself failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    pub extracted: usize,
    pub exact: usize,
    pub fuzzy_accepted: usize,
    pub manual_override: usize,
    pub skipped: usize,
    pub written: usize,
    pub suppressed: usize,
    pub results: Vec<MatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    fn new(file: &Path, bank_display: &str) -> Self {
        Self {
            file: file.display().to_string(),
            bank: Some(bank_display.to_string()),
            extracted: 0,
            exact: 0,
            fuzzy_accepted: 0,
            manual_override: 0,
            skipped: 0,
            written: 0,
            suppressed: 0,
            results: Vec::new(),
            error: None,
        }
    }

    fn failed(file: &Path, error: &anyhow::Error) -> Self {
        Self {
            file: file.display().to_string(),
            bank: None,
            extracted: 0,
            exact: 0,
            fuzzy_accepted: 0,
            manual_override: 0,
            skipped: 0,
            written: 0,
            suppressed: 0,
            results: Vec::new(),
            // Alternate format keeps the context chain on one line.
            error: Some(format!("{error:#}")),
        }
    }

    /// Entries resolved to a customer by any method
    pub fn matched(&self) -> usize {
        self.exact + self.fuzzy_accepted + self.manual_override
    }
}
