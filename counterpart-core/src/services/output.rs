//! Output service - voucher persistence and prior-output scanning
//!
//! One CSV per posting date, append-only: `vouchers-YYYYMMDD.csv`. Re-run
//! protection scans every file for the date (a day is sometimes split across
//! several files by hand) and seeds the duplicate ledger with occurrence
//! counts. Scanning fails open: output that cannot be read contributes zero
//! counts and a warning, because blocking the day's booking over a corrupt
//! old file is worse than a duplicate an operator can spot.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::{DuplicateLedger, MatchResult, PostingKey};

const VOUCHER_COLUMNS: [&str; 9] = [
    "posting_date",
    "bank",
    "customer_id",
    "customer_name",
    "gl_account",
    "amount",
    "memo",
    "matched_via",
    "extras",
];

const SKIPPED_COLUMNS: [&str; 4] = ["posting_date", "bank", "raw_text", "amount"];

/// Ledger seed data from the day's pre-existing output
#[derive(Debug, Default)]
pub struct LedgerScan {
    pub counts: HashMap<PostingKey, u32>,
    pub warnings: Vec<String>,
}

pub struct OutputService {
    out_dir: PathBuf,
}

impl OutputService {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Primary voucher file for a posting date
    pub fn voucher_path(&self, posting_date: &str) -> PathBuf {
        self.out_dir.join(format!("vouchers-{posting_date}.csv"))
    }

    /// Audit file collecting skipped entries for a posting date
    pub fn skipped_path(&self, posting_date: &str) -> PathBuf {
        self.out_dir.join(format!("skipped-{posting_date}.csv"))
    }

    /// Count posting keys across every existing voucher file for the date
    ///
    /// Never fails: unreadable files and unrecognizable rows degrade to
    /// warnings so the run can proceed with whatever was countable.
    pub fn scan_existing(&self, posting_date: &str) -> LedgerScan {
        let mut scan = LedgerScan::default();

        let entries = match std::fs::read_dir(&self.out_dir) {
            Ok(entries) => entries,
            // No output directory yet means a first run, not a problem.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return scan,
            Err(e) => {
                scan.warnings
                    .push(format!("cannot list {}: {e}", self.out_dir.display()));
                return scan;
            }
        };

        let prefix = format!("vouchers-{posting_date}");
        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(&prefix) && n.ends_with(".csv"))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();

        for file in files {
            match count_file(&file) {
                Ok((counts, malformed)) => {
                    for (key, count) in counts {
                        *scan.counts.entry(key).or_insert(0) += count;
                    }
                    if malformed > 0 {
                        scan.warnings.push(format!(
                            "{}: {malformed} unreadable rows not counted",
                            file.display()
                        ));
                    }
                }
                Err(e) => {
                    scan.warnings
                        .push(format!("ignoring prior output {}: {e}", file.display()));
                }
            }
        }

        scan
    }

    /// Append ledger-admitted matches to the day's voucher file
    ///
    /// Skipped results never write. Returns the number of rows written after
    /// duplicate filtering; 0 on a clean re-run. With `dry_run` the ledger is
    /// still consulted and the count returned, but nothing touches disk.
    pub fn persist(
        &self,
        results: &[MatchResult],
        posting_date: &str,
        bank_display: &str,
        ledger: &mut DuplicateLedger,
        dry_run: bool,
    ) -> Result<usize> {
        let date = NaiveDate::parse_from_str(posting_date, "%Y%m%d")
            .with_context(|| format!("Invalid posting date '{posting_date}'"))?;
        let month_day = date.format("%m.%d");

        let path = self.voucher_path(posting_date);
        let mut writer = if dry_run {
            None
        } else {
            std::fs::create_dir_all(&self.out_dir)
                .with_context(|| format!("Failed to create {}", self.out_dir.display()))?;
            let is_new = !path.exists();
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            if is_new {
                writer.write_record(VOUCHER_COLUMNS)?;
            }
            Some(writer)
        };

        let mut written = 0;
        for result in results {
            let customer = match &result.customer {
                Some(customer) => customer,
                None => continue,
            };

            let key = PostingKey::new(posting_date, &customer.customer_id, result.entry.amount);
            if !ledger.admit(&key) {
                continue;
            }

            if let Some(writer) = writer.as_mut() {
                let memo = format!("{month_day} {} suspense receipt", customer.display_name);
                let extras = customer
                    .extra
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("; ");
                writer.write_record([
                    posting_date,
                    bank_display,
                    customer.customer_id.as_str(),
                    customer.display_name.as_str(),
                    customer.gl_account.as_str(),
                    &format!("{:.2}", result.entry.amount),
                    &memo,
                    result.method.as_str(),
                    &extras,
                ])?;
            }
            written += 1;
        }

        if let Some(writer) = writer.as_mut() {
            writer
                .flush()
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        Ok(written)
    }

    /// Append skipped entries to the day's audit file
    ///
    /// Every skipped entry is recorded with its raw text and amount so the
    /// back office can review and book it by hand.
    pub fn export_skipped(
        &self,
        results: &[MatchResult],
        posting_date: &str,
        bank_display: &str,
    ) -> Result<usize> {
        let skipped: Vec<&MatchResult> = results.iter().filter(|r| r.is_skipped()).collect();
        if skipped.is_empty() {
            return Ok(0);
        }

        std::fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("Failed to create {}", self.out_dir.display()))?;

        let path = self.skipped_path(posting_date);
        let is_new = !path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer.write_record(SKIPPED_COLUMNS)?;
        }

        for result in &skipped {
            writer.write_record([
                posting_date,
                bank_display,
                result.entry.raw_text.as_str(),
                &format!("{:.2}", result.entry.amount),
            ])?;
        }

        writer
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(skipped.len())
    }
}

/// Count posting keys in one voucher file
///
/// Returns the counts plus the number of rows that could not be keyed.
/// A file-level failure (missing columns, broken CSV) is an `Err`, and the
/// caller drops the whole file from the scan.
fn count_file(path: &Path) -> Result<(HashMap<PostingKey, u32>, usize)> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let date_idx = headers
        .iter()
        .position(|h| h == "posting_date")
        .context("missing 'posting_date' column")?;
    let id_idx = headers
        .iter()
        .position(|h| h == "customer_id")
        .context("missing 'customer_id' column")?;
    let amount_idx = headers
        .iter()
        .position(|h| h == "amount")
        .context("missing 'amount' column")?;

    let mut counts = HashMap::new();
    let mut malformed = 0usize;
    for result in reader.records() {
        let row = result?;
        let date = row.get(date_idx).unwrap_or("").trim();
        let id = row.get(id_idx).unwrap_or("").trim();
        let amount: Option<Decimal> = row.get(amount_idx).and_then(|s| s.trim().parse().ok());

        match (date.is_empty() || id.is_empty(), amount) {
            (false, Some(amount)) => {
                *counts.entry(PostingKey::new(date, id, amount)).or_insert(0) += 1;
            }
            _ => malformed += 1,
        }
    }

    Ok((counts, malformed))
}
