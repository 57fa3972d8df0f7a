//! Statement service - table-driven statement extraction
//!
//! Every supported bank export reduces to the same shape: somewhere in the
//! sheet a marker cell announces the header row of the transaction block,
//! data starts a fixed number of rows below it, and the block ends at the
//! first blank description cell. A `BankFormat` row captures those knobs per
//! bank; the extractor itself is generic.

use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;
use rust_decimal::Decimal;

use crate::config::BankFormat;
use crate::domain::result::Error;
use crate::domain::StatementEntry;

/// Statement detection and extraction over the registered formats
pub struct StatementService {
    formats: Vec<BankFormat>,
}

impl StatementService {
    pub fn new(formats: Vec<BankFormat>) -> Self {
        Self { formats }
    }

    /// Registered formats, built-ins first
    pub fn formats(&self) -> &[BankFormat] {
        &self.formats
    }

    /// Find a format whose token is registered, not detected from content
    pub fn format_for_token(&self, token: &str) -> Option<&BankFormat> {
        let token = token.to_lowercase();
        self.formats.iter().find(|f| f.token == token)
    }

    /// Pick the format for a statement file from its filename stem
    pub fn detect(&self, path: &Path) -> Result<&BankFormat> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_lowercase();

        self.formats
            .iter()
            .find(|f| stem.contains(&f.token))
            .ok_or_else(|| {
                Error::config(format!(
                    "no bank format matches filename '{}' (known tokens: {})",
                    path.display(),
                    self.formats
                        .iter()
                        .map(|f| f.token.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
                .into()
            })
    }

    /// Extract `(description, amount)` line items from a statement file
    ///
    /// Unparseable or missing amount cells become zero and fall to the
    /// zero-amount filter downstream. Zero extracted entries is a valid
    /// outcome (quiet day), a missing header marker is not.
    pub fn extract(&self, path: &Path, format: &BankFormat) -> Result<Vec<StatementEntry>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to read statement file {}", path.display()))?;

        let rows: Vec<StringRecord> = reader
            .records()
            .collect::<std::result::Result<_, _>>()
            .with_context(|| format!("Malformed CSV in {}", path.display()))?;

        let hits: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| cell(row, format.description_column).trim() == format.header_marker)
            .map(|(i, _)| i)
            .collect();

        if hits.is_empty() {
            let name = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("<statement>");
            return Err(Error::parse(format!(
                "no '{}' header found in {}",
                format.header_marker, name
            ))
            .into());
        }

        let occurrence = format.marker_occurrence.clamp(1, hits.len());
        let start = hits[occurrence - 1] + format.data_offset;

        let mut entries = Vec::new();
        for row in rows.iter().skip(start) {
            let raw = cell(row, format.description_column).trim();
            if raw.is_empty() {
                break;
            }
            let amount = parse_amount(cell(row, format.amount_column)).unwrap_or(Decimal::ZERO);
            entries.push(StatementEntry::new(raw, amount));
        }

        Ok(entries)
    }
}

fn cell<'r>(row: &'r StringRecord, idx: usize) -> &'r str {
    row.get(idx).unwrap_or("")
}

/// Parse a statement amount cell
///
/// Accepts thousands separators, currency symbols and parentheses notation
/// for negatives. Returns `None` for cells with no parseable number.
pub(crate) fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();

    // Handle parentheses notation for negative numbers: (100.00) -> -100.00
    let (is_negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };

    // Remove currency symbols, commas, whitespace
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let mut amount: Decimal = cleaned.parse().ok()?;

    if is_negative && amount > Decimal::ZERO {
        amount = -amount;
    }

    Some(amount)
}
