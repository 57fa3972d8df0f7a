//! Directory service - customer reference table loading
//!
//! The reference table is one CSV shared by every bank; each run filters it
//! down to the rows whose bank column mentions the statement's bank. Row
//! order in the file is preserved because the match engine's tie-breaks
//! depend on it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::result::Error;
use crate::domain::{CustomerDirectory, CustomerRecord};

/// Required reference table columns, by header name
const COL_BANK: &str = "bank";
const COL_KEYWORD: &str = "keyword";
const COL_CUSTOMER_ID: &str = "customer_id";
const COL_DISPLAY_NAME: &str = "display_name";
const COL_GL_ACCOUNT: &str = "gl_account";

pub struct DirectoryService {
    table_path: PathBuf,
}

impl DirectoryService {
    pub fn new(table_path: PathBuf) -> Self {
        Self { table_path }
    }

    pub fn table_path(&self) -> &Path {
        &self.table_path
    }

    /// Load the reference table filtered to one bank
    ///
    /// A row belongs to the bank when its bank cell contains the format's
    /// display string. Rows without a keyword or customer id cannot
    /// participate in matching and are dropped. Zero remaining rows is a
    /// directory error: the run must not continue and silently skip
    /// everything.
    pub fn load(&self, bank_display: &str) -> Result<CustomerDirectory> {
        let mut reader = csv::Reader::from_path(&self.table_path).with_context(|| {
            format!(
                "Failed to read customer table {}",
                self.table_path.display()
            )
        })?;

        let headers = reader.headers()?.clone();

        let bank_idx = column(&headers, COL_BANK)?;
        let keyword_idx = column(&headers, COL_KEYWORD)?;
        let id_idx = column(&headers, COL_CUSTOMER_ID)?;
        let name_idx = column(&headers, COL_DISPLAY_NAME)?;
        let gl_idx = column(&headers, COL_GL_ACCOUNT)?;
        let known = [bank_idx, keyword_idx, id_idx, name_idx, gl_idx];

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result?;

            let bank = row.get(bank_idx).unwrap_or("").trim();
            if !bank.contains(bank_display) {
                continue;
            }

            let keyword = row.get(keyword_idx).unwrap_or("").trim();
            let customer_id = row.get(id_idx).unwrap_or("").trim();
            if keyword.is_empty() || customer_id.is_empty() {
                continue;
            }

            let mut record = CustomerRecord::new(
                keyword,
                customer_id,
                row.get(name_idx).unwrap_or("").trim(),
                row.get(gl_idx).unwrap_or("").trim(),
            );
            for (i, header) in headers.iter().enumerate() {
                if known.contains(&i) {
                    continue;
                }
                let value = row.get(i).unwrap_or("").trim();
                if !value.is_empty() {
                    record.extra.insert(header.to_string(), value.to_string());
                }
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(Error::directory(format!(
                "no customer rows for bank '{}' in {}",
                bank_display,
                self.table_path.display()
            ))
            .into());
        }

        Ok(CustomerDirectory::new(records))
    }
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .with_context(|| format!("Customer table is missing a '{name}' column"))
}
