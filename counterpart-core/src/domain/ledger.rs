//! Count-based duplicate suppression across re-runs

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identity of a persisted voucher row for duplicate detection
///
/// Two rows with the same posting date, customer and amount are
/// indistinguishable to re-run protection. Descriptions are deliberately
/// excluded: banks mangle them between exports, amounts and parties do not
/// change. `Decimal` equality is numeric, so 500 and 500.00 form one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostingKey {
    /// Posting date in YYYYMMDD form
    pub posting_date: String,
    pub customer_id: String,
    pub amount: Decimal,
}

impl PostingKey {
    pub fn new(
        posting_date: impl Into<String>,
        customer_id: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            posting_date: posting_date.into(),
            customer_id: customer_id.into(),
            amount,
        }
    }
}

/// Multiset of already-persisted posting keys for one posting date
///
/// Built once per run from the day's existing output files, then consulted
/// once per would-be output row. Counts rather than a set: a customer paying
/// the same amount twice in one day is two legitimate rows, and both must
/// survive a re-run that already persisted one of them.
#[derive(Debug, Default)]
pub struct DuplicateLedger {
    /// Occurrences already present in prior output for the date
    persisted: HashMap<PostingKey, u32>,
    /// Occurrences admitted during this run
    admitted: HashMap<PostingKey, u32>,
}

impl DuplicateLedger {
    /// Ledger seeded with counts scanned from pre-existing output
    pub fn new(persisted: HashMap<PostingKey, u32>) -> Self {
        Self {
            persisted,
            admitted: HashMap::new(),
        }
    }

    /// Ledger with no prior output (first run of the day, or fail-open)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of distinct keys seen in prior output
    pub fn persisted_keys(&self) -> usize {
        self.persisted.len()
    }

    /// Decide whether the next occurrence of `key` should be written
    ///
    /// Counts the occurrence first, then admits it only once this run has
    /// seen more occurrences of the key than prior output already holds.
    /// With N persisted and M produced this run, exactly max(M - N, 0) rows
    /// are admitted, which makes a full re-run write nothing and a run with
    /// genuinely new repeats write only the new ones.
    pub fn admit(&mut self, key: &PostingKey) -> bool {
        let seen = self.admitted.entry(key.clone()).or_insert(0);
        *seen += 1;
        *seen > self.persisted.get(key).copied().unwrap_or(0)
    }
}
