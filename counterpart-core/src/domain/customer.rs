//! Customer reference records and the per-bank directory

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One row of the customer reference table, scoped to a single bank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Match anchor: the text fragment expected inside statement descriptions
    pub keyword: String,
    /// Stable join key into the accounting system
    pub customer_id: String,
    /// Human-readable name, used in prompts and voucher memos
    pub display_name: String,
    /// General ledger account the customer's receipts post to
    pub gl_account: String,
    /// Pass-through columns from the reference table (posting codes etc.)
    pub extra: BTreeMap<String, String>,
}

impl CustomerRecord {
    pub fn new(
        keyword: impl Into<String>,
        customer_id: impl Into<String>,
        display_name: impl Into<String>,
        gl_account: impl Into<String>,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            customer_id: customer_id.into(),
            display_name: display_name.into(),
            gl_account: gl_account.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// Customer records for one bank, in reference-table order
///
/// Iteration order is the insertion order of the underlying reference table.
/// The match engine depends on this: both the exact pass and fuzzy tie-breaks
/// resolve to the first record in this order, so reordering the table changes
/// which customer wins a contested description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDirectory {
    records: Vec<CustomerRecord>,
}

impl CustomerDirectory {
    pub fn new(records: Vec<CustomerRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in reference-table order
    pub fn iter(&self) -> impl Iterator<Item = &CustomerRecord> {
        self.records.iter()
    }

    /// Exact customer id lookup, used by the manual override path
    pub fn find_by_id(&self, customer_id: &str) -> Option<&CustomerRecord> {
        self.records.iter().find(|r| r.customer_id == customer_id)
    }
}
