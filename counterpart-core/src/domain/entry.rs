//! Statement entry domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single line item extracted from a bank statement
///
/// Immutable once extracted: matching and persistence read it, nothing
/// rewrites it. `raw_text` is the untouched description cell; whitespace
/// stripping happens inside the match engine, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementEntry {
    /// Free-text transaction description as it appears on the statement
    pub raw_text: String,
    /// Signed amount; zero-amount rows are dropped before matching
    pub amount: Decimal,
}

impl StatementEntry {
    pub fn new(raw_text: impl Into<String>, amount: Decimal) -> Self {
        Self {
            raw_text: raw_text.into(),
            amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_construction() {
        let entry = StatementEntry::new("WIRE IN ABC CORP", Decimal::new(50000, 2)); // 500.00
        assert_eq!(entry.raw_text, "WIRE IN ABC CORP");
        assert_eq!(entry.amount, Decimal::new(50000, 2));
    }

    #[test]
    fn test_entry_serde_round_trip() {
        let entry = StatementEntry::new("INWARD REMITTANCE REF 9912", Decimal::new(-1250, 2)); // -12.50
        let json = serde_json::to_string(&entry).unwrap();
        let back: StatementEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
