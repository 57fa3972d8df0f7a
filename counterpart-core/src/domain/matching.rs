//! Match outcome domain model

use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerRecord;
use crate::domain::entry::StatementEntry;

/// How an entry was resolved to a customer (or not)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Normalized keyword found as a substring of the normalized description
    Exact,
    /// Best fuzzy candidate at/above threshold, accepted (operator or policy)
    FuzzyAccepted,
    /// Operator declined the candidate and keyed in a known customer id
    ManualOverride,
    /// No acceptable resolution; excluded from output, kept for audit
    Skipped,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Exact => "exact",
            MatchMethod::FuzzyAccepted => "fuzzy_accepted",
            MatchMethod::ManualOverride => "manual_override",
            MatchMethod::Skipped => "skipped",
        }
    }
}

/// Resolution of one statement entry
///
/// `customer` is always `Some` unless `method` is `Skipped`. `score` carries
/// the best fuzzy score when the fuzzy pass ran; the exact pass never scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub entry: StatementEntry,
    pub customer: Option<CustomerRecord>,
    pub method: MatchMethod,
    pub score: Option<f64>,
}

impl MatchResult {
    pub fn exact(entry: StatementEntry, customer: CustomerRecord) -> Self {
        Self {
            entry,
            customer: Some(customer),
            method: MatchMethod::Exact,
            score: None,
        }
    }

    pub fn fuzzy_accepted(entry: StatementEntry, customer: CustomerRecord, score: f64) -> Self {
        Self {
            entry,
            customer: Some(customer),
            method: MatchMethod::FuzzyAccepted,
            score: Some(score),
        }
    }

    pub fn manual_override(entry: StatementEntry, customer: CustomerRecord, score: f64) -> Self {
        Self {
            entry,
            customer: Some(customer),
            method: MatchMethod::ManualOverride,
            score: Some(score),
        }
    }

    pub fn skipped(entry: StatementEntry, score: Option<f64>) -> Self {
        Self {
            entry,
            customer: None,
            method: MatchMethod::Skipped,
            score,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.method == MatchMethod::Skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_skipped_has_no_customer() {
        let entry = StatementEntry::new("UNKNOWN WIRE", Decimal::new(100, 0));
        let result = MatchResult::skipped(entry, Some(41.5));
        assert!(result.is_skipped());
        assert!(result.customer.is_none());
        assert_eq!(result.method.as_str(), "skipped");
    }

    #[test]
    fn test_method_serialization() {
        let json = serde_json::to_string(&MatchMethod::FuzzyAccepted).unwrap();
        assert_eq!(json, "\"fuzzy_accepted\"");
    }
}
