//! Statement-to-customer match engine
//!
//! Two passes over the customer directory, always in reference-table order:
//! an exact substring pass on whitespace-stripped text, then a fuzzy
//! partial-ratio fallback gated by a threshold and an operator prompt.
//! Batch runs inject a policy prompter instead of a terminal; the engine
//! itself has no idea which it is talking to.

use regex::Regex;

use crate::domain::result::{Error, Result};
use crate::domain::{CustomerDirectory, CustomerRecord, MatchResult, StatementEntry};
use crate::ports::Prompter;
use crate::similarity::partial_ratio;

/// Fuzzy acceptance threshold used when the config does not override it
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 80.0;

/// Strip every whitespace character, Unicode included
///
/// Bank exports disagree about spacing inside the same counterparty name,
/// so both descriptions and keywords are compared with spacing removed.
fn normalize_text(s: &str) -> String {
    let whitespace_re = Regex::new(r"\s+").unwrap();
    whitespace_re.replace_all(s, "").to_string()
}

/// Matches statement entries against one bank's customer directory
#[derive(Debug)]
pub struct MatchEngine<'a> {
    directory: &'a CustomerDirectory,
    /// Normalized keyword per record, in directory order
    keywords: Vec<String>,
    threshold: f64,
}

impl<'a> MatchEngine<'a> {
    /// Build an engine over a non-empty directory
    ///
    /// An empty directory means the bank filter matched nothing; refusing
    /// here keeps a misconfigured run from quietly skipping every entry.
    pub fn new(directory: &'a CustomerDirectory, threshold: f64) -> Result<Self> {
        if directory.is_empty() {
            return Err(Error::directory(
                "customer directory has no records to match against",
            ));
        }
        let keywords = directory.iter().map(|r| normalize_text(&r.keyword)).collect();
        Ok(Self {
            directory,
            keywords,
            threshold,
        })
    }

    /// Resolve every entry, in order, one result per entry
    ///
    /// Entries are expected to be zero-amount-filtered already. The prompter
    /// is only consulted for fuzzy candidates at or above the threshold.
    pub fn match_entries(
        &self,
        entries: &[StatementEntry],
        prompter: &dyn Prompter,
    ) -> Result<Vec<MatchResult>> {
        entries
            .iter()
            .map(|entry| self.resolve(entry, prompter))
            .collect()
    }

    fn resolve(&self, entry: &StatementEntry, prompter: &dyn Prompter) -> Result<MatchResult> {
        let clean = normalize_text(&entry.raw_text);

        // Exact pass: first record whose keyword appears verbatim wins.
        // Empty keywords would match every entry; the loader rejects them,
        // and they are skipped here as well.
        for (record, keyword) in self.directory.iter().zip(&self.keywords) {
            if !keyword.is_empty() && clean.contains(keyword.as_str()) {
                return Ok(MatchResult::exact(entry.clone(), record.clone()));
            }
        }

        // Fuzzy fallback: single best score across the directory. The
        // strictly-greater comparison keeps the first record of a tie.
        let mut best: Option<(&CustomerRecord, f64)> = None;
        for (record, keyword) in self.directory.iter().zip(&self.keywords) {
            let score = partial_ratio(&clean, keyword);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((record, score));
            }
        }
        // The constructor guarantees at least one record.
        let (candidate, score) = match best {
            Some(found) => found,
            None => return Ok(MatchResult::skipped(entry.clone(), None)),
        };

        if score < self.threshold {
            // Not credible enough to put in front of an operator.
            return Ok(MatchResult::skipped(entry.clone(), Some(score)));
        }

        let question = format!(
            "\"{}\" ({}) looks like {} [{}] keyword \"{}\" (score {:.1}). Accept?",
            entry.raw_text,
            entry.amount,
            candidate.display_name,
            candidate.customer_id,
            candidate.keyword,
            score
        );
        if prompter.confirm(&question)? {
            return Ok(MatchResult::fuzzy_accepted(
                entry.clone(),
                candidate.clone(),
                score,
            ));
        }

        // Declined: the operator may key in a customer id directly. Anything
        // that is not a known id skips the entry.
        let answer = prompter.ask_text("Customer id to book instead (blank to skip)")?;
        let typed = answer.unwrap_or_default();
        let typed = typed.trim();
        if !typed.is_empty() {
            if let Some(record) = self.directory.find_by_id(typed) {
                return Ok(MatchResult::manual_override(
                    entry.clone(),
                    record.clone(),
                    score,
                ));
            }
        }
        Ok(MatchResult::skipped(entry.clone(), Some(score)))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use rust_decimal::Decimal;

    use super::*;
    use crate::adapters::BatchPolicy;
    use crate::domain::MatchMethod;

    fn record(keyword: &str, id: &str, name: &str) -> CustomerRecord {
        CustomerRecord::new(keyword, id, name, "1175")
    }

    fn directory() -> CustomerDirectory {
        CustomerDirectory::new(vec![
            record("ABC Corp payment", "C100", "ABC Corporation"),
            record("XYZ Logistics", "C200", "XYZ Logistics Co"),
            record("Northwind", "C300", "Northwind Traders"),
        ])
    }

    fn entry(raw: &str) -> StatementEntry {
        StatementEntry::new(raw, Decimal::new(50000, 2)) // 500.00
    }

    /// Prompter that fails the test if the engine consults it
    struct NoPrompt;

    impl Prompter for NoPrompt {
        fn confirm(&self, question: &str) -> Result<bool> {
            panic!("unexpected confirm: {question}");
        }

        fn ask_text(&self, question: &str) -> Result<Option<String>> {
            panic!("unexpected ask_text: {question}");
        }
    }

    /// Prompter replaying pre-recorded answers
    struct Scripted {
        confirms: RefCell<VecDeque<bool>>,
        texts: RefCell<VecDeque<Option<String>>>,
    }

    impl Scripted {
        fn new(confirms: Vec<bool>, texts: Vec<Option<String>>) -> Self {
            Self {
                confirms: RefCell::new(confirms.into()),
                texts: RefCell::new(texts.into()),
            }
        }
    }

    impl Prompter for Scripted {
        fn confirm(&self, _question: &str) -> Result<bool> {
            Ok(self
                .confirms
                .borrow_mut()
                .pop_front()
                .expect("ran out of scripted confirms"))
        }

        fn ask_text(&self, _question: &str) -> Result<Option<String>> {
            Ok(self
                .texts
                .borrow_mut()
                .pop_front()
                .expect("ran out of scripted answers"))
        }
    }

    #[test]
    fn exact_match_ignores_whitespace() {
        let dir = directory();
        let engine = MatchEngine::new(&dir, DEFAULT_FUZZY_THRESHOLD).unwrap();
        let results = engine
            .match_entries(&[entry("  ABCCorppayment  ref123")], &NoPrompt)
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].method, MatchMethod::Exact);
        assert_eq!(results[0].customer.as_ref().unwrap().customer_id, "C100");
        assert_eq!(results[0].score, None);
    }

    #[test]
    fn exact_match_never_prompts() {
        let dir = directory();
        let engine = MatchEngine::new(&dir, DEFAULT_FUZZY_THRESHOLD).unwrap();
        // NoPrompt panics on any prompt; an exact hit must not reach it even
        // though another record would fuzzy-score against this text.
        let results = engine
            .match_entries(&[entry("WIRE XYZ Logistics settlement")], &NoPrompt)
            .unwrap();
        assert_eq!(results[0].customer.as_ref().unwrap().customer_id, "C200");
    }

    #[test]
    fn exact_pass_takes_first_record_in_order() {
        let dir = CustomerDirectory::new(vec![
            record("ACME", "C001", "Acme One"),
            record("ACME Ltd", "C002", "Acme Two"),
        ]);
        let engine = MatchEngine::new(&dir, DEFAULT_FUZZY_THRESHOLD).unwrap();
        // Both keywords are substrings of the text; directory order decides.
        let results = engine
            .match_entries(&[entry("payment ACME Ltd invoice 7")], &NoPrompt)
            .unwrap();
        assert_eq!(results[0].customer.as_ref().unwrap().customer_id, "C001");
    }

    #[test]
    fn fuzzy_candidate_accepted_in_batch_mode() {
        let dir = directory();
        let engine = MatchEngine::new(&dir, DEFAULT_FUZZY_THRESHOLD).unwrap();
        let results = engine
            .match_entries(&[entry("ABC Crop paymnt")], &BatchPolicy::accept_all())
            .unwrap();

        assert_eq!(results[0].method, MatchMethod::FuzzyAccepted);
        assert_eq!(results[0].customer.as_ref().unwrap().customer_id, "C100");
        let score = results[0].score.unwrap();
        assert!(score >= 80.0 && score < 100.0, "score was {score}");
    }

    #[test]
    fn fuzzy_candidate_declined_with_override() {
        let dir = directory();
        let engine = MatchEngine::new(&dir, DEFAULT_FUZZY_THRESHOLD).unwrap();
        let prompter = Scripted::new(vec![false], vec![Some("C300".to_string())]);
        let results = engine
            .match_entries(&[entry("ABC Crop paymnt")], &prompter)
            .unwrap();

        assert_eq!(results[0].method, MatchMethod::ManualOverride);
        assert_eq!(results[0].customer.as_ref().unwrap().customer_id, "C300");
    }

    #[test]
    fn fuzzy_declined_with_unknown_id_skips() {
        let dir = directory();
        let engine = MatchEngine::new(&dir, DEFAULT_FUZZY_THRESHOLD).unwrap();
        let prompter = Scripted::new(vec![false], vec![Some("C999".to_string())]);
        let results = engine
            .match_entries(&[entry("ABC Crop paymnt")], &prompter)
            .unwrap();

        assert!(results[0].is_skipped());
        assert!(results[0].customer.is_none());
    }

    #[test]
    fn fuzzy_declined_with_blank_answer_skips() {
        let dir = directory();
        let engine = MatchEngine::new(&dir, DEFAULT_FUZZY_THRESHOLD).unwrap();
        let prompter = Scripted::new(vec![false], vec![None]);
        let results = engine
            .match_entries(&[entry("ABC Crop paymnt")], &prompter)
            .unwrap();
        assert!(results[0].is_skipped());
    }

    #[test]
    fn below_threshold_skips_without_prompting() {
        let dir = directory();
        let engine = MatchEngine::new(&dir, DEFAULT_FUZZY_THRESHOLD).unwrap();
        let results = engine
            .match_entries(&[entry("totally unrelated text")], &NoPrompt)
            .unwrap();

        assert!(results[0].is_skipped());
        let score = results[0].score.unwrap();
        assert!(score < 80.0, "score was {score}");
    }

    #[test]
    fn score_equal_to_threshold_is_prompted() {
        // partial_ratio("abcd", "ac") is exactly 50.0.
        let dir = CustomerDirectory::new(vec![record("ac", "C500", "Window Case")]);
        let engine = MatchEngine::new(&dir, 50.0).unwrap();
        let results = engine
            .match_entries(&[entry("a b c d")], &BatchPolicy::accept_all())
            .unwrap();
        assert_eq!(results[0].method, MatchMethod::FuzzyAccepted);
        assert_eq!(results[0].score, Some(50.0));
    }

    #[test]
    fn score_below_threshold_by_a_point_never_prompts() {
        let dir = CustomerDirectory::new(vec![record("ac", "C500", "Window Case")]);
        let engine = MatchEngine::new(&dir, 51.0).unwrap();
        let results = engine.match_entries(&[entry("a b c d")], &NoPrompt).unwrap();
        assert!(results[0].is_skipped());
        assert_eq!(results[0].score, Some(50.0));
    }

    #[test]
    fn tied_scores_resolve_to_first_record() {
        // Identical keywords, so every window scores the same for both.
        let dir = CustomerDirectory::new(vec![
            record("ACME Ltd", "C001", "Acme One"),
            record("ACME Ltd", "C002", "Acme Two"),
        ]);
        let engine = MatchEngine::new(&dir, 80.0).unwrap();
        let results = engine
            .match_entries(&[entry("ACMELLtd")], &BatchPolicy::accept_all())
            .unwrap();
        assert_eq!(results[0].customer.as_ref().unwrap().customer_id, "C001");
    }

    #[test]
    fn batch_decline_policy_skips_candidates() {
        let dir = directory();
        let engine = MatchEngine::new(&dir, DEFAULT_FUZZY_THRESHOLD).unwrap();
        let results = engine
            .match_entries(&[entry("ABC Crop paymnt")], &BatchPolicy::decline_all())
            .unwrap();
        assert!(results[0].is_skipped());
    }

    #[test]
    fn empty_directory_is_rejected() {
        let dir = CustomerDirectory::default();
        let err = MatchEngine::new(&dir, DEFAULT_FUZZY_THRESHOLD).unwrap_err();
        assert!(matches!(err, Error::Directory(_)));
    }

    #[test]
    fn one_result_per_entry_in_order() {
        let dir = directory();
        let engine = MatchEngine::new(&dir, DEFAULT_FUZZY_THRESHOLD).unwrap();
        let entries = vec![
            entry("ABC Corp payment inv 1"),
            entry("no such counterparty"),
            entry("Northwind standing order"),
        ];
        let results = engine
            .match_entries(&entries, &BatchPolicy::decline_all())
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].entry.raw_text, "ABC Corp payment inv 1");
        assert!(results[1].is_skipped());
        assert_eq!(results[2].customer.as_ref().unwrap().customer_id, "C300");
    }

    #[test]
    fn normalize_text_strips_all_whitespace() {
        assert_eq!(normalize_text(" AB\tC\u{3000}Corp \n"), "ABCCorp");
        assert_eq!(normalize_text("already-clean"), "already-clean");
    }
}
