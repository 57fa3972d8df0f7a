//! Integration tests for counterpart-core services
//!
//! These tests drive the full pipeline through `CounterpartContext` with
//! real files in a temp directory: statement CSVs in, voucher CSVs out.
//! Prompts are answered by policies or scripted doubles, never a terminal.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use counterpart_core::adapters::BatchPolicy;
use counterpart_core::domain::result::Result as PromptResult;
use counterpart_core::ports::Prompter;
use counterpart_core::CounterpartContext;

// ============================================================================
// Test Helpers
// ============================================================================

const CUSTOMERS: &str = "\
bank,keyword,customer_id,display_name,gl_account,posting_code
Citi Main NTD 0005 receivables,ABC Corp payment,C100,ABC Corporation,1175,H01
Citi Main NTD 0005 receivables,XYZ Logistics,C200,XYZ Logistics Co,1175,H02
Citi Main NTD 0005 receivables,Northwind,C300,Northwind Traders,1175,H03
Mega Hsinchu NTD 2656 receivables,Unrelated Corp,C900,Unrelated Corp,1175,H09
";

/// Write the customer reference table into the app directory
fn write_customers(app_dir: &Path) {
    std::fs::write(app_dir.join("customers.csv"), CUSTOMERS).unwrap();
}

/// Write a Citi-shaped statement: two "Transaction Details" sections where
/// only the second holds line items, with a sub-header row before the data
fn write_citi_statement(path: &Path, rows: &[(&str, &str)]) {
    let mut content = String::new();
    content.push_str("Citibank Taiwan Daily Report,,,,,,\n");
    content.push_str(",,,,Transaction Details,,\n");
    content.push_str(",,,,Account Summary Total,,\"12,345.00\"\n");
    content.push_str(",,,,Transaction Details,,\n");
    content.push_str("Date,Ref,,,Description,,Credit\n");
    for (desc, amount) in rows {
        content.push_str(&format!(",,,,{desc},,{amount}\n"));
    }
    content.push_str(",,,,,,\n");
    content.push_str("End of Report,,,,,,\n");
    std::fs::write(path, content).unwrap();
}

/// Context over a temp app directory with the standard customer table
fn context(dir: &TempDir) -> CounterpartContext {
    write_customers(dir.path());
    CounterpartContext::new(dir.path()).unwrap()
}

fn voucher_file(dir: &TempDir) -> PathBuf {
    dir.path().join("vouchers/vouchers-20250625.csv")
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
    fn confirm(&self, _question: &str) -> PromptResult<bool> {
        Ok(self
            .confirms
            .borrow_mut()
            .pop_front()
            .expect("ran out of scripted confirms"))
    }

    fn ask_text(&self, _question: &str) -> PromptResult<Option<String>> {
        Ok(self
            .texts
            .borrow_mut()
            .pop_front()
            .expect("ran out of scripted answers"))
    }
}

// ============================================================================
// End-to-End Reconcile
// ============================================================================

/// Test the full pipeline: detect, extract, match, persist, audit
#[test]
fn test_full_run_writes_vouchers_and_audit() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    let statement = dir.path().join("citi-20250625.csv");
    write_citi_statement(
        &statement,
        &[
            ("ABC Corp payment inv 9", "\"1,500.00\""),
            ("unmatched mystery wire", "300.00"),
            ("XYZ Logistics settle", "200.00"),
        ],
    );

    let report = ctx
        .reconcile_service
        .run(
            &[statement],
            "20250625",
            &BatchPolicy::decline_all(),
            false,
        )
        .unwrap();

    assert_eq!(report.files.len(), 1);
    let file = &report.files[0];
    assert_eq!(file.bank.as_deref(), Some("Citi Main NTD 0005"));
    assert_eq!(file.extracted, 3);
    assert_eq!(file.exact, 2);
    assert_eq!(file.skipped, 1);
    assert_eq!(file.written, 2);

    let vouchers = std::fs::read_to_string(voucher_file(&dir)).unwrap();
    assert!(vouchers.contains("C100"));
    assert!(vouchers.contains("1500.00"));
    assert!(vouchers.contains("06.25 ABC Corporation suspense receipt"));
    assert!(vouchers.contains("posting_code=H01"));
    assert!(vouchers.contains("Citi Main NTD 0005"));

    let audit =
        std::fs::read_to_string(dir.path().join("vouchers/skipped-20250625.csv")).unwrap();
    assert!(audit.contains("unmatched mystery wire"));
    assert!(audit.contains("300.00"));
}

/// Test that running the same statement twice writes nothing the second time
#[test]
fn test_second_run_writes_nothing_new() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    let statement = dir.path().join("citi-20250625.csv");
    write_citi_statement(
        &statement,
        &[
            ("ABC Corp payment inv 9", "500.00"),
            ("XYZ Logistics settle", "200.00"),
        ],
    );
    let files = [statement];

    let first = ctx
        .reconcile_service
        .run(&files, "20250625", &BatchPolicy::decline_all(), false)
        .unwrap();
    assert_eq!(first.total_written(), 2);

    let second = ctx
        .reconcile_service
        .run(&files, "20250625", &BatchPolicy::decline_all(), false)
        .unwrap();
    assert_eq!(second.total_written(), 0);
    assert_eq!(second.total_suppressed(), 2);
    assert_eq!(second.prior_keys, 2);

    let vouchers = std::fs::read_to_string(voucher_file(&dir)).unwrap();
    assert_eq!(vouchers.lines().count(), 3); // header + 2 rows, once
}

/// Test that two same-amount receipts from one customer both survive a re-run
#[test]
fn test_same_day_repeats_survive_rerun() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    let statement = dir.path().join("citi-20250625.csv");
    write_citi_statement(
        &statement,
        &[
            ("ABC Corp payment morning", "500.00"),
            ("ABC Corp payment evening", "500.00"),
        ],
    );
    let files = [statement];

    let first = ctx
        .reconcile_service
        .run(&files, "20250625", &BatchPolicy::decline_all(), false)
        .unwrap();
    // Same customer, same amount, twice in one run: both are real.
    assert_eq!(first.total_written(), 2);

    let second = ctx
        .reconcile_service
        .run(&files, "20250625", &BatchPolicy::decline_all(), false)
        .unwrap();
    assert_eq!(second.total_written(), 0);

    let vouchers = std::fs::read_to_string(voucher_file(&dir)).unwrap();
    assert_eq!(vouchers.matches("C100").count(), 2);
}

/// Test that a corrected statement re-run adds only the rows it gained
#[test]
fn test_continuation_file_adds_only_new_rows() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    let morning = dir.path().join("citi-morning.csv");
    write_citi_statement(&morning, &[("ABC Corp payment inv 9", "500.00")]);
    ctx.reconcile_service
        .run(
            &[morning],
            "20250625",
            &BatchPolicy::decline_all(),
            false,
        )
        .unwrap();

    // The afternoon export repeats the morning entry and adds one.
    let afternoon = dir.path().join("citi-afternoon.csv");
    write_citi_statement(
        &afternoon,
        &[
            ("ABC Corp payment inv 9", "500.00"),
            ("Northwind standing order", "800.00"),
        ],
    );
    let report = ctx
        .reconcile_service
        .run(
            &[afternoon],
            "20250625",
            &BatchPolicy::decline_all(),
            false,
        )
        .unwrap();

    assert_eq!(report.total_written(), 1);
    assert_eq!(report.total_suppressed(), 1);

    let vouchers = std::fs::read_to_string(voucher_file(&dir)).unwrap();
    assert_eq!(vouchers.matches("C100").count(), 1);
    assert_eq!(vouchers.matches("C300").count(), 1);
}

// ============================================================================
// Fuzzy and Manual Flows
// ============================================================================

/// Test that a batch-accepted fuzzy candidate lands in the voucher file
#[test]
fn test_fuzzy_acceptance_end_to_end() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    let statement = dir.path().join("citi-20250625.csv");
    write_citi_statement(&statement, &[("ABC Crop paymnt", "120.00")]);

    let report = ctx
        .reconcile_service
        .run(&[statement], "20250625", &BatchPolicy::accept_all(), false)
        .unwrap();

    assert_eq!(report.files[0].fuzzy_accepted, 1);
    let vouchers = std::fs::read_to_string(voucher_file(&dir)).unwrap();
    assert!(vouchers.contains("fuzzy_accepted"));
    assert!(vouchers.contains("C100"));
}

/// Test that declining a candidate and typing a customer id books that customer
#[test]
fn test_operator_override_books_typed_customer() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    let statement = dir.path().join("citi-20250625.csv");
    write_citi_statement(&statement, &[("ABC Crop paymnt", "120.00")]);

    let prompter = Scripted::new(vec![false], vec![Some("C300".to_string())]);
    let report = ctx
        .reconcile_service
        .run(&[statement], "20250625", &prompter, false)
        .unwrap();

    assert_eq!(report.files[0].manual_override, 1);
    let vouchers = std::fs::read_to_string(voucher_file(&dir)).unwrap();
    assert!(vouchers.contains("C300"));
    assert!(vouchers.contains("manual_override"));
    assert!(vouchers.contains("06.25 Northwind Traders suspense receipt"));
}

// ============================================================================
// Settings and Formats
// ============================================================================

/// Test that a bank registered in settings.json is usable end to end
#[test]
fn test_settings_register_extra_bank() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{
            "banks": [{
                "token": "hsbc",
                "displayName": "HSBC Main NTD 1234",
                "headerMarker": "Particulars",
                "descriptionColumn": 1,
                "amountColumn": 2
            }]
        }"#,
    )
    .unwrap();
    let customers = format!(
        "{CUSTOMERS}HSBC Main NTD 1234 receivables,ABC Corp payment,C100,ABC Corporation,1175,H01\n"
    );
    std::fs::write(dir.path().join("customers.csv"), customers).unwrap();
    let ctx = CounterpartContext::new(dir.path()).unwrap();

    let statement = dir.path().join("hsbc-20250625.csv");
    std::fs::write(
        &statement,
        "HSBC Daily,,\nNo,Particulars,Credit\n1,ABC Corp payment inv 3,640.00\n",
    )
    .unwrap();

    let report = ctx
        .reconcile_service
        .run(
            &[statement],
            "20250625",
            &BatchPolicy::decline_all(),
            false,
        )
        .unwrap();

    assert_eq!(report.files[0].written, 1);
}

/// Test that a raised threshold turns a would-be candidate into a skip
#[test]
fn test_high_threshold_skips_fuzzy_candidates() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{ "matching": { "fuzzyThreshold": 99.0 } }"#,
    )
    .unwrap();
    let ctx = context(&dir);

    let statement = dir.path().join("citi-20250625.csv");
    write_citi_statement(&statement, &[("ABC Crop paymnt", "120.00")]);

    // accept_all would take any candidate it is shown; at threshold 99 the
    // engine never shows one.
    let report = ctx
        .reconcile_service
        .run(&[statement], "20250625", &BatchPolicy::accept_all(), false)
        .unwrap();

    assert_eq!(report.files[0].fuzzy_accepted, 0);
    assert_eq!(report.files[0].skipped, 1);
    assert_eq!(report.total_written(), 0);
}

// ============================================================================
// Failure Containment
// ============================================================================

/// Test that a missing customer table fails the file, not the run
#[test]
fn test_missing_customer_table_is_contained() {
    let dir = TempDir::new().unwrap();
    // No customers.csv written.
    let ctx = CounterpartContext::new(dir.path()).unwrap();

    let statement = dir.path().join("citi-20250625.csv");
    write_citi_statement(&statement, &[("ABC Corp payment inv 9", "500.00")]);

    let report = ctx
        .reconcile_service
        .run(
            &[statement],
            "20250625",
            &BatchPolicy::decline_all(),
            false,
        )
        .unwrap();

    assert_eq!(report.failed_files(), 1);
    assert!(report.files[0]
        .error
        .as_ref()
        .unwrap()
        .contains("customer table"));
    assert!(!dir.path().join("vouchers").exists());
}
