//! Configuration management
//!
//! settings.json format:
//! ```json
//! {
//!   "matching": { "fuzzyThreshold": 80.0 },
//!   "paths": { "customersFile": "...", "outputDir": "..." },
//!   "banks": [ { "token": "citi", ... } ]
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Layout description for one bank's statement export
///
/// The statement service consumes a table of these; everything bank-specific
/// about extraction lives here, nothing in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankFormat {
    /// Filename token that selects this format, matched case-insensitively
    /// against the statement's filename stem
    pub token: String,
    /// Bank text as it appears in the customer table's bank column
    pub display_name: String,
    /// Cell text marking the header row of the transaction block
    pub header_marker: String,
    /// Zero-based column holding descriptions (and the header marker)
    pub description_column: usize,
    /// Zero-based column holding amounts
    pub amount_column: usize,
    /// Which marker occurrence anchors the block, 1-based. Some exports
    /// repeat the marker in a summary section above the real block; clamped
    /// down when a sheet has fewer occurrences.
    #[serde(default = "default_marker_occurrence")]
    pub marker_occurrence: usize,
    /// Data rows begin this many rows below the header row
    #[serde(default = "default_data_offset")]
    pub data_offset: usize,
}

fn default_marker_occurrence() -> usize {
    1
}

fn default_data_offset() -> usize {
    1
}

/// Formats for the banks the back office reconciles today
///
/// Markers and columns mirror each bank's CSV export layout; new banks are
/// added through settings.json rather than code.
pub fn builtin_formats() -> Vec<BankFormat> {
    vec![
        BankFormat {
            token: "citi".to_string(),
            display_name: "Citi Main NTD 0005".to_string(),
            header_marker: "Transaction Details".to_string(),
            description_column: 4,
            amount_column: 6,
            // The export repeats the marker in its summary banner; the
            // second occurrence is the real table.
            marker_occurrence: 2,
            data_offset: 2,
        },
        BankFormat {
            token: "ctbc".to_string(),
            display_name: "CTBC Main NTD 0800".to_string(),
            header_marker: "Remarks".to_string(),
            description_column: 9,
            amount_column: 4,
            marker_occurrence: 1,
            data_offset: 1,
        },
        BankFormat {
            token: "mega".to_string(),
            display_name: "Mega Hsinchu NTD 2656".to_string(),
            header_marker: "Summary".to_string(),
            description_column: 5,
            amount_column: 3,
            marker_occurrence: 1,
            data_offset: 1,
        },
        BankFormat {
            token: "fubon".to_string(),
            display_name: "Fubon Renai NTD 6332".to_string(),
            header_marker: "Memo".to_string(),
            description_column: 6,
            amount_column: 4,
            marker_occurrence: 1,
            data_offset: 1,
        },
        BankFormat {
            token: "sinopac".to_string(),
            display_name: "SinoPac Downtown NTD 7978".to_string(),
            header_marker: "Narrative".to_string(),
            description_column: 7,
            amount_column: 5,
            marker_occurrence: 1,
            data_offset: 1,
        },
        BankFormat {
            token: "esun".to_string(),
            display_name: "E.Sun Main NTD 8563".to_string(),
            header_marker: "Description".to_string(),
            description_column: 3,
            amount_column: 2,
            marker_occurrence: 1,
            data_offset: 1,
        },
    ]
}

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    matching: MatchingSettings,
    #[serde(default)]
    paths: PathSettings,
    #[serde(default)]
    banks: Vec<BankFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchingSettings {
    #[serde(default = "default_threshold")]
    fuzzy_threshold: f64,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_threshold(),
            other: HashMap::new(),
        }
    }
}

fn default_threshold() -> f64 {
    crate::services::DEFAULT_FUZZY_THRESHOLD
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PathSettings {
    #[serde(default)]
    customers_file: Option<PathBuf>,
    #[serde(default)]
    output_dir: Option<PathBuf>,
}

/// Counterpart configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    /// Fuzzy acceptance threshold, 0..100
    pub fuzzy_threshold: f64,
    /// Customer reference table; defaults to customers.csv in the app dir
    pub customers_file: Option<PathBuf>,
    /// Voucher/audit output directory; defaults to vouchers/ in the app dir
    pub output_dir: Option<PathBuf>,
    /// Formats registered on top of the built-in bank table
    pub extra_formats: Vec<BankFormat>,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_threshold(),
            customers_file: None,
            output_dir: None,
            extra_formats: Vec::new(),
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the app directory
    pub fn load(app_dir: &Path) -> Result<Self> {
        let settings_path = app_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        Ok(Self {
            fuzzy_threshold: raw.matching.fuzzy_threshold,
            customers_file: raw.paths.customers_file.clone(),
            output_dir: raw.paths.output_dir.clone(),
            extra_formats: raw.banks.clone(),
            _raw_settings: raw,
        })
    }

    /// Save config to the app directory
    /// Preserves settings the CLI doesn't manage
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let settings_path = app_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.matching.fuzzy_threshold = self.fuzzy_threshold;
        settings.paths.customers_file = self.customers_file.clone();
        settings.paths.output_dir = self.output_dir.clone();
        settings.banks = self.extra_formats.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// All registered formats: built-ins first, then settings extras
    pub fn bank_formats(&self) -> Vec<BankFormat> {
        let mut formats = builtin_formats();
        formats.extend(self.extra_formats.iter().cloned());
        formats
    }

    /// Customer reference table path, resolved against the app dir default
    pub fn customers_path(&self, app_dir: &Path) -> PathBuf {
        self.customers_file
            .clone()
            .unwrap_or_else(|| app_dir.join("customers.csv"))
    }

    /// Output directory, resolved against the app dir default
    pub fn vouchers_dir(&self, app_dir: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| app_dir.join("vouchers"))
    }
}
