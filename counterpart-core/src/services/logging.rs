//! Logging service - structured event logging to logs.jsonl
//!
//! Append-only JSON lines in the counterpart directory. No statement data
//! (descriptions, amounts, customer names) is ever logged, only command
//! names, bank display names and error text.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique ID based on timestamp + counter
fn generate_id() -> u64 {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64;

    // Lower 48 bits of timestamp, upper 16 bits of counter: 65536 unique
    // IDs per millisecond.
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (timestamp << 16) | counter
}

/// Current unix timestamp in milliseconds
pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

/// Detect the current platform
fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posting_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    /// Create a new log event with just an event name
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            command: None,
            bank: None,
            posting_date: None,
            error_message: None,
            error_details: None,
        }
    }

    /// Set the command context
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Set the bank context (display name, never account data)
    pub fn with_bank(mut self, bank: impl Into<String>) -> Self {
        self.bank = Some(bank.into());
        self
    }

    /// Set the posting date context
    pub fn with_posting_date(mut self, posting_date: impl Into<String>) -> Self {
        self.posting_date = Some(posting_date.into());
        self
    }

    /// Set error information
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Set error details (context chain, additional text)
    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

/// A log entry as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posting_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

/// Service for structured event logging
///
/// Appends to logs.jsonl in the counterpart directory. Unparseable lines
/// are skipped on read, so a torn write cannot poison history queries.
pub struct LoggingService {
    log_path: PathBuf,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    pub fn new(counterpart_dir: &Path, app_version: impl Into<String>) -> Self {
        Self {
            log_path: counterpart_dir.join("logs.jsonl"),
            app_version: app_version.into(),
            platform: detect_platform(),
        }
    }

    /// Record an event
    ///
    /// The app_version and platform are added from the service configuration.
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let entry = LogEntry {
            id: generate_id(),
            timestamp: now_ms(),
            app_version: self.app_version.clone(),
            platform: self.platform.to_string(),
            event: event.event,
            command: event.command,
            bank: event.bank,
            posting_date: event.posting_date,
            error_message: event.error_message,
            error_details: event.error_details,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{}", serde_json::to_string(&entry)?)?;
        Ok(())
    }

    /// Log a simple event with just a name
    pub fn log_event(&self, event: &str) -> Result<()> {
        self.log(LogEvent::new(event))
    }

    /// Log a CLI command execution
    pub fn log_command(&self, command: &str) -> Result<()> {
        self.log(LogEvent::new("command_executed").with_command(command))
    }

    /// Log an error
    pub fn log_error(&self, event: &str, message: &str, details: Option<&str>) -> Result<()> {
        let mut log_event = LogEvent::new(event).with_error(message);
        if let Some(d) = details {
            log_event = log_event.with_error_details(d);
        }
        self.log(log_event)
    }

    /// Most recent entries, newest first, up to `limit`
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let entries = self.read_entries()?;
        Ok(entries.into_iter().rev().take(limit).collect())
    }

    /// Most recent entries carrying an error, newest first
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let entries = self.read_entries()?;
        Ok(entries
            .into_iter()
            .rev()
            .filter(|e| e.error_message.is_some())
            .take(limit)
            .collect())
    }

    /// Total number of readable log entries
    pub fn count(&self) -> Result<u64> {
        Ok(self.read_entries()?.len() as u64)
    }

    /// Delete entries older than the timestamp (unix ms), returning how many
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let entries = self.read_entries()?;
        let kept: Vec<&LogEntry> = entries.iter().filter(|e| e.timestamp >= timestamp_ms).collect();
        let deleted = (entries.len() - kept.len()) as u64;
        if deleted > 0 {
            let mut content = String::new();
            for entry in &kept {
                content.push_str(&serde_json::to_string(entry)?);
                content.push('\n');
            }
            std::fs::write(&self.log_path, content)?;
        }
        Ok(deleted)
    }

    /// Path to the log file
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    fn read_entries(&self) -> Result<Vec<LogEntry>> {
        let content = match std::fs::read_to_string(&self.log_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(content
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }
}
