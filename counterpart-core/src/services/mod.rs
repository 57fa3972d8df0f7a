//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific step of the reconcile pipeline.

mod directory;
pub mod logging;
mod matching;
mod output;
mod reconcile;
mod statement;

pub use directory::DirectoryService;
pub use logging::{LogEntry, LogEvent, LoggingService};
pub use matching::{MatchEngine, DEFAULT_FUZZY_THRESHOLD};
pub use output::{LedgerScan, OutputService};
pub use reconcile::{FileReport, ReconcileService, RunReport};
pub use statement::StatementService;
