//! Counterpart Core - Business logic for bank receipt reconciliation
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (StatementEntry, CustomerRecord, etc.)
//! - **ports**: Trait definitions for external dependencies (Prompter)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (batch prompt policy)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;

mod similarity;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{
    CustomerDirectory, CustomerRecord, DuplicateLedger, MatchMethod, MatchResult, PostingKey,
    StatementEntry,
};

/// Main context for counterpart operations
///
/// This is the primary entry point for all business logic. It holds the
/// configuration and all services, wired against one counterpart directory.
pub struct CounterpartContext {
    pub config: Config,
    pub statement_service: Arc<StatementService>,
    pub directory_service: Arc<DirectoryService>,
    pub output_service: Arc<OutputService>,
    pub reconcile_service: ReconcileService,
}

impl CounterpartContext {
    /// Create a context from the directory's settings file
    pub fn new(counterpart_dir: &Path) -> Result<Self> {
        let config = Config::load(counterpart_dir)?;
        Ok(Self::with_config(counterpart_dir, config))
    }

    /// Create a context from an already-resolved configuration
    ///
    /// Used when command-line flags override settings before wiring.
    pub fn with_config(counterpart_dir: &Path, config: Config) -> Self {
        let statement_service = Arc::new(StatementService::new(config.bank_formats()));
        let directory_service = Arc::new(DirectoryService::new(
            config.customers_path(counterpart_dir),
        ));
        let output_service = Arc::new(OutputService::new(config.vouchers_dir(counterpart_dir)));
        let reconcile_service = ReconcileService::new(
            Arc::clone(&statement_service),
            Arc::clone(&directory_service),
            Arc::clone(&output_service),
            config.fuzzy_threshold,
        );

        Self {
            config,
            statement_service,
            directory_service,
            output_service,
            reconcile_service,
        }
    }
}
