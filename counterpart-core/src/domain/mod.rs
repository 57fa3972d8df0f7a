//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod customer;
mod entry;
mod ledger;
mod matching;
pub mod result;

pub use customer::{CustomerDirectory, CustomerRecord};
pub use entry::StatementEntry;
pub use ledger::{DuplicateLedger, PostingKey};
pub use matching::{MatchMethod, MatchResult};
pub use result::{Error, Result};
