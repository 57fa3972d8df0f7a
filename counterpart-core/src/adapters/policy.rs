//! Non-interactive prompt policies
//!
//! Batch runs still flow through the same engine code path as interactive
//! ones; the policy just answers every prompt deterministically. Below the
//! fuzzy threshold the engine never prompts, so a policy only decides the
//! fate of candidates at or above it.

use crate::domain::result::Result;
use crate::ports::Prompter;

/// Fixed-answer prompter for unattended runs
#[derive(Debug, Clone, Copy)]
pub struct BatchPolicy {
    accept_candidates: bool,
}

impl BatchPolicy {
    /// Accept every candidate at/above threshold (the usual batch mode)
    pub fn accept_all() -> Self {
        Self {
            accept_candidates: true,
        }
    }

    /// Decline every candidate; everything the exact pass misses is skipped
    pub fn decline_all() -> Self {
        Self {
            accept_candidates: false,
        }
    }
}

impl Prompter for BatchPolicy {
    fn confirm(&self, _question: &str) -> Result<bool> {
        Ok(self.accept_candidates)
    }

    fn ask_text(&self, _question: &str) -> Result<Option<String>> {
        // A policy has no customer ids to offer; declined candidates skip.
        Ok(None)
    }
}
