//! Terminal prompt adapter backed by dialoguer
//!
//! The match engine talks to a `Prompter`; this is the interactive one.
//! Declining is the default answer, so Enter on a shaky candidate skips it.

use dialoguer::{Confirm, Input};

use counterpart_core::domain::result::{Error, Result};
use counterpart_core::ports::Prompter;

pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
            .map_err(|e| Error::prompt(e.to_string()))
    }

    fn ask_text(&self, question: &str) -> Result<Option<String>> {
        let answer: String = Input::new()
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::prompt(e.to_string()))?;
        let answer = answer.trim().to_string();
        Ok(if answer.is_empty() { None } else { Some(answer) })
    }
}
