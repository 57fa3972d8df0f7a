//! Prompt port - operator interaction abstraction

use crate::domain::result::Result;

/// Operator prompt abstraction
///
/// The match engine is the only caller and it only ever needs two shapes of
/// answer, so the trait stays deliberately narrow. Implementations decide the
/// transport: a terminal adapter, a batch policy, or a scripted test double.
/// Calls are synchronous; the engine blocks until an answer arrives.
pub trait Prompter {
    /// Ask a yes/no question. The question text already contains everything
    /// the operator needs (candidate, score); the answer is just the verdict.
    fn confirm(&self, question: &str) -> Result<bool>;

    /// Ask for free text. `None` or an empty string both mean "no answer",
    /// which callers treat as a skip.
    fn ask_text(&self, question: &str) -> Result<Option<String>>;
}
