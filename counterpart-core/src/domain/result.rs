//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a directory error
    pub fn directory(msg: impl Into<String>) -> Self {
        Self::Directory(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an output error
    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }

    /// Create a prompt error
    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::Prompt(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::parse("no header row");
        assert_eq!(err.to_string(), "Parse error: no header row");

        let err = Error::directory("no rows for bank 'Citi'");
        assert!(err.to_string().contains("Directory error"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
