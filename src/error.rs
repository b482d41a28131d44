use thiserror::Error;

/// Main error type for frontkg
#[derive(Error, Debug)]
pub enum KgError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chat completion API errors
    #[error("LLM API error: {0}")]
    Llm(String),

    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using KgError
pub type Result<T> = std::result::Result<T, KgError>;
