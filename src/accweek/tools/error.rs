use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads extracts, aggregates them, or emits summaries.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the CSV reader, including invalid UTF-8 and
    /// ragged rows.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when the configuration file is not valid TOML or does not match
    /// the expected layout.
    #[error("invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Raised when configuration values are individually valid TOML but
    /// semantically unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raised when an extract lacks one of the expected columns.
    #[error("missing column '{0}'")]
    MissingColumn(String),

    /// Raised when an amount cell is neither blank nor a number.
    #[error("invalid amount '{value}' on line {line}")]
    InvalidAmount { line: u64, value: String },

    /// Raised when a month label is not in `YYYY.MM` (or `YY.MM`) form.
    #[error("invalid month label '{0}'")]
    InvalidMonth(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a summary cannot be persisted. Always fatal.
    #[error("failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
