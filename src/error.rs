use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur while the
/// tool reads the spreadsheet, downloads media, or writes the export.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the run report cannot be serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the spreadsheet reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Errors bubbled up from the CSV writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    NotFound(PathBuf),

    /// Raised when the workbook does not contain a single worksheet.
    #[error("workbook has no worksheet: {0}")]
    EmptyWorkbook(PathBuf),

    /// Raised when a configuration value is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Raised when a download answers with anything but `200 OK`.
    #[error("download of {url} failed with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    /// Raised when the connection or the body stream of a download fails.
    #[error("transport error while downloading {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
