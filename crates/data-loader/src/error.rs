//! Error types for the data-loader crate.
//!
//! Every failure while reading the movies/ratings tables ends up here.
//! Missing files and missing columns are fatal for the caller; there is
//! no retry path.

use thiserror::Error;

/// Errors that can occur during data loading and parsing
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open data file {path}: {source}")]
    DataNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A required column is absent from the header row
    #[error("Missing required column '{column}' in {file}")]
    Schema { file: String, column: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV reader rejected the input (ragged rows, bad UTF-8, ...)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A field in a data row couldn't be parsed
    ///
    /// `line` is the 1-based line in the source file, header included.
    #[error("Parse error at line {line} in {file}: {reason}")]
    Parse {
        file: String,
        line: u64,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
