//! I/O error types for nimbus-io.

use std::path::PathBuf;

use nimbus_sky::SkyError;

/// Errors from file I/O, CSV parsing, and label serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the header has no usable timestamp representation.
    #[error(
        "expected a column \"times\" with the UTC row timestamps or, alternatively, \
         the columns \"Year\", \"Month\", \"Day\", \"Hour\", \"Minute\", \"Second\""
    )]
    NoTimestampColumns,

    /// Returned when required data columns are absent. Names every missing column.
    #[error("missing required columns: {}", columns.join(", "))]
    MissingColumns {
        /// Names of all absent required columns.
        columns: Vec<String>,
    },

    /// Returned when a timestamp cell cannot be parsed.
    #[error("invalid timestamp in {path}: row {row_index}, raw value \"{raw}\"")]
    InvalidTimestamp {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when a data cell is neither a float nor an empty/NaN marker.
    #[error("invalid value in {path}: row {row_index}, column \"{column}\", raw value \"{raw}\"")]
    InvalidValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Name of the offending column.
        column: String,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when the parsed table does not form a valid irradiance series.
    #[error("invalid series: {0}")]
    InvalidSeries(#[from] SkyError),

    /// Returned when the output file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
