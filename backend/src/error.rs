//! Error types for the trackdb normalization pipeline.
//!
//! - [`CsvError`] - source CSV reading and decoding errors
//! - [`EmitError`] - CSV export and SQL script writing errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Data-quality problems (null keys, duplicates, unparseable numbers) are
//! never errors: the normalizer filters them and counts them instead.
//! Only unreadable input and unwritable output end a run.

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors while reading the source table.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the input bytes.
    #[error("Failed to decode input: {0}")]
    Encoding(String),

    /// Malformed CSV record.
    #[error("Invalid CSV at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// A required source column is absent from the header.
    #[error("Missing source column: {0}")]
    MissingColumn(String),
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        match err.into_kind() {
            csv::ErrorKind::Io(e) => CsvError::Io(e),
            kind => CsvError::Parse {
                line,
                message: format!("{:?}", kind),
            },
        }
    }
}

// =============================================================================
// Emitter Errors
// =============================================================================

/// Errors while writing normalized tables or the SQL script.
#[derive(Debug, Error)]
pub enum EmitError {
    /// Output stream failed.
    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::transform::pipeline::normalize_file`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Output could not be written.
    #[error("Output error: {0}")]
    Emit(#[from] EmitError),

    /// Output directory could not be prepared.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for emitter operations.
pub type EmitResult<T> = Result<T, EmitError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
