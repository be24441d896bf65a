//! Error types for the Valva conversion pipeline.
//!
//! This module defines the error hierarchy used across the crate:
//!
//! - [`CsvError`] - Spreadsheet reading errors
//! - [`RecordError`] - MARC record construction errors
//! - [`WriteError`] - Serialization errors (ISO 2709, MARCXML, JSON)
//! - [`TemplateError`] - Record template loading errors
//! - [`ConvertError`] - Top-level pipeline errors
//!
//! Contributor parsing and record assembly never fail; only I/O and
//! structural problems surface here. Conversion is automatic via `From`
//! implementations so `?` works across module boundaries.

use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading the spreadsheet.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the file contents.
    #[error("Failed to decode content as {0}")]
    EncodingError(String),

    /// Malformed CSV.
    #[error("Invalid CSV at line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// No header row.
    #[error("CSV file is empty")]
    EmptyFile,
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        CsvError::ParseError {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Record Errors
// =============================================================================

/// Errors while building a MARC record.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    /// Tag is not three ASCII digits.
    #[error("Invalid tag '{0}': expected three digits")]
    InvalidTag(String),

    /// Indicator is not a single ASCII character.
    #[error("Invalid indicator '{indicator}' on field {tag}")]
    InvalidIndicator { tag: String, indicator: String },

    /// Leader is not 24 characters.
    #[error("Invalid leader '{0}': expected 24 characters")]
    InvalidLeader(String),
}

// =============================================================================
// Write Errors
// =============================================================================

/// Errors while serializing records.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Underlying writer failed.
    #[error("Write failed: {0}")]
    IoError(#[from] std::io::Error),

    /// ISO 2709 encoding failed.
    #[error("MARC error: {0}")]
    Marc(#[from] mrrc::MarcError),

    /// MARCXML serialization failed.
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// MARC-in-JSON serialization failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Record exceeds the ISO 2709 length limits.
    #[error("Record too long for ISO 2709: {0} bytes")]
    RecordTooLong(usize),

    /// Single field exceeds the ISO 2709 directory limits.
    #[error("Field {tag} too long for ISO 2709: {length} bytes")]
    FieldTooLong { tag: String, length: usize },

    /// Writer used after `finish`.
    #[error("Writer already finished")]
    Finished,
}

// =============================================================================
// Template Errors
// =============================================================================

/// Errors while loading a record template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// IO error.
    #[error("Template IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Template JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A template value is unusable.
    #[error("Invalid template: {0}")]
    Invalid(String),
}

// =============================================================================
// Convert Errors (top-level)
// =============================================================================

/// Top-level conversion errors.
///
/// This is the error type returned by [`crate::transform::pipeline::convert`].
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Spreadsheet error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Serialization error.
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// Template error.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Record construction error.
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Output directory could not be prepared.
    #[error("Cannot prepare output directory {path}: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for record construction.
pub type RecordResult<T> = Result<T, RecordError>;

/// Result type for writers.
pub type WriteResult<T> = Result<T, WriteError>;

/// Result type for the conversion pipeline.
pub type ConvertResult<T> = Result<T, ConvertError>;
