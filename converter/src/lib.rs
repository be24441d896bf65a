//! # Valva - spreadsheet to MARC 21 conversion
//!
//! Converts the inventory spreadsheet of the Fred D. Valva collection of
//! silent film and vaudeville orchestra music into MARC 21 bibliographic
//! records, written as ISO 2709 and MARCXML (and optionally MARC-in-JSON).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV File   │────▶│   Parser    │────▶│  Assemble   │────▶│ .mrc / .xml │
//! │ (ISO/UTF8)  │     │ (auto-enc)  │     │ (template)  │     │   (.json)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use valva::{convert, ConvertOptions};
//!
//! let report = convert("valva.csv".as_ref(), &ConvertOptions::default()).unwrap();
//! println!("Converted {} records", report.stats.written);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`logs`] - Leveled log helpers
//! - [`models`] - Sheet row, roles, headings
//! - [`parser`] - CSV reading with auto-detection
//! - [`marc`] - MARC record model and writers
//! - [`transform`] - Contributors, template, assembly, pipeline
//! - [`validation`] - MARC-in-JSON schema validation

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Parsing
pub mod parser;

// MARC
pub mod marc;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConvertError, CsvError, RecordError, TemplateError, WriteError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Heading, Role, SheetRow};

// =============================================================================
// Re-exports - MARC
// =============================================================================

pub use marc::{Field, JsonWriter, MarcWriter, Record, RecordWriter, Subfield, XmlWriter};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    assemble, build_contributors, convert, convert_rows, Assembled, ContributorField,
    ConvertOptions, ConvertReport, EntryIssue, RecordTemplate, RowStats, RowWarning,
};

// =============================================================================
// Re-exports - Parsing & Validation
// =============================================================================

pub use parser::{parse_bytes, parse_csv_file, ParseResult};
pub use validation::{is_valid_marc_record, validate_marc_record};
