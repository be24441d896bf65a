//! Transformation module.
//!
//! This module turns spreadsheet rows into MARC records:
//! - Contributors: personal-name headings from contributor cells
//! - Template: per-record constants
//! - Assemble: one row to one record
//! - Pipeline: file in, MARC files out

pub mod assemble;
pub mod contributors;
pub mod pipeline;
pub mod template;

pub use assemble::{assemble, Assembled, RowWarning};
pub use contributors::{build as build_contributors, ContributorField, EntryIssue};
pub use pipeline::*;
pub use template::{FixedField, FixedFieldCodes, RecordTemplate};
