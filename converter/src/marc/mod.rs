//! MARC 21 record model and serializations.
//!
//! - [`record`] - `Record`, `Field`, `Subfield`
//! - [`binary`] - ISO 2709 writer (`.mrc`), encoded by `mrrc`
//! - [`xml`] - MARCXML writer
//! - [`json`] - MARC-in-JSON writer
//!
//! All writers implement [`RecordWriter`]. A writer owns its output and must
//! be finished to flush trailing markup; writers with a closing element
//! also close it when dropped unfinished.

pub mod binary;
pub mod json;
pub mod record;
pub mod xml;

pub use binary::{check_lengths, MarcWriter};
pub use json::{record_to_json, JsonWriter};
pub use record::{Field, Record, Subfield, LEADER_LEN};
pub use xml::XmlWriter;

use crate::error::WriteResult;

/// A sink for MARC records in one serialization.
pub trait RecordWriter {
    /// Serialize one record.
    fn write_record(&mut self, record: &Record) -> WriteResult<()>;

    /// Write any trailing markup and flush. Further writes fail.
    fn finish(&mut self) -> WriteResult<()>;
}

impl<T: RecordWriter + ?Sized> RecordWriter for Box<T> {
    fn write_record(&mut self, record: &Record) -> WriteResult<()> {
        (**self).write_record(record)
    }

    fn finish(&mut self) -> WriteResult<()> {
        (**self).finish()
    }
}
