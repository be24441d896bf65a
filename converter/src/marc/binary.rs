//! ISO 2709 (MARC 21 transmission format) output through `mrrc`.
//!
//! Records are converted to [`mrrc::Record`] and encoded by
//! [`mrrc::MarcWriter`], which computes the directory and the leader
//! offsets. Lengths are checked first so an oversized record is refused
//! before any byte of it reaches the output.

use std::io::Write;

use super::record::{Field, Record, LEADER_LEN};
use super::RecordWriter;
use crate::error::{WriteError, WriteResult};

const DIRECTORY_ENTRY_LEN: usize = 12;
const MAX_FIELD_LEN: usize = 9_999;
const MAX_RECORD_LEN: usize = 99_999;

/// Streams records as ISO 2709 binary.
pub struct MarcWriter<W: Write> {
    inner: W,
    finished: bool,
}

impl<W: Write> MarcWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, finished: false }
    }
}

impl<W: Write> RecordWriter for MarcWriter<W> {
    fn write_record(&mut self, record: &Record) -> WriteResult<()> {
        if self.finished {
            return Err(WriteError::Finished);
        }
        let bytes = encode_record(record)?;
        self.inner.write_all(&bytes)?;
        Ok(())
    }

    fn finish(&mut self) -> WriteResult<()> {
        if !self.finished {
            self.finished = true;
            self.inner.flush()?;
        }
        Ok(())
    }
}

/// Encode one record.
///
/// Leader position 9 is set to `a` since data is UTF-8.
pub fn encode_record(record: &Record) -> WriteResult<Vec<u8>> {
    check_lengths(record)?;
    let marc = to_marc_record(record)?;

    let mut out = Vec::new();
    mrrc::MarcWriter::new(&mut out).write_record(&marc)?;
    Ok(out)
}

/// Convert to an `mrrc` record, preserving field order.
pub fn to_marc_record(record: &Record) -> WriteResult<mrrc::Record> {
    let mut leader = record.leader().as_bytes().to_vec();
    leader[9] = b'a';
    let mut marc = mrrc::Record::new(mrrc::Leader::from_bytes(&leader)?);

    for field in record.fields() {
        match field {
            Field::Control { tag, value } => {
                marc.add_control_field(tag.clone(), value.clone());
            }
            Field::Data { tag, ind1, ind2, subfields } => {
                let mut data = mrrc::Field::new(tag.clone(), *ind1, *ind2);
                for sf in subfields {
                    data.add_subfield(sf.code, sf.value.clone());
                }
                marc.add_field(data);
            }
        }
    }
    Ok(marc)
}

/// Check the ISO 2709 length limits: 4 digits per field, 5 per record.
pub fn check_lengths(record: &Record) -> WriteResult<()> {
    let mut data_len = 0;
    for field in record.fields() {
        let len = field_len(field);
        if len > MAX_FIELD_LEN {
            return Err(WriteError::FieldTooLong {
                tag: field.tag().to_string(),
                length: len,
            });
        }
        data_len += len;
    }

    // leader, directory and its terminator, data, record terminator
    let record_len = LEADER_LEN + record.fields().len() * DIRECTORY_ENTRY_LEN + 1 + data_len + 1;
    if record_len > MAX_RECORD_LEN {
        return Err(WriteError::RecordTooLong(record_len));
    }
    Ok(())
}

/// Encoded length in bytes, field terminator included.
fn field_len(field: &Field) -> usize {
    match field {
        Field::Control { value, .. } => value.len() + 1,
        Field::Data { ind1, ind2, subfields, .. } => {
            let body: usize = subfields
                .iter()
                .map(|sf| 1 + sf.code.len_utf8() + sf.value.len())
                .sum();
            ind1.len_utf8() + ind2.len_utf8() + body + 1
        }
    }
}
