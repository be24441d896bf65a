//! MARC-in-JSON writer.
//!
//! ```text
//! {"leader": "...", "fields": [{"008": "..."},
//!   {"245": {"ind1": "1", "ind2": "0", "subfields": [{"a": "..."}]}}]}
//! ```

use serde_json::{json, Map, Value};
use std::io::Write;

use super::record::{Field, Record};
use super::RecordWriter;
use crate::error::{WriteError, WriteResult};

/// Convert a record to its MARC-in-JSON value.
pub fn record_to_json(record: &Record) -> Value {
    let fields: Vec<Value> = record
        .fields()
        .iter()
        .map(|field| {
            let body = match field {
                Field::Control { value, .. } => json!(value),
                Field::Data { ind1, ind2, subfields, .. } => {
                    let subfields: Vec<Value> = subfields
                        .iter()
                        .map(|sf| {
                            let mut obj = Map::new();
                            obj.insert(sf.code.to_string(), json!(sf.value));
                            Value::Object(obj)
                        })
                        .collect();
                    json!({
                        "ind1": ind1.to_string(),
                        "ind2": ind2.to_string(),
                        "subfields": subfields,
                    })
                }
            };
            let mut obj = Map::new();
            obj.insert(field.tag().to_string(), body);
            Value::Object(obj)
        })
        .collect();

    json!({
        "leader": record.leader(),
        "fields": fields,
    })
}

/// Streams records as a JSON array.
pub struct JsonWriter<W: Write> {
    inner: W,
    count: usize,
    finished: bool,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, count: 0, finished: false }
    }

    fn close(&mut self) -> WriteResult<()> {
        self.finished = true;
        if self.count == 0 {
            self.inner.write_all(b"[")?;
        }
        self.inner.write_all(b"\n]\n")?;
        self.inner.flush()?;
        Ok(())
    }
}

impl<W: Write> RecordWriter for JsonWriter<W> {
    fn write_record(&mut self, record: &Record) -> WriteResult<()> {
        if self.finished {
            return Err(WriteError::Finished);
        }
        let sep: &[u8] = if self.count == 0 { b"[\n" } else { b",\n" };
        self.inner.write_all(sep)?;
        serde_json::to_writer(&mut self.inner, &record_to_json(record))?;
        self.count += 1;
        Ok(())
    }

    fn finish(&mut self) -> WriteResult<()> {
        if self.finished {
            return Ok(());
        }
        self.close()
    }
}

impl<W: Write> Drop for JsonWriter<W> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.close();
        }
    }
}
