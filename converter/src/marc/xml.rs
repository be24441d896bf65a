//! MARCXML writer (MARC 21 slim schema).

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

use super::record::{Field, Record};
use super::RecordWriter;
use crate::error::{WriteError, WriteResult};

/// MARC 21 slim namespace.
pub const MARCXML_NS: &str = "http://www.loc.gov/MARC21/slim";

/// Streams records inside a single `<collection>` element.
///
/// The collection is opened on construction and closed by [`finish`],
/// or on drop if the writer was never finished.
///
/// [`finish`]: RecordWriter::finish
pub struct XmlWriter<W: Write> {
    writer: Writer<W>,
    finished: bool,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(inner: W) -> WriteResult<Self> {
        let mut writer = Writer::new_with_indent(inner, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(
            BytesStart::new("collection").with_attributes([("xmlns", MARCXML_NS)]),
        ))?;
        Ok(Self { writer, finished: false })
    }

    fn text_element(&mut self, start: BytesStart<'_>, text: &str) -> WriteResult<()> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        self.writer.write_event(Event::Start(start))?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn close(&mut self) -> WriteResult<()> {
        self.finished = true;
        self.writer.write_event(Event::End(BytesEnd::new("collection")))?;
        self.writer.get_mut().write_all(b"\n")?;
        self.writer.get_mut().flush()?;
        Ok(())
    }
}

impl<W: Write> RecordWriter for XmlWriter<W> {
    fn write_record(&mut self, record: &Record) -> WriteResult<()> {
        if self.finished {
            return Err(WriteError::Finished);
        }

        self.writer.write_event(Event::Start(BytesStart::new("record")))?;
        self.text_element(BytesStart::new("leader"), record.leader())?;

        for field in record.fields() {
            match field {
                Field::Control { tag, value } => {
                    let start = BytesStart::new("controlfield")
                        .with_attributes([("tag", tag.as_str())]);
                    self.text_element(start, value)?;
                }
                Field::Data { tag, ind1, ind2, subfields } => {
                    let ind1 = ind1.to_string();
                    let ind2 = ind2.to_string();
                    let start = BytesStart::new("datafield").with_attributes([
                        ("tag", tag.as_str()),
                        ("ind1", ind1.as_str()),
                        ("ind2", ind2.as_str()),
                    ]);
                    self.writer.write_event(Event::Start(start))?;
                    for sf in subfields {
                        let code = sf.code.to_string();
                        let start = BytesStart::new("subfield")
                            .with_attributes([("code", code.as_str())]);
                        self.text_element(start, &sf.value)?;
                    }
                    self.writer.write_event(Event::End(BytesEnd::new("datafield")))?;
                }
            }
        }

        self.writer.write_event(Event::End(BytesEnd::new("record")))?;
        Ok(())
    }

    fn finish(&mut self) -> WriteResult<()> {
        if self.finished {
            return Ok(());
        }
        self.close()
    }
}

impl<W: Write> Drop for XmlWriter<W> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        let mut record = Record::new("00000ccm a2200433 i 4500").unwrap();
        record.append(Field::control("008", "190531q18751930xxu").unwrap());
        let publisher = [('b', "Belwin & Co.,"), ('c', "[1921]")];
        record.append(Field::data("264", ' ', '1', publisher).unwrap());
        record
    }

    fn render(finish: bool) -> String {
        let mut buf = Vec::new();
        {
            let mut writer = XmlWriter::new(&mut buf).unwrap();
            writer.write_record(&sample()).unwrap();
            if finish {
                writer.finish().unwrap();
            }
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_collection_structure() {
        let xml = render(true);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<collection xmlns=\"http://www.loc.gov/MARC21/slim\">"));
        assert!(xml.contains("<leader>00000ccm a2200433 i 4500</leader>"));
        assert!(xml.contains("<controlfield tag=\"008\">190531q18751930xxu</controlfield>"));
        assert!(xml.contains("<datafield tag=\"264\" ind1=\" \" ind2=\"1\">"));
        assert!(xml.trim_end().ends_with("</collection>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = render(true);
        assert!(xml.contains("<subfield code=\"b\">Belwin &amp; Co.,</subfield>"));
    }

    #[test]
    fn test_drop_closes_collection() {
        let xml = render(false);
        assert!(xml.trim_end().ends_with("</collection>"));
        assert_eq!(xml.matches("</collection>").count(), 1);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut buf = Vec::new();
        {
            let mut writer = XmlWriter::new(&mut buf).unwrap();
            writer.finish().unwrap();
            writer.finish().unwrap();
            assert!(matches!(writer.write_record(&sample()), Err(WriteError::Finished)));
        }
        let xml = String::from_utf8(buf).unwrap();
        assert_eq!(xml.matches("</collection>").count(), 1);
    }
}
