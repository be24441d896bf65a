//! Record template: the per-row constants of a Valva catalog record.
//!
//! Every record shares the same leader, fixed-field codes, cataloging
//! source, content/media/carrier terms, subject and genre headings and
//! collection title. These live here as data; [`RecordTemplate::default`]
//! is the collection's template and a JSON file can replace it.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::TemplateError;
use crate::marc::{Field, LEADER_LEN};

/// A data field given entirely by the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedField {
    pub tag: String,
    #[serde(default = "blank")]
    pub ind1: char,
    #[serde(default = "blank")]
    pub ind2: char,
    /// `(code, value)` pairs in output order.
    pub subfields: Vec<(char, String)>,
}

fn blank() -> char {
    ' '
}

impl FixedField {
    pub fn new(tag: &str, ind1: char, ind2: char, subfields: &[(char, &str)]) -> Self {
        Self {
            tag: tag.to_string(),
            ind1,
            ind2,
            subfields: subfields.iter().map(|(c, v)| (*c, v.to_string())).collect(),
        }
    }

    pub fn to_field(&self) -> Result<Field, TemplateError> {
        Field::data(&self.tag, self.ind1, self.ind2, self.subfields.iter().cloned())
            .map_err(|e| TemplateError::Invalid(e.to_string()))
    }
}

/// 008 codes for printed music.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedFieldCodes {
    /// Date entered on file, `yymmdd`. Today's date when unset.
    #[serde(default)]
    pub date_entered: Option<String>,
    /// Date 1 when the item is undated (status `q`).
    pub range_start: String,
    /// Date 2 when the item is undated.
    pub range_end: String,
    /// Place of publication code (3 chars).
    pub place: String,
    /// Positions 18-39.
    pub tail: String,
}

/// All constants of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTemplate {
    pub leader: String,
    pub fixed: FixedFieldCodes,
    /// 040.
    pub cataloging_source: FixedField,
    /// `$c` of 264 _1 when the item is undated.
    pub undated_text: String,
    /// 336, 337, 338, 348.
    pub carrier_fields: Vec<FixedField>,
    /// 546.
    pub language_fields: Vec<FixedField>,
    /// 650, 655.
    pub subject_fields: Vec<FixedField>,
    /// 730.
    pub collection_fields: Vec<FixedField>,
}

const COLLECTION_THEATER: &str =
    "Fred D. Valva Collection of Silent Film and Vaudeville Theater Orchestra Music.";
const COLLECTION_THEATRE: &str =
    "Fred D. Valva Collection of Silent Film and Vaudeville Theatre Orchestra Music.";

impl Default for RecordTemplate {
    fn default() -> Self {
        Self {
            leader: "00000ccm a2200433 i 4500".to_string(),
            fixed: FixedFieldCodes {
                date_entered: Some("190531".to_string()),
                range_start: "1875".to_string(),
                range_end: "1930".to_string(),
                place: "xxu".to_string(),
                tail: "uuze        n    zxx d".to_string(),
            },
            cataloging_source: FixedField::new(
                "040",
                ' ',
                ' ',
                &[('a', "NjP"), ('b', "eng"), ('c', "NjP")],
            ),
            undated_text: "[between 1875 and 1930]".to_string(),
            carrier_fields: vec![
                FixedField::new(
                    "336",
                    ' ',
                    ' ',
                    &[('a', "notated music"), ('b', "ntm"), ('2', "rdacontent")],
                ),
                FixedField::new(
                    "337",
                    ' ',
                    ' ',
                    &[('a', "unmediated"), ('b', "n"), ('2', "rdamedia")],
                ),
                FixedField::new(
                    "338",
                    ' ',
                    ' ',
                    &[('a', "volume"), ('b', "nc"), ('2', "rdacontent")],
                ),
                FixedField::new("348", ' ', ' ', &[('a', "part"), ('2', "rdanfm")]),
            ],
            language_fields: vec![FixedField::new("546", ' ', ' ', &[('b', "Staff notation")])],
            subject_fields: vec![
                FixedField::new("650", ' ', '0', &[('a', "Silent film music")]),
                FixedField::new("655", ' ', '7', &[('a', "Parts (Music)"), ('2', "lcgft")]),
                FixedField::new("655", ' ', '7', &[('a', "Silent film music"), ('2', "lcgft")]),
            ],
            collection_fields: vec![
                FixedField::new("730", '0', ' ', &[('a', COLLECTION_THEATER)]),
                FixedField::new("730", '0', ' ', &[('a', COLLECTION_THEATRE)]),
            ],
        }
    }
}

impl RecordTemplate {
    /// Parse and check a template from JSON.
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        let template: RecordTemplate = serde_json::from_str(json)?;
        template.check()?;
        Ok(template)
    }

    /// Load a template file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, TemplateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would produce malformed records.
    pub fn check(&self) -> Result<(), TemplateError> {
        if self.leader.len() != LEADER_LEN || !self.leader.is_ascii() {
            return Err(TemplateError::Invalid(format!(
                "leader must be {} ASCII characters",
                LEADER_LEN
            )));
        }
        if let Some(ref date) = self.fixed.date_entered {
            if date.len() != 6 || !date.bytes().all(|b| b.is_ascii_digit()) {
                return Err(TemplateError::Invalid(format!("dateEntered '{}' is not yymmdd", date)));
            }
        }
        for (name, value, len) in [
            ("rangeStart", &self.fixed.range_start, 4),
            ("rangeEnd", &self.fixed.range_end, 4),
            ("place", &self.fixed.place, 3),
            ("tail", &self.fixed.tail, 22),
        ] {
            if value.chars().count() != len {
                return Err(TemplateError::Invalid(format!(
                    "{} must be {} characters, got '{}'",
                    name, len, value
                )));
            }
        }
        for fixed in self.fixed_fields() {
            fixed.to_field()?;
        }
        Ok(())
    }

    fn fixed_fields(&self) -> impl Iterator<Item = &FixedField> {
        std::iter::once(&self.cataloging_source)
            .chain(&self.carrier_fields)
            .chain(&self.language_fields)
            .chain(&self.subject_fields)
            .chain(&self.collection_fields)
    }

    /// Date entered on file, falling back to today.
    pub fn date_entered(&self) -> String {
        self.fixed
            .date_entered
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("%y%m%d").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_is_valid() {
        let template = RecordTemplate::default();
        assert!(template.check().is_ok());
        assert_eq!(template.date_entered(), "190531");
    }

    #[test]
    fn test_json_roundtrip_preserves_template() {
        let template = RecordTemplate::default();
        let json = template.to_json().unwrap();
        assert_eq!(RecordTemplate::from_json(&json).unwrap(), template);
    }

    #[test]
    fn test_unset_date_uses_today() {
        let mut template = RecordTemplate::default();
        template.fixed.date_entered = None;
        let date = template.date_entered();
        assert_eq!(date.len(), 6);
        assert!(date.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_bad_leader_rejected() {
        let mut template = RecordTemplate::default();
        template.leader = "00000ccm".to_string();
        assert!(matches!(template.check(), Err(TemplateError::Invalid(_))));
    }

    #[test]
    fn test_bad_fixed_field_tag_rejected() {
        let mut template = RecordTemplate::default();
        template.subject_fields.push(FixedField::new("65", ' ', '0', &[('a', "Marches")]));
        let json = template.to_json().unwrap();
        assert!(RecordTemplate::from_json(&json).is_err());
    }

    #[test]
    fn test_collection_titles() {
        let template = RecordTemplate::default();
        let titles: Vec<&str> = template
            .collection_fields
            .iter()
            .map(|f| f.subfields[0].1.as_str())
            .collect();
        assert_eq!(
            titles,
            vec![
                "Fred D. Valva Collection of Silent Film and Vaudeville Theater Orchestra Music.",
                "Fred D. Valva Collection of Silent Film and Vaudeville Theatre Orchestra Music.",
            ]
        );
    }
}
