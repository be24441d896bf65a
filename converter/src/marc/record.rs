//! MARC 21 record structures.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{RecordError, RecordResult};

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3}$").expect("valid tag pattern"));

/// Length of a MARC leader.
pub const LEADER_LEN: usize = 24;

/// A subfield of a data field: one-character code plus value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subfield {
    pub code: char,
    pub value: String,
}

impl Subfield {
    pub fn new(code: char, value: impl Into<String>) -> Self {
        Self { code, value: value.into() }
    }
}

/// A variable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Tags 001-009: data without indicators or subfields.
    Control { tag: String, value: String },
    /// Tags 010 and up.
    Data {
        tag: String,
        ind1: char,
        ind2: char,
        subfields: Vec<Subfield>,
    },
}

impl Field {
    /// Create a control field, checking the tag.
    pub fn control(tag: &str, value: impl Into<String>) -> RecordResult<Self> {
        check_tag(tag)?;
        Ok(Field::Control { tag: tag.to_string(), value: value.into() })
    }

    /// Create a data field from `(code, value)` pairs, checking tag and indicators.
    pub fn data<I, V>(tag: &str, ind1: char, ind2: char, subfields: I) -> RecordResult<Self>
    where
        I: IntoIterator<Item = (char, V)>,
        V: Into<String>,
    {
        check_tag(tag)?;
        for ind in [ind1, ind2] {
            if !ind.is_ascii() || ind.is_ascii_control() {
                return Err(RecordError::InvalidIndicator {
                    tag: tag.to_string(),
                    indicator: ind.to_string(),
                });
            }
        }
        Ok(Field::Data {
            tag: tag.to_string(),
            ind1,
            ind2,
            subfields: subfields.into_iter().map(|(c, v)| Subfield::new(c, v)).collect(),
        })
    }

    pub fn tag(&self) -> &str {
        match self {
            Field::Control { tag, .. } | Field::Data { tag, .. } => tag,
        }
    }

    /// Subfields of a data field; empty for control fields.
    pub fn subfields(&self) -> &[Subfield] {
        match self {
            Field::Control { .. } => &[],
            Field::Data { subfields, .. } => subfields,
        }
    }

    /// First value of a subfield code.
    pub fn subfield(&self, code: char) -> Option<&str> {
        self.subfields()
            .iter()
            .find(|s| s.code == code)
            .map(|s| s.value.as_str())
    }

    fn tag_number(&self) -> u16 {
        self.tag().parse().unwrap_or(0)
    }
}

fn check_tag(tag: &str) -> RecordResult<()> {
    if TAG_PATTERN.is_match(tag) {
        Ok(())
    } else {
        Err(RecordError::InvalidTag(tag.to_string()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Control { tag, value } => write!(f, "{} {}", tag, value),
            Field::Data { tag, ind1, ind2, subfields } => {
                write!(f, "{} {}{}", tag, ind1, ind2)?;
                for sf in subfields {
                    write!(f, " ${} {}", sf.code, sf.value)?;
                }
                Ok(())
            }
        }
    }
}

/// A MARC bibliographic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    leader: String,
    fields: Vec<Field>,
}

/// Tag ranges kept by [`Record::sorted`], in output order.
const SORT_RANGES: [RangeInclusive<u16>; 7] = [
    10..=99,
    100..=199,
    200..=299,
    300..=399,
    500..=599,
    600..=699,
    700..=799,
];

impl Record {
    /// Create an empty record with the given leader.
    pub fn new(leader: &str) -> RecordResult<Self> {
        if leader.chars().count() != LEADER_LEN || !leader.is_ascii() {
            return Err(RecordError::InvalidLeader(leader.to_string()));
        }
        Ok(Self { leader: leader.to_string(), fields: Vec::new() })
    }

    pub fn leader(&self) -> &str {
        &self.leader
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn append(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn extend(&mut self, fields: impl IntoIterator<Item = Field>) {
        self.fields.extend(fields);
    }

    /// All fields with the given tag, in record order.
    pub fn fields_with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.iter().filter(move |f| f.tag() == tag)
    }

    /// Copy of the record with fields grouped by tag range.
    ///
    /// Control fields come first sorted by tag, then 010-099, 100-199,
    /// 200-299, 300-399, 500-599, 600-699, 700-799, each keeping its
    /// relative order. Fields in 4xx and 800+ are not carried over.
    pub fn sorted(&self) -> Record {
        let mut fields: Vec<Field> = self
            .fields
            .iter()
            .filter(|f| (1..=9).contains(&f.tag_number()))
            .cloned()
            .collect();
        fields.sort_by(|a, b| a.tag().cmp(b.tag()));

        for range in SORT_RANGES.iter() {
            fields.extend(
                self.fields
                    .iter()
                    .filter(|f| range.contains(&f.tag_number()))
                    .cloned(),
            );
        }

        Record { leader: self.leader.clone(), fields }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LEADER {}", self.leader)?;
        for field in &self.fields {
            writeln!(f, "{}", field)?;
        }
        Ok(())
    }
}
