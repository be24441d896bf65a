//! Build one MARC record from one spreadsheet row.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::contributors::{self, EntryIssue};
use super::template::RecordTemplate;
use crate::error::RecordResult;
use crate::marc::{Field, Record, Subfield};
use crate::models::{Heading, Role, SheetRow};

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("valid year pattern"));

/// Something in a row that was converted on a best-effort basis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowWarning {
    /// A contributor entry did not parse cleanly.
    Contributor {
        heading: Heading,
        role: Role,
        name: String,
        issue: EntryIssue,
    },
    /// Title article too long for a single nonfiling digit; 0 used.
    ArticleTooLong(String),
    /// Row has no title; 245 `$a` is empty.
    MissingTitle,
    /// Publication date without a four-digit year; 008 dates are `uuuu`.
    UndatedYear(String),
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowWarning::Contributor { heading, role, name, issue } => write!(
                f,
                "{} {} '{}': {}",
                heading.tag(),
                role,
                name,
                issue
            ),
            RowWarning::ArticleTooLong(article) => {
                write!(f, "article '{}' too long for 245 second indicator, using 0", article)
            }
            RowWarning::MissingTitle => write!(f, "no title"),
            RowWarning::UndatedYear(date) => write!(f, "no year found in date '{}'", date),
        }
    }
}

/// A record plus the warnings raised while building it.
#[derive(Debug, Clone)]
pub struct Assembled {
    pub record: Record,
    pub warnings: Vec<RowWarning>,
}

fn datafield(tag: &str, ind1: char, ind2: char, subfields: Vec<(char, String)>) -> Field {
    Field::Data {
        tag: tag.to_string(),
        ind1,
        ind2,
        subfields: subfields.into_iter().map(|(c, v)| Subfield::new(c, v)).collect(),
    }
}

/// Build the record for one row.
///
/// Fails only if the template itself is unusable; row content never
/// causes an error.
pub fn assemble(row: &SheetRow, template: &RecordTemplate) -> RecordResult<Assembled> {
    let mut record = Record::new(&template.leader)?;
    let mut warnings = Vec::new();

    record.append(Field::control("008", fixed_field(row, template, &mut warnings))?);

    if let Some(ref plate) = row.plate_number {
        let mut subfields = vec![('a', plate.clone())];
        if let Some(ref publisher) = row.publisher {
            subfields.push(('b', publisher.clone()));
        }
        record.append(datafield("028", '2', '0', subfields));
    }

    record.append(template_field(&template.cataloging_source)?);

    record.extend(contributor_fields(row, Heading::Primary, Role::Composer, &mut warnings));

    record.append(title_field(row, &mut warnings));

    record.extend(publication_fields(row, template));

    for fixed in &template.carrier_fields {
        record.append(template_field(fixed)?);
    }

    if let Some(ref instrumentation) = row.instrumentation {
        record.append(datafield(
            "500",
            ' ',
            ' ',
            vec![('a', format!("Instrumentation: {}", instrumentation.to_lowercase()))],
        ));
    }
    if let Some(ref notes) = row.notes {
        record.append(datafield("500", ' ', ' ', vec![('a', notes.clone())]));
    }
    if let Some(ref box_folder) = row.box_folder {
        record.append(datafield(
            "500",
            ' ',
            ' ',
            vec![('a', format!("Box and folder number: {}", box_folder))],
        ));
    }

    for fixed in template.language_fields.iter().chain(&template.subject_fields) {
        record.append(template_field(fixed)?);
    }

    for role in [Role::Composer, Role::Arranger, Role::Lyricist] {
        record.extend(contributor_fields(row, Heading::Added, role, &mut warnings));
    }

    for fixed in &template.collection_fields {
        record.append(template_field(fixed)?);
    }

    Ok(Assembled { record, warnings })
}

fn template_field(fixed: &super::template::FixedField) -> RecordResult<Field> {
    Field::data(&fixed.tag, fixed.ind1, fixed.ind2, fixed.subfields.iter().cloned())
}

/// 008 for printed music.
fn fixed_field(
    row: &SheetRow,
    template: &RecordTemplate,
    warnings: &mut Vec<RowWarning>,
) -> String {
    let codes = &template.fixed;
    let (status, date1, date2) = match row.pub_date {
        Some(ref date) => {
            let year = match YEAR.find(date) {
                Some(m) => m.as_str().to_string(),
                None => {
                    warnings.push(RowWarning::UndatedYear(date.clone()));
                    "uuuu".to_string()
                }
            };
            ('t', year.clone(), year)
        }
        None => ('q', codes.range_start.clone(), codes.range_end.clone()),
    };

    format!(
        "{}{}{}{}{}{}",
        template.date_entered(),
        status,
        date1,
        date2,
        codes.place,
        codes.tail
    )
}

fn contributor_fields(
    row: &SheetRow,
    heading: Heading,
    role: Role,
    warnings: &mut Vec<RowWarning>,
) -> Vec<Field> {
    contributors::build(row.contributors(role), heading, role)
        .into_iter()
        .map(|c| {
            if let Some(issue) = c.issue {
                warnings.push(RowWarning::Contributor {
                    heading,
                    role,
                    name: c.name.clone(),
                    issue,
                });
            }
            c.to_field()
        })
        .collect()
}

/// 245 with the nonfiling count in the second indicator.
fn title_field(row: &SheetRow, warnings: &mut Vec<RowWarning>) -> Field {
    let ind2 = match row.title_article {
        Some(ref article) => {
            let count = article.chars().count() + 1;
            match char::from_digit(count as u32, 10) {
                Some(digit) => digit,
                None => {
                    warnings.push(RowWarning::ArticleTooLong(article.clone()));
                    '0'
                }
            }
        }
        None => '0',
    };

    let title = row.title.clone().unwrap_or_else(|| {
        warnings.push(RowWarning::MissingTitle);
        String::new()
    });

    let subfields = match row.subtitle {
        Some(ref subtitle) => vec![('a', format!("{} :", title)), ('b', subtitle.clone())],
        None => vec![('a', title)],
    };
    datafield("245", '1', ind2, subfields)
}

/// 264 _1 (publication) and 264 _4 (copyright).
fn publication_fields(row: &SheetRow, template: &RecordTemplate) -> Vec<Field> {
    let mut fields = Vec::new();
    let place = row.pub_place.as_ref();
    let publisher = row.publisher.as_ref();

    match row.pub_date {
        Some(ref date) => {
            let date_text = format!("[{}]", date);
            match (place, publisher) {
                (Some(place), Some(publisher)) => fields.push(datafield(
                    "264",
                    ' ',
                    '1',
                    vec![
                        ('a', format!("{} :", place)),
                        ('b', format!("{},", publisher)),
                        ('c', date_text),
                    ],
                )),
                (None, Some(publisher)) => fields.push(datafield(
                    "264",
                    ' ',
                    '1',
                    vec![('b', format!("{},", publisher)), ('c', date_text)],
                )),
                _ => {}
            }
            fields.push(datafield("264", ' ', '4', vec![('c', format!("©{}", date))]));
        }
        None => {
            let range = template.undated_text.clone();
            let subfields = match (place, publisher) {
                (Some(place), Some(publisher)) => vec![
                    ('a', format!("{} :", place)),
                    ('b', format!("{},", publisher)),
                    ('c', range),
                ],
                (None, Some(publisher)) => vec![('b', format!("{},", publisher)), ('c', range)],
                _ => vec![('c', range)],
            };
            fields.push(datafield("264", ' ', '1', subfields));
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> SheetRow {
        SheetRow {
            title_article: Some("The".into()),
            title: Some("Sheik".into()),
            subtitle: Some("fox trot".into()),
            composer: Some("Snyder, Ted ǂ d 1881-1965; Smith, Harry B. ǂ q Harry Bache".into()),
            arranger: Some("Lake, M. L.".into()),
            lyricist: None,
            pub_place: Some("New York".into()),
            publisher: Some("Mills Music".into()),
            pub_date: Some("1921".into()),
            plate_number: Some("1234-4".into()),
            instrumentation: Some("Piano, Violin".into()),
            notes: Some("Conductor part only.".into()),
            box_folder: Some("12/4".into()),
        }
    }

    fn build(row: &SheetRow) -> Assembled {
        assemble(row, &RecordTemplate::default()).unwrap()
    }

    fn tags(record: &Record) -> Vec<&str> {
        record.fields().iter().map(|f| f.tag()).collect()
    }

    #[test]
    fn test_field_order() {
        let assembled = build(&row());
        assert_eq!(
            tags(&assembled.record),
            vec![
                "008", "028", "040", "100", "245", "264", "264", "336", "337", "338", "348",
                "500", "500", "500", "546", "650", "655", "655", "700", "700", "700", "730", "730",
            ]
        );
        assert!(assembled.warnings.is_empty());
    }

    #[test]
    fn test_fixed_field_dated() {
        let assembled = build(&row());
        match &assembled.record.fields()[0] {
            Field::Control { value, .. } => {
                assert_eq!(value, "190531t19211921xxuuuze        n    zxx d");
                assert_eq!(value.len(), 40);
            }
            other => panic!("expected 008, got {:?}", other),
        }
    }

    #[test]
    fn test_fixed_field_undated() {
        let mut r = row();
        r.pub_date = None;
        let assembled = build(&r);
        match &assembled.record.fields()[0] {
            Field::Control { value, .. } => assert!(value.starts_with("190531q18751930xxu")),
            other => panic!("expected 008, got {:?}", other),
        }
    }

    #[test]
    fn test_fixed_field_unparsed_year() {
        let mut r = row();
        r.pub_date = Some("ca. 1920s?".into());
        let assembled = build(&r);
        match &assembled.record.fields()[0] {
            Field::Control { value, .. } => assert!(value.starts_with("190531t19201920")),
            other => panic!("expected 008, got {:?}", other),
        }

        r.pub_date = Some("n.d.".into());
        let assembled = build(&r);
        match &assembled.record.fields()[0] {
            Field::Control { value, .. } => assert!(value.starts_with("190531tuuuuuuuu")),
            other => panic!("expected 008, got {:?}", other),
        }
        assert_eq!(assembled.warnings, vec![RowWarning::UndatedYear("n.d.".into())]);
    }

    #[test]
    fn test_plate_number_field() {
        let record = build(&row()).record;
        let plate = record.fields_with_tag("028").next().unwrap();
        assert_eq!(plate.subfield('a'), Some("1234-4"));
        assert_eq!(plate.subfield('b'), Some("Mills Music"));
    }

    #[test]
    fn test_title_with_article_and_subtitle() {
        let record = build(&row()).record;
        match record.fields_with_tag("245").next().unwrap() {
            Field::Data { ind1, ind2, subfields, .. } => {
                assert_eq!((*ind1, *ind2), ('1', '4'));
                assert_eq!(subfields[0], Subfield::new('a', "Sheik :"));
                assert_eq!(subfields[1], Subfield::new('b', "fox trot"));
            }
            other => panic!("expected 245, got {:?}", other),
        };
    }

    #[test]
    fn test_title_without_article() {
        let mut r = row();
        r.title_article = None;
        r.subtitle = None;
        let record = build(&r).record;
        assert_eq!(
            record.fields_with_tag("245").next().unwrap().to_string(),
            "245 10 $a Sheik"
        );
    }

    #[test]
    fn test_long_article_falls_back() {
        let mut r = row();
        r.title_article = Some("Dieselbigen".into());
        let assembled = build(&r);
        assert_eq!(
            assembled.record.fields_with_tag("245").next().unwrap().to_string(),
            "245 10 $a Sheik : $b fox trot"
        );
        assert_eq!(assembled.warnings, vec![RowWarning::ArticleTooLong("Dieselbigen".into())]);
    }

    #[test]
    fn test_missing_title_warns() {
        let mut r = row();
        r.title = None;
        let assembled = build(&r);
        assert!(assembled.warnings.contains(&RowWarning::MissingTitle));
    }

    #[test]
    fn test_publication_dated() {
        let record = build(&row()).record;
        let lines: Vec<String> = record.fields_with_tag("264").map(|f| f.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "264  1 $a New York : $b Mills Music, $c [1921]",
                "264  4 $c ©1921",
            ]
        );
    }

    #[test]
    fn test_publication_dated_without_publisher() {
        let mut r = row();
        r.publisher = None;
        let record = build(&r).record;
        let lines: Vec<String> = record.fields_with_tag("264").map(|f| f.to_string()).collect();
        assert_eq!(lines, vec!["264  4 $c ©1921"]);
    }

    #[test]
    fn test_publication_undated_variants() {
        let mut r = row();
        r.pub_date = None;
        let lines = |r: &SheetRow| -> Vec<String> {
            build(r).record.fields_with_tag("264").map(|f| f.to_string()).collect()
        };

        assert_eq!(
            lines(&r),
            vec!["264  1 $a New York : $b Mills Music, $c [between 1875 and 1930]"]
        );

        r.pub_place = None;
        assert_eq!(lines(&r), vec!["264  1 $b Mills Music, $c [between 1875 and 1930]"]);

        r.publisher = None;
        assert_eq!(lines(&r), vec!["264  1 $c [between 1875 and 1930]"]);
    }

    #[test]
    fn test_notes() {
        let record = build(&row()).record;
        let notes: Vec<String> = record.fields_with_tag("500").map(|f| f.to_string()).collect();
        assert_eq!(
            notes,
            vec![
                "500    $a Instrumentation: piano, violin",
                "500    $a Conductor part only.",
                "500    $a Box and folder number: 12/4",
            ]
        );
    }

    #[test]
    fn test_contributor_headings() {
        let record = build(&row()).record;

        let main: Vec<String> = record.fields_with_tag("100").map(|f| f.to_string()).collect();
        assert_eq!(main, vec!["100 1  $a Smith, Harry B. $e Harry Bache, $e composer"]);

        let added: Vec<String> = record.fields_with_tag("700").map(|f| f.to_string()).collect();
        assert_eq!(
            added,
            vec![
                "700 1  $a Snyder, Ted $d 1881-1965, $e composer",
                "700 1  $a Smith, Harry B. $e Harry Bache, $e composer",
                "700 1  $a Lake, M. L., $e arranger",
            ]
        );
    }

    #[test]
    fn test_contributor_issue_becomes_warning() {
        let mut r = row();
        r.lyricist = Some("ǂ d 1900".into());
        let assembled = build(&r);
        assert_eq!(
            assembled.warnings,
            vec![RowWarning::Contributor {
                heading: Heading::Added,
                role: Role::Lyricist,
                name: String::new(),
                issue: EntryIssue::MissingName,
            }]
        );
    }

    #[test]
    fn test_minimal_row() {
        let r = SheetRow {
            title: Some("Agitato".into()),
            ..SheetRow::default()
        };
        let assembled = build(&r);
        assert_eq!(
            tags(&assembled.record),
            vec![
                "008", "040", "245", "264", "336", "337", "338", "348", "546", "650", "655",
                "655", "730", "730",
            ]
        );
        assert!(assembled.warnings.is_empty());
    }
}
