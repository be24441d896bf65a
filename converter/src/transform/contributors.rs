//! Personal-name headings (100/700) from spreadsheet contributor cells.
//!
//! A cell lists one or more people separated by `;`. Each entry may carry
//! extra parts after a `ǂ` separator:
//!
//! ```text
//! Lake, M. L. ǂ q Mayhew Lester ǂ d 1879-1955; Snyder, Ted ǂ d 1881-
//! ```
//!
//! Parts starting with `q ` are the fuller form of the name, parts starting
//! with `d ` are dates, and the remaining part is the name itself.
//!
//! Building never fails. Entries that do not parse cleanly still produce a
//! field, flagged with an [`EntryIssue`] so the caller can report it.

use serde::Serialize;

use crate::marc::Field;
use crate::models::{Heading, Role};

/// Separator between people in a cell.
pub const ENTRY_SEPARATOR: char = ';';

/// Separator between the parts of one person's entry.
pub const TOKEN_SEPARATOR: char = 'ǂ';

const FULLER_PREFIX: &str = "q ";
const DATES_PREFIX: &str = "d ";

/// Parsing anomaly for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "count", rename_all = "camelCase")]
pub enum EntryIssue {
    /// No untagged part; the name is empty.
    MissingName,
    /// Several untagged parts; the last one was used.
    MultipleNames(usize),
}

impl std::fmt::Display for EntryIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryIssue::MissingName => write!(f, "entry has no name"),
            EntryIssue::MultipleNames(n) => write!(f, "entry has {} names, last one used", n),
        }
    }
}

/// Parts of one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ContributorToken {
    name: Option<String>,
    fuller_name: Option<String>,
    death_year: Option<String>,
    untagged: usize,
}

impl ContributorToken {
    fn parse(entry: &str) -> Self {
        let mut token = ContributorToken::default();
        for part in entry.split(TOKEN_SEPARATOR).map(str::trim).filter(|p| !p.is_empty()) {
            if let Some(rest) = part.strip_prefix(FULLER_PREFIX) {
                token.fuller_name = Some(rest.trim().to_string());
            } else if let Some(rest) = part.strip_prefix(DATES_PREFIX) {
                token.death_year = Some(rest.trim().to_string());
            } else {
                token.name = Some(part.to_string());
                token.untagged += 1;
            }
        }
        token
    }

    fn issue(&self) -> Option<EntryIssue> {
        match self.untagged {
            0 => Some(EntryIssue::MissingName),
            1 => None,
            n => Some(EntryIssue::MultipleNames(n)),
        }
    }
}

/// One personal-name heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorField {
    pub heading: Heading,
    pub role: Role,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuller_name: Option<String>,
    /// Dates with closing punctuation applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<EntryIssue>,
}

impl ContributorField {
    /// Subfields in output order.
    ///
    /// With a fuller name but no dates the fuller name is written to `$e`
    /// followed by a comma, not to `$q`. Existing catalog records were
    /// produced that way and are kept consistent.
    pub fn subfields(&self) -> Vec<(char, String)> {
        let role = self.role.term().to_string();
        match (&self.fuller_name, &self.death_year) {
            (Some(fuller), Some(death)) => vec![
                ('a', self.name.clone()),
                ('q', fuller.clone()),
                ('d', death.clone()),
                ('e', role),
            ],
            (Some(fuller), None) => vec![
                ('a', self.name.clone()),
                ('e', format!("{},", fuller)),
                ('e', role),
            ],
            (None, Some(death)) => vec![
                ('a', self.name.clone()),
                ('d', death.clone()),
                ('e', role),
            ],
            (None, None) => vec![('a', format!("{},", self.name)), ('e', role)],
        }
    }

    /// MARC data field, first indicator 1 (surname), second blank.
    pub fn to_field(&self) -> Field {
        Field::Data {
            tag: self.heading.tag().to_string(),
            ind1: '1',
            ind2: ' ',
            subfields: self
                .subfields()
                .into_iter()
                .map(|(code, value)| crate::marc::Subfield::new(code, value))
                .collect(),
        }
    }
}

/// Closing punctuation for dates: a trailing comma unless the dates are
/// open (`1881-`).
fn punctuate_dates(dates: String) -> String {
    if dates.ends_with('-') {
        dates
    } else {
        format!("{},", dates)
    }
}

/// Build the headings for one contributor cell.
///
/// - Absent or blank input yields nothing.
/// - For a composer main entry the first listed composer is skipped.
/// - A main entry yields at most one field; added entries yield one per person.
pub fn build(raw: Option<&str>, heading: Heading, role: Role) -> Vec<ContributorField> {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return Vec::new(),
    };

    let mut entries: Vec<&str> = raw.split(ENTRY_SEPARATOR).map(str::trim).collect();
    while entries.last().is_some_and(|e| e.is_empty()) {
        entries.pop();
    }

    let skip = usize::from(heading == Heading::Primary && role == Role::Composer);
    let limit = match heading {
        Heading::Primary => 1,
        Heading::Added => usize::MAX,
    };

    entries
        .into_iter()
        .skip(skip)
        .take(limit)
        .map(|entry| {
            let token = ContributorToken::parse(entry);
            let issue = token.issue();
            ContributorField {
                heading,
                role,
                name: token.name.unwrap_or_default(),
                fuller_name: token.fuller_name,
                death_year: token.death_year.map(punctuate_dates),
                issue,
            }
        })
        .collect()
}

/// Same as [`build`], converted to MARC fields.
pub fn build_fields(raw: Option<&str>, heading: Heading, role: Role) -> Vec<Field> {
    build(raw, heading, role).iter().map(ContributorField::to_field).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(field: &ContributorField) -> Vec<(char, String)> {
        field.subfields()
    }

    #[test]
    fn test_absent_input_yields_nothing() {
        for heading in [Heading::Primary, Heading::Added] {
            for role in [Role::Composer, Role::Arranger, Role::Lyricist] {
                assert!(build(None, heading, role).is_empty());
                assert!(build(Some("   "), heading, role).is_empty());
            }
        }
    }

    #[test]
    fn test_plain_name_gets_comma() {
        let fields = build(Some("Smith, John"), Heading::Added, Role::Composer);

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "Smith, John");
        assert_eq!(fields[0].fuller_name, None);
        assert_eq!(fields[0].death_year, None);
        assert_eq!(
            codes(&fields[0]),
            vec![('a', "Smith, John,".to_string()), ('e', "composer".to_string())]
        );
    }

    #[test]
    fn test_open_dates_keep_hyphen() {
        let fields = build(Some("Smith, John ǂ d 1920-"), Heading::Added, Role::Arranger);

        assert_eq!(fields[0].name, "Smith, John");
        assert_eq!(fields[0].death_year.as_deref(), Some("1920-"));
        assert_eq!(
            codes(&fields[0]),
            vec![
                ('a', "Smith, John".to_string()),
                ('d', "1920-".to_string()),
                ('e', "arranger".to_string()),
            ]
        );
    }

    #[test]
    fn test_closed_dates_get_comma() {
        let fields = build(Some("Smith, John ǂ d 1850"), Heading::Added, Role::Arranger);
        assert_eq!(fields[0].death_year.as_deref(), Some("1850,"));

        let fields = build(Some("Smith, John ǂ d 1850-1920"), Heading::Added, Role::Arranger);
        assert_eq!(fields[0].death_year.as_deref(), Some("1850-1920,"));
    }

    #[test]
    fn test_fuller_name_and_dates() {
        let fields = build(
            Some("Lake, M. L. ǂ q Mayhew Lester ǂ d 1879-1955"),
            Heading::Added,
            Role::Arranger,
        );

        assert_eq!(
            codes(&fields[0]),
            vec![
                ('a', "Lake, M. L.".to_string()),
                ('q', "Mayhew Lester".to_string()),
                ('d', "1879-1955,".to_string()),
                ('e', "arranger".to_string()),
            ]
        );
    }

    #[test]
    fn test_fuller_name_without_dates_goes_to_e() {
        let fields = build(Some("Lake, M. L. ǂ q Mayhew Lester"), Heading::Added, Role::Arranger);

        assert_eq!(
            codes(&fields[0]),
            vec![
                ('a', "Lake, M. L.".to_string()),
                ('e', "Mayhew Lester,".to_string()),
                ('e', "arranger".to_string()),
            ]
        );
    }

    #[test]
    fn test_primary_composer_skips_first_entry() {
        let fields = build(Some("Jones; Smith"), Heading::Primary, Role::Composer);

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "Smith");
        assert_eq!(
            codes(&fields[0]),
            vec![('a', "Smith,".to_string()), ('e', "composer".to_string())]
        );
        assert_eq!(fields[0].to_field().tag(), "100");
    }

    #[test]
    fn test_primary_composer_single_entry_yields_nothing() {
        assert!(build(Some("Jones"), Heading::Primary, Role::Composer).is_empty());
    }

    #[test]
    fn test_primary_stops_after_first() {
        let fields = build(Some("A; B; C"), Heading::Primary, Role::Arranger);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "A");
    }

    #[test]
    fn test_added_keeps_all_in_order() {
        let fields = build(Some("A; B; C"), Heading::Added, Role::Lyricist);

        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(fields.iter().all(|f| f.role == Role::Lyricist));
        assert!(fields.iter().all(|f| f.to_field().tag() == "700"));
    }

    #[test]
    fn test_added_composer_keeps_first_entry() {
        let fields = build(Some("Jones; Smith"), Heading::Added, Role::Composer);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "Jones");
    }

    #[test]
    fn test_parts_do_not_leak_between_entries() {
        let fields = build(Some("A ǂ d 1900; B"), Heading::Added, Role::Composer);
        assert_eq!(fields[1].death_year, None);
        assert_eq!(fields[1].name, "B");
    }

    #[test]
    fn test_missing_name_is_flagged() {
        let fields = build(Some("ǂ d 1900"), Heading::Added, Role::Composer);

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "");
        assert_eq!(fields[0].issue, Some(EntryIssue::MissingName));
    }

    #[test]
    fn test_multiple_names_last_wins() {
        let fields = build(Some("Smith ǂ Smyth"), Heading::Added, Role::Composer);

        assert_eq!(fields[0].name, "Smyth");
        assert_eq!(fields[0].issue, Some(EntryIssue::MultipleNames(2)));
    }

    #[test]
    fn test_empty_middle_entry_kept_trailing_dropped() {
        let fields = build(Some("A;;B;"), Heading::Added, Role::Composer);

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[1].issue, Some(EntryIssue::MissingName));
        assert_eq!(fields[2].name, "B");
    }

    #[test]
    fn test_well_formed_entries_have_no_issue() {
        let fields = build(Some("A ǂ q Alpha ǂ d 1900-; B"), Heading::Added, Role::Composer);
        assert!(fields.iter().all(|f| f.issue.is_none()));
    }

    #[test]
    fn test_build_is_pure() {
        let raw = Some("Lake, M. L. ǂ d 1879-1955; Snyder, Ted");
        assert_eq!(
            build(raw, Heading::Added, Role::Arranger),
            build(raw, Heading::Added, Role::Arranger)
        );
    }

    #[test]
    fn test_build_fields_marc_shape() {
        let fields = build_fields(Some("Snyder, Ted ǂ d 1881-"), Heading::Added, Role::Composer);

        match &fields[0] {
            Field::Data { tag, ind1, ind2, .. } => {
                assert_eq!(tag, "700");
                assert_eq!(*ind1, '1');
                assert_eq!(*ind2, ' ');
            }
            other => panic!("expected data field, got {:?}", other),
        }
        assert_eq!(fields[0].subfield('d'), Some("1881-"));
    }
}
