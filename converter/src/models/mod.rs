//! Domain models for the Valva conversion.
//!
//! - [`Role`] - Contribution vocabulary written to `$e` of name headings
//! - [`Heading`] - Main entry (100) or added entry (700)
//! - [`SheetRow`] - Typed view of one spreadsheet row

use serde::{Deserialize, Serialize};

// =============================================================================
// Role
// =============================================================================

/// Role of a contributor in a printed music item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Composer,
    Arranger,
    Lyricist,
}

impl Role {
    /// Parse a role from its relator term.
    pub fn from_term(term: &str) -> Option<Self> {
        match term.trim().to_lowercase().as_str() {
            "composer" | "cmp" => Some(Self::Composer),
            "arranger" | "arr" => Some(Self::Arranger),
            "lyricist" | "lyr" => Some(Self::Lyricist),
            _ => None,
        }
    }

    /// Relator term as written in `$e`.
    pub fn term(&self) -> &'static str {
        match self {
            Self::Composer => "composer",
            Self::Arranger => "arranger",
            Self::Lyricist => "lyricist",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.term())
    }
}

// =============================================================================
// Heading
// =============================================================================

/// Which personal-name heading a contributor is filed under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    /// Main entry, personal name (100). One per record.
    Primary,
    /// Added entry, personal name (700). Repeatable.
    Added,
}

impl Heading {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Primary => "100",
            Self::Added => "700",
        }
    }
}

// =============================================================================
// Sheet Row
// =============================================================================

/// Column positions in the Valva spreadsheet. Column 0 holds a local
/// identifier that is not carried into the record.
pub mod columns {
    pub const TITLE_ARTICLE: usize = 1;
    pub const TITLE: usize = 2;
    pub const SUBTITLE: usize = 3;
    pub const COMPOSER: usize = 4;
    pub const ARRANGER: usize = 5;
    pub const LYRICIST: usize = 6;
    pub const PUB_PLACE: usize = 7;
    pub const PUBLISHER: usize = 8;
    pub const PUB_DATE: usize = 9;
    pub const PLATE_NUMBER: usize = 10;
    pub const INSTRUMENTATION: usize = 11;
    pub const NOTES: usize = 12;
    pub const BOX_FOLDER: usize = 13;
}

/// One data row of the spreadsheet. Cells are trimmed; blank cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRow {
    pub title_article: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub composer: Option<String>,
    pub arranger: Option<String>,
    pub lyricist: Option<String>,
    pub pub_place: Option<String>,
    pub publisher: Option<String>,
    pub pub_date: Option<String>,
    pub plate_number: Option<String>,
    pub instrumentation: Option<String>,
    pub notes: Option<String>,
    pub box_folder: Option<String>,
}

impl SheetRow {
    /// Build a row from positional cells. Short rows leave trailing fields empty.
    pub fn from_cells<S: AsRef<str>>(cells: &[S]) -> Self {
        let cell = |i: usize| {
            cells
                .get(i)
                .map(|c| c.as_ref().trim())
                .filter(|c| !c.is_empty())
                .map(String::from)
        };

        Self {
            title_article: cell(columns::TITLE_ARTICLE),
            title: cell(columns::TITLE),
            subtitle: cell(columns::SUBTITLE),
            composer: cell(columns::COMPOSER),
            arranger: cell(columns::ARRANGER),
            lyricist: cell(columns::LYRICIST),
            pub_place: cell(columns::PUB_PLACE),
            publisher: cell(columns::PUBLISHER),
            pub_date: cell(columns::PUB_DATE),
            plate_number: cell(columns::PLATE_NUMBER),
            instrumentation: cell(columns::INSTRUMENTATION),
            notes: cell(columns::NOTES),
            box_folder: cell(columns::BOX_FOLDER),
        }
    }

    /// Raw contributor string for a role.
    pub fn contributors(&self, role: Role) -> Option<&str> {
        match role {
            Role::Composer => self.composer.as_deref(),
            Role::Arranger => self.arranger.as_deref(),
            Role::Lyricist => self.lyricist.as_deref(),
        }
    }
}
