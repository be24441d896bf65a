//! Spreadsheet reader with encoding and delimiter auto-detection.
//!
//! The Valva spreadsheet is addressed by column position, so rows are kept
//! as positional cell vectors. The header row is read but never mapped.

use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::SheetRow;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Data rows as positional cells (header excluded)
    pub rows: Vec<Vec<String>>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
}

impl ParseResult {
    /// Typed view of every data row.
    pub fn sheet_rows(&self) -> impl Iterator<Item = SheetRow> + '_ {
        self.rows.iter().map(|cells| SheetRow::from_cells(cells))
    }

    /// Rows as JSON objects keyed by header, for inspection.
    pub fn to_json(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|cells| {
                let mut obj = Map::new();
                for (i, header) in self.headers.iter().enumerate() {
                    let value = cells.get(i).map(String::as_str).unwrap_or("");
                    obj.insert(header.clone(), Value::String(value.to_string()));
                }
                Value::Object(obj)
            })
            .collect()
    }
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 (with or without BOM) is always read as UTF-8; chardet is
/// only consulted for other input, where it may otherwise misread a lone
/// multibyte character such as `ǂ` as windows-1252.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if std::str::from_utf8(body).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding label.
///
/// Unknown labels fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let label = encoding.trim().to_lowercase();
    if label == "utf-8" || label == "utf8" || label == "ascii" {
        let (text, _, _) = encoding_rs::UTF_8.decode(bytes);
        return Ok(text.into_owned());
    }

    match encoding_rs::Encoding::for_label(label.as_bytes()) {
        Some(enc) => {
            let (text, _, had_errors) = enc.decode(bytes);
            if had_errors {
                return Err(CsvError::EncodingError(encoding.to_string()));
            }
            Ok(text.into_owned())
        }
        None => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Defaults to `,` when the header line contains none of the candidates.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse decoded CSV text with an explicit delimiter.
pub fn parse_str(content: &str, delimiter: char, encoding: String) -> CsvResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let delim = u8::try_from(delimiter).map_err(|_| CsvError::ParseError {
        line: 0,
        message: format!("delimiter '{}' is not a single byte", delimiter),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(String::from).collect());
    }

    Ok(ParseResult {
        rows,
        encoding,
        delimiter,
        headers,
    })
}

/// Parse CSV bytes with auto-detection of encoding, and of the delimiter
/// unless one is given.
pub fn parse_bytes(bytes: &[u8], delimiter: Option<char>) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    parse_str(&content, delimiter, encoding)
}

/// Parse a CSV file with auto-detection.
///
/// # Example
/// ```ignore
/// let result = parse_csv_file("valva.csv", None)?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Rows: {}", result.rows.len());
/// ```
pub fn parse_csv_file<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes, delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "id,article,title,subtitle,composer\n\
        1,The,Sheik,,\"Snyder, Ted\"\n\
        2,,Valse Bleue,a waltz,\"Margis, Alfred; Lake, M. L.\"\n";

    #[test]
    fn test_parse_positional_rows() {
        let result = parse_bytes(SHEET.as_bytes(), None).unwrap();

        assert_eq!(result.delimiter, ',');
        assert_eq!(result.headers.len(), 5);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0][4], "Snyder, Ted");
        assert_eq!(result.rows[1][4], "Margis, Alfred; Lake, M. L.");
    }

    #[test]
    fn test_sheet_rows_view() {
        let result = parse_bytes(SHEET.as_bytes(), None).unwrap();
        let rows: Vec<SheetRow> = result.sheet_rows().collect();

        assert_eq!(rows[0].title_article.as_deref(), Some("The"));
        assert_eq!(rows[0].subtitle, None);
        assert_eq!(rows[1].subtitle.as_deref(), Some("a waltz"));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let csv = "a,b\n1,2\n,\n3,4\n";
        let result = parse_str(csv, ',', "utf-8".into()).unwrap();
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn test_short_rows_allowed() {
        let csv = "a,b,c\n1\n";
        let result = parse_str(csv, ',', "utf-8".into()).unwrap();
        assert_eq!(result.rows[0], vec!["1".to_string()]);
    }

    #[test]
    fn test_empty_csv_error() {
        let result = parse_bytes(b"", None);
        assert!(matches!(result, Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_to_json_keys_by_header() {
        let result = parse_bytes(SHEET.as_bytes(), None).unwrap();
        let json = result.to_json();
        assert_eq!(json[0]["title"], "Sheik");
        assert_eq!(json[0]["subtitle"], "");
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let bytes = b"\xEF\xBB\xBFa,b\n1,2\n";
        let content = decode_content(bytes, "utf-8").unwrap();
        let result = parse_str(&content, ',', "utf-8".into()).unwrap();
        assert_eq!(result.headers[0], "a");
        assert_eq!(detect_encoding(bytes), "utf-8");
    }

    #[test]
    fn test_single_separator_stays_utf8() {
        let sheet = "id,article,title,subtitle,composer\n\
            1,The,Sheik,,\"Lake, M. L.; Snyder, Ted ǂ d 1881-1965\"\n";
        let result = parse_bytes(sheet.as_bytes(), None).unwrap();

        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.rows[0][4], "Lake, M. L.; Snyder, Ted ǂ d 1881-1965");

        let row = result.sheet_rows().next().unwrap();
        let fields = crate::transform::build_contributors(
            row.composer.as_deref(),
            crate::models::Heading::Primary,
            crate::models::Role::Composer,
        );
        let field = fields[0].to_field();
        assert_eq!(field.subfield('a'), Some("Snyder, Ted"));
        assert_eq!(field.subfield('d'), Some("1881-1965,"));
    }
}
