//! Conversion pipeline: spreadsheet in, MARC files out.
//!
//! # Example
//!
//! ```rust,ignore
//! use valva::transform::pipeline::{convert, ConvertOptions};
//! use std::path::Path;
//!
//! let report = convert(Path::new("valva.csv"), &ConvertOptions::default())?;
//! println!("Wrote {} records", report.stats.written);
//! ```
//!
//! Output files are opened once, passed explicitly to the row loop and
//! finished at the end. A row that cannot be converted cleanly is logged
//! and still written; only I/O, CSV and template errors stop the run.

use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::assemble::assemble;
use super::template::RecordTemplate;
use crate::error::{ConvertError, ConvertResult, WriteResult};
use crate::logs::{log_info, log_success, log_warning, log_warning_indent};
use crate::marc::{
    check_lengths, record_to_json, JsonWriter, MarcWriter, Record, RecordWriter, XmlWriter,
};
use crate::models::SheetRow;
use crate::parser::{parse_csv_file, ParseResult};
use crate::validation::validate_marc_record;

/// Environment variable overriding the default output directory.
pub const OUT_DIR_ENV: &str = "VALVA_OUT_DIR";

const DEFAULT_OUT_DIR: &str = "./out";
const DEFAULT_NAME: &str = "valva";

/// Options for a conversion run
#[derive(Debug, Clone, Serialize)]
pub struct ConvertOptions {
    /// Directory receiving the output files
    pub out_dir: PathBuf,

    /// File stem of the `.mrc` and `.xml` outputs
    pub name: String,

    /// CSV delimiter (auto-detected when `None`)
    pub delimiter: Option<char>,

    /// Template file replacing the built-in template
    pub template_path: Option<PathBuf>,

    /// Also write MARC-in-JSON to this path
    pub json_path: Option<PathBuf>,

    /// Reorder fields by tag range before writing
    pub sort_fields: bool,

    /// Print each record in text form to stdout
    pub print_records: bool,

    /// Skip schema validation of each record
    pub skip_validation: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        let out_dir = std::env::var(OUT_DIR_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OUT_DIR.to_string());

        Self {
            out_dir: PathBuf::from(out_dir),
            name: DEFAULT_NAME.to_string(),
            delimiter: None,
            template_path: None,
            json_path: None,
            sort_fields: false,
            print_records: false,
            skip_validation: false,
        }
    }
}

impl ConvertOptions {
    pub fn marc_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.mrc", self.name))
    }

    pub fn xml_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.xml", self.name))
    }
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl From<&ParseResult> for CsvInfo {
    fn from(parsed: &ParseResult) -> Self {
        Self {
            encoding: parsed.encoding.clone(),
            delimiter: parsed.delimiter,
            headers: parsed.headers.clone(),
            row_count: parsed.rows.len(),
        }
    }
}

/// Counts from the row loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowStats {
    /// Records written to every output
    pub written: usize,
    /// Rows that raised at least one warning
    pub rows_with_warnings: usize,
    /// Total warnings
    pub warnings: usize,
    /// Records failing schema validation (still written)
    pub invalid: usize,
    /// Records over the ISO 2709 length limits (not written)
    pub skipped: usize,
}

/// Result of a conversion run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertReport {
    pub csv_info: CsvInfo,
    #[serde(flatten)]
    pub stats: RowStats,
    /// Files written
    pub outputs: Vec<PathBuf>,
}

/// The set of open output files, written to as one.
pub struct Outputs {
    writers: Vec<Box<dyn RecordWriter>>,
    paths: Vec<PathBuf>,
}

impl Outputs {
    /// Create the output directory and open every output file.
    pub fn open(options: &ConvertOptions) -> ConvertResult<Self> {
        fs::create_dir_all(&options.out_dir).map_err(|source| ConvertError::OutputDir {
            path: options.out_dir.display().to_string(),
            source,
        })?;

        let mut outputs = Self { writers: Vec::new(), paths: Vec::new() };

        let marc_path = options.marc_path();
        outputs.push(marc_path.clone(), Box::new(MarcWriter::new(create(&marc_path)?)));

        let xml_path = options.xml_path();
        outputs.push(xml_path.clone(), Box::new(XmlWriter::new(create(&xml_path)?)?));

        if let Some(ref json_path) = options.json_path {
            outputs.push(json_path.clone(), Box::new(JsonWriter::new(create(json_path)?)));
        }

        Ok(outputs)
    }

    fn push(&mut self, path: PathBuf, writer: Box<dyn RecordWriter>) {
        self.paths.push(path);
        self.writers.push(writer);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

fn create(path: &Path) -> ConvertResult<BufWriter<File>> {
    let file = File::create(path).map_err(crate::error::WriteError::from)?;
    Ok(BufWriter::new(file))
}

impl RecordWriter for Outputs {
    fn write_record(&mut self, record: &Record) -> WriteResult<()> {
        for writer in &mut self.writers {
            writer.write_record(record)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> WriteResult<()> {
        for writer in &mut self.writers {
            writer.finish()?;
        }
        Ok(())
    }
}

/// Convert a spreadsheet file.
///
/// 1. Parses the CSV with encoding/delimiter detection
/// 2. Loads the template (built-in unless a path is given)
/// 3. Opens the outputs
/// 4. Converts and writes every row
/// 5. Finishes the outputs
pub fn convert(input: &Path, options: &ConvertOptions) -> ConvertResult<ConvertReport> {
    log_info(format!("Reading {}", input.display()));
    let parsed = parse_csv_file(input, options.delimiter)?;
    let csv_info = CsvInfo::from(&parsed);
    log_success(format!(
        "{} rows, encoding {}, delimiter '{}'",
        csv_info.row_count,
        csv_info.encoding,
        format_delimiter(csv_info.delimiter)
    ));

    let template = match options.template_path {
        Some(ref path) => {
            log_info(format!("Using template {}", path.display()));
            RecordTemplate::from_file(path)?
        }
        None => RecordTemplate::default(),
    };

    let mut outputs = Outputs::open(options)?;
    let stats = convert_rows(parsed.sheet_rows(), &template, options, &mut outputs)?;
    outputs.finish()?;

    for path in outputs.paths() {
        log_success(format!("Wrote {}", path.display()));
    }
    log_summary(&stats);

    Ok(ConvertReport {
        csv_info,
        stats,
        outputs: outputs.paths().to_vec(),
    })
}

/// Convert rows in order, writing each record to `sink`.
///
/// The sink is not finished here; the caller owns it.
pub fn convert_rows<I>(
    rows: I,
    template: &RecordTemplate,
    options: &ConvertOptions,
    sink: &mut dyn RecordWriter,
) -> ConvertResult<RowStats>
where
    I: IntoIterator<Item = SheetRow>,
{
    let mut stats = RowStats::default();

    for (index, row) in rows.into_iter().enumerate() {
        // header is line 1
        let line = index + 2;
        let assembled = assemble(&row, template)?;
        let record = if options.sort_fields {
            assembled.record.sorted()
        } else {
            assembled.record
        };

        if !assembled.warnings.is_empty() {
            stats.rows_with_warnings += 1;
            stats.warnings += assembled.warnings.len();
            log_warning(format!("Row {}:", line));
            for warning in &assembled.warnings {
                log_warning_indent(warning.to_string(), 1);
            }
        }

        if let Err(e) = check_lengths(&record) {
            stats.skipped += 1;
            log_warning(format!("Row {}: record skipped, {}", line, e));
            continue;
        }

        if !options.skip_validation {
            if let Err(errors) = validate_marc_record(&record_to_json(&record)) {
                stats.invalid += 1;
                log_warning(format!("Row {}: record fails validation", line));
                for err in errors.iter().take(3) {
                    log_warning_indent(err.clone(), 1);
                }
            }
        }

        sink.write_record(&record)?;
        stats.written += 1;

        if options.print_records {
            println!("{}", record);
        }
    }

    Ok(stats)
}

fn log_summary(stats: &RowStats) {
    log_success(format!("{} records converted", stats.written));
    if stats.warnings > 0 {
        log_warning(format!(
            "{} warnings on {} rows",
            stats.warnings, stats.rows_with_warnings
        ));
    }
    if stats.invalid > 0 {
        log_warning(format!("{} records failed validation", stats.invalid));
    }
    if stats.skipped > 0 {
        log_warning(format!("{} records skipped", stats.skipped));
    }
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
