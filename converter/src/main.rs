//! valva2marc CLI - Convert the Valva spreadsheet to MARC records
//!
//! # Main Commands
//!
//! ```bash
//! valva2marc convert valva.csv             # Write ./out/valva.mrc and ./out/valva.xml
//! valva2marc convert valva.csv -o dist --json dist/valva.json --sort-fields
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! valva2marc parse valva.csv               # Spreadsheet rows as JSON
//! valva2marc contributors "Lake, M. L. ǂ d 1879-1955" --role arranger
//! valva2marc template                      # Built-in record template as JSON
//! valva2marc validate valva.json           # Check a MARC-in-JSON file
//! ```

use clap::{Parser, Subcommand};
use log::LevelFilter;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use valva::logs::{init_terminal, log_error, log_info, log_success, log_warning, parse_level};
use valva::transform::format_delimiter;
use valva::{
    build_contributors, convert, parse_csv_file, validate_marc_record, ConvertOptions, Heading,
    RecordTemplate, Role,
};

/// Environment variable selecting the log level.
const LOG_ENV: &str = "VALVA_LOG";

#[derive(Parser)]
#[command(name = "valva2marc")]
#[command(about = "Convert the Valva collection spreadsheet to MARC 21 records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a CSV file to ISO 2709 and MARCXML
    Convert {
        /// Input CSV file
        input: PathBuf,

        /// Output directory (default: $VALVA_OUT_DIR or ./out)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// File stem of the outputs
        #[arg(short, long, default_value = "valva")]
        name: String,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Record template JSON file (default: built-in)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Also write MARC-in-JSON to this file
        #[arg(long)]
        json: Option<PathBuf>,

        /// Group fields by tag range before writing
        #[arg(long)]
        sort_fields: bool,

        /// Print each record to stdout
        #[arg(long)]
        print: bool,

        /// Skip validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Parse a CSV file and output its rows as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the headings built from a contributor string
    Contributors {
        /// Raw contributor cell, e.g. "Snyder, Ted ǂ d 1881-; Smith, Harry B."
        raw: String,

        /// Build the main entry (100) instead of added entries (700)
        #[arg(long)]
        primary: bool,

        /// Contributor role (composer, arranger, lyricist)
        #[arg(short, long, default_value = "composer")]
        role: String,
    },

    /// Print the built-in record template as JSON
    Template {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a MARC-in-JSON file (array of records)
    Validate {
        /// Input JSON file
        input: PathBuf,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| parse_level(&v))
        .unwrap_or(LevelFilter::Info);
    init_terminal(level);

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            out_dir,
            name,
            delimiter,
            template,
            json,
            sort_fields,
            print,
            no_validate,
        } => {
            let defaults = ConvertOptions::default();
            let options = ConvertOptions {
                out_dir: out_dir.unwrap_or(defaults.out_dir),
                name,
                delimiter,
                template_path: template,
                json_path: json,
                sort_fields,
                print_records: print,
                skip_validation: no_validate,
            };
            cmd_convert(&input, &options)
        }

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Contributors { raw, primary, role } => cmd_contributors(&raw, primary, &role),

        Commands::Template { output } => cmd_template(output.as_deref()),

        Commands::Validate { input } => cmd_validate(&input),
    };

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn cmd_convert(input: &Path, options: &ConvertOptions) -> Result<(), Box<dyn std::error::Error>> {
    let report = convert(input, options)?;
    let stats = &report.stats;
    if stats.invalid > 0 || stats.warnings > 0 || stats.skipped > 0 {
        log_warning("Done, with warnings");
    } else {
        log_success("Done");
    }
    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    log_info(format!("Parsing CSV: {}", input.display()));

    let result = parse_csv_file(input, delimiter)?;

    log_info(format!("Encoding: {}", result.encoding));
    log_info(format!(
        "Delimiter: '{}'{}",
        format_delimiter(result.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    ));
    log_info(format!("Columns: {}", result.headers.join(", ")));
    log_success(format!("Parsed {} rows", result.rows.len()));

    let json = serde_json::to_string_pretty(&result.to_json())?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_contributors(
    raw: &str,
    primary: bool,
    role: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let role = Role::from_term(role).ok_or_else(|| format!("Unknown role: {}", role))?;
    let heading = if primary { Heading::Primary } else { Heading::Added };

    let fields = build_contributors(Some(raw), heading, role);
    for field in &fields {
        println!("{}", field.to_field());
    }
    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}

fn cmd_template(output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let json = RecordTemplate::default().to_json()?;
    write_output(&json, output)
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    log_info(format!("Validating: {}", input.display()));

    let content = fs::read_to_string(input)?;
    let records: Vec<Value> = serde_json::from_str(&content)?;

    let mut valid = 0;
    let mut invalid = 0;

    for (i, record) in records.iter().enumerate() {
        match validate_marc_record(record) {
            Ok(()) => valid += 1,
            Err(errors) => {
                invalid += 1;
                if invalid <= 5 {
                    log_error(format!("Record {} invalid:", i));
                    for err in errors.iter().take(3) {
                        log_error(format!("   - {}", err));
                    }
                }
            }
        }
    }

    log_info(format!("Results: {} valid, {} invalid", valid, invalid));

    if invalid > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            log_success(format!("Output written to: {}", p.display()));
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
