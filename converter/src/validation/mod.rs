//! JSON Schema validation for MARC-in-JSON records.
//!
//! Records are checked against `schemas/marc-in-json.json` (Draft 7),
//! embedded at compile time. The schema requires a well-formed leader,
//! an 008 and a 245, single-character indicators, and non-empty subfield
//! values, so an empty name heading or title is reported here.
//!
//! # Example
//!
//! ```rust,ignore
//! use valva::marc::record_to_json;
//! use valva::validation::validate_marc_record;
//!
//! match validate_marc_record(&record_to_json(&record)) {
//!     Ok(()) => println!("Valid!"),
//!     Err(errors) => println!("Invalid: {:?}", errors),
//! }
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static MARC_RECORD_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/marc-in-json.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a Draft 7 schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick check: true when valid.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate one MARC-in-JSON record.
pub fn validate_marc_record(data: &Value) -> Result<(), Vec<String>> {
    validate(&MARC_RECORD_SCHEMA, data)
}

/// Quick check against the MARC-in-JSON schema.
pub fn is_valid_marc_record(data: &Value) -> bool {
    is_valid(&MARC_RECORD_SCHEMA, data)
}
