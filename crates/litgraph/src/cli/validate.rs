use std::path::Path;

use anyhow::{bail, Result};
use console::style;
use litgraph_core::{
    CoreConfig, EntityValidator, RelationshipValidator, ValidationResult, Validator,
};
use serde::Serialize;
use serde_json::Value;

use super::input::{print_json, read_records};

#[derive(Serialize)]
struct Report<'a> {
    index: usize,
    #[serde(flatten)]
    result: &'a ValidationResult,
}

pub fn run_entities(input: &Path, config: &CoreConfig) -> Result<()> {
    let records = read_records(input)?;

    let mut validator = EntityValidator::new();
    if let Some(threshold) = config.validation.low_confidence_warning {
        validator = validator.with_low_confidence_warning(threshold);
    }

    finish(&validator.validate_batch(records.as_slice()))
}

pub fn run_relationships(input: &Path, entities: Option<&Path>) -> Result<()> {
    let records = read_records(input)?;

    let mut validator = RelationshipValidator::new();
    if let Some(path) = entities {
        let names: Vec<String> = read_records(path)?
            .iter()
            .filter_map(|e| e.get("name").and_then(Value::as_str).map(String::from))
            .collect();
        validator = validator.with_known_entities(names);
    }

    finish(&validator.validate_batch(records.as_slice()))
}

fn finish(results: &[ValidationResult]) -> Result<()> {
    let reports: Vec<Report<'_>> = results
        .iter()
        .enumerate()
        .map(|(index, result)| Report { index, result })
        .collect();

    for report in &reports {
        for error in report.result.errors() {
            eprintln!("  {} [{}] {error}", style("✗").red(), report.index);
        }
        for warning in report.result.warnings() {
            eprintln!("  {} [{}] {warning}", style("!").yellow(), report.index);
        }
    }

    print_json(&reports)?;

    let invalid = results.iter().filter(|r| !r.is_valid()).count();
    eprintln!("Validated {} records: {} invalid", results.len(), invalid);
    if invalid > 0 {
        bail!("{invalid} records failed validation");
    }
    Ok(())
}
