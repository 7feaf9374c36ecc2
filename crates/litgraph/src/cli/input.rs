use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use litgraph_core::EntityMention;
use serde::Serialize;
use serde_json::Value;

/// Reads a JSON array from `path`, or from stdin when the path is `-`.
pub fn read_records(path: &Path) -> Result<Vec<Value>> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };

    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let Value::Array(records) = value else {
        bail!("{} must contain a JSON array", path.display());
    };
    Ok(records)
}

/// Reads entity mentions. Records that do not fit the mention schema, or
/// carry no name, are reported and skipped.
pub fn read_mentions(path: &Path) -> Result<Vec<EntityMention>> {
    let records = read_records(path)?;
    let total = records.len();

    let mentions: Vec<EntityMention> = records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| match serde_json::from_value::<EntityMention>(record) {
            Ok(mention) if mention.name.trim().is_empty() => {
                tracing::warn!("Skipping record {}: name is missing or blank", i);
                None
            }
            Ok(mention) => Some(mention),
            Err(e) => {
                tracing::warn!("Skipping record {}: {}", i, e);
                None
            }
        })
        .collect();

    if mentions.len() < total {
        eprintln!(
            "Skipped {} of {} records that are not entity mentions",
            total - mentions.len(),
            total
        );
    }
    Ok(mentions)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}
