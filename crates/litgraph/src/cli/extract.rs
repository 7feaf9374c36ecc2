use std::path::Path;

use anyhow::{bail, Result};
use litgraph_core::{CoreConfig, RelationshipExtractor};

use super::input::{print_json, read_mentions};

pub fn run(input: &Path, config: &CoreConfig, min_strength: Option<f64>) -> Result<()> {
    let min_strength = min_strength.unwrap_or(config.extraction.min_strength);
    if !(0.0..=1.0).contains(&min_strength) {
        bail!("min-strength must be within [0, 1], got {min_strength}");
    }

    let mentions = read_mentions(input)?;
    let relationships = RelationshipExtractor::default()
        .with_min_strength(min_strength)
        .extract_relationships(&mentions);

    eprintln!(
        "Extracted {} relationships from {} entities",
        relationships.len(),
        mentions.len()
    );
    print_json(&relationships)
}
