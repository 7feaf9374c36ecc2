use std::path::Path;

use anyhow::Result;
use console::style;
use litgraph_core::{CoreConfig, EntityLinker, Normalizer, SimilarityEngine};

use super::input::{print_json, read_mentions};

pub fn run(input: &Path, config: &CoreConfig) -> Result<()> {
    let mentions = read_mentions(input)?;

    let engine = SimilarityEngine::new(Normalizer::new(&config.normalization), &config.similarity);
    let linker = EntityLinker::new(engine, config.similarity.threshold);
    let output = linker.link_entities(&mentions);

    for group in output.merged_groups() {
        eprintln!(
            "{} {} <- {}",
            style("●").green(),
            style(&group.canonical_name).bold(),
            group.members.join(", ")
        );
    }
    eprintln!(
        "Linked {} mentions into {} groups",
        mentions.len(),
        output.groups.len()
    );

    print_json(&output)
}
