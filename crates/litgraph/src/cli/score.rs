use std::path::Path;

use anyhow::{bail, Result};
use console::style;
use litgraph_core::{ConfidenceScorer, CoreConfig};

use super::input::{print_json, read_mentions};

pub fn run(input: &Path, config: &CoreConfig, threshold: Option<f64>) -> Result<()> {
    let mut scoring = config.scoring.clone();
    if let Some(threshold) = threshold {
        if !(0.0..=1.0).contains(&threshold) {
            bail!("threshold must be within [0, 1], got {threshold}");
        }
        scoring.confidence_threshold = threshold;
    }

    let mentions = read_mentions(input)?;
    let scorer = ConfidenceScorer::new(scoring);
    let scored = scorer.recalculate_confidence(&mentions);
    let flagged = scorer.flag_for_review(&scored);
    let kept = scorer.filter(&flagged);

    for entity in kept.iter().filter(|e| e.needs_review == Some(true)) {
        eprintln!(
            "{} {}: {}",
            style("?").yellow(),
            entity.name,
            entity.review_reason.as_deref().unwrap_or_default()
        );
    }
    eprintln!(
        "Kept {} of {} entities (threshold {:.2})",
        kept.len(),
        mentions.len(),
        scorer.config().confidence_threshold
    );

    print_json(&kept)
}
