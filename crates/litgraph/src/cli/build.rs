use std::path::Path;

use anyhow::Result;
use console::style;
use litgraph_core::{CoreConfig, Pipeline, PipelineOutput};

use super::input::{print_json, read_mentions};

pub fn run(input: &Path, config: &CoreConfig, summary_only: bool) -> Result<()> {
    let mentions = read_mentions(input)?;
    let output = Pipeline::new(config.clone()).run(&mentions);

    print_summary(&output);

    if summary_only {
        print_json(&output.stats)
    } else {
        print_json(&output)
    }
}

fn print_summary(output: &PipelineOutput) {
    let stats = &output.stats;
    let graph = output.graph();

    let marker = if stats.has_errors() {
        style("●").red()
    } else {
        style("●").green()
    };
    eprintln!(
        "{marker} {} mentions -> {} entities, {} relationships",
        stats.input_mentions, stats.kept_entities, stats.relationships
    );
    eprintln!(
        "  Groups merged: {}, dropped: {}, flagged: {}",
        stats.merged_groups, stats.dropped_entities, stats.flagged_entities
    );
    eprintln!(
        "  Graph: {} nodes, {} edges, {} components, {} isolated",
        graph.node_count(),
        graph.edge_count(),
        graph.component_count(),
        stats.isolated_entities
    );
    if stats.has_errors() {
        eprintln!(
            "  Invalid: {} entities, {} relationships",
            stats.invalid_entities, stats.invalid_relationships
        );
    }
}
