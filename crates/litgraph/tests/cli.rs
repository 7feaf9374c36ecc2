use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Runs the binary with the user config directory pointed into `dir`, so a
/// developer's own config never leaks into a test.
fn litgraph(dir: &Path) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("litgraph").into();
    cmd.current_dir(dir);
    cmd.env("NO_COLOR", "1");
    cmd.env("XDG_CONFIG_HOME", dir);
    cmd.env_remove("LITGRAPH_CONFIG");
    cmd
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

const SCENARIO_MENTIONS: &str = r#"[
    {"name": "GNN", "type": "method", "confidence": 0.95, "occurrences": 8, "relationship_count": 5},
    {"name": "Graph Neural Network", "type": "method", "confidence": 0.92, "occurrences": 5, "relationship_count": 5},
    {"name": "CNN", "type": "method", "confidence": 0.85, "occurrences": 6, "relationship_count": 4}
]"#;

const ABBREVIATION_CONFIG: &str = r#"
[normalization.abbreviations]
GNN = "Graph Neural Network"
"#;

const EXTRACTION_MENTIONS: &str = r#"[
    {"name": "GAT", "type": "method", "confidence": 0.9, "context": "GAT uses attention and improves GNN performance"},
    {"name": "Attention", "type": "concept", "confidence": 0.8},
    {"name": "GNN", "type": "method", "confidence": 0.85}
]"#;

// --- Binary startup ---

#[test]
fn binary_runs() {
    let mut cmd: Command = cargo_bin_cmd!("litgraph").into();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("litgraph"));
}

#[test]
fn missing_input_fails() {
    let tmp = TempDir::new().unwrap();
    litgraph(tmp.path())
        .args(["link", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn non_array_input_fails() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(tmp.path(), "mentions.json", r#"{"name": "GNN"}"#);
    litgraph(tmp.path())
        .arg("link")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must contain a JSON array"));
}

// --- Config ---

#[test]
fn invalid_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config = write_file(tmp.path(), "config.toml", "[similarity]\nthreshold = 1.5\n");
    let input = write_file(tmp.path(), "mentions.json", SCENARIO_MENTIONS);
    litgraph(tmp.path())
        .arg("--config")
        .arg(&config)
        .arg("link")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn config_from_environment() {
    let tmp = TempDir::new().unwrap();
    let config = write_file(tmp.path(), "config.toml", ABBREVIATION_CONFIG);
    let input = write_file(tmp.path(), "mentions.json", SCENARIO_MENTIONS);
    litgraph(tmp.path())
        .env("LITGRAPH_CONFIG", &config)
        .arg("link")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""GNN": "Graph Neural Network""#));
}

// --- Link ---

#[test]
fn link_merges_abbreviation() {
    let tmp = TempDir::new().unwrap();
    let config = write_file(tmp.path(), "config.toml", ABBREVIATION_CONFIG);
    let input = write_file(tmp.path(), "mentions.json", SCENARIO_MENTIONS);
    litgraph(tmp.path())
        .arg("-c")
        .arg(&config)
        .arg("link")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""GNN": "Graph Neural Network""#))
        .stdout(predicate::str::contains(r#""CNN": "CNN""#))
        .stderr(predicate::str::contains("into 2 groups"));
}

#[test]
fn link_without_abbreviations_keeps_names_apart() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(tmp.path(), "mentions.json", SCENARIO_MENTIONS);
    litgraph(tmp.path())
        .arg("link")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""GNN": "GNN""#))
        .stderr(predicate::str::contains("into 3 groups"));
}

#[test]
fn link_reads_stdin() {
    let tmp = TempDir::new().unwrap();
    litgraph(tmp.path())
        .args(["link", "-"])
        .write_stdin(SCENARIO_MENTIONS)
        .assert()
        .success()
        .stdout(predicate::str::contains("canonical_map"));
}

#[test]
fn link_skips_records_without_a_name() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(
        tmp.path(),
        "mentions.json",
        r#"[{"name": "BERT", "type": "model"}, {"type": "model"}, {"name": "  ", "type": "model"}]"#,
    );
    litgraph(tmp.path())
        .arg("link")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""": """#).not())
        .stderr(predicate::str::contains("Skipped 2 of 3 records"));
}

#[test]
fn link_skips_mistyped_records() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(
        tmp.path(),
        "mentions.json",
        r#"[{"name": "BERT", "type": "model"}, {"name": "GPT", "type": "model", "confidence": "high"}]"#,
    );
    litgraph(tmp.path())
        .arg("link")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("GPT").not())
        .stderr(predicate::str::contains("Skipped 1 of 2 records"));
}

// --- Score ---

#[test]
fn score_flags_borderline() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(
        tmp.path(),
        "mentions.json",
        r#"[
            {"name": "Dropout", "type": "method", "confidence": 0.52},
            {"name": "Adam", "type": "method", "confidence": 0.9}
        ]"#,
    );
    litgraph(tmp.path())
        .args(["score", "--threshold", "0.5"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("borderline"))
        .stderr(predicate::str::contains("Kept 2 of 2 entities"));
}

#[test]
fn score_drops_low_confidence() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(
        tmp.path(),
        "mentions.json",
        r#"[
            {"name": "Noise", "type": "concept", "confidence": 0.1},
            {"name": "Adam", "type": "method", "confidence": 0.9}
        ]"#,
    );
    litgraph(tmp.path())
        .args(["score", "--threshold", "0.5"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Adam"))
        .stdout(predicate::str::contains("Noise").not());
}

#[test]
fn score_rejects_out_of_range_threshold() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(tmp.path(), "mentions.json", SCENARIO_MENTIONS);
    litgraph(tmp.path())
        .args(["score", "--threshold", "2"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("threshold must be within"));
}

// --- Extract ---

#[test]
fn extract_finds_typed_relationships() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(tmp.path(), "mentions.json", EXTRACTION_MENTIONS);
    litgraph(tmp.path())
        .arg("extract")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type": "uses""#))
        .stdout(predicate::str::contains(r#""type": "improves""#))
        .stdout(predicate::str::contains(r#""target": "Attention""#))
        .stderr(predicate::str::contains("Extracted 2 relationships"));
}

#[test]
fn extract_min_strength_drops_everything() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(tmp.path(), "mentions.json", EXTRACTION_MENTIONS);
    litgraph(tmp.path())
        .args(["extract", "--min-strength", "1.0"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Extracted 0 relationships"));
}

// --- Validate ---

#[test]
fn validate_entities_passes() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(tmp.path(), "entities.json", SCENARIO_MENTIONS);
    litgraph(tmp.path())
        .args(["validate", "entities"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("0 invalid"));
}

#[test]
fn validate_entities_reports_missing_name() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(
        tmp.path(),
        "entities.json",
        r#"[{"type": "method", "confidence": 0.5}]"#,
    );
    litgraph(tmp.path())
        .args(["validate", "entities"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 records failed validation"));
}

#[test]
fn validate_rejects_self_loop() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(
        tmp.path(),
        "relationships.json",
        r#"[{"source": "A", "target": "A", "type": "uses", "strength": 0.7}]"#,
    );
    litgraph(tmp.path())
        .args(["validate", "relationships"])
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Self-loop"));
}

#[test]
fn validate_relationships_against_known_entities() {
    let tmp = TempDir::new().unwrap();
    let entities = write_file(tmp.path(), "entities.json", SCENARIO_MENTIONS);
    let input = write_file(
        tmp.path(),
        "relationships.json",
        r#"[{"source": "GNN", "target": "ResNet", "type": "compared_with", "strength": 0.5}]"#,
    );
    litgraph(tmp.path())
        .args(["validate", "relationships"])
        .arg(&input)
        .arg("--entities")
        .arg(&entities)
        .assert()
        .failure()
        .stderr(predicate::str::contains("'ResNet' is not a known entity"));
}

// --- Build ---

#[test]
fn build_prints_full_output() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(tmp.path(), "mentions.json", EXTRACTION_MENTIONS);
    litgraph(tmp.path())
        .arg("build")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("relationships"))
        .stdout(predicate::str::contains("stats"))
        .stderr(predicate::str::contains("Graph:"));
}

#[test]
fn build_summary_only() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(tmp.path(), "mentions.json", SCENARIO_MENTIONS);
    litgraph(tmp.path())
        .args(["build", "--summary"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""input_mentions": 3"#))
        .stdout(predicate::str::contains("canonical_map").not());
}
