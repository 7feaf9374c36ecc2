pub mod build;
pub mod extract;
pub mod input;
pub mod link;
pub mod score;
pub mod settings;
pub mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "litgraph",
    about = "Build knowledge-graph entities and relationships from research mentions",
    version
)]
pub struct Cli {
    /// Configuration file (TOML). Falls back to $LITGRAPH_CONFIG, then the
    /// user config directory.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cluster mentions and print the canonical map and groups
    Link {
        /// JSON array of entity mentions ("-" for stdin)
        input: PathBuf,
    },
    /// Recalculate confidence, flag for review and filter
    Score {
        /// JSON array of entity mentions ("-" for stdin)
        input: PathBuf,
        /// Override the configured confidence threshold
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Extract typed relationships from entity context
    Extract {
        /// JSON array of entity mentions ("-" for stdin)
        input: PathBuf,
        /// Override the configured minimum relationship strength
        #[arg(long = "min-strength")]
        min_strength: Option<f64>,
    },
    /// Check records for integrity problems
    Validate {
        #[command(subcommand)]
        command: ValidateCommands,
    },
    /// Run the whole pipeline
    Build {
        /// JSON array of entity mentions ("-" for stdin)
        input: PathBuf,
        /// Print only the run statistics
        #[arg(long = "summary")]
        summary_only: bool,
    },
}

#[derive(Subcommand)]
pub enum ValidateCommands {
    /// Validate entity records
    Entities {
        /// JSON array of entity records ("-" for stdin)
        input: PathBuf,
    },
    /// Validate relationship records
    Relationships {
        /// JSON array of relationship records ("-" for stdin)
        input: PathBuf,
        /// Entity records whose names endpoints must refer to
        #[arg(long)]
        entities: Option<PathBuf>,
    },
}
