mod cli;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands, ValidateCommands};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli::settings::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Link { input } => cli::link::run(&input, &config),
        Commands::Score { input, threshold } => cli::score::run(&input, &config, threshold),
        Commands::Extract { input, min_strength } => {
            cli::extract::run(&input, &config, min_strength)
        }
        Commands::Validate { command } => match command {
            ValidateCommands::Entities { input } => cli::validate::run_entities(&input, &config),
            ValidateCommands::Relationships { input, entities } => {
                cli::validate::run_relationships(&input, entities.as_deref())
            }
        },
        Commands::Build { input, summary_only } => cli::build::run(&input, &config, summary_only),
    }
}
