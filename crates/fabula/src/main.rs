//! fabula CLI binary.
//!
//! - `run`: produce (and optionally upload) one video per language
//! - `profile`: resolve a language's localization profile
//! - `config`: print the effective configuration

use clap::Parser;
use fabula::{FabulaConfig, init_logging};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, run_topic, show_config, show_profile};

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = FabulaConfig::load(cli.config.as_deref())?;
    init_logging(config.logging(), cli.verbose, cli.json_logs)?;

    match cli.command {
        Commands::Run {
            topic,
            languages,
            upload,
        } => {
            let report = run_topic(&config, &topic, languages, upload).await?;
            if report.videos.is_empty() {
                return Err("no video was produced".into());
            }
        }

        Commands::Profile { code } => {
            show_profile(&config, &code).await?;
        }

        Commands::Config => {
            show_config(&config)?;
        }
    }

    Ok(())
}
