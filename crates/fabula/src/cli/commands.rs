//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Accept only codes that can name a folder under the output root.
fn language_code(code: &str) -> Result<String, String> {
    fabula::validate_language(code)
        .map(|()| code.to_string())
        .map_err(|_| format!("'{}' is not a language code such as en or pt-BR", code))
}

/// fabula - narrated Bible-story videos from a single topic
#[derive(Parser, Debug)]
#[command(name = "fabula")]
#[command(about = "Generate narrated Bible-story videos and publish them", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Extra configuration file, applied over every other source
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Produce one video per language for a topic
    Run {
        /// Story topic, e.g. "Joseph's Coat"
        #[arg(long)]
        topic: String,

        /// Narration language code; repeat for several (defaults to the configured list)
        #[arg(long = "language", short = 'l', value_parser = language_code)]
        languages: Vec<String>,

        /// Upload every finished video
        #[arg(long)]
        upload: bool,
    },

    /// Resolve and print the localization profile for a language
    Profile {
        /// Language code, e.g. "te"
        code: String,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_languages_are_collected() {
        let cli = Cli::try_parse_from(["fabula", "run", "--topic", "Ruth", "-l", "en", "-l", "te"])
            .unwrap();
        match cli.command {
            Commands::Run { languages, .. } => assert_eq!(languages, vec!["en", "te"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn path_like_language_is_rejected() {
        for code in ["../x", "en/te", "/tmp"] {
            assert!(
                Cli::try_parse_from(["fabula", "run", "--topic", "Ruth", "--language", code])
                    .is_err(),
                "{code}"
            );
        }
    }
}
