//! CLI Module
//!
//! Command-line front end for the synthesis engine. Every command prints a
//! JSON document on stdout; logs go to stderr.

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::style::{StyleRequest, DEFAULT_DURATION_SECS, DEFAULT_TEMPO, SUPPORTED_CONTAINER};

/// User id used when `--user` is not given
pub const DEFAULT_USER: &str = "local";

/// Sonora - deterministic music synthesis with per-user storage
#[derive(Parser, Debug)]
#[command(name = "sonora")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage root, overriding the configuration
    #[arg(short, long, global = true)]
    pub storage: Option<PathBuf>,

    /// User namespace to operate on
    #[arg(short, long, global = true, default_value = DEFAULT_USER)]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Style fields shared by `synthesize` and `render`
#[derive(Args, Debug, Clone)]
pub struct StyleArgs {
    /// Genre (classical, rock, jazz)
    pub genre: String,

    /// Tempo in beats per minute
    #[arg(short, long, default_value_t = DEFAULT_TEMPO)]
    pub tempo: u32,

    /// Instrument name (repeatable)
    #[arg(short, long = "instrument")]
    pub instruments: Vec<String>,

    /// Duration in seconds
    #[arg(short, long, default_value_t = DEFAULT_DURATION_SECS)]
    pub duration: f64,
}

impl StyleArgs {
    pub fn to_request(&self) -> StyleRequest {
        StyleRequest {
            genre: self.genre.clone(),
            tempo: self.tempo,
            instrumentation: self.instruments.clone(),
            duration_secs: self.duration,
            container: SUPPORTED_CONTAINER.to_string(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synthesize and store a new artifact
    #[command(name = "synthesize")]
    Synthesize {
        #[command(flatten)]
        style: StyleArgs,

        /// Artifact name (generated when omitted)
        #[arg(short, long)]
        name: Option<String>,

        /// Also export the container into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Synthesize straight to a file without storing it
    #[command(name = "render")]
    Render {
        #[command(flatten)]
        style: StyleArgs,

        /// Target file; only its base name is used
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List stored artifacts
    #[command(name = "list")]
    List,

    /// Show one artifact
    #[command(name = "get")]
    Get {
        /// Artifact name
        name: String,

        /// Export the container into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete an artifact and release its quota
    #[command(name = "remove")]
    Remove {
        /// Artifact name
        name: String,
    },

    /// Show quota usage
    #[command(name = "usage")]
    Usage,

    /// List supported genres
    #[command(name = "genres")]
    Genres,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_synthesize() {
        let cli = Cli::try_parse_from([
            "sonora", "--user", "bob", "synthesize", "jazz", "-t", "90", "-i", "piano", "-i",
            "bass", "-d", "2.5",
        ])
        .unwrap();

        assert_eq!(cli.user, "bob");
        match cli.command {
            Commands::Synthesize { style, name, .. } => {
                let request = style.to_request();
                assert_eq!(request.genre, "jazz");
                assert_eq!(request.tempo, 90);
                assert_eq!(request.instrumentation, vec!["piano", "bass"]);
                assert_eq!(request.duration_secs, 2.5);
                assert!(name.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_defaults_apply() {
        let cli = Cli::try_parse_from(["sonora", "render", "rock", "-o", "out.wav"]).unwrap();
        assert_eq!(cli.user, DEFAULT_USER);
        match cli.command {
            Commands::Render { style, output } => {
                assert_eq!(style.tempo, DEFAULT_TEMPO);
                assert_eq!(style.duration, DEFAULT_DURATION_SECS);
                assert_eq!(output, PathBuf::from("out.wav"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
