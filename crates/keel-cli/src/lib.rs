//! keel CLI library

pub mod commands;
pub mod error;

pub use error::{Error, Result};

use clap::{Parser, Subcommand, ValueEnum};
use keel_common::telemetry::LogFormat;

/// keel - build infrastructure task graphs from cluster manifests
#[derive(Parser, Debug)]
#[command(name = "keel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Text, env = "KEEL_LOG_FORMAT")]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the task graph for a manifest and print it
    Build(commands::build::BuildArgs),
    /// Build and resolve the task graph, reporting problems only
    Validate(commands::validate::ValidateArgs),
    /// Print the JSON schema of the manifest documents
    Schema,
}

/// `--log-format` values
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    /// Run the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Build(args) => commands::build::run(args),
            Commands::Validate(args) => commands::validate::run(args),
            Commands::Schema => commands::schema::run(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_command() {
        let cli = Cli::try_parse_from(["keel", "build", "cluster.yaml", "--output", "json"]).unwrap();
        assert_eq!(cli.log_format, LogFormatArg::Text);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.manifest.to_str(), Some("cluster.yaml"));
                assert_eq!(args.output, commands::build::OutputFormat::Json);
                assert!(!args.no_resolve);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_log_format() {
        let cli = Cli::try_parse_from(["keel", "schema", "--log-format", "json"]).unwrap();
        assert_eq!(cli.log_format, LogFormatArg::Json);
        assert_eq!(LogFormat::from(cli.log_format), LogFormat::Json);
    }

    #[test]
    fn test_manifest_is_required() {
        assert!(Cli::try_parse_from(["keel", "validate"]).is_err());
    }
}
