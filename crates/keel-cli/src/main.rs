//! keel CLI
//!
//! Builds infrastructure task graphs from cluster manifests.

use clap::Parser;
use keel_common::telemetry::{init_logging, LogConfig};
use tracing::error;

use keel_cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(LogConfig {
        format: cli.log_format.into(),
        ..Default::default()
    })?;

    if let Err(err) = cli.run() {
        error!(cluster = ?err.cluster(), field = ?err.field(), "{err}");
        return Err(err.into());
    }
    Ok(())
}
