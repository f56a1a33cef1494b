//! Build command

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use keel_model::TaskGraph;

use crate::Result;

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Manifest with one Cluster and any number of InstanceGroup documents
    pub manifest: PathBuf,

    /// Output format
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Yaml)]
    pub output: OutputFormat,

    /// Skip link resolution
    #[arg(long)]
    pub no_resolve: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

pub fn run(args: BuildArgs) -> Result<()> {
    let graph = super::build_graph(&args.manifest, !args.no_resolve)?;
    let rendered = render(&graph, args.output)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    Ok(())
}

/// Render the graph as a task list in the requested format
pub fn render(graph: &TaskGraph, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(graph)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(graph)?;
            json.push('\n');
            json
        }
    })
}
