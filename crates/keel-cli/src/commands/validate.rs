//! Validate command

use std::path::PathBuf;

use clap::Args;

use crate::Result;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Manifest with one Cluster and any number of InstanceGroup documents
    pub manifest: PathBuf,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let graph = super::build_graph(&args.manifest, true)?;
    println!(
        "{}: {} tasks, all links resolved",
        args.manifest.display(),
        graph.len()
    );
    Ok(())
}
