//! CLI subcommands

pub mod build;
pub mod schema;
pub mod validate;

use std::path::Path;

use keel_common::ClusterManifest;
use keel_model::{build_task_graph, ModelContext, TaskGraph};
use tracing::info;

use crate::{Error, Result};

/// Read a manifest from disk
pub fn load_manifest(path: &Path) -> Result<ClusterManifest> {
    let input = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ClusterManifest::from_yaml(&input)?)
}

/// Load a manifest and run every builder over it
pub fn build_graph(path: &Path, resolve: bool) -> Result<TaskGraph> {
    let ctx = ModelContext::from(load_manifest(path)?);
    let graph = build_task_graph(&ctx)?;
    if resolve {
        graph.resolve()?;
    }
    info!(
        cluster = %ctx.cluster_name(),
        tasks = graph.len(),
        "built task graph"
    );
    Ok(graph)
}
