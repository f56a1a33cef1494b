//! Model builders
//!
//! Each builder translates one concern of the cluster spec into tasks and
//! appends them to the shared [`TaskGraph`]. Builders hold no state between
//! passes and link to tasks owned by other builders by name only.

mod api_loadbalancer;
mod autoscaling;
mod firewall;
mod network;

pub use api_loadbalancer::{ApiLoadBalancerBuilder, LOAD_BALANCER_DEFAULT_IDLE_TIMEOUT};
pub use autoscaling::AutoscalingGroupModelBuilder;
pub use firewall::FirewallModelBuilder;
pub use network::NetworkModelBuilder;

use keel_common::Result;
use tracing::debug_span;

use crate::context::ModelContext;
use crate::graph::TaskGraph;

/// Translates part of the cluster spec into tasks
pub trait ModelBuilder {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Append this builder's tasks to `graph`
    ///
    /// Tasks appended before an error are not retracted; callers discard the
    /// whole graph when any builder fails.
    fn build(&self, graph: &mut TaskGraph) -> Result<()>;
}

/// Every builder, in the order they run
pub fn default_builders(ctx: &ModelContext) -> Vec<Box<dyn ModelBuilder + '_>> {
    vec![
        Box::new(NetworkModelBuilder::new(ctx)),
        Box::new(FirewallModelBuilder::new(ctx)),
        Box::new(AutoscalingGroupModelBuilder::new(ctx)),
        Box::new(ApiLoadBalancerBuilder::new(ctx)),
    ]
}

/// Run every default builder against a fresh graph
///
/// Links are not resolved; call [`TaskGraph::resolve`] on the result.
pub fn build_task_graph(ctx: &ModelContext) -> Result<TaskGraph> {
    let mut graph = TaskGraph::new();
    for builder in default_builders(ctx) {
        let _span = debug_span!("model_builder", builder = builder.name()).entered();
        builder.build(&mut graph)?;
    }
    Ok(graph)
}
