//! Autoscaling group builder: one group per instance group

use keel_common::{Error, Result};
use tracing::debug;

use super::ModelBuilder;
use crate::context::ModelContext;
use crate::graph::TaskGraph;
use crate::task::AutoscalingGroup;

/// Instance count when an instance group sets no minimum
const DEFAULT_MIN_SIZE: u32 = 1;

/// Builds the autoscaling group backing each instance group
#[derive(Debug)]
pub struct AutoscalingGroupModelBuilder<'a> {
    ctx: &'a ModelContext,
}

impl<'a> AutoscalingGroupModelBuilder<'a> {
    /// Create a builder over `ctx`
    pub fn new(ctx: &'a ModelContext) -> Self {
        Self { ctx }
    }
}

impl ModelBuilder for AutoscalingGroupModelBuilder<'_> {
    fn name(&self) -> &'static str {
        "autoscaling"
    }

    fn build(&self, graph: &mut TaskGraph) -> Result<()> {
        for ig in self.ctx.instance_groups() {
            let min_size = ig.spec.min_size.unwrap_or(DEFAULT_MIN_SIZE);
            let max_size = ig.spec.max_size.unwrap_or(min_size);
            if max_size < min_size {
                return Err(Error::validation_for_field(
                    self.ctx.cluster_name(),
                    format!("instanceGroups[{}].spec.maxSize", ig.name),
                    format!("maxSize {max_size} is below minSize {min_size}"),
                ));
            }

            graph.add_task(AutoscalingGroup {
                name: self.ctx.autoscaling_group_name(ig),
                min_size,
                max_size,
                instance_type: ig.spec.machine_type.clone(),
                subnets: ig
                    .spec
                    .subnets
                    .iter()
                    .map(|s| self.ctx.link_to_subnet_named(s))
                    .collect(),
                security_groups: vec![self.ctx.link_to_security_group(ig.spec.role)],
            })?;
        }

        debug!(
            groups = self.ctx.instance_groups().len(),
            "built autoscaling group tasks"
        );
        Ok(())
    }
}
