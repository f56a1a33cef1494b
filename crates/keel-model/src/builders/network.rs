//! Network builder: the cluster VPC and its subnets

use keel_common::Result;
use tracing::debug;

use super::ModelBuilder;
use crate::context::ModelContext;
use crate::graph::TaskGraph;
use crate::task::{Subnet, Vpc};

/// Builds the VPC and one subnet task per cluster subnet
#[derive(Debug)]
pub struct NetworkModelBuilder<'a> {
    ctx: &'a ModelContext,
}

impl<'a> NetworkModelBuilder<'a> {
    /// Create a builder over `ctx`
    pub fn new(ctx: &'a ModelContext) -> Self {
        Self { ctx }
    }
}

impl ModelBuilder for NetworkModelBuilder<'_> {
    fn name(&self) -> &'static str {
        "network"
    }

    fn build(&self, graph: &mut TaskGraph) -> Result<()> {
        let spec = &self.ctx.cluster().spec;

        graph.add_task(Vpc {
            name: self.ctx.cluster_name().to_string(),
            cidr: spec.network_cidr.clone(),
        })?;

        for subnet in &spec.subnets {
            graph.add_task(Subnet {
                name: self.ctx.subnet_name(&subnet.name),
                vpc: self.ctx.link_to_vpc(),
                availability_zone: subnet.zone.clone(),
                cidr: subnet.cidr.clone(),
                type_: subnet.type_.clone(),
            })?;
        }

        debug!(subnets = spec.subnets.len(), "built network tasks");
        Ok(())
    }
}
