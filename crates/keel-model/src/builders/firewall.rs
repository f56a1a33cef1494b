//! Firewall builder: one security group per instance group role

use std::collections::BTreeSet;

use keel_common::spec::InstanceGroupRole;
use keel_common::Result;
use tracing::debug;

use super::ModelBuilder;
use crate::context::ModelContext;
use crate::graph::TaskGraph;
use crate::task::{SecurityGroup, SecurityGroupRule};

/// Builds role security groups with unrestricted egress
///
/// Masters and nodes always get a group since other builders link to them;
/// bastions only when a bastion instance group exists.
#[derive(Debug)]
pub struct FirewallModelBuilder<'a> {
    ctx: &'a ModelContext,
}

impl<'a> FirewallModelBuilder<'a> {
    /// Create a builder over `ctx`
    pub fn new(ctx: &'a ModelContext) -> Self {
        Self { ctx }
    }

    fn roles(&self) -> BTreeSet<InstanceGroupRole> {
        [InstanceGroupRole::Master, InstanceGroupRole::Node]
            .into_iter()
            .chain(self.ctx.instance_groups().iter().map(|ig| ig.spec.role))
            .collect()
    }
}

impl ModelBuilder for FirewallModelBuilder<'_> {
    fn name(&self) -> &'static str {
        "firewall"
    }

    fn build(&self, graph: &mut TaskGraph) -> Result<()> {
        let roles = self.roles();
        for role in &roles {
            let plural = role.plural();
            graph.add_task(SecurityGroup {
                name: self.ctx.security_group_name(*role),
                vpc: self.ctx.link_to_vpc(),
                description: format!("Security group for {plural}"),
                remove_extra_rules: vec![],
            })?;
            graph.add_task(SecurityGroupRule {
                egress: true,
                cidr: Some("0.0.0.0/0".to_string()),
                ..SecurityGroupRule::new(
                    format!("{plural}-egress"),
                    self.ctx.link_to_security_group(*role),
                )
            })?;
        }

        debug!(roles = roles.len(), "built firewall tasks");
        Ok(())
    }
}
