//! API load balancer builder
//!
//! Fronts the Kubernetes API with a load balancer: one per cluster, with its
//! own security group, ingress from the allowed API CIDRs, a rule letting the
//! load balancer reach the masters, and one attachment per master instance
//! group.

use std::collections::BTreeMap;
use std::time::Duration;

use keel_common::spec::{ClusterSubnetSpec, InstanceGroupRole, LoadBalancerType, SubnetType};
use keel_common::{Error, Result, API_PORT};
use tracing::{debug, info};

use super::ModelBuilder;
use crate::context::ModelContext;
use crate::graph::TaskGraph;
use crate::link::Link;
use crate::selector::SubnetSelector;
use crate::task::{
    LoadBalancer, LoadBalancerAttachment, LoadBalancerConnectionSettings,
    LoadBalancerHealthCheck, LoadBalancerListener, SecurityGroup, SecurityGroupRule, Subnet,
};

/// Idle timeout used when the cluster sets none
pub const LOAD_BALANCER_DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Prefix of every API load balancer resource name
const API_PREFIX: &str = "api";

/// Scheme marker of VPC-only load balancers
const SCHEME_INTERNAL: &str = "internal";

/// CIDR matching every address
const ANY_CIDR: &str = "0.0.0.0/0";

// Fast-recovery health check: detect master failure quickly without flapping
const HEALTH_CHECK_TIMEOUT: u32 = 5;
const HEALTH_CHECK_INTERVAL: u32 = 10;
const HEALTH_CHECK_HEALTHY_THRESHOLD: u32 = 2;
const HEALTH_CHECK_UNHEALTHY_THRESHOLD: u32 = 2;

/// Builds the load balancer fronting the Kubernetes API
#[derive(Debug)]
pub struct ApiLoadBalancerBuilder<'a> {
    ctx: &'a ModelContext,
}

impl<'a> ApiLoadBalancerBuilder<'a> {
    /// Create a builder over `ctx`
    pub fn new(ctx: &'a ModelContext) -> Self {
        Self { ctx }
    }

    /// Pick one subnet per zone compatible with `lb_type`, ordered by zone
    fn select_subnets(&self, lb_type: &LoadBalancerType) -> Result<Vec<Link<Subnet>>> {
        let cluster = self.ctx.cluster();
        let mut by_zone: BTreeMap<&str, Vec<&ClusterSubnetSpec>> = BTreeMap::new();

        for (index, subnet) in cluster.spec.subnets.iter().enumerate() {
            let compatible = match &subnet.type_ {
                SubnetType::Public | SubnetType::Utility => *lb_type == LoadBalancerType::Public,
                SubnetType::Private => *lb_type == LoadBalancerType::Internal,
                SubnetType::Unknown(other) => {
                    return Err(Error::validation_for_field(
                        &cluster.name,
                        format!("spec.subnets[{index}].type"),
                        format!("subnet {:?} had unknown type {other:?}", subnet.name),
                    ))
                }
            };
            if compatible {
                by_zone.entry(subnet.zone.as_str()).or_default().push(subnet);
            }
        }

        let selector = SubnetSelector::for_masters(self.ctx);
        by_zone
            .iter()
            .map(|(zone, candidates)| {
                selector
                    .choose(zone, candidates)
                    .map(|subnet| self.ctx.link_to_subnet(subnet))
            })
            .collect()
    }

    fn load_balancer(
        &self,
        subnets: Vec<Link<Subnet>>,
        idle_timeout: Duration,
        scheme: Option<String>,
    ) -> LoadBalancer {
        LoadBalancer {
            name: self.ctx.elb_name(API_PREFIX),
            load_balancer_name: self.ctx.elb_name32(API_PREFIX),
            security_groups: vec![self.ctx.link_to_elb_security_group(API_PREFIX)],
            subnets,
            listeners: BTreeMap::from([(
                API_PORT.to_string(),
                LoadBalancerListener {
                    instance_port: API_PORT,
                },
            )]),
            health_check: LoadBalancerHealthCheck {
                target: format!("TCP:{API_PORT}"),
                timeout: HEALTH_CHECK_TIMEOUT,
                interval: HEALTH_CHECK_INTERVAL,
                healthy_threshold: HEALTH_CHECK_HEALTHY_THRESHOLD,
                unhealthy_threshold: HEALTH_CHECK_UNHEALTHY_THRESHOLD,
            },
            connection_settings: LoadBalancerConnectionSettings {
                idle_timeout: idle_timeout.as_secs(),
            },
            scheme,
        }
    }

    fn https_rule(&self, name: String, security_group: Link<SecurityGroup>) -> SecurityGroupRule {
        SecurityGroupRule {
            protocol: Some("tcp".to_string()),
            from_port: Some(API_PORT),
            to_port: Some(API_PORT),
            ..SecurityGroupRule::new(name, security_group)
        }
    }
}

impl ModelBuilder for ApiLoadBalancerBuilder<'_> {
    fn name(&self) -> &'static str {
        "api-load-balancer"
    }

    fn build(&self, graph: &mut TaskGraph) -> Result<()> {
        let cluster_name = self.ctx.cluster_name();

        if !self.ctx.use_load_balancer_for_api() {
            debug!(cluster = %cluster_name, "API load balancer not requested, skipping");
            return Ok(());
        }
        let Some(lb_spec) = self.ctx.load_balancer_spec() else {
            return Ok(());
        };

        let scheme = match &lb_spec.type_ {
            LoadBalancerType::Internal => Some(SCHEME_INTERNAL.to_string()),
            LoadBalancerType::Public => None,
            LoadBalancerType::Unknown(other) => {
                return Err(Error::validation_for_field(
                    cluster_name,
                    "spec.api.loadBalancer.type",
                    format!("unhandled LoadBalancer type {other:?}"),
                ))
            }
        };

        let subnets = self.select_subnets(&lb_spec.type_)?;
        if subnets.is_empty() {
            debug!(cluster = %cluster_name, "no compatible subnets for API load balancer");
        }

        let idle_timeout = lb_spec
            .idle_timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(LOAD_BALANCER_DEFAULT_IDLE_TIMEOUT);

        let before = graph.len();
        graph.add_task(self.load_balancer(subnets, idle_timeout, scheme))?;

        // Inbound rules other than the API port are pruned on reconcile
        graph.add_task(SecurityGroup {
            name: self.ctx.elb_security_group_name(API_PREFIX),
            vpc: self.ctx.link_to_vpc(),
            description: "Security group for api ELB".to_string(),
            remove_extra_rules: vec![format!("port={API_PORT}")],
        })?;

        let elb_group = self.ctx.link_to_elb_security_group(API_PREFIX);

        graph.add_task(SecurityGroupRule {
            egress: true,
            cidr: Some(ANY_CIDR.to_string()),
            ..SecurityGroupRule::new("api-elb-egress", elb_group.clone())
        })?;

        for cidr in &self.ctx.cluster().spec.kubernetes_api_access {
            graph.add_task(SecurityGroupRule {
                cidr: Some(cidr.clone()),
                ..self.https_rule(format!("https-api-elb-{cidr}"), elb_group.clone())
            })?;
        }

        graph.add_task(SecurityGroupRule {
            source_group: Some(elb_group),
            ..self.https_rule(
                "https-elb-to-master".to_string(),
                self.ctx.link_to_security_group(InstanceGroupRole::Master),
            )
        })?;

        for ig in self.ctx.master_instance_groups() {
            graph.add_task(LoadBalancerAttachment {
                name: format!("{API_PREFIX}-{}", ig.name),
                load_balancer: self.ctx.link_to_elb(API_PREFIX),
                autoscaling_group: self.ctx.link_to_autoscaling_group(ig),
            })?;
        }

        info!(
            cluster = %cluster_name,
            tasks = graph.len() - before,
            "built API load balancer tasks"
        );
        Ok(())
    }
}
