//! Infrastructure task descriptors
//!
//! Each task describes one cloud object the executor should converge to. Tasks
//! refer to each other only through [`Link`]s.

use std::collections::BTreeMap;

use keel_common::spec::SubnetType;
use serde::Serialize;

use crate::link::{Link, TaskKey};

/// A task type that can live in a [`TaskGraph`](crate::TaskGraph)
pub trait TaskKind: Into<Task> + Sized {
    /// Kind name, used as the first half of the task key
    const KIND: &'static str;

    /// Task name, unique among tasks of the same kind
    fn name(&self) -> &str;

    /// Keys of every task this task links to
    fn links(&self) -> Vec<TaskKey> {
        Vec::new()
    }

    /// Borrow the concrete task out of a [`Task`], if the kind matches
    fn from_task(task: &Task) -> Option<&Self>;
}

/// A cloud network
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vpc {
    /// Task name
    pub name: String,
    /// Network CIDR
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
}

/// A subnet of the cluster network
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    /// Task name
    pub name: String,
    /// Network the subnet belongs to
    pub vpc: Link<Vpc>,
    /// Availability zone
    pub availability_zone: String,
    /// Subnet CIDR
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    /// Reachability class
    #[serde(rename = "type")]
    pub type_: SubnetType,
}

/// A security group
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroup {
    /// Task name
    pub name: String,
    /// Network the group belongs to
    pub vpc: Link<Vpc>,
    /// Human-readable description
    pub description: String,
    /// Inbound rules matching none of these selectors are deleted on reconcile
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove_extra_rules: Vec<String>,
}

/// A single ingress or egress rule of a security group
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroupRule {
    /// Task name
    pub name: String,
    /// Group the rule is attached to
    pub security_group: Link<SecurityGroup>,
    /// Source group for group-to-group rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_group: Option<Link<SecurityGroup>>,
    /// Peer CIDR for CIDR rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    /// IP protocol; absent means all protocols
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// First port of the range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_port: Option<u16>,
    /// Last port of the range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_port: Option<u16>,
    /// Outbound rule when true
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub egress: bool,
}

/// Listener forwarding a load balancer port to instances
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerListener {
    /// Port on the backend instances
    pub instance_port: u16,
}

/// Health check the load balancer runs against its backends
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerHealthCheck {
    /// Probe target, e.g. `TCP:443`
    pub target: String,
    /// Probe timeout in seconds
    pub timeout: u32,
    /// Seconds between probes
    pub interval: u32,
    /// Consecutive successes before a backend is healthy
    pub healthy_threshold: u32,
    /// Consecutive failures before a backend is unhealthy
    pub unhealthy_threshold: u32,
}

/// Connection handling settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerConnectionSettings {
    /// Idle connection timeout in seconds
    pub idle_timeout: u64,
}

/// A classic load balancer
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    /// Task name
    pub name: String,
    /// Cloud-side name, limited to 32 characters
    pub load_balancer_name: String,
    /// Security groups attached to the load balancer
    pub security_groups: Vec<Link<SecurityGroup>>,
    /// Subnets, at most one per zone
    pub subnets: Vec<Link<Subnet>>,
    /// Listeners keyed by load balancer port
    pub listeners: BTreeMap<String, LoadBalancerListener>,
    /// Backend health check
    pub health_check: LoadBalancerHealthCheck,
    /// Connection settings
    pub connection_settings: LoadBalancerConnectionSettings,
    /// `internal` for VPC-only load balancers; absent for internet-facing ones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

/// An autoscaling group backing an instance group
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalingGroup {
    /// Task name
    pub name: String,
    /// Minimum instance count
    pub min_size: u32,
    /// Maximum instance count
    pub max_size: u32,
    /// Instance type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// Subnets instances are launched into
    pub subnets: Vec<Link<Subnet>>,
    /// Security groups attached to instances
    pub security_groups: Vec<Link<SecurityGroup>>,
}

/// Registers an autoscaling group as a load balancer backend
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerAttachment {
    /// Task name
    pub name: String,
    /// Load balancer receiving the backends
    pub load_balancer: Link<LoadBalancer>,
    /// Backend group
    pub autoscaling_group: Link<AutoscalingGroup>,
}

/// Any task the graph can hold
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Task {
    /// See [`Vpc`]
    Vpc(Vpc),
    /// See [`Subnet`]
    Subnet(Subnet),
    /// See [`SecurityGroup`]
    SecurityGroup(SecurityGroup),
    /// See [`SecurityGroupRule`]
    SecurityGroupRule(SecurityGroupRule),
    /// See [`LoadBalancer`]
    LoadBalancer(LoadBalancer),
    /// See [`AutoscalingGroup`]
    AutoscalingGroup(AutoscalingGroup),
    /// See [`LoadBalancerAttachment`]
    LoadBalancerAttachment(LoadBalancerAttachment),
}

impl Task {
    /// Graph key of this task
    pub fn key(&self) -> TaskKey {
        match self {
            Task::Vpc(t) => TaskKey::of::<Vpc>(t.name()),
            Task::Subnet(t) => TaskKey::of::<Subnet>(t.name()),
            Task::SecurityGroup(t) => TaskKey::of::<SecurityGroup>(t.name()),
            Task::SecurityGroupRule(t) => TaskKey::of::<SecurityGroupRule>(t.name()),
            Task::LoadBalancer(t) => TaskKey::of::<LoadBalancer>(t.name()),
            Task::AutoscalingGroup(t) => TaskKey::of::<AutoscalingGroup>(t.name()),
            Task::LoadBalancerAttachment(t) => TaskKey::of::<LoadBalancerAttachment>(t.name()),
        }
    }

    /// Keys of every task this task links to
    pub fn links(&self) -> Vec<TaskKey> {
        match self {
            Task::Vpc(t) => t.links(),
            Task::Subnet(t) => t.links(),
            Task::SecurityGroup(t) => t.links(),
            Task::SecurityGroupRule(t) => t.links(),
            Task::LoadBalancer(t) => t.links(),
            Task::AutoscalingGroup(t) => t.links(),
            Task::LoadBalancerAttachment(t) => t.links(),
        }
    }
}

macro_rules! task_kind {
    ($ty:ident) => {
        impl From<$ty> for Task {
            fn from(task: $ty) -> Self {
                Task::$ty(task)
            }
        }
    };
}

task_kind!(Vpc);
task_kind!(Subnet);
task_kind!(SecurityGroup);
task_kind!(SecurityGroupRule);
task_kind!(LoadBalancer);
task_kind!(AutoscalingGroup);
task_kind!(LoadBalancerAttachment);

impl TaskKind for Vpc {
    const KIND: &'static str = "Vpc";

    fn name(&self) -> &str {
        &self.name
    }

    fn from_task(task: &Task) -> Option<&Self> {
        match task {
            Task::Vpc(t) => Some(t),
            _ => None,
        }
    }
}

impl TaskKind for Subnet {
    const KIND: &'static str = "Subnet";

    fn name(&self) -> &str {
        &self.name
    }

    fn links(&self) -> Vec<TaskKey> {
        vec![self.vpc.key()]
    }

    fn from_task(task: &Task) -> Option<&Self> {
        match task {
            Task::Subnet(t) => Some(t),
            _ => None,
        }
    }
}

impl TaskKind for SecurityGroup {
    const KIND: &'static str = "SecurityGroup";

    fn name(&self) -> &str {
        &self.name
    }

    fn links(&self) -> Vec<TaskKey> {
        vec![self.vpc.key()]
    }

    fn from_task(task: &Task) -> Option<&Self> {
        match task {
            Task::SecurityGroup(t) => Some(t),
            _ => None,
        }
    }
}

impl SecurityGroupRule {
    /// A rule on `security_group` with no peer, ports, or protocol set
    pub fn new(name: impl Into<String>, security_group: Link<SecurityGroup>) -> Self {
        Self {
            name: name.into(),
            security_group,
            source_group: None,
            cidr: None,
            protocol: None,
            from_port: None,
            to_port: None,
            egress: false,
        }
    }
}

impl TaskKind for SecurityGroupRule {
    const KIND: &'static str = "SecurityGroupRule";

    fn name(&self) -> &str {
        &self.name
    }

    fn links(&self) -> Vec<TaskKey> {
        std::iter::once(&self.security_group)
            .chain(self.source_group.iter())
            .map(Link::key)
            .collect()
    }

    fn from_task(task: &Task) -> Option<&Self> {
        match task {
            Task::SecurityGroupRule(t) => Some(t),
            _ => None,
        }
    }
}

impl TaskKind for LoadBalancer {
    const KIND: &'static str = "LoadBalancer";

    fn name(&self) -> &str {
        &self.name
    }

    fn links(&self) -> Vec<TaskKey> {
        self.security_groups
            .iter()
            .map(Link::key)
            .chain(self.subnets.iter().map(Link::key))
            .collect()
    }

    fn from_task(task: &Task) -> Option<&Self> {
        match task {
            Task::LoadBalancer(t) => Some(t),
            _ => None,
        }
    }
}

impl TaskKind for AutoscalingGroup {
    const KIND: &'static str = "AutoscalingGroup";

    fn name(&self) -> &str {
        &self.name
    }

    fn links(&self) -> Vec<TaskKey> {
        self.subnets
            .iter()
            .map(Link::key)
            .chain(self.security_groups.iter().map(Link::key))
            .collect()
    }

    fn from_task(task: &Task) -> Option<&Self> {
        match task {
            Task::AutoscalingGroup(t) => Some(t),
            _ => None,
        }
    }
}

impl TaskKind for LoadBalancerAttachment {
    const KIND: &'static str = "LoadBalancerAttachment";

    fn name(&self) -> &str {
        &self.name
    }

    fn links(&self) -> Vec<TaskKey> {
        vec![self.load_balancer.key(), self.autoscaling_group.key()]
    }

    fn from_task(task: &Task) -> Option<&Self> {
        match task {
            Task::LoadBalancerAttachment(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rule() -> SecurityGroupRule {
        SecurityGroupRule {
            source_group: Some(Link::named("api-elb.c")),
            protocol: Some("tcp".to_string()),
            from_port: Some(443),
            to_port: Some(443),
            ..SecurityGroupRule::new("https-elb-to-master", Link::named("masters.c"))
        }
    }

    #[test]
    fn test_rule_links_include_source_group() {
        let keys: Vec<String> = sample_rule().links().iter().map(ToString::to_string).collect();
        assert_eq!(
            keys,
            vec!["SecurityGroup/masters.c", "SecurityGroup/api-elb.c"]
        );
    }

    #[test]
    fn test_task_serializes_with_kind_tag() {
        let task: Task = sample_rule().into();
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["kind"], "SecurityGroupRule");
        assert_eq!(json["securityGroup"], "masters.c");
        assert_eq!(json["sourceGroup"], "api-elb.c");
        assert_eq!(json["fromPort"], 443);
        assert!(json.get("egress").is_none());
        assert!(json.get("cidr").is_none());
    }

    #[test]
    fn test_from_task_matches_kind_only() {
        let task: Task = sample_rule().into();
        assert!(SecurityGroupRule::from_task(&task).is_some());
        assert!(SecurityGroup::from_task(&task).is_none());
        assert_eq!(task.key().to_string(), "SecurityGroupRule/https-elb-to-master");
    }
}
