//! Read-only model context shared by builders
//!
//! Owns the cluster and its instance groups for one build pass and derives
//! every task name from stable identifiers, so that separate builders agree on
//! the names they link to.

use keel_common::spec::{
    Cluster, ClusterSubnetSpec, InstanceGroup, InstanceGroupRole, LoadBalancerAccessSpec,
};
use keel_common::ClusterManifest;
use sha2::{Digest, Sha256};

use crate::link::Link;
use crate::task::{AutoscalingGroup, LoadBalancer, SecurityGroup, Subnet, Vpc};

/// Maximum length of a cloud load balancer name
pub const ELB_NAME_MAX_LEN: usize = 32;

/// Hex characters of the cluster-name hash appended to load balancer names
const ELB_NAME_HASH_LEN: usize = 6;

/// Cluster and instance groups for one build pass
#[derive(Clone, Debug)]
pub struct ModelContext {
    cluster: Cluster,
    instance_groups: Vec<InstanceGroup>,
}

impl ModelContext {
    /// Create a context
    pub fn new(cluster: Cluster, instance_groups: Vec<InstanceGroup>) -> Self {
        Self {
            cluster,
            instance_groups,
        }
    }

    /// The cluster document
    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    /// Fully qualified cluster name
    pub fn cluster_name(&self) -> &str {
        &self.cluster.name
    }

    /// All instance groups, in manifest order
    pub fn instance_groups(&self) -> &[InstanceGroup] {
        &self.instance_groups
    }

    /// Instance groups running the control plane, in manifest order
    pub fn master_instance_groups(&self) -> impl Iterator<Item = &InstanceGroup> {
        self.instance_groups.iter().filter(|ig| ig.is_master())
    }

    /// API load balancer configuration, if one is requested
    pub fn load_balancer_spec(&self) -> Option<&LoadBalancerAccessSpec> {
        self.cluster.spec.api.as_ref()?.load_balancer.as_ref()
    }

    /// Whether a load balancer fronts the Kubernetes API
    pub fn use_load_balancer_for_api(&self) -> bool {
        self.load_balancer_spec().is_some()
    }

    /// Link to the cluster network
    pub fn link_to_vpc(&self) -> Link<Vpc> {
        Link::named(self.cluster_name())
    }

    /// Task name of a cluster subnet
    pub fn subnet_name(&self, subnet: &str) -> String {
        format!("{}.{}", subnet, self.cluster_name())
    }

    /// Link to a cluster subnet
    pub fn link_to_subnet(&self, subnet: &ClusterSubnetSpec) -> Link<Subnet> {
        self.link_to_subnet_named(&subnet.name)
    }

    /// Link to a cluster subnet by its spec name
    pub fn link_to_subnet_named(&self, subnet: &str) -> Link<Subnet> {
        Link::named(self.subnet_name(subnet))
    }

    /// Task name of a load balancer (e.g. `api.<cluster>`)
    pub fn elb_name(&self, prefix: &str) -> String {
        format!("{}.{}", prefix, self.cluster_name())
    }

    /// Link to a load balancer task
    pub fn link_to_elb(&self, prefix: &str) -> Link<LoadBalancer> {
        Link::named(self.elb_name(prefix))
    }

    /// Task name of a load balancer's security group (e.g. `api-elb.<cluster>`)
    pub fn elb_security_group_name(&self, prefix: &str) -> String {
        format!("{}-elb.{}", prefix, self.cluster_name())
    }

    /// Link to a load balancer's security group
    pub fn link_to_elb_security_group(&self, prefix: &str) -> Link<SecurityGroup> {
        Link::named(self.elb_security_group_name(prefix))
    }

    /// Task name of a role's security group (e.g. `masters.<cluster>`)
    pub fn security_group_name(&self, role: InstanceGroupRole) -> String {
        format!("{}.{}", role.plural(), self.cluster_name())
    }

    /// Link to a role's security group
    pub fn link_to_security_group(&self, role: InstanceGroupRole) -> Link<SecurityGroup> {
        Link::named(self.security_group_name(role))
    }

    /// Task name of an instance group's autoscaling group
    pub fn autoscaling_group_name(&self, ig: &InstanceGroup) -> String {
        format!("{}.{}", ig.name, self.cluster_name())
    }

    /// Link to an instance group's autoscaling group
    pub fn link_to_autoscaling_group(&self, ig: &InstanceGroup) -> Link<AutoscalingGroup> {
        Link::named(self.autoscaling_group_name(ig))
    }

    /// Cloud-side load balancer name, at most 32 characters
    ///
    /// `<prefix>-<first label of the cluster name>`, lowercased with every run
    /// of characters outside `[a-z0-9]` collapsed to a single `-`, truncated to
    /// leave room for a `-<hash>` suffix. The hash is a SHA-256 of the full
    /// cluster name so clusters sharing a first label still get distinct names.
    pub fn elb_name32(&self, prefix: &str) -> String {
        let cluster = self.cluster_name();
        let first_label = cluster.split('.').next().unwrap_or_default();

        let mut base = String::new();
        for c in format!("{prefix}-{first_label}").chars() {
            if c.is_ascii_alphanumeric() {
                base.push(c.to_ascii_lowercase());
            } else if !base.is_empty() && !base.ends_with('-') {
                base.push('-');
            }
        }
        base.truncate(ELB_NAME_MAX_LEN - ELB_NAME_HASH_LEN - 1);

        let mut hasher = Sha256::new();
        hasher.update(cluster.as_bytes());
        let hash = format!("{:x}", hasher.finalize());
        format!(
            "{}-{}",
            base.trim_end_matches('-'),
            &hash[..ELB_NAME_HASH_LEN]
        )
    }
}

impl From<ClusterManifest> for ModelContext {
    fn from(manifest: ClusterManifest) -> Self {
        Self::new(manifest.cluster, manifest.instance_groups)
    }
}
