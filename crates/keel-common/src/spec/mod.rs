//! Manifest document types
//!
//! - [`Cluster`] - cluster-wide network and API access configuration
//! - [`InstanceGroup`] - a group of instances sharing a role and subnets

mod cluster;
mod instance_group;

pub use cluster::{
    ApiSpec, Cluster, ClusterSpec, ClusterSubnetSpec, LoadBalancerAccessSpec, LoadBalancerType,
    SubnetType,
};
pub use instance_group::{InstanceGroup, InstanceGroupRole, InstanceGroupSpec};
