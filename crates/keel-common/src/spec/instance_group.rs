//! Instance group specification

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An instance group manifest document
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceGroup {
    /// Instance group name, unique within the cluster
    pub name: String,

    /// Desired state of the group
    pub spec: InstanceGroupSpec,
}

impl InstanceGroup {
    /// Create an instance group with the given role spanning `subnets`
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        role: InstanceGroupRole,
        subnets: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            spec: InstanceGroupSpec {
                role,
                subnets: subnets.into_iter().map(Into::into).collect(),
                ..Default::default()
            },
        }
    }

    /// Whether this group runs the control plane
    pub fn is_master(&self) -> bool {
        self.spec.role == InstanceGroupRole::Master
    }
}

/// Specification for an instance group
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceGroupSpec {
    /// Role of the instances in this group
    pub role: InstanceGroupRole,

    /// Names of the cluster subnets the group spans
    #[serde(default)]
    pub subnets: Vec<String>,

    /// Minimum instance count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u32>,

    /// Maximum instance count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u32>,

    /// Instance type (e.g. `m5.large`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_type: Option<String>,
}

/// Role of an instance group
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize, JsonSchema,
)]
pub enum InstanceGroupRole {
    /// Control plane instances
    Master,
    /// Worker instances
    #[default]
    Node,
    /// SSH jump hosts
    Bastion,
}

impl InstanceGroupRole {
    /// Plural lowercase name used in resource names (`masters`, `nodes`, `bastions`)
    pub fn plural(&self) -> &'static str {
        match self {
            InstanceGroupRole::Master => "masters",
            InstanceGroupRole::Node => "nodes",
            InstanceGroupRole::Bastion => "bastions",
        }
    }
}

impl fmt::Display for InstanceGroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceGroupRole::Master => f.write_str("Master"),
            InstanceGroupRole::Node => f.write_str("Node"),
            InstanceGroupRole::Bastion => f.write_str("Bastion"),
        }
    }
}
