//! Cluster specification
//!
//! The `Cluster` document describes the desired state of a cluster's network
//! and API access. Builders read it; nothing in keel mutates it.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A cluster manifest document
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Fully qualified cluster name (e.g. `k8s.example.com`)
    pub name: String,

    /// Desired state of the cluster
    pub spec: ClusterSpec,
}

/// Specification for a cluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// CIDR of the cluster VPC
    #[serde(
        default,
        rename = "networkCIDR",
        skip_serializing_if = "Option::is_none"
    )]
    pub network_cidr: Option<String>,

    /// How the Kubernetes API is exposed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiSpec>,

    /// CIDRs allowed to reach the Kubernetes API
    #[serde(default, rename = "kubernetesApiAccess")]
    pub kubernetes_api_access: Vec<String>,

    /// Subnets the cluster spans, in declaration order
    #[serde(default)]
    pub subnets: Vec<ClusterSubnetSpec>,
}

/// API access configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpec {
    /// Load balancer fronting the API; absent means no load balancer is built
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<LoadBalancerAccessSpec>,
}

/// API load balancer configuration
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerAccessSpec {
    /// Reachability class of the load balancer
    #[serde(rename = "type")]
    #[schemars(with = "String")]
    pub type_: LoadBalancerType,

    /// Connection idle timeout override in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout_seconds: Option<u64>,
}

/// Reachability class of a load balancer
///
/// Unrecognized values are kept verbatim so builders can name them in errors.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum LoadBalancerType {
    /// Reachable only from inside the VPC
    Internal,
    /// Internet-facing
    Public,
    /// Any other value found in the manifest
    Unknown(String),
}

impl LoadBalancerType {
    /// Wire value of this type
    pub fn as_str(&self) -> &str {
        match self {
            LoadBalancerType::Internal => "Internal",
            LoadBalancerType::Public => "Public",
            LoadBalancerType::Unknown(s) => s,
        }
    }
}

impl From<String> for LoadBalancerType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Internal" => LoadBalancerType::Internal,
            "Public" => LoadBalancerType::Public,
            _ => LoadBalancerType::Unknown(value),
        }
    }
}

impl From<LoadBalancerType> for String {
    fn from(value: LoadBalancerType) -> Self {
        match value {
            LoadBalancerType::Unknown(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LoadBalancerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subnet of the cluster
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSubnetSpec {
    /// Unique subnet name
    pub name: String,

    /// Availability zone the subnet lives in
    pub zone: String,

    /// Network reachability of the subnet
    #[serde(rename = "type")]
    #[schemars(with = "String")]
    pub type_: SubnetType,

    /// Subnet CIDR
    #[serde(default, rename = "cidr", skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
}

impl ClusterSubnetSpec {
    /// Create a subnet without a CIDR
    pub fn new(name: impl Into<String>, zone: impl Into<String>, type_: SubnetType) -> Self {
        Self {
            name: name.into(),
            zone: zone.into(),
            type_,
            cidr: None,
        }
    }
}

/// Network reachability of a subnet
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum SubnetType {
    /// Has a route to an internet gateway
    Public,
    /// Routes out through NAT only
    Private,
    /// Public subnet reserved for internet-facing infrastructure
    Utility,
    /// Any other value found in the manifest
    Unknown(String),
}

impl SubnetType {
    /// Wire value of this type
    pub fn as_str(&self) -> &str {
        match self {
            SubnetType::Public => "Public",
            SubnetType::Private => "Private",
            SubnetType::Utility => "Utility",
            SubnetType::Unknown(s) => s,
        }
    }
}

impl From<String> for SubnetType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Public" => SubnetType::Public,
            "Private" => SubnetType::Private,
            "Utility" => SubnetType::Utility,
            _ => SubnetType::Unknown(value),
        }
    }
}

impl From<SubnetType> for String {
    fn from(value: SubnetType) -> Self {
        match value {
            SubnetType::Unknown(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SubnetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::internal("Internal", LoadBalancerType::Internal)]
    #[case::public("Public", LoadBalancerType::Public)]
    #[case::lowercase_is_unknown("public", LoadBalancerType::Unknown("public".to_string()))]
    fn test_load_balancer_type_from_string(#[case] raw: &str, #[case] expected: LoadBalancerType) {
        assert_eq!(LoadBalancerType::from(raw.to_string()), expected);
    }

    #[rstest]
    #[case::public("Public", SubnetType::Public)]
    #[case::private("Private", SubnetType::Private)]
    #[case::utility("Utility", SubnetType::Utility)]
    #[case::dualstack("DualStack", SubnetType::Unknown("DualStack".to_string()))]
    fn test_subnet_type_from_string(#[case] raw: &str, #[case] expected: SubnetType) {
        assert_eq!(SubnetType::from(raw.to_string()), expected);
    }

    #[test]
    fn test_unknown_type_keeps_original_value() {
        let parsed: LoadBalancerAccessSpec =
            serde_json::from_value(serde_json::json!({ "type": "Regional" })).unwrap();
        assert_eq!(parsed.type_.to_string(), "Regional");

        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back["type"], "Regional");
    }

    #[test]
    fn test_cluster_spec_camel_case_keys() {
        let spec: ClusterSpec = serde_json::from_value(serde_json::json!({
            "networkCIDR": "172.20.0.0/16",
            "api": { "loadBalancer": { "type": "Internal", "idleTimeoutSeconds": 600 } },
            "kubernetesApiAccess": ["10.0.0.0/8"],
            "subnets": [{ "name": "a", "zone": "us-east-1a", "type": "Private", "cidr": "172.20.32.0/19" }]
        }))
        .unwrap();

        assert_eq!(spec.network_cidr.as_deref(), Some("172.20.0.0/16"));
        let lb = spec.api.unwrap().load_balancer.unwrap();
        assert_eq!(lb.type_, LoadBalancerType::Internal);
        assert_eq!(lb.idle_timeout_seconds, Some(600));
        assert_eq!(spec.kubernetes_api_access, vec!["10.0.0.0/8"]);
        assert_eq!(spec.subnets[0].type_, SubnetType::Private);
        assert_eq!(spec.subnets[0].cidr.as_deref(), Some("172.20.32.0/19"));
    }

    #[test]
    fn test_cluster_spec_defaults_when_empty() {
        let spec: ClusterSpec = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(spec.api.is_none());
        assert!(spec.subnets.is_empty());
        assert!(spec.kubernetes_api_access.is_empty());
    }
}
