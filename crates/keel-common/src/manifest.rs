//! Manifest loading
//!
//! A manifest is a YAML stream with exactly one `kind: Cluster` document and
//! any number of `kind: InstanceGroup` documents.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::spec::{Cluster, InstanceGroup};
use crate::{yaml, Error, Result};

/// Document kind of a cluster
pub const KIND_CLUSTER: &str = "Cluster";
/// Document kind of an instance group
pub const KIND_INSTANCE_GROUP: &str = "InstanceGroup";

/// A cluster together with its instance groups
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterManifest {
    /// The cluster document
    pub cluster: Cluster,
    /// Instance group documents, in manifest order
    pub instance_groups: Vec<InstanceGroup>,
}

impl ClusterManifest {
    /// Parse a manifest from a YAML string
    pub fn from_yaml(input: &str) -> Result<Self> {
        let mut cluster: Option<Cluster> = None;
        let mut instance_groups = Vec::new();

        for (index, mut doc) in yaml::parse_documents(input)?.into_iter().enumerate() {
            let kind = take_kind(&mut doc, index)?;
            match kind.as_str() {
                KIND_CLUSTER => {
                    if let Some(existing) = &cluster {
                        return Err(Error::validation_for(
                            &existing.name,
                            "manifest contains more than one Cluster document",
                        ));
                    }
                    cluster = Some(decode(KIND_CLUSTER, doc)?);
                }
                KIND_INSTANCE_GROUP => instance_groups.push(decode(KIND_INSTANCE_GROUP, doc)?),
                other => {
                    return Err(Error::validation(format!(
                        "document {index} has unknown kind {other:?}"
                    )))
                }
            }
        }

        let cluster =
            cluster.ok_or_else(|| Error::validation("manifest contains no Cluster document"))?;
        debug!(
            cluster = %cluster.name,
            instance_groups = instance_groups.len(),
            "loaded manifest"
        );

        Ok(Self {
            cluster,
            instance_groups,
        })
    }
}

fn take_kind(doc: &mut Value, index: usize) -> Result<String> {
    let obj = doc
        .as_object_mut()
        .ok_or_else(|| Error::validation(format!("document {index} is not a mapping")))?;
    match obj.remove("kind") {
        Some(Value::String(kind)) => Ok(kind),
        Some(_) => Err(Error::validation(format!(
            "document {index} has a non-string kind"
        ))),
        None => Err(Error::validation(format!("document {index} has no kind"))),
    }
}

fn decode<T: DeserializeOwned>(kind: &str, doc: Value) -> Result<T> {
    serde_json::from_value(doc).map_err(|e| Error::serialization_for_kind(kind, e.to_string()))
}
