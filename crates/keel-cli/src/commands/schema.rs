//! Schema command

use keel_common::manifest::{KIND_CLUSTER, KIND_INSTANCE_GROUP};
use keel_common::spec::{Cluster, InstanceGroup};
use schemars::schema_for;

use crate::Result;

pub fn run() -> Result<()> {
    println!("{}", schemas()?);
    Ok(())
}

/// JSON schemas of every manifest document, keyed by kind
pub fn schemas() -> Result<String> {
    let mut schemas = serde_json::Map::new();
    schemas.insert(
        KIND_CLUSTER.to_string(),
        serde_json::to_value(schema_for!(Cluster))?,
    );
    schemas.insert(
        KIND_INSTANCE_GROUP.to_string(),
        serde_json::to_value(schema_for!(InstanceGroup))?,
    );
    Ok(serde_json::to_string_pretty(&schemas)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemas_cover_both_kinds() {
        let parsed: serde_json::Value = serde_json::from_str(&schemas().unwrap()).unwrap();
        assert!(parsed["Cluster"]["properties"]["spec"].is_object());
        assert!(parsed["InstanceGroup"]["properties"]["name"].is_object());
    }
}
