//! YAML manifest parsing
//!
//! Manifests are parsed with yaml-rust2 and converted to `serde_json::Value`
//! so every document can be deserialized through the same serde types.

use serde_json::{Map, Number, Value};
use yaml_rust2::{Yaml, YamlLoader};

use crate::{Error, Result};

/// Parse a multi-document YAML string into one `Value` per document.
///
/// Empty documents (a bare `---`) are dropped.
pub fn parse_documents(input: &str) -> Result<Vec<Value>> {
    let docs = YamlLoader::load_from_str(input)
        .map_err(|e| Error::serialization(format!("invalid YAML: {e}")))?;
    docs.into_iter()
        .filter(|doc| !doc.is_null())
        .map(to_json)
        .collect()
}

fn to_json(yaml: Yaml) -> Result<Value> {
    match yaml {
        Yaml::Null => Ok(Value::Null),
        Yaml::Boolean(b) => Ok(Value::Bool(b)),
        Yaml::Integer(i) => Ok(Value::Number(i.into())),
        Yaml::Real(s) => {
            let f: f64 = s
                .parse()
                .map_err(|_| Error::serialization(format!("invalid float {s:?}")))?;
            Ok(Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null))
        }
        Yaml::String(s) => Ok(Value::String(s)),
        Yaml::Array(items) => items
            .into_iter()
            .map(to_json)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Yaml::Hash(map) => map
            .into_iter()
            .map(|(k, v)| {
                let key = match k {
                    Yaml::String(s) | Yaml::Real(s) => s,
                    Yaml::Integer(i) => i.to_string(),
                    Yaml::Boolean(b) => b.to_string(),
                    _ => return Err(Error::serialization("unsupported YAML key type")),
                };
                to_json(v).map(|v| (key, v))
            })
            .collect::<Result<Map<String, Value>>>()
            .map(Value::Object),
        Yaml::Alias(_) => Err(Error::serialization("YAML aliases are not supported")),
        Yaml::BadValue => Err(Error::serialization("bad YAML value")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_documents_splits_on_separator() {
        let docs = parse_documents("kind: Cluster\nname: a\n---\nkind: InstanceGroup\nname: b\n")
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["kind"], "Cluster");
        assert_eq!(docs[1]["name"], "b");
    }

    #[test]
    fn test_parse_documents_skips_empty_documents() {
        let docs = parse_documents("---\n---\nkind: Cluster\n").unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_scalars_convert() {
        let docs = parse_documents("a: 1\nb: true\nc: 1.5\nd: [x, y]\n").unwrap();
        assert_eq!(docs[0]["a"], 1);
        assert_eq!(docs[0]["b"], true);
        assert_eq!(docs[0]["c"], 1.5);
        assert_eq!(docs[0]["d"][1], "y");
    }

    #[test]
    fn test_invalid_yaml_is_serialization_error() {
        let err = parse_documents("a: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }
}
