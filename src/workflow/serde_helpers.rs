//! Serde helpers shared by the workflow document types

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::{Mapping, Value};

pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `needs: build` as well as `needs: [build, test]`
pub fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
        None => Vec::new(),
    })
}

/// Nil and empty collections are omitted from serialized documents
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Mapping(mapping) => mapping.is_empty(),
        Value::Sequence(sequence) => sequence.is_empty(),
        Value::String(string) => string.is_empty(),
        _ => false,
    }
}

fn sort_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other).unwrap_or_default(),
    }
}

pub fn sorted_mapping<S>(mapping: &Mapping, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut entries: Vec<(&Value, &Value)> = mapping.iter().collect();
    entries.sort_by_key(|(key, _)| sort_key(key));

    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

/// Sorts the top level of a mapping value; other values pass through
pub fn sorted_value<S>(value: &Value, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Value::Mapping(mapping) => sorted_mapping(mapping, serializer),
        other => other.serialize(serializer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Needs {
        #[serde(default, deserialize_with = "string_or_seq")]
        needs: Vec<String>,
    }

    #[test]
    fn test_string_or_seq() {
        let single: Needs = serde_yaml::from_str("needs: variables").unwrap();
        assert_eq!(single.needs, vec!["variables"]);

        let many: Needs = serde_yaml::from_str("needs: [variables, licenses]").unwrap();
        assert_eq!(many.needs, vec!["variables", "licenses"]);

        let missing: Needs = serde_yaml::from_str("{}").unwrap();
        assert!(missing.needs.is_empty());
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&Value::Mapping(Mapping::new())));
        assert!(is_blank(&Value::Sequence(Vec::new())));
        assert!(!is_blank(&Value::Bool(false)));
        assert!(!is_blank(&Value::String("read-all".to_string())));
    }

    #[test]
    fn test_sorted_value_orders_keys() {
        #[derive(Serialize)]
        struct Wrapper {
            #[serde(serialize_with = "sorted_value")]
            value: Value,
        }

        let value: Value = serde_yaml::from_str("push: 1\npull_request: 2\n").unwrap();
        let yaml = serde_yaml::to_string(&Wrapper { value }).unwrap();
        assert!(yaml.find("pull_request").unwrap() < yaml.find("push").unwrap());
    }
}
