// Terraform outputs snapshot and default-applying lookups
//
// `terraform output -json` prints a mapping of output name to
// `{ "sensitive": bool, "type": ..., "value": <any> }`. Nothing beyond
// "a JSON object" is guaranteed, so every access goes through the
// lookup helpers here and a missing key is never an error.

mod command;

pub use command::*;

use serde_json::{Map, Value};

use crate::output::errors::InventoryError;

/// Walk `path` through nested JSON objects.
///
/// Returns `None` as soon as a key is missing, a non-object is reached,
/// or the final value is `null`.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.get(*key))
        .filter(|found| !found.is_null())
}

/// Like [`lookup`], falling back to `default` when the path is absent
pub fn lookup_or(value: Option<&Value>, path: &[&str], default: Value) -> Value {
    value
        .and_then(|v| lookup(v, path))
        .cloned()
        .unwrap_or(default)
}

/// Raw outputs of one `terraform output -json` run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    outputs: Map<String, Value>,
}

impl Snapshot {
    /// Parse the stdout of `terraform output -json`
    pub fn parse(json: &str) -> Result<Self, InventoryError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(outputs) => Ok(Snapshot { outputs }),
            other => Err(InventoryError::NotAnObject(json_type_name(&other))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Whether an output with this name exists, whatever its shape
    pub fn contains(&self, name: &str) -> bool {
        self.outputs.contains_key(name)
    }

    /// The `value` field of a named output
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name).and_then(|output| lookup(output, &["value"]))
    }

    /// A nested field inside a named output's `value`
    pub fn value_at(&self, name: &str, path: &[&str]) -> Option<&Value> {
        self.value(name).and_then(|value| lookup(value, path))
    }

    /// A nested field inside a named output's `value`, or `default`
    pub fn value_or(&self, name: &str, path: &[&str], default: Value) -> Value {
        lookup_or(self.value(name), path, default)
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }
}

impl From<Map<String, Value>> for Snapshot {
    fn from(outputs: Map<String, Value>) -> Self {
        Snapshot { outputs }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: Value) -> Snapshot {
        match value {
            Value::Object(map) => Snapshot::from(map),
            _ => panic!("test snapshot must be an object"),
        }
    }

    #[test]
    fn test_lookup_nested() {
        let value = json!({"a": {"b": {"c": 3}}});

        assert_eq!(lookup(&value, &["a", "b", "c"]), Some(&json!(3)));
        assert_eq!(lookup(&value, &[]), Some(&value));
        assert_eq!(lookup(&value, &["a", "missing"]), None);
        assert_eq!(lookup(&value, &["a", "b", "c", "d"]), None);
    }

    #[test]
    fn test_lookup_treats_null_as_absent() {
        let value = json!({"region": null});
        assert_eq!(lookup(&value, &["region"]), None);
        assert_eq!(
            lookup_or(Some(&value), &["region"], json!("us-west-2")),
            json!("us-west-2")
        );
    }

    #[test]
    fn test_lookup_or_without_value() {
        assert_eq!(lookup_or(None, &["x"], json!(5432)), json!(5432));
    }

    #[test]
    fn test_snapshot_value_accessors() {
        let snap = snapshot(json!({
            "infrastructure_info": {
                "sensitive": false,
                "value": {"environment": "prod", "region": "eu-west-1"}
            },
            "no_value": {"sensitive": false}
        }));

        assert_eq!(snap.len(), 2);
        assert!(snap.contains("no_value"));
        assert_eq!(snap.value("no_value"), None);
        assert_eq!(
            snap.value_at("infrastructure_info", &["environment"]),
            Some(&json!("prod"))
        );
        assert_eq!(
            snap.value_or("infrastructure_info", &["missing"], json!("unknown")),
            json!("unknown")
        );
        assert_eq!(
            snap.value_or("absent_output", &["region"], json!("us-west-2")),
            json!("us-west-2")
        );
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = Snapshot::parse("[1, 2]").unwrap_err();
        assert!(matches!(err, InventoryError::NotAnObject("an array")));

        let err = Snapshot::parse("not json").unwrap_err();
        assert!(matches!(err, InventoryError::InvalidJson(_)));
    }

    #[test]
    fn test_parse_empty_outputs() {
        let snap = Snapshot::parse("{}\n").unwrap();
        assert!(snap.is_empty());
    }

    #[test]
    fn test_parse_preserves_output_order() {
        let snap = Snapshot::parse(r#"{"zeta": {"value": 1}, "alpha": {"value": 2}}"#).unwrap();
        let names: Vec<&str> = snap.output_names().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }
}
