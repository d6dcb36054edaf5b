use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A named response contract for a structured call.
///
/// Implemented for free on anything deriving `JsonSchema` and `Deserialize`.
/// `strict_schema` rewrites the derived schema into the strict dialect the
/// inference endpoints enforce: every property required, no additional
/// properties, and all `$ref`s inlined.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    fn strict_schema() -> Value {
        let mut schema = serde_json::to_value(schema_for!(Self)).unwrap_or_default();

        let definitions = schema
            .as_object()
            .and_then(|map| map.get("definitions"))
            .cloned()
            .unwrap_or(Value::Null);
        tighten(&mut schema, &definitions);

        if let Value::Object(map) = &mut schema {
            map.remove("definitions");
            map.remove("$schema");
        }
        schema
    }

    fn contract_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

/// Recursively enforce strictness: inline `#/definitions/*` refs, collapse
/// single-element `allOf` wrappers schemars emits for newtype refs, mark
/// every object closed, and list all of its properties as required.
fn tighten(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(path)) = map.get("$ref") {
                let name = path.trim_start_matches("#/definitions/").to_string();
                if let Some(def) = definitions.get(&name) {
                    *value = def.clone();
                    tighten(value, definitions);
                    return;
                }
            }

            if let Some(Value::Array(all_of)) = map.get("allOf") {
                if all_of.len() == 1 {
                    *value = all_of[0].clone();
                    tighten(value, definitions);
                    return;
                }
            }

            if map.get("type") == Some(&Value::String("object".into())) {
                map.insert("additionalProperties".into(), Value::Bool(false));
                if let Some(Value::Object(props)) = map.get("properties") {
                    let required: Vec<Value> =
                        props.keys().map(|k| Value::String(k.clone())).collect();
                    map.insert("required".into(), Value::Array(required));
                }
            }

            for child in map.values_mut() {
                tighten(child, definitions);
            }
        }
        Value::Array(items) => {
            for item in items {
                tighten(item, definitions);
            }
        }
        _ => {}
    }
}
