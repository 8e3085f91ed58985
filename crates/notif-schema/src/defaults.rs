//! # Default Application
//!
//! Walks a document alongside its JSON Schema and fills in declared
//! `default` values in place, before structural validation runs:
//!
//! - a missing object property with a declared default receives it;
//! - a property whose value is `null` is replaced by its declared default;
//! - a `null` array element is replaced by the `items` default.
//!
//! Local `$ref`s (`#/definitions/...`, `#/$defs/...`) are followed. Values
//! whose type does not match the schema are left untouched for the validator
//! to report.

use serde_json::Value;

/// Apply the defaults declared by `schema` to `document`.
pub fn apply_defaults(schema: &Value, document: &mut Value) {
    walk(schema, schema, document, 0);
}

/// Guards against self-referential schemas.
const MAX_DEPTH: usize = 64;

fn walk<'a>(root: &'a Value, schema: &'a Value, document: &mut Value, depth: usize) {
    if depth > MAX_DEPTH {
        return;
    }
    let schema = resolve(root, schema);

    match document {
        Value::Object(object) => {
            let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
                return;
            };
            for (name, property_schema) in properties {
                let property_schema = resolve(root, property_schema);
                if let Some(default) = property_schema.get("default") {
                    if matches!(object.get(name), None | Some(Value::Null)) {
                        object.insert(name.clone(), default.clone());
                    }
                }
                if let Some(child) = object.get_mut(name) {
                    walk(root, property_schema, child, depth + 1);
                }
            }
        }
        Value::Array(items) => {
            let Some(item_schema) = schema.get("items").filter(|s| s.is_object()) else {
                return;
            };
            let item_schema = resolve(root, item_schema);
            for item in items.iter_mut() {
                if item.is_null() {
                    if let Some(default) = item_schema.get("default") {
                        *item = default.clone();
                    }
                }
                walk(root, item_schema, item, depth + 1);
            }
        }
        _ => {}
    }
}

/// Follow a chain of local `$ref`s. Unresolvable references resolve to the
/// referring schema itself.
fn resolve<'a>(root: &'a Value, schema: &'a Value) -> &'a Value {
    let mut current = schema;
    for _ in 0..MAX_DEPTH {
        let Some(pointer) = current
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.strip_prefix('#'))
        else {
            break;
        };
        match root.pointer(pointer) {
            Some(target) => current = target,
            None => break,
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "version": { "type": "string", "default": "2.0.0" },
                "context": { "type": "object", "default": {} },
                "recipients": {
                    "type": "array",
                    "default": [],
                    "items": { "$ref": "#/definitions/Recipient" }
                },
                "tags": {
                    "type": "array",
                    "items": { "type": "string", "default": "untagged" }
                }
            },
            "definitions": {
                "Recipient": {
                    "type": "object",
                    "properties": {
                        "only_admins": { "type": "boolean", "default": false },
                        "users": { "type": "array", "default": [] }
                    }
                }
            }
        })
    }

    #[test]
    fn test_missing_properties_receive_defaults() {
        let mut doc = json!({});
        apply_defaults(&schema(), &mut doc);
        assert_eq!(doc, json!({ "version": "2.0.0", "context": {}, "recipients": [] }));
    }

    #[test]
    fn test_null_properties_receive_defaults() {
        let mut doc = json!({ "version": null, "context": null });
        apply_defaults(&schema(), &mut doc);
        assert_eq!(doc["version"], "2.0.0");
        assert_eq!(doc["context"], json!({}));
    }

    #[test]
    fn test_present_values_are_kept() {
        let mut doc = json!({ "version": "v1.1.0", "context": { "a": 1 } });
        apply_defaults(&schema(), &mut doc);
        assert_eq!(doc["version"], "v1.1.0");
        assert_eq!(doc["context"], json!({ "a": 1 }));
    }

    #[test]
    fn test_defaults_follow_refs_into_array_items() {
        let mut doc = json!({ "recipients": [{ "only_admins": null }, {}] });
        apply_defaults(&schema(), &mut doc);
        assert_eq!(doc["recipients"][0], json!({ "only_admins": false, "users": [] }));
        assert_eq!(doc["recipients"][1], json!({ "only_admins": false, "users": [] }));
    }

    #[test]
    fn test_null_array_items_receive_item_default() {
        let mut doc = json!({ "tags": ["a", null] });
        apply_defaults(&schema(), &mut doc);
        assert_eq!(doc["tags"], json!(["a", "untagged"]));
    }

    #[test]
    fn test_mistyped_values_are_left_alone() {
        let mut doc = json!({ "recipients": "nobody" });
        apply_defaults(&schema(), &mut doc);
        assert_eq!(doc["recipients"], "nobody");
    }
}
