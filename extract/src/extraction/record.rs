//! Normalization of structured replies into flat records.

use serde_json::{Map, Value};

/// A plain key→value record, keys in the order the model produced them.
pub type FlatRecord = Map<String, Value>;

/// Turns a structured reply into a [`FlatRecord`].
///
/// Models sometimes nest the record under the schema name
/// (`{"ParserResponse": {...}}`); such a wrapper is removed. Anything that is
/// not an object is returned as `Err` with the JSON type name.
pub fn normalize_record(value: Value, schema_name: &str) -> Result<FlatRecord, &'static str> {
    let Value::Object(mut map) = value else {
        return Err(json_type_name(&value));
    };

    if map.len() == 1 && matches!(map.get(schema_name), Some(Value::Object(_))) {
        if let Some(Value::Object(inner)) = map.remove(schema_name) {
            return Ok(inner);
        }
    }

    Ok(map)
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
