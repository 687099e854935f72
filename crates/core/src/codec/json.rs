//! JSON interchange
//!
//! Keys are the declared JSON names, codes render as symbols, presence
//! wrappers collapse to their bare value and resources lead with
//! `resourceType`. Parsing accepts both JSON and declared names and ignores
//! keys it does not know.

use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::error::RecordError;
use crate::record::{Record, Slot, Value};
use crate::schema::{
    FieldDescriptor, FieldKind, MessageDescriptor, ScalarKind, enum_descriptor, message_descriptor,
};

pub const RESOURCE_TYPE: &str = "resourceType";

pub fn to_value(record: &Record) -> JsonValue {
    let descriptor = record.descriptor();
    if let Some(field) = descriptor.wrapped_field() {
        return match record.get(field.name) {
            Some(value) => value_to_json(field, value),
            None => JsonValue::Null,
        };
    }

    let mut map = Map::new();
    if descriptor.resource {
        map.insert(
            RESOURCE_TYPE.to_string(),
            JsonValue::String(descriptor.name.to_string()),
        );
    }
    for (field, slot) in record.declared_entries() {
        let json = match slot {
            Slot::Single(value) => value_to_json(field, value),
            Slot::Repeated(values) => {
                JsonValue::Array(values.iter().map(|v| value_to_json(field, v)).collect())
            }
        };
        map.insert(field.json_name.to_string(), json);
    }
    JsonValue::Object(map)
}

fn value_to_json(field: &FieldDescriptor, value: &Value) -> JsonValue {
    match value {
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Int64(v) => JsonValue::from(*v),
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Code(number) => {
            let symbol = match field.kind {
                FieldKind::Code(enumeration) => enum_descriptor(enumeration)
                    .ok()
                    .and_then(|e| e.symbol(*number)),
                _ => None,
            };
            symbol
                .map(|s| JsonValue::String(s.to_string()))
                .unwrap_or_else(|| JsonValue::from(*number))
        }
        Value::Message(nested) => to_value(nested),
    }
}

pub fn from_value(
    descriptor: &'static MessageDescriptor,
    json: &JsonValue,
) -> Result<Record, RecordError> {
    let mut record = Record::new(descriptor);

    if let Some(field) = descriptor.wrapped_field() {
        if !json.is_null() {
            let value = value_from_json(field, json)?;
            record.put(field, value);
        }
        return Ok(record);
    }

    let JsonValue::Object(map) = json else {
        return Err(RecordError::SchemaViolation(format!(
            "{} must be a JSON object",
            descriptor.name
        )));
    };

    for (key, json) in map {
        if key == RESOURCE_TYPE {
            check_resource_type(descriptor, json)?;
            continue;
        }

        let Some(field) = descriptor.field_by_json_name(key) else {
            debug!(type_name = descriptor.name, key = %key, "ignoring unknown JSON key");
            continue;
        };

        if json.is_null() && !is_wrapper_field(field)? {
            continue;
        }

        if field.is_repeated() {
            let JsonValue::Array(items) = json else {
                return Err(RecordError::SchemaViolation(format!(
                    "{}.{} must be a JSON array",
                    descriptor.name, field.name
                )));
            };
            for item in items {
                let value = value_from_json(field, item)?;
                record.put(field, value);
            }
        } else {
            let value = value_from_json(field, json)?;
            record.put(field, value);
        }
    }

    Ok(record)
}

fn check_resource_type(descriptor: &MessageDescriptor, json: &JsonValue) -> Result<(), RecordError> {
    if !descriptor.resource {
        return Ok(());
    }
    match json.as_str() {
        Some(name) if name == descriptor.name => Ok(()),
        Some(name) => Err(RecordError::type_mismatch(descriptor.name, name)),
        None => Err(RecordError::SchemaViolation(format!(
            "{} must be a string",
            RESOURCE_TYPE
        ))),
    }
}

fn is_wrapper_field(field: &FieldDescriptor) -> Result<bool, RecordError> {
    match field.kind {
        FieldKind::Message(type_name) => Ok(message_descriptor(type_name)?.wrapper),
        _ => Ok(false),
    }
}

fn value_from_json(field: &FieldDescriptor, json: &JsonValue) -> Result<Value, RecordError> {
    let wrong_kind = || {
        RecordError::SchemaViolation(format!(
            "'{}' expects {}, got {}",
            field.name, field.kind, json
        ))
    };

    match field.kind {
        FieldKind::Scalar(ScalarKind::String) => json
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(wrong_kind),
        FieldKind::Scalar(ScalarKind::Int64) => match json {
            JsonValue::Number(n) => n.as_i64().map(Value::Int64).ok_or_else(wrong_kind),
            // int64 may arrive quoted
            JsonValue::String(s) => s.parse().map(Value::Int64).map_err(|_| wrong_kind()),
            _ => Err(wrong_kind()),
        },
        FieldKind::Scalar(ScalarKind::Bool) => {
            json.as_bool().map(Value::Bool).ok_or_else(wrong_kind)
        }
        FieldKind::Code(enumeration) => {
            let descriptor = enum_descriptor(enumeration)?;
            match json {
                JsonValue::String(symbol) => descriptor
                    .number(symbol)
                    .map(Value::Code)
                    .ok_or_else(|| RecordError::invalid_enum(enumeration, symbol)),
                JsonValue::Number(n) => {
                    let number = n
                        .as_i64()
                        .and_then(|n| i32::try_from(n).ok())
                        .filter(|n| descriptor.contains(*n))
                        .ok_or_else(|| RecordError::invalid_enum(enumeration, n))?;
                    Ok(Value::Code(number))
                }
                _ => Err(wrong_kind()),
            }
        }
        FieldKind::Message(type_name) => {
            let nested = from_value(message_descriptor(type_name)?, json)?;
            Ok(Value::Message(nested))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CodeSystem, ContactPointUse, types};
    use serde_json::json;

    #[test]
    fn test_wrapper_collapses_to_value() {
        let mut family = Record::of_type(types::STRING).unwrap();
        family.set_scalar("value", "Doe").unwrap();
        assert_eq!(to_value(&family), json!("Doe"));

        let empty = Record::of_type(types::STRING).unwrap();
        assert_eq!(to_value(&empty), JsonValue::Null);
    }

    #[test]
    fn test_resource_type_leads() {
        let mut patient = Record::of_type(types::PATIENT).unwrap();
        patient
            .message_mut("id")
            .unwrap()
            .set_scalar("value", "p-1")
            .unwrap();
        let text = to_value(&patient).to_string();
        assert_eq!(text, r#"{"resourceType":"Patient","id":"p-1"}"#);
    }

    #[test]
    fn test_json_names_are_used() {
        let mut patient = Record::of_type(types::PATIENT).unwrap();
        patient
            .message_mut("birth_date")
            .unwrap()
            .set_scalar("value_us", 19900101)
            .unwrap();
        assert_eq!(to_value(&patient)["birthDate"], json!(19900101));
    }

    #[test]
    fn test_parse_accepts_declared_names_and_quoted_int64() {
        let descriptor = message_descriptor(types::PATIENT).unwrap();
        let patient = from_value(descriptor, &json!({ "birth_date": "19900101" })).unwrap();
        assert_eq!(
            patient.message("birth_date").unwrap().int64("value_us"),
            Some(19900101)
        );
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let descriptor = message_descriptor(types::PATIENT).unwrap();
        let patient = from_value(
            descriptor,
            &json!({ "resourceType": "Patient", "deceasedBoolean": false, "id": "p-1" }),
        )
        .unwrap();
        assert_eq!(patient.message("id").unwrap().string("value"), Some("p-1"));
    }

    #[test]
    fn test_wrong_resource_type() {
        let descriptor = message_descriptor(types::PATIENT).unwrap();
        let err = from_value(descriptor, &json!({ "resourceType": "Observation" })).unwrap_err();
        assert!(matches!(err, RecordError::TypeMismatch { .. }));
    }

    #[test]
    fn test_codes_parse_by_symbol_and_number() {
        let descriptor = message_descriptor(types::CONTACT_POINT).unwrap();
        let by_symbol = from_value(descriptor, &json!({ "use": "MOBILE" })).unwrap();
        let by_number = from_value(descriptor, &json!({ "use": 5 })).unwrap();
        assert_eq!(by_symbol, by_number);
        assert_eq!(
            by_symbol.message("use").unwrap().code("value"),
            Some(ContactPointUse::Mobile.number())
        );
    }

    #[test]
    fn test_unknown_symbol() {
        let descriptor = message_descriptor(types::CONTACT_POINT).unwrap();
        let err = from_value(descriptor, &json!({ "use": "CELL" })).unwrap_err();
        assert!(matches!(err, RecordError::InvalidEnumValue { .. }));
        let err = from_value(descriptor, &json!({ "use": 999 })).unwrap_err();
        assert!(matches!(err, RecordError::InvalidEnumValue { .. }));
    }

    #[test]
    fn test_wrong_json_kinds() {
        let descriptor = message_descriptor(types::PATIENT).unwrap();
        for doc in [
            json!({ "name": { "family": "Doe" } }),
            json!({ "id": 42 }),
            json!({ "active": "yes" }),
            json!(["Patient"]),
        ] {
            let err = from_value(descriptor, &doc).unwrap_err();
            assert!(matches!(err, RecordError::SchemaViolation(_)), "{}", doc);
        }
    }

    #[test]
    fn test_null_wrapper_round_trips() {
        let mut name = Record::of_type(types::HUMAN_NAME).unwrap();
        name.message_mut("family").unwrap();
        let json = to_value(&name);
        assert_eq!(json, json!({ "family": null }));

        let parsed = from_value(name.descriptor(), &json).unwrap();
        assert_eq!(parsed, name);
    }
}
