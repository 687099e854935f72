//! End-to-end tests for building and serializing a Patient record.

use fhir_record::{
    AdministrativeGender, ContactPointSystem, ContactPointUse, Record, RecordError, types,
};
use serde_json::{Value as JsonValue, json};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Jane Doe, built the way a caller fills in generated bindings.
fn example_patient() -> Result<Record, RecordError> {
    let mut patient = Record::of_type(types::PATIENT)?;

    patient
        .message_mut("id")?
        .set_scalar("value", "example-patient-123")?;

    let mut name = Record::of_type(types::HUMAN_NAME)?;
    name.add("given")?.set_scalar("value", "Jane")?;
    name.message_mut("family")?.set_scalar("value", "Doe")?;
    patient.append("name", name)?;

    let mut gender = Record::of_type(types::GENDER_CODE)?;
    gender.set_code("value", AdministrativeGender::Female)?;
    patient.message_mut("gender")?.copy_from(&gender)?;

    let mut birth_date = Record::of_type(types::DATE)?;
    birth_date.set_scalar("value_us", 19900101)?;
    patient.message_mut("birth_date")?.copy_from(&birth_date)?;

    let mut telecom = Record::of_type(types::CONTACT_POINT)?;
    telecom
        .message_mut("system")?
        .set_code("value", ContactPointSystem::Phone)?;
    telecom
        .message_mut("value")?
        .set_scalar("value", "+15551234567")?;
    telecom
        .message_mut("use")?
        .set_code("value", ContactPointUse::Mobile)?;
    patient.append("telecom", telecom)?;

    let identifier = patient.add("identifier")?;
    identifier
        .message_mut("system")?
        .set_scalar("value", "http://hospital.smarthealth.org/mrn")?;
    identifier
        .message_mut("value")?
        .set_scalar("value", "MRN-123456")?;

    Ok(patient)
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[test]
fn test_json_contains_expected_fragments() {
    let patient = example_patient().unwrap();
    let json = patient.to_json();

    for fragment in [
        r#""given":["Jane"]"#,
        r#""family":"Doe""#,
        r#""gender":"FEMALE""#,
        r#""system":"PHONE""#,
        r#""use":"MOBILE""#,
    ] {
        assert!(json.contains(fragment), "missing {} in {}", fragment, json);
    }
}

#[test]
fn test_json_document_shape() {
    let patient = example_patient().unwrap();
    let json: JsonValue = serde_json::from_str(&patient.to_json()).unwrap();

    assert_eq!(
        json,
        json!({
            "resourceType": "Patient",
            "id": "example-patient-123",
            "identifier": [{
                "system": "http://hospital.smarthealth.org/mrn",
                "value": "MRN-123456"
            }],
            "name": [{ "family": "Doe", "given": ["Jane"] }],
            "telecom": [{ "system": "PHONE", "value": "+15551234567", "use": "MOBILE" }],
            "gender": "FEMALE",
            "birthDate": 19900101
        })
    );
}

#[test]
fn test_json_round_trip() {
    let patient = example_patient().unwrap();
    let parsed = Record::from_json(types::PATIENT, &patient.to_json()).unwrap();
    assert_eq!(parsed, patient);

    let pretty = Record::from_json(types::PATIENT, &patient.to_json_pretty()).unwrap();
    assert_eq!(pretty, patient);
}

#[test]
fn test_from_json_rejects_garbage() {
    let err = Record::from_json(types::PATIENT, "{\"id\": ").unwrap_err();
    assert!(matches!(err, RecordError::InvalidJson(_)));
}

#[test]
fn test_serde_serialize_matches_to_json() {
    let patient = example_patient().unwrap();
    assert_eq!(serde_json::to_string(&patient).unwrap(), patient.to_json());
}

// ---------------------------------------------------------------------------
// Binary
// ---------------------------------------------------------------------------

#[test]
fn test_binary_round_trip() {
    let patient = example_patient().unwrap();
    let bytes = patient.to_bytes();
    let decoded = Record::from_bytes(types::PATIENT, &bytes).unwrap();

    assert_eq!(decoded, patient);
    assert_eq!(decoded.to_bytes(), bytes);
    assert_eq!(
        decoded.message("birth_date").unwrap().int64("value_us"),
        Some(19900101)
    );
}

#[test]
fn test_truncated_buffer_is_malformed() {
    let bytes = example_patient().unwrap().to_bytes();
    let err = Record::from_bytes(types::PATIENT, &bytes[..bytes.len() - 3]).unwrap_err();
    assert!(matches!(err, RecordError::MalformedEncoding(_)));
}

#[test]
fn test_corrupted_length_is_malformed() {
    let mut bytes = example_patient().unwrap().to_bytes();
    // First field is `id`: key, then its length
    bytes[1] = 0x7F;
    let err = Record::from_bytes(types::PATIENT, &bytes).unwrap_err();
    assert!(matches!(err, RecordError::MalformedEncoding(_)));
}

#[test]
fn test_newer_writer_fields_are_ignored() {
    let patient = example_patient().unwrap();
    let mut bytes = patient.to_bytes();
    // tag 40 (e.g. a field added later), length-delimited
    bytes.extend_from_slice(&[0xC2, 0x02, 0x02, b'o', b'k']);

    let decoded = Record::from_bytes(types::PATIENT, &bytes).unwrap();
    assert_eq!(decoded, patient);
}

#[test]
fn test_decode_unknown_type() {
    let err = Record::from_bytes("Practitioner", &[]).unwrap_err();
    assert!(matches!(err, RecordError::SchemaViolation(_)));
}

// ---------------------------------------------------------------------------
// Display text
// ---------------------------------------------------------------------------

#[test]
fn test_display_text() {
    let patient = example_patient().unwrap();
    let text = patient.to_display_text();

    assert!(text.starts_with("id {\n  value: \"example-patient-123\"\n}\n"));
    assert!(text.contains("gender {\n  value: FEMALE\n}\n"));
    assert!(text.contains("birth_date {\n  value_us: 19900101\n}\n"));
    assert!(text.contains("  given {\n    value: \"Jane\"\n  }\n"));
    assert_eq!(text, patient.to_display_text());
    assert_eq!(text, format!("{}", patient));
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn test_gender_out_of_range() {
    let mut patient = example_patient().unwrap();
    let err = patient
        .message_mut("gender")
        .unwrap()
        .set_code("value", 999)
        .unwrap_err();
    assert!(matches!(err, RecordError::InvalidEnumValue { .. }));

    // The previous value is kept
    assert_eq!(
        patient.message("gender").unwrap().code_symbol("value"),
        Some("FEMALE")
    );
}

#[test]
fn test_copy_between_different_types() {
    let mut patient = example_patient().unwrap();
    let date = patient.message("birth_date").unwrap().clone();
    let err = patient.message_mut("gender").unwrap().copy_from(&date).unwrap_err();
    assert!(matches!(err, RecordError::TypeMismatch { .. }));
}

#[test]
fn test_repeated_order_survives_codecs() {
    let mut patient = example_patient().unwrap();
    let second = patient.add("name").unwrap();
    second.add("given").unwrap().set_scalar("value", "J.").unwrap();

    let decoded = Record::from_bytes(types::PATIENT, &patient.to_bytes()).unwrap();
    let given: Vec<_> = decoded
        .repeated("name")
        .iter()
        .map(|name| {
            name.as_record().unwrap().repeated("given")[0]
                .as_record()
                .unwrap()
                .string("value")
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(given, vec!["Jane", "J."]);
}
