//! Integration tests for the Patient sync controller over the loopback transport.

use fhir_record::{
    AdministrativeGender, ContactPointSystem, ContactPointUse, IssueType, OperationOutcome, Record,
    RecordError, types,
};
use fhir_sync_client::{ClientConfig, ClientError, LoopbackTransport, PatientController};
use serde_json::Value as JsonValue;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn controller() -> PatientController<LoopbackTransport> {
    init_tracing();
    PatientController::connect(&ClientConfig::default()).expect("Failed to connect")
}

fn patient(id: Option<&str>) -> Record {
    let mut patient = Record::of_type(types::PATIENT).unwrap();
    if let Some(id) = id {
        patient
            .message_mut("id")
            .unwrap()
            .set_scalar("value", id)
            .unwrap();
    }

    let name = patient.add("name").unwrap();
    name.add("given").unwrap().set_scalar("value", "Jane").unwrap();
    name.message_mut("family")
        .unwrap()
        .set_scalar("value", "Doe")
        .unwrap();

    patient
        .message_mut("gender")
        .unwrap()
        .set_code("value", AdministrativeGender::Female)
        .unwrap();

    let telecom = patient.add("telecom").unwrap();
    telecom
        .message_mut("system")
        .unwrap()
        .set_code("value", ContactPointSystem::Phone)
        .unwrap();
    telecom
        .message_mut("value")
        .unwrap()
        .set_scalar("value", "+15551234567")
        .unwrap();
    telecom
        .message_mut("use")
        .unwrap()
        .set_code("value", ContactPointUse::Mobile)
        .unwrap();

    patient
}

fn id_of(record: &Record) -> &str {
    record.message("id").unwrap().string("value").unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_upsert_then_get() {
    let controller = controller();
    let original = patient(Some("example-id"));

    let stored = controller.upsert_patient(&original).unwrap();
    assert_eq!(stored, original);

    let fetched = controller.get_patient("example-id").unwrap();
    assert_eq!(fetched, original);
}

#[test]
fn test_upsert_replaces_existing() {
    let controller = controller();
    controller.upsert_patient(&patient(Some("p-1"))).unwrap();

    let mut updated = patient(Some("p-1"));
    updated
        .message_mut("gender")
        .unwrap()
        .set_code("value", AdministrativeGender::Other)
        .unwrap();
    controller.upsert_patient(&updated).unwrap();

    let fetched = controller.get_patient("p-1").unwrap();
    assert_eq!(
        fetched.message("gender").unwrap().code_symbol("value"),
        Some("OTHER")
    );
    assert_eq!(controller.transport().len(), 1);
}

#[test]
fn test_upsert_without_id_gets_one() {
    let controller = controller();
    let stored = controller.upsert_patient(&patient(None)).unwrap();

    let id = id_of(&stored).to_string();
    let fetched = controller.get_patient(&id).unwrap();
    assert_eq!(fetched, stored);
}

#[test]
fn test_get_missing_patient() {
    let controller = controller();
    let err = controller.get_patient("does-not-exist").unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));

    let outcome = OperationOutcome::from(&err);
    assert_eq!(outcome.issue[0].code, IssueType::NotFound);
}

#[test]
fn test_delete_patient() {
    let controller = controller();
    controller.upsert_patient(&patient(Some("to-delete"))).unwrap();

    controller.delete_patient("to-delete").unwrap();
    assert!(controller.transport().is_empty());
    assert!(matches!(
        controller.get_patient("to-delete"),
        Err(ClientError::NotFound(_))
    ));
    assert!(matches!(
        controller.delete_patient("to-delete"),
        Err(ClientError::NotFound(_))
    ));
}

#[test]
fn test_upsert_rejects_other_types() {
    let controller = controller();
    let name = Record::of_type(types::HUMAN_NAME).unwrap();

    let err = controller.upsert_patient(&name).unwrap_err();
    assert!(matches!(
        err,
        ClientError::Record(RecordError::TypeMismatch { .. })
    ));
    assert!(controller.transport().is_empty());
}

#[test]
fn test_fetched_patient_renders_as_json() {
    let controller = controller();
    controller.upsert_patient(&patient(Some("json-id"))).unwrap();

    let fetched = controller.get_patient("json-id").unwrap();
    let json: JsonValue = serde_json::from_str(&fetched.to_json()).unwrap();
    assert_eq!(json["id"], "json-id");
    assert_eq!(json["telecom"][0]["use"], "MOBILE");
}

#[test]
fn test_connect_with_missing_certificate() {
    init_tracing();
    let config = ClientConfig {
        address: "my.grpc.server:443".to_string(),
        secure: true,
        cert_path: Some("/nonexistent/ca.crt".into()),
    };
    let err = PatientController::<LoopbackTransport>::connect(&config).unwrap_err();
    assert!(matches!(err, ClientError::Config(_)));
}
