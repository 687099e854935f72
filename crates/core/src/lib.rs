//! fhir-record: typed FHIR records with checked coded values
//!
//! Records are built field by field against a process-wide schema registry,
//! then serialized to a tag-length-value binary form, display text, or JSON.
//!
//! ```
//! use fhir_record::{AdministrativeGender, Record, types};
//!
//! let mut patient = Record::of_type(types::PATIENT)?;
//! patient.message_mut("id")?.set_scalar("value", "example-patient-123")?;
//! patient
//!     .message_mut("gender")?
//!     .set_code("value", AdministrativeGender::Female)?;
//!
//! let bytes = patient.to_bytes();
//! assert_eq!(Record::from_bytes(types::PATIENT, &bytes)?, patient);
//! assert!(patient.to_json().contains(r#""gender":"FEMALE""#));
//! # Ok::<(), fhir_record::RecordError>(())
//! ```

pub mod codec;
pub mod date;
pub mod error;
pub mod outcome;
pub mod record;
pub mod schema;

pub use date::{date_value, parse_date_value};
pub use error::RecordError;
pub use outcome::{IssueSeverity, IssueType, OperationOutcome, OperationOutcomeIssue};
pub use record::{Record, Value};
pub use schema::{
    AdministrativeGender, CodeRef, CodeSystem, ContactPointSystem, ContactPointUse, NameUse,
    SchemaRegistry, registry, types,
};
