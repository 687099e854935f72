//! Process-wide schema catalog
//!
//! Message and enumeration definitions are built once, on first use, and are
//! read-only afterwards.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::codes::{AdministrativeGender, CodeSystem, ContactPointSystem, ContactPointUse, NameUse};
use super::descriptor::{EnumDescriptor, FieldDescriptor, FieldKind, MessageDescriptor, ScalarKind};
use crate::error::RecordError;

/// Message type names known to the registry
pub mod types {
    pub const PATIENT: &str = "Patient";
    pub const HUMAN_NAME: &str = "HumanName";
    pub const CONTACT_POINT: &str = "ContactPoint";
    pub const IDENTIFIER: &str = "Identifier";
    pub const STRING: &str = "String";
    pub const ID: &str = "Id";
    pub const URI: &str = "Uri";
    pub const BOOLEAN: &str = "Boolean";
    pub const POSITIVE_INT: &str = "PositiveInt";
    pub const DATE: &str = "Date";
    pub const GENDER_CODE: &str = "Patient.GenderCode";
    pub const CONTACT_POINT_SYSTEM_CODE: &str = "ContactPoint.SystemCode";
    pub const CONTACT_POINT_USE_CODE: &str = "ContactPoint.UseCode";
    pub const NAME_USE_CODE: &str = "HumanName.UseCode";
    pub const PATIENT_REF: &str = "PatientRef";
}

static REGISTRY: LazyLock<SchemaRegistry> = LazyLock::new(SchemaRegistry::r5);

/// The process-wide registry
pub fn registry() -> &'static SchemaRegistry {
    &REGISTRY
}

/// Immutable set of message and enumeration definitions, keyed by type name
#[derive(Debug)]
pub struct SchemaRegistry {
    version: &'static str,
    messages: HashMap<&'static str, MessageDescriptor>,
    enums: HashMap<&'static str, EnumDescriptor>,
}

impl SchemaRegistry {
    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn message(&self, name: &str) -> Option<&MessageDescriptor> {
        self.messages.get(name)
    }

    pub fn enumeration(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enums.get(name)
    }

    /// Registered message type names, sorted
    pub fn message_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.messages.keys().copied().collect();
        names.sort_unstable();
        names
    }

    fn r5() -> Self {
        let mut registry = Self {
            version: "R5",
            messages: HashMap::new(),
            enums: HashMap::new(),
        };

        registry.add_code_system::<AdministrativeGender>();
        registry.add_code_system::<ContactPointSystem>();
        registry.add_code_system::<ContactPointUse>();
        registry.add_code_system::<NameUse>();

        // Primitive presence wrappers
        registry.add_wrapper(types::STRING, "value", "value", FieldKind::Scalar(ScalarKind::String));
        registry.add_wrapper(types::ID, "value", "value", FieldKind::Scalar(ScalarKind::String));
        registry.add_wrapper(types::URI, "value", "value", FieldKind::Scalar(ScalarKind::String));
        registry.add_wrapper(types::BOOLEAN, "value", "value", FieldKind::Scalar(ScalarKind::Bool));
        registry.add_wrapper(
            types::POSITIVE_INT,
            "value",
            "value",
            FieldKind::Scalar(ScalarKind::Int64),
        );
        registry.add_wrapper(types::DATE, "value_us", "valueUs", FieldKind::Scalar(ScalarKind::Int64));

        // Coded wrappers
        registry.add_wrapper(
            types::GENDER_CODE,
            "value",
            "value",
            FieldKind::Code(AdministrativeGender::NAME),
        );
        registry.add_wrapper(
            types::CONTACT_POINT_SYSTEM_CODE,
            "value",
            "value",
            FieldKind::Code(ContactPointSystem::NAME),
        );
        registry.add_wrapper(
            types::CONTACT_POINT_USE_CODE,
            "value",
            "value",
            FieldKind::Code(ContactPointUse::NAME),
        );
        registry.add_wrapper(
            types::NAME_USE_CODE,
            "value",
            "value",
            FieldKind::Code(NameUse::NAME),
        );

        registry.add(MessageDescriptor::new(
            types::IDENTIFIER,
            vec![
                FieldDescriptor::singular("system", "system", 1, FieldKind::Message(types::URI)),
                FieldDescriptor::singular("value", "value", 2, FieldKind::Message(types::STRING)),
            ],
        ));

        registry.add(MessageDescriptor::new(
            types::HUMAN_NAME,
            vec![
                FieldDescriptor::singular("use", "use", 1, FieldKind::Message(types::NAME_USE_CODE)),
                FieldDescriptor::singular("text", "text", 2, FieldKind::Message(types::STRING)),
                FieldDescriptor::singular("family", "family", 3, FieldKind::Message(types::STRING)),
                FieldDescriptor::repeated("given", "given", 4, FieldKind::Message(types::STRING)),
                FieldDescriptor::repeated("prefix", "prefix", 5, FieldKind::Message(types::STRING)),
                FieldDescriptor::repeated("suffix", "suffix", 6, FieldKind::Message(types::STRING)),
            ],
        ));

        registry.add(MessageDescriptor::new(
            types::CONTACT_POINT,
            vec![
                FieldDescriptor::singular(
                    "system",
                    "system",
                    1,
                    FieldKind::Message(types::CONTACT_POINT_SYSTEM_CODE),
                ),
                FieldDescriptor::singular("value", "value", 2, FieldKind::Message(types::STRING)),
                FieldDescriptor::singular(
                    "use",
                    "use",
                    3,
                    FieldKind::Message(types::CONTACT_POINT_USE_CODE),
                ),
                FieldDescriptor::singular("rank", "rank", 4, FieldKind::Message(types::POSITIVE_INT)),
            ],
        ));

        registry.add(MessageDescriptor::resource(
            types::PATIENT,
            vec![
                FieldDescriptor::singular("id", "id", 1, FieldKind::Message(types::ID)),
                FieldDescriptor::repeated(
                    "identifier",
                    "identifier",
                    2,
                    FieldKind::Message(types::IDENTIFIER),
                ),
                FieldDescriptor::singular("active", "active", 3, FieldKind::Message(types::BOOLEAN)),
                FieldDescriptor::repeated("name", "name", 4, FieldKind::Message(types::HUMAN_NAME)),
                FieldDescriptor::repeated(
                    "telecom",
                    "telecom",
                    5,
                    FieldKind::Message(types::CONTACT_POINT),
                ),
                FieldDescriptor::singular(
                    "gender",
                    "gender",
                    6,
                    FieldKind::Message(types::GENDER_CODE),
                ),
                FieldDescriptor::singular(
                    "birth_date",
                    "birthDate",
                    7,
                    FieldKind::Message(types::DATE),
                ),
            ],
        ));

        // Sync envelope, not a FHIR type
        registry.add(MessageDescriptor::new(
            types::PATIENT_REF,
            vec![FieldDescriptor::singular(
                "id",
                "id",
                1,
                FieldKind::Scalar(ScalarKind::String),
            )],
        ));

        registry
    }

    fn add(&mut self, message: MessageDescriptor) {
        self.messages.insert(message.name, message);
    }

    fn add_wrapper(
        &mut self,
        name: &'static str,
        field: &'static str,
        json_name: &'static str,
        kind: FieldKind,
    ) {
        self.add(MessageDescriptor::wrapper(
            name,
            FieldDescriptor::singular(field, json_name, 1, kind),
        ));
    }

    fn add_code_system<C: CodeSystem>(&mut self) {
        self.enums.insert(
            C::NAME,
            EnumDescriptor {
                name: C::NAME,
                members: C::MEMBERS,
            },
        );
    }
}

/// Resolve a message type in the process-wide registry
pub fn message_descriptor(name: &str) -> Result<&'static MessageDescriptor, RecordError> {
    registry()
        .message(name)
        .ok_or_else(|| RecordError::SchemaViolation(format!("unknown message type '{}'", name)))
}

/// Resolve an enumeration in the process-wide registry
pub fn enum_descriptor(name: &str) -> Result<&'static EnumDescriptor, RecordError> {
    registry()
        .enumeration(name)
        .ok_or_else(|| RecordError::SchemaViolation(format!("unknown enumeration '{}'", name)))
}
