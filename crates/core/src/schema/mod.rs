//! Schema definitions: descriptors, coded value sets and the registry

mod catalog;
mod codes;
mod descriptor;

pub use catalog::{SchemaRegistry, enum_descriptor, message_descriptor, registry, types};
pub use codes::{
    AdministrativeGender, CodeRef, CodeSystem, ContactPointSystem, ContactPointUse, NameUse,
};
pub use descriptor::{
    Cardinality, EnumDescriptor, FieldDescriptor, FieldKind, MessageDescriptor, ScalarKind,
};
