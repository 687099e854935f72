//! Field, message and enumeration descriptors

use std::fmt;

/// Primitive payload carried by a scalar field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Int64,
    Bool,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Int64 => "int64",
            ScalarKind::Bool => "bool",
        }
    }
}

/// What a field holds: a scalar, a coded value, or a nested record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarKind),
    /// Coded value bound to the named enumeration
    Code(&'static str),
    /// Nested record of the named message type
    Message(&'static str),
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar(kind) => f.write_str(kind.name()),
            FieldKind::Code(enumeration) => write!(f, "code {}", enumeration),
            FieldKind::Message(type_name) => write!(f, "message {}", type_name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Singular,
    Repeated,
}

/// A declared field of a message type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Declared (snake_case) name
    pub name: &'static str,
    /// Name used as the JSON key
    pub json_name: &'static str,
    /// Stable wire tag, independent of the name
    pub tag: u32,
    pub kind: FieldKind,
    pub cardinality: Cardinality,
}

impl FieldDescriptor {
    pub fn singular(name: &'static str, json_name: &'static str, tag: u32, kind: FieldKind) -> Self {
        Self {
            name,
            json_name,
            tag,
            kind,
            cardinality: Cardinality::Singular,
        }
    }

    pub fn repeated(name: &'static str, json_name: &'static str, tag: u32, kind: FieldKind) -> Self {
        Self {
            name,
            json_name,
            tag,
            kind,
            cardinality: Cardinality::Repeated,
        }
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }
}

/// A message type: an ordered list of fields plus rendering hints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    pub name: &'static str,
    /// Fields in declaration order
    pub fields: Vec<FieldDescriptor>,
    /// Single-`value` presence wrapper, rendered as its bare value in JSON
    pub wrapper: bool,
    /// FHIR resource, carries `resourceType` in JSON
    pub resource: bool,
}

impl MessageDescriptor {
    pub fn new(name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name,
            fields,
            wrapper: false,
            resource: false,
        }
    }

    /// Presence wrapper around a single `value` field
    pub fn wrapper(name: &'static str, field: FieldDescriptor) -> Self {
        Self {
            name,
            fields: vec![field],
            wrapper: true,
            resource: false,
        }
    }

    pub fn resource(name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name,
            fields,
            wrapper: false,
            resource: true,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a JSON key, accepting the JSON name or the declared name
    pub fn field_by_json_name(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.json_name == key)
            .or_else(|| self.field(key))
    }

    pub fn field_by_tag(&self, tag: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    /// The wrapped field of a presence wrapper
    pub fn wrapped_field(&self) -> Option<&FieldDescriptor> {
        if self.wrapper {
            self.fields.first()
        } else {
            None
        }
    }
}

/// A closed set of integer-backed symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub name: &'static str,
    pub members: &'static [(&'static str, i32)],
}

impl EnumDescriptor {
    pub fn symbol(&self, number: i32) -> Option<&'static str> {
        self.members
            .iter()
            .find(|(_, n)| *n == number)
            .map(|(symbol, _)| *symbol)
    }

    pub fn number(&self, symbol: &str) -> Option<i32> {
        self.members
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, number)| *number)
    }

    pub fn contains(&self, number: i32) -> bool {
        self.symbol(number).is_some()
    }
}
