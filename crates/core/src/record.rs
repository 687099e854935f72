//! Schema-checked records
//!
//! A [`Record`] is an instance of a registered message type. Fields are either
//! absent or present; presence never depends on the value, so an empty string
//! or a zero is still a set field.

use std::collections::BTreeMap;

use crate::error::RecordError;
use crate::schema::{
    CodeRef, FieldDescriptor, FieldKind, MessageDescriptor, ScalarKind, enum_descriptor,
    message_descriptor,
};

/// A single field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int64(i64),
    Bool(bool),
    /// Number of a member of the field's enumeration
    Code(i32),
    Message(Record),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_code(&self) -> Option<i32> {
        match self {
            Value::Code(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Message(r) => Some(r),
            _ => None,
        }
    }

    fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Value::String(_) => Some(ScalarKind::String),
            Value::Int64(_) => Some(ScalarKind::Int64),
            Value::Bool(_) => Some(ScalarKind::Bool),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            Value::Code(_) => "code".to_string(),
            Value::Message(r) => format!("message {}", r.type_name()),
            other => other
                .scalar_kind()
                .map(|k| k.name().to_string())
                .unwrap_or_default(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(v.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Message(r)
    }
}

/// Storage for one present field
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    Single(Value),
    Repeated(Vec<Value>),
}

impl Slot {
    pub(crate) fn values(&self) -> &[Value] {
        match self {
            Slot::Single(v) => std::slice::from_ref(v),
            Slot::Repeated(vs) => vs,
        }
    }
}

/// A mutable instance of a registered message type
#[derive(Debug, Clone)]
pub struct Record {
    descriptor: &'static MessageDescriptor,
    fields: BTreeMap<u32, Slot>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.name == other.descriptor.name && self.fields == other.fields
    }
}

impl Record {
    /// Create an empty record with every field unset
    pub fn new(descriptor: &'static MessageDescriptor) -> Self {
        Self {
            descriptor,
            fields: BTreeMap::new(),
        }
    }

    /// Create an empty record of a registered type
    pub fn of_type(type_name: &str) -> Result<Self, RecordError> {
        Ok(Self::new(message_descriptor(type_name)?))
    }

    pub fn descriptor(&self) -> &'static MessageDescriptor {
        self.descriptor
    }

    pub fn type_name(&self) -> &'static str {
        self.descriptor.name
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn field(&self, name: &str) -> Result<&'static FieldDescriptor, RecordError> {
        self.descriptor
            .field(name)
            .ok_or_else(|| RecordError::unknown_field(self.descriptor.name, name))
    }

    fn singular_field(&self, name: &str) -> Result<&'static FieldDescriptor, RecordError> {
        let field = self.field(name)?;
        if field.is_repeated() {
            return Err(RecordError::SchemaViolation(format!(
                "{}.{} is repeated; use append",
                self.descriptor.name, name
            )));
        }
        Ok(field)
    }

    fn repeated_field(&self, name: &str) -> Result<&'static FieldDescriptor, RecordError> {
        let field = self.field(name)?;
        if !field.is_repeated() {
            return Err(RecordError::SchemaViolation(format!(
                "{}.{} is not a repeated field",
                self.descriptor.name, name
            )));
        }
        Ok(field)
    }

    /// Assign a scalar field
    pub fn set_scalar(
        &mut self,
        field_name: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self, RecordError> {
        let field = self.singular_field(field_name)?;
        let value = value.into();
        if !matches!(field.kind, FieldKind::Scalar(_)) {
            return Err(self.kind_violation(field, &value));
        }
        self.check_value(field, &value)?;
        self.fields.insert(field.tag, Slot::Single(value));
        Ok(self)
    }

    /// Assign a coded field from a typed member, a symbol, or a raw number
    pub fn set_code<'a>(
        &mut self,
        field_name: &str,
        member: impl Into<CodeRef<'a>>,
    ) -> Result<&mut Self, RecordError> {
        let field = self.singular_field(field_name)?;
        let FieldKind::Code(enumeration) = field.kind else {
            return Err(RecordError::SchemaViolation(format!(
                "{}.{} is {}, not a coded field",
                self.descriptor.name, field.name, field.kind
            )));
        };
        let number = resolve_code(enumeration, member.into())?;
        self.fields.insert(field.tag, Slot::Single(Value::Code(number)));
        Ok(self)
    }

    /// Assign a singular sub-record; its type must match the field's
    pub fn set_message(&mut self, field_name: &str, record: Record) -> Result<&mut Self, RecordError> {
        let field = self.singular_field(field_name)?;
        let value = Value::Message(record);
        if !matches!(field.kind, FieldKind::Message(_)) {
            return Err(self.kind_violation(field, &value));
        }
        self.check_value(field, &value)?;
        self.fields.insert(field.tag, Slot::Single(value));
        Ok(self)
    }

    /// Mutable access to a singular sub-record, creating it empty if unset.
    ///
    /// Like protobuf mutable access, this marks the field present.
    pub fn message_mut(&mut self, field_name: &str) -> Result<&mut Record, RecordError> {
        let field = self.singular_field(field_name)?;
        let FieldKind::Message(type_name) = field.kind else {
            return Err(RecordError::SchemaViolation(format!(
                "{}.{} is {}, not a message field",
                self.descriptor.name, field.name, field.kind
            )));
        };
        let descriptor = message_descriptor(type_name)?;
        let owner = self.descriptor.name;
        let slot = self
            .fields
            .entry(field.tag)
            .or_insert_with(|| Slot::Single(Value::Message(Record::new(descriptor))));
        match slot {
            Slot::Single(Value::Message(record)) => Ok(record),
            _ => Err(RecordError::SchemaViolation(format!(
                "{}.{} holds a non-message value",
                owner, field.name
            ))),
        }
    }

    /// Append to a repeated field, preserving insertion order
    pub fn append(&mut self, field_name: &str, element: impl Into<Value>) -> Result<&mut Self, RecordError> {
        let field = self.repeated_field(field_name)?;
        let element = element.into();
        self.check_value(field, &element)?;
        self.push(field, element);
        Ok(self)
    }

    /// Append an empty sub-record to a repeated message field and return it
    pub fn add(&mut self, field_name: &str) -> Result<&mut Record, RecordError> {
        let field = self.repeated_field(field_name)?;
        let FieldKind::Message(type_name) = field.kind else {
            return Err(RecordError::SchemaViolation(format!(
                "{}.{} is {}, not a message field",
                self.descriptor.name, field.name, field.kind
            )));
        };
        let descriptor = message_descriptor(type_name)?;
        let owner = self.descriptor.name;
        self.push(field, Value::Message(Record::new(descriptor)));
        match self.fields.get_mut(&field.tag) {
            Some(Slot::Repeated(values)) => match values.last_mut() {
                Some(Value::Message(record)) => Ok(record),
                _ => Err(RecordError::SchemaViolation(format!(
                    "{}.{} holds a non-message value",
                    owner, field.name
                ))),
            },
            _ => Err(RecordError::SchemaViolation(format!(
                "{}.{} is not stored as a repeated field",
                owner, field.name
            ))),
        }
    }

    /// Replace this record's contents with a deep copy of `source`
    pub fn copy_from(&mut self, source: &Record) -> Result<(), RecordError> {
        self.check_same_type(source)?;
        self.fields = source.fields.clone();
        Ok(())
    }

    /// Merge `source` into this record: scalars and codes overwrite,
    /// sub-records merge, repeated fields append.
    pub fn merge_from(&mut self, source: &Record) -> Result<(), RecordError> {
        self.check_same_type(source)?;
        self.merge_unchecked(source);
        Ok(())
    }

    /// Unset a field
    pub fn clear(&mut self, field_name: &str) -> Result<(), RecordError> {
        let field = self.field(field_name)?;
        self.fields.remove(&field.tag);
        Ok(())
    }

    /// Whether a field is present. Undeclared names are never present.
    pub fn has(&self, field_name: &str) -> bool {
        self.descriptor
            .field(field_name)
            .is_some_and(|f| self.fields.contains_key(&f.tag))
    }

    /// Value of a singular field, or `None` when unset or undeclared
    pub fn get(&self, field_name: &str) -> Option<&Value> {
        let field = self.descriptor.field(field_name)?;
        match self.fields.get(&field.tag)? {
            Slot::Single(value) => Some(value),
            Slot::Repeated(_) => None,
        }
    }

    pub fn string(&self, field_name: &str) -> Option<&str> {
        self.get(field_name).and_then(Value::as_str)
    }

    pub fn int64(&self, field_name: &str) -> Option<i64> {
        self.get(field_name).and_then(Value::as_i64)
    }

    pub fn bool(&self, field_name: &str) -> Option<bool> {
        self.get(field_name).and_then(Value::as_bool)
    }

    pub fn code(&self, field_name: &str) -> Option<i32> {
        self.get(field_name).and_then(Value::as_code)
    }

    /// Symbol of a coded field
    pub fn code_symbol(&self, field_name: &str) -> Option<&'static str> {
        let field = self.descriptor.field(field_name)?;
        let FieldKind::Code(enumeration) = field.kind else {
            return None;
        };
        let number = self.code(field_name)?;
        enum_descriptor(enumeration).ok()?.symbol(number)
    }

    pub fn message(&self, field_name: &str) -> Option<&Record> {
        self.get(field_name).and_then(Value::as_record)
    }

    /// Elements of a repeated field in insertion order; empty when unset
    pub fn repeated(&self, field_name: &str) -> &[Value] {
        let slot = self
            .descriptor
            .field(field_name)
            .and_then(|f| self.fields.get(&f.tag));
        match slot {
            Some(Slot::Repeated(values)) => values,
            _ => &[],
        }
    }

    /// Present fields in ascending tag order
    pub(crate) fn entries(&self) -> impl Iterator<Item = (&'static FieldDescriptor, &Slot)> {
        let descriptor = self.descriptor;
        self.fields.iter().filter_map(move |(tag, slot)| {
            descriptor.field_by_tag(*tag).map(|field| (field, slot))
        })
    }

    /// Present fields in declaration order
    pub(crate) fn declared_entries(&self) -> impl Iterator<Item = (&'static FieldDescriptor, &Slot)> {
        self.descriptor
            .fields
            .iter()
            .filter_map(move |field| self.fields.get(&field.tag).map(|slot| (field, slot)))
    }

    /// Store an already validated value: repeated fields append, singular
    /// sub-records merge, other singular values overwrite.
    pub(crate) fn put(&mut self, field: &FieldDescriptor, value: Value) {
        if field.is_repeated() {
            self.push(field, value);
            return;
        }
        if let (Some(Slot::Single(Value::Message(existing))), Value::Message(incoming)) =
            (self.fields.get_mut(&field.tag), &value)
        {
            existing.merge_unchecked(incoming);
            return;
        }
        self.fields.insert(field.tag, Slot::Single(value));
    }

    /// Check a value against a field's declared kind
    pub(crate) fn check_value(&self, field: &FieldDescriptor, value: &Value) -> Result<(), RecordError> {
        match (field.kind, value) {
            (FieldKind::Scalar(kind), v) if v.scalar_kind() == Some(kind) => Ok(()),
            (FieldKind::Code(enumeration), Value::Code(number)) => {
                if enum_descriptor(enumeration)?.contains(*number) {
                    Ok(())
                } else {
                    Err(RecordError::invalid_enum(enumeration, number))
                }
            }
            (FieldKind::Message(type_name), Value::Message(record)) if record.type_name() == type_name => {
                Ok(())
            }
            _ => Err(self.kind_violation(field, value)),
        }
    }

    fn kind_violation(&self, field: &FieldDescriptor, value: &Value) -> RecordError {
        RecordError::SchemaViolation(format!(
            "{}.{} expects {}, got {}",
            self.descriptor.name,
            field.name,
            field.kind,
            value.describe()
        ))
    }

    fn push(&mut self, field: &FieldDescriptor, value: Value) {
        match self.fields.entry(field.tag).or_insert_with(|| Slot::Repeated(Vec::new())) {
            Slot::Repeated(values) => values.push(value),
            other => *other = Slot::Repeated(vec![value]),
        }
    }

    fn check_same_type(&self, source: &Record) -> Result<(), RecordError> {
        if self.descriptor.name != source.descriptor.name {
            return Err(RecordError::type_mismatch(
                self.descriptor.name,
                source.descriptor.name,
            ));
        }
        Ok(())
    }

    fn merge_unchecked(&mut self, source: &Record) {
        for (tag, slot) in &source.fields {
            match (self.fields.get_mut(tag), slot) {
                (Some(Slot::Repeated(values)), Slot::Repeated(incoming)) => {
                    values.extend(incoming.iter().cloned())
                }
                (Some(Slot::Single(Value::Message(existing))), Slot::Single(Value::Message(incoming))) => {
                    existing.merge_unchecked(incoming)
                }
                _ => {
                    self.fields.insert(*tag, slot.clone());
                }
            }
        }
    }
}

/// Resolve a coded value against an enumeration
fn resolve_code(enumeration: &'static str, member: CodeRef<'_>) -> Result<i32, RecordError> {
    let descriptor = enum_descriptor(enumeration)?;
    match member {
        CodeRef::Member {
            enumeration: source,
            number,
        } => {
            if source != enumeration {
                let symbol = enum_descriptor(source)?
                    .symbol(number)
                    .map(|s| format!("{}.{}", source, s))
                    .unwrap_or_else(|| format!("{}({})", source, number));
                return Err(RecordError::invalid_enum(enumeration, symbol));
            }
            if descriptor.contains(number) {
                Ok(number)
            } else {
                Err(RecordError::invalid_enum(enumeration, number))
            }
        }
        CodeRef::Symbol(symbol) => descriptor
            .number(symbol)
            .ok_or_else(|| RecordError::invalid_enum(enumeration, symbol)),
        CodeRef::Number(number) => {
            if descriptor.contains(number) {
                Ok(number)
            } else {
                Err(RecordError::invalid_enum(enumeration, number))
            }
        }
    }
}
