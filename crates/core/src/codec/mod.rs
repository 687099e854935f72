//! Serialization: binary wire format, display text and JSON

pub mod binary;
pub mod json;
pub mod text;
pub mod varint;

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::error::RecordError;
use crate::record::Record;
use crate::schema::message_descriptor;

impl Record {
    /// Canonical binary encoding of every set field
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(binary::encoded_len(self));
        binary::encode(self, &mut buf);
        buf
    }

    /// Decode a record of a registered type from its binary encoding
    pub fn from_bytes(type_name: &str, bytes: &[u8]) -> Result<Record, RecordError> {
        binary::decode(message_descriptor(type_name)?, bytes)
    }

    /// Human-readable rendering, for logs and debugging only
    pub fn to_display_text(&self) -> String {
        self.to_string()
    }

    /// Compact JSON document
    pub fn to_json(&self) -> String {
        self.to_json_value().to_string()
    }

    pub fn to_json_pretty(&self) -> String {
        format!("{:#}", self.to_json_value())
    }

    pub fn to_json_value(&self) -> JsonValue {
        json::to_value(self)
    }

    /// Parse a JSON document into a record of a registered type
    pub fn from_json(type_name: &str, text: &str) -> Result<Record, RecordError> {
        let value: JsonValue = serde_json::from_str(text)?;
        Self::from_json_value(type_name, &value)
    }

    pub fn from_json_value(type_name: &str, value: &JsonValue) -> Result<Record, RecordError> {
        json::from_value(message_descriptor(type_name)?, value)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        text::write_record(f, self, 0)
    }
}

/// Serializes as the record's JSON form
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}
