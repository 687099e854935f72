//! Tag-length-value binary encoding
//!
//! Every present field is written as a key `varint(tag << 3 | wire_type)`
//! followed by its payload, in ascending tag order. Repeated fields emit one
//! key per element. Decoders skip tags they do not know.

use tracing::debug;

use super::varint::{decode_varint, encode_varint, varint_len};
use crate::error::RecordError;
use crate::record::{Record, Value};
use crate::schema::{
    FieldDescriptor, FieldKind, MessageDescriptor, ScalarKind, enum_descriptor, message_descriptor,
};

/// Nesting depth beyond which a buffer is rejected
pub const MAX_DEPTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WireType {
    Varint = 0,
    Fixed64 = 1,
    Len = 2,
    Fixed32 = 5,
}

impl WireType {
    fn from_key(key: u64) -> Result<Self, RecordError> {
        match key & 0x07 {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::Len),
            5 => Ok(WireType::Fixed32),
            other => Err(RecordError::MalformedEncoding(format!(
                "unsupported wire type {}",
                other
            ))),
        }
    }

    fn of(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Scalar(ScalarKind::String) | FieldKind::Message(_) => WireType::Len,
            FieldKind::Scalar(ScalarKind::Int64 | ScalarKind::Bool) | FieldKind::Code(_) => {
                WireType::Varint
            }
        }
    }
}

fn key(tag: u32, wire_type: WireType) -> u64 {
    (u64::from(tag) << 3) | wire_type as u64
}

/// Encoded size of a record, excluding any enclosing key or length prefix
pub fn encoded_len(record: &Record) -> usize {
    record
        .entries()
        .flat_map(|(field, slot)| slot.values().iter().map(move |value| (field, value)))
        .map(|(field, value)| {
            let key_len = varint_len(key(field.tag, WireType::of(field.kind)));
            key_len + value_len(value)
        })
        .sum()
}

fn value_len(value: &Value) -> usize {
    match value {
        Value::String(s) => varint_len(s.len() as u64) + s.len(),
        Value::Int64(v) => varint_len(*v as u64),
        Value::Bool(_) => 1,
        Value::Code(n) => varint_len(i64::from(*n) as u64),
        Value::Message(record) => {
            let len = encoded_len(record);
            varint_len(len as u64) + len
        }
    }
}

/// Encode every present field of `record` into `buf`
pub fn encode(record: &Record, buf: &mut Vec<u8>) {
    for (field, slot) in record.entries() {
        for value in slot.values() {
            encode_varint(key(field.tag, WireType::of(field.kind)), buf);
            encode_value(value, buf);
        }
    }
}

fn encode_value(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::String(s) => {
            encode_varint(s.len() as u64, buf);
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Int64(v) => encode_varint(*v as u64, buf),
        Value::Bool(b) => encode_varint(u64::from(*b), buf),
        Value::Code(n) => encode_varint(i64::from(*n) as u64, buf),
        Value::Message(record) => {
            encode_varint(encoded_len(record) as u64, buf);
            encode(record, buf);
        }
    }
}

/// Decode a record of the given type
pub fn decode(descriptor: &'static MessageDescriptor, bytes: &[u8]) -> Result<Record, RecordError> {
    let mut record = Record::new(descriptor);
    merge(&mut record, bytes, 0)?;
    Ok(record)
}

/// Cursor over an encoded buffer
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn read_varint(&mut self) -> Result<u64, RecordError> {
        let (value, read) = decode_varint(&self.buf[self.pos..])?;
        self.pos += read;
        Ok(value)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], RecordError> {
        let remaining = self.buf.len() - self.pos;
        if len > remaining {
            return Err(RecordError::MalformedEncoding(format!(
                "payload of {} bytes exceeds the {} remaining",
                len, remaining
            )));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_len_prefixed(&mut self) -> Result<&'a [u8], RecordError> {
        let len = self.read_varint()?;
        let len = usize::try_from(len)
            .map_err(|_| RecordError::MalformedEncoding(format!("length {} is too large", len)))?;
        self.read_bytes(len)
    }

    fn skip(&mut self, wire_type: WireType) -> Result<(), RecordError> {
        match wire_type {
            WireType::Varint => self.read_varint().map(|_| ()),
            WireType::Fixed64 => self.read_bytes(8).map(|_| ()),
            WireType::Len => self.read_len_prefixed().map(|_| ()),
            WireType::Fixed32 => self.read_bytes(4).map(|_| ()),
        }
    }
}

fn merge(record: &mut Record, bytes: &[u8], depth: usize) -> Result<(), RecordError> {
    if depth > MAX_DEPTH {
        return Err(RecordError::MalformedEncoding(format!(
            "nesting exceeds {} levels",
            MAX_DEPTH
        )));
    }

    let descriptor = record.descriptor();
    let mut reader = Reader::new(bytes);
    while !reader.is_empty() {
        let key = reader.read_varint()?;
        let wire_type = WireType::from_key(key)?;
        let tag = key >> 3;
        if tag == 0 || tag > u64::from(u32::MAX >> 3) {
            return Err(RecordError::MalformedEncoding(format!("invalid field tag {}", tag)));
        }

        let Some(field) = descriptor.field_by_tag(tag as u32) else {
            debug!(type_name = descriptor.name, tag, "skipping unknown field");
            reader.skip(wire_type)?;
            continue;
        };

        decode_field(record, field, wire_type, &mut reader, depth)?;
    }
    Ok(())
}

fn decode_field(
    record: &mut Record,
    field: &'static FieldDescriptor,
    wire_type: WireType,
    reader: &mut Reader<'_>,
    depth: usize,
) -> Result<(), RecordError> {
    let expected = WireType::of(field.kind);

    // Packed repeated varints
    if field.is_repeated() && expected == WireType::Varint && wire_type == WireType::Len {
        let mut packed = Reader::new(reader.read_len_prefixed()?);
        while !packed.is_empty() {
            let raw = packed.read_varint()?;
            let value = varint_value(field, raw)?;
            record.put(field, value);
        }
        return Ok(());
    }

    if wire_type != expected {
        return Err(RecordError::MalformedEncoding(format!(
            "{}.{} expects wire type {}, found {}",
            record.type_name(),
            field.name,
            expected as u8,
            wire_type as u8
        )));
    }

    let value = match field.kind {
        FieldKind::Scalar(ScalarKind::String) => {
            let bytes = reader.read_len_prefixed()?;
            let s = std::str::from_utf8(bytes).map_err(|e| {
                RecordError::MalformedEncoding(format!(
                    "{}.{} is not valid UTF-8: {}",
                    record.type_name(),
                    field.name,
                    e
                ))
            })?;
            Value::String(s.to_string())
        }
        FieldKind::Message(type_name) => {
            let payload = reader.read_len_prefixed()?;
            let mut nested = Record::new(message_descriptor(type_name)?);
            merge(&mut nested, payload, depth + 1)?;
            Value::Message(nested)
        }
        FieldKind::Scalar(_) | FieldKind::Code(_) => {
            let raw = reader.read_varint()?;
            varint_value(field, raw)?
        }
    };
    record.put(field, value);
    Ok(())
}

fn varint_value(field: &FieldDescriptor, raw: u64) -> Result<Value, RecordError> {
    match field.kind {
        FieldKind::Scalar(ScalarKind::Int64) => Ok(Value::Int64(raw as i64)),
        FieldKind::Scalar(ScalarKind::Bool) => match raw {
            0 => Ok(Value::Bool(false)),
            1 => Ok(Value::Bool(true)),
            other => Err(RecordError::MalformedEncoding(format!(
                "{} is not a valid bool for {}",
                other, field.name
            ))),
        },
        FieldKind::Code(enumeration) => {
            let number = i32::try_from(raw as i64)
                .map_err(|_| RecordError::invalid_enum(enumeration, raw as i64))?;
            if !enum_descriptor(enumeration)?.contains(number) {
                return Err(RecordError::invalid_enum(enumeration, number));
            }
            Ok(Value::Code(number))
        }
        FieldKind::Scalar(ScalarKind::String) | FieldKind::Message(_) => {
            Err(RecordError::MalformedEncoding(format!(
                "{} is not a varint field",
                field.name
            )))
        }
    }
}
