//! Human-readable display text
//!
//! Fields appear in declaration order, one per line, nested records in braces
//! indented by two spaces per level. Codes print as their symbol.

use std::fmt::{self, Write};

use crate::record::{Record, Value};
use crate::schema::{FieldKind, enum_descriptor};

pub fn write_record<W: Write>(out: &mut W, record: &Record, indent: usize) -> fmt::Result {
    for (field, slot) in record.declared_entries() {
        for value in slot.values() {
            write!(out, "{:width$}{}", "", field.name, width = indent * 2)?;
            match value {
                Value::Message(nested) => {
                    out.write_str(" {\n")?;
                    write_record(out, nested, indent + 1)?;
                    writeln!(out, "{:width$}}}", "", width = indent * 2)?;
                }
                Value::String(s) => {
                    out.write_str(": \"")?;
                    write_escaped(out, s)?;
                    out.write_str("\"\n")?;
                }
                Value::Int64(v) => writeln!(out, ": {}", v)?,
                Value::Bool(b) => writeln!(out, ": {}", b)?,
                Value::Code(number) => {
                    let symbol = match field.kind {
                        FieldKind::Code(enumeration) => enum_descriptor(enumeration)
                            .ok()
                            .and_then(|e| e.symbol(*number)),
                        _ => None,
                    };
                    match symbol {
                        Some(symbol) => writeln!(out, ": {}", symbol)?,
                        None => writeln!(out, ": {}", number)?,
                    }
                }
            }
        }
    }
    Ok(())
}

fn write_escaped<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if c.is_control() => {
                let mut bytes = [0u8; 4];
                for byte in c.encode_utf8(&mut bytes).bytes() {
                    write!(out, "\\{:03o}", byte)?;
                }
            }
            c => out.write_char(c)?,
        }
    }
    Ok(())
}
