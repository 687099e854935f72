//! # Base-128 Variable-Length Integers
//!
//! Each byte carries seven value bits, least significant group first; the high
//! bit is set on every byte except the last. A `u64` needs at most ten bytes,
//! and the tenth may only carry the single remaining bit.
//!
//! | Value Range        | Bytes |
//! |--------------------|-------|
//! | 0 - 127            | 1     |
//! | 128 - 16383        | 2     |
//! | 16384 - 2097151    | 3     |
//! | ...                | ...   |
//! | 2^63 - u64::MAX    | 10    |
//!
//! Negative `int64` values are written as their two's complement `u64` and
//! therefore always take ten bytes.

use crate::error::RecordError;

pub const MAX_VARINT_LEN: usize = 10;

pub fn varint_len(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Decode a varint from the front of `buf`, returning `(value, bytes_read)`
pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize), RecordError> {
    let mut value: u64 = 0;
    for (i, byte) in buf.iter().take(MAX_VARINT_LEN).enumerate() {
        if i == MAX_VARINT_LEN - 1 && *byte > 0x01 {
            return Err(RecordError::MalformedEncoding(
                "varint overflows 64 bits".to_string(),
            ));
        }
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    if buf.len() >= MAX_VARINT_LEN {
        Err(RecordError::MalformedEncoding(
            "varint longer than 10 bytes".to_string(),
        ))
    } else {
        Err(RecordError::MalformedEncoding(format!(
            "truncated varint after {} bytes",
            buf.len()
        )))
    }
}
