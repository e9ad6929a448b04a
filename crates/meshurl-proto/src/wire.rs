//! Restricted protobuf-style wire codec.
//!
//! Implements the subset of the protobuf wire format used by channel URLs:
//! varint fields, length-delimited fields (strings, bytes, sub-messages),
//! and fixed32/fixed64 fields. Group wire types are not part of the format
//! and are rejected rather than skipped.
//!
//! Tag encoding: `(field_number << 3) | wire_type`, packed as a varint.
//! Unknown field *numbers* decode fine and are left to the caller to
//! ignore, which is what gives the format its forward compatibility.

use thiserror::Error;

/// Wire type discriminants as they appear in the low 3 bits of a tag.
pub const WIRE_VARINT: u8 = 0;
pub const WIRE_FIXED64: u8 = 1;
pub const WIRE_LEN: u8 = 2;
pub const WIRE_FIXED32: u8 = 5;

/// Longest legal varint for a 64-bit value.
const MAX_VARINT_LEN: usize = 10;

/// Wire-level decode errors. Offsets index into the buffer handed to
/// [`FieldReader::new`] so callers can hex-dump the offending region.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("malformed varint at offset {offset} (no terminating byte)")]
    MalformedVarint { offset: usize },

    #[error(
        "truncated message at offset {offset} (field declares {needed} bytes, {available} remain)"
    )]
    TruncatedMessage {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("unsupported wire type {wire_type} at offset {offset}")]
    UnsupportedWireType { wire_type: u8, offset: usize },
}

/// A decoded field value, borrowed from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Varint(u64),
    Fixed64(u64),
    Bytes(&'a [u8]),
    Fixed32(u32),
}

impl FieldValue<'_> {
    /// Wire type this value arrived with.
    #[must_use]
    pub fn wire_type(&self) -> u8 {
        match self {
            Self::Varint(_) => WIRE_VARINT,
            Self::Fixed64(_) => WIRE_FIXED64,
            Self::Bytes(_) => WIRE_LEN,
            Self::Fixed32(_) => WIRE_FIXED32,
        }
    }
}

/// Streaming reader over a single message's fields.
///
/// Each [`next_field`](Self::next_field) call consumes one complete tagged
/// field, so skipping an unrecognized field number is just ignoring the
/// returned value.
#[derive(Debug)]
pub struct FieldReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset into the buffer.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Decode the next `(field_number, value)` pair, or `None` at end of
    /// buffer.
    ///
    /// # Errors
    /// Returns a [`WireError`] when the buffer ends mid-field or carries a
    /// wire type outside the restricted set.
    pub fn next_field(&mut self) -> Result<Option<(u32, FieldValue<'a>)>, WireError> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }

        let tag = self.read_varint()?;
        // saturate oversized field numbers instead of truncating, so they
        // can never alias a known field
        let field_number = u32::try_from(tag >> 3).unwrap_or(u32::MAX);
        let wire_type = (tag & 0x07) as u8;

        let value = match wire_type {
            WIRE_VARINT => FieldValue::Varint(self.read_varint()?),
            WIRE_FIXED64 => FieldValue::Fixed64(u64::from_le_bytes(
                self.read_exact(8)?.try_into().expect("8-byte slice"),
            )),
            WIRE_LEN => {
                let offset = self.pos;
                let len = self.read_varint()? as usize;
                let available = self.data.len() - self.pos;
                if len > available {
                    return Err(WireError::TruncatedMessage {
                        offset,
                        needed: len,
                        available,
                    });
                }
                let bytes = &self.data[self.pos..self.pos + len];
                self.pos += len;
                FieldValue::Bytes(bytes)
            }
            WIRE_FIXED32 => FieldValue::Fixed32(u32::from_le_bytes(
                self.read_exact(4)?.try_into().expect("4-byte slice"),
            )),
            other => {
                return Err(WireError::UnsupportedWireType {
                    wire_type: other,
                    offset: self.pos,
                });
            }
        };

        Ok(Some((field_number, value)))
    }

    fn read_varint(&mut self) -> Result<u64, WireError> {
        let start = self.pos;
        let mut result: u64 = 0;
        let mut shift = 0u32;

        loop {
            if self.pos >= self.data.len() || self.pos - start >= MAX_VARINT_LEN {
                return Err(WireError::MalformedVarint { offset: start });
            }
            let byte = self.data[self.pos];
            self.pos += 1;
            result |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    fn read_exact(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let available = self.data.len() - self.pos;
        if n > available {
            return Err(WireError::TruncatedMessage {
                offset: self.pos,
                needed: n,
                available,
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }
}

/// Append-only encoder for one message's fields.
///
/// Follows proto3 presence rules: default values (zero, false, empty) are
/// omitted entirely, so the field helpers are unconditional to call.
#[derive(Debug, Default)]
pub struct FieldWriter {
    buf: Vec<u8>,
}

impl FieldWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer, yielding the encoded message bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn varint_field(&mut self, field_number: u32, value: u64) {
        if value == 0 {
            return;
        }
        self.tag(field_number, WIRE_VARINT);
        self.varint(value);
    }

    pub fn bool_field(&mut self, field_number: u32, value: bool) {
        if value {
            self.varint_field(field_number, 1);
        }
    }

    pub fn bytes_field(&mut self, field_number: u32, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.tag(field_number, WIRE_LEN);
        self.varint(data.len() as u64);
        self.buf.extend_from_slice(data);
    }

    pub fn string_field(&mut self, field_number: u32, value: &str) {
        self.bytes_field(field_number, value.as_bytes());
    }

    /// Single-precision float carried as fixed32 bits. Zero is omitted.
    pub fn float_field(&mut self, field_number: u32, value: f32) {
        if value == 0.0 {
            return;
        }
        self.tag(field_number, WIRE_FIXED32);
        self.buf.extend_from_slice(&value.to_bits().to_le_bytes());
    }

    /// Embed a nested message, omitting it when the body is empty.
    pub fn message_field(&mut self, field_number: u32, inner: FieldWriter) {
        if inner.is_empty() {
            return;
        }
        self.bytes_field(field_number, &inner.buf);
    }

    /// Embed a repeated-element message. Unlike [`message_field`], an
    /// empty element still occupies its slot on the wire, so element
    /// counts survive a round trip.
    ///
    /// [`message_field`]: Self::message_field
    pub fn repeated_message_field(&mut self, field_number: u32, inner: FieldWriter) {
        self.tag(field_number, WIRE_LEN);
        self.varint(inner.buf.len() as u64);
        self.buf.extend_from_slice(&inner.buf);
    }

    fn tag(&mut self, field_number: u32, wire_type: u8) {
        self.varint((u64::from(field_number) << 3) | u64::from(wire_type));
    }

    fn varint(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(byte);
                return;
            }
            self.buf.push(byte | 0x80);
        }
    }
}
