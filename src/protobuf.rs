//! Protocol buffer wire-format scanning.
//!
//! Decoding stays lazy: a [`MessageReader`] walks a message's fields without
//! materializing anything, handing out payloads that borrow the tile buffer.
//! Primitive decoding is provided by [`prost::encoding`].

use std::str;

use prost::bytes::Buf;
use prost::encoding::{self, DecodeContext, WireType};

use crate::Error;

/// Pull-based field iterator over a single message.
pub(crate) struct MessageReader<'a> {
    buf: &'a [u8],
}

impl<'a> MessageReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Read the next field, or `None` once the message is exhausted.
    ///
    /// Deprecated group fields are skipped transparently, since they cannot
    /// occur in vector tiles.
    pub fn next_field(&mut self) -> Result<Option<(u32, Field<'a>)>, Error> {
        while !self.buf.is_empty() {
            let (tag, wire_type) = encoding::decode_key(&mut self.buf)?;

            let field = match wire_type {
                WireType::Varint => Field::Varint(encoding::decode_varint(&mut self.buf)?),
                WireType::SixtyFourBit => {
                    if self.buf.len() < 8 {
                        return Err(Error::TruncatedMessage);
                    }
                    Field::Fixed64(self.buf.get_u64_le())
                },
                WireType::ThirtyTwoBit => {
                    if self.buf.len() < 4 {
                        return Err(Error::TruncatedMessage);
                    }
                    Field::Fixed32(self.buf.get_u32_le())
                },
                WireType::LengthDelimited => {
                    let len = encoding::decode_varint(&mut self.buf)? as usize;
                    if len > self.buf.len() {
                        return Err(Error::TruncatedMessage);
                    }

                    let (view, rest) = self.buf.split_at(len);
                    self.buf = rest;
                    Field::Bytes(view)
                },
                WireType::StartGroup | WireType::EndGroup => {
                    encoding::skip_field(wire_type, tag, &mut self.buf, DecodeContext::default())?;
                    continue;
                },
            };

            return Ok(Some((tag, field)));
        }

        Ok(None)
    }
}

/// A single field's decoded payload.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Field<'a> {
    Varint(u64),
    Fixed64(u64),
    Fixed32(u32),
    Bytes(&'a [u8]),
}

impl<'a> Field<'a> {
    pub fn uint64(self) -> Result<u64, Error> {
        match self {
            Field::Varint(value) => Ok(value),
            _ => Err(Error::InvalidWireType),
        }
    }

    pub fn uint32(self) -> Result<u32, Error> {
        self.uint64().map(|value| value as u32)
    }

    pub fn int64(self) -> Result<i64, Error> {
        self.uint64().map(|value| value as i64)
    }

    /// Zig-zag encoded signed integer payload.
    pub fn sint64(self) -> Result<i64, Error> {
        self.uint64().map(zigzag64)
    }

    pub fn bool(self) -> Result<bool, Error> {
        self.uint64().map(|value| value != 0)
    }

    pub fn float(self) -> Result<f32, Error> {
        match self {
            Field::Fixed32(bits) => Ok(f32::from_bits(bits)),
            _ => Err(Error::InvalidWireType),
        }
    }

    pub fn double(self) -> Result<f64, Error> {
        match self {
            Field::Fixed64(bits) => Ok(f64::from_bits(bits)),
            _ => Err(Error::InvalidWireType),
        }
    }

    /// Length-delimited payload as a raw view.
    pub fn bytes(self) -> Result<&'a [u8], Error> {
        match self {
            Field::Bytes(view) => Ok(view),
            _ => Err(Error::InvalidWireType),
        }
    }

    /// Length-delimited payload as UTF-8 text.
    pub fn string(self) -> Result<&'a str, Error> {
        Ok(str::from_utf8(self.bytes()?)?)
    }
}

/// Lazy iterator over a packed `uint32` range.
#[derive(Copy, Clone)]
pub(crate) struct PackedU32<'a> {
    buf: &'a [u8],
}

impl<'a> PackedU32<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }
}

impl Iterator for PackedU32<'_> {
    type Item = Result<u32, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buf.is_empty() {
            return None;
        }

        // Values wider than 32 bits are truncated, matching prost.
        let result = encoding::decode_varint(&mut self.buf);
        Some(result.map(|value| value as u32).map_err(Error::from))
    }
}

/// Decode a zig-zag encoded 32-bit parameter into a signed delta.
pub(crate) fn zigzag32(value: u32) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Decode a zig-zag encoded signed integer.
pub(crate) fn zigzag64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
