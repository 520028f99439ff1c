//! Byte-string, text, and hex coders.
//!
//! All three dispatch on a [`Len`] specifier: a fixed, prefixed, or
//! path-referenced length consumes exactly that many bytes; a terminator
//! reads until the sentinel pattern (and consumes it); unbounded reads to
//! the end of the enclosing buffer.

use crate::{
    coder::{Coder, DynCoder},
    error::Error,
    len::Len,
    reader::Reader,
    util::{from_hex, to_hex},
    value::Value,
    writer::Writer,
};
use bytes::Bytes;
use std::sync::Arc;

pub(crate) struct BytesCoder {
    len: Len,
    reverse: bool,
}

impl BytesCoder {
    pub(crate) fn new(len: Len, reverse: bool) -> Self {
        BytesCoder { len, reverse }
    }
}

impl Coder for BytesCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let data = value.as_bytes().ok_or_else(|| {
            writer.err(format!("expected bytes, got {}", value.type_name()))
        })?;
        let reversed;
        let wire: &[u8] = if self.reverse {
            reversed = data.iter().rev().copied().collect::<Vec<u8>>();
            &reversed
        } else {
            data
        };
        match &self.len {
            Len::Terminated(pattern) => {
                if wire.windows(pattern.len()).any(|window| window == &pattern[..]) {
                    return Err(writer.err(format!(
                        "encoded bytes contain the terminator 0x{}",
                        to_hex(pattern)
                    )));
                }
                writer.bytes(wire)?;
                writer.bytes(pattern)
            }
            other => {
                writer.length(other, wire.len())?;
                writer.bytes(wire)
            }
        }
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let raw = match &self.len {
            Len::Terminated(pattern) => {
                let found = reader
                    .find(pattern)?
                    .ok_or_else(|| reader.err(format!(
                        "terminator 0x{} not found before end of input",
                        to_hex(pattern)
                    )))?;
                let count = found - reader.pos();
                let data = reader.bytes(count)?;
                reader.bytes(pattern.len())?;
                data
            }
            other => match reader.length(other)? {
                Some(count) => reader.bytes(count)?,
                None => reader.bytes(reader.remaining())?,
            },
        };
        let out = if self.reverse {
            Bytes::from(raw.iter().rev().copied().collect::<Vec<u8>>())
        } else {
            Bytes::copy_from_slice(raw)
        };
        Ok(Value::Bytes(out))
    }

    fn size(&self) -> Option<usize> {
        match self.len {
            Len::Fixed(n) => Some(n),
            _ => None,
        }
    }
}

/// Byte string framed by `len`.
pub fn bytes(len: impl Into<Len>) -> DynCoder {
    Arc::new(BytesCoder::new(len.into(), false))
}

/// Byte string framed by `len`, stored byte-reversed on the wire (for
/// formats that frame hashes and the like little-endian).
pub fn bytes_reversed(len: impl Into<Len>) -> DynCoder {
    Arc::new(BytesCoder::new(len.into(), true))
}

struct StringCoder {
    inner: BytesCoder,
}

impl Coder for StringCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let s = value.as_str().ok_or_else(|| {
            writer.err(format!("expected a string, got {}", value.type_name()))
        })?;
        self.inner
            .encode_stream(writer, &Value::Bytes(Bytes::copy_from_slice(s.as_bytes())))
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let value = self.inner.decode_stream(reader)?;
        let raw = value.as_bytes().expect("bytes coder produces bytes");
        let s = std::str::from_utf8(raw).map_err(|e| reader.err(format!("invalid UTF-8: {e}")))?;
        Ok(Value::String(s.to_string()))
    }

    fn size(&self) -> Option<usize> {
        self.inner.size()
    }
}

/// UTF-8 string framed by `len`. Decode rejects invalid UTF-8.
pub fn string(len: impl Into<Len>) -> DynCoder {
    Arc::new(StringCoder {
        inner: BytesCoder::new(len.into(), false),
    })
}

/// NUL-terminated UTF-8 string.
pub fn cstring() -> DynCoder {
    string(Len::terminated([0u8]))
}

struct HexCoder {
    inner: BytesCoder,
    prefixed: bool,
}

impl Coder for HexCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let s = value.as_str().ok_or_else(|| {
            writer.err(format!("expected a hex string, got {}", value.type_name()))
        })?;
        let raw = from_hex(s).map_err(|m| writer.err(m))?;
        self.inner.encode_stream(writer, &Value::Bytes(Bytes::from(raw)))
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let value = self.inner.decode_stream(reader)?;
        let raw = value.as_bytes().expect("bytes coder produces bytes");
        let hex = to_hex(raw);
        Ok(Value::String(if self.prefixed {
            format!("0x{hex}")
        } else {
            hex
        }))
    }

    fn size(&self) -> Option<usize> {
        self.inner.size()
    }
}

/// Lowercase hex string over bytes framed by `len`.
pub fn hex(len: impl Into<Len>) -> DynCoder {
    Arc::new(HexCoder {
        inner: BytesCoder::new(len.into(), false),
        prefixed: false,
    })
}

/// Like [`hex`], with a `0x` prefix on decode (accepted either way on
/// encode).
pub fn hex_prefixed(len: impl Into<Len>) -> DynCoder {
    Arc::new(HexCoder {
        inner: BytesCoder::new(len.into(), false),
        prefixed: true,
    })
}
