//! Streaming encode buffer.
//!
//! # Overview
//!
//! [`Writer`] collects encoded output: an append-only byte buffer, a bit
//! sub-buffer flushed whenever eight bits accumulate, the same two stacks
//! as [`crate::Reader`], and the deferred-pointer list. Pointer coders
//! reserve placeholder bytes during the body pass; [`Writer::finish`]
//! appends every pointee after the body in registration order and patches
//! each placeholder with the absolute offset its pointee landed at.

use crate::{
    coder::{Coder, CoderExt, DynCoder},
    error::Error,
    len::{resolve_path, value_to_len, Len},
    value::Value,
};
use bytes::{BufMut, Bytes, BytesMut};
use std::mem;

/// A registered pointer placeholder awaiting resolution.
struct Deferred {
    /// Offset of the placeholder bytes within the body.
    pos: usize,
    /// Width of the placeholder (the coder's fixed size).
    size: usize,
    /// Coder used to patch the placeholder with the pointee's offset.
    coder: DynCoder,
    /// Finalized pointee bytes, appended after the body.
    pointee: Bytes,
}

/// Streaming encoder.
#[derive(Default)]
pub struct Writer {
    buf: BytesMut,
    /// Low `bit_pos` bits hold pending bits not yet flushed to a byte.
    bit_buf: u8,
    bit_pos: u32,
    values: Vec<Value>,
    fields: Vec<String>,
    ptrs: Vec<Deferred>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written to the body so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View of the body written so far. Terminator coders inspect this to
    /// detect sentinel collisions.
    pub fn written(&self) -> &[u8] {
        &self.buf
    }

    /// Slash-separated path of the field currently being encoded.
    pub fn path(&self) -> String {
        if self.fields.is_empty() {
            "/".to_string()
        } else {
            self.fields.join("/")
        }
    }

    /// Creates an error at the current path.
    pub fn err(&self, message: impl Into<String>) -> Error {
        Error::new(self.path(), message)
    }

    // ---------- Path stacks ----------

    /// Pushes the value currently being encoded. Combinators call this on
    /// entry and [`Writer::pop_value`] on exit so path-referenced lengths
    /// can see enclosing values.
    pub fn push_value(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn pop_value(&mut self) -> Option<Value> {
        self.values.pop()
    }

    /// The stack of enclosing values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Pushes a field-name segment onto the error path.
    pub fn push_field(&mut self, name: &str) {
        self.fields.push(name.to_string());
    }

    pub fn pop_field(&mut self) {
        self.fields.pop();
    }

    // ---------- Byte output ----------

    fn check_aligned(&self) -> Result<(), Error> {
        if self.bit_pos != 0 {
            return Err(self.err(format!(
                "byte-level write with {} bits pending in the bit buffer",
                self.bit_pos
            )));
        }
        Ok(())
    }

    /// Appends one byte.
    pub fn byte(&mut self, byte: u8) -> Result<(), Error> {
        self.check_aligned()?;
        self.buf.put_u8(byte);
        Ok(())
    }

    /// Appends a byte slice.
    pub fn bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.check_aligned()?;
        self.buf.put_slice(bytes);
        Ok(())
    }

    // ---------- Bit output ----------

    /// Appends the low `count` bits of `value` (1..=32), high bit first;
    /// whole bytes are flushed as they fill.
    pub fn bits(&mut self, value: u32, count: u32) -> Result<(), Error> {
        if count == 0 || count > 32 {
            return Err(self.err(format!(
                "bit writes are limited to 1..=32 bits, got {count}"
            )));
        }
        if count < 32 && u64::from(value) >= 1u64 << count {
            return Err(self.err(format!("value {value} does not fit in {count} bits")));
        }
        let mut acc = (u64::from(self.bit_buf) << count) | u64::from(value);
        let mut pending = self.bit_pos + count;
        while pending >= 8 {
            pending -= 8;
            self.buf.put_u8((acc >> pending) as u8);
        }
        acc &= (1u64 << pending) - 1;
        self.bit_buf = acc as u8;
        self.bit_pos = pending;
        Ok(())
    }

    // ---------- Length specifiers ----------

    /// Encodes a length: a [`Len::Prefixed`] coder writes it in-line;
    /// fixed and path specifiers are checked for equality against
    /// `actual`; unbounded and terminated specifiers write nothing here.
    pub fn length(&mut self, len: &Len, actual: usize) -> Result<(), Error> {
        match len {
            Len::Prefixed(coder) => coder.encode_stream(self, &Value::from(actual)),
            Len::Fixed(expected) => {
                if *expected != actual {
                    return Err(self.err(format!(
                        "length mismatch: specifier says {expected}, actual is {actual}"
                    )));
                }
                Ok(())
            }
            Len::Path(expr) => {
                let value = resolve_path(&self.values, expr)
                    .map_err(|m| self.err(m))?
                    .ok_or_else(|| self.err(format!("path {expr:?} resolves to no value")))?;
                let expected = value_to_len(value).map_err(|m| self.err(m))?;
                if expected != actual {
                    return Err(self.err(format!(
                        "length mismatch: path {expr:?} says {expected}, actual is {actual}"
                    )));
                }
                Ok(())
            }
            Len::Unbounded | Len::Terminated(_) => Ok(()),
        }
    }

    // ---------- Pointer support ----------

    /// Reserves placeholder bytes for a pointer and queues its finalized
    /// pointee for the append-and-patch pass in [`Writer::finish`].
    pub fn defer_pointer(&mut self, placeholder: DynCoder, pointee: Bytes) -> Result<(), Error> {
        self.check_aligned()?;
        let Some(size) = placeholder.size() else {
            return Err(self.err("pointer placeholder must have a fixed size"));
        };
        let pos = self.buf.len();
        self.buf.put_bytes(0, size);
        self.ptrs.push(Deferred {
            pos,
            size,
            coder: placeholder,
            pointee,
        });
        Ok(())
    }

    // ---------- Completion ----------

    /// Finalizes the output: appends deferred pointees in registration
    /// order and patches each placeholder with the absolute offset where
    /// its pointee begins.
    pub fn finish(mut self) -> Result<Bytes, Error> {
        if self.bit_pos != 0 {
            return Err(self.err(format!(
                "{} bits left unflushed in the bit buffer",
                self.bit_pos
            )));
        }
        let ptrs = mem::take(&mut self.ptrs);
        let mut out = mem::take(&mut self.buf);
        for entry in ptrs {
            let at = out.len();
            out.extend_from_slice(&entry.pointee);
            let patch = entry.coder.encode(&Value::from(at)).map_err(|e| {
                Error::new(
                    e.path,
                    format!("pointer offset {at} does not fit its placeholder: {}", e.message),
                )
            })?;
            if patch.len() != entry.size {
                return Err(Error::new(
                    "/",
                    format!(
                        "pointer placeholder wrote {} bytes, reserved {}",
                        patch.len(),
                        entry.size
                    ),
                ));
            }
            out[entry.pos..entry.pos + entry.size].copy_from_slice(&patch);
        }
        Ok(out.freeze())
    }
}
