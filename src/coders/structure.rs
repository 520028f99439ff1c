//! Record, tuple, and array combinators.
//!
//! These are the combinators that maintain the path stack: each pushes
//! its in-progress value on entry and pops on exit, so nested coders can
//! resolve path-referenced lengths and flags against enclosing values,
//! and error messages carry the full field path.

use crate::{
    coder::{Coder, DynCoder},
    error::Error,
    len::Len,
    reader::Reader,
    value::Value,
    writer::Writer,
};
use std::sync::Arc;

static NULL: Value = Value::Null;

struct RecordCoder {
    fields: Vec<(String, DynCoder)>,
}

impl Coder for RecordCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let pairs = value.as_object().ok_or_else(|| {
            writer.err(format!("expected an object, got {}", value.type_name()))
        })?;
        writer.push_value(value.clone());
        for (name, coder) in &self.fields {
            let field = pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v)
                .unwrap_or(&NULL);
            writer.push_field(name);
            coder.encode_stream(writer, field)?;
            writer.pop_field();
        }
        writer.pop_value();
        Ok(())
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        reader.push_value(Value::Object(Vec::with_capacity(self.fields.len())));
        for (name, coder) in &self.fields {
            reader.push_field(name);
            let value = coder.decode_stream(reader)?;
            reader.pop_field();
            match reader.top_mut() {
                Some(Value::Object(pairs)) => pairs.push((name.clone(), value)),
                _ => return Err(reader.err("record scratch value missing")),
            }
        }
        Ok(reader.pop_value().expect("record pushed a scratch value"))
    }

    fn size(&self) -> Option<usize> {
        self.fields
            .iter()
            .map(|(_, coder)| coder.size())
            .sum::<Option<usize>>()
    }
}

/// Record of named fields, encoded in declaration order (the order is
/// part of the wire format). Values are [`Value::Object`]s; a missing
/// field encodes as [`Value::Null`], which only the conditional coders
/// accept.
pub fn record<S: Into<String>>(fields: impl IntoIterator<Item = (S, DynCoder)>) -> DynCoder {
    Arc::new(RecordCoder {
        fields: fields
            .into_iter()
            .map(|(name, coder)| (name.into(), coder))
            .collect(),
    })
}

/// Builds a record coder from `name: coder` pairs.
///
/// ```
/// use binweave::{record, CoderExt, Value};
/// use binweave::coders::{u8, u16_le};
///
/// let header = record! {
///     version: u8(),
///     flags: u16_le(),
/// };
/// let encoded = header
///     .encode(&Value::object([
///         ("version", Value::from(2)),
///         ("flags", Value::from(0x0102)),
///     ]))
///     .unwrap();
/// assert_eq!(&encoded[..], &[0x02, 0x02, 0x01]);
/// ```
#[macro_export]
macro_rules! record {
    ($($name:ident : $coder:expr),* $(,)?) => {
        $crate::coders::record(vec![
            $( (stringify!($name), $coder) ),*
        ])
    };
}

struct TupleCoder {
    fields: Vec<DynCoder>,
}

impl Coder for TupleCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let items = value.as_array().ok_or_else(|| {
            writer.err(format!("expected an array, got {}", value.type_name()))
        })?;
        if items.len() != self.fields.len() {
            return Err(writer.err(format!(
                "tuple arity mismatch: coder has {} fields, value has {}",
                self.fields.len(),
                items.len()
            )));
        }
        writer.push_value(value.clone());
        for (index, (coder, item)) in self.fields.iter().zip(items).enumerate() {
            writer.push_field(&index.to_string());
            coder.encode_stream(writer, item)?;
            writer.pop_field();
        }
        writer.pop_value();
        Ok(())
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        reader.push_value(Value::Array(Vec::with_capacity(self.fields.len())));
        for (index, coder) in self.fields.iter().enumerate() {
            reader.push_field(&index.to_string());
            let value = coder.decode_stream(reader)?;
            reader.pop_field();
            match reader.top_mut() {
                Some(Value::Array(items)) => items.push(value),
                _ => return Err(reader.err("tuple scratch value missing")),
            }
        }
        Ok(reader.pop_value().expect("tuple pushed a scratch value"))
    }

    fn size(&self) -> Option<usize> {
        self.fields.iter().map(|coder| coder.size()).sum()
    }
}

/// Positional fields encoded in order; values are [`Value::Array`]s.
pub fn tuple(fields: impl IntoIterator<Item = DynCoder>) -> DynCoder {
    Arc::new(TupleCoder {
        fields: fields.into_iter().collect(),
    })
}

struct ArrayCoder {
    len: Len,
    inner: DynCoder,
}

impl ArrayCoder {
    fn push_element(reader: &mut Reader<'_>, value: Value) -> Result<(), Error> {
        match reader.top_mut() {
            Some(Value::Array(items)) => {
                items.push(value);
                Ok(())
            }
            _ => Err(reader.err("array scratch value missing")),
        }
    }
}

impl Coder for ArrayCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let items = value.as_array().ok_or_else(|| {
            writer.err(format!("expected an array, got {}", value.type_name()))
        })?;
        match &self.len {
            Len::Terminated(pattern) => {
                writer.push_value(value.clone());
                for (index, item) in items.iter().enumerate() {
                    writer.push_field(&index.to_string());
                    let start = writer.len();
                    self.inner.encode_stream(writer, item)?;
                    let written = &writer.written()[start..];
                    if written.len() >= pattern.len() && written[..pattern.len()] == pattern[..] {
                        return Err(writer.err("encoded element collides with the terminator"));
                    }
                    writer.pop_field();
                }
                writer.pop_value();
                writer.bytes(pattern)?;
            }
            other => {
                // The length resolves against the enclosing value, so it
                // must be written before this array is pushed (decode
                // resolves in the same order).
                writer.length(other, items.len())?;
                writer.push_value(value.clone());
                for (index, item) in items.iter().enumerate() {
                    writer.push_field(&index.to_string());
                    self.inner.encode_stream(writer, item)?;
                    writer.pop_field();
                }
                writer.pop_value();
            }
        }
        Ok(())
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        match &self.len {
            Len::Terminated(pattern) => {
                reader.push_value(Value::Array(Vec::new()));
                let mut index = 0usize;
                loop {
                    if reader.remaining() < pattern.len() {
                        return Err(reader.err("terminator not found before end of input"));
                    }
                    if reader.peek_bytes(pattern.len())? == &pattern[..] {
                        reader.bytes(pattern.len())?;
                        break;
                    }
                    reader.push_field(&index.to_string());
                    let value = self.inner.decode_stream(reader)?;
                    reader.pop_field();
                    Self::push_element(reader, value)?;
                    index += 1;
                }
            }
            other => match reader.length(other)? {
                Some(count) => {
                    // A hostile length prefix should not pre-allocate more
                    // than the input could possibly hold.
                    let cap = count.min(reader.remaining());
                    reader.push_value(Value::Array(Vec::with_capacity(cap)));
                    for index in 0..count {
                        reader.push_field(&index.to_string());
                        let value = self.inner.decode_stream(reader)?;
                        reader.pop_field();
                        Self::push_element(reader, value)?;
                    }
                }
                None => {
                    reader.push_value(Value::Array(Vec::new()));
                    let mut index = 0usize;
                    loop {
                        let remaining = reader.remaining();
                        if remaining == 0 {
                            break;
                        }
                        if let Some(size) = self.inner.size() {
                            if remaining < size {
                                break;
                            }
                        }
                        reader.push_field(&index.to_string());
                        let value = self.inner.decode_stream(reader)?;
                        reader.pop_field();
                        Self::push_element(reader, value)?;
                        index += 1;
                    }
                }
            },
        }
        Ok(reader.pop_value().expect("array pushed a scratch value"))
    }

    fn size(&self) -> Option<usize> {
        match self.len {
            Len::Fixed(count) => self.inner.size().map(|size| size * count),
            _ => None,
        }
    }
}

/// Sequence of elements framed by `len`. With a terminator specifier the
/// sentinel is appended after the elements and, on decode, checked for
/// before each element; an element whose encoding begins with the
/// sentinel is rejected at encode time.
pub fn array(len: impl Into<Len>, inner: DynCoder) -> DynCoder {
    Arc::new(ArrayCoder {
        len: len.into(),
        inner,
    })
}
