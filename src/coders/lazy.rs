//! Deferred coder construction for recursive formats.

use crate::{
    coder::{Coder, DynCoder},
    error::Error,
    reader::Reader,
    value::Value,
    writer::Writer,
};
use std::sync::Arc;

struct LazyCoder<F> {
    thunk: F,
}

impl<F: Fn() -> DynCoder + Send + Sync> Coder for LazyCoder<F> {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        (self.thunk)().encode_stream(writer, value)
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        (self.thunk)().decode_stream(reader)
    }
}

/// Defers coder construction until each use, breaking the cycle in
/// self-referential and mutually recursive formats. The thunk runs on
/// every encode/decode, so a coder never has to contain itself by value.
///
/// ```
/// use binweave::{record, CoderExt, DynCoder, Value};
/// use binweave::coders::{bool, lazy, optional, u8};
///
/// // A cons list: `1 -> 2 -> nil`.
/// fn list() -> DynCoder {
///     record! {
///         head: u8(),
///         tail: optional(bool(), lazy(list)),
///     }
/// }
///
/// let v = Value::object([
///     ("head", Value::from(1)),
///     ("tail", Value::object([
///         ("head", Value::from(2)),
///         ("tail", Value::Null),
///     ])),
/// ]);
/// let encoded = list().encode(&v).unwrap();
/// assert_eq!(&encoded[..], &[0x01, 0x01, 0x02, 0x00]);
/// assert_eq!(list().decode(&encoded).unwrap(), v);
/// ```
pub fn lazy<F>(thunk: F) -> DynCoder
where
    F: Fn() -> DynCoder + Send + Sync + 'static,
{
    Arc::new(LazyCoder { thunk })
}
