//! Composition with value-level bijections, and validation.

use crate::{
    coder::{Coder, DynCoder},
    error::Error,
    reader::Reader,
    value::Value,
    writer::Writer,
};
use std::sync::Arc;

/// A value↔value bijection composable with a byte coder via [`apply`].
///
/// Directions follow the byte coders: [`ValueCoder::encode`] maps the
/// wire-side value to the user-side value (the decode direction of the
/// composed coder); [`ValueCoder::decode`] maps the user-side value back
/// to the wire side. Errors are plain messages; the engine attaches the
/// field path.
pub trait ValueCoder: Send + Sync {
    /// Wire-side value to user-side value.
    fn encode(&self, value: Value) -> Result<Value, String>;

    /// User-side value to wire-side value.
    fn decode(&self, value: Value) -> Result<Value, String>;
}

/// A shared value-level coder.
pub type DynValueCoder = Arc<dyn ValueCoder>;

struct ApplyCoder {
    inner: DynCoder,
    base: DynValueCoder,
}

impl Coder for ApplyCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let wire = self
            .base
            .decode(value.clone())
            .map_err(|m| writer.err(m))?;
        self.inner.encode_stream(writer, &wire)
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let wire = self.inner.decode_stream(reader)?;
        self.base.encode(wire).map_err(|m| reader.err(m))
    }

    fn size(&self) -> Option<usize> {
        self.inner.size()
    }
}

/// Composes a byte coder with a value-level bijection, producing a coder
/// over the bijection's user-side type (e.g. an integer coder composed
/// with [`crate::support::decimal`] yields a decimal-string coder).
pub fn apply(inner: DynCoder, base: DynValueCoder) -> DynCoder {
    Arc::new(ApplyCoder { inner, base })
}

struct ValidateCoder<F> {
    inner: DynCoder,
    check: F,
}

impl<F> Coder for ValidateCoder<F>
where
    F: Fn(&Value) -> Result<(), String> + Send + Sync,
{
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        (self.check)(value).map_err(|m| writer.err(m))?;
        self.inner.encode_stream(writer, value)
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let value = self.inner.decode_stream(reader)?;
        (self.check)(&value).map_err(|m| reader.err(m))?;
        Ok(value)
    }

    fn size(&self) -> Option<usize> {
        self.inner.size()
    }
}

/// Runs `check` against the value on both encode and decode, enforcing
/// value-domain constraints the wire format alone cannot express.
pub fn validate<F>(inner: DynCoder, check: F) -> DynCoder
where
    F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
{
    Arc::new(ValidateCoder { inner, check })
}
