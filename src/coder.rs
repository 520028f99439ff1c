//! The coder contract.
//!
//! # Overview
//!
//! A [`Coder`] pairs a streaming encoder and decoder over [`Value`]s.
//! Primitives implement it directly; combinators hold child coders and
//! delegate, so an arbitrarily deep format description collapses into a
//! single `Arc<dyn Coder>` ([`DynCoder`]) that callers drive through the
//! buffer-level methods of [`CoderExt`].
//!
//! Coders are immutable once built and may be shared freely across
//! threads. The mutable state of a call lives entirely in its
//! [`Writer`] or [`Reader`], which are single-use.

use crate::{
    error::Error,
    reader::{Reader, ReaderOpts},
    value::Value,
    writer::Writer,
};
use bytes::Bytes;
use std::sync::Arc;

/// A paired streaming encoder/decoder over a [`Value`].
pub trait Coder: Send + Sync {
    /// Encodes `value` into the writer.
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error>;

    /// Decodes a value from the reader.
    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error>;

    /// Exact encoded width in bytes, when it is the same for every value.
    ///
    /// Sizes compose: additive over sequential fields, multiplicative
    /// over fixed-length arrays. Combinators that cannot guarantee a
    /// constant width return `None`.
    fn size(&self) -> Option<usize> {
        None
    }
}

/// A shared, composable coder.
pub type DynCoder = Arc<dyn Coder>;

/// Buffer-level entry points lifting the streaming contract: encode to a
/// finalized byte buffer, decode from one with end-of-input enforcement.
pub trait CoderExt: Coder {
    /// Encodes `value` to bytes, resolving any deferred pointers.
    fn encode(&self, value: &Value) -> Result<Bytes, Error> {
        let mut writer = Writer::new();
        self.encode_stream(&mut writer, value)?;
        let out = writer.finish()?;
        if let Some(size) = self.size() {
            assert_eq!(
                out.len(),
                size,
                "coder with fixed size {size} wrote {} bytes",
                out.len()
            );
        }
        Ok(out)
    }

    /// Decodes a value from `data`, requiring the input to be fully
    /// consumed.
    fn decode(&self, data: &[u8]) -> Result<Value, Error> {
        self.decode_opts(data, ReaderOpts::default())
    }

    /// Decodes a value from `data` with explicit [`ReaderOpts`].
    fn decode_opts(&self, data: &[u8], opts: ReaderOpts) -> Result<Value, Error> {
        let mut reader = Reader::new(data, opts);
        let value = self.decode_stream(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}

impl<C: Coder + ?Sized> CoderExt for C {}

/// Encodes `value` with `coder`. Convenience for [`CoderExt::encode`].
pub fn encode(coder: &dyn Coder, value: &Value) -> Result<Bytes, Error> {
    coder.encode(value)
}

/// Decodes `data` with `coder`. Convenience for [`CoderExt::decode`].
pub fn decode(coder: &dyn Coder, data: &[u8]) -> Result<Value, Error> {
    coder.decode(data)
}

/// Decodes `data` with `coder` and explicit options.
pub fn decode_opts(coder: &dyn Coder, data: &[u8], opts: ReaderOpts) -> Result<Value, Error> {
    coder.decode_opts(data, opts)
}
