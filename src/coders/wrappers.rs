//! Framing wrappers: length-prefixed sub-buffers and block padding.

use crate::{
    coder::{Coder, CoderExt, DynCoder},
    error::Error,
    len::Len,
    reader::Reader,
    value::Value,
    writer::Writer,
};
use std::sync::Arc;

use super::bytes::BytesCoder;

fn join_paths(outer: &str, inner: &str) -> String {
    match (outer, inner) {
        ("/", _) => inner.to_string(),
        (_, "/") => outer.to_string(),
        _ => format!("{outer}/{inner}"),
    }
}

struct PrefixCoder {
    frame: BytesCoder,
    inner: DynCoder,
}

impl Coder for PrefixCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        // The inner coder runs against its own writer, so its deferred
        // pointers resolve within the framed bytes.
        let framed = self.inner.encode(value).map_err(|e| {
            Error::new(join_paths(&writer.path(), &e.path), e.message)
        })?;
        self.frame.encode_stream(writer, &Value::Bytes(framed))
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let framed = self.frame.decode_stream(reader)?;
        let raw = framed.as_bytes().expect("bytes coder produces bytes");
        // The sub-reader must consume the frame exactly.
        self.inner.decode(raw).map_err(|e| {
            Error::new(join_paths(&reader.path(), &e.path), e.message)
        })
    }

    fn size(&self) -> Option<usize> {
        self.frame.size()
    }
}

/// Encodes `inner` into its own buffer, then frames those bytes with
/// `len`. On decode the framed bytes are extracted first and `inner`
/// must consume all of them.
pub fn prefix(len: impl Into<Len>, inner: DynCoder) -> DynCoder {
    Arc::new(PrefixCoder {
        frame: BytesCoder::new(len.into(), false),
        inner,
    })
}

type PadFn = Box<dyn Fn(usize) -> u8 + Send + Sync>;

fn padding(block: usize, used: usize) -> usize {
    (block - used % block) % block
}

struct PadLeftCoder {
    block: usize,
    inner: DynCoder,
    inner_size: usize,
    pad: PadFn,
}

impl Coder for PadLeftCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        for i in 0..padding(self.block, self.inner_size) {
            writer.byte((self.pad)(i))?;
        }
        self.inner.encode_stream(writer, value)
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        // Padding bytes carry no information; read and discard.
        reader.bytes(padding(self.block, self.inner_size))?;
        self.inner.decode_stream(reader)
    }

    fn size(&self) -> Option<usize> {
        Some(self.inner_size + padding(self.block, self.inner_size))
    }
}

/// Pads `inner` on the left to a multiple of `block` bytes with zeros.
/// The inner coder must have a fixed size.
pub fn pad_left(block: usize, inner: DynCoder) -> DynCoder {
    pad_left_with(block, inner, |_| 0)
}

/// Like [`pad_left`], with `pad(i)` supplying the i-th padding byte.
pub fn pad_left_with(
    block: usize,
    inner: DynCoder,
    pad: impl Fn(usize) -> u8 + Send + Sync + 'static,
) -> DynCoder {
    assert!(block > 0, "padding block must be non-zero");
    let inner_size = inner
        .size()
        .expect("pad_left requires a fixed-size inner coder");
    Arc::new(PadLeftCoder {
        block,
        inner,
        inner_size,
        pad: Box::new(pad),
    })
}

struct PadRightCoder {
    block: usize,
    inner: DynCoder,
    pad: PadFn,
}

impl Coder for PadRightCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let start = writer.len();
        self.inner.encode_stream(writer, value)?;
        let used = writer.len() - start;
        for i in 0..padding(self.block, used) {
            writer.byte((self.pad)(i))?;
        }
        Ok(())
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let start = reader.pos();
        let value = self.inner.decode_stream(reader)?;
        let used = reader.pos() - start;
        reader.bytes(padding(self.block, used))?;
        Ok(value)
    }

    fn size(&self) -> Option<usize> {
        self.inner
            .size()
            .map(|size| size + padding(self.block, size))
    }
}

/// Pads `inner` on the right to a multiple of `block` bytes with zeros.
/// Works with variable-size inner coders.
pub fn pad_right(block: usize, inner: DynCoder) -> DynCoder {
    pad_right_with(block, inner, |_| 0)
}

/// Like [`pad_right`], with `pad(i)` supplying the i-th padding byte.
pub fn pad_right_with(
    block: usize,
    inner: DynCoder,
    pad: impl Fn(usize) -> u8 + Send + Sync + 'static,
) -> DynCoder {
    assert!(block > 0, "padding block must be non-zero");
    Arc::new(PadRightCoder {
        block,
        inner,
        pad: Box::new(pad),
    })
}
