//! Trace-level visibility into a coder graph.

use crate::{
    coder::{Coder, DynCoder},
    error::Error,
    reader::Reader,
    value::Value,
    writer::Writer,
};
use std::sync::Arc;
use tracing::trace;

struct DebugCoder {
    inner: DynCoder,
}

impl Coder for DebugCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        trace!(path = %writer.path(), ?value, "encode");
        let result = self.inner.encode_stream(writer, value);
        if let Err(err) = &result {
            trace!(path = %writer.path(), %err, "encode failed");
        }
        result
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let result = self.inner.decode_stream(reader);
        match &result {
            Ok(value) => trace!(path = %reader.path(), ?value, "decode"),
            Err(err) => trace!(path = %reader.path(), %err, "decode failed"),
        }
        result
    }

    fn size(&self) -> Option<usize> {
        self.inner.size()
    }
}

/// Pass-through combinator emitting TRACE events with the field path and
/// value on each encode/decode. Wire format is unchanged.
pub fn debug(inner: DynCoder) -> DynCoder {
    Arc::new(DebugCoder { inner })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coder::CoderExt;
    use crate::coders::primitives::u16_be;

    #[test]
    fn test_transparent() {
        let plain = u16_be();
        let traced = debug(u16_be());
        assert_eq!(traced.size(), plain.size());
        let v = Value::from(0x0102);
        assert_eq!(traced.encode(&v).unwrap(), plain.encode(&v).unwrap());
        assert_eq!(traced.decode(&[0x01, 0x02]).unwrap(), v);
    }
}
