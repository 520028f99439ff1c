//! Forward pointers with at-most-once read enforcement.

use crate::{
    coder::{Coder, CoderExt, DynCoder},
    error::Error,
    len::value_to_len,
    reader::Reader,
    value::Value,
    writer::Writer,
};
use std::sync::Arc;

struct PointerCoder {
    placeholder: DynCoder,
    inner: DynCoder,
}

impl Coder for PointerCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        // The pointee is finalized standalone, so pointers nested inside
        // it resolve relative to the pointee's own buffer.
        let pointee = self.inner.encode(value)?;
        writer.defer_pointer(self.placeholder.clone(), pointee)
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let value = self.placeholder.decode_stream(reader)?;
        let offset = value_to_len(&value).map_err(|m| reader.err(m))?;
        reader.enable_ptr();
        let mut child = reader.offset_reader(offset)?;
        self.inner.decode_stream(&mut child)
    }
}

/// Indirection: the body carries only a fixed-width offset (written via
/// `placeholder`); the pointee is appended after the body at
/// finalization and patched in. On decode the offset is followed through
/// a child reader without advancing the parent cursor; the shared read
/// bitset guarantees no byte is consumed twice, so pointer cycles and
/// fan-ins fail fast instead of looping.
pub fn pointer(placeholder: DynCoder, inner: DynCoder) -> DynCoder {
    assert!(
        placeholder.size().is_some(),
        "pointer placeholder must have a fixed size"
    );
    Arc::new(PointerCoder { placeholder, inner })
}
