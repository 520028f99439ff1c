//! Conditional and constant coders.
//!
//! `flag` turns the presence of a byte pattern into a boolean; `flagged`
//! and `optional` gate an inner coder on a boolean that lives either in
//! an already-seen field (a path) or in-line on the wire. `magic` and
//! `constant` pin fixed values. None of these use errors for control
//! flow: presence probes are explicit peeks.

use crate::{
    coder::{Coder, DynCoder},
    error::Error,
    len::{resolve_path, Len},
    reader::Reader,
    value::Value,
    writer::Writer,
};
use bytes::Bytes;
use std::sync::Arc;

use super::bytes::bytes;

// ---------- flag ----------

struct FlagCoder {
    pattern: Bytes,
    xor: bool,
}

impl FlagCoder {
    fn bool_of(value: &Value) -> Result<bool, String> {
        match value {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(*b),
            other => Err(format!("expected a bool, got {}", other.type_name())),
        }
    }
}

impl Coder for FlagCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let b = Self::bool_of(value).map_err(|m| writer.err(m))?;
        if b != self.xor {
            writer.bytes(&self.pattern)?;
        }
        Ok(())
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let matched = reader.remaining() >= self.pattern.len()
            && reader.peek_bytes(self.pattern.len())? == &self.pattern[..];
        if matched {
            reader.bytes(self.pattern.len())?;
        }
        Ok(Value::Bool(matched != self.xor))
    }
}

/// Zero-or-pattern-width boolean: `true` emits the pattern, `false`
/// emits nothing; decode peeks for the pattern.
pub fn flag(pattern: impl AsRef<[u8]>) -> DynCoder {
    Arc::new(FlagCoder {
        pattern: Bytes::copy_from_slice(pattern.as_ref()),
        xor: false,
    })
}

/// Like [`flag`] with the meaning flipped: `false` emits the pattern.
pub fn flag_inverted(pattern: impl AsRef<[u8]>) -> DynCoder {
    Arc::new(FlagCoder {
        pattern: Bytes::copy_from_slice(pattern.as_ref()),
        xor: true,
    })
}

// ---------- flagged / optional ----------

/// Where the boolean gating a [`flagged`] coder comes from.
#[derive(Clone)]
pub enum Selector {
    /// A boolean field resolved against the path stack; a missing field
    /// reads as `false`.
    Path(String),
    /// A boolean coder written/read in-line before the payload.
    Coder(DynCoder),
}

impl From<&str> for Selector {
    fn from(expr: &str) -> Self {
        Selector::Path(expr.to_string())
    }
}

impl From<DynCoder> for Selector {
    fn from(coder: DynCoder) -> Self {
        Selector::Coder(coder)
    }
}

fn resolve_flag(values: &[Value], expr: &str) -> Result<bool, String> {
    match resolve_path(values, expr)? {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(format!(
            "path {expr:?} resolves to {}, expected a bool",
            other.type_name()
        )),
    }
}

struct FlaggedCoder {
    selector: Selector,
    inner: DynCoder,
    default: Option<Value>,
}

impl Coder for FlaggedCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let on = match &self.selector {
            Selector::Path(expr) => {
                resolve_flag(writer.values(), expr).map_err(|m| writer.err(m))?
            }
            Selector::Coder(coder) => {
                let present = !value.is_null();
                coder.encode_stream(writer, &Value::Bool(present))?;
                present
            }
        };
        if on {
            self.inner.encode_stream(writer, value)
        } else if let Some(default) = &self.default {
            // The default is re-encoded when the flag is off; decode
            // reads and discards it symmetrically.
            self.inner.encode_stream(writer, default)
        } else {
            Ok(())
        }
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let on = match &self.selector {
            Selector::Path(expr) => {
                resolve_flag(reader.values(), expr).map_err(|m| reader.err(m))?
            }
            Selector::Coder(coder) => {
                let value = coder.decode_stream(reader)?;
                value
                    .as_bool()
                    .ok_or_else(|| reader.err("flag coder must produce a bool"))?
            }
        };
        if on {
            self.inner.decode_stream(reader)
        } else {
            if self.default.is_some() {
                self.inner.decode_stream(reader)?;
            }
            Ok(Value::Null)
        }
    }

    fn size(&self) -> Option<usize> {
        // Only fixed when both branches write the same number of bytes,
        // which requires a default.
        self.default.as_ref()?;
        let payload = self.inner.size()?;
        match &self.selector {
            Selector::Path(_) => Some(payload),
            Selector::Coder(coder) => Some(coder.size()? + payload),
        }
    }
}

/// Gates `inner` on a boolean selector: a path to an already-seen field,
/// or a boolean coder written in-line (the in-line boolean is the
/// value's presence). When the flag is off nothing is written and decode
/// yields [`Value::Null`].
pub fn flagged(selector: impl Into<Selector>, inner: DynCoder) -> DynCoder {
    Arc::new(FlaggedCoder {
        selector: selector.into(),
        inner,
        default: None,
    })
}

/// Like [`flagged`], but when the flag is off `default` is encoded in
/// the payload's place (and read back and discarded on decode).
pub fn flagged_default(
    selector: impl Into<Selector>,
    inner: DynCoder,
    default: impl Into<Value>,
) -> DynCoder {
    Arc::new(FlaggedCoder {
        selector: selector.into(),
        inner,
        default: Some(default.into()),
    })
}

/// Optional payload with an in-line boolean discriminator: encodes the
/// flag via `flag_coder`, then the payload only when present.
pub fn optional(flag_coder: DynCoder, inner: DynCoder) -> DynCoder {
    flagged(Selector::Coder(flag_coder), inner)
}

/// Like [`optional`], with a default written when absent.
pub fn optional_default(
    flag_coder: DynCoder,
    inner: DynCoder,
    default: impl Into<Value>,
) -> DynCoder {
    flagged_default(Selector::Coder(flag_coder), inner, default)
}

// ---------- magic / constant / nothing ----------

struct MagicCoder {
    inner: DynCoder,
    constant: Value,
    check: bool,
}

impl Coder for MagicCoder {
    fn encode_stream(&self, writer: &mut Writer, _value: &Value) -> Result<(), Error> {
        self.inner.encode_stream(writer, &self.constant)
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let value = self.inner.decode_stream(reader)?;
        if self.check && value != self.constant {
            return Err(reader.err(format!(
                "magic mismatch: expected {:?}, got {:?}",
                self.constant, value
            )));
        }
        Ok(Value::Null)
    }

    fn size(&self) -> Option<usize> {
        self.inner.size()
    }
}

/// Always writes `constant` via `inner` (the input value is ignored);
/// decode reads a value, verifies it equals the constant, and yields
/// [`Value::Null`].
pub fn magic(inner: DynCoder, constant: impl Into<Value>) -> DynCoder {
    Arc::new(MagicCoder {
        inner,
        constant: constant.into(),
        check: true,
    })
}

/// [`magic`] without the decode-side equality check.
pub fn magic_unchecked(inner: DynCoder, constant: impl Into<Value>) -> DynCoder {
    Arc::new(MagicCoder {
        inner,
        constant: constant.into(),
        check: false,
    })
}

/// Fixed byte pattern: written verbatim, checked on decode.
pub fn magic_bytes(pattern: impl AsRef<[u8]>) -> DynCoder {
    let pattern = Bytes::copy_from_slice(pattern.as_ref());
    magic(bytes(Len::Fixed(pattern.len())), pattern)
}

struct ConstantCoder {
    value: Value,
}

impl Coder for ConstantCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        if *value != self.value {
            return Err(writer.err(format!(
                "expected the constant {:?}, got {:?}",
                self.value, value
            )));
        }
        Ok(())
    }

    fn decode_stream(&self, _reader: &mut Reader<'_>) -> Result<Value, Error> {
        Ok(self.value.clone())
    }

    fn size(&self) -> Option<usize> {
        Some(0)
    }
}

/// Zero-width coder pinning a value: writes nothing, always decodes to
/// `value`, and rejects anything else on encode.
pub fn constant(value: impl Into<Value>) -> DynCoder {
    Arc::new(ConstantCoder {
        value: value.into(),
    })
}

/// Zero-width coder that always succeeds and decodes to [`Value::Null`].
pub fn nothing() -> DynCoder {
    magic(bytes(Len::Fixed(0)), Bytes::new())
}
