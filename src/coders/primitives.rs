//! Integer, float, boolean, and bit-field coders.
//!
//! Integers up to 6 bytes decode to [`Value::Int`]; wider integers (up to
//! 256 bits) decode to [`Value::Big`]. Either variant is accepted on
//! encode when the value is in range for the declared width. Signed
//! integers use two's complement within that width.

use crate::{
    coder::{Coder, DynCoder},
    error::Error,
    reader::Reader,
    value::Value,
    writer::Writer,
};
use num_bigint::{BigInt, Sign};
use num_traits::{One, ToPrimitive, Zero};
use paste::paste;
use std::sync::Arc;

// ---------- Integers ----------

struct BigIntCoder {
    size: usize,
    le: bool,
    signed: bool,
    sized: bool,
}

impl BigIntCoder {
    fn bounds(&self) -> (BigInt, BigInt) {
        let bits = self.size * 8;
        if self.signed {
            let half = BigInt::one() << (bits - 1);
            (-half.clone(), half - 1)
        } else {
            (BigInt::zero(), (BigInt::one() << bits) - 1)
        }
    }

    fn to_wire(&self, v: &BigInt) -> Vec<u8> {
        let minimal = if v.is_zero() {
            Vec::new()
        } else if self.signed {
            v.to_signed_bytes_be()
        } else {
            v.to_bytes_be().1
        };
        let mut bytes = if self.sized {
            let fill = if self.signed && v.sign() == Sign::Minus {
                0xFF
            } else {
                0x00
            };
            let mut padded = vec![fill; self.size - minimal.len()];
            padded.extend_from_slice(&minimal);
            padded
        } else {
            minimal
        };
        if self.le {
            bytes.reverse();
        }
        bytes
    }

    fn from_wire(&self, raw: &[u8]) -> BigInt {
        let mut bytes = raw.to_vec();
        if self.le {
            bytes.reverse();
        }
        if self.signed {
            BigInt::from_signed_bytes_be(&bytes)
        } else {
            BigInt::from_bytes_be(Sign::Plus, &bytes)
        }
    }
}

impl Coder for BigIntCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let v = value.to_big().ok_or_else(|| {
            writer.err(format!("expected an integer, got {}", value.type_name()))
        })?;
        let (lo, hi) = self.bounds();
        if v < lo || v > hi {
            return Err(writer.err(format!("integer {v} out of range [{lo}, {hi}]")));
        }
        writer.bytes(&self.to_wire(&v))
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let count = if self.sized {
            self.size
        } else {
            self.size.min(reader.remaining())
        };
        let raw = reader.bytes(count)?;
        Ok(Value::Big(self.from_wire(raw)))
    }

    fn size(&self) -> Option<usize> {
        self.sized.then_some(self.size)
    }
}

/// Arbitrary-precision integer coder of up to 32 bytes (256 bits).
///
/// When `sized`, exactly `size` bytes are read and written. Otherwise up
/// to `size` bytes are written with leading zeros stripped (zero encodes
/// to nothing) and up to `size` bytes are read, bounded by the bytes
/// remaining in the enclosing buffer.
pub fn bigint(size: usize, le: bool, signed: bool, sized: bool) -> DynCoder {
    assert!(
        (1..=32).contains(&size),
        "bigint width must be 1..=32 bytes"
    );
    Arc::new(BigIntCoder {
        size,
        le,
        signed,
        sized,
    })
}

struct IntCoder {
    inner: BigIntCoder,
}

impl Coder for IntCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        self.inner.encode_stream(writer, value)
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let value = self.inner.decode_stream(reader)?;
        let Some(big) = value.to_big() else {
            return Err(reader.err("integer coder produced a non-integer"));
        };
        let Some(i) = big.to_i64() else {
            return Err(reader.err(format!("integer {big} exceeds the machine range")));
        };
        Ok(Value::Int(i))
    }

    fn size(&self) -> Option<usize> {
        Some(self.inner.size)
    }
}

/// Machine-width integer coder producing [`Value::Int`]. Limited to 6
/// bytes so every decoded value fits the machine variant exactly; use
/// [`bigint`] for wider fields.
pub fn int(size: usize, le: bool, signed: bool) -> DynCoder {
    assert!(
        (1..=6).contains(&size),
        "machine integers are limited to 6 bytes; use bigint for wider fields"
    );
    Arc::new(IntCoder {
        inner: BigIntCoder {
            size,
            le,
            signed,
            sized: true,
        },
    })
}

/// Unsigned byte.
pub fn u8() -> DynCoder {
    int(1, false, false)
}

/// Signed byte.
pub fn i8() -> DynCoder {
    int(1, false, true)
}

macro_rules! machine_aliases {
    ($($base:ident: $size:literal, $signed:literal);* $(;)?) => {
        paste! {
            $(
                #[doc = concat!("Little-endian `", stringify!($base), "`.")]
                pub fn [<$base _le>]() -> DynCoder {
                    int($size, true, $signed)
                }

                #[doc = concat!("Big-endian `", stringify!($base), "`.")]
                pub fn [<$base _be>]() -> DynCoder {
                    int($size, false, $signed)
                }
            )*
        }
    };
}

machine_aliases! {
    u16: 2, false;
    i16: 2, true;
    u32: 4, false;
    i32: 4, true;
}

macro_rules! wide_aliases {
    ($($base:ident: $size:literal, $signed:literal);* $(;)?) => {
        paste! {
            $(
                #[doc = concat!("Little-endian ", stringify!($base), " (decodes to `Value::Big`).")]
                pub fn [<$base _le>]() -> DynCoder {
                    bigint($size, true, $signed, true)
                }

                #[doc = concat!("Big-endian ", stringify!($base), " (decodes to `Value::Big`).")]
                pub fn [<$base _be>]() -> DynCoder {
                    bigint($size, false, $signed, true)
                }
            )*
        }
    };
}

wide_aliases! {
    u64: 8, false;
    i64: 8, true;
    u128: 16, false;
    i128: 16, true;
    u256: 32, false;
    i256: 32, true;
}

// ---------- Floats ----------

struct FloatCoder {
    width: usize,
    le: bool,
}

impl Coder for FloatCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let f = value.as_float().ok_or_else(|| {
            writer.err(format!("expected a float, got {}", value.type_name()))
        })?;
        match (self.width, self.le) {
            (4, true) => writer.bytes(&(f as f32).to_le_bytes()),
            (4, false) => writer.bytes(&(f as f32).to_be_bytes()),
            (_, true) => writer.bytes(&f.to_le_bytes()),
            (_, false) => writer.bytes(&f.to_be_bytes()),
        }
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let raw = reader.bytes(self.width)?;
        let f = if self.width == 4 {
            let arr: [u8; 4] = raw.try_into().expect("read exactly 4 bytes");
            let v = if self.le {
                f32::from_le_bytes(arr)
            } else {
                f32::from_be_bytes(arr)
            };
            f64::from(v)
        } else {
            let arr: [u8; 8] = raw.try_into().expect("read exactly 8 bytes");
            if self.le {
                f64::from_le_bytes(arr)
            } else {
                f64::from_be_bytes(arr)
            }
        };
        Ok(Value::Float(f))
    }

    fn size(&self) -> Option<usize> {
        Some(self.width)
    }
}

/// IEEE-754 binary32, little-endian. Any bit pattern decodes, including
/// infinities and NaN.
pub fn f32_le() -> DynCoder {
    Arc::new(FloatCoder { width: 4, le: true })
}

/// IEEE-754 binary32, big-endian.
pub fn f32_be() -> DynCoder {
    Arc::new(FloatCoder {
        width: 4,
        le: false,
    })
}

/// IEEE-754 binary64, little-endian.
pub fn f64_le() -> DynCoder {
    Arc::new(FloatCoder { width: 8, le: true })
}

/// IEEE-754 binary64, big-endian.
pub fn f64_be() -> DynCoder {
    Arc::new(FloatCoder {
        width: 8,
        le: false,
    })
}

// ---------- Boolean ----------

struct BoolCoder;

impl Coder for BoolCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let b = value.as_bool().ok_or_else(|| {
            writer.err(format!("expected a bool, got {}", value.type_name()))
        })?;
        writer.byte(u8::from(b))
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        match reader.byte()? {
            0 => Ok(Value::Bool(false)),
            1 => Ok(Value::Bool(true)),
            other => Err(reader.err(format!("invalid boolean byte 0x{other:02x}"))),
        }
    }

    fn size(&self) -> Option<usize> {
        Some(1)
    }
}

/// One-byte boolean: exactly 0x00 or 0x01 on the wire.
pub fn bool() -> DynCoder {
    Arc::new(BoolCoder)
}

// ---------- Bit fields ----------

struct BitsCoder {
    width: u32,
}

impl Coder for BitsCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let i = value.as_int().ok_or_else(|| {
            writer.err(format!("expected an integer, got {}", value.type_name()))
        })?;
        if i < 0 || (i as u64) >= 1u64 << self.width {
            return Err(writer.err(format!("{i} does not fit in {} bits", self.width)));
        }
        writer.bits(i as u32, self.width)
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        Ok(Value::Int(i64::from(reader.bits(self.width)?)))
    }
}

/// An unsigned bit field of 1..=32 bits, packed high bit first. A record
/// mixing `bits` with byte-level fields must round off to whole bytes
/// before the next byte-level field.
pub fn bits(width: u32) -> DynCoder {
    assert!(
        (1..=32).contains(&width),
        "bit fields are limited to 1..=32 bits"
    );
    Arc::new(BitsCoder { width })
}
