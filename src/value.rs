//! The dynamic value type coders operate on.
//!
//! Coders are composed at runtime, so the values they produce and consume
//! are dynamically typed. [`Value`] covers everything a wire format can
//! describe: scalars, byte strings, text, sequences, and ordered field
//! maps. Machine-width integer coders produce [`Value::Int`]; wider
//! integer coders produce [`Value::Big`].

use bytes::Bytes;
use num_bigint::BigInt;

/// A decoded (or to-be-encoded) value.
#[derive(Clone, Debug)]
pub enum Value {
    /// Absence of a value. Produced by `magic` and by conditional coders
    /// whose flag is off; accepted by them on encode.
    Null,
    /// Boolean.
    Bool(bool),
    /// Machine-width integer.
    Int(i64),
    /// Arbitrary-precision integer (wire widths above 6 bytes).
    Big(BigInt),
    /// IEEE-754 floating point. `f32` coders widen losslessly.
    Float(f64),
    /// Byte string.
    Bytes(Bytes),
    /// UTF-8 text.
    String(String),
    /// Positional sequence.
    Array(Vec<Value>),
    /// Ordered name/value pairs. Order is preserved; it is not part of
    /// the wire format (field order comes from the coder), but keeping it
    /// makes round-trips reproducible.
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Builds an [`Value::Object`] from name/value pairs.
    pub fn object<'a>(pairs: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Value::Object(
            pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    /// Builds an [`Value::Array`] from values.
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(items.into_iter().collect())
    }

    /// Name of this value's variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Big(_) => "bigint",
            Value::Float(_) => "float",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Object(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Converts [`Value::Int`] or [`Value::Big`] to a [`BigInt`].
    pub fn to_big(&self) -> Option<BigInt> {
        match self {
            Value::Int(i) => Some(BigInt::from(*i)),
            Value::Big(b) => Some(b.clone()),
            _ => None,
        }
    }

    /// Looks up a field of an [`Value::Object`] by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(pairs) => pairs
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

// Machine and arbitrary-precision integers compare numerically, so a
// tag key built with `Value::from(5u8)` matches a discriminator decoded
// by a wide-integer coder.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Big(a), Value::Big(b)) => a == b,
            (Value::Int(a), Value::Big(b)) | (Value::Big(b), Value::Int(a)) => {
                *b == BigInt::from(*a)
            }
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(u: u32) -> Self {
        Value::Int(i64::from(u))
    }
}

// Values above i64::MAX spill into the arbitrary-precision variant, the
// same split KSON-style value models use.
impl From<u64> for Value {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Big(BigInt::from(u)),
        }
    }
}

impl From<usize> for Value {
    fn from(u: usize) -> Self {
        Value::from(u as u64)
    }
}

impl From<BigInt> for Value {
    fn from(b: BigInt) -> Self {
        Value::Big(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(b))
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let v = Value::object([("a", Value::from(1)), ("b", Value::from("x"))]);
        assert_eq!(v.get("a"), Some(&Value::Int(1)));
        assert_eq!(v.get("b").and_then(Value::as_str), Some("x"));
        assert_eq!(v.get("missing"), None);
        assert_eq!(v.type_name(), "object");
    }

    #[test]
    fn test_u64_split() {
        assert_eq!(Value::from(7u64), Value::Int(7));
        assert_eq!(Value::from(u64::MAX), Value::Big(BigInt::from(u64::MAX)));
    }

    #[test]
    fn test_to_big() {
        assert_eq!(Value::Int(-5).to_big(), Some(BigInt::from(-5)));
        assert_eq!(Value::Null.to_big(), None);
    }

    #[test]
    fn test_numeric_equality_across_variants() {
        assert_eq!(Value::Int(5), Value::Big(BigInt::from(5)));
        assert_eq!(Value::Big(BigInt::from(-7)), Value::Int(-7));
        assert_ne!(Value::Int(5), Value::Big(BigInt::from(6)));
        assert_ne!(Value::Int(0), Value::Bool(false));
    }
}
