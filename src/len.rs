//! Length specifiers for variable-length payloads.
//!
//! Wherever a collection needs a length — `bytes`, `string`, `hex`,
//! `array`, `prefix` — a [`Len`] describes how that length reaches the
//! wire: written in-line by a coder, implied by a constant, delimited by
//! a terminator pattern, referenced from an already-seen field through a
//! path expression, or unbounded (consume to end of buffer).

use crate::{coder::DynCoder, value::Value};
use bytes::Bytes;
use num_traits::ToPrimitive;

/// How the length of a variable-length payload is determined.
#[derive(Clone)]
pub enum Len {
    /// Exactly this many elements; nothing is written for the length.
    Fixed(usize),
    /// An unsigned-integer coder written/read immediately before the
    /// payload.
    Prefixed(DynCoder),
    /// The payload ends when this byte pattern is matched; the pattern is
    /// consumed. The pattern must not be producible by the inner encoder
    /// (checked on encode).
    Terminated(Bytes),
    /// A path expression resolved against the stack of in-progress parent
    /// values: `/`-separated field names (or array indices), with leading
    /// `..` segments popping to outer levels. The resolved field must be
    /// an unsigned integer equal to the actual length.
    Path(String),
    /// Consume until the end of the enclosing buffer. Only meaningful as
    /// the last element of its container.
    Unbounded,
}

impl Len {
    /// Terminator pattern specifier.
    pub fn terminated(pattern: impl AsRef<[u8]>) -> Self {
        Len::Terminated(Bytes::copy_from_slice(pattern.as_ref()))
    }

    /// Path-expression specifier.
    pub fn path(expr: impl Into<String>) -> Self {
        Len::Path(expr.into())
    }
}

impl From<usize> for Len {
    fn from(n: usize) -> Self {
        Len::Fixed(n)
    }
}

impl From<DynCoder> for Len {
    fn from(coder: DynCoder) -> Self {
        Len::Prefixed(coder)
    }
}

impl From<&str> for Len {
    fn from(expr: &str) -> Self {
        Len::Path(expr.to_string())
    }
}

impl std::fmt::Debug for Len {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Len::Fixed(n) => write!(f, "Fixed({n})"),
            Len::Prefixed(_) => write!(f, "Prefixed(..)"),
            Len::Terminated(pat) => write!(f, "Terminated({pat:?})"),
            Len::Path(expr) => write!(f, "Path({expr:?})"),
            Len::Unbounded => write!(f, "Unbounded"),
        }
    }
}

/// Resolves a path expression against the stack of in-progress parent
/// values. Returns `Ok(None)` when only the final segment is missing
/// (conditional coders treat that as an absent flag); every structural
/// problem is an error.
pub(crate) fn resolve_path<'v>(
    stack: &'v [Value],
    expr: &str,
) -> Result<Option<&'v Value>, String> {
    let mut ups = 0usize;
    let mut fields = Vec::new();
    for segment in expr.split('/') {
        if segment.is_empty() {
            return Err(format!("empty segment in path {expr:?}"));
        }
        if segment == ".." {
            if !fields.is_empty() {
                return Err(format!("`..` after a field segment in path {expr:?}"));
            }
            ups += 1;
        } else {
            fields.push(segment);
        }
    }
    if fields.is_empty() {
        return Err(format!("path {expr:?} names no field"));
    }
    let Some(start) = stack.len().checked_sub(1 + ups) else {
        return Err(format!("path {expr:?} escapes the value stack"));
    };
    let mut current = &stack[start];
    for (i, segment) in fields.iter().enumerate() {
        let last = i == fields.len() - 1;
        let next = match current {
            Value::Object(pairs) => pairs
                .iter()
                .find(|(name, _)| name == segment)
                .map(|(_, value)| value),
            Value::Array(items) => {
                let index: usize = segment
                    .parse()
                    .map_err(|_| format!("segment {segment:?} is not an array index"))?;
                items.get(index)
            }
            other => {
                return Err(format!(
                    "cannot descend into {} at segment {segment:?}",
                    other.type_name()
                ))
            }
        };
        match next {
            Some(value) => current = value,
            None if last => return Ok(None),
            None => return Err(format!("missing field {segment:?} in path {expr:?}")),
        }
    }
    Ok(Some(current))
}

/// Converts an integer value to a length.
pub(crate) fn value_to_len(value: &Value) -> Result<usize, String> {
    match value {
        Value::Int(i) if *i >= 0 => Ok(*i as usize),
        Value::Big(b) => b
            .to_usize()
            .ok_or_else(|| format!("length {b} out of range")),
        other => Err(format!(
            "expected an unsigned integer length, got {}",
            other.type_name()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> Vec<Value> {
        vec![
            Value::object([("outer", Value::from(7))]),
            Value::object([
                ("count", Value::from(3)),
                ("items", Value::array([Value::from(10), Value::from(20)])),
            ]),
        ]
    }

    #[test]
    fn test_field_lookup() {
        let stack = stack();
        assert_eq!(
            resolve_path(&stack, "count").unwrap(),
            Some(&Value::Int(3))
        );
        assert_eq!(
            resolve_path(&stack, "items/1").unwrap(),
            Some(&Value::Int(20))
        );
    }

    #[test]
    fn test_parent_lookup() {
        let stack = stack();
        assert_eq!(
            resolve_path(&stack, "../outer").unwrap(),
            Some(&Value::Int(7))
        );
        assert!(resolve_path(&stack, "../../outer").is_err());
    }

    #[test]
    fn test_missing_and_malformed() {
        let stack = stack();
        assert_eq!(resolve_path(&stack, "absent").unwrap(), None);
        assert!(resolve_path(&stack, "count/deeper").is_err());
        assert!(resolve_path(&stack, "items/x").is_err());
        assert!(resolve_path(&stack, "a//b").is_err());
        assert!(resolve_path(&stack, "a/..").is_err());
    }

    #[test]
    fn test_value_to_len() {
        assert_eq!(value_to_len(&Value::Int(5)).unwrap(), 5);
        assert!(value_to_len(&Value::Int(-1)).is_err());
        assert!(value_to_len(&Value::Bool(true)).is_err());
    }
}
