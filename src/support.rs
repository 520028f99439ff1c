//! Value-level coders for composition with [`crate::coders::apply`].
//!
//! These are bijections between two value shapes, not byte coders: the
//! wire side is what the underlying byte coder produces, the user side
//! is what callers see. See [`ValueCoder`] for the direction convention.

use crate::coders::{DynValueCoder, ValueCoder};
use crate::value::Value;
use num_bigint::{BigInt, Sign};
use num_traits::{pow, ToPrimitive, Zero};
use std::sync::Arc;

struct Dict;

impl ValueCoder for Dict {
    fn encode(&self, value: Value) -> Result<Value, String> {
        let items = value
            .as_array()
            .ok_or_else(|| format!("expected an array of pairs, got {}", value.type_name()))?;
        let mut pairs = Vec::with_capacity(items.len());
        for item in items {
            let pair = item
                .as_array()
                .ok_or_else(|| "dict entries must be [key, value] pairs".to_string())?;
            if pair.len() != 2 {
                return Err(format!("dict entry has {} elements, expected 2", pair.len()));
            }
            let key = pair[0]
                .as_str()
                .ok_or_else(|| "dict keys must be strings".to_string())?;
            pairs.push((key.to_string(), pair[1].clone()));
        }
        Ok(Value::Object(pairs))
    }

    fn decode(&self, value: Value) -> Result<Value, String> {
        let pairs = value
            .as_object()
            .ok_or_else(|| format!("expected an object, got {}", value.type_name()))?;
        Ok(Value::Array(
            pairs
                .iter()
                .map(|(key, val)| Value::array([Value::from(key.as_str()), val.clone()]))
                .collect(),
        ))
    }
}

/// Array-of-`[key, value]`-pairs on the wire, object on the user side.
pub fn dict() -> DynValueCoder {
    Arc::new(Dict)
}

struct BigToInt;

impl ValueCoder for BigToInt {
    fn encode(&self, value: Value) -> Result<Value, String> {
        let big = value
            .to_big()
            .ok_or_else(|| format!("expected an integer, got {}", value.type_name()))?;
        let i = big
            .to_i64()
            .ok_or_else(|| format!("{big} exceeds the machine integer range"))?;
        Ok(Value::Int(i))
    }

    fn decode(&self, value: Value) -> Result<Value, String> {
        let big = value
            .to_big()
            .ok_or_else(|| format!("expected an integer, got {}", value.type_name()))?;
        Ok(Value::Big(big))
    }
}

/// Bridges wide-integer coders to machine integers, failing loudly when
/// a wire value does not fit.
pub fn big_to_int() -> DynValueCoder {
    Arc::new(BigToInt)
}

struct Decimal {
    precision: usize,
}

impl ValueCoder for Decimal {
    fn encode(&self, value: Value) -> Result<Value, String> {
        let big = value
            .to_big()
            .ok_or_else(|| format!("expected an integer, got {}", value.type_name()))?;
        let scale = pow(BigInt::from(10), self.precision);
        let negative = big.sign() == Sign::Minus;
        let magnitude = if negative { -big } else { big };
        let int_part = &magnitude / &scale;
        let frac_part = &magnitude % &scale;
        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&int_part.to_string());
        if !frac_part.is_zero() {
            let digits = frac_part.to_string();
            let mut frac = "0".repeat(self.precision - digits.len());
            frac.push_str(&digits);
            while frac.ends_with('0') {
                frac.pop();
            }
            out.push('.');
            out.push_str(&frac);
        }
        Ok(Value::String(out))
    }

    fn decode(&self, value: Value) -> Result<Value, String> {
        let s = value
            .as_str()
            .ok_or_else(|| format!("expected a decimal string, got {}", value.type_name()))?;
        let (negative, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int_str, frac_str) = match rest.split_once('.') {
            Some((i, f)) => (i, f),
            None => (rest, ""),
        };
        if int_str.is_empty() && frac_str.is_empty() {
            return Err(format!("invalid decimal {s:?}"));
        }
        let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !digits_only(int_str) || !digits_only(frac_str) {
            return Err(format!("invalid decimal {s:?}"));
        }
        if frac_str.len() > self.precision {
            return Err(format!(
                "{s:?} has more than {} decimal places",
                self.precision
            ));
        }
        let scale = pow(BigInt::from(10), self.precision);
        let int_part: BigInt = if int_str.is_empty() {
            BigInt::zero()
        } else {
            int_str.parse().map_err(|_| format!("invalid decimal {s:?}"))?
        };
        let frac_part: BigInt = if frac_str.is_empty() {
            BigInt::zero()
        } else {
            let mut padded = frac_str.to_string();
            padded.push_str(&"0".repeat(self.precision - frac_str.len()));
            padded.parse().map_err(|_| format!("invalid decimal {s:?}"))?
        };
        let mut total = int_part * scale + frac_part;
        if negative {
            total = -total;
        }
        Ok(Value::Big(total))
    }
}

/// Fixed-point decimal: a scaled integer on the wire, a decimal string
/// (trailing fraction zeros trimmed) on the user side.
pub fn decimal(precision: usize) -> DynValueCoder {
    Arc::new(Decimal { precision })
}

struct Enumeration {
    names: Vec<String>,
}

impl ValueCoder for Enumeration {
    fn encode(&self, value: Value) -> Result<Value, String> {
        let ordinal = value
            .to_big()
            .and_then(|big| big.to_usize())
            .ok_or_else(|| format!("expected an ordinal, got {}", value.type_name()))?;
        let name = self
            .names
            .get(ordinal)
            .ok_or_else(|| format!("ordinal {ordinal} out of range"))?;
        Ok(Value::String(name.clone()))
    }

    fn decode(&self, value: Value) -> Result<Value, String> {
        let name = value
            .as_str()
            .ok_or_else(|| format!("expected a name, got {}", value.type_name()))?;
        let ordinal = self
            .names
            .iter()
            .position(|candidate| candidate == name)
            .ok_or_else(|| format!("unknown name {name:?}"))?;
        Ok(Value::Int(ordinal as i64))
    }
}

/// Ordinal on the wire, name on the user side, in declaration order.
pub fn enumeration<S: Into<String>>(names: impl IntoIterator<Item = S>) -> DynValueCoder {
    Arc::new(Enumeration {
        names: names.into_iter().map(Into::into).collect(),
    })
}

struct MatchAny {
    coders: Vec<DynValueCoder>,
}

impl ValueCoder for MatchAny {
    fn encode(&self, value: Value) -> Result<Value, String> {
        for coder in &self.coders {
            if let Ok(out) = coder.encode(value.clone()) {
                return Ok(out);
            }
        }
        Err("no coder matched the wire value".to_string())
    }

    fn decode(&self, value: Value) -> Result<Value, String> {
        for coder in &self.coders {
            if let Ok(out) = coder.decode(value.clone()) {
                return Ok(out);
            }
        }
        Err("no coder matched the value".to_string())
    }
}

/// Tries each partial coder in order; the first that accepts wins.
pub fn match_any(coders: impl IntoIterator<Item = DynValueCoder>) -> DynValueCoder {
    Arc::new(MatchAny {
        coders: coders.into_iter().collect(),
    })
}

struct Reverse {
    inner: DynValueCoder,
}

impl ValueCoder for Reverse {
    fn encode(&self, value: Value) -> Result<Value, String> {
        self.inner.decode(value)
    }

    fn decode(&self, value: Value) -> Result<Value, String> {
        self.inner.encode(value)
    }
}

/// Swaps a bijection's directions.
pub fn reverse(inner: DynValueCoder) -> DynValueCoder {
    Arc::new(Reverse { inner })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coder::CoderExt;
    use crate::coders::{apply, u64_le, u8};

    #[test]
    fn test_decimal_conformity() {
        let d = decimal(8);
        assert_eq!(
            d.decode(Value::from("6.30880845")).unwrap(),
            Value::Big(BigInt::from(630880845))
        );
        assert_eq!(
            d.encode(Value::Big(BigInt::from(630880845))).unwrap(),
            Value::from("6.30880845")
        );
    }

    #[test]
    fn test_decimal_edges() {
        let d = decimal(8);
        assert_eq!(d.encode(Value::from(0)).unwrap(), Value::from("0"));
        assert_eq!(d.decode(Value::from("5")).unwrap(), Value::Big(BigInt::from(500000000u64)));
        // Trailing fraction zeros trim on encode.
        assert_eq!(
            d.encode(Value::Big(BigInt::from(150000000u64))).unwrap(),
            Value::from("1.5")
        );
        assert_eq!(
            d.decode(Value::from("-1.5")).unwrap(),
            Value::Big(BigInt::from(-150000000i64))
        );
        assert_eq!(
            d.encode(Value::Big(BigInt::from(-150000000i64))).unwrap(),
            Value::from("-1.5")
        );
        // Fraction smaller than one.
        assert_eq!(
            d.encode(Value::Big(BigInt::from(5))).unwrap(),
            Value::from("0.00000005")
        );
        assert!(d.decode(Value::from("1.123456789")).is_err());
        assert!(d.decode(Value::from("x.5")).is_err());
        assert!(d.decode(Value::from(".")).is_err());
    }

    #[test]
    fn test_decimal_applied() {
        let c = apply(u64_le(), decimal(8));
        let encoded = c.encode(&Value::from("6.30880845")).unwrap();
        assert_eq!(c.decode(&encoded).unwrap(), Value::from("6.30880845"));
    }

    #[test]
    fn test_dict() {
        let d = dict();
        let wire = Value::array([
            Value::array([Value::from("a"), Value::from(1)]),
            Value::array([Value::from("b"), Value::from(2)]),
        ]);
        let user = Value::object([("a", Value::from(1)), ("b", Value::from(2))]);
        assert_eq!(d.encode(wire.clone()).unwrap(), user);
        assert_eq!(d.decode(user).unwrap(), wire);
        assert!(d.encode(Value::array([Value::from(1)])).is_err());
    }

    #[test]
    fn test_big_to_int() {
        let b = big_to_int();
        assert_eq!(
            b.encode(Value::Big(BigInt::from(41))).unwrap(),
            Value::Int(41)
        );
        assert!(b.encode(Value::Big(BigInt::from(u64::MAX))).is_err());
        assert_eq!(b.decode(Value::Int(7)).unwrap(), Value::Big(BigInt::from(7)));

        // Composed: a u64 field usable as a machine integer.
        let c = apply(u64_le(), big_to_int());
        let encoded = c.encode(&Value::from(513)).unwrap();
        assert_eq!(c.decode(&encoded).unwrap(), Value::Int(513));
    }

    #[test]
    fn test_enumeration() {
        let e = enumeration(["north", "south", "east"]);
        assert_eq!(e.encode(Value::from(1)).unwrap(), Value::from("south"));
        assert_eq!(e.decode(Value::from("east")).unwrap(), Value::Int(2));
        assert!(e.encode(Value::from(9)).is_err());
        assert!(e.decode(Value::from("west")).is_err());

        let c = apply(u8(), e);
        let encoded = c.encode(&Value::from("south")).unwrap();
        assert_eq!(&encoded[..], &[0x01]);
        assert_eq!(c.decode(&encoded).unwrap(), Value::from("south"));
    }

    #[test]
    fn test_match_and_reverse() {
        let m = match_any([big_to_int(), reverse(big_to_int())]);
        // First branch: Big -> Int.
        assert_eq!(
            m.encode(Value::Big(BigInt::from(3))).unwrap(),
            Value::Int(3)
        );
        // Second branch (reversed): Int -> Big on encode.
        assert_eq!(
            m.encode(Value::Big(BigInt::from(u64::MAX))).unwrap(),
            Value::Big(BigInt::from(u64::MAX))
        );
        assert!(m.encode(Value::from("nope")).is_err());
    }
}
