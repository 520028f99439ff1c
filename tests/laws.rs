//! Universal coder laws: round-trip, canonical-form idempotence, size
//! consistency, bit alignment, and pointer safety.

use binweave::coders::{
    array, bits, bool, bytes, optional, pointer, string, tuple, u16_be, u16_le, u32_be, u8,
};
use binweave::{record, CoderExt, DynCoder, Value};
use proptest::prelude::*;

fn packet() -> DynCoder {
    record! {
        version: u8(),
        count: u16_le(),
        name: string(u8()),
        payload: bytes(u16_be()),
        scores: array(u8(), u32_be()),
        maybe: optional(bool(), u16_be()),
    }
}

fn packet_value() -> impl Strategy<Value = Value> {
    (
        any::<u8>(),
        any::<u16>(),
        "[a-z]{0,12}",
        proptest::collection::vec(any::<u8>(), 0..64),
        proptest::collection::vec(any::<u32>(), 0..8),
        proptest::option::of(any::<u16>()),
    )
        .prop_map(|(version, count, name, payload, scores, maybe)| {
            Value::object([
                ("version", Value::from(i64::from(version))),
                ("count", Value::from(i64::from(count))),
                ("name", Value::from(name.as_str())),
                ("payload", Value::from(payload)),
                (
                    "scores",
                    Value::array(scores.into_iter().map(Value::from)),
                ),
                (
                    "maybe",
                    match maybe {
                        Some(v) => Value::from(i64::from(v)),
                        None => Value::Null,
                    },
                ),
            ])
        })
}

proptest! {
    #[test]
    fn round_trip_and_idempotence(v in packet_value()) {
        let c = packet();
        let encoded = c.encode(&v).unwrap();
        let decoded = c.decode(&encoded).unwrap();
        prop_assert_eq!(&decoded, &v);
        // Re-encoding the decoded value is byte-identical.
        let again = c.encode(&decoded).unwrap();
        prop_assert_eq!(encoded, again);
    }

    #[test]
    fn sized_coders_write_their_size(a in any::<u32>(), b in any::<u16>()) {
        let c = record! { a: u32_be(), b: u16_le() };
        prop_assert_eq!(c.size(), Some(6));
        let v = Value::object([
            ("a", Value::from(a)),
            ("b", Value::from(i64::from(b))),
        ]);
        let encoded = c.encode(&v).unwrap();
        prop_assert_eq!(encoded.len(), 6);
        // Any other input length fails to decode.
        prop_assert!(c.decode(&encoded[..5]).is_err());
        let mut longer = encoded.to_vec();
        longer.push(0);
        prop_assert!(c.decode(&longer).is_err());
    }

    #[test]
    fn truncation_always_fails(v in packet_value()) {
        let c = packet();
        let encoded = c.encode(&v).unwrap();
        if encoded.len() > 1 {
            // Dropping the last byte can never decode cleanly: either a
            // read runs short or the trailing check complains.
            prop_assert!(c.decode(&encoded[..encoded.len() - 1]).is_err());
        }
    }
}

#[test]
fn unaligned_byte_field_fails_both_ways() {
    let c = record! { f: bits(3), x: u8() };
    let v = Value::object([("f", Value::from(1)), ("x", Value::from(2))]);
    assert!(c.encode(&v).is_err());
    assert!(c.decode(&[0xFF, 0xFF]).is_err());

    // Rounding off to a whole byte makes the same shape legal.
    let c = record! { f: bits(3), g: bits(5), x: u8() };
    let v = Value::object([
        ("f", Value::from(1)),
        ("g", Value::from(0)),
        ("x", Value::from(2)),
    ]);
    let encoded = c.encode(&v).unwrap();
    assert_eq!(encoded.len(), 2);
    assert_eq!(c.decode(&encoded).unwrap(), v);
}

#[test]
fn pointer_double_read_fails() {
    let c = tuple([pointer(u8(), u8()), pointer(u8(), u8())]);
    // Distinct pointees decode fine.
    let v = Value::array([Value::from(10), Value::from(20)]);
    let encoded = c.encode(&v).unwrap();
    assert_eq!(&encoded[..], &[0x02, 0x03, 0x0A, 0x14]);
    assert_eq!(c.decode(&encoded).unwrap(), v);

    // Two pointers into the same byte are cut short.
    assert!(c.decode(&[0x02, 0x02, 0x2A]).is_err());
}

#[test]
fn pointer_cycle_fails() {
    // A pointer that targets its own placeholder: byte 0 is consumed
    // once as the placeholder and again as the pointee.
    let c = pointer(u8(), u8());
    let err = c.decode(&[0x00]).unwrap_err();
    assert!(err.message.contains("already read"), "{err}");
}
