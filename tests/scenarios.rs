//! End-to-end scenarios over composed formats.

use binweave::coders::{
    array, base64armor, bits, bitset, bool, bytes, cstring, magic_bytes, map, mapped_tag,
    optional, pointer, prefix, string, tuple, u16_be, u32_be, u8,
};
use binweave::{record, CoderExt, DynCoder, Len, ReaderOpts, Value};

#[test]
fn bit_packing_conformity() {
    let c = record! {
        f: bits(5),
        f1: bits(1),
        f2: bits(1),
        f3: bits(1),
    };
    let v = Value::object([
        ("f", Value::from(1)),
        ("f1", Value::from(0)),
        ("f2", Value::from(1)),
        ("f3", Value::from(0)),
    ]);
    let encoded = c.encode(&v).unwrap();
    assert_eq!(&encoded[..], &[0x0A]);
    assert_eq!(c.decode(&encoded).unwrap(), v);
}

fn message() -> DynCoder {
    record! {
        magic: magic_bytes(b"BWV1"),
        flags: bitset(["compressed", "signed", "urgent"], true),
        sender: cstring(),
        body: prefix(u16_be(), record! {
            kind: map(u8(), [("ping", 0usize), ("data", 1usize)]),
            items: array(u8(), tuple([u16_be(), bytes(u8())])),
        }),
        trailer: optional(bool(), u32_be()),
    }
}

fn message_value() -> Value {
    Value::object([
        ("magic", Value::Null),
        (
            "flags",
            Value::object([
                ("compressed", Value::Bool(true)),
                ("signed", Value::Bool(false)),
                ("urgent", Value::Bool(true)),
            ]),
        ),
        ("sender", Value::from("al")),
        (
            "body",
            Value::object([
                ("kind", Value::from("data")),
                (
                    "items",
                    Value::array([Value::array([
                        Value::from(258),
                        Value::from(&[0xAAu8][..]),
                    ])]),
                ),
            ]),
        ),
        ("trailer", Value::from(0x01020304)),
    ])
}

#[test]
fn composite_message_conformity() {
    let expected: &[u8] = &[
        0x42, 0x57, 0x56, 0x31, // magic "BWV1"
        0xA0, // flags: 1 0 1 + padding
        0x61, 0x6C, 0x00, // sender "al\0"
        0x00, 0x06, // body frame length
        0x01, // kind = data
        0x01, // one item
        0x01, 0x02, // u16 258
        0x01, 0xAA, // one payload byte
        0x01, 0x01, 0x02, 0x03, 0x04, // trailer present
    ];
    let c = message();
    let v = message_value();
    let encoded = c.encode(&v).unwrap();
    assert_eq!(&encoded[..], expected);
    assert_eq!(c.decode(expected).unwrap(), v);
}

#[test]
fn composite_message_without_trailer() {
    let c = message();
    let mut pairs = match message_value() {
        Value::Object(pairs) => pairs,
        _ => unreachable!(),
    };
    for (name, value) in &mut pairs {
        if name == "trailer" {
            *value = Value::Null;
        }
    }
    let v = Value::Object(pairs);
    let encoded = c.encode(&v).unwrap();
    assert_eq!(encoded[encoded.len() - 1], 0x00);
    assert_eq!(c.decode(&encoded).unwrap(), v);
}

#[test]
fn corrupt_message_reports_paths() {
    let c = message();
    let v = message_value();
    let good = c.encode(&v).unwrap();

    // Break the magic.
    let mut bad = good.to_vec();
    bad[0] = b'X';
    let err = c.decode(&bad).unwrap_err();
    assert_eq!(err.path, "magic");

    // Break the body frame length so the inner record is cut short.
    let mut bad = good.to_vec();
    bad[9] = 0x05;
    assert!(c.decode(&bad).is_err());

    // Unknown map value inside the body.
    let mut bad = good.to_vec();
    bad[10] = 0x09;
    let err = c.decode(&bad).unwrap_err();
    assert!(err.path.starts_with("body/kind"), "{}", err.path);
}

#[test]
fn parent_path_length_reference() {
    let c = record! {
        n: u8(),
        inner: record! {
            data: array("../n", u8()),
        },
    };
    let v = Value::object([
        ("n", Value::from(2)),
        (
            "inner",
            Value::object([(
                "data",
                Value::array([Value::from(7), Value::from(9)]),
            )]),
        ),
    ]);
    let encoded = c.encode(&v).unwrap();
    assert_eq!(&encoded[..], &[0x02, 0x07, 0x09]);
    assert_eq!(c.decode(&encoded).unwrap(), v);

    // The path value must agree with the actual element count.
    let bad = Value::object([
        ("n", Value::from(3)),
        (
            "inner",
            Value::object([("data", Value::array([Value::from(7)]))]),
        ),
    ]);
    assert!(c.encode(&bad).is_err());
}

#[test]
fn pointer_directory_format() {
    // A directory of names stored behind fixed-width offsets.
    let c = record! {
        count: u8(),
        entries: array("count", pointer(u16_be(), cstring())),
    };
    let v = Value::object([
        ("count", Value::from(2)),
        (
            "entries",
            Value::array([Value::from("alpha"), Value::from("beta")]),
        ),
    ]);
    let encoded = c.encode(&v).unwrap();
    // count + two u16 placeholders, then the pointees in order.
    assert_eq!(encoded[0], 2);
    assert_eq!(&encoded[1..3], &[0x00, 0x05]);
    assert_eq!(&encoded[3..5], &[0x00, 0x0B]);
    assert_eq!(&encoded[5..11], b"alpha\0");
    assert_eq!(&encoded[11..], b"beta\0");
    assert_eq!(c.decode(&encoded).unwrap(), v);
}

#[test]
fn unbounded_tail() {
    let c = record! {
        head: u8(),
        rest: bytes(Len::Unbounded),
    };
    let v = Value::object([
        ("head", Value::from(1)),
        ("rest", Value::from(&[2u8, 3, 4][..])),
    ]);
    let encoded = c.encode(&v).unwrap();
    assert_eq!(&encoded[..], &[1, 2, 3, 4]);
    assert_eq!(c.decode(&encoded).unwrap(), v);

    // An unbounded field that is not last starves its successors.
    let misplaced = record! {
        rest: bytes(Len::Unbounded),
        after: u8(),
    };
    assert!(misplaced.decode(&[1, 2, 3]).is_err());
}

#[test]
fn hostile_length_prefix_fails_fast() {
    let c = array(u32_be(), u8());
    // Claims ~4 billion elements backed by nothing.
    assert!(c.decode(&[0xFF, 0xFF, 0xFF, 0xFF]).is_err());
}

#[test]
fn armored_message() {
    fn crc_ish(data: &[u8]) -> Vec<u8> {
        let mut acc: u32 = 0xFFFF_FFFF;
        for byte in data {
            acc = acc.rotate_left(5) ^ u32::from(*byte);
        }
        acc.to_be_bytes().to_vec()
    }

    let armor = base64armor("bw message", 20, message()).with_checksum(crc_ish);
    let v = message_value();
    let text = armor.encode(&v).unwrap();
    assert!(text.starts_with("-----BEGIN BW MESSAGE-----"));
    assert!(text.ends_with("-----END BW MESSAGE-----"));
    assert_eq!(armor.decode(&text).unwrap(), v);
}

#[test]
fn tagged_union_format() {
    let c = mapped_tag(
        u8(),
        [
            ("text", 0usize, string(u8())),
            ("raw", 1usize, bytes(Len::Unbounded)),
        ],
    );
    let text = Value::object([("tag", Value::from("text")), ("data", Value::from("hi"))]);
    let encoded = c.encode(&text).unwrap();
    assert_eq!(&encoded[..], &[0x00, 0x02, b'h', b'i']);
    assert_eq!(c.decode(&encoded).unwrap(), text);

    let raw = Value::object([
        ("tag", Value::from("raw")),
        ("data", Value::from(&[9u8, 9, 9][..])),
    ]);
    let encoded = c.encode(&raw).unwrap();
    assert_eq!(c.decode(&encoded).unwrap(), raw);

    assert!(c.decode(&[0x07]).is_err());
}

#[test]
fn allow_unread_bytes_opt_out() {
    let c = record! { head: u8() };
    let data = [0x01, 0xEE, 0xEE];
    assert!(c.decode(&data).is_err());
    let v = c
        .decode_opts(
            &data,
            ReaderOpts {
                allow_unread_bytes: true,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(v, Value::object([("head", Value::from(1))]));
}
