//! Composable binary codecs.
//!
//! # Overview
//!
//! A toolkit for describing binary formats declaratively: primitive
//! coders (integers, floats, byte strings, bit fields) and combinators
//! (records, arrays, tagged unions, pointers, padding, conditionals)
//! compose into a single [`Coder`] that round-trips dynamic [`Value`]s
//! to and from bytes. One description drives both directions; there is
//! no schema compiler and no derive step.
//!
//! # Safety on untrusted input
//!
//! Decoding is designed for adversarial bytes:
//! - every length is bounded by the input actually present;
//! - byte-level operations with an unaligned bit buffer fail;
//! - top-level decodes must consume their input exactly;
//! - once a pointer is followed, a read-coverage bitset enforces that no
//!   input byte is consumed twice, so pointer cycles and fan-ins cost at
//!   most one pass over the input.
//!
//! # Example
//!
//! ```
//! use binweave::{record, CoderExt, Value};
//! use binweave::coders::{string, u16_le, u8};
//!
//! let packet = record! {
//!     a: u8(),
//!     b: u16_le(),
//!     c: string(u8()),
//! };
//!
//! let value = Value::object([
//!     ("a", Value::from(31)),
//!     ("b", Value::from(12345)),
//!     ("c", Value::from("hello")),
//! ]);
//! let encoded = packet.encode(&value).unwrap();
//! assert_eq!(
//!     &encoded[..],
//!     &[0x1F, 0x39, 0x30, 0x05, b'h', b'e', b'l', b'l', b'o'],
//! );
//! assert_eq!(packet.decode(&encoded).unwrap(), value);
//! ```
//!
//! Formats with holes in them work too: [`coders::pointer`] defers a
//! value to the end of the buffer behind a fixed-width offset, and
//! [`coders::lazy`] lets a format refer to itself.

mod bitset;
mod coder;
pub mod coders;
mod error;
mod len;
mod reader;
pub mod support;
pub mod util;
mod value;
mod writer;

pub use coder::{decode, decode_opts, encode, Coder, CoderExt, DynCoder};
pub use error::Error;
pub use len::Len;
pub use reader::{Reader, ReaderOpts};
pub use value::Value;
pub use writer::Writer;
