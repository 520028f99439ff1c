//! Built-in coders and combinators.
//!
//! Factories here return [`DynCoder`](crate::DynCoder)s ready to compose.
//! Primitives carry their own width and endianness; combinators take
//! child coders (and, where a collection is involved, a
//! [`Len`](crate::Len) specifier) and return a new coder.

mod armor;
mod bytes;
mod conditional;
mod debug;
mod lazy;
mod pointer;
mod primitives;
mod structure;
mod tag;
mod transform;
mod wrappers;

pub use armor::{base64armor, Armor, ChecksumFn};
pub use bytes::{bytes, bytes_reversed, cstring, hex, hex_prefixed, string};
pub use conditional::{
    constant, flag, flag_inverted, flagged, flagged_default, magic, magic_bytes, magic_unchecked,
    nothing, optional, optional_default, Selector,
};
pub use debug::debug;
pub use lazy::lazy;
pub use pointer::pointer;
pub use primitives::{
    bigint, bits, bool, f32_be, f32_le, f64_be, f64_le, i128_be, i128_le, i16_be, i16_le, i256_be,
    i256_le, i32_be, i32_le, i64_be, i64_le, i8, int, u128_be, u128_le, u16_be, u16_le, u256_be,
    u256_le, u32_be, u32_le, u64_be, u64_le, u8,
};
pub use structure::{array, record, tuple};
pub use tag::{bitset, map, mapped_tag, tag};
pub use transform::{apply, validate, DynValueCoder, ValueCoder};
pub use wrappers::{pad_left, pad_left_with, pad_right, pad_right_with, prefix};
