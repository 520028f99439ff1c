//! ASCII-armored container.
//!
//! Wraps a byte coder's output in PGP-style armor:
//!
//! ```text
//! -----BEGIN <NAME>-----
//!
//! <base64 of the encoded bytes, wrapped at line_len chars>
//! =<base64 of checksum(bytes)>        (optional)
//! -----END <NAME>-----
//! ```
//!
//! Base64 itself is an external byte↔text conversion; this module only
//! frames it and verifies the optional checksum.

use crate::{
    coder::{CoderExt, DynCoder},
    error::Error,
    reader::ReaderOpts,
    value::Value,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

/// Digest function for the armor checksum line.
pub type ChecksumFn = Arc<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>;

/// Text wrapper around a byte coder. Built with [`base64armor`].
#[derive(Clone)]
pub struct Armor {
    name: String,
    line_len: usize,
    inner: DynCoder,
    checksum: Option<ChecksumFn>,
}

impl Armor {
    /// Adds a checksum line computed over the encoded bytes and verified
    /// on decode.
    pub fn with_checksum(mut self, checksum: impl Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static) -> Self {
        self.checksum = Some(Arc::new(checksum));
        self
    }

    /// Encodes `value` and wraps the bytes in armor.
    pub fn encode(&self, value: &Value) -> Result<String, Error> {
        let data = self.inner.encode(value)?;
        let name = self.name.to_uppercase();
        let mut out = format!("-----BEGIN {name}-----\n\n");
        let body = STANDARD.encode(&data);
        for chunk in body.as_bytes().chunks(self.line_len) {
            out.push_str(std::str::from_utf8(chunk).expect("base64 output is ASCII"));
            out.push('\n');
        }
        if let Some(checksum) = &self.checksum {
            out.push('=');
            out.push_str(&STANDARD.encode(checksum(&data)));
            out.push('\n');
        }
        out.push_str(&format!("-----END {name}-----"));
        Ok(out)
    }

    /// Strips the armor, optionally verifies the checksum, and decodes
    /// the payload.
    pub fn decode(&self, text: &str) -> Result<Value, Error> {
        self.decode_opts(text, ReaderOpts::default())
    }

    /// Like [`Armor::decode`] with explicit [`ReaderOpts`] for the inner
    /// decode.
    pub fn decode_opts(&self, text: &str, opts: ReaderOpts) -> Result<Value, Error> {
        let name = self.name.to_uppercase();
        let begin = format!("-----BEGIN {name}-----");
        let end = format!("-----END {name}-----");
        let mut body: Vec<&str> = Vec::new();
        let mut seen_begin = false;
        let mut seen_end = false;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if !seen_begin {
                if line == begin {
                    seen_begin = true;
                    continue;
                }
                return Err(Error::new("/", format!("expected {begin:?}, got {line:?}")));
            }
            if line == end {
                seen_end = true;
                break;
            }
            body.push(line);
        }
        if !seen_begin {
            return Err(Error::new("/", format!("armor header {begin:?} not found")));
        }
        if !seen_end {
            return Err(Error::new("/", format!("armor footer {end:?} not found")));
        }
        // The checksum line is positional: the last line before the
        // footer, and only when this armor carries a checksum. A leading
        // `=` alone cannot identify it, since line wrapping can put bare
        // base64 padding on its own line.
        let digest = if self.checksum.is_some() {
            let last = body
                .pop()
                .and_then(|line| line.strip_prefix('='))
                .ok_or_else(|| Error::new("/", "armor checksum line missing"))?;
            Some(last)
        } else {
            None
        };
        let payload = body.concat();
        let data = STANDARD
            .decode(payload.as_bytes())
            .map_err(|e| Error::new("/", format!("invalid base64 payload: {e}")))?;
        if let (Some(checksum), Some(digest)) = (&self.checksum, digest) {
            let expected = STANDARD.encode(checksum(&data));
            if expected != digest {
                return Err(Error::new("/", "armor checksum mismatch"));
            }
        }
        self.inner.decode_opts(&data, opts)
    }
}

/// Armored container over `inner`, with base64 lines wrapped at
/// `line_len` characters.
pub fn base64armor(name: impl Into<String>, line_len: usize, inner: DynCoder) -> Armor {
    assert!(line_len > 0, "armor line length must be non-zero");
    Armor {
        name: name.into(),
        line_len,
        inner,
        checksum: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coders::bytes::bytes;
    use crate::coders::primitives::u8;
    use crate::len::Len;

    fn sum(data: &[u8]) -> Vec<u8> {
        let mut total: u32 = 0;
        for byte in data {
            total = total.wrapping_add(u32::from(*byte));
        }
        total.to_be_bytes().to_vec()
    }

    #[test]
    fn test_round_trip() {
        let armor = base64armor("test message", 16, bytes(u8()));
        let v = Value::from(&b"hello armor"[..]);
        let text = armor.encode(&v).unwrap();
        assert!(text.starts_with("-----BEGIN TEST MESSAGE-----\n\n"));
        assert!(text.ends_with("-----END TEST MESSAGE-----"));
        for line in text.lines() {
            assert!(line.len() <= 28);
        }
        assert_eq!(armor.decode(&text).unwrap(), v);
    }

    #[test]
    fn test_checksum() {
        let armor = base64armor("blob", 64, bytes(Len::Unbounded)).with_checksum(sum);
        let v = Value::from(&[1u8, 2, 3][..]);
        let text = armor.encode(&v).unwrap();
        assert!(text.contains("\n="));
        assert_eq!(armor.decode(&text).unwrap(), v);

        // Flip a payload byte: the checksum no longer matches.
        let tampered = text.replacen("AQID", "AQIE", 1);
        assert_ne!(tampered, text);
        let err = armor.decode(&tampered).unwrap_err();
        assert!(err.message.contains("checksum"), "{err}");
    }

    #[test]
    fn test_padding_on_its_own_line() {
        // 4 payload bytes -> "AAECAw==", wrapped at 6 chars, leaving the
        // padding alone on the second line.
        let armor = base64armor("x", 6, bytes(Len::Unbounded));
        let v = Value::from(&[0u8, 1, 2, 3][..]);
        let text = armor.encode(&v).unwrap();
        assert!(text.contains("AAECAw\n==\n"), "{text}");
        assert_eq!(armor.decode(&text).unwrap(), v);

        // Same shape with a checksum line after the padding line.
        let checked = base64armor("x", 6, bytes(Len::Unbounded)).with_checksum(sum);
        let text = checked.encode(&v).unwrap();
        assert_eq!(checked.decode(&text).unwrap(), v);
    }

    #[test]
    fn test_malformed() {
        let armor = base64armor("x", 8, bytes(Len::Unbounded));
        assert!(armor.decode("garbage").is_err());
        assert!(armor.decode("-----BEGIN X-----\nAAAA").is_err());
        assert!(armor
            .decode("-----BEGIN Y-----\nAAAA\n-----END Y-----")
            .is_err());
    }
}
