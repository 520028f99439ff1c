//! Enumerations, tagged unions, and named bit flags.

use crate::{
    coder::{Coder, DynCoder},
    error::Error,
    reader::Reader,
    value::Value,
    writer::Writer,
};
use std::sync::Arc;

static NULL: Value = Value::Null;

struct MapCoder {
    inner: DynCoder,
    variants: Vec<(String, Value)>,
}

impl Coder for MapCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let name = value.as_str().ok_or_else(|| {
            writer.err(format!("expected a variant name, got {}", value.type_name()))
        })?;
        let wire = self
            .variants
            .iter()
            .find(|(variant, _)| variant == name)
            .map(|(_, wire)| wire)
            .ok_or_else(|| writer.err(format!("unknown variant {name:?}")))?;
        self.inner.encode_stream(writer, wire)
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let wire = self.inner.decode_stream(reader)?;
        let name = self
            .variants
            .iter()
            .find(|(_, candidate)| *candidate == wire)
            .map(|(name, _)| name)
            .ok_or_else(|| reader.err(format!("unmapped wire value {wire:?}")))?;
        Ok(Value::String(name.clone()))
    }

    fn size(&self) -> Option<usize> {
        self.inner.size()
    }
}

/// Bijection between wire values and a finite set of names: encode looks
/// the name up, decode inverts it. Unknown names and unmapped wire
/// values fail.
pub fn map<S: Into<String>, V: Into<Value>>(
    inner: DynCoder,
    variants: impl IntoIterator<Item = (S, V)>,
) -> DynCoder {
    Arc::new(MapCoder {
        inner,
        variants: variants
            .into_iter()
            .map(|(name, wire)| (name.into(), wire.into()))
            .collect(),
    })
}

struct TagCoder {
    tag: DynCoder,
    variants: Vec<(Value, DynCoder)>,
}

impl Coder for TagCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        let t = value
            .get("tag")
            .ok_or_else(|| writer.err("expected an object with a `tag` field"))?;
        let payload = self
            .variants
            .iter()
            .find(|(candidate, _)| candidate == t)
            .map(|(_, coder)| coder)
            .ok_or_else(|| writer.err(format!("unknown tag {t:?}")))?;
        self.tag.encode_stream(writer, t)?;
        let data = value.get("data").unwrap_or(&NULL);
        writer.push_field("data");
        payload.encode_stream(writer, data)?;
        writer.pop_field();
        Ok(())
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let t = self.tag.decode_stream(reader)?;
        let payload = self
            .variants
            .iter()
            .find(|(candidate, _)| *candidate == t)
            .map(|(_, coder)| coder)
            .ok_or_else(|| reader.err(format!("unknown tag {t:?}")))?;
        reader.push_field("data");
        let data = payload.decode_stream(reader)?;
        reader.pop_field();
        Ok(Value::object([("tag", t), ("data", data)]))
    }
}

/// Tagged union: a discriminator read via `tag` selects the payload
/// coder. Values are objects with `tag` and `data` fields.
pub fn tag<V: Into<Value>>(
    tag: DynCoder,
    variants: impl IntoIterator<Item = (V, DynCoder)>,
) -> DynCoder {
    Arc::new(TagCoder {
        tag,
        variants: variants
            .into_iter()
            .map(|(wire, coder)| (wire.into(), coder))
            .collect(),
    })
}

/// Tagged union with named variants: sugar for [`map`] over the
/// discriminator plus [`tag`] dispatch. Values are objects whose `tag`
/// field is the variant name.
pub fn mapped_tag<S: Into<String>, V: Into<Value>>(
    tag_coder: DynCoder,
    variants: impl IntoIterator<Item = (S, V, DynCoder)>,
) -> DynCoder {
    let variants: Vec<(String, Value, DynCoder)> = variants
        .into_iter()
        .map(|(name, wire, coder)| (name.into(), wire.into(), coder))
        .collect();
    let names = map(
        tag_coder,
        variants
            .iter()
            .map(|(name, wire, _)| (name.clone(), wire.clone()))
            .collect::<Vec<_>>(),
    );
    tag(
        names,
        variants
            .into_iter()
            .map(|(name, _, coder)| (Value::String(name), coder))
            .collect::<Vec<_>>(),
    )
}

struct BitsetCoder {
    names: Vec<String>,
    pad: bool,
}

impl BitsetCoder {
    fn tail_bits(&self) -> u32 {
        (self.names.len() % 8) as u32
    }
}

impl Coder for BitsetCoder {
    fn encode_stream(&self, writer: &mut Writer, value: &Value) -> Result<(), Error> {
        for name in &self.names {
            let bit = match value.get(name) {
                None | Some(Value::Null) => false,
                Some(Value::Bool(b)) => *b,
                Some(other) => {
                    return Err(writer.err(format!(
                        "flag {name:?} must be a bool, got {}",
                        other.type_name()
                    )))
                }
            };
            writer.bits(u32::from(bit), 1)?;
        }
        let tail = self.tail_bits();
        if self.pad && tail != 0 {
            writer.bits(0, 8 - tail)?;
        }
        Ok(())
    }

    fn decode_stream(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let mut pairs = Vec::with_capacity(self.names.len());
        for name in &self.names {
            pairs.push((name.clone(), Value::Bool(reader.bits(1)? == 1)));
        }
        let tail = self.tail_bits();
        if self.pad && tail != 0 {
            reader.bits(8 - tail)?;
        }
        Ok(Value::Object(pairs))
    }

    fn size(&self) -> Option<usize> {
        if self.names.len() % 8 == 0 {
            Some(self.names.len() / 8)
        } else if self.pad {
            Some(self.names.len().div_ceil(8))
        } else {
            None
        }
    }
}

/// One bit per name, in declaration order, via the bit sub-cursor.
/// `pad` rounds up to a whole byte with zero bits. Values are objects of
/// name to bool; missing names encode as `false`.
pub fn bitset<S: Into<String>>(names: impl IntoIterator<Item = S>, pad: bool) -> DynCoder {
    Arc::new(BitsetCoder {
        names: names.into_iter().map(Into::into).collect(),
        pad,
    })
}
