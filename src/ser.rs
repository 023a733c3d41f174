//! TOON encoding.
//!
//! Encoding runs in two steps. [`ToonValueSerializer`] turns any
//! `T: Serialize` into a [`ToonValue`] tree, applying wire names to struct
//! members on the way. [`Encoder`] then walks that tree and writes lines.
//!
//! ## Layout
//!
//! - Records and maps write one `name: value` line per member, quoting the
//!   name when it needs it. A composite member writes `name:` and continues
//!   on deeper lines.
//! - A list whose first element is a record becomes a **table**: a header
//!   `[count field1 field2 ...]` and one comma-joined row per element, all at
//!   the same depth.
//! - Any other list writes a `[count]` header followed by its elements one
//!   level deeper. Record and map elements start with a lone `-` line.
//! - The empty list is always `[0]`.
//!
//! ```rust
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Item { sku: &'static str, qty: u32 }
//!
//! #[derive(Serialize)]
//! struct Order { id: u32, items: Vec<Item> }
//!
//! let order = Order {
//!     id: 7,
//!     items: vec![Item { sku: "A-1", qty: 2 }, Item { sku: "B-2", qty: 1 }],
//! };
//! assert_eq!(
//!     toon_codec::to_string(&order).unwrap(),
//!     "id: 7\nitems:\n  [2 sku qty]\n  A-1,2\n  B-2,1"
//! );
//! ```

use crate::field::wire_name;
use crate::literal::{write_literal, write_quoted};
use crate::timestamp::TIMESTAMP_TOKEN;
use crate::value::RECORD_TOKEN;
use crate::{Error, Result, Timestamp, ToonMap, ToonOptions, ToonValue};
use serde::{ser, Serialize};

/// Writes a [`ToonValue`] tree as TOON text.
///
/// Lines are joined with `\n` and the output has no trailing newline.
///
/// # Examples
///
/// ```rust
/// use toon_codec::{Encoder, ToonOptions, ToonValue};
///
/// let value = ToonValue::List(vec![ToonValue::from("a b"), ToonValue::Int(-1)]);
/// let text = Encoder::new(ToonOptions::new()).encode(&value).unwrap();
/// assert_eq!(text, "[2]\n  \"a b\"\n  -1");
/// ```
pub struct Encoder {
    out: String,
    options: ToonOptions,
}

impl Encoder {
    pub fn new(options: ToonOptions) -> Self {
        Encoder {
            out: String::with_capacity(256),
            options,
        }
    }

    /// Encodes `value`, consuming the encoder.
    pub fn encode(mut self, value: &ToonValue) -> Result<String> {
        match value {
            ToonValue::Record(members) | ToonValue::Map(members) => {
                self.write_members(members, 0)?
            }
            ToonValue::List(items) => self.write_list(items, 0)?,
            scalar => write_scalar(&mut self.out, scalar),
        }
        Ok(self.out)
    }

    fn start_line(&mut self, depth: usize) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        let width = depth * self.options.indent.max(1);
        self.out.extend(std::iter::repeat(' ').take(width));
    }

    fn write_members(&mut self, members: &ToonMap, depth: usize) -> Result<()> {
        for (name, value) in members {
            self.start_line(depth);
            write_literal(&mut self.out, name);
            self.out.push(':');
            if value.is_scalar() {
                self.out.push(' ');
                write_scalar(&mut self.out, value);
            } else {
                self.write_block(value, depth + 1)?;
            }
        }
        Ok(())
    }

    fn write_block(&mut self, value: &ToonValue, depth: usize) -> Result<()> {
        match value {
            ToonValue::Record(members) | ToonValue::Map(members) => {
                self.write_members(members, depth)
            }
            ToonValue::List(items) => self.write_list(items, depth),
            scalar => {
                self.start_line(depth);
                write_scalar(&mut self.out, scalar);
                Ok(())
            }
        }
    }

    fn write_list(&mut self, items: &[ToonValue], depth: usize) -> Result<()> {
        match items.first() {
            None => {
                self.start_line(depth);
                self.out.push_str("[0]");
                Ok(())
            }
            Some(ToonValue::Null) => Err(Error::NullFirstElement),
            Some(ToonValue::Record(first)) if !first.is_empty() => {
                tracing::trace!(rows = items.len(), fields = first.len(), "writing tabular list");
                self.write_table(first, items, depth)
            }
            Some(_) => self.write_nested(items, depth),
        }
    }

    fn write_table(&mut self, first: &ToonMap, items: &[ToonValue], depth: usize) -> Result<()> {
        self.start_line(depth);
        self.out.push('[');
        self.out.push_str(&items.len().to_string());
        for field in first.keys() {
            if !is_header_token(field) {
                return Err(Error::unsupported_type(format!(
                    "field name {field:?} cannot appear in a table header"
                )));
            }
            self.out.push(' ');
            self.out.push_str(field);
        }
        self.out.push(']');

        for (index, item) in items.iter().enumerate() {
            let ToonValue::Record(record) = item else {
                return Err(Error::unsupported_type(format!(
                    "list element {index} is a {}, but the list is tabular",
                    item.kind()
                )));
            };
            self.start_line(depth);
            for (position, field) in first.keys().enumerate() {
                if position > 0 {
                    self.out.push(',');
                }
                let value = record.get(field).unwrap_or(&ToonValue::Null);
                if !value.is_scalar() {
                    return Err(Error::unsupported_type(format!(
                        "{} in tabular field `{field}` of row {index}",
                        value.kind()
                    )));
                }
                write_scalar(&mut self.out, value);
            }
        }
        Ok(())
    }

    fn write_nested(&mut self, items: &[ToonValue], depth: usize) -> Result<()> {
        self.start_line(depth);
        self.out.push('[');
        self.out.push_str(&items.len().to_string());
        self.out.push(']');

        for item in items {
            match item {
                ToonValue::Record(members) | ToonValue::Map(members) => {
                    self.start_line(depth + 1);
                    self.out.push('-');
                    self.write_members(members, depth + 2)?;
                }
                ToonValue::List(inner) => self.write_list(inner, depth + 1)?,
                scalar => {
                    self.start_line(depth + 1);
                    write_scalar(&mut self.out, scalar);
                }
            }
        }
        Ok(())
    }
}

/// Header fields are split on whitespace and are never unquoted.
fn is_header_token(field: &str) -> bool {
    !field.is_empty() && !field.contains(|c: char| c.is_whitespace() || c == '[' || c == ']')
}

fn write_scalar(out: &mut String, value: &ToonValue) {
    match value {
        ToonValue::Null => out.push_str("null"),
        ToonValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        ToonValue::Int(i) => out.push_str(&i.to_string()),
        ToonValue::Float(f) => out.push_str(&f.to_string()),
        ToonValue::String(s) => write_literal(out, s),
        ToonValue::Timestamp(ts) => write_quoted(out, &ts.to_rfc3339()),
        // written as blocks by the callers
        ToonValue::Record(_) | ToonValue::List(_) | ToonValue::Map(_) => {}
    }
}

/// Serializer whose output is a [`ToonValue`] tree.
///
/// Struct members are stored under their wire names; map keys must be
/// scalars and are stringified. Enum variants use the externally tagged
/// shape: a unit variant is its name, any other variant is a single-entry map
/// from the variant name to its content.
pub struct ToonValueSerializer;

pub struct SerializeList {
    items: Vec<ToonValue>,
    variant: Option<&'static str>,
}

pub struct SerializeRecord {
    members: ToonMap,
    variant: Option<&'static str>,
}

pub struct SerializeMap {
    entries: ToonMap,
    pending_key: Option<String>,
}

impl ser::Serializer for ToonValueSerializer {
    type Ok = ToonValue;
    type Error = Error;

    type SerializeSeq = SerializeList;
    type SerializeTuple = SerializeList;
    type SerializeTupleStruct = SerializeList;
    type SerializeTupleVariant = SerializeList;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeRecord;
    type SerializeStructVariant = SerializeRecord;

    fn serialize_bool(self, v: bool) -> Result<ToonValue> {
        Ok(ToonValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<ToonValue> {
        Ok(ToonValue::Int(i64::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<ToonValue> {
        Ok(ToonValue::Int(i64::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<ToonValue> {
        Ok(ToonValue::Int(i64::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<ToonValue> {
        Ok(ToonValue::Int(v))
    }

    fn serialize_u8(self, v: u8) -> Result<ToonValue> {
        Ok(ToonValue::Int(i64::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<ToonValue> {
        Ok(ToonValue::Int(i64::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<ToonValue> {
        Ok(ToonValue::Int(i64::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<ToonValue> {
        i64::try_from(v)
            .map(ToonValue::Int)
            .map_err(|_| Error::unsupported_type(format!("u64 value {v} exceeds the i64 range")))
    }

    fn serialize_f32(self, v: f32) -> Result<ToonValue> {
        // widen through the shortest f32 text so 0.1f32 stays 0.1
        let widened = v.to_string().parse().unwrap_or(f64::from(v));
        Ok(ToonValue::Float(widened))
    }

    fn serialize_f64(self, v: f64) -> Result<ToonValue> {
        Ok(ToonValue::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<ToonValue> {
        Ok(ToonValue::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<ToonValue> {
        Ok(ToonValue::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<ToonValue> {
        Ok(ToonValue::List(
            v.iter().map(|&b| ToonValue::Int(i64::from(b))).collect(),
        ))
    }

    fn serialize_none(self) -> Result<ToonValue> {
        Ok(ToonValue::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<ToonValue>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<ToonValue> {
        Ok(ToonValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<ToonValue> {
        Ok(ToonValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<ToonValue> {
        Ok(ToonValue::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<ToonValue>
    where
        T: ?Sized + Serialize,
    {
        if name == RECORD_TOKEN {
            return match value.serialize(self)? {
                ToonValue::Map(members) => Ok(ToonValue::Record(members)),
                other => Ok(other),
            };
        }
        if name != TIMESTAMP_TOKEN {
            return value.serialize(self);
        }
        match value.serialize(self)? {
            ToonValue::String(text) => Timestamp::parse(&text)
                .map(ToonValue::Timestamp)
                .map_err(|e| Error::custom(format!("invalid timestamp `{text}`: {e}"))),
            other => Err(Error::unsupported_type(format!(
                "timestamp carried as {}",
                other.kind()
            ))),
        }
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<ToonValue>
    where
        T: ?Sized + Serialize,
    {
        Ok(tagged(variant, to_toon_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeList> {
        Ok(SerializeList::new(len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeList> {
        Ok(SerializeList::new(len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeList> {
        Ok(SerializeList::new(len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeList> {
        Ok(SerializeList::new(len, Some(variant)))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            entries: ToonMap::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new(len, None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new(len, Some(variant)))
    }
}

impl SerializeList {
    fn new(len: usize, variant: Option<&'static str>) -> Self {
        SerializeList {
            items: Vec::with_capacity(len),
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.items.push(to_toon_value(value)?);
        Ok(())
    }

    fn finish(self) -> ToonValue {
        let list = ToonValue::List(self.items);
        match self.variant {
            Some(variant) => tagged(variant, list),
            None => list,
        }
    }
}

impl SerializeRecord {
    fn new(len: usize, variant: Option<&'static str>) -> Self {
        SerializeRecord {
            members: ToonMap::with_capacity(len),
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.members
            .insert(wire_name(key).into_owned(), to_toon_value(value)?);
        Ok(())
    }

    fn finish(self) -> ToonValue {
        let record = ToonValue::Record(self.members);
        match self.variant {
            Some(variant) => tagged(variant, record),
            None => record,
        }
    }
}

impl ser::SerializeSeq for SerializeList {
    type Ok = ToonValue;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<ToonValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeList {
    type Ok = ToonValue;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<ToonValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeList {
    type Ok = ToonValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<ToonValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeList {
    type Ok = ToonValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<ToonValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = ToonValue;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = match to_toon_value(key)? {
            ToonValue::String(s) => s,
            ToonValue::Int(i) => i.to_string(),
            ToonValue::Float(f) => f.to_string(),
            ToonValue::Bool(b) => b.to_string(),
            ToonValue::Timestamp(ts) => ts.to_rfc3339(),
            other => {
                return Err(Error::unsupported_type(format!(
                    "map key of kind {}",
                    other.kind()
                )))
            }
        };
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.entries.insert(key, to_toon_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<ToonValue> {
        Ok(ToonValue::Map(self.entries))
    }
}

impl ser::SerializeStruct for SerializeRecord {
    type Ok = ToonValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(key, value)
    }

    fn end(self) -> Result<ToonValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeRecord {
    type Ok = ToonValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(key, value)
    }

    fn end(self) -> Result<ToonValue> {
        Ok(self.finish())
    }
}

fn to_toon_value<T: Serialize + ?Sized>(value: &T) -> Result<ToonValue> {
    value.serialize(ToonValueSerializer)
}

fn tagged(variant: &'static str, content: ToonValue) -> ToonValue {
    let mut map = ToonMap::with_capacity(1);
    map.insert(variant, content);
    ToonValue::Map(map)
}
