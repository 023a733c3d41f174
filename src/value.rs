//! Dynamic value representation for TOON data.
//!
//! [`ToonValue`] is the closed set of kinds the encoder understands. Typed data
//! reaches it through [`to_value`](crate::to_value); the encoder then walks the
//! tree and picks the nested or tabular layout per list.
//!
//! ## Records and maps
//!
//! Both hold ordered `name → value` members, but they encode differently:
//!
//! - [`ToonValue::Record`] comes from a struct. Its member names are wire
//!   names, and a list whose first element is a record is written as a table.
//! - [`ToonValue::Map`] comes from a map type, and a list of maps uses the
//!   nested layout.
//!
//! Names and keys are quoted like any other string when needed.
//!
//! ```rust
//! use serde::Serialize;
//! use toon_codec::{to_value, ToonValue};
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! let value = to_value(&Point { x: 10, y: 20 }).unwrap();
//! let record = value.as_record().unwrap();
//! assert_eq!(record.get("x"), Some(&ToonValue::Int(10)));
//! ```
//!
//! Decoding into `ToonValue` infers kinds from the literals: `null`, booleans,
//! integers and floats are recognized when bare, everything else is a string.
//! Decoded objects become [`ToonValue::Map`].
//!
//! ```rust
//! use toon_codec::ToonValue;
//!
//! let value: ToonValue = toon_codec::from_str("id: 7\nname: \"7\"").unwrap();
//! let map = value.as_map().unwrap();
//! assert_eq!(map.get("id"), Some(&ToonValue::Int(7)));
//! assert_eq!(map.get("name"), Some(&ToonValue::String("7".into())));
//! ```

use crate::{Timestamp, ToonMap};
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Newtype name that marks a serialized [`ToonValue::Record`], so the value
/// serializer can tell it apart from a map.
pub(crate) const RECORD_TOKEN: &str = "$toon_codec::private::Record";

/// A dynamically-typed TOON value.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum ToonValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Timestamp(Timestamp),
    Record(ToonMap),
    List(Vec<ToonValue>),
    Map(ToonMap),
}

impl ToonValue {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, ToonValue::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self, ToonValue::Record(_))
    }

    /// Returns `true` for every kind that encodes on a single line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_codec::ToonValue;
    ///
    /// assert!(ToonValue::from("x").is_scalar());
    /// assert!(ToonValue::Null.is_scalar());
    /// assert!(!ToonValue::List(vec![]).is_scalar());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(
            self,
            ToonValue::Record(_) | ToonValue::List(_) | ToonValue::Map(_)
        )
    }

    /// Short name of the value's kind, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            ToonValue::Null => "null",
            ToonValue::Bool(_) => "bool",
            ToonValue::Int(_) => "integer",
            ToonValue::Float(_) => "float",
            ToonValue::String(_) => "string",
            ToonValue::Timestamp(_) => "timestamp",
            ToonValue::Record(_) => "record",
            ToonValue::List(_) => "list",
            ToonValue::Map(_) => "map",
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ToonValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ToonValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ToonValue::Int(i) => Some(*i as f64),
            ToonValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ToonValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<&Timestamp> {
        match self {
            ToonValue::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&ToonMap> {
        match self {
            ToonValue::Record(members) => Some(members),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&Vec<ToonValue>> {
        match self {
            ToonValue::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&ToonMap> {
        match self {
            ToonValue::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

/// Writes the TOON encoding with default options.
///
/// Values that cannot be encoded (see [`encode_value`](crate::encode_value))
/// report a formatting error.
impl fmt::Display for ToonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = crate::encode_value(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Records serialize as maps, so a `ToonValue` can be handed to any serde
/// format. [`to_value`](crate::to_value) still sees them as records.
impl Serialize for ToonValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ToonValue::Null => serializer.serialize_unit(),
            ToonValue::Bool(b) => serializer.serialize_bool(*b),
            ToonValue::Int(i) => serializer.serialize_i64(*i),
            ToonValue::Float(f) => serializer.serialize_f64(*f),
            ToonValue::String(s) => serializer.serialize_str(s),
            ToonValue::Timestamp(ts) => ts.serialize(serializer),
            ToonValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ToonValue::Record(members) => {
                serializer.serialize_newtype_struct(RECORD_TOKEN, &Members(members))
            }
            ToonValue::Map(members) => Members(members).serialize(serializer),
        }
    }
}

struct Members<'a>(&'a ToonMap);

impl Serialize for Members<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ToonValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ToonValueVisitor)
    }
}

struct ToonValueVisitor;

impl<'de> Visitor<'de> for ToonValueVisitor {
    type Value = ToonValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any TOON value")
    }

    fn visit_bool<E>(self, value: bool) -> Result<ToonValue, E> {
        Ok(ToonValue::Bool(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<ToonValue, E> {
        Ok(ToonValue::Int(value))
    }

    fn visit_u64<E>(self, value: u64) -> Result<ToonValue, E> {
        Ok(match i64::try_from(value) {
            Ok(i) => ToonValue::Int(i),
            Err(_) => ToonValue::Float(value as f64),
        })
    }

    fn visit_f64<E>(self, value: f64) -> Result<ToonValue, E> {
        Ok(ToonValue::Float(value))
    }

    fn visit_str<E>(self, value: &str) -> Result<ToonValue, E> {
        Ok(ToonValue::String(value.to_string()))
    }

    fn visit_string<E>(self, value: String) -> Result<ToonValue, E> {
        Ok(ToonValue::String(value))
    }

    fn visit_unit<E>(self) -> Result<ToonValue, E> {
        Ok(ToonValue::Null)
    }

    fn visit_none<E>(self) -> Result<ToonValue, E> {
        Ok(ToonValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<ToonValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<ToonValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ToonValue::List(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<ToonValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = ToonMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, ToonValue>()? {
            entries.insert(key, value);
        }
        Ok(ToonValue::Map(entries))
    }
}

impl TryFrom<ToonValue> for i64 {
    type Error = crate::Error;

    fn try_from(value: ToonValue) -> crate::Result<Self> {
        match value {
            ToonValue::Int(i) => Ok(i),
            other => Err(mismatch("integer", &other)),
        }
    }
}

impl TryFrom<ToonValue> for f64 {
    type Error = crate::Error;

    fn try_from(value: ToonValue) -> crate::Result<Self> {
        value.as_f64().ok_or_else(|| mismatch("float", &value))
    }
}

impl TryFrom<ToonValue> for bool {
    type Error = crate::Error;

    fn try_from(value: ToonValue) -> crate::Result<Self> {
        value.as_bool().ok_or_else(|| mismatch("bool", &value))
    }
}

impl TryFrom<ToonValue> for String {
    type Error = crate::Error;

    fn try_from(value: ToonValue) -> crate::Result<Self> {
        match value {
            ToonValue::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

fn mismatch(expected: &str, found: &ToonValue) -> crate::Error {
    de::Error::custom(format_args!("expected {expected}, found {}", found.kind()))
}

impl From<bool> for ToonValue {
    fn from(value: bool) -> Self {
        ToonValue::Bool(value)
    }
}

impl From<i32> for ToonValue {
    fn from(value: i32) -> Self {
        ToonValue::Int(i64::from(value))
    }
}

impl From<i64> for ToonValue {
    fn from(value: i64) -> Self {
        ToonValue::Int(value)
    }
}

impl From<u32> for ToonValue {
    fn from(value: u32) -> Self {
        ToonValue::Int(i64::from(value))
    }
}

impl From<f64> for ToonValue {
    fn from(value: f64) -> Self {
        ToonValue::Float(value)
    }
}

impl From<String> for ToonValue {
    fn from(value: String) -> Self {
        ToonValue::String(value)
    }
}

impl From<&str> for ToonValue {
    fn from(value: &str) -> Self {
        ToonValue::String(value.to_string())
    }
}

impl From<Timestamp> for ToonValue {
    fn from(value: Timestamp) -> Self {
        ToonValue::Timestamp(value)
    }
}

impl From<Vec<ToonValue>> for ToonValue {
    fn from(value: Vec<ToonValue>) -> Self {
        ToonValue::List(value)
    }
}

impl<T: Into<ToonValue>> From<Option<T>> for ToonValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ToonValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tryfrom_extracts_matching_kind() {
        assert_eq!(i64::try_from(ToonValue::Int(42)).unwrap(), 42);
        assert_eq!(f64::try_from(ToonValue::Int(2)).unwrap(), 2.0);
        assert!(bool::try_from(ToonValue::Bool(true)).unwrap());
        assert_eq!(String::try_from(ToonValue::from("hi")).unwrap(), "hi");
    }

    #[test]
    fn test_tryfrom_reports_kind() {
        let err = i64::try_from(ToonValue::from("x")).unwrap_err();
        assert_eq!(err.to_string(), "Error: expected integer, found string");
        assert!(String::try_from(ToonValue::Int(1)).is_err());
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(ToonValue::from(None::<i64>), ToonValue::Null);
        assert_eq!(ToonValue::from(Some("a")), ToonValue::String("a".into()));
    }

    #[test]
    fn test_record_serializes_as_json_object() {
        let mut members = ToonMap::new();
        members.insert("id", 1);
        members.insert("name", "Alice");
        let json = serde_json::to_string(&ToonValue::Record(members)).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"Alice"}"#);
    }

    #[test]
    fn test_from_json() {
        let value: ToonValue = serde_json::from_str(r#"{"a":[1,2.5,null,"x"]}"#).unwrap();
        let list = value.as_map().unwrap().get("a").unwrap().as_list().unwrap();
        assert_eq!(
            list,
            &vec![
                ToonValue::Int(1),
                ToonValue::Float(2.5),
                ToonValue::Null,
                ToonValue::String("x".into())
            ]
        );
    }

    #[test]
    fn test_display_uses_encoding() {
        assert_eq!(ToonValue::from("two words").to_string(), "\"two words\"");
        assert_eq!(ToonValue::List(vec![]).to_string(), "[0]");
    }
}
