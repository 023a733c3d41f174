//! # toon_codec
//!
//! A Serde-compatible codec for TOON, a compact indentation-based text format
//! that writes lists of records as tables.
//!
//! ## What it looks like
//!
//! A record is one `name: value` line per member. A list of records declares
//! its fields once in a header and contributes one comma-separated row per
//! element:
//!
//! ```text
//! [2 id name email createdAt]
//! 1,Alice,alice@example.com,"2024-01-01T00:00:00Z"
//! 2,Bob,bob@example.com,"2024-01-02T00:00:00Z"
//! ```
//!
//! The grammar is described in [`format`].
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use toon_codec::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user = User { id: 123, name: "Alice".to_string(), active: true };
//!
//! let toon = to_string(&user).unwrap();
//! assert_eq!(toon, "id: 123\nname: Alice\nactive: true");
//!
//! let back: User = from_str(&toon).unwrap();
//! assert_eq!(user, back);
//! ```
//!
//! ### Tabular lists
//!
//! ```rust
//! use serde::Serialize;
//! use toon_codec::to_string;
//!
//! #[derive(Serialize)]
//! struct Product { id: u32, name: String, price: f64 }
//!
//! let products = vec![
//!     Product { id: 1, name: "Widget".to_string(), price: 9.99 },
//!     Product { id: 2, name: "Gadget".to_string(), price: 14.5 },
//! ];
//!
//! assert_eq!(
//!     to_string(&products).unwrap(),
//!     "[2 id name price]\n1,Widget,9.99\n2,Gadget,14.5"
//! );
//! ```
//!
//! ## Member names
//!
//! Struct members are written under their serde name with the first letter
//! lower-cased, so `#[serde(rename = "createdAt")]` and a field literally
//! named `createdAt` both appear as `createdAt`. See [`field`].
//!
//! ## Decoding leniency
//!
//! By default the decoder skips tabular rows with the wrong number of parts
//! and keys that name no member of the destination. Use
//! [`from_str_with_options`] with [`DecodeOptions::strict`] to reject them.
//!
//! ## HTTP service
//!
//! With the default `server` feature the crate also ships a small user CRUD
//! service ([`server`], [`store`]) and the `toon-server` binary, which answer
//! in TOON under `/users` and in JSON under `/json/users`.

pub mod de;
pub mod error;
pub mod field;
pub mod format;
pub mod literal;
pub mod map;
pub mod options;
pub mod ser;
pub mod timestamp;
pub mod value;

#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod store;

pub use de::Deserializer;
pub use error::{Error, Result};
pub use field::FieldResolver;
pub use map::ToonMap;
pub use options::{DecodeMode, DecodeOptions, ToonOptions};
pub use ser::{Encoder, ToonValueSerializer};
pub use timestamp::Timestamp;
pub use value::ToonValue;

use serde::{Deserialize, Serialize};
use std::io;

/// Media type for TOON documents.
pub const CONTENT_TYPE: &str = "application/toon";

/// Serialize any `T: Serialize` to a TOON string.
///
/// # Examples
///
/// ```rust
/// use toon_codec::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let toon = to_string(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(toon, "x: 1\ny: 2");
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for values with no TOON form and
/// [`Error::NullFirstElement`] for a list that starts with `null`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, ToonOptions::default())
}

/// Serialize any `T: Serialize` to a TOON string with custom options.
///
/// # Examples
///
/// ```rust
/// use toon_codec::{to_string_with_options, ToonOptions};
///
/// let toon = to_string_with_options(&vec!["a", "b"], ToonOptions::new().with_indent(1)).unwrap();
/// assert_eq!(toon, "[2]\n a\n b");
/// ```
///
/// # Errors
///
/// Same as [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: ToonOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    Encoder::new(options).encode(&to_value(value)?)
}

/// Convert any `T: Serialize` to a `ToonValue`.
///
/// # Examples
///
/// ```rust
/// use toon_codec::{to_value, ToonValue};
///
/// let value = to_value(&(1, "two")).unwrap();
/// assert_eq!(value, ToonValue::List(vec![ToonValue::Int(1), ToonValue::from("two")]));
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for values with no TOON form.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<ToonValue>
where
    T: ?Sized + Serialize,
{
    value.serialize(ToonValueSerializer)
}

/// Encode a `ToonValue` tree with default options.
///
/// # Errors
///
/// Returns [`Error::NullFirstElement`] for a list that starts with `null` and
/// [`Error::UnsupportedType`] for a tabular list with a non-record element or
/// a composite field.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_value(value: &ToonValue) -> Result<String> {
    Encoder::new(ToonOptions::default()).encode(value)
}

/// Serialize any `T: Serialize` to a writer in TOON format.
///
/// # Examples
///
/// ```rust
/// use toon_codec::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &vec![1, 2]).unwrap();
/// assert_eq!(buffer, b"[2]\n  1\n  2");
/// ```
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, ToonOptions::default())
}

/// Serialize any `T: Serialize` to a writer in TOON format with custom options.
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: ToonOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let toon = to_string_with_options(value, options)?;
    writer
        .write_all(toon.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))
}

/// Deserialize an instance of type `T` from a string of TOON text.
///
/// # Examples
///
/// ```rust
/// use toon_codec::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x: 1\ny: 2").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the header is malformed, a row count disagrees, a
/// scalar fails to parse, or `T` does not have the shape of the document.
/// Errors carry the 1-based line they refer to.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<'a, T>(s: &'a str) -> Result<T>
where
    T: Deserialize<'a>,
{
    from_str_with_options(s, DecodeOptions::default())
}

/// Deserialize an instance of type `T` from TOON text with custom options.
///
/// # Examples
///
/// ```rust
/// use toon_codec::{from_str_with_options, DecodeOptions, Error};
/// use std::collections::HashMap;
///
/// let result: Result<HashMap<String, i32>, Error> =
///     from_str_with_options("[1 a b]\n1", DecodeOptions::strict());
/// assert!(result.is_err());
/// ```
///
/// # Errors
///
/// Same as [`from_str`], plus the strict-mode errors
/// [`Error::FieldCountMismatch`] and [`Error::UnknownField`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options<'a, T>(s: &'a str, options: DecodeOptions) -> Result<T>
where
    T: Deserialize<'a>,
{
    let deserializer = Deserializer::with_options(s, options)?;
    T::deserialize(deserializer)
}

/// Deserialize an instance of type `T` from an I/O stream of TOON.
///
/// # Examples
///
/// ```rust
/// use toon_codec::from_reader;
/// use serde::Deserialize;
/// use std::io::Cursor;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_reader(Cursor::new(b"x: 1\ny: 2")).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or the text does not decode into `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: for<'de> Deserialize<'de>,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Deserialize an instance of type `T` from bytes of TOON text.
///
/// # Examples
///
/// ```rust
/// use toon_codec::from_slice;
///
/// let names: Vec<String> = from_slice(b"[2]\n  Ada\n  Grace").unwrap();
/// assert_eq!(names, ["Ada", "Grace"]);
/// ```
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8 or do not decode into `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<'a, T>(v: &'a [u8]) -> Result<T>
where
    T: Deserialize<'a>,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
    }

    fn alice() -> User {
        User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
        }
    }

    #[test]
    fn test_serialize_deserialize_point() {
        let point = Point { x: 1, y: 2 };
        let toon = to_string(&point).unwrap();
        let point_back: Point = from_str(&toon).unwrap();
        assert_eq!(point, point_back);
    }

    #[test]
    fn test_serialize_deserialize_user() {
        let toon = to_string(&alice()).unwrap();
        assert_eq!(
            toon,
            "id: 123\nname: Alice\nactive: true\ntags:\n  [2]\n    admin\n    user"
        );
        let user_back: User = from_str(&toon).unwrap();
        assert_eq!(alice(), user_back);
    }

    #[test]
    fn test_wide_indent_round_trips() {
        let toon = to_string_with_options(&alice(), ToonOptions::new().with_indent(4)).unwrap();
        let user_back: User = from_str(&toon).unwrap();
        assert_eq!(alice(), user_back);
    }

    #[test]
    fn test_to_value() {
        let value = to_value(&Point { x: 1, y: 2 }).unwrap();
        let record = value.as_record().expect("struct becomes a record");
        assert_eq!(record.get("x"), Some(&ToonValue::Int(1)));
        assert_eq!(record.get("y"), Some(&ToonValue::Int(2)));
    }

    #[test]
    fn test_arrays() {
        let numbers = vec![1, 2, 3, 4, 5];
        let toon = to_string(&numbers).unwrap();
        let numbers_back: Vec<i32> = from_str(&toon).unwrap();
        assert_eq!(numbers, numbers_back);
    }

    #[test]
    fn test_writer_and_reader() {
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &alice()).unwrap();
        let user: User = from_reader(buffer.as_slice()).unwrap();
        assert_eq!(user, alice());
    }

    #[test]
    fn test_from_slice_rejects_invalid_utf8() {
        let result: Result<String> = from_slice(&[0xff, 0xfe]);
        assert!(matches!(result, Err(Error::Custom(_))));
    }
}
