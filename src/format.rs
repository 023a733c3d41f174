//! The TOON text grammar as read and written by this crate.
//!
//! This module only carries documentation; the examples below are compiled
//! and run as doctests.
//!
//! # Lines
//!
//! A document is a sequence of `\n`-separated lines. Blank lines are ignored.
//! Each line's indentation (leading spaces or tabs) decides which block it
//! belongs to; the encoder indents by [`ToonOptions::indent`](crate::ToonOptions)
//! spaces per level (2 by default). Trailing `\r` is ignored, so CRLF input
//! decodes the same as LF input. The encoder never writes a trailing newline.
//!
//! ```text
//! document   := array | object | scalar
//! object     := { line }              ; line = name ":" [ value ]
//! array      := header { row }
//! header     := "[" count { ws field } "]"
//! row        := value { "," value }
//! ```
//!
//! # Scalars
//!
//! | Kind | Written as | Example |
//! |------|------------|---------|
//! | Null | `null` | `nickname: null` |
//! | Boolean | `true` / `false` | `active: true` |
//! | Integer | decimal, optional `-` | `count: -42` |
//! | Float | shortest decimal that reads back exactly | `price: 9.99`, `ratio: 2` |
//! | String | bare, or quoted when ambiguous | `name: Alice`, `city: "New York"` |
//! | Timestamp | quoted RFC 3339 | `createdAt: "2024-01-01T00:00:00Z"` |
//!
//! When decoding, booleans also accept `1`, `0`, `t`, `f`, `T`, `F`, `TRUE`,
//! `FALSE`, `True` and `False`.
//!
//! ## Strings
//!
//! A string is quoted when it is empty, equals `true`, `false` or `null`,
//! starts with `-`, parses as a number, or contains a space, tab, newline,
//! carriage return, `,`, `:`, `[`, `]`, `{`, `}` or `"`. Quoted strings escape
//! `\`, `"`, newline, carriage return and tab; nothing else is escaped.
//! See [`literal`](crate::literal).
//!
//! ```rust
//! let toon = toon_codec::to_string(&vec!["plain", "two words", "42", ""]).unwrap();
//! assert_eq!(toon, "[4]\n  plain\n  \"two words\"\n  \"42\"\n  \"\"");
//! ```
//!
//! # Objects
//!
//! Records (structs) and maps write one `name: value` line per member. A
//! member whose value is a record, map or list writes `name:` with nothing
//! after the colon and continues one level deeper.
//!
//! ```rust
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Address { city: String }
//!
//! #[derive(Serialize)]
//! struct Person { name: String, address: Address }
//!
//! let person = Person {
//!     name: "Ada".into(),
//!     address: Address { city: "London".into() },
//! };
//! assert_eq!(
//!     toon_codec::to_string(&person).unwrap(),
//!     "name: Ada\naddress:\n  city: London"
//! );
//! ```
//!
//! # Arrays
//!
//! Every list starts with a header in brackets whose first token is the
//! element count. The count must match the number of elements that follow;
//! a disagreement is a [`RowCountMismatch`](crate::Error::RowCountMismatch).
//!
//! ## Tabular
//!
//! When the first element is a record, the header lists its field names and
//! each element is one row of comma-separated scalars, in header order. The
//! header and its rows share an indentation level.
//!
//! ```text
//! [2 sku qty]
//! A-1,2
//! B-2,1
//! ```
//!
//! ## Nested
//!
//! Any other list has a bare `[count]` header and writes its elements one
//! level deeper: scalars on their own line, lists as their own header, and
//! records or maps under a lone `-` line.
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! let mut entry = BTreeMap::new();
//! entry.insert("k", 1);
//! let toon = toon_codec::to_string(&vec![entry]).unwrap();
//! assert_eq!(toon, "[1]\n  -\n    k: 1");
//!
//! let nested = toon_codec::to_string(&vec![vec![1, 2], vec![]]).unwrap();
//! assert_eq!(nested, "[2]\n  [2]\n    1\n    2\n  [0]");
//! ```
//!
//! # Limits
//!
//! - A tabular row holds scalars only; a record with a list member inside a
//!   tabular list is an [`UnsupportedType`](crate::Error::UnsupportedType)
//!   error.
//! - A list whose first element is `null` cannot be encoded
//!   ([`NullFirstElement`](crate::Error::NullFirstElement)).
//! - Integers are limited to the `i64` range.
