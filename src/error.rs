//! Error types for TOON encoding and decoding.
//!
//! Every fatal condition aborts the current call and is reported as a single
//! [`Error`] that names the offending line (1-based) where one exists.
//!
//! ## Error Categories
//!
//! - **Encode errors**: [`Error::UnsupportedType`], [`Error::NullFirstElement`]
//! - **Grammar errors**: [`Error::MalformedHeader`], [`Error::RowCountMismatch`],
//!   [`Error::Syntax`]
//! - **Coercion errors**: [`Error::ScalarParse`], [`Error::DestinationType`]
//! - **Strict-mode errors**: [`Error::FieldCountMismatch`], [`Error::UnknownField`]
//!
//! Lenient conditions (a tabular row with the wrong number of parts, an unknown
//! field name) are not errors in the default decode mode; they are skipped and
//! logged at `debug` level.
//!
//! ## Examples
//!
//! ```rust
//! use toon_codec::{from_str, Error};
//!
//! let result: Result<Vec<i64>, Error> = from_str("[two]\n  1\n  2");
//! assert!(matches!(result, Err(Error::MalformedHeader { line: 1, .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur during TOON encoding/decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// A value kind with no text form was encountered while encoding
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// A list whose first element is null; tabular detection would be ambiguous
    #[error("Cannot encode list: first element is null, tabular layout is ambiguous")]
    NullFirstElement,

    /// Array header is missing a bracket or has a non-numeric count
    #[error("Malformed array header at line {line}: {msg}")]
    MalformedHeader { line: usize, msg: String },

    /// The header's count token disagrees with the rows that follow it
    #[error("Row count mismatch at line {line}: header declares {declared} rows, found {found}")]
    RowCountMismatch {
        line: usize,
        declared: usize,
        found: usize,
    },

    /// A tabular row has the wrong number of parts (strict mode only)
    #[error("Field count mismatch at line {line}: header declares {expected} fields, row has {found}")]
    FieldCountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A key that does not resolve to a destination member (strict mode only)
    #[error("Unknown field `{name}` at line {line}")]
    UnknownField { line: usize, name: String },

    /// An integer, float, bool or timestamp literal that does not parse
    #[error("Invalid {expected} literal at line {line}: `{found}`")]
    ScalarParse {
        line: usize,
        expected: String,
        found: String,
    },

    /// The destination type does not have the shape of the decoded text
    #[error("Type mismatch at line {line}: expected {expected}, found {found}")]
    DestinationType {
        line: usize,
        expected: String,
        found: String,
    },

    /// Content that fits no production of the grammar
    #[error("Syntax error at line {line}: {msg}")]
    Syntax { line: usize, msg: String },

    /// Custom error raised through serde
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates an unsupported type error for values that have no TOON text form.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_codec::Error;
    ///
    /// let err = Error::unsupported_type("u64 value 18446744073709551615 exceeds i64");
    /// assert!(err.to_string().starts_with("Unsupported type"));
    /// ```
    pub fn unsupported_type(msg: impl Into<String>) -> Self {
        Error::UnsupportedType(msg.into())
    }

    pub fn malformed_header(line: usize, msg: impl Into<String>) -> Self {
        Error::MalformedHeader {
            line,
            msg: msg.into(),
        }
    }

    pub fn row_count_mismatch(line: usize, declared: usize, found: usize) -> Self {
        Error::RowCountMismatch {
            line,
            declared,
            found,
        }
    }

    pub fn field_count_mismatch(line: usize, expected: usize, found: usize) -> Self {
        Error::FieldCountMismatch {
            line,
            expected,
            found,
        }
    }

    pub fn unknown_field(line: usize, name: &str) -> Self {
        Error::UnknownField {
            line,
            name: name.to_string(),
        }
    }

    /// Creates a scalar parse error for a literal that failed coercion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_codec::Error;
    ///
    /// let err = Error::scalar_parse(3, "i64", "abc");
    /// assert_eq!(err.to_string(), "Invalid i64 literal at line 3: `abc`");
    /// ```
    pub fn scalar_parse(line: usize, expected: &str, found: &str) -> Self {
        Error::ScalarParse {
            line,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn destination_type(line: usize, expected: &str, found: &str) -> Self {
        Error::DestinationType {
            line,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn syntax(line: usize, msg: impl Into<String>) -> Self {
        Error::Syntax {
            line,
            msg: msg.into(),
        }
    }

    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the 1-based input line the error refers to, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::MalformedHeader { line, .. }
            | Error::RowCountMismatch { line, .. }
            | Error::FieldCountMismatch { line, .. }
            | Error::UnknownField { line, .. }
            | Error::ScalarParse { line, .. }
            | Error::DestinationType { line, .. }
            | Error::Syntax { line, .. } => Some(*line),
            Error::Io(_)
            | Error::UnsupportedType(_)
            | Error::NullFirstElement
            | Error::Custom(_) => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
