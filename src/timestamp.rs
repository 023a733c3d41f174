//! Calendar timestamps.
//!
//! [`Timestamp`] is the scalar kind for points in time. It always encodes as a
//! quoted RFC 3339 string and decodes by parsing RFC 3339, so a malformed value
//! is reported as [`Error::ScalarParse`](crate::Error::ScalarParse) with the
//! line it came from rather than as an opaque custom error.
//!
//! Other formats see a plain string: with `serde_json` a `Timestamp` is just
//! `"2024-01-01T00:00:00Z"`.
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use toon_codec::Timestamp;
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Event {
//!     at: Timestamp,
//! }
//!
//! let event = Event { at: "2024-01-01T00:00:00Z".parse().unwrap() };
//! let toon = toon_codec::to_string(&event).unwrap();
//! assert_eq!(toon, r#"at: "2024-01-01T00:00:00Z""#);
//! assert_eq!(toon_codec::from_str::<Event>(&toon).unwrap(), event);
//! ```

use chrono::{DateTime, FixedOffset, ParseError, SecondsFormat, Utc};
use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Newtype-struct name that marks a timestamp crossing the serde boundary.
///
/// The TOON serializer and deserializer recognize it; every other format sees
/// an ordinary newtype around a string.
pub(crate) const TIMESTAMP_TOKEN: &str = "$toon_codec::private::Timestamp";

/// An offset-aware instant, encoded as RFC 3339.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    #[must_use]
    pub fn new(datetime: DateTime<FixedOffset>) -> Self {
        Timestamp(datetime)
    }

    /// The current time in UTC.
    #[must_use]
    pub fn now() -> Self {
        Timestamp(Utc::now().into())
    }

    /// Parses an RFC 3339 string such as `2024-01-01T00:00:00Z`.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        DateTime::parse_from_rfc3339(s).map(Timestamp)
    }

    /// Formats as RFC 3339 with `Z` for UTC and only as many fractional
    /// digits as the value carries.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    #[must_use]
    pub fn into_datetime(self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// The Unix epoch.
impl Default for Timestamp {
    fn default() -> Self {
        Timestamp(DateTime::<Utc>::default().into())
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(datetime: DateTime<FixedOffset>) -> Self {
        Timestamp(datetime)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Timestamp(datetime.into())
    }
}

impl FromStr for Timestamp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timestamp::parse(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(TIMESTAMP_TOKEN, &self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_newtype_struct(TIMESTAMP_TOKEN, TimestampVisitor)
    }
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an RFC 3339 timestamp")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Timestamp, E> {
        Timestamp::parse(value).map_err(|e| E::custom(format!("invalid timestamp `{value}`: {e}")))
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Timestamp, D::Error> {
        deserializer.deserialize_str(self)
    }
}
