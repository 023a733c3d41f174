//! Wire names for record members.
//!
//! A record's members are known at compile time: serde's derive emits them in
//! declaration order as the keys passed to `serialize_field` and as the
//! `fields` table passed to `deserialize_struct`. Explicit renames
//! (`#[serde(rename = "...")]`) are already applied in that table, so the only
//! transformation left is lower-casing the first character.
//!
//! ```rust
//! use toon_codec::field::{wire_name, FieldResolver};
//!
//! assert_eq!(wire_name("UserID"), "userID");
//! assert_eq!(wire_name("createdAt"), "createdAt");
//!
//! let resolver = FieldResolver::new(&["Name", "email"]);
//! assert_eq!(resolver.resolve("name"), Some("Name"));
//! assert_eq!(resolver.resolve("phone"), None);
//! ```

use indexmap::IndexMap;
use std::borrow::Cow;

/// Returns the wire name for a declared member name.
///
/// Lower-cases the first character and leaves the rest untouched. Names that
/// already start with a lower-case letter, a digit or `_` are borrowed.
#[must_use]
pub fn wire_name(declared: &str) -> Cow<'_, str> {
    let mut chars = declared.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let mut name = String::with_capacity(declared.len());
            name.extend(first.to_lowercase());
            name.push_str(chars.as_str());
            Cow::Owned(name)
        }
        _ => Cow::Borrowed(declared),
    }
}

/// Maps wire names back to the declared member names of one record type.
///
/// Member order is preserved, so [`FieldResolver::wire_names`] yields the
/// same sequence the encoder writes into a tabular header.
#[derive(Debug, Clone)]
pub struct FieldResolver {
    by_wire: IndexMap<String, &'static str>,
}

impl FieldResolver {
    /// Builds the lookup from a type's ordered member table.
    #[must_use]
    pub fn new(fields: &'static [&'static str]) -> Self {
        let by_wire = fields
            .iter()
            .map(|&declared| (wire_name(declared).into_owned(), declared))
            .collect();
        FieldResolver { by_wire }
    }

    /// Returns the declared member name for `wire`, if the type has one.
    #[must_use]
    pub fn resolve(&self, wire: &str) -> Option<&'static str> {
        self.by_wire.get(wire).copied()
    }

    /// Wire names in declaration order.
    pub fn wire_names(&self) -> impl Iterator<Item = &str> {
        self.by_wire.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_wire.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_wire.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_name_lowers_first_char_only() {
        assert_eq!(wire_name("Name"), "name");
        assert_eq!(wire_name("CreatedAt"), "createdAt");
        assert_eq!(wire_name("ID"), "iD");
        assert_eq!(wire_name("Étage"), "étage");
    }

    #[test]
    fn test_wire_name_is_idempotent() {
        for name in ["id", "Name", "createdAt", "_private", "9lives", ""] {
            let once = wire_name(name).into_owned();
            assert_eq!(wire_name(&once), once);
        }
    }

    #[test]
    fn test_resolver_preserves_order() {
        static FIELDS: &[&str] = &["id", "Name", "Email", "createdAt"];
        let resolver = FieldResolver::new(FIELDS);
        let names: Vec<_> = resolver.wire_names().collect();
        assert_eq!(names, ["id", "name", "email", "createdAt"]);
        assert_eq!(resolver.len(), 4);
    }

    #[test]
    fn test_resolver_is_case_sensitive_after_first_char() {
        let resolver = FieldResolver::new(&["createdAt"]);
        assert_eq!(resolver.resolve("createdAt"), Some("createdAt"));
        assert_eq!(resolver.resolve("createdat"), None);
        assert_eq!(resolver.resolve("CreatedAt"), None);
    }
}
