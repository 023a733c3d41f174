//! Ordered member storage for records and maps.
//!
//! Record members must come out in declaration order, both as `name: value`
//! lines and as the field tokens of a tabular header. [`ToonMap`] keeps
//! insertion order (it wraps [`IndexMap`]) so the order the serializer sees is
//! the order the encoder writes.
//!
//! ```rust
//! use toon_codec::{ToonMap, ToonValue};
//!
//! let mut members = ToonMap::new();
//! members.insert("sku", "A-1");
//! members.insert("qty", 3);
//!
//! let names: Vec<&str> = members.keys().collect();
//! assert_eq!(names, ["sku", "qty"]);
//! assert_eq!(members.get("qty"), Some(&ToonValue::Int(3)));
//! ```

use crate::ToonValue;
use indexmap::IndexMap;

/// Insertion-ordered `String → ToonValue` map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToonMap(IndexMap<String, ToonValue>);

impl ToonMap {
    #[must_use]
    pub fn new() -> Self {
        ToonMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ToonMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a member, returning the previous value under that name.
    ///
    /// Re-inserting an existing name keeps its original position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ToonValue>,
    ) -> Option<ToonValue> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ToonValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ToonValue> {
        self.0.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a member, shifting later members down to keep order.
    pub fn remove(&mut self, key: &str) -> Option<ToonValue> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, ToonValue> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ToonValue> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a ToonMap {
    type Item = (&'a String, &'a ToonValue);
    type IntoIter = indexmap::map::Iter<'a, String, ToonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ToonMap {
    type Item = (String, ToonValue);
    type IntoIter = indexmap::map::IntoIter<String, ToonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>, V: Into<ToonValue>> FromIterator<(K, V)> for ToonMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        ToonMap(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reinsert_keeps_position() {
        let mut map: ToonMap = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(map.insert("a", 10), Some(ToonValue::Int(1)));
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut map: ToonMap = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        map.remove("b");
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, ["a", "c"]);
    }
}
