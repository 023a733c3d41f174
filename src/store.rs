//! In-memory user records for the HTTP service.
//!
//! [`UserStore`] is the only shared mutable state in the crate. One
//! `RwLock` guards the whole table: readers run concurrently, writers are
//! serialized, and nobody sees a half-applied write. A poisoned lock is
//! recovered rather than propagated, since every write leaves the table
//! consistent before anything that could panic runs.

use crate::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A user as stored and as sent over the wire.
///
/// Every member has a default so that clients may omit `id` and `createdAt`
/// when creating a user; the store assigns both.
///
/// ```rust
/// use toon_codec::store::User;
///
/// let user = User::new("Alice", "alice@example.com");
/// let toon = toon_codec::to_string(&user).unwrap();
/// assert!(toon.starts_with("id: 0\nname: Alice\nemail: alice@example.com\ncreatedAt: "));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: Timestamp,
}

impl User {
    /// A user that has not been stored yet.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        User {
            id: 0,
            name: name.into(),
            email: email.into(),
            created_at: Timestamp::default(),
        }
    }
}

#[derive(Debug)]
struct Table {
    users: BTreeMap<i64, User>,
    next_id: i64,
}

/// Thread-safe user table with sequential ids starting at 1.
#[derive(Debug)]
pub struct UserStore {
    table: RwLock<Table>,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore {
    pub fn new() -> Self {
        UserStore {
            table: RwLock::new(Table {
                users: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// A store holding the two demo users, Alice and Bob.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.create(User::new("Alice", "alice@example.com"));
        store.create(User::new("Bob", "bob@example.com"));
        store
    }

    fn read(&self) -> RwLockReadGuard<'_, Table> {
        match self.table.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("user store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table> {
        match self.table.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("user store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// All users, ordered by id.
    pub fn get_all(&self) -> Vec<User> {
        self.read().users.values().cloned().collect()
    }

    pub fn get(&self, id: i64) -> Option<User> {
        self.read().users.get(&id).cloned()
    }

    /// Stores `user` under the next id and stamps its creation time.
    ///
    /// Any `id` or `createdAt` sent by the client is ignored.
    pub fn create(&self, mut user: User) -> User {
        let mut table = self.write();
        user.id = table.next_id;
        user.created_at = Timestamp::now();
        table.next_id += 1;
        table.users.insert(user.id, user.clone());
        tracing::debug!(id = user.id, "created user");
        user
    }

    /// Replaces the user stored under `id`, or returns `None` if there is none.
    ///
    /// The id comes from `id`, not from the payload, and the stored creation
    /// time is kept.
    pub fn update(&self, id: i64, mut user: User) -> Option<User> {
        let mut table = self.write();
        let existing = table.users.get_mut(&id)?;
        user.id = id;
        user.created_at = existing.created_at;
        *existing = user.clone();
        tracing::debug!(id, "updated user");
        Some(user)
    }

    /// Removes the user stored under `id`, reporting whether one existed.
    pub fn delete(&self, id: i64) -> bool {
        let removed = self.write().users.remove(&id).is_some();
        if removed {
            tracing::debug!(id, "deleted user");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.read().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_ids_are_sequential_from_one() {
        let store = UserStore::new();
        let a = store.create(User::new("A", "a@example.com"));
        let b = store.create(User::new("B", "b@example.com"));
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(store.get_all(), vec![a, b]);
    }

    #[test]
    fn test_create_ignores_client_id() {
        let store = UserStore::new();
        let mut user = User::new("A", "a@example.com");
        user.id = 99;
        assert_eq!(store.create(user).id, 1);
        assert!(store.get(99).is_none());
    }

    #[test]
    fn test_update_keeps_creation_time() {
        let store = UserStore::seeded();
        let before = store.get(1).unwrap();
        let updated = store
            .update(1, User::new("Alicia", "alicia@example.com"))
            .unwrap();
        assert_eq!(updated.id, 1);
        assert_eq!(updated.name, "Alicia");
        assert_eq!(updated.created_at, before.created_at);
        assert_eq!(store.get(1), Some(updated));
    }

    #[test]
    fn test_update_and_delete_missing() {
        let store = UserStore::new();
        assert!(store.update(5, User::default()).is_none());
        assert!(!store.delete(5));
    }

    #[test]
    fn test_delete_does_not_reuse_ids() {
        let store = UserStore::seeded();
        assert!(store.delete(2));
        let carol = store.create(User::new("Carol", "carol@example.com"));
        assert_eq!(carol.id, 3);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_concurrent_writers_and_readers() {
        let store = Arc::new(UserStore::new());
        let writers: Vec<_> = (0..8)
            .map(|n| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..25 {
                        store.create(User::new(format!("user-{n}-{i}"), "x@example.com"));
                    }
                })
            })
            .collect();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..50 {
                        let users = store.get_all();
                        // ids are dense: a reader never sees a gap from a partial write
                        for (index, user) in users.iter().enumerate() {
                            assert_eq!(user.id, index as i64 + 1);
                        }
                    }
                })
            })
            .collect();
        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 200);
    }

    #[test]
    fn test_recovers_from_poisoned_lock() {
        let store = Arc::new(UserStore::seeded());
        let poisoner = Arc::clone(&store);
        let _ = thread::spawn(move || {
            let _guard = poisoner.write();
            panic!("poison the lock");
        })
        .join();
        assert_eq!(store.len(), 2);
        assert!(store.delete(1));
    }
}
