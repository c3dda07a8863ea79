//! Persisted key-value storage, injected as a capability.
//!
//! The dashboard keeps its session in origin-scoped browser storage (token,
//! role, login instant) and in cookies. Both are modelled by the same
//! [`KeyValueStore`] trait so a binding can plug in the real thing and
//! tests can use [`MemoryStore`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rubikview_protocol::LOGIN_TIMESTAMP_KEY;
use tracing::warn;

use crate::{StoreError, Timestamp};

/// String-to-string storage with the four operations the session layer
/// needs.
///
/// Methods take `&self`: real backends (browser storage, a cookie jar) are
/// shared handles, and the in-memory store uses interior mutability.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Reads a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Every key currently present, in no particular order.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        (**self).keys()
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// A process-local [`KeyValueStore`].
///
/// Cloning is cheap and every clone sees the same entries, like two tabs
/// sharing one origin's storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with `entries`.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: Arc::new(Mutex::new(map)),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A poisoned lock means a writer panicked mid-update; the contents
    /// can't be trusted, so report the store as unavailable.
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Login timestamp
// ---------------------------------------------------------------------------

/// Reads the persisted login instant.
///
/// A value that doesn't parse as epoch milliseconds is treated as absent,
/// so the next initialize re-stamps it instead of tracking garbage.
pub fn load_login_timestamp<S: KeyValueStore + ?Sized>(
    store: &S,
) -> Result<Option<Timestamp>, StoreError> {
    let Some(raw) = store.get(LOGIN_TIMESTAMP_KEY)? else {
        return Ok(None);
    };
    match raw.parse::<Timestamp>() {
        Ok(ts) => Ok(Some(ts)),
        Err(e) => {
            warn!(value = %raw, error = %e, "ignoring malformed login timestamp");
            Ok(None)
        }
    }
}

/// Persists `at` as the login instant.
pub fn stamp_login<S: KeyValueStore + ?Sized>(store: &S, at: Timestamp) -> Result<(), StoreError> {
    store.set(LOGIN_TIMESTAMP_KEY, &at.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("token").unwrap(), None);

        store.set("token", "abc").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("abc"));

        store.remove("token").unwrap();
        assert_eq!(store.get("token").unwrap(), None);
        // Removing again is fine.
        store.remove("token").unwrap();
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let a = MemoryStore::new();
        let b = a.clone();

        a.set("role", "admin").unwrap();

        assert_eq!(b.get("role").unwrap().as_deref(), Some("admin"));
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_memory_store_keys_lists_everything() {
        let store = MemoryStore::with_entries([("a", "1"), ("b", "2")]);
        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_arc_store_forwards() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_load_login_timestamp_absent_is_none() {
        let store = MemoryStore::new();
        assert_eq!(load_login_timestamp(&store).unwrap(), None);
    }

    #[test]
    fn test_stamp_then_load_login_timestamp() {
        let store = MemoryStore::new();
        stamp_login(&store, Timestamp(1_700_000_000_000)).unwrap();

        assert_eq!(
            store.get(LOGIN_TIMESTAMP_KEY).unwrap().as_deref(),
            Some("1700000000000")
        );
        assert_eq!(
            load_login_timestamp(&store).unwrap(),
            Some(Timestamp(1_700_000_000_000))
        );
    }

    #[test]
    fn test_load_login_timestamp_malformed_is_none() {
        let store = MemoryStore::with_entries([(LOGIN_TIMESTAMP_KEY, "yesterday")]);
        assert_eq!(load_login_timestamp(&store).unwrap(), None);
    }
}
