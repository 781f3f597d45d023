//! Keyed advisory locks.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use crate::application::ApplicationError;
use crate::error::MendResult;

/// One mutex per key, created on first use.
///
/// Callers hold the returned handle's guard for the critical section:
///
/// ```rust,ignore
/// let handle = locks.handle(&key)?;
/// let _guard = handle.lock();
/// ```
#[derive(Debug)]
pub struct KeyedLocks<K> {
    inner: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn handle(&self, key: &K) -> MendResult<Arc<Mutex<()>>> {
        let mut map = self
            .inner
            .lock()
            .map_err(|_| ApplicationError::StoreLockError {
                during: "acquiring a keyed lock",
            })?;
        Ok(Arc::clone(map.entry(key.clone()).or_default()))
    }

    /// Number of keys that have been locked at least once.
    pub fn len(&self) -> usize {
        self.inner.lock().map_or(0, |map| map.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_shares_a_mutex() {
        let locks = KeyedLocks::new();
        let a = locks.handle(&"x").unwrap();
        let b = locks.handle(&"x").unwrap();
        let c = locks.handle(&"y").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(locks.len(), 2);
    }
}
