//! Key/value storage backends
//!
//! [`KeyValueStorage`] mirrors the browser `localStorage` surface: string
//! keys, string values, get/set/remove. [`MemoryStorage`] backs tests and
//! offline tooling.

use crate::error::StorageError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// String key/value store
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStorage {
    /// Read value, `None` when the key is absent
    ///
    /// # Errors
    /// Returns error if the backend can't be read
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write value, replacing any previous one
    ///
    /// # Errors
    /// Returns error if the backend rejects the write
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove key; absent keys are not an error
    ///
    /// # Errors
    /// Returns error if the backend rejects the removal
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Rc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Arc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    items: HashMap<String, String>,
    writes: usize,
}

/// In-memory storage
///
/// Counts writes and removals so tests can assert on redundant writes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: RwLock<MemoryInner>,
}

impl MemoryStorage {
    /// Create empty storage
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without counting it as a write
    #[must_use]
    pub fn with_item(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.write().items.insert(key.into(), value.into());
        self
    }

    /// Raw stored value
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.read().items.get(key).cloned()
    }

    /// Writes and removals performed so far
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.inner.read().writes
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    /// Check if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().items.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        inner.items.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        inner.items.remove(key);
        inner.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("basket").unwrap(), None);

        storage.set_item("basket", "[]").unwrap();
        assert_eq!(storage.get_item("basket").unwrap().as_deref(), Some("[]"));

        storage.remove_item("basket").unwrap();
        assert!(storage.is_empty());
        assert_eq!(storage.write_count(), 2);
    }

    #[test]
    fn test_seeding_is_not_a_write() {
        let storage = MemoryStorage::new().with_item("basket", r#"["apple"]"#);
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn test_shared_handles_see_same_data() {
        let storage = Rc::new(MemoryStorage::new());
        let other = Rc::clone(&storage);
        storage.set_item("basket", "[]").unwrap();
        assert_eq!(other.raw("basket").as_deref(), Some("[]"));
    }
}
