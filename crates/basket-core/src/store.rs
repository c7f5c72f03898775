//! Basket store
//!
//! [`BasketStore`] owns a storage backend and everything needed to turn the
//! stored value into a [`Basket`]: the catalog, the promotion policy and the
//! [`PromotionMode`].
//!
//! # Workflow
//!
//! ```text
//! storage ──get──▶ decoder chain ──▶ Basket ──▶ promotion policy ──▶ caller
//!    ▲                                  │
//!    └────────────set / remove──────────┘──▶ observers
//! ```
//!
//! Reads never fail: absent, malformed or wrongly shaped values load as an
//! empty basket. Mutations write through before returning.

use crate::basket::{Basket, ProductId};
use crate::catalog::Catalog;
use crate::codec::{self, Decoded, FormatVersion};
use crate::config::{PromotionMode, StoreConfig};
use crate::error::StoreError;
use crate::promotion::PromotionPolicy;
use crate::storage::KeyValueStorage;
use std::fmt;
use std::sync::Arc;

/// Receives the basket after every successful mutation
pub trait BasketObserver {
    /// Called with the basket as it now reads
    fn basket_changed(&mut self, basket: &Basket);
}

impl<F: FnMut(&Basket)> BasketObserver for F {
    fn basket_changed(&mut self, basket: &Basket) {
        self(basket);
    }
}

/// Outcome of [`BasketStore::migrate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    /// Format found in storage, `None` when nothing readable was stored
    pub from: Option<FormatVersion>,
    /// Whether the value was rewritten
    pub rewritten: bool,
}

/// Persisted basket with promotion handling and change notification
pub struct BasketStore<S> {
    storage: S,
    config: StoreConfig,
    catalog: Arc<Catalog>,
    policy: PromotionPolicy,
    observers: Vec<Box<dyn BasketObserver>>,
}

impl<S: KeyValueStorage> BasketStore<S> {
    /// Create store with default key, standard catalog and standard policy
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            config: StoreConfig::default(),
            catalog: Catalog::standard(),
            policy: PromotionPolicy::standard(),
            observers: Vec::new(),
        }
    }

    /// With store configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// With catalog
    #[inline]
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// With promotion policy
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: PromotionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Storage backend
    #[inline]
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Store configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Shared catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Promotion policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &PromotionPolicy {
        &self.policy
    }

    /// Register observer; observers run in registration order
    pub fn subscribe(&mut self, observer: impl BasketObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Number of registered observers
    #[inline]
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Load the basket
    ///
    /// Never fails. Legacy formats are upgraded in memory; unreadable
    /// values load as an empty basket.
    #[must_use]
    pub fn load(&self) -> Basket {
        match self.read() {
            Some(decoded) => self.reconcile(decoded),
            None => Basket::new(),
        }
    }

    /// Units across purchased and derived entries
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.load().total_quantity()
    }

    /// Add one unit of a product
    ///
    /// The purchased entries are written first, then derived entries are
    /// recomputed. In [`PromotionMode::Persisted`] a second write happens
    /// only if the derived entries changed. If that second write fails,
    /// observers still see the basket as stored before the error returns.
    ///
    /// # Errors
    /// Returns error for blank or promotional products, or if the write fails
    pub fn add(&mut self, product: impl Into<ProductId>) -> Result<Basket, StoreError> {
        let product = product.into();
        if product.is_blank() {
            return Err(StoreError::InvalidProduct(product.to_string()));
        }
        if self.catalog.is_promotional(product.as_str()) {
            return Err(StoreError::PromotionalProduct(product));
        }

        let mut basket = self.load();
        let quantity = basket.add_units(product.clone(), 1);
        let persisted = self.config.mode == PromotionMode::Persisted;
        self.write(&basket, persisted)?;

        let derived = self.policy.derive(&basket, &self.catalog);
        if basket.set_derived(derived) && persisted {
            tracing::debug!(key = %self.config.key, "derived entries changed");
            if let Err(e) = self.write(&basket, true) {
                // purchased units already landed; show what storage holds
                let stored = self.load();
                self.notify(&stored);
                return Err(e);
            }
        }

        tracing::info!(%product, quantity, total = basket.total_quantity(), "added to basket");
        self.notify(&basket);
        Ok(basket)
    }

    /// Remove the stored basket entirely
    ///
    /// # Errors
    /// Returns error if the removal fails
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.storage.remove_item(&self.config.key)?;
        tracing::info!(key = %self.config.key, "basket cleared");
        self.notify(&Basket::new());
        Ok(())
    }

    /// Rewrite a legacy stored value in the current format
    ///
    /// Values that are absent, unreadable or already current are left
    /// untouched.
    ///
    /// # Errors
    /// Returns error if the write fails
    pub fn migrate(&self) -> Result<MigrationReport, StoreError> {
        let Some(decoded) = self.read() else {
            return Ok(MigrationReport {
                from: None,
                rewritten: false,
            });
        };
        let from = decoded.version;
        if !from.is_legacy() {
            return Ok(MigrationReport {
                from: Some(from),
                rewritten: false,
            });
        }

        let persisted = self.config.mode == PromotionMode::Persisted;
        let basket = self.reconcile(decoded);
        self.write(&basket, persisted)?;
        tracing::info!(key = %self.config.key, %from, to = %FormatVersion::CURRENT, "migrated stored basket");
        Ok(MigrationReport {
            from: Some(from),
            rewritten: true,
        })
    }

    fn read(&self) -> Option<Decoded> {
        let raw = match self.storage.get_item(&self.config.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %self.config.key, error = %e, "basket storage unreadable");
                return None;
            }
        };

        match codec::decode(&raw, &self.catalog) {
            Ok(decoded) => {
                tracing::debug!(key = %self.config.key, version = %decoded.version, lines = decoded.basket.len(), "loaded basket");
                Some(decoded)
            }
            Err(e) => {
                tracing::warn!(key = %self.config.key, error = %e, "discarding unreadable basket");
                None
            }
        }
    }

    /// Apply the promotion mode to a freshly decoded basket
    fn reconcile(&self, decoded: Decoded) -> Basket {
        let Decoded {
            mut basket,
            version,
        } = decoded;
        let recompute = match self.config.mode {
            PromotionMode::Projected => true,
            // flat ids predate stored promotions
            PromotionMode::Persisted => version == FormatVersion::FlatIds,
        };
        if recompute {
            let derived = self.policy.derive(&basket, &self.catalog);
            basket.set_derived(derived);
        }
        basket
    }

    fn write(&self, basket: &Basket, include_derived: bool) -> Result<(), StoreError> {
        let encoded = codec::encode(basket, include_derived)?;
        self.storage.set_item(&self.config.key, &encoded)?;
        Ok(())
    }

    fn notify(&mut self, basket: &Basket) {
        for observer in &mut self.observers {
            observer.basket_changed(basket);
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for BasketStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasketStore")
            .field("storage", &self.storage)
            .field("config", &self.config)
            .field("policy", &self.policy)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::{MemoryStorage, MockKeyValueStorage};
    use parking_lot::Mutex;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_add_writes_once_in_projected_mode() {
        let mut storage = MockKeyValueStorage::new();
        storage.expect_get_item().returning(|_| Ok(None));
        storage
            .expect_set_item()
            .withf(|key, value| key == "basket" && value == r#"[{"product":"apple","quantity":1}]"#)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut store = BasketStore::new(storage);
        let basket = store.add("apple").unwrap();
        assert_eq!(basket.quantity("apple"), 1);
    }

    #[test]
    fn test_persisted_mode_skips_redundant_derived_write() {
        let mut storage = MockKeyValueStorage::new();
        storage.expect_get_item().returning(|_| {
            Ok(Some(
                r#"[{"product":"apple","quantity":4},{"product":"orange","quantity":1,"free":true}]"#
                    .to_string(),
            ))
        });
        storage.expect_set_item().times(1).returning(|_, _| Ok(()));

        let mut store =
            BasketStore::new(storage).with_config(StoreConfig::new().with_mode(PromotionMode::Persisted));
        let basket = store.add("banana").unwrap();
        assert_eq!(basket.derived_quantity("orange"), 1);
    }

    #[test]
    fn test_persisted_mode_writes_changed_derived_entries() {
        let mut storage = MockKeyValueStorage::new();
        storage
            .expect_get_item()
            .returning(|_| Ok(Some(r#"[{"product":"apple","quantity":3}]"#.to_string())));
        let writes = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&writes);
        storage.expect_set_item().times(2).returning(move |_, value| {
            seen.lock().push(value.to_string());
            Ok(())
        });

        let mut store =
            BasketStore::new(storage).with_config(StoreConfig::new().with_mode(PromotionMode::Persisted));
        store.add("apple").unwrap();

        let writes = writes.lock();
        assert_eq!(writes[0], r#"[{"product":"apple","quantity":4}]"#);
        assert_eq!(
            writes[1],
            r#"[{"product":"apple","quantity":4},{"product":"orange","quantity":1,"free":true}]"#
        );
    }

    #[test]
    fn test_unreadable_storage_loads_empty() {
        let mut storage = MockKeyValueStorage::new();
        storage
            .expect_get_item()
            .returning(|_| Err(StorageError::Unavailable("disabled".to_string())));

        let store = BasketStore::new(storage);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_failed_write_surfaces() {
        let mut storage = MockKeyValueStorage::new();
        storage.expect_get_item().returning(|_| Ok(None));
        storage
            .expect_set_item()
            .returning(|key, _| Err(StorageError::write(key, "quota exceeded")));

        let mut store = BasketStore::new(storage);
        let notified = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&notified);
        store.subscribe(move |_: &Basket| *counter.borrow_mut() += 1);

        assert!(matches!(store.add("apple"), Err(StoreError::Storage(_))));
        assert_eq!(*notified.borrow(), 0);
    }

    #[test]
    fn test_failed_derived_write_still_notifies() {
        let stored = Arc::new(Mutex::new(Some(r#"[{"product":"apple","quantity":3}]"#.to_string())));
        let mut storage = MockKeyValueStorage::new();
        let reader = Arc::clone(&stored);
        storage
            .expect_get_item()
            .returning(move |_| Ok(reader.lock().clone()));
        let writer = Arc::clone(&stored);
        let attempts = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&attempts);
        storage.expect_set_item().times(2).returning(move |key, value| {
            let mut attempts = counter.lock();
            *attempts += 1;
            if *attempts == 1 {
                *writer.lock() = Some(value.to_string());
                Ok(())
            } else {
                Err(StorageError::write(key, "quota exceeded"))
            }
        });

        let mut store =
            BasketStore::new(storage).with_config(StoreConfig::new().with_mode(PromotionMode::Persisted));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        store.subscribe(move |basket: &Basket| {
            log.borrow_mut()
                .push((basket.quantity("apple"), basket.derived_quantity("orange")));
        });

        assert!(matches!(store.add("apple"), Err(StoreError::Storage(_))));
        assert_eq!(*seen.borrow(), vec![(4, 0)]);
    }

    #[test]
    fn test_rejects_blank_and_promotional_products() {
        let mut store = BasketStore::new(MemoryStorage::new());
        assert!(matches!(store.add(""), Err(StoreError::InvalidProduct(_))));
        assert!(matches!(store.add("fruit-bundle"), Err(StoreError::PromotionalProduct(_))));
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_custom_key() {
        let mut store =
            BasketStore::new(MemoryStorage::new()).with_config(StoreConfig::new().with_key("cart"));
        store.add("lemon").unwrap();
        assert!(store.storage().raw("basket").is_none());
        assert!(store.storage().raw("cart").is_some());
    }

    #[test]
    fn test_debug_hides_observers() {
        let mut store = BasketStore::new(MemoryStorage::new());
        store.subscribe(|_: &Basket| {});
        let debug = format!("{store:?}");
        assert!(debug.contains("observers: 1"));
    }
}
