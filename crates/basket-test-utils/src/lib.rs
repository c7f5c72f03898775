//! Testing utilities for the basket workspace
//!
//! Shared fixtures for stored values and pre-seeded stores.

#![allow(missing_docs)]

use basket_core::config::DEFAULT_STORAGE_KEY;
use basket_core::{Basket, BasketStore, MemoryStorage, PromotionMode, StoreConfig};
use serde_json::json;

/// Stored value in the flat-ids format, one string per unit
pub fn flat_ids(ids: &[&str]) -> String {
    serde_json::to_string(ids).unwrap()
}

/// Stored value in the records format
pub fn records(items: &[(&str, u32)]) -> String {
    let records: Vec<_> = items
        .iter()
        .map(|(product, quantity)| json!({ "product": product, "quantity": quantity }))
        .collect();
    serde_json::to_string(&records).unwrap()
}

pub fn basket_of(items: &[(&str, u32)]) -> Basket {
    Basket::from_purchased(items.iter().copied())
}

pub fn empty_store() -> BasketStore<MemoryStorage> {
    BasketStore::new(MemoryStorage::new())
}

pub fn store_with_raw(raw: &str) -> BasketStore<MemoryStorage> {
    BasketStore::new(MemoryStorage::new().with_item(DEFAULT_STORAGE_KEY, raw))
}

pub fn persisted_store_with_raw(raw: &str) -> BasketStore<MemoryStorage> {
    store_with_raw(raw).with_config(StoreConfig::new().with_mode(PromotionMode::Persisted))
}

pub fn add_times(store: &mut BasketStore<MemoryStorage>, product: &str, times: usize) -> Basket {
    let mut basket = store.load();
    for _ in 0..times {
        basket = store.add(product).unwrap();
    }
    basket
}
