//! Product catalog
//!
//! Static, read-only lookup table. Promotional products can only enter a
//! basket through a promotion rule.

use crate::basket::ProductId;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Ids of the products in [`Catalog::standard`]
pub mod ids {
    /// 🍏
    pub const APPLE: &str = "apple";
    /// 🍌
    pub const BANANA: &str = "banana";
    /// 🍋
    pub const LEMON: &str = "lemon";
    /// 🍊
    pub const ORANGE: &str = "orange";
    /// 🧺, promotional only
    pub const FRUIT_BUNDLE: &str = "fruit-bundle";
}

static STANDARD: Lazy<Arc<Catalog>> = Lazy::new(|| {
    Arc::new(
        Catalog::new()
            .with_product(Product::new(ids::APPLE, "Apple", "🍏"))
            .with_product(Product::new(ids::BANANA, "Banana", "🍌"))
            .with_product(Product::new(ids::LEMON, "Lemon", "🍋"))
            .with_product(Product::new(ids::ORANGE, "Orange", "🍊"))
            .with_product(Product::new(ids::FRUIT_BUNDLE, "Fruit Bundle", "🧺").promotional()),
    )
});

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product id
    pub id: ProductId,
    /// Name shown in the basket
    pub display_name: String,
    /// Emoji shown next to the name
    pub emoji: String,
    /// Granted by promotions only
    #[serde(default)]
    pub promotional: bool,
}

impl Product {
    /// Create regular product
    pub fn new(
        id: impl Into<ProductId>,
        display_name: impl Into<String>,
        emoji: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            emoji: emoji.into(),
            promotional: false,
        }
    }

    /// Mark as promotional
    #[inline]
    #[must_use]
    pub fn promotional(mut self) -> Self {
        self.promotional = true;
        self
    }
}

/// Product lookup table, ordered by insertion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: IndexMap<ProductId, Product>,
}

impl Catalog {
    /// Create empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared standard catalog
    #[must_use]
    pub fn standard() -> Arc<Catalog> {
        Arc::clone(&STANDARD)
    }

    /// Builder-style insert
    #[must_use]
    pub fn with_product(mut self, product: Product) -> Self {
        self.insert(product);
        self
    }

    /// Insert product, returning the one it replaced
    pub fn insert(&mut self, product: Product) -> Option<Product> {
        self.products.insert(product.id.clone(), product)
    }

    /// Look up product
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    /// Check if product is known
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.products.contains_key(id)
    }

    /// Unknown products are never promotional
    #[inline]
    #[must_use]
    pub fn is_promotional(&self, id: &str) -> bool {
        self.get(id).is_some_and(|p| p.promotional)
    }

    /// Iterate products in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Number of products
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if catalog is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_contents() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.get(ids::APPLE).map(|p| p.emoji.as_str()), Some("🍏"));
        assert_eq!(catalog.get(ids::ORANGE).map(|p| p.display_name.as_str()), Some("Orange"));
    }

    #[test]
    fn test_promotional_flag() {
        let catalog = Catalog::standard();
        assert!(catalog.is_promotional(ids::FRUIT_BUNDLE));
        assert!(!catalog.is_promotional(ids::ORANGE));
        assert!(!catalog.is_promotional("kiwi"));
    }

    #[test]
    fn test_insert_replaces() {
        let mut catalog = Catalog::new().with_product(Product::new("kiwi", "Kiwi", "🥝"));
        let old = catalog.insert(Product::new("kiwi", "Golden Kiwi", "🥝"));
        assert_eq!(old.map(|p| p.display_name), Some("Kiwi".to_string()));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_standard_is_shared() {
        assert!(Arc::ptr_eq(&Catalog::standard(), &Catalog::standard()));
    }
}
