//! Basket model
//!
//! [`Basket`] is the one in-memory shape every stored format decodes into.
//! Purchased entries keep first-add order with one line per product.
//! Derived promotional entries are tracked separately so they can be
//! recomputed without touching what the user actually added.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Product identifier as stored in the basket
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create product id
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty or whitespace-only ids can't name a product
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ProductId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// How an entry got into the basket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrigin {
    /// Added by the user
    #[default]
    Purchased,

    /// Granted by a promotion rule
    Promotional,
}

/// One basket line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketEntry {
    /// Product on this line
    pub product: ProductId,
    /// Units, always at least one
    pub quantity: u32,
    /// Purchased or granted
    pub origin: EntryOrigin,
}

impl BasketEntry {
    /// Check if this line was granted by a promotion
    #[inline]
    #[must_use]
    pub fn is_promotional(&self) -> bool {
        self.origin == EntryOrigin::Promotional
    }
}

/// Canonical basket
///
/// Equality ignores insertion order; use [`Basket::entries`] when order
/// matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Basket {
    purchased: IndexMap<ProductId, u32>,
    derived: IndexMap<ProductId, u32>,
}

impl Basket {
    /// Create empty basket
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from purchased `(product, quantity)` pairs
    ///
    /// Repeated products are merged and zero quantities skipped.
    pub fn from_purchased<I, P>(items: I) -> Self
    where
        I: IntoIterator<Item = (P, u32)>,
        P: Into<ProductId>,
    {
        let mut basket = Self::new();
        for (product, quantity) in items {
            basket.add_units(product.into(), quantity);
        }
        basket
    }

    /// Add units of a purchased product
    ///
    /// Returns the product's new quantity.
    pub fn add_units(&mut self, product: ProductId, units: u32) -> u32 {
        if units == 0 {
            return self.quantity(product.as_str());
        }
        let quantity = self.purchased.entry(product).or_insert(0);
        *quantity = quantity.saturating_add(units);
        *quantity
    }

    /// Add units of a derived product
    pub fn add_derived_units(&mut self, product: ProductId, units: u32) -> u32 {
        if units == 0 {
            return self.derived_quantity(product.as_str());
        }
        let quantity = self.derived.entry(product).or_insert(0);
        *quantity = quantity.saturating_add(units);
        *quantity
    }

    /// Replace derived entries
    ///
    /// Returns `false` when the new set (order included) matches the current
    /// one, so callers can skip redundant writes.
    pub fn set_derived(&mut self, derived: IndexMap<ProductId, u32>) -> bool {
        let derived: IndexMap<_, _> = derived.into_iter().filter(|(_, q)| *q > 0).collect();
        if self.derived.iter().eq(derived.iter()) {
            return false;
        }
        self.derived = derived;
        true
    }

    /// Drop every derived entry
    pub fn clear_derived(&mut self) {
        self.derived.clear();
    }

    /// Purchased quantity of a product (zero when absent)
    #[inline]
    #[must_use]
    pub fn quantity(&self, product: &str) -> u32 {
        self.purchased.get(product).copied().unwrap_or(0)
    }

    /// Derived quantity of a product (zero when absent)
    #[inline]
    #[must_use]
    pub fn derived_quantity(&self, product: &str) -> u32 {
        self.derived.get(product).copied().unwrap_or(0)
    }

    /// Purchased entries in first-add order
    pub fn purchased(&self) -> impl Iterator<Item = BasketEntry> + '_ {
        self.purchased.iter().map(|(product, &quantity)| BasketEntry {
            product: product.clone(),
            quantity,
            origin: EntryOrigin::Purchased,
        })
    }

    /// Derived entries in rule order
    pub fn derived(&self) -> impl Iterator<Item = BasketEntry> + '_ {
        self.derived.iter().map(|(product, &quantity)| BasketEntry {
            product: product.clone(),
            quantity,
            origin: EntryOrigin::Promotional,
        })
    }

    /// Purchased entries followed by derived entries
    pub fn entries(&self) -> impl Iterator<Item = BasketEntry> + '_ {
        self.purchased().chain(self.derived())
    }

    /// Derived entries as a map
    #[inline]
    #[must_use]
    pub fn derived_map(&self) -> &IndexMap<ProductId, u32> {
        &self.derived
    }

    /// Number of lines (purchased + derived)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.purchased.len() + self.derived.len()
    }

    /// Check if basket holds nothing at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.purchased.is_empty() && self.derived.is_empty()
    }

    /// Units the user added
    #[must_use]
    pub fn purchased_units(&self) -> u32 {
        self.purchased
            .values()
            .fold(0u32, |total, q| total.saturating_add(*q))
    }

    /// Units across purchased and derived entries
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.derived
            .values()
            .fold(self.purchased_units(), |total, q| total.saturating_add(*q))
    }
}
