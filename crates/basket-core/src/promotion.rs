//! Promotion rules
//!
//! Provides the [`PromotionRule`] trait and [`PromotionPolicy`], an ordered
//! set of rules that turns purchased entries into derived free units.
//!
//! Derivation is a pure function of the purchased entries, so running it
//! twice on the same basket yields the same grants.

use crate::basket::{Basket, ProductId};
use crate::catalog::{ids, Catalog};
use indexmap::IndexMap;
use std::fmt;
use std::num::NonZeroU32;

/// Apples needed for each free orange in the standard promotion
pub const APPLES_PER_FREE_ORANGE: NonZeroU32 = match NonZeroU32::new(4) {
    Some(n) => n,
    None => unreachable!(),
};

/// Free units granted by one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// Product granted
    pub product: ProductId,
    /// Units granted, at least one
    pub quantity: u32,
}

/// Quantity-threshold promotion
pub trait PromotionRule: fmt::Debug + Send + Sync {
    /// Rule name (for logging and config errors)
    fn name(&self) -> &'static str;

    /// Compute the grant for a basket's purchased entries
    ///
    /// Returns `None` when the threshold isn't reached.
    fn derive(&self, basket: &Basket, catalog: &Catalog) -> Option<Grant>;
}

/// One free `reward` per `every` units of `trigger`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeUnitPerQuantity {
    trigger: ProductId,
    every: NonZeroU32,
    reward: ProductId,
}

impl FreeUnitPerQuantity {
    /// Create rule
    pub fn new(trigger: impl Into<ProductId>, every: NonZeroU32, reward: impl Into<ProductId>) -> Self {
        Self {
            trigger: trigger.into(),
            every,
            reward: reward.into(),
        }
    }

    /// One free orange per four apples
    #[must_use]
    pub fn orange_per_four_apples() -> Self {
        Self::new(ids::APPLE, APPLES_PER_FREE_ORANGE, ids::ORANGE)
    }
}

impl PromotionRule for FreeUnitPerQuantity {
    fn name(&self) -> &'static str {
        "free_unit_per_quantity"
    }

    fn derive(&self, basket: &Basket, _catalog: &Catalog) -> Option<Grant> {
        let quantity = basket.quantity(self.trigger.as_str()) / self.every.get();
        (quantity > 0).then(|| Grant {
            product: self.reward.clone(),
            quantity,
        })
    }
}

/// One `reward` per `every` purchased non-promotional units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePerTotal {
    every: NonZeroU32,
    reward: ProductId,
}

impl BundlePerTotal {
    /// Create rule
    pub fn new(every: NonZeroU32, reward: impl Into<ProductId>) -> Self {
        Self {
            every,
            reward: reward.into(),
        }
    }
}

impl PromotionRule for BundlePerTotal {
    fn name(&self) -> &'static str {
        "bundle_per_total"
    }

    fn derive(&self, basket: &Basket, catalog: &Catalog) -> Option<Grant> {
        let units = basket
            .purchased()
            .filter(|e| !catalog.is_promotional(e.product.as_str()))
            .fold(0u32, |total, e| total.saturating_add(e.quantity));
        let quantity = units / self.every.get();
        (quantity > 0).then(|| Grant {
            product: self.reward.clone(),
            quantity,
        })
    }
}

/// Ordered promotion rules
#[derive(Debug, Default)]
pub struct PromotionPolicy {
    rules: Vec<Box<dyn PromotionRule>>,
}

impl PromotionPolicy {
    /// Policy without rules
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// One free orange per four apples
    #[must_use]
    pub fn standard() -> Self {
        Self::none().with_rule(FreeUnitPerQuantity::orange_per_four_apples())
    }

    /// Append rule
    #[must_use]
    pub fn with_rule(mut self, rule: impl PromotionRule + 'static) -> Self {
        self.push(Box::new(rule));
        self
    }

    /// Append boxed rule
    pub fn push(&mut self, rule: Box<dyn PromotionRule>) {
        self.rules.push(rule);
    }

    /// Rules in evaluation order
    #[must_use]
    pub fn rules(&self) -> &[Box<dyn PromotionRule>] {
        &self.rules
    }

    /// Number of rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if policy has no rules
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Derived entries for a basket
    ///
    /// Grants for the same product are summed; order follows the first rule
    /// granting each product. Existing derived entries are ignored.
    #[must_use]
    pub fn derive(&self, basket: &Basket, catalog: &Catalog) -> IndexMap<ProductId, u32> {
        let mut derived = IndexMap::new();
        for rule in &self.rules {
            if let Some(grant) = rule.derive(basket, catalog) {
                tracing::trace!(rule = rule.name(), product = %grant.product, quantity = grant.quantity, "promotion granted");
                let entry = derived.entry(grant.product).or_insert(0u32);
                *entry = entry.saturating_add(grant.quantity);
            }
        }
        derived
    }
}
