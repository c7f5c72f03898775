//! Basket projections
//!
//! [`Renderer`] turns a [`Basket`] into plain view data: a [`ListView`] for
//! the basket list and an [`IndicatorView`] for the count badge. Projections
//! are pure, so rendering the same basket twice gives the same output.

use crate::surface::BasketSurface;
use basket_core::{Basket, BasketEntry, BasketStore, Catalog, KeyValueStorage, ProductId};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Placeholder shown for an empty basket
pub const EMPTY_PLACEHOLDER: &str = "No products in basket.";

/// Label appended to promotional rows
pub const FREE_LABEL: &str = "(free)";

/// One rendered basket line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Product on this row
    pub product: ProductId,
    /// Catalog emoji
    pub emoji: String,
    /// Catalog display name
    pub name: String,
    /// Units on this line
    pub quantity: u32,
    /// Granted by a promotion
    pub promotional: bool,
}

impl Row {
    /// Name plus a `×n` suffix when more than one unit
    #[must_use]
    pub fn name_with_quantity(&self) -> String {
        if self.quantity > 1 {
            format!("{} ×{}", self.name, self.quantity)
        } else {
            self.name.clone()
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji, self.name_with_quantity())?;
        if self.promotional {
            write!(f, " {FREE_LABEL}")?;
        }
        Ok(())
    }
}

/// Basket list contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ListView {
    /// Placeholder row, checkout hidden
    Empty,

    /// One row per known product, checkout shown
    Items { rows: Vec<Row> },
}

impl ListView {
    /// Checkout controls are shown for any non-empty basket
    #[inline]
    #[must_use]
    pub fn checkout_visible(&self) -> bool {
        matches!(self, Self::Items { .. })
    }

    /// Rendered rows (none for the placeholder)
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        match self {
            Self::Empty => &[],
            Self::Items { rows } => rows,
        }
    }
}

/// Count badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndicatorView {
    /// Units across purchased and derived entries
    pub count: u32,
}

impl IndicatorView {
    /// Badge is hidden at zero
    #[inline]
    #[must_use]
    pub fn visible(&self) -> bool {
        self.count > 0
    }
}

/// Projects baskets onto view data and surfaces
#[derive(Debug, Clone)]
pub struct Renderer {
    catalog: Arc<Catalog>,
}

impl Renderer {
    /// Create renderer over a catalog
    #[inline]
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Project the basket list
    ///
    /// Entries whose product isn't in the catalog get no row.
    #[must_use]
    pub fn project_list(&self, basket: &Basket) -> ListView {
        if basket.is_empty() {
            return ListView::Empty;
        }
        let rows = basket.entries().filter_map(|entry| self.row(&entry)).collect();
        ListView::Items { rows }
    }

    /// Project the count badge
    #[inline]
    #[must_use]
    pub fn project_indicator(&self, basket: &Basket) -> IndicatorView {
        IndicatorView {
            count: basket.total_quantity(),
        }
    }

    /// Load the store and render the list
    pub fn render_list<S, V>(&self, store: &BasketStore<S>, surface: &mut V)
    where
        S: KeyValueStorage,
        V: BasketSurface + ?Sized,
    {
        surface.show_list(&self.project_list(&store.load()));
    }

    /// Load the store and render the badge
    pub fn render_indicator<S, V>(&self, store: &BasketStore<S>, surface: &mut V)
    where
        S: KeyValueStorage,
        V: BasketSurface + ?Sized,
    {
        surface.show_indicator(&self.project_indicator(&store.load()));
    }

    /// Render list and badge for an already loaded basket
    pub fn render<V: BasketSurface + ?Sized>(&self, basket: &Basket, surface: &mut V) {
        surface.show_list(&self.project_list(basket));
        surface.show_indicator(&self.project_indicator(basket));
    }

    fn row(&self, entry: &BasketEntry) -> Option<Row> {
        let Some(product) = self.catalog.get(entry.product.as_str()) else {
            tracing::debug!(product = %entry.product, "no catalog entry, skipping row");
            return None;
        };
        Some(Row {
            product: entry.product.clone(),
            emoji: product.emoji.clone(),
            name: product.display_name.clone(),
            quantity: entry.quantity,
            promotional: entry.is_promotional(),
        })
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Catalog::standard())
    }
}
