//! Presentation surfaces
//!
//! A [`BasketSurface`] receives finished view data and puts it somewhere:
//! the page, a terminal, a test buffer.

use crate::projection::{IndicatorView, ListView, EMPTY_PLACEHOLDER};
use std::fmt::Write as _;

/// Target for rendered basket views
pub trait BasketSurface {
    /// Replace the list contents and checkout visibility
    fn show_list(&mut self, list: &ListView);

    /// Update the count badge
    fn show_indicator(&mut self, indicator: &IndicatorView);
}

/// Surface that keeps the last applied views
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySurface {
    list: Option<ListView>,
    indicator: Option<IndicatorView>,
    updates: usize,
}

impl MemorySurface {
    /// Create blank surface
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last list shown
    #[inline]
    #[must_use]
    pub fn list(&self) -> Option<&ListView> {
        self.list.as_ref()
    }

    /// Last badge shown
    #[inline]
    #[must_use]
    pub fn indicator(&self) -> Option<IndicatorView> {
        self.indicator
    }

    /// Calls to either `show_*` method so far
    #[inline]
    #[must_use]
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Plain-text rendering
    ///
    /// ```text
    /// Basket (5)
    ///   🍏 Apple ×4
    ///   🍊 Orange (free)
    /// [checkout]
    /// ```
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        match self.indicator.filter(IndicatorView::visible) {
            Some(indicator) => {
                let _ = writeln!(out, "Basket ({})", indicator.count);
            }
            None => out.push_str("Basket\n"),
        }
        match &self.list {
            None | Some(ListView::Empty) => {
                let _ = writeln!(out, "  {EMPTY_PLACEHOLDER}");
            }
            Some(ListView::Items { rows }) => {
                for row in rows {
                    let _ = writeln!(out, "  {row}");
                }
                out.push_str("[checkout]\n");
            }
        }
        out
    }
}

impl BasketSurface for MemorySurface {
    fn show_list(&mut self, list: &ListView) {
        self.list = Some(list.clone());
        self.updates += 1;
    }

    fn show_indicator(&mut self, indicator: &IndicatorView) {
        self.indicator = Some(*indicator);
        self.updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Renderer;
    use basket_core::Basket;

    #[test]
    fn test_blank_surface_text() {
        assert_eq!(MemorySurface::new().to_text(), "Basket\n  No products in basket.\n");
    }

    #[test]
    fn test_rendered_text() {
        let mut basket = Basket::from_purchased([("apple", 4)]);
        basket.add_derived_units("orange".into(), 1);

        let mut surface = MemorySurface::new();
        Renderer::default().render(&basket, &mut surface);

        assert_eq!(
            surface.to_text(),
            "Basket (5)\n  🍏 Apple ×4\n  🍊 Orange (free)\n[checkout]\n"
        );
        assert_eq!(surface.updates(), 2);
    }

    #[test]
    fn test_rerender_is_stable() {
        let basket = Basket::from_purchased([("lemon", 1)]);
        let renderer = Renderer::default();
        let mut first = MemorySurface::new();
        let mut second = MemorySurface::new();

        renderer.render(&basket, &mut first);
        renderer.render(&basket, &mut second);
        renderer.render(&basket, &mut second);

        assert_eq!(first.list(), second.list());
        assert_eq!(first.indicator(), second.indicator());
    }
}
