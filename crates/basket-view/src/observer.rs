//! Re-render on store changes

use crate::projection::Renderer;
use crate::surface::BasketSurface;
use basket_core::{Basket, BasketObserver};
use std::cell::RefCell;
use std::rc::Rc;

/// Observer that re-renders list and badge after every store mutation
///
/// The surface is shared so the caller can keep reading it.
#[derive(Debug)]
pub struct RenderOnChange<V> {
    renderer: Renderer,
    surface: Rc<RefCell<V>>,
}

impl<V: BasketSurface> RenderOnChange<V> {
    /// Create observer
    #[inline]
    #[must_use]
    pub fn new(renderer: Renderer, surface: Rc<RefCell<V>>) -> Self {
        Self { renderer, surface }
    }

    /// Shared surface handle
    #[inline]
    #[must_use]
    pub fn surface(&self) -> Rc<RefCell<V>> {
        Rc::clone(&self.surface)
    }
}

impl<V: BasketSurface> BasketObserver for RenderOnChange<V> {
    fn basket_changed(&mut self, basket: &Basket) {
        match self.surface.try_borrow_mut() {
            Ok(mut surface) => self.renderer.render(basket, &mut *surface),
            Err(_) => tracing::warn!("surface busy, skipping re-render"),
        }
    }
}
