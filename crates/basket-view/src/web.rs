//! Browser bindings
//!
//! - [`LocalStorage`]: [`KeyValueStorage`] over `window.localStorage`
//! - [`DomSurface`]: renders into `#basketList`, `.cart-buttons-row` and the
//!   `.basket-indicator` badge (created inside `.basket-link` on demand)
//! - `addToBasket`, `clearBasket`, `renderBasket`: JS entry points for page
//!   controls. Mutations re-render through [`RenderOnChange`].

use crate::observer::RenderOnChange;
use crate::projection::{IndicatorView, ListView, Renderer, Row, EMPTY_PLACEHOLDER, FREE_LABEL};
use crate::surface::BasketSurface;
use basket_core::{BasketStore, KeyValueStorage, StorageError};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Storage};

/// List container id
pub const LIST_ID: &str = "basketList";
/// Checkout controls row
pub const CHECKOUT_SELECTOR: &str = ".cart-buttons-row";
/// Count badge
pub const INDICATOR_SELECTOR: &str = ".basket-indicator";
/// Navigation link hosting the badge
pub const LINK_SELECTOR: &str = ".basket-link";

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// `window.localStorage`
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// Open the window's local storage
    ///
    /// # Errors
    /// Returns error outside a window context or when storage is disabled
    pub fn from_window() -> Result<Self, StorageError> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(describe(&e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(describe(&e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::write(key, describe(&e)))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StorageError::write(key, describe(&e)))
    }
}

/// Page surface
///
/// Missing elements are skipped silently so the same script works on pages
/// without a basket list or badge.
#[derive(Debug, Clone)]
pub struct DomSurface {
    document: Document,
}

impl DomSurface {
    /// Surface over the window's document
    #[must_use]
    pub fn from_window() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self { document })
    }

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn set_display(element: &Element, display: &str) {
        if let Some(element) = element.dyn_ref::<HtmlElement>() {
            if let Err(e) = element.style().set_property("display", display) {
                tracing::warn!(error = %describe(&e), "failed to set display");
            }
        }
    }

    fn text_element(&self, tag: &str, text: &str) -> Result<Element, JsValue> {
        let element = self.document.create_element(tag)?;
        element.set_text_content(Some(text));
        Ok(element)
    }

    fn row_element(&self, row: &Row) -> Result<Element, JsValue> {
        let li = self.document.create_element("li")?;

        let emoji = self.text_element("span", &row.emoji)?;
        emoji.set_class_name("basket-emoji");
        li.append_child(&emoji)?;
        li.append_child(&self.document.create_text_node(" "))?;

        let name = self.text_element("span", &row.name_with_quantity())?;
        if row.promotional {
            name.append_child(&self.document.create_text_node(" "))?;
            name.append_child(&self.text_element("strong", FREE_LABEL)?)?;
            li.class_list().add_1("freebie")?;
        }
        li.append_child(&name)?;
        Ok(li)
    }

    fn fill_list(&self, container: &Element, list: &ListView) -> Result<(), JsValue> {
        match list {
            ListView::Empty => {
                container.append_child(&self.text_element("li", EMPTY_PLACEHOLDER)?)?;
            }
            ListView::Items { rows } => {
                for row in rows {
                    container.append_child(&self.row_element(row)?)?;
                }
            }
        }
        Ok(())
    }

    fn indicator(&self) -> Option<Element> {
        if let Some(indicator) = self.query(INDICATOR_SELECTOR) {
            return Some(indicator);
        }
        let link = self.query(LINK_SELECTOR)?;
        let indicator = self.document.create_element("span").ok()?;
        indicator.set_class_name("basket-indicator");
        link.append_child(&indicator).ok()?;
        Some(indicator)
    }
}

impl BasketSurface for DomSurface {
    fn show_list(&mut self, list: &ListView) {
        let Some(container) = self.document.get_element_by_id(LIST_ID) else {
            return;
        };
        container.set_inner_html("");
        if let Err(e) = self.fill_list(&container, list) {
            tracing::warn!(error = %describe(&e), "failed to render basket list");
        }

        if let Some(checkout) = self.query(CHECKOUT_SELECTOR) {
            let display = if list.checkout_visible() { "flex" } else { "none" };
            Self::set_display(&checkout, display);
        }
    }

    fn show_indicator(&mut self, indicator: &IndicatorView) {
        let Some(badge) = self.indicator() else {
            return;
        };
        if indicator.visible() {
            badge.set_text_content(Some(indicator.count.to_string().as_str()));
            Self::set_display(&badge, "flex");
        } else {
            Self::set_display(&badge, "none");
        }
    }
}

thread_local! {
    static STORE: RefCell<Option<BasketStore<LocalStorage>>> = const { RefCell::new(None) };
}

fn open_store() -> Option<BasketStore<LocalStorage>> {
    let storage = match LocalStorage::from_window() {
        Ok(storage) => storage,
        Err(e) => {
            tracing::warn!(error = %e, "basket disabled");
            return None;
        }
    };
    let mut store = BasketStore::new(storage);
    if let Some(surface) = DomSurface::from_window() {
        let renderer = Renderer::new(store.catalog());
        store.subscribe(RenderOnChange::new(renderer, Rc::new(RefCell::new(surface))));
    }
    Some(store)
}

fn with_store<R>(f: impl FnOnce(&mut BasketStore<LocalStorage>) -> R) -> Option<R> {
    STORE.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = open_store();
        }
        slot.as_mut().map(f)
    })
}

/// Add one unit of a product and re-render
///
/// # Errors
/// Returns the store error message for invalid products or failed writes
#[wasm_bindgen(js_name = addToBasket)]
pub fn add_to_basket(product: &str) -> Result<(), JsValue> {
    with_store(|store| store.add(product).map(|_| ()))
        .unwrap_or(Ok(()))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Remove the stored basket and re-render
///
/// # Errors
/// Returns the store error message if the removal fails
#[wasm_bindgen(js_name = clearBasket)]
pub fn clear_basket() -> Result<(), JsValue> {
    with_store(BasketStore::clear)
        .unwrap_or(Ok(()))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Render list and badge from the stored basket (call on page load)
#[wasm_bindgen(js_name = renderBasket)]
pub fn render_basket() {
    with_store(|store| {
        let Some(mut surface) = DomSurface::from_window() else {
            return;
        };
        let renderer = Renderer::new(store.catalog());
        renderer.render_indicator(store, &mut surface);
        renderer.render_list(store, &mut surface);
    });
}
