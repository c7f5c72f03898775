//! DOM surface and JS entry points, run in a browser with
//! `wasm-pack test --headless --firefox crates/basket-view --features web`

#![cfg(all(feature = "web", target_arch = "wasm32"))]

use basket_core::{Basket, KeyValueStorage};
use basket_view::web::{add_to_basket, clear_basket, DomSurface, LocalStorage};
use basket_view::{BasketSurface, IndicatorView, ListView, Renderer};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Document, Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

const PAGE: &str = r##"
<ul id="basketList"></ul>
<div class="cart-buttons-row"></div>
<a class="basket-link" href="#basket">Basket</a>
"##;

const PAGE_WITHOUT_LINK: &str = r#"
<ul id="basketList"></ul>
<div class="cart-buttons-row"></div>
"#;

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn load_page(html: &str) -> DomSurface {
    document().body().unwrap().set_inner_html(html);
    DomSurface::from_window().unwrap()
}

fn find(selector: &str) -> Option<Element> {
    document().query_selector(selector).unwrap()
}

fn display(element: &Element) -> String {
    element
        .dyn_ref::<HtmlElement>()
        .unwrap()
        .style()
        .get_property_value("display")
        .unwrap()
}

fn text(element: &Element) -> String {
    element.text_content().unwrap_or_default()
}

#[wasm_bindgen_test]
fn test_badge_created_inside_link() {
    let mut surface = load_page(PAGE);
    assert!(find(".basket-indicator").is_none());

    surface.show_indicator(&IndicatorView { count: 5 });

    let badge = find(".basket-link .basket-indicator").unwrap();
    assert_eq!(text(&badge), "5");
    assert_eq!(display(&badge), "flex");
}

#[wasm_bindgen_test]
fn test_badge_skipped_without_link() {
    let mut surface = load_page(PAGE_WITHOUT_LINK);

    surface.show_indicator(&IndicatorView { count: 2 });

    assert!(find(".basket-indicator").is_none());
}

#[wasm_bindgen_test]
fn test_zero_count_hides_existing_badge() {
    let mut surface = load_page(PAGE);

    surface.show_indicator(&IndicatorView { count: 3 });
    surface.show_indicator(&IndicatorView { count: 0 });

    let link = find(".basket-link").unwrap();
    assert_eq!(link.child_element_count(), 1);
    assert_eq!(display(&find(".basket-indicator").unwrap()), "none");
}

#[wasm_bindgen_test]
fn test_empty_list_shows_placeholder_and_hides_checkout() {
    let mut surface = load_page(PAGE);

    surface.show_list(&ListView::Empty);

    let list = find("#basketList").unwrap();
    assert_eq!(list.child_element_count(), 1);
    assert_eq!(text(&list), "No products in basket.");
    assert_eq!(display(&find(".cart-buttons-row").unwrap()), "none");
}

#[wasm_bindgen_test]
fn test_rows_mark_free_units() {
    let mut surface = load_page(PAGE);
    let mut basket = Basket::from_purchased([("apple", 4)]);
    basket.add_derived_units("orange".into(), 1);

    surface.show_list(&Renderer::default().project_list(&basket));

    let list = find("#basketList").unwrap();
    assert_eq!(list.child_element_count(), 2);

    let apple = list.first_element_child().unwrap();
    assert_eq!(text(&apple), "🍏 Apple ×4");
    assert!(!apple.class_list().contains("freebie"));
    assert!(apple.query_selector("strong").unwrap().is_none());

    let orange = list.last_element_child().unwrap();
    assert!(orange.class_list().contains("freebie"));
    assert_eq!(text(&orange.query_selector(".basket-emoji").unwrap().unwrap()), "🍊");
    assert_eq!(text(&orange.query_selector("strong").unwrap().unwrap()), "(free)");
    assert_eq!(text(&orange), "🍊 Orange (free)");

    assert_eq!(display(&find(".cart-buttons-row").unwrap()), "flex");
}

#[wasm_bindgen_test]
fn test_rerender_replaces_rows() {
    let mut surface = load_page(PAGE);
    let renderer = Renderer::default();

    surface.show_list(&renderer.project_list(&Basket::from_purchased([("lemon", 1)])));
    surface.show_list(&renderer.project_list(&Basket::from_purchased([("lemon", 2)])));

    let list = find("#basketList").unwrap();
    assert_eq!(list.child_element_count(), 1);
    assert_eq!(text(&list), "🍋 Lemon ×2");
}

#[wasm_bindgen_test]
fn test_js_entry_points_update_page_and_storage() {
    load_page(PAGE);
    clear_basket().unwrap();

    for _ in 0..4 {
        add_to_basket("apple").unwrap();
    }

    assert_eq!(text(&find(".basket-indicator").unwrap()), "5");
    assert_eq!(find("#basketList").unwrap().child_element_count(), 2);
    let stored = LocalStorage::from_window().unwrap().get_item("basket").unwrap();
    assert_eq!(stored.as_deref(), Some(r#"[{"product":"apple","quantity":4}]"#));

    assert!(add_to_basket("fruit-bundle").is_err());

    clear_basket().unwrap();
    assert_eq!(display(&find(".basket-indicator").unwrap()), "none");
    assert_eq!(display(&find(".cart-buttons-row").unwrap()), "none");
    assert!(LocalStorage::from_window().unwrap().get_item("basket").unwrap().is_none());
}
