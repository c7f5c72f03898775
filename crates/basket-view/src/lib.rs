//! Basket View
//!
//! Projects a [`basket_core::BasketStore`] onto a page: a list of rows and
//! a count badge.
//!
//! # Architecture
//!
//! ```text
//! BasketStore ──load──▶ Renderer ──ListView / IndicatorView──▶ BasketSurface
//!      │                                                        ▲
//!      └──add / clear──▶ RenderOnChange (observer) ─────────────┘
//! ```
//!
//! The `web` feature adds `window.localStorage` storage, a DOM surface and
//! the `addToBasket` / `clearBasket` / `renderBasket` JS exports.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod observer;
pub mod projection;
pub mod surface;

#[cfg(feature = "web")]
pub mod web;

pub use observer::RenderOnChange;
pub use projection::{IndicatorView, ListView, Renderer, Row, EMPTY_PLACEHOLDER, FREE_LABEL};
pub use surface::{BasketSurface, MemorySurface};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
