//! Basket Core
//!
//! Shopping basket state held under a single key of a browser-style
//! key/value store.
//!
//! # Core Concepts
//!
//! - [`Basket`]: Canonical in-memory basket (purchased + derived entries)
//! - [`Catalog`]: Static product lookup table
//! - [`codec`]: Versioned decoder chain for every on-disk generation
//! - [`PromotionPolicy`]: Quantity-threshold rules granting free units
//! - [`BasketStore`]: Load / add / clear with write-through persistence
//! - [`BasketObserver`]: Change notification for renderers
//!
//! # Example
//!
//! ```rust
//! use basket_core::{BasketStore, MemoryStorage};
//!
//! let mut store = BasketStore::new(MemoryStorage::new());
//! for _ in 0..4 {
//!     store.add("apple").unwrap();
//! }
//!
//! let basket = store.load();
//! assert_eq!(basket.quantity("apple"), 4);
//! assert_eq!(basket.derived_quantity("orange"), 1);
//! assert_eq!(basket.total_quantity(), 5);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod basket;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod promotion;
pub mod storage;
pub mod store;

// Re-exports for convenience
pub use basket::{Basket, BasketEntry, EntryOrigin, ProductId};
pub use catalog::{Catalog, Product};
pub use codec::{Decoded, FormatVersion};
pub use config::{BasketConfig, PromotionConfig, PromotionMode, RuleConfig, StoreConfig};
pub use error::{ConfigError, DecodeError, StorageError, StoreError};
pub use promotion::{BundlePerTotal, FreeUnitPerQuantity, Grant, PromotionPolicy, PromotionRule};
pub use storage::{KeyValueStorage, MemoryStorage};
pub use store::{BasketObserver, BasketStore, MigrationReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the basket store
    pub use crate::basket::{Basket, BasketEntry, ProductId};
    pub use crate::catalog::Catalog;
    pub use crate::config::{PromotionMode, StoreConfig};
    pub use crate::promotion::PromotionPolicy;
    pub use crate::storage::{KeyValueStorage, MemoryStorage};
    pub use crate::store::{BasketObserver, BasketStore};
}
