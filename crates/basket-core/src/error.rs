//! Error types for the basket store
//!
//! Provides error handling for:
//! - Decoding stored values (always recovered by the store)
//! - Storage backend failures
//! - Store mutations
//! - Promotion configuration

use crate::basket::ProductId;

/// Errors while decoding a stored basket
///
/// [`crate::BasketStore::load`] never surfaces these; they are logged and
/// replaced by an empty basket.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Stored text is not JSON
    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored JSON is not an array
    #[error("stored value is not a sequence")]
    NotASequence,

    /// Array elements match no known format
    #[error("stored entries match no known basket format")]
    UnsupportedShape,
}

/// Errors from a key/value storage backend
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Backend can't be reached at all
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Backend rejected a write or removal
    #[error("write to '{key}' failed: {message}")]
    Write { key: String, message: String },
}

impl StorageError {
    /// Create write error for key
    pub fn write(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Errors from basket mutations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Product id is empty or whitespace
    #[error("invalid product id: '{0}'")]
    InvalidProduct(String),

    /// Promotional products are granted, not added
    #[error("product '{0}' is promotional and can't be added directly")]
    PromotionalProduct(ProductId),

    /// Storage backend failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Basket could not be serialized
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Rule parameters are unusable
    #[error("invalid rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    /// Rule names a product missing from the catalog
    #[error("rule '{rule}' references unknown product '{product}'")]
    UnknownProduct { rule: String, product: ProductId },

    /// Storage key is empty
    #[error("storage key must not be empty")]
    EmptyKey,

    /// TOML syntax or shape error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON syntax or shape error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Create invalid rule error
    pub fn invalid_rule(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}
