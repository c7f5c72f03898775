//! Stored basket formats
//!
//! Three generations of the stored value exist:
//!
//! | version                  | shape                                              |
//! |--------------------------|----------------------------------------------------|
//! | `FlatIds`                | `["apple", "apple", "banana"]`                     |
//! | `FlatIdsWithPromotions`  | flat ids with promotional catalog ids mixed in     |
//! | `Records`                | `[{"product": "apple", "quantity": 2}, ...]`       |
//!
//! Decoding runs a chain of [`FormatDecoder`]s, newest first, and the first
//! one that accepts the value wins. Encoding always writes `Records`.

use crate::basket::{Basket, ProductId};
use crate::catalog::Catalog;
use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Stored format generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatVersion {
    /// One product-id string per unit
    FlatIds,
    /// Flat ids with derived promotional ids embedded
    FlatIdsWithPromotions,
    /// `{product, quantity}` records
    Records,
}

impl FormatVersion {
    /// Format written by [`encode`]
    pub const CURRENT: Self = Self::Records;

    /// Check if values in this format should be rewritten
    #[inline]
    #[must_use]
    pub fn is_legacy(self) -> bool {
        self != Self::CURRENT
    }

    /// Short stable name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FlatIds => "flat-ids",
            Self::FlatIdsWithPromotions => "flat-ids-with-promotions",
            Self::Records => "records",
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded basket plus the format it was stored in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Canonical basket
    pub basket: Basket,
    /// Detected format
    pub version: FormatVersion,
}

/// One stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Record {
    product: ProductId,
    quantity: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    free: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// One link in the decoder chain
pub trait FormatDecoder: fmt::Debug + Send + Sync {
    /// Newest format this decoder recognises
    fn version(&self) -> FormatVersion;

    /// Decode raw text, or `None` if the shape isn't this decoder's
    fn try_decode(&self, raw: &str, catalog: &Catalog) -> Option<Decoded>;
}

/// Decoder for `Records`
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordsDecoder;

impl FormatDecoder for RecordsDecoder {
    fn version(&self) -> FormatVersion {
        FormatVersion::Records
    }

    fn try_decode(&self, raw: &str, _catalog: &Catalog) -> Option<Decoded> {
        // objects only; serde would also take `["apple", 3]` as a record
        let objects: Vec<Map<String, Value>> = serde_json::from_str(raw).ok()?;
        let mut basket = Basket::new();
        for object in objects {
            let record: Record = serde_json::from_value(Value::Object(object)).ok()?;
            if record.product.is_blank() || record.quantity == 0 {
                tracing::debug!(product = %record.product, "skipping empty basket record");
                continue;
            }
            if record.free {
                basket.add_derived_units(record.product, record.quantity);
            } else {
                basket.add_units(record.product, record.quantity);
            }
        }
        Some(Decoded {
            basket,
            version: FormatVersion::Records,
        })
    }
}

/// Decoder for `FlatIds` and `FlatIdsWithPromotions`
///
/// Ids naming a promotional catalog product become derived entries; every
/// other id counts one purchased unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatIdsDecoder;

impl FormatDecoder for FlatIdsDecoder {
    fn version(&self) -> FormatVersion {
        FormatVersion::FlatIdsWithPromotions
    }

    fn try_decode(&self, raw: &str, catalog: &Catalog) -> Option<Decoded> {
        let ids: Vec<ProductId> = serde_json::from_str(raw).ok()?;
        let mut basket = Basket::new();
        let mut embedded_promotions = false;
        for id in ids {
            if id.is_blank() {
                continue;
            }
            if catalog.is_promotional(id.as_str()) {
                embedded_promotions = true;
                basket.add_derived_units(id, 1);
            } else {
                basket.add_units(id, 1);
            }
        }
        let version = if embedded_promotions {
            FormatVersion::FlatIdsWithPromotions
        } else {
            FormatVersion::FlatIds
        };
        Some(Decoded { basket, version })
    }
}

static DECODERS: [&dyn FormatDecoder; 2] = [&RecordsDecoder, &FlatIdsDecoder];

/// Decode a stored basket through the decoder chain
///
/// An empty array decodes as an empty `Records` basket.
///
/// # Errors
/// Returns error if the text isn't JSON, isn't an array, or matches no
/// decoder.
pub fn decode(raw: &str, catalog: &Catalog) -> Result<Decoded, DecodeError> {
    if let Some(decoded) = DECODERS
        .iter()
        .find_map(|decoder| decoder.try_decode(raw, catalog))
    {
        return Ok(decoded);
    }

    match serde_json::from_str::<Value>(raw)? {
        Value::Array(_) => Err(DecodeError::UnsupportedShape),
        _ => Err(DecodeError::NotASequence),
    }
}

/// Encode a basket as `Records`
///
/// Derived entries are written as `free` records only when
/// `include_derived` is set.
///
/// # Errors
/// Returns error if serialization fails
pub fn encode(basket: &Basket, include_derived: bool) -> Result<String, serde_json::Error> {
    let purchased = basket.purchased().map(|e| Record {
        product: e.product,
        quantity: e.quantity,
        free: false,
    });
    let derived = basket
        .derived()
        .filter(|_| include_derived)
        .map(|e| Record {
            product: e.product,
            quantity: e.quantity,
            free: true,
        });
    let records: Vec<Record> = purchased.chain(derived).collect();
    serde_json::to_string(&records)
}
