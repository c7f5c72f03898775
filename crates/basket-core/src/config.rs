//! Store and promotion configuration
//!
//! Configuration is plain serde data so it can come from TOML or JSON:
//!
//! ```toml
//! [store]
//! key = "basket"
//! mode = "persisted"
//!
//! [[promotions.rules]]
//! kind = "free_unit_per_quantity"
//! trigger = "apple"
//! every = 4
//! reward = "orange"
//! ```

use crate::basket::ProductId;
use crate::catalog::{ids, Catalog};
use crate::error::ConfigError;
use crate::promotion::{
    BundlePerTotal, FreeUnitPerQuantity, PromotionPolicy, APPLES_PER_FREE_ORANGE,
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Default storage key
pub const DEFAULT_STORAGE_KEY: &str = "basket";

/// Whether derived entries are stored or recomputed on load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionMode {
    /// Recompute on every load; never stored
    #[default]
    Projected,

    /// Store derived entries as `free` records after each add
    Persisted,
}

/// Basket store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Storage key holding the basket
    pub key: String,
    /// Derived entry handling
    pub mode: PromotionMode,
}

impl StoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With storage key
    #[inline]
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// With promotion mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: PromotionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Check configuration
    ///
    /// # Errors
    /// Returns error if the key is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key.trim().is_empty() {
            return Err(ConfigError::EmptyKey);
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            mode: PromotionMode::default(),
        }
    }
}

/// One configured promotion rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleConfig {
    /// See [`FreeUnitPerQuantity`]
    FreeUnitPerQuantity {
        trigger: ProductId,
        every: u32,
        reward: ProductId,
    },

    /// See [`BundlePerTotal`]
    BundlePerTotal { every: u32, reward: ProductId },
}

impl RuleConfig {
    fn kind(&self) -> &'static str {
        match self {
            Self::FreeUnitPerQuantity { .. } => "free_unit_per_quantity",
            Self::BundlePerTotal { .. } => "bundle_per_total",
        }
    }

    fn check_product(&self, product: &ProductId, catalog: &Catalog) -> Result<(), ConfigError> {
        if catalog.contains(product.as_str()) {
            Ok(())
        } else {
            Err(ConfigError::UnknownProduct {
                rule: self.kind().to_string(),
                product: product.clone(),
            })
        }
    }

    fn every(&self, every: u32) -> Result<NonZeroU32, ConfigError> {
        NonZeroU32::new(every)
            .ok_or_else(|| ConfigError::invalid_rule(self.kind(), "every must be at least 1"))
    }

    /// Append the rule this entry describes to a policy
    fn build_into(&self, policy: &mut PromotionPolicy, catalog: &Catalog) -> Result<(), ConfigError> {
        match self {
            Self::FreeUnitPerQuantity {
                trigger,
                every,
                reward,
            } => {
                let every = self.every(*every)?;
                self.check_product(trigger, catalog)?;
                self.check_product(reward, catalog)?;
                if catalog.is_promotional(trigger.as_str()) {
                    return Err(ConfigError::invalid_rule(
                        self.kind(),
                        format!("trigger '{trigger}' is promotional and can never be purchased"),
                    ));
                }
                policy.push(Box::new(FreeUnitPerQuantity::new(
                    trigger.clone(),
                    every,
                    reward.clone(),
                )));
            }
            Self::BundlePerTotal { every, reward } => {
                let every = self.every(*every)?;
                self.check_product(reward, catalog)?;
                policy.push(Box::new(BundlePerTotal::new(every, reward.clone())));
            }
        }
        Ok(())
    }
}

/// Promotion rules configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionConfig {
    /// Rules in evaluation order
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl PromotionConfig {
    /// Build a policy, checking every rule against the catalog
    ///
    /// # Errors
    /// Returns error for zero thresholds, unknown products, or
    /// promotional triggers
    pub fn build(&self, catalog: &Catalog) -> Result<PromotionPolicy, ConfigError> {
        let mut policy = PromotionPolicy::none();
        for rule in &self.rules {
            rule.build_into(&mut policy, catalog)?;
        }
        Ok(policy)
    }
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            rules: vec![RuleConfig::FreeUnitPerQuantity {
                trigger: ids::APPLE.into(),
                every: APPLES_PER_FREE_ORANGE.get(),
                reward: ids::ORANGE.into(),
            }],
        }
    }
}

/// Full configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketConfig {
    /// Store settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Promotion rules
    #[serde(default)]
    pub promotions: PromotionConfig,
}

impl BasketConfig {
    /// Parse from TOML
    ///
    /// # Errors
    /// Returns error if TOML is invalid or the store section is unusable
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml)?;
        config.store.validate()?;
        Ok(config)
    }

    /// Parse from JSON
    ///
    /// # Errors
    /// Returns error if JSON is invalid or the store section is unusable
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.store.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_store_config_defaults() {
        let config = StoreConfig::new();
        assert_eq!(config.key, "basket");
        assert_eq!(config.mode, PromotionMode::Projected);
    }

    #[test]
    fn test_store_config_builder() {
        let config = StoreConfig::new()
            .with_key("cart")
            .with_mode(PromotionMode::Persisted);
        assert_eq!(config.key, "cart");
        assert_eq!(config.mode, PromotionMode::Persisted);
        assert!(StoreConfig::new().with_key(" ").validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let config = BasketConfig::from_toml_str(
            r#"
            [store]
            mode = "persisted"

            [[promotions.rules]]
            kind = "free_unit_per_quantity"
            trigger = "apple"
            every = 4
            reward = "orange"

            [[promotions.rules]]
            kind = "bundle_per_total"
            every = 10
            reward = "fruit-bundle"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.key, "basket");
        assert_eq!(config.store.mode, PromotionMode::Persisted);
        assert_eq!(config.promotions.rules.len(), 2);
        assert_eq!(
            config.promotions.rules[1],
            RuleConfig::BundlePerTotal {
                every: 10,
                reward: "fruit-bundle".into()
            }
        );
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = BasketConfig::from_toml_str("").unwrap();
        assert_eq!(config, BasketConfig::default());
        assert_eq!(config.promotions.build(&Catalog::standard()).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_json() {
        let config = BasketConfig::from_json_str(
            r#"{"store": {"key": "cart"}, "promotions": {"rules": []}}"#,
        )
        .unwrap();
        assert_eq!(config.store.key, "cart");
        assert!(config.promotions.build(&Catalog::standard()).unwrap().is_empty());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = PromotionConfig {
            rules: vec![RuleConfig::BundlePerTotal {
                every: 0,
                reward: "fruit-bundle".into(),
            }],
        };
        let err = config.build(&Catalog::standard()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRule { .. }));
    }

    #[test]
    fn test_unknown_product_rejected() {
        let config = PromotionConfig {
            rules: vec![RuleConfig::FreeUnitPerQuantity {
                trigger: "apple".into(),
                every: 3,
                reward: "kiwi".into(),
            }],
        };
        let err = config.build(&Catalog::standard()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProduct { .. }));
    }

    #[test]
    fn test_promotional_trigger_rejected() {
        let config = PromotionConfig {
            rules: vec![RuleConfig::FreeUnitPerQuantity {
                trigger: "fruit-bundle".into(),
                every: 1,
                reward: "orange".into(),
            }],
        };
        assert!(config.build(&Catalog::standard()).is_err());
    }
}
