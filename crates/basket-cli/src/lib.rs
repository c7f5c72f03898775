//! Offline tooling for stored baskets
//!
//! Each command runs a [`BasketStore`] over [`MemoryStorage`] seeded with a
//! stored value (for example one copied out of a browser's local storage),
//! so the exact same decode, promotion and render paths as the page are
//! exercised.

use anyhow::{Context, Result};
use basket_core::codec;
use basket_core::{
    BasketConfig, BasketEntry, BasketStore, Catalog, FormatVersion, MemoryStorage, MigrationReport,
};
use basket_view::{IndicatorView, ListView, MemorySurface, RenderOnChange, Renderer};
use serde::Serialize;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Load configuration from a TOML file, or defaults when no path is given
///
/// # Errors
/// Returns error if the file can't be read or parsed
pub fn load_config(path: Option<&Path>) -> Result<BasketConfig> {
    let Some(path) = path else {
        return Ok(BasketConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    BasketConfig::from_toml_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn open_store(storage: MemoryStorage, config: &BasketConfig) -> Result<BasketStore<MemoryStorage>> {
    let catalog = Catalog::standard();
    let policy = config
        .promotions
        .build(&catalog)
        .context("invalid promotion rules")?;
    Ok(BasketStore::new(storage)
        .with_config(config.store.clone())
        .with_catalog(catalog)
        .with_policy(policy))
}

fn seeded(raw: &str, config: &BasketConfig) -> MemoryStorage {
    MemoryStorage::new().with_item(config.store.key.clone(), raw)
}

/// Decoded and rendered view of a stored value
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    /// Detected format, `None` when the value was unreadable
    pub format: Option<FormatVersion>,
    /// Purchased then derived entries, as loaded
    pub entries: Vec<BasketEntry>,
    /// Basket list projection
    pub list: ListView,
    /// Count badge projection
    pub indicator: IndicatorView,
    /// Plain-text rendering
    #[serde(skip)]
    pub text: String,
}

/// Decode a stored value and render it
///
/// # Errors
/// Returns error if the configured promotion rules are invalid
pub fn inspect(raw: &str, config: &BasketConfig) -> Result<InspectReport> {
    let store = open_store(seeded(raw, config), config)?;
    let format = codec::decode(raw, &store.catalog()).ok().map(|d| d.version);
    let basket = store.load();

    let renderer = Renderer::new(store.catalog());
    let mut surface = MemorySurface::new();
    renderer.render(&basket, &mut surface);

    Ok(InspectReport {
        format,
        entries: basket.entries().collect(),
        list: renderer.project_list(&basket),
        indicator: renderer.project_indicator(&basket),
        text: surface.to_text(),
    })
}

/// Result of migrating a stored value
#[derive(Debug, Clone)]
pub struct MigrateOutcome {
    /// Detected format and whether it was rewritten
    pub report: MigrationReport,
    /// Value after migration (unchanged input when nothing was rewritten)
    pub output: String,
}

/// Rewrite a stored value in the current format
///
/// # Errors
/// Returns error if the configured promotion rules are invalid
pub fn migrate(raw: &str, config: &BasketConfig) -> Result<MigrateOutcome> {
    let store = open_store(seeded(raw, config), config)?;
    let report = store.migrate().context("migrating basket")?;
    let output = store
        .storage()
        .raw(&config.store.key)
        .unwrap_or_else(|| raw.to_string());
    Ok(MigrateOutcome { report, output })
}

/// Basket after a sequence of adds
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Entries after the last add
    pub entries: Vec<BasketEntry>,
    /// Basket list projection
    pub list: ListView,
    /// Count badge projection
    pub indicator: IndicatorView,
    /// Stored value at the end
    pub stored: Option<String>,
    /// Storage writes performed
    pub writes: usize,
    /// Plain-text rendering as last pushed by the observer
    #[serde(skip)]
    pub text: String,
}

/// Run adds against an empty in-memory store
///
/// The surface is updated through the store's observer, the same way page
/// controls re-render.
///
/// # Errors
/// Returns error for invalid rules or products
pub fn simulate<S: AsRef<str>>(adds: &[S], config: &BasketConfig) -> Result<SimulationReport> {
    let mut store = open_store(MemoryStorage::new(), config)?;
    let renderer = Renderer::new(store.catalog());
    let surface = Rc::new(RefCell::new(MemorySurface::new()));
    store.subscribe(RenderOnChange::new(renderer.clone(), Rc::clone(&surface)));

    for product in adds {
        let product = product.as_ref();
        store
            .add(product)
            .with_context(|| format!("adding '{product}'"))?;
    }

    let basket = store.load();
    if adds.is_empty() {
        renderer.render(&basket, &mut *surface.borrow_mut());
    }
    let text = surface.borrow().to_text();

    Ok(SimulationReport {
        entries: basket.entries().collect(),
        list: renderer.project_list(&basket),
        indicator: renderer.project_indicator(&basket),
        stored: store.storage().raw(&config.store.key),
        writes: store.storage().write_count(),
        text,
    })
}
