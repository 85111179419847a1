//! Process-wide settings with lock-free reads and atomic reloads.
//!
//! Every lookup resolves against a single snapshot of the config. A reload
//! builds a fresh [`ConfigStore`] and swaps it in; lookups already running
//! finish against the snapshot they started with.

use crate::config::{ConfigLoader, ConfigPaths, ConfigScalar, ConfigStore};
use crate::error::ConfigResult;
use crate::item::{ItemRegistry, VanillaRegistry};
use crate::keys::{self, Setting};
use crate::logging::{ErrorSink, TracingErrorSink};
use crate::overrides::{OverrideIssue, OverrideResolver, Resolution, ResolvedValue, check_overrides};
use crate::recipe::RecipeView;
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::info;

pub struct Settings {
    store: ArcSwap<ConfigStore>,
    /// Where `reload` reads from; `None` for in-memory settings
    paths: Option<ConfigPaths>,
    registry: Arc<dyn ItemRegistry>,
    sink: Arc<dyn ErrorSink>,
}

impl Settings {
    /// Settings over an in-memory store, with the vanilla registry and a
    /// tracing error sink.
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store: ArcSwap::from_pointee(store),
            paths: None,
            registry: Arc::new(VanillaRegistry::new()),
            sink: Arc::new(TracingErrorSink::new().with_name("overrides")),
        }
    }

    /// Load settings from disk; [`reload`](Self::reload) re-reads the same paths.
    pub fn load(paths: ConfigPaths) -> ConfigResult<Self> {
        let loader = ConfigLoader::load_with_paths(paths.clone())?;
        let mut settings = Self::new(loader.into_store());
        settings.paths = Some(paths);
        Ok(settings)
    }

    pub fn with_registry(mut self, registry: Arc<dyn ItemRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn registry(&self) -> &dyn ItemRegistry {
        self.registry.as_ref()
    }

    /// The current config snapshot.
    pub fn snapshot(&self) -> Arc<ConfigStore> {
        self.store.load_full()
    }

    /// Swap in a new store.
    pub fn replace(&self, store: ConfigStore) {
        self.store.store(Arc::new(store));
    }

    /// Re-read configuration from disk. On error the current snapshot stays.
    ///
    /// Returns `false` for in-memory settings, which have nothing to re-read.
    pub fn reload(&self) -> ConfigResult<bool> {
        let Some(ref paths) = self.paths else {
            return Ok(false);
        };
        let loader = ConfigLoader::load_with_paths(paths.clone())?;
        self.replace(loader.into_store());
        info!("Configuration reloaded");
        Ok(true)
    }

    /// Run `f` with a resolver bound to the current snapshot.
    pub fn with_resolver<R>(&self, f: impl FnOnce(&OverrideResolver<'_>) -> R) -> R {
        let store = self.store.load();
        let resolver = OverrideResolver::new(&store, self.registry.as_ref(), self.sink.as_ref());
        f(&resolver)
    }

    pub fn fetch<T: ConfigScalar>(&self, recipe: &dyn RecipeView, key: &str, default: T) -> T {
        self.with_resolver(|r| r.fetch(recipe, key, default))
    }

    pub fn fetch_bool(&self, recipe: &dyn RecipeView, key: &str, default: bool) -> bool {
        self.fetch(recipe, key, default)
    }

    pub fn fetch_int(&self, recipe: &dyn RecipeView, key: &str, default: i32) -> i32 {
        self.fetch(recipe, key, default)
    }

    pub fn fetch_double(&self, recipe: &dyn RecipeView, key: &str, default: f64) -> f64 {
        self.fetch(recipe, key, default)
    }

    pub fn resolve(&self, recipe: &dyn RecipeView, key: &str, default: ResolvedValue) -> Resolution {
        self.with_resolver(|r| r.resolve(recipe, key, default))
    }

    /// Read a known setting with its built-in fallback.
    pub fn fetch_setting<T: ConfigScalar>(&self, recipe: &dyn RecipeView, setting: Setting<T>) -> T {
        self.fetch(recipe, setting.name, setting.default)
    }

    /// Name of the override section that applies to `recipe`.
    pub fn override_name(&self, recipe: &dyn RecipeView) -> Option<String> {
        self.with_resolver(|r| r.find_override(recipe).map(|(name, _)| name.to_string()))
    }

    pub fn disable_trading(&self, recipe: &dyn RecipeView) -> bool {
        self.fetch_setting(recipe, keys::DISABLE_TRADING)
    }

    pub fn max_hero_level(&self, recipe: &dyn RecipeView) -> i32 {
        self.fetch_setting(recipe, keys::MAX_HERO_LEVEL)
    }

    pub fn max_discount(&self, recipe: &dyn RecipeView) -> f64 {
        self.fetch_setting(recipe, keys::MAX_DISCOUNT)
    }

    pub fn max_demand(&self, recipe: &dyn RecipeView) -> i32 {
        self.fetch_setting(recipe, keys::MAX_DEMAND)
    }

    /// Validate the `Overrides` section of the current snapshot.
    pub fn check(&self) -> Vec<OverrideIssue> {
        check_overrides(&self.store.load(), self.registry.as_ref())
    }
}
