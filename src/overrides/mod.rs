//! Override resolution for per-recipe settings.
//!
//! Settings are read from the top level of the config, and may be overridden
//! for specific trades by children of the `Overrides` section:
//!
//! ```yaml
//! MaxDemand: 5
//! Overrides:
//!   DIAMOND:          # buy or sell item is a diamond
//!     MaxDemand: 2
//!   sharpness_3:      # sells an enchanted book with Sharpness III
//!     DisableTrading: true
//! ```
//!
//! Children are tried in declaration order and the first match wins, even if
//! a later child would be a narrower fit. Order overrides accordingly.

mod check;
mod descriptor;

pub use check::{IssueKind, OverrideIssue, check_overrides};
pub use descriptor::{Descriptor, LEVEL_SEPARATOR};

use crate::config::{ConfigScalar, ConfigStore, Node, Section};
use crate::error::ResolveError;
use crate::item::{ItemRegistry, Material, NamespacedKey};
use crate::logging::ErrorSink;
use crate::recipe::RecipeView;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Name of the top-level section holding per-item overrides.
pub const OVERRIDES_SECTION: &str = "Overrides";

/// A resolved scalar setting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedValue {
    Bool(bool),
    Int(i32),
    Double(f64),
}

impl ResolvedValue {
    /// Read a value of the same type as `self` from `section`.
    fn read_from(&self, section: &Section, key: &str) -> Option<ResolvedValue> {
        let node = section.get_node(key)?;
        match self {
            ResolvedValue::Bool(_) => bool::from_node(node).map(ResolvedValue::Bool),
            ResolvedValue::Int(_) => i32::from_node(node).map(ResolvedValue::Int),
            ResolvedValue::Double(_) => f64::from_node(node).map(ResolvedValue::Double),
        }
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::Bool(v) => write!(f, "{}", v),
            ResolvedValue::Int(v) => write!(f, "{}", v),
            ResolvedValue::Double(v) => write!(f, "{}", v),
        }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum ValueSource {
    /// Neither the override nor the global config supplied the key.
    Default,
    /// Top-level config.
    Global,
    /// The named child of `Overrides`.
    Override { descriptor: String },
}

/// A resolved value together with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub key: String,
    pub value: ResolvedValue,
    pub source: ValueSource,
    /// The override section matching the recipe, even if it lacks `key`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_override: Option<String>,
}

/// Resolves settings for a recipe against one config snapshot.
pub struct OverrideResolver<'a> {
    store: &'a ConfigStore,
    registry: &'a dyn ItemRegistry,
    sink: &'a dyn ErrorSink,
}

impl<'a> OverrideResolver<'a> {
    pub fn new(
        store: &'a ConfigStore,
        registry: &'a dyn ItemRegistry,
        sink: &'a dyn ErrorSink,
    ) -> Self {
        Self {
            store,
            registry,
            sink,
        }
    }

    /// Read `key` for `recipe`: the first matching override wins, then the
    /// global value, then `default`.
    pub fn fetch<T: ConfigScalar>(&self, recipe: &dyn RecipeView, key: &str, default: T) -> T {
        let global = self.store.get(key, default);
        match self.get_override(recipe) {
            Some(section) => section.get(key, global),
            None => global,
        }
    }

    /// e.g. `DisableTrading`
    pub fn fetch_bool(&self, recipe: &dyn RecipeView, key: &str, default: bool) -> bool {
        self.fetch(recipe, key, default)
    }

    /// e.g. `MaxDemand`
    pub fn fetch_int(&self, recipe: &dyn RecipeView, key: &str, default: i32) -> i32 {
        self.fetch(recipe, key, default)
    }

    /// e.g. `MaxDiscount`
    pub fn fetch_double(&self, recipe: &dyn RecipeView, key: &str, default: f64) -> f64 {
        self.fetch(recipe, key, default)
    }

    /// Resolve `key` and report which tier supplied the value. The type is
    /// taken from `default`.
    pub fn resolve(
        &self,
        recipe: &dyn RecipeView,
        key: &str,
        default: ResolvedValue,
    ) -> Resolution {
        let matched = self.find_override(recipe);
        let matched_override = matched.map(|(name, _)| name.to_string());

        if let Some((name, section)) = matched
            && let Some(value) = default.read_from(section, key)
        {
            return Resolution {
                key: key.to_string(),
                value,
                source: ValueSource::Override {
                    descriptor: name.to_string(),
                },
                matched_override,
            };
        }

        let (value, source) = match default.read_from(self.store.root(), key) {
            Some(value) => (value, ValueSource::Global),
            None => (default, ValueSource::Default),
        };
        Resolution {
            key: key.to_string(),
            value,
            source,
            matched_override,
        }
    }

    /// The override section for `recipe`, if any child of `Overrides` matches.
    pub fn get_override(&self, recipe: &dyn RecipeView) -> Option<&'a Section> {
        self.find_override(recipe).map(|(_, section)| section)
    }

    /// Like [`get_override`](Self::get_override), also returning the
    /// matching child's name.
    pub fn find_override(&self, recipe: &dyn RecipeView) -> Option<(&'a str, &'a Section)> {
        let overrides = self.store.section(OVERRIDES_SECTION)?;
        overrides.keys().find_map(|name| {
            let section = self.get_item(recipe, name)?;
            debug!(descriptor = %name, "Override matched recipe");
            Some((name, section))
        })
    }

    /// The override section named `key` if it applies to `recipe`.
    pub fn get_item(&self, recipe: &dyn RecipeView, key: &str) -> Option<&'a Section> {
        let overrides = self.store.section(OVERRIDES_SECTION)?;
        let section = match overrides.entries().find(|(name, _)| *name == key)? {
            (_, Node::Section(section)) => section,
            _ => return None,
        };

        let matched = match Descriptor::classify(key) {
            Descriptor::Material { name } => self.matches_material(recipe, name),
            Descriptor::Enchantment { id, level } => {
                self.matches_enchantment(recipe, key, id, level)
            }
            Descriptor::Malformed { name } => {
                self.sink.report(&ResolveError::MalformedDescriptor {
                    descriptor: name.to_string(),
                });
                false
            }
        };
        matched.then_some(section)
    }

    /// True if either side of the trade is the named material.
    fn matches_material(&self, recipe: &dyn RecipeView, name: &str) -> bool {
        let Some(material) = self.registry.match_material(name) else {
            return false;
        };
        is_either_side(recipe, &material)
    }

    /// True if the sold item is an enchanted book storing `id` at exactly
    /// `level`. The bought item is never inspected.
    fn matches_enchantment(
        &self,
        recipe: &dyn RecipeView,
        descriptor: &str,
        id: &str,
        level: i32,
    ) -> bool {
        let sell = recipe.sell_item();
        if !sell.material().is_enchanted_book() {
            return false;
        }

        let key = match NamespacedKey::minecraft(id) {
            Ok(key) => key,
            Err(err) => {
                self.sink.report(&err.with_descriptor(descriptor));
                return false;
            }
        };

        let (Some(meta), Some(enchantment)) =
            (sell.enchantment_storage(), self.registry.enchantment(&key))
        else {
            return false;
        };
        meta.has_stored_enchant(&enchantment) && meta.stored_enchant_level(&enchantment) == level
    }
}

fn is_either_side(recipe: &dyn RecipeView, material: &Material) -> bool {
    recipe.sell_item().material() == material || recipe.buy_item().material() == material
}
