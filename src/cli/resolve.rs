//! Resolve subcommand: show the effective settings for one trade.

use crate::format::{OutputFormat, format_resolutions_json, format_resolutions_markdown};
use crate::item::{EnchantmentStorageMeta, ItemMeta, ItemRegistry, ItemStack, NamespacedKey};
use crate::keys;
use crate::overrides::{Resolution, ResolvedValue};
use crate::recipe::MerchantRecipe;
use crate::settings::Settings;
use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, ValueEnum};

/// Scalar type of a setting not known to the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SettingKind {
    Bool,
    Int,
    Double,
}

/// Arguments for the resolve subcommand
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Item the villager sells (e.g. diamond, enchanted_book)
    #[arg(long, value_name = "MATERIAL")]
    pub sell: String,

    /// Item the player pays with
    #[arg(long, value_name = "MATERIAL", default_value = "emerald")]
    pub buy: String,

    /// Enchantment stored on the sold book, as `id:level` (repeatable)
    #[arg(long, value_name = "ID:LEVEL")]
    pub sell_enchant: Vec<String>,

    /// Enchantment stored on the bought book, as `id:level` (repeatable)
    #[arg(long, value_name = "ID:LEVEL")]
    pub buy_enchant: Vec<String>,

    /// Setting to resolve (repeatable; default: every known setting)
    #[arg(short, long, value_name = "KEY")]
    pub key: Vec<String>,

    /// Type of keys that are not known settings
    #[arg(long, value_enum, default_value = "int")]
    pub kind: SettingKind,

    /// Fallback for keys that are not known settings
    #[arg(long, value_name = "VALUE")]
    pub default: Option<String>,
}

impl ResolveArgs {
    /// Build the trade described by the arguments.
    pub fn recipe(&self, registry: &dyn ItemRegistry) -> Result<MerchantRecipe> {
        let buy = build_item(registry, &self.buy, &self.buy_enchant, "--buy")?;
        let sell = build_item(registry, &self.sell, &self.sell_enchant, "--sell")?;
        Ok(MerchantRecipe::new(buy, sell))
    }

    /// The settings to resolve, each with its typed fallback.
    pub fn requested(&self) -> Result<Vec<(String, ResolvedValue)>> {
        if self.key.is_empty() {
            return Ok(keys::ALL
                .iter()
                .map(|k| (k.name.to_string(), k.default))
                .collect());
        }

        self.key
            .iter()
            .map(|name| match keys::lookup(name) {
                Some(known) => Ok((known.name.to_string(), known.default)),
                None => Ok((name.clone(), self.fallback()?)),
            })
            .collect()
    }

    fn fallback(&self) -> Result<ResolvedValue> {
        let raw = self.default.as_deref();
        Ok(match self.kind {
            SettingKind::Bool => ResolvedValue::Bool(match raw {
                Some(s) => s.parse().with_context(|| format!("invalid bool default '{}'", s))?,
                None => false,
            }),
            SettingKind::Int => ResolvedValue::Int(match raw {
                Some(s) => s.parse().with_context(|| format!("invalid int default '{}'", s))?,
                None => 0,
            }),
            SettingKind::Double => ResolvedValue::Double(match raw {
                Some(s) => s.parse().with_context(|| format!("invalid double default '{}'", s))?,
                None => 0.0,
            }),
        })
    }
}

fn build_item(
    registry: &dyn ItemRegistry,
    name: &str,
    enchants: &[String],
    flag: &str,
) -> Result<ItemStack> {
    let material = registry
        .match_material(name)
        .ok_or_else(|| anyhow!("{}: unknown material '{}'", flag, name))?;
    let item = ItemStack::new(material, 1);
    if enchants.is_empty() {
        return Ok(item);
    }
    if !item.material().is_enchanted_book() {
        bail!("{}-enchant needs {} enchanted_book", flag, flag);
    }

    let mut meta = EnchantmentStorageMeta::new();
    for spec in enchants {
        let (id, level) = parse_enchant(spec)?;
        let enchantment = registry
            .enchantment(&id)
            .ok_or_else(|| anyhow!("unknown enchantment '{}'", id))?;
        meta.add_stored_enchant(enchantment, level);
    }
    Ok(item.with_meta(ItemMeta::EnchantmentStorage(meta)))
}

/// Parse `id:level` or `namespace:id:level`.
pub fn parse_enchant(spec: &str) -> Result<(NamespacedKey, i32)> {
    let (id, level) = spec
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("expected ID:LEVEL, got '{}'", spec))?;
    let level: i32 = level
        .parse()
        .with_context(|| format!("invalid enchantment level in '{}'", spec))?;
    let key = NamespacedKey::parse(id)?;
    Ok((key, level))
}

/// Resolve every requested setting against the current config.
pub fn resolve_all(settings: &Settings, args: &ResolveArgs) -> Result<Vec<Resolution>> {
    let recipe = args.recipe(settings.registry())?;
    let requested = args.requested()?;
    Ok(settings.with_resolver(|resolver| {
        requested
            .iter()
            .map(|(key, default)| resolver.resolve(&recipe, key, *default))
            .collect()
    }))
}

/// Render resolutions in the requested format.
pub fn render(resolutions: &[Resolution], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Markdown => format_resolutions_markdown(resolutions),
        OutputFormat::Json => serde_json::to_string_pretty(&format_resolutions_json(resolutions))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use crate::item::VanillaRegistry;
    use crate::overrides::ValueSource;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ResolveArgs,
    }

    fn args(argv: &[&str]) -> ResolveArgs {
        let mut full = vec!["resolve"];
        full.extend_from_slice(argv);
        Harness::parse_from(full).args
    }

    #[test]
    fn test_parse_enchant() {
        let (key, level) = parse_enchant("sharpness:3").unwrap();
        assert_eq!(key.to_string(), "minecraft:sharpness");
        assert_eq!(level, 3);
        let (key, _) = parse_enchant("minecraft:mending:1").unwrap();
        assert_eq!(key.key(), "mending");
        assert!(parse_enchant("sharpness").is_err());
        assert!(parse_enchant("sharpness:x").is_err());
    }

    #[test]
    fn test_recipe_with_book() {
        let args = args(&["--sell", "enchanted_book", "--sell-enchant", "sharpness:3"]);
        let recipe = args.recipe(&VanillaRegistry::new()).unwrap();
        let storage = crate::recipe::RecipeView::sell_item(&recipe)
            .enchantment_storage()
            .unwrap();
        assert_eq!(storage.stored_enchants().count(), 1);
    }

    #[test]
    fn test_enchant_requires_book() {
        let args = args(&["--sell", "diamond", "--sell-enchant", "sharpness:3"]);
        assert!(args.recipe(&VanillaRegistry::new()).is_err());
    }

    #[test]
    fn test_unknown_material_is_error() {
        let args = args(&["--sell", "UNKNOWN_MATERIAL_NAME"]);
        assert!(args.recipe(&VanillaRegistry::new()).is_err());
    }

    #[test]
    fn test_requested_defaults_to_known_settings() {
        let requested = args(&["--sell", "diamond"]).requested().unwrap();
        assert_eq!(requested.len(), keys::ALL.len());
    }

    #[test]
    fn test_requested_custom_key() {
        let requested = args(&[
            "--sell", "diamond", "--key", "Cooldown", "--kind", "double", "--default", "1.5",
        ])
        .requested()
        .unwrap();
        assert_eq!(requested, vec![("Cooldown".to_string(), ResolvedValue::Double(1.5))]);
    }

    #[test]
    fn test_resolve_all() {
        let settings = Settings::new(
            ConfigStore::from_yaml_str("MaxDemand: 5\nOverrides:\n  DIAMOND:\n    MaxDemand: 2\n")
                .unwrap(),
        );
        let resolutions =
            resolve_all(&settings, &args(&["--sell", "diamond", "--key", "maxdemand"])).unwrap();
        assert_eq!(resolutions.len(), 1);
        assert_eq!(resolutions[0].key, "MaxDemand");
        assert_eq!(resolutions[0].value, ResolvedValue::Int(2));
        assert!(matches!(resolutions[0].source, ValueSource::Override { .. }));
    }
}
