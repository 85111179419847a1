//! Item types, enchantments and the registry that resolves their names.

use crate::error::ResolveError;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// Namespace used when a key carries none.
pub const MINECRAFT_NAMESPACE: &str = "minecraft";

static VALID_KEY: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"^[a-z0-9/._-]+$").expect("static regex"));
static VALID_NAMESPACE: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"^[a-z0-9._-]+$").expect("static regex"));
static WHITESPACE: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"\s+").expect("static regex"));
static NON_WORD: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"\W").expect("static regex"));

/// An item type, identified by its canonical upper-case name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Material(Cow<'static, str>);

impl Material {
    pub const ENCHANTED_BOOK: Material = Material(Cow::Borrowed("ENCHANTED_BOOK"));
    pub const EMERALD: Material = Material(Cow::Borrowed("EMERALD"));

    /// Wrap a canonical name without consulting a registry.
    pub fn named(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_enchanted_book(&self) -> bool {
        *self == Self::ENCHANTED_BOOK
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a user-supplied material name to its canonical form.
///
/// Strips a `minecraft:` prefix, upper-cases, turns whitespace runs into `_`
/// and drops any remaining non-word characters.
pub fn normalize_material_name(name: &str) -> String {
    let name = name
        .strip_prefix("minecraft:")
        .unwrap_or(name)
        .to_uppercase();
    let name = WHITESPACE.replace_all(&name, "_");
    NON_WORD.replace_all(&name, "").into_owned()
}

/// A `namespace:key` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NamespacedKey {
    namespace: String,
    key: String,
}

impl NamespacedKey {
    pub fn new(namespace: &str, key: &str) -> Result<Self, ResolveError> {
        if !VALID_NAMESPACE.is_match(namespace) || !VALID_KEY.is_match(key) {
            return Err(ResolveError::invalid_key(namespace, key));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            key: key.to_string(),
        })
    }

    /// Key in the default `minecraft` namespace.
    pub fn minecraft(key: &str) -> Result<Self, ResolveError> {
        Self::new(MINECRAFT_NAMESPACE, key)
    }

    /// Parse `namespace:key`, or a bare key in the default namespace.
    pub fn parse(s: &str) -> Result<Self, ResolveError> {
        match s.split_once(':') {
            Some((namespace, key)) => Self::new(namespace, key),
            None => Self::minecraft(s),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for NamespacedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.key)
    }
}

/// An enchantment, identified by its namespaced key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Enchantment(NamespacedKey);

impl Enchantment {
    pub fn new(key: NamespacedKey) -> Self {
        Self(key)
    }

    pub fn key(&self) -> &NamespacedKey {
        &self.0
    }
}

impl fmt::Display for Enchantment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Metadata of an enchanted book: enchantments stored for later application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnchantmentStorageMeta {
    stored: Vec<(Enchantment, i32)>,
}

impl EnchantmentStorageMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an enchantment, replacing the level if already present.
    pub fn add_stored_enchant(&mut self, enchantment: Enchantment, level: i32) {
        match self.stored.iter_mut().find(|(e, _)| *e == enchantment) {
            Some((_, l)) => *l = level,
            None => self.stored.push((enchantment, level)),
        }
    }

    pub fn with_stored_enchant(mut self, enchantment: Enchantment, level: i32) -> Self {
        self.add_stored_enchant(enchantment, level);
        self
    }

    pub fn has_stored_enchant(&self, enchantment: &Enchantment) -> bool {
        self.stored.iter().any(|(e, _)| e == enchantment)
    }

    /// Stored level, or 0 when the enchantment is not stored.
    pub fn stored_enchant_level(&self, enchantment: &Enchantment) -> i32 {
        self.stored
            .iter()
            .find(|(e, _)| e == enchantment)
            .map(|(_, level)| *level)
            .unwrap_or(0)
    }

    pub fn stored_enchants(&self) -> impl Iterator<Item = (&Enchantment, i32)> {
        self.stored.iter().map(|(e, l)| (e, *l))
    }
}

/// Item metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemMeta {
    EnchantmentStorage(EnchantmentStorageMeta),
}

/// A stack of items in a trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemStack {
    material: Material,
    amount: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<ItemMeta>,
}

impl ItemStack {
    pub fn new(material: Material, amount: u32) -> Self {
        Self {
            material,
            amount,
            meta: None,
        }
    }

    /// An enchanted book storing the given enchantments.
    pub fn enchanted_book(stored: EnchantmentStorageMeta) -> Self {
        Self::new(Material::ENCHANTED_BOOK, 1).with_meta(ItemMeta::EnchantmentStorage(stored))
    }

    pub fn with_meta(mut self, meta: ItemMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn enchantment_storage(&self) -> Option<&EnchantmentStorageMeta> {
        match self.meta.as_ref()? {
            ItemMeta::EnchantmentStorage(meta) => Some(meta),
        }
    }
}

/// Resolves material and enchantment names for the running server.
pub trait ItemRegistry: Send + Sync {
    /// Match a loosely formatted material name, `None` when unknown.
    fn match_material(&self, name: &str) -> Option<Material>;

    /// Look up an enchantment by key, `None` when unknown.
    fn enchantment(&self, key: &NamespacedKey) -> Option<Enchantment>;
}

/// Registry of every vanilla material and enchantment.
#[derive(Debug, Clone)]
pub struct VanillaRegistry {
    materials: HashSet<String>,
    enchantments: HashSet<NamespacedKey>,
}

impl VanillaRegistry {
    pub fn new() -> Self {
        let materials = vanilla_materials().map(str::to_string).collect();
        let enchantments = VANILLA_ENCHANTMENTS
            .iter()
            .filter_map(|key| NamespacedKey::minecraft(key).ok())
            .collect();
        Self {
            materials,
            enchantments,
        }
    }

    /// Register an additional material (e.g. from a newer server version).
    pub fn with_material(mut self, name: &str) -> Self {
        self.materials.insert(normalize_material_name(name));
        self
    }

}

impl Default for VanillaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemRegistry for VanillaRegistry {
    fn match_material(&self, name: &str) -> Option<Material> {
        let normalized = normalize_material_name(name);
        self.materials
            .contains(&normalized)
            .then(|| Material::named(normalized))
    }

    fn enchantment(&self, key: &NamespacedKey) -> Option<Enchantment> {
        self.enchantments
            .contains(key)
            .then(|| Enchantment::new(key.clone()))
    }
}

const VANILLA_ENCHANTMENTS: &[&str] = &[
    "aqua_affinity",
    "bane_of_arthropods",
    "binding_curse",
    "blast_protection",
    "breach",
    "channeling",
    "density",
    "depth_strider",
    "efficiency",
    "feather_falling",
    "fire_aspect",
    "fire_protection",
    "flame",
    "fortune",
    "frost_walker",
    "impaling",
    "infinity",
    "knockback",
    "looting",
    "loyalty",
    "luck_of_the_sea",
    "lure",
    "mending",
    "multishot",
    "piercing",
    "power",
    "projectile_protection",
    "protection",
    "punch",
    "quick_charge",
    "respiration",
    "riptide",
    "sharpness",
    "silk_touch",
    "smite",
    "soul_speed",
    "sweeping_edge",
    "swift_sneak",
    "thorns",
    "unbreaking",
    "vanishing_curse",
    "wind_burst",
];

/// Every vanilla item and block id, one per line.
const VANILLA_MATERIALS: &str = include_str!("../data/vanilla_materials.txt");

fn vanilla_materials() -> impl Iterator<Item = &'static str> {
    VANILLA_MATERIALS
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enchant(key: &str) -> Enchantment {
        Enchantment::new(NamespacedKey::minecraft(key).unwrap())
    }

    #[test]
    fn test_normalize_material_name() {
        assert_eq!(normalize_material_name("diamond"), "DIAMOND");
        assert_eq!(normalize_material_name("minecraft:diamond_sword"), "DIAMOND_SWORD");
        assert_eq!(normalize_material_name("name  tag"), "NAME_TAG");
        assert_eq!(normalize_material_name("golden-apple!"), "GOLDENAPPLE");
    }

    #[test]
    fn test_match_material() {
        let registry = VanillaRegistry::new();
        assert_eq!(registry.match_material("diamond"), Some(Material::named("DIAMOND")));
        assert_eq!(registry.match_material("ENCHANTED_BOOK"), Some(Material::ENCHANTED_BOOK));
        assert_eq!(registry.match_material("UNKNOWN_MATERIAL_NAME"), None);
    }

    #[test]
    fn test_registry_covers_trade_items() {
        let registry = VanillaRegistry::new();
        for name in [
            "ROTTEN_FLESH",
            "GRAVEL",
            "LAVA_BUCKET",
            "CAMPFIRE",
            "GRANITE",
            "ANDESITE",
            "DIORITE",
            "OAK_BOAT",
            "LANTERN",
            "LIME_WOOL",
            "CYAN_TERRACOTTA",
            "RED_GLAZED_TERRACOTTA",
            "PUFFERFISH_BUCKET",
            "POINTED_DRIPSTONE",
        ] {
            assert!(registry.match_material(name).is_some(), "{} should be known", name);
        }
    }

    #[test]
    fn test_material_table_has_no_duplicates() {
        let mut seen = HashSet::new();
        for name in vanilla_materials() {
            assert_eq!(name, normalize_material_name(name), "{} is not normalized", name);
            assert!(seen.insert(name), "{} listed twice", name);
        }
    }

    #[test]
    fn test_registry_extension() {
        assert_eq!(VanillaRegistry::new().match_material("ruby"), None);
        let registry = VanillaRegistry::new().with_material("ruby block");
        assert_eq!(
            registry.match_material("RUBY_BLOCK"),
            Some(Material::named("RUBY_BLOCK"))
        );
    }

    #[test]
    fn test_namespaced_key_validation() {
        assert!(NamespacedKey::minecraft("sharpness").is_ok());
        assert!(NamespacedKey::minecraft("sweeping_edge").is_ok());
        assert!(NamespacedKey::minecraft("Sharpness").is_err());
        assert!(NamespacedKey::minecraft("").is_err());
        assert!(NamespacedKey::minecraft("with space").is_err());
    }

    #[test]
    fn test_namespaced_key_parse() {
        let key = NamespacedKey::parse("mymod:frost").unwrap();
        assert_eq!(key.namespace(), "mymod");
        assert_eq!(key.key(), "frost");
        assert_eq!(NamespacedKey::parse("mending").unwrap().to_string(), "minecraft:mending");
    }

    #[test]
    fn test_enchantment_lookup() {
        let registry = VanillaRegistry::new();
        let key = NamespacedKey::minecraft("sharpness").unwrap();
        assert_eq!(registry.enchantment(&key), Some(enchant("sharpness")));
        let unknown = NamespacedKey::minecraft("sharpnes").unwrap();
        assert_eq!(registry.enchantment(&unknown), None);
    }

    #[test]
    fn test_stored_enchant_levels() {
        let meta = EnchantmentStorageMeta::new()
            .with_stored_enchant(enchant("sharpness"), 3)
            .with_stored_enchant(enchant("sharpness"), 4);
        assert!(meta.has_stored_enchant(&enchant("sharpness")));
        assert_eq!(meta.stored_enchant_level(&enchant("sharpness")), 4);
        assert_eq!(meta.stored_enchant_level(&enchant("mending")), 0);
        assert_eq!(meta.stored_enchants().count(), 1);
    }

    #[test]
    fn test_enchanted_book_has_storage() {
        let book = ItemStack::enchanted_book(EnchantmentStorageMeta::new());
        assert!(book.material().is_enchanted_book());
        assert!(book.enchantment_storage().is_some());
        assert!(ItemStack::new(Material::EMERALD, 1).enchantment_storage().is_none());
    }
}
