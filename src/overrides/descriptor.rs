//! Classification of override section names.
//!
//! A name is either a material (`DIAMOND`, `NAME_TAG`) or an enchantment with
//! an exact level (`sharpness_3`, `sweeping_edge_2`). The trailing token after
//! the last `_` decides: an integer makes it an enchantment descriptor, anything
//! else leaves the whole name as a material. A name made only of `_` has no
//! tokens at all and is malformed.

use serde::Serialize;

/// Separator between an enchantment id and its level.
pub const LEVEL_SEPARATOR: char = '_';

/// What an override section name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Descriptor<'a> {
    /// Matches the buy or sell item type.
    Material { name: &'a str },
    /// Matches an enchanted book sell item storing `id` at exactly `level`.
    Enchantment { id: &'a str, level: i32 },
    /// Only separators; never matches and is reported.
    Malformed { name: &'a str },
}

impl<'a> Descriptor<'a> {
    /// Classify an override name.
    ///
    /// Empty tokens at the end are skipped when picking the level token, so
    /// `sharpness_3_` reads level 3 with id `sharpness_3`, which then fails the
    /// enchantment lookup.
    pub fn classify(key: &'a str) -> Self {
        let Some(split) = key.rfind(LEVEL_SEPARATOR) else {
            return Descriptor::Material { name: key };
        };

        let trimmed = key.trim_end_matches(LEVEL_SEPARATOR);
        if trimmed.is_empty() {
            return Descriptor::Malformed { name: key };
        }
        let level_token = trimmed.rsplit(LEVEL_SEPARATOR).next().unwrap_or("");

        match level_token.parse::<i32>() {
            Ok(level) => Descriptor::Enchantment {
                id: &key[..split],
                level,
            },
            Err(_) => Descriptor::Material { name: key },
        }
    }
}
