//! Static validation of the `Overrides` section.
//!
//! Resolution silently ignores overrides it cannot interpret. This pass finds
//! them up front so a server owner can fix the config.

use super::OVERRIDES_SECTION;
use super::descriptor::Descriptor;
use crate::config::{ConfigStore, Node};
use crate::item::{ItemRegistry, NamespacedKey};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// What is wrong with an override entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// `Overrides` itself, or one of its children, is not a section.
    NotASection { found: &'static str },
    UnknownMaterial,
    UnknownEnchantment,
    InvalidEnchantmentKey,
    /// The name is only `_` separators.
    MalformedName,
    /// Stored enchantment levels start at 1, so this can never match.
    LevelOutOfRange { level: i32 },
    /// An earlier entry matches every recipe this one would.
    Shadowed { by: String },
}

/// A single problem found in the `Overrides` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverrideIssue {
    pub key: String,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl fmt::Display for OverrideIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::NotASection { found } => {
                write!(f, "{}: expected a section, found {}", self.key, found)
            }
            IssueKind::UnknownMaterial => write!(f, "{}: unknown material", self.key),
            IssueKind::UnknownEnchantment => write!(f, "{}: unknown enchantment", self.key),
            IssueKind::InvalidEnchantmentKey => write!(
                f,
                "{}: enchantment id must be lowercase [a-z0-9/._-]",
                self.key
            ),
            IssueKind::MalformedName => {
                write!(f, "{}: name has no item or enchantment id", self.key)
            }
            IssueKind::LevelOutOfRange { level } => {
                write!(f, "{}: level {} can never be stored", self.key, level)
            }
            IssueKind::Shadowed { by } => {
                write!(f, "{}: unreachable, '{}' always matches first", self.key, by)
            }
        }
    }
}

/// Check every child of `Overrides`, in declaration order.
pub fn check_overrides(store: &ConfigStore, registry: &dyn ItemRegistry) -> Vec<OverrideIssue> {
    let mut issues = Vec::new();

    let overrides = match store.get_node(OVERRIDES_SECTION) {
        None => return issues,
        Some(Node::Section(section)) => section,
        Some(other) => {
            issues.push(OverrideIssue {
                key: OVERRIDES_SECTION.to_string(),
                kind: IssueKind::NotASection { found: other.kind() },
            });
            return issues;
        }
    };

    // Canonical target -> first entry that claimed it
    let mut claimed: HashMap<String, &str> = HashMap::new();

    for (key, node) in overrides.entries() {
        let mut issue = |kind| {
            issues.push(OverrideIssue {
                key: key.to_string(),
                kind,
            })
        };

        if !matches!(node, Node::Section(_)) {
            issue(IssueKind::NotASection { found: node.kind() });
            continue;
        }

        let target = match Descriptor::classify(key) {
            Descriptor::Material { name } => match registry.match_material(name) {
                Some(material) => format!("material:{}", material),
                None => {
                    issue(IssueKind::UnknownMaterial);
                    continue;
                }
            },
            Descriptor::Enchantment { id, level } => {
                let Ok(enchant_key) = NamespacedKey::minecraft(id) else {
                    issue(IssueKind::InvalidEnchantmentKey);
                    continue;
                };
                if registry.enchantment(&enchant_key).is_none() {
                    issue(IssueKind::UnknownEnchantment);
                    continue;
                }
                if level < 1 {
                    issue(IssueKind::LevelOutOfRange { level });
                    continue;
                }
                format!("enchantment:{}:{}", enchant_key, level)
            }
            Descriptor::Malformed { .. } => {
                issue(IssueKind::MalformedName);
                continue;
            }
        };

        match claimed.get(&target) {
            Some(first) => issue(IssueKind::Shadowed {
                by: first.to_string(),
            }),
            None => {
                claimed.insert(target, key);
            }
        }
    }

    issues
}
