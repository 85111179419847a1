//! Typed, ordered configuration tree.
//!
//! YAML documents are converted once into [`Node`]s. Sections keep their
//! children in declaration order, which override matching depends on.
//! Paths use `.` to descend, e.g. `Overrides.DIAMOND.MaxDemand`.

use crate::error::{ConfigError, ConfigResult};
use serde_yaml::Value;
use tracing::warn;

/// Path separator used when descending into sections.
pub const PATH_SEPARATOR: char = '.';

/// A single configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Node>),
    Section(Section),
}

impl Node {
    /// Short type name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Bool(_) => "boolean",
            Node::Int(_) => "integer",
            Node::Float(_) => "float",
            Node::Str(_) => "string",
            Node::List(_) => "list",
            Node::Section(_) => "section",
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Node::Section(section) => Some(section),
            _ => None,
        }
    }

    /// Convert a YAML value. Nulls have no node and are dropped by the caller.
    fn from_yaml(value: Value) -> Option<Node> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Node::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Node::Int(i))
                } else if let Some(u) = n.as_u64() {
                    // Larger than i64::MAX; keep the magnitude as a float
                    Some(Node::Float(u as f64))
                } else {
                    n.as_f64().map(Node::Float)
                }
            }
            Value::String(s) => Some(Node::Str(s)),
            Value::Sequence(items) => Some(Node::List(
                items.into_iter().filter_map(Node::from_yaml).collect(),
            )),
            Value::Mapping(map) => Some(Node::Section(Section::from_mapping(map))),
            Value::Tagged(tagged) => Node::from_yaml(tagged.value),
        }
    }
}

/// Scalar types that can be read out of a section with a default.
///
/// Coercion mirrors the host server's config API: booleans only read
/// booleans, integers and doubles accept any number.
pub trait ConfigScalar: Copy {
    fn from_node(node: &Node) -> Option<Self>;
}

impl ConfigScalar for bool {
    fn from_node(node: &Node) -> Option<Self> {
        match node {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl ConfigScalar for i32 {
    fn from_node(node: &Node) -> Option<Self> {
        // `as` wraps wide integers and saturates floats (NaN becomes 0)
        match node {
            Node::Int(i) => Some(*i as i32),
            Node::Float(f) => Some(*f as i32),
            _ => None,
        }
    }
}

impl ConfigScalar for f64 {
    fn from_node(node: &Node) -> Option<Self> {
        match node {
            Node::Int(i) => Some(*i as f64),
            Node::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// An ordered map of child keys to nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    entries: Vec<(String, Node)>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_mapping(map: serde_yaml::Mapping) -> Self {
        let mut section = Section::new();
        for (key, value) in map {
            let Some(key) = yaml_key_to_string(&key) else {
                warn!("Skipping config entry with unsupported key type: {:?}", key);
                continue;
            };
            if let Some(node) = Node::from_yaml(value) {
                section.insert_path(&key, node);
            }
        }
        section
    }

    /// Insert or replace a direct child, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, node: Node) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = node,
            None => self.entries.push((key, node)),
        }
    }

    /// Insert at a dotted path, creating intermediate sections. A non-section
    /// value in the way is replaced by a new section.
    pub fn insert_path(&mut self, path: &str, node: Node) {
        let Some((head, rest)) = path.split_once(PATH_SEPARATOR) else {
            self.insert(path, node);
            return;
        };
        let index = match self.entries.iter().position(|(k, _)| k == head) {
            Some(index) => index,
            None => {
                self.entries.push((head.to_string(), Node::Section(Section::new())));
                self.entries.len() - 1
            }
        };
        let slot = &mut self.entries[index].1;
        if !matches!(slot, Node::Section(_)) {
            *slot = Node::Section(Section::new());
        }
        if let Node::Section(child) = slot {
            child.insert_path(rest, node);
        }
    }

    /// Direct child keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Direct children in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn child(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up a node by dotted path.
    pub fn get_node(&self, path: &str) -> Option<&Node> {
        let mut segments = path.split(PATH_SEPARATOR);
        let first = segments.next()?;
        let mut node = self.child(first)?;
        for segment in segments {
            node = node.as_section()?.child(segment)?;
        }
        Some(node)
    }

    /// Look up a child section by dotted path. Non-section values yield `None`.
    pub fn section(&self, path: &str) -> Option<&Section> {
        self.get_node(path)?.as_section()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get_node(path).is_some()
    }

    /// Read a scalar, falling back to `default` when the path is absent or
    /// holds a value of another type.
    pub fn get<T: ConfigScalar>(&self, path: &str, default: T) -> T {
        self.get_node(path)
            .and_then(T::from_node)
            .unwrap_or(default)
    }

    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        self.get(path, default)
    }

    pub fn get_int(&self, path: &str, default: i32) -> i32 {
        self.get(path, default)
    }

    pub fn get_double(&self, path: &str, default: f64) -> f64 {
        self.get(path, default)
    }
}

fn yaml_key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => yaml_key_to_string(&tagged.value),
        _ => None,
    }
}

/// The full, read-only configuration document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    root: Section,
}

impl ConfigStore {
    /// Build a store from an already-parsed YAML value.
    ///
    /// An empty document (null) produces an empty store.
    pub fn from_yaml(value: Value) -> ConfigResult<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Mapping(map) => Ok(Self {
                root: Section::from_mapping(map),
            }),
            Value::Tagged(tagged) => Self::from_yaml(tagged.value),
            other => Err(ConfigError::NotAMapping {
                found: yaml_kind(&other),
            }),
        }
    }

    /// Parse a YAML document into a store.
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let value: Value =
            serde_yaml::from_str(content).map_err(|e| ConfigError::yaml(None, e))?;
        Self::from_yaml(value)
    }

    pub fn root(&self) -> &Section {
        &self.root
    }
}

impl std::ops::Deref for ConfigStore {
    type Target = Section;

    fn deref(&self) -> &Section {
        &self.root
    }
}

fn yaml_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(yaml: &str) -> ConfigStore {
        ConfigStore::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn test_keys_keep_declaration_order() {
        let store = store(
            r#"
Overrides:
  zebra: {}
  apple: {}
  mango: {}
"#,
        );
        let overrides = store.section("Overrides").unwrap();
        let keys: Vec<&str> = overrides.keys().collect();
        assert_eq!(keys, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_dotted_path_descends() {
        let store = store(
            r#"
Overrides:
  DIAMOND:
    MaxDemand: 2
"#,
        );
        assert_eq!(store.get_int("Overrides.DIAMOND.MaxDemand", 0), 2);
        assert_eq!(store.get_int("Overrides.EMERALD.MaxDemand", 7), 7);
        assert!(store.section("Overrides.DIAMOND").is_some());
    }

    #[test]
    fn test_scalar_as_section_is_absent() {
        let store = store("Overrides:\n  DIAMOND: 5\n");
        assert!(store.section("Overrides.DIAMOND").is_none());
        assert!(store.contains("Overrides.DIAMOND"));
    }

    #[test]
    fn test_bool_only_reads_booleans() {
        let store = store("DisableTrading: 1\nIgnoreCitizens: true\n");
        assert!(!store.get_bool("DisableTrading", false));
        assert!(store.get_bool("IgnoreCitizens", false));
    }

    #[test]
    fn test_int_reads_floats_by_truncation() {
        let store = store("MaxDemand: 2.9\nBig: 1.0e20\nName: five\n");
        assert_eq!(store.get_int("MaxDemand", 0), 2);
        assert_eq!(store.get_int("Big", 0), i32::MAX);
        assert_eq!(store.get_int("Name", 5), 5);
    }

    #[test]
    fn test_double_reads_integers() {
        let store = store("MaxDiscount: 1\n");
        assert_eq!(store.get_double("MaxDiscount", 0.3), 1.0);
        assert_eq!(store.get_double("Missing", 0.3), 0.3);
    }

    #[test]
    fn test_null_values_are_absent() {
        let store = store("MaxDemand: ~\n");
        assert!(!store.contains("MaxDemand"));
        assert_eq!(store.get_int("MaxDemand", 4), 4);
    }

    #[test]
    fn test_numeric_keys_become_strings() {
        let store = store("Overrides:\n  5: {}\n");
        let keys: Vec<&str> = store.section("Overrides").unwrap().keys().collect();
        assert_eq!(keys, vec!["5"]);
    }

    #[test]
    fn test_empty_document_is_empty_store() {
        let store = store("");
        assert!(store.is_empty());
    }

    #[test]
    fn test_non_mapping_root_is_rejected() {
        let err = ConfigStore::from_yaml_str("- a\n- b\n").unwrap_err();
        assert!(matches!(err, ConfigError::NotAMapping { found: "sequence" }));
    }

    #[test]
    fn test_dotted_keys_become_nested_sections() {
        let store = ConfigStore::from_yaml_str(
            r#"
Overrides:
  a:
    c: 1
  a.b:
    MaxDemand: 3
  DIAMOND.MaxDemand: 2
"#,
        )
        .unwrap();

        assert_eq!(store.get_int("Overrides.a.b.MaxDemand", 0), 3);
        assert_eq!(store.get_int("Overrides.a.c", 0), 1);
        assert_eq!(store.get_int("Overrides.DIAMOND.MaxDemand", 0), 2);
        let keys: Vec<&str> = store.section("Overrides").unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "DIAMOND"]);
    }

    #[test]
    fn test_insert_path_replaces_scalar_in_the_way() {
        let mut section = Section::new();
        section.insert("a", Node::Int(1));
        section.insert_path("a.b", Node::Bool(true));
        assert!(section.get_bool("a.b", false));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut section = Section::new();
        section.insert("a", Node::Int(1));
        section.insert("b", Node::Int(2));
        section.insert("a", Node::Int(3));
        let entries: Vec<(&str, &Node)> = section.entries().collect();
        assert_eq!(entries, vec![("a", &Node::Int(3)), ("b", &Node::Int(2))]);
    }
}
