//! Deep merge for layered YAML configuration.
//!
//! Mappings merge key by key with the overlay winning. Keys already in the base
//! keep their position; new overlay keys are appended in overlay order, so
//! override declaration order survives merging.

use serde_yaml::Value;

/// Deep merge two YAML values, with `overlay` taking precedence over `base`.
///
/// - Mappings are merged recursively
/// - Sequences, strings, numbers and booleans are replaced entirely
/// - A null overlay keeps the base value (null means "not specified")
///
/// # Example
/// ```
/// use villager_trade_limiter::config::deep_merge;
///
/// let base: serde_yaml::Value = serde_yaml::from_str("MaxDemand: -1\nMaxDiscount: 0.3").unwrap();
/// let overlay: serde_yaml::Value = serde_yaml::from_str("MaxDemand: 4").unwrap();
/// let merged = deep_merge(base, overlay);
/// assert_eq!(merged["MaxDemand"], serde_yaml::Value::from(4));
/// assert_eq!(merged["MaxDiscount"], serde_yaml::Value::from(0.3));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => {
                        let base_value = std::mem::replace(slot, Value::Null);
                        *slot = deep_merge(base_value, overlay_value);
                    }
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
            Value::Mapping(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge multiple values in order, with later values taking precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_overlay_scalar_wins() {
        let result = deep_merge(yaml("MaxDemand: -1\nMaxHeroLevel: 1"), yaml("MaxDemand: 3"));
        assert_eq!(result, yaml("MaxDemand: 3\nMaxHeroLevel: 1"));
    }

    #[test]
    fn test_nested_sections_merge() {
        let base = yaml(
            r#"
Overrides:
  DIAMOND:
    MaxDemand: 2
    MaxDiscount: 0.1
"#,
        );
        let overlay = yaml(
            r#"
Overrides:
  DIAMOND:
    MaxDemand: 6
  EMERALD:
    DisableTrading: true
"#,
        );
        let expected = yaml(
            r#"
Overrides:
  DIAMOND:
    MaxDemand: 6
    MaxDiscount: 0.1
  EMERALD:
    DisableTrading: true
"#,
        );
        assert_eq!(deep_merge(base, overlay), expected);
    }

    #[test]
    fn test_base_key_order_is_kept() {
        let base = yaml("Overrides:\n  b: {}\n  a: {}\n");
        let overlay = yaml("Overrides:\n  c: {}\n  a: {x: 1}\n  d: {}\n");
        let merged = deep_merge(base, overlay);
        let keys: Vec<String> = merged["Overrides"]
            .as_mapping()
            .unwrap()
            .keys()
            .map(|k| k.as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_null_preserves_base() {
        let result = deep_merge(yaml("MaxDemand: 5"), yaml("MaxDemand: ~"));
        assert_eq!(result, yaml("MaxDemand: 5"));
    }

    #[test]
    fn test_sequences_replaced() {
        let result = deep_merge(yaml("Worlds: [a, b]"), yaml("Worlds: [c]"));
        assert_eq!(result, yaml("Worlds: [c]"));
    }

    #[test]
    fn test_merge_all_later_wins() {
        let result = deep_merge_all(vec![
            yaml("MaxDemand: 1"),
            yaml("MaxDiscount: 0.5"),
            yaml("MaxDemand: 9"),
        ]);
        assert_eq!(result, yaml("MaxDemand: 9\nMaxDiscount: 0.5"));
    }

    #[test]
    fn test_merge_all_empty_is_null() {
        assert_eq!(deep_merge_all(Vec::new()), Value::Null);
    }
}
