//! Structured error types for configuration loading and override resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the YAML configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML.
    #[error("failed to parse config YAML{}: {source}", display_path(.path))]
    Yaml {
        path: Option<PathBuf>,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document root must be a mapping.
    #[error("config root must be a mapping, found {found}")]
    NotAMapping { found: &'static str },
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" {}", p.display()),
        None => String::new(),
    }
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn yaml(path: Option<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Yaml { path, source }
    }
}

/// Unexpected failures while matching an override descriptor.
///
/// Lookup misses are not errors; these are reported to an
/// [`ErrorSink`](crate::logging::ErrorSink) and then treated as "no match".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A namespaced key contained characters outside `[a-z0-9/._-]`.
    #[error("invalid namespaced key '{namespace}:{key}' in override '{descriptor}'")]
    InvalidNamespacedKey {
        namespace: String,
        key: String,
        descriptor: String,
    },

    /// An override name made only of level separators.
    #[error("malformed override name '{descriptor}': no item or enchantment id")]
    MalformedDescriptor { descriptor: String },
}

impl ResolveError {
    pub fn invalid_key(namespace: &str, key: &str) -> Self {
        Self::InvalidNamespacedKey {
            namespace: namespace.to_string(),
            key: key.to_string(),
            descriptor: String::new(),
        }
    }

    /// Attach the override descriptor that produced the failure.
    pub fn with_descriptor(self, descriptor: impl Into<String>) -> Self {
        match self {
            Self::InvalidNamespacedKey { namespace, key, .. } => Self::InvalidNamespacedKey {
                namespace,
                key,
                descriptor: descriptor.into(),
            },
            Self::MalformedDescriptor { .. } => Self::MalformedDescriptor {
                descriptor: descriptor.into(),
            },
        }
    }
}

/// Result type for config loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_message_includes_descriptor() {
        let err = ResolveError::invalid_key("minecraft", "Sharpness").with_descriptor("Sharpness_3");
        assert_eq!(
            err.to_string(),
            "invalid namespaced key 'minecraft:Sharpness' in override 'Sharpness_3'"
        );
    }

    #[test]
    fn test_malformed_descriptor_message() {
        let err = ResolveError::MalformedDescriptor {
            descriptor: "___".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed override name '___': no item or enchantment id"
        );
    }

    #[test]
    fn test_yaml_error_without_path() {
        let source = serde_yaml::from_str::<serde_yaml::Value>("a: [").unwrap_err();
        let err = ConfigError::yaml(None, source);
        assert!(err.to_string().starts_with("failed to parse config YAML: "));
    }

    #[test]
    fn test_yaml_error_with_path() {
        let source = serde_yaml::from_str::<serde_yaml::Value>("a: [").unwrap_err();
        let err = ConfigError::yaml(Some(PathBuf::from("plugins/config.yml")), source);
        assert!(
            err.to_string()
                .starts_with("failed to parse config YAML plugins/config.yml: ")
        );
    }
}
