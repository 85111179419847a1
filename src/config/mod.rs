//! Plugin configuration.
//!
//! Configuration comes from two tiers merged key by key:
//! 1. **Defaults** - `config/config.yml`, embedded at build time
//! 2. **Server** - `config.yml` in the plugin data directory
//!
//! ## Environment Variables
//! - `VTL_CONFIG_PATH` - Explicit config file (replaces both tiers)
//! - `VTL_DATA_DIR` - Plugin data directory (default: `plugins/VillagerTradeLimiter`)

mod loader;
mod merge;
mod store;
pub mod watcher;

pub use loader::{
    CONFIG_FILE_NAME, ConfigLoader, ConfigPaths, ConfigTier, DEFAULT_CONFIG, DEFAULT_DATA_DIR,
};
pub use merge::{deep_merge, deep_merge_all};
pub use store::{ConfigScalar, ConfigStore, Node, PATH_SEPARATOR, Section};
