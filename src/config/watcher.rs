//! File watcher for the plugin configuration.
//!
//! Watches the data directory (or the directory of an explicit config file)
//! and emits reload events through a tokio watch channel. Rapid successive
//! writes, as editors tend to produce, are coalesced by debouncing.

use notify_debouncer_mini::{DebouncedEventKind, new_debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Event types emitted when configuration files change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigChangeEvent {
    /// A YAML file in the watched directory changed
    ConfigYaml(PathBuf),
    /// Multiple YAML files changed in quick succession
    BatchChange(Vec<PathBuf>),
    /// Watcher encountered an error
    Error(String),
}

impl ConfigChangeEvent {
    /// Returns true if this event requires a config reload.
    pub fn requires_reload(&self) -> bool {
        !matches!(self, ConfigChangeEvent::Error(_))
    }

    /// Get the affected paths for this event.
    pub fn affected_paths(&self) -> Vec<&Path> {
        match self {
            ConfigChangeEvent::ConfigYaml(p) => vec![p.as_path()],
            ConfigChangeEvent::BatchChange(paths) => paths.iter().map(|p| p.as_path()).collect(),
            ConfigChangeEvent::Error(_) => vec![],
        }
    }
}

/// Configuration for the file watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Debounce duration for coalescing rapid changes.
    pub debounce_duration: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_duration: Duration::from_millis(500),
        }
    }
}

/// Paths to watch for configuration changes.
#[derive(Debug, Clone)]
pub struct WatchPaths {
    /// Directory holding the config file
    pub config_dir: PathBuf,
    /// Only changes to this file name count, when set
    pub file_name: Option<String>,
}

impl WatchPaths {
    /// Watch the directory containing `config_file`, filtered to that file.
    pub fn for_file(config_file: &Path) -> Self {
        let config_dir = config_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = config_file
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);
        Self {
            config_dir,
            file_name,
        }
    }
}

/// Handle to control the config watcher.
pub struct ConfigWatcherHandle {
    /// Receiver for config change events.
    pub events: watch::Receiver<Option<ConfigChangeEvent>>,
    /// Handle to the watcher task (dropping this will stop the watcher).
    _task_handle: tokio::task::JoinHandle<()>,
}

impl ConfigWatcherHandle {
    /// Wait for the next config change event.
    pub async fn wait_for_change(&mut self) -> Option<ConfigChangeEvent> {
        // Skip the initial None value
        loop {
            if self.events.changed().await.is_err() {
                return None;
            }
            let event = self.events.borrow().clone();
            if event.is_some() {
                return event;
            }
        }
    }
}

/// Start watching for config changes.
///
/// Must be called from within a tokio runtime.
pub fn start_config_watcher(
    paths: WatchPaths,
    config: WatcherConfig,
) -> Result<ConfigWatcherHandle, notify::Error> {
    let (event_tx, event_rx) = watch::channel(None);
    let (notify_tx, notify_rx) = mpsc::channel();

    let mut debouncer = new_debouncer(config.debounce_duration, notify_tx)?;

    if paths.config_dir.exists() {
        info!("Watching config directory: {}", paths.config_dir.display());
        debouncer
            .watcher()
            .watch(&paths.config_dir, notify::RecursiveMode::NonRecursive)?;
    } else {
        warn!(
            "Config directory does not exist, skipping watch: {}",
            paths.config_dir.display()
        );
    }

    let task_handle = tokio::task::spawn_blocking(move || {
        // Keep the debouncer alive
        let _debouncer = debouncer;
        process_notify_events(notify_rx, event_tx, &paths);
    });

    Ok(ConfigWatcherHandle {
        events: event_rx,
        _task_handle: task_handle,
    })
}

fn process_notify_events(
    rx: mpsc::Receiver<Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>>,
    tx: watch::Sender<Option<ConfigChangeEvent>>,
    paths: &WatchPaths,
) {
    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<PathBuf> = events
                    .into_iter()
                    .filter(|e| {
                        matches!(
                            e.kind,
                            DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
                        )
                    })
                    .map(|e| e.path)
                    .collect();
                if let Some(event) = classify_events(changed, paths) {
                    debug!("Config change detected: {:?}", event);
                    if tx.send(Some(event)).is_err() {
                        info!("Config watcher receiver dropped, stopping");
                        return;
                    }
                }
            }
            Ok(Err(e)) => {
                error!("File watcher error: {}", e);
                let _ = tx.send(Some(ConfigChangeEvent::Error(e.to_string())));
            }
            Err(_) => {
                info!("Config watcher channel closed, stopping");
                return;
            }
        }
    }
}

/// Collapse a debounced batch into at most one event.
fn classify_events(changed: Vec<PathBuf>, paths: &WatchPaths) -> Option<ConfigChangeEvent> {
    let mut relevant: Vec<PathBuf> = changed
        .into_iter()
        .filter(|p| is_config_path(p, paths))
        .collect();

    match relevant.len() {
        0 => None,
        1 => relevant.pop().map(ConfigChangeEvent::ConfigYaml),
        _ => Some(ConfigChangeEvent::BatchChange(relevant)),
    }
}

fn is_config_path(path: &Path, paths: &WatchPaths) -> bool {
    let extension = path.extension().and_then(|e| e.to_str());
    if !matches!(extension, Some("yml") | Some("yaml")) {
        return false;
    }
    if let Some(ref wanted) = paths.file_name {
        return path.file_name().and_then(|n| n.to_str()) == Some(wanted.as_str());
    }
    true
}
