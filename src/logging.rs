//! Logging setup and the error sink used by override resolution.
//!
//! All output goes through `tracing`. The CLI picks the destination with
//! `--log`: `0`/`off`, `1`/`stdout`, `2`/`stderr` (default), or a file name
//! that is opened in append mode.

use crate::error::ResolveError;
use anyhow::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Where log output is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stdout,
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// Parse the `--log` argument.
    pub fn parse(s: &str) -> Self {
        match s {
            "0" | "off" => LogTarget::Off,
            "1" | "stdout" => LogTarget::Stdout,
            "2" | "stderr" => LogTarget::Stderr,
            filename => LogTarget::File(PathBuf::from(filename)),
        }
    }
}

/// Install the global tracing subscriber.
pub fn init(target: &LogTarget, verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    match target {
        LogTarget::Off => {}
        LogTarget::Stdout => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::Stderr => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

/// Receives unexpected failures from override matching.
///
/// Reporting is fire-and-forget; resolution continues as if nothing matched.
pub trait ErrorSink: Send + Sync {
    fn report(&self, error: &ResolveError);
}

/// Error sink that logs through `tracing` at error level.
#[derive(Debug, Clone, Default)]
pub struct TracingErrorSink {
    name: Option<String>,
}

impl TracingErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag reports with a logger name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl ErrorSink for TracingErrorSink {
    fn report(&self, error: &ResolveError) {
        if let Some(ref name) = self.name {
            tracing::error!(logger = %name, "{}", error);
        } else {
            tracing::error!("{}", error);
        }
    }
}

/// Error sink that keeps every report, for inspection after the fact.
#[derive(Debug, Default)]
pub struct CollectingErrorSink {
    errors: Mutex<Vec<ResolveError>>,
}

impl CollectingErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all reports collected so far.
    pub fn drain(&self) -> Vec<ResolveError> {
        match self.errors.lock() {
            Ok(mut errors) => std::mem::take(&mut *errors),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl ErrorSink for CollectingErrorSink {
    fn report(&self, error: &ResolveError) {
        match self.errors.lock() {
            Ok(mut errors) => errors.push(error.clone()),
            Err(poisoned) => poisoned.into_inner().push(error.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_target_parse() {
        assert_eq!(LogTarget::parse("0"), LogTarget::Off);
        assert_eq!(LogTarget::parse("off"), LogTarget::Off);
        assert_eq!(LogTarget::parse("1"), LogTarget::Stdout);
        assert_eq!(LogTarget::parse("stdout"), LogTarget::Stdout);
        assert_eq!(LogTarget::parse("2"), LogTarget::Stderr);
        assert_eq!(LogTarget::parse("stderr"), LogTarget::Stderr);
        assert_eq!(
            LogTarget::parse("vtl.log"),
            LogTarget::File(PathBuf::from("vtl.log"))
        );
    }

    #[test]
    fn test_collecting_sink_drains() {
        let sink = CollectingErrorSink::new();
        sink.report(&ResolveError::invalid_key("minecraft", "Bad"));
        sink.report(&ResolveError::invalid_key("minecraft", "Worse"));
        assert_eq!(sink.drain().len(), 2);
        assert!(sink.drain().is_empty());
    }

    #[test]
    fn test_tracing_sink_does_not_panic_without_subscriber() {
        let sink = TracingErrorSink::new().with_name("overrides");
        sink.report(&ResolveError::invalid_key("minecraft", "Bad"));
    }
}
