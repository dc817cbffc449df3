//! # Crash Reporting Module
//!
//! Fault isolation for unexpected dispatch failures: an internal fault is
//! recorded together with a source label and redacted request details, and a
//! failure inside the reporting path itself must never take the process down.
//!
//! The reporting backend is an injected [`CrashReporter`] capability resolved
//! once at construction via [`reporter_from_settings`]:
//!
//! - [`FileReporter`] appends timestamped entries to the configured crash log
//!   file (`crashlog_path` in the settings).
//! - [`ConsoleReporter`] is the fallback and writes to the diagnostic stream.
//!
//! All reporting goes through the [`crashlog`] shim, which catches both
//! reporter errors and reporter panics and downgrades them to console output.

use serde_json::{Map, Value};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::error;

use crate::config::Settings;

/// Records an unexpected fault together with a source label and contextual
/// details. The notification address from the settings is passed through
/// untouched.
pub trait CrashReporter: Send + Sync {
    fn report(
        &self,
        error: &anyhow::Error,
        source: &str,
        details: &Map<String, Value>,
        notify: Option<&str>,
    ) -> anyhow::Result<()>;
}

/// Fallback reporter writing to the diagnostic stream.
pub struct ConsoleReporter;

impl CrashReporter for ConsoleReporter {
    fn report(
        &self,
        error: &anyhow::Error,
        source: &str,
        details: &Map<String, Value>,
        _notify: Option<&str>,
    ) -> anyhow::Result<()> {
        error!(source = %source, error = ?error, details = ?details, "crashed");
        Ok(())
    }
}

/// Appends timestamped crash entries to a log file.
pub struct FileReporter {
    path: PathBuf,
}

impl FileReporter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CrashReporter for FileReporter {
    fn report(
        &self,
        error: &anyhow::Error,
        source: &str,
        details: &Map<String, Value>,
        notify: Option<&str>,
    ) -> anyhow::Result<()> {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "[{ts}] {source} crashed: {error:?}")?;
        writeln!(file, "details: {}", Value::Object(details.clone()))?;
        if let Some(addr) = notify {
            writeln!(file, "notify: {addr}")?;
        }
        Ok(())
    }
}

/// Invoke the reporter; if reporting itself fails, print both the original
/// error and the secondary failure to the diagnostic stream and carry on.
pub fn crashlog(
    reporter: &dyn CrashReporter,
    error: &anyhow::Error,
    source: &str,
    details: &Map<String, Value>,
    notify: Option<&str>,
) {
    let attempt = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        reporter.report(error, source, details, notify)
    }));
    match attempt {
        Ok(Ok(())) => {}
        Ok(Err(second)) => {
            error!(error = ?error, "CRASH");
            error!(error = ?second, "SUBCRASH");
        }
        Err(panic) => {
            error!(error = ?error, "CRASH");
            error!(panic = ?panic, "SUBCRASH");
        }
    }
}

/// Resolve the reporting backend once, at construction time.
pub fn reporter_from_settings(settings: &Settings) -> Arc<dyn CrashReporter> {
    match &settings.crashlog_path {
        Some(path) => Arc::new(FileReporter::new(path.clone())),
        None => Arc::new(ConsoleReporter),
    }
}
