//! # Settings Module
//!
//! Runtime settings for the action router, loaded once before the router is
//! constructed and immutable for its lifetime.
//!
//! Settings come from a YAML file (see [`Settings::load`]) with one
//! environment override: `ACTIONGATE_STACK_SIZE` sets the coroutine stack
//! size and accepts decimal (`32768`) or hex (`0x8000`) values.
//!
//! ```yaml
//! port: 8000
//! crashlog_path: logs/crash.txt
//! crash_notify_email: ops@example.com
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Listening port when neither the CLI nor the settings file names one.
pub const DEFAULT_PORT: u16 = 8000;

/// Coroutine stack size in bytes (16 KiB).
const DEFAULT_STACK_SIZE: usize = 0x4000;

/// External settings consumed at router construction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Listening port; [`DEFAULT_PORT`] when absent.
    #[serde(default)]
    pub port: Option<u16>,
    /// TLS material. Present selects the secure transport.
    #[serde(default)]
    pub ssl: Option<TlsSettings>,
    /// Crash log file. Present selects the file-backed crash reporter.
    #[serde(default)]
    pub crashlog_path: Option<PathBuf>,
    /// Notification address handed to the crash reporter untouched.
    #[serde(default)]
    pub crash_notify_email: Option<String>,
    /// Coroutine stack size in bytes.
    #[serde(default)]
    pub stack_size: Option<usize>,
}

/// Certificate and key paths for the secure transport.
#[derive(Debug, Clone, Deserialize)]
pub struct TlsSettings {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse settings file {}", path.display()))?;
        Ok(settings)
    }

    /// Resolve the listening port. An explicit override wins over the
    /// settings file; the default applies when neither names one.
    pub fn resolve_port(&self, override_port: Option<u16>) -> u16 {
        override_port.or(self.port).unwrap_or(DEFAULT_PORT)
    }

    /// Coroutine stack size: `ACTIONGATE_STACK_SIZE`, then the settings
    /// file, then the default.
    pub fn stack_size(&self) -> usize {
        match env::var("ACTIONGATE_STACK_SIZE") {
            Ok(val) => parse_stack_size(&val).unwrap_or(DEFAULT_STACK_SIZE),
            Err(_) => self.stack_size.unwrap_or(DEFAULT_STACK_SIZE),
        }
    }
}

fn parse_stack_size(val: &str) -> Option<usize> {
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}
