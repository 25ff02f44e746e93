//! Recovery Configuration
//!
//! Loaded from a JSON file; every field has a default so a missing file or
//! an empty object yields a working configuration. A handful of fields can
//! be overridden from the environment (`AERORETRY_*`).

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::headers::{is_machine_name, HeaderTransform, ReplyToStrategy};
use crate::host::{HostIdentity, StaticHostIdentity, SystemHostIdentity};
use crate::observability::{JsonRecoveryLog, RecoveryLog, Severity};
use crate::redirects::{CachedRedirectStore, RedirectStore};

const ENV_MACHINE_NAME: &str = "AERORETRY_MACHINE_NAME";
const ENV_DEFAULT_REPLY_QUEUE: &str = "AERORETRY_DEFAULT_REPLY_QUEUE";
const ENV_LOG_LEVEL: &str = "AERORETRY_LOG_LEVEL";

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Machine name used to repair reply-to headers.
    /// When absent the host's own identity is used.
    #[serde(default)]
    pub machine_name: Option<String>,

    /// Reply queue used when none can be salvaged from the message
    /// (default: "error.replies")
    #[serde(default = "default_reply_queue")]
    pub default_reply_queue: String,

    /// Cache the redirect table between edits (default: false)
    #[serde(default)]
    pub redirect_cache: bool,

    /// Minimum severity written by the JSON log (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: Severity,
}

fn default_reply_queue() -> String {
    "error.replies".to_string()
}

fn default_log_level() -> Severity {
    Severity::Info
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            machine_name: None,
            default_reply_queue: default_reply_queue(),
            redirect_cache: false,
            log_level: default_log_level(),
        }
    }
}

impl RecoveryConfig {
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io(format!("{}: {}", path.display(), e))),
        }
    }

    /// Load from `path`, apply the environment overrides and validate.
    pub fn resolve(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let config = Self::load(path)?.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `AERORETRY_*` environment overrides.
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        if let Some(machine_name) = lookup(ENV_MACHINE_NAME) {
            self.machine_name = Some(machine_name);
        }
        if let Some(queue) = lookup(ENV_DEFAULT_REPLY_QUEUE) {
            self.default_reply_queue = queue;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = serde_json::from_value(serde_json::Value::String(level.to_lowercase()))
                .map_err(|_| ConfigError::Invalid(format!("unknown log level: {}", level)))?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(machine_name) = &self.machine_name {
            if !is_machine_name(machine_name) {
                return Err(ConfigError::Invalid(format!(
                    "machine_name is not a valid host name: {:?}",
                    machine_name
                )));
            }
        }

        if !is_machine_name(&self.default_reply_queue) {
            return Err(ConfigError::Invalid(format!(
                "default_reply_queue is not a valid queue name: {:?}",
                self.default_reply_queue
            )));
        }

        Ok(())
    }

    /// The configured machine name, or the system's.
    pub fn host_identity(&self) -> Box<dyn HostIdentity> {
        match &self.machine_name {
            Some(name) => Box::new(StaticHostIdentity::new(name.clone())),
            None => Box::new(SystemHostIdentity),
        }
    }

    /// Validates first; an invalid name never reaches a reply-to header.
    pub fn header_transform(&self) -> ConfigResult<HeaderTransform> {
        self.validate()?;
        Ok(HeaderTransform::new(ReplyToStrategy::new(
            self.host_identity().machine_name(),
            self.default_reply_queue.clone(),
        )))
    }

    /// Wrap `inner` in a cache when `redirect_cache` is set.
    pub fn redirect_store<R>(&self, inner: R) -> Arc<dyn RedirectStore>
    where
        R: RedirectStore + 'static,
    {
        if self.redirect_cache {
            Arc::new(CachedRedirectStore::new(inner))
        } else {
            Arc::new(inner)
        }
    }

    pub fn recovery_log(&self) -> Arc<dyn RecoveryLog> {
        Arc::new(JsonRecoveryLog::new(self.log_level))
    }
}
