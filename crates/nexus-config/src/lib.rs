//! Configuration file for the nexus CLI
//!
//! Every field is optional on disk; the accessors supply the defaults. The
//! file location can be overridden with `NEXUS_CONFIG` or a pointer file next
//! to the default location.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_ENV: &str = "NEXUS_CONFIG";
pub const POINTER_FILE: &str = ".nexus_config_path";

pub const DEFAULT_ACCOUNT: &str = "architect@nexus.dev";
pub const DEFAULT_SYNC_DELAY_MS: u64 = 800;
pub const DEFAULT_RESOLVE_DELAY_MS: u64 = 400;
pub const DEFAULT_BRIDGE_DELAY_MS: u64 = 400;
pub const DEFAULT_PAYLOAD_DELAY_MS: u64 = 600;

/// Keys accepted by `get` / `set`
pub const KNOWN_KEYS: &[&str] = &[
    "account",
    "sync-delay-ms",
    "resolve-delay-ms",
    "bridge-delay-ms",
    "payload-delay-ms",
    "seed-demo",
    "manifests",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown config key: {0}. Currently supported keys: {keys}", keys = KNOWN_KEYS.join(", "))]
    UnknownKey(String),

    #[error("Invalid value '{value}' for {key}: expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Identity reported after a successful login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridge_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_delay_ms: Option<u64>,
    /// Publish the demo manifest when the registry is created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_demo: Option<bool>,
    /// Manifest files published when the registry is created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifests: Option<Vec<String>>,
}

impl Config {
    pub fn path() -> PathBuf {
        // Explicit override for tests and isolated runs
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        let default = Self::default_path();

        // A pointer file next to the default config redirects to another location
        if let Some(pointer) = Self::pointer_path_for(&default) {
            if let Ok(contents) = fs::read_to_string(&pointer) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
        }

        default
    }

    /// Platform default location, ignoring overrides
    pub fn default_path() -> PathBuf {
        #[cfg(not(target_os = "windows"))]
        {
            dirs::home_dir().map_or_else(
                || PathBuf::from(".config/nexus/nexus.toml"),
                |h| h.join(".config").join("nexus").join("nexus.toml"),
            )
        }

        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map_or_else(
                || PathBuf::from("nexus\\nexus.toml"),
                |c| c.join("nexus").join("nexus.toml"),
            )
        }
    }

    /// Pointer file that sits beside the default config
    pub fn pointer_path() -> Option<PathBuf> {
        Self::pointer_path_for(&Self::default_path())
    }

    fn pointer_path_for(config_path: &Path) -> Option<PathBuf> {
        config_path.parent().map(|parent| parent.join(POINTER_FILE))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::path())
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&Self::path())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "account" => self.account.clone(),
            "sync-delay-ms" => self.sync_delay_ms.map(|v| v.to_string()),
            "resolve-delay-ms" => self.resolve_delay_ms.map(|v| v.to_string()),
            "bridge-delay-ms" => self.bridge_delay_ms.map(|v| v.to_string()),
            "payload-delay-ms" => self.payload_delay_ms.map(|v| v.to_string()),
            "seed-demo" => self.seed_demo.map(|v| v.to_string()),
            "manifests" => self.manifests.as_ref().map(|paths| paths.join(",")),
            _ => None,
        }
    }

    /// Set a key from its string form. `manifests` takes a comma-separated list.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "account" => self.account = Some(value.to_string()),
            "sync-delay-ms" => self.sync_delay_ms = Some(parse_millis(key, value)?),
            "resolve-delay-ms" => self.resolve_delay_ms = Some(parse_millis(key, value)?),
            "bridge-delay-ms" => self.bridge_delay_ms = Some(parse_millis(key, value)?),
            "payload-delay-ms" => self.payload_delay_ms = Some(parse_millis(key, value)?),
            "seed-demo" => {
                self.seed_demo = Some(value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    expected: "true or false",
                })?);
            }
            "manifests" => {
                self.manifests = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(str::to_string)
                        .collect(),
                );
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        KNOWN_KEYS.iter().all(|key| self.get(key).is_none())
    }

    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        KNOWN_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }

    pub fn account(&self) -> &str {
        self.account.as_deref().unwrap_or(DEFAULT_ACCOUNT)
    }

    pub fn sync_delay(&self) -> Duration {
        Duration::from_millis(self.sync_delay_ms.unwrap_or(DEFAULT_SYNC_DELAY_MS))
    }

    pub fn resolve_delay(&self) -> Duration {
        Duration::from_millis(self.resolve_delay_ms.unwrap_or(DEFAULT_RESOLVE_DELAY_MS))
    }

    pub fn bridge_delay(&self) -> Duration {
        Duration::from_millis(self.bridge_delay_ms.unwrap_or(DEFAULT_BRIDGE_DELAY_MS))
    }

    pub fn payload_delay(&self) -> Duration {
        Duration::from_millis(self.payload_delay_ms.unwrap_or(DEFAULT_PAYLOAD_DELAY_MS))
    }

    pub fn seed_demo(&self) -> bool {
        self.seed_demo.unwrap_or(true)
    }

    pub fn manifest_paths(&self) -> Vec<PathBuf> {
        self.manifests
            .iter()
            .flatten()
            .map(PathBuf::from)
            .collect()
    }
}

fn parse_millis(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected: "a whole number of milliseconds",
    })
}
