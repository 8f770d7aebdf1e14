//! # Groove Configuration Module
//!
//! This module provides configuration management for the Groove extension, including:
//! - Embedded default configuration
//! - Optional YAML override file in a configuration directory
//! - Environment variable overrides
//! - Path-based getters and setters for configuration values
//!
//! Unlike a process-wide singleton, a [`Config`] is created explicitly and
//! handed to whoever needs it (usually wrapped in an `Arc`).
//!
//! ## Usage
//!
//! ```no_run
//! use grooveconfig::Config;
//!
//! // In-memory configuration built from the embedded defaults
//! let config = Config::from_defaults()?;
//! let level = config.get_log_min_level()?;
//!
//! // File-backed configuration (created on first use)
//! let config = Config::load_config("/tmp/groove")?;
//! config.set_value(&["host", "logger", "min_level"], "DEBUG".into())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use serde_yaml::{Mapping, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("groove.yaml");

const ENV_CONFIG_DIR: &str = "GROOVE_CONFIG";
const ENV_PREFIX: &str = "GROOVE_CONFIG__";
const CONFIG_DIR_NAME: &str = ".groove";
const CONFIG_FILE_NAME: &str = "config.yaml";

const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";

/// Configuration manager for the Groove extension
///
/// The configuration is a YAML tree. Keys are case-insensitive: they are
/// lower-cased on load and on every access.
///
/// A configuration is either file-backed ([`Config::load_config`]), in which case
/// every [`Config::set_value`] is persisted, or purely in-memory
/// ([`Config::from_defaults`], [`Config::from_yaml_str`]).
#[derive(Debug)]
pub struct Config {
    path: Option<PathBuf>,
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self
            .data
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        Self {
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> PathBuf {
        // 1. Try provided directory
        if !directory.is_empty() {
            return PathBuf::from(directory);
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return PathBuf::from(env_path);
        }

        // 3. Try current directory
        if Path::new(CONFIG_DIR_NAME).exists() {
            return PathBuf::from(CONFIG_DIR_NAME);
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config;
            }
        }

        PathBuf::from(CONFIG_DIR_NAME)
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("{} is not a directory", path.display()));
        }

        Ok(())
    }

    /// Builds an in-memory configuration from the embedded defaults
    ///
    /// Environment overrides are applied.
    pub fn from_defaults() -> Result<Self> {
        Self::from_yaml_str("")
    }

    /// Builds an in-memory configuration from YAML merged over the defaults
    ///
    /// An empty string yields the defaults. Environment overrides are applied.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config_value = Self::merged_value(yaml.as_bytes())?;
        Ok(Config {
            path: None,
            data: Mutex::new(config_value),
        })
    }

    /// Loads the configuration from a directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `GROOVE_CONFIG` environment variable
    /// 3. `.groove` in the current directory
    /// 4. `.groove` in the user's home directory
    ///
    /// The embedded defaults are merged with `config.yaml` when present, then
    /// environment overrides are applied and the result is written back.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);
        Self::validate_config_dir(&config_dir)?;
        info!(config_dir = %config_dir.display(), "Using config directory");

        let path = config_dir.join(CONFIG_FILE_NAME);

        let yaml_data = match fs::read(&path) {
            Ok(data) => {
                info!(config_file = %path.display(), "Loaded config file");
                data
            }
            Err(_) => {
                info!(config_file = %path.display(), "Config file not found, using default embedded config");
                Vec::new()
            }
        };

        let config = Config {
            path: Some(path),
            data: Mutex::new(Self::merged_value(&yaml_data)?),
        };

        config.save()?;
        Ok(config)
    }

    fn merged_value(external: &[u8]) -> Result<Value> {
        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        if !external.is_empty() {
            let external_value: Value = serde_yaml::from_slice(external)?;
            merge_yaml(&mut default_value, &external_value);
        }

        let mut config_value = lower_keys(default_value);
        Self::apply_env_overrides(&mut config_value);
        Ok(config_value)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Value>> {
        self.data
            .lock()
            .map_err(|_| anyhow!("Configuration lock poisoned"))
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Saves the current configuration to its file
    ///
    /// Does nothing for in-memory configurations.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let yaml = {
            let data = self.lock()?;
            serde_yaml::to_string(&*data)?
        };
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["sources", "groove", "api", "base_url"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.lock()?;
            *node_mut(&mut data, path)? = value;
        }
        self.save()
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock()?;
        node(&data, path).cloned()
    }

    /// `GROOVE_CONFIG__SOURCES__GROOVE__API__BASE_URL=...` sets
    /// `sources.groove.api.base_url`; values are parsed as YAML scalars
    fn apply_env_overrides(config: &mut Value) {
        for (key, raw) in env::vars() {
            let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let keys: Vec<&str> = stripped.split("__").collect();
            let value = serde_yaml::from_str::<Value>(&raw).unwrap_or(Value::String(raw.clone()));
            if let Ok(slot) = node_mut(config, &keys) {
                *slot = value;
            }
        }
    }

    /// Récupère le niveau de log minimum depuis la configuration
    pub fn get_log_min_level(&self) -> Result<String> {
        match self.get_value(&["host", "logger", "min_level"]) {
            Ok(Value::String(s)) => Ok(s),
            _ => Ok(DEFAULT_LOG_MIN_LEVEL.to_string()),
        }
    }

    /// Définit le niveau de log minimum dans la configuration
    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&["host", "logger", "min_level"], Value::String(level))
    }
}

/// Node at `path`, keys compared lower-cased
fn node<'a>(root: &'a Value, path: &[&str]) -> Result<&'a Value> {
    path.iter().enumerate().try_fold(root, |current, (depth, key)| {
        let Value::Mapping(map) = current else {
            return Err(anyhow!("Path {} is not a mapping", path[..depth].join(".")));
        };
        map.get(key.to_lowercase().as_str())
            .ok_or_else(|| anyhow!("Path {} does not exist", path[..=depth].join(".")))
    })
}

/// Mutable node at `path`, creating missing (or null) intermediate mappings
fn node_mut<'a>(root: &'a mut Value, path: &[&str]) -> Result<&'a mut Value> {
    let mut current = root;
    for (depth, key) in path.iter().enumerate() {
        if current.is_null() {
            *current = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(map) = current else {
            return Err(anyhow!("Path {} is not a mapping", path[..depth].join(".")));
        };
        current = map
            .entry(Value::String(key.to_lowercase()))
            .or_insert(Value::Null);
    }
    Ok(current)
}

/// Recursively lower-cases every string key
fn lower_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(key, child)| {
                    let key = match key {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    (key, lower_keys(child))
                })
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(lower_keys).collect()),
        other => other,
    }
}

/// Overlays `overlay` onto `base`
///
/// Mappings are merged key by key; any other value replaces the base one.
fn merge_yaml(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                if let Some(slot) = base_map.get_mut(key) {
                    merge_yaml(slot, value);
                } else {
                    base_map.insert(key.clone(), value.clone());
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}
