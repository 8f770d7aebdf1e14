//! Extension settings declared to the host and the store it hands back

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Setting item rendered by the host's settings screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Setting {
    Switch {
        key: String,
        title: String,
        summary: Option<String>,
        default: bool,
    },
}

impl Setting {
    pub fn key(&self) -> &str {
        match self {
            Setting::Switch { key, .. } => key,
        }
    }
}

/// Read access to the values the user picked
pub trait Settings: Send + Sync {
    fn get_bool(&self, key: &str) -> Option<bool>;
}

/// In-memory settings store
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, bool>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bool(&self, key: impl Into<String>, value: bool) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.into(), value);
        }
    }
}

impl Settings for MemorySettings {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.read().ok()?.get(key).copied()
    }
}
