//! Groove settings stored in grooveconfig
//!
//! [`GrooveConfigExt`] adds typed accessors to [`grooveconfig::Config`] for
//! everything under `sources.groove`. Getters fall back to the built-in default
//! (and persist it) when a key is missing or has the wrong type.
//!
//! # Example
//!
//! ```no_run
//! use grooveconfig::Config;
//! use groove::GrooveConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::from_defaults()?;
//!
//! let ttl = config.get_groove_category_ttl_secs()?;
//! for category in config.get_groove_categories()? {
//!     println!("{} -> {}", category.name, category.url);
//! }
//!
//! // Snapshot injected into the extension
//! let settings = config.get_groove_config()?;
//! # Ok(())
//! # }
//! ```

use crate::client::{
    DEFAULT_BASE_URL, DEFAULT_IMAGE_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use anyhow::Result;
use grooveconfig::Config;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::time::Duration;

/// Default TTL of a category listing (seconds)
pub const DEFAULT_CATEGORY_TTL_SECS: u64 = 60;

/// Default pause between two category fetches (milliseconds)
pub const DEFAULT_CATEGORY_DELAY_MS: u64 = 250;

/// Default bound on album pagination hops
pub const DEFAULT_MAX_PAGE_HOPS: u64 = 5;

/// Default number of song-details attempts
pub const DEFAULT_SONG_RETRY_ATTEMPTS: u64 = 2;

/// Default pause between song-details attempts (milliseconds)
pub const DEFAULT_SONG_RETRY_DELAY_MS: u64 = 300;

/// Default value of the cover art background switch
pub const DEFAULT_SHOW_COVER_ART_BACKGROUND: bool = true;

const ROOT: [&str; 2] = ["sources", "groove"];

/// Category shown on the home and library feeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    pub url: String,
}

impl CategoryConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Built-in category list, in display order
pub fn default_categories() -> Vec<CategoryConfig> {
    [
        ("Bollywood", "https://pagalnew.com/category/bollywood-mp3-songs.html"),
        ("Punjabi", "https://pagalnew.com/category/punjabi-mp3-songs.html"),
        ("Indipop", "https://pagalnew.com/category/indipop-mp3-songs.html"),
        ("Haryanvi", "https://pagalnew.com/category/haryanvi-mp3-songs.html"),
        ("Bhojpuri", "https://pagalnew.com/category/bhojpuri-mp3-songs.html"),
    ]
    .into_iter()
    .map(|(name, url)| CategoryConfig::new(name, url))
    .collect()
}

/// Everything the extension reads from the configuration, resolved once
#[derive(Debug, Clone, PartialEq)]
pub struct GrooveConfig {
    pub base_url: String,
    pub image_base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub category_ttl: Duration,
    pub category_delay: Duration,
    pub max_page_hops: usize,
    pub song_retry_attempts: u32,
    pub song_retry_delay: Duration,
    pub show_cover_art_background: bool,
    pub categories: Vec<CategoryConfig>,
}

impl Default for GrooveConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            category_ttl: Duration::from_secs(DEFAULT_CATEGORY_TTL_SECS),
            category_delay: Duration::from_millis(DEFAULT_CATEGORY_DELAY_MS),
            max_page_hops: DEFAULT_MAX_PAGE_HOPS as usize,
            song_retry_attempts: DEFAULT_SONG_RETRY_ATTEMPTS as u32,
            song_retry_delay: Duration::from_millis(DEFAULT_SONG_RETRY_DELAY_MS),
            show_cover_art_background: DEFAULT_SHOW_COVER_ART_BACKGROUND,
            categories: default_categories(),
        }
    }
}

/// Trait d'extension pour gérer la configuration Groove dans grooveconfig
///
/// # Auto-persist des valeurs par défaut
///
/// Les getters persistent automatiquement les valeurs par défaut dans la
/// configuration si elles n'existent pas encore.
pub trait GrooveConfigExt {
    // ========================================================================
    // API
    // ========================================================================

    fn get_groove_base_url(&self) -> Result<String>;
    fn set_groove_base_url(&self, url: &str) -> Result<()>;

    /// Base URL relative cover paths are resolved against
    fn get_groove_image_base_url(&self) -> Result<String>;
    fn set_groove_image_base_url(&self, url: &str) -> Result<()>;

    /// Connect and read timeout of API requests (seconds)
    fn get_groove_timeout_secs(&self) -> Result<u64>;
    fn set_groove_timeout_secs(&self, secs: u64) -> Result<()>;

    fn get_groove_user_agent(&self) -> Result<String>;
    fn set_groove_user_agent(&self, user_agent: &str) -> Result<()>;

    // ========================================================================
    // Resilience
    // ========================================================================

    fn get_groove_category_ttl_secs(&self) -> Result<u64>;
    fn set_groove_category_ttl_secs(&self, secs: u64) -> Result<()>;

    fn get_groove_category_delay_ms(&self) -> Result<u64>;
    fn set_groove_category_delay_ms(&self, ms: u64) -> Result<()>;

    fn get_groove_max_page_hops(&self) -> Result<u64>;
    fn set_groove_max_page_hops(&self, hops: u64) -> Result<()>;

    fn get_groove_song_retry_attempts(&self) -> Result<u64>;
    fn set_groove_song_retry_attempts(&self, attempts: u64) -> Result<()>;

    fn get_groove_song_retry_delay_ms(&self) -> Result<u64>;
    fn set_groove_song_retry_delay_ms(&self, ms: u64) -> Result<()>;

    // ========================================================================
    // Content
    // ========================================================================

    /// Default of the cover art background switch when the host has no value
    fn get_groove_show_cover_art_background(&self) -> Result<bool>;
    fn set_groove_show_cover_art_background(&self, show: bool) -> Result<()>;

    /// Categories of the home and library feeds, in display order
    ///
    /// Entries with a blank name or URL are skipped.
    fn get_groove_categories(&self) -> Result<Vec<CategoryConfig>>;
    fn set_groove_categories(&self, categories: &[CategoryConfig]) -> Result<()>;

    /// Resolves every setting at once
    fn get_groove_config(&self) -> Result<GrooveConfig>;
}

fn path<'a>(keys: &[&'a str]) -> Vec<&'a str> {
    ROOT.iter().copied().chain(keys.iter().copied()).collect()
}

fn get_string(config: &Config, keys: &[&str], default: &str) -> Result<String> {
    match config.get_value(&path(keys)) {
        Ok(Value::String(s)) if !s.trim().is_empty() => Ok(s),
        _ => {
            set_string(config, keys, default)?;
            Ok(default.to_string())
        }
    }
}

fn set_string(config: &Config, keys: &[&str], value: &str) -> Result<()> {
    config.set_value(&path(keys), Value::String(value.to_string()))
}

fn get_u64(config: &Config, keys: &[&str], default: u64) -> Result<u64> {
    if let Ok(Value::Number(n)) = config.get_value(&path(keys)) {
        if let Some(value) = n.as_u64() {
            return Ok(value);
        }
    }
    // Not set or invalid, use default and persist
    set_u64(config, keys, default)?;
    Ok(default)
}

fn set_u64(config: &Config, keys: &[&str], value: u64) -> Result<()> {
    config.set_value(&path(keys), Value::Number(serde_yaml::Number::from(value)))
}

impl GrooveConfigExt for Config {
    fn get_groove_base_url(&self) -> Result<String> {
        get_string(self, &["api", "base_url"], DEFAULT_BASE_URL)
    }

    fn set_groove_base_url(&self, url: &str) -> Result<()> {
        set_string(self, &["api", "base_url"], url)
    }

    fn get_groove_image_base_url(&self) -> Result<String> {
        get_string(self, &["api", "image_base_url"], DEFAULT_IMAGE_BASE_URL)
    }

    fn set_groove_image_base_url(&self, url: &str) -> Result<()> {
        set_string(self, &["api", "image_base_url"], url)
    }

    fn get_groove_timeout_secs(&self) -> Result<u64> {
        get_u64(self, &["api", "timeout_secs"], DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    fn set_groove_timeout_secs(&self, secs: u64) -> Result<()> {
        set_u64(self, &["api", "timeout_secs"], secs)
    }

    fn get_groove_user_agent(&self) -> Result<String> {
        get_string(self, &["api", "user_agent"], DEFAULT_USER_AGENT)
    }

    fn set_groove_user_agent(&self, user_agent: &str) -> Result<()> {
        set_string(self, &["api", "user_agent"], user_agent)
    }

    fn get_groove_category_ttl_secs(&self) -> Result<u64> {
        get_u64(self, &["feed", "category_ttl_secs"], DEFAULT_CATEGORY_TTL_SECS)
    }

    fn set_groove_category_ttl_secs(&self, secs: u64) -> Result<()> {
        set_u64(self, &["feed", "category_ttl_secs"], secs)
    }

    fn get_groove_category_delay_ms(&self) -> Result<u64> {
        get_u64(self, &["feed", "category_delay_ms"], DEFAULT_CATEGORY_DELAY_MS)
    }

    fn set_groove_category_delay_ms(&self, ms: u64) -> Result<()> {
        set_u64(self, &["feed", "category_delay_ms"], ms)
    }

    fn get_groove_max_page_hops(&self) -> Result<u64> {
        get_u64(self, &["feed", "max_page_hops"], DEFAULT_MAX_PAGE_HOPS)
    }

    fn set_groove_max_page_hops(&self, hops: u64) -> Result<()> {
        set_u64(self, &["feed", "max_page_hops"], hops)
    }

    fn get_groove_song_retry_attempts(&self) -> Result<u64> {
        get_u64(self, &["song", "retry_attempts"], DEFAULT_SONG_RETRY_ATTEMPTS)
    }

    fn set_groove_song_retry_attempts(&self, attempts: u64) -> Result<()> {
        set_u64(self, &["song", "retry_attempts"], attempts)
    }

    fn get_groove_song_retry_delay_ms(&self) -> Result<u64> {
        get_u64(self, &["song", "retry_delay_ms"], DEFAULT_SONG_RETRY_DELAY_MS)
    }

    fn set_groove_song_retry_delay_ms(&self, ms: u64) -> Result<()> {
        set_u64(self, &["song", "retry_delay_ms"], ms)
    }

    fn get_groove_show_cover_art_background(&self) -> Result<bool> {
        match self.get_value(&path(&["show_cover_art_background"])) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => {
                self.set_groove_show_cover_art_background(DEFAULT_SHOW_COVER_ART_BACKGROUND)?;
                Ok(DEFAULT_SHOW_COVER_ART_BACKGROUND)
            }
        }
    }

    fn set_groove_show_cover_art_background(&self, show: bool) -> Result<()> {
        self.set_value(&path(&["show_cover_art_background"]), Value::Bool(show))
    }

    fn get_groove_categories(&self) -> Result<Vec<CategoryConfig>> {
        let value = match self.get_value(&path(&["categories"])) {
            Ok(value @ Value::Sequence(_)) => value,
            _ => {
                let defaults = default_categories();
                self.set_groove_categories(&defaults)?;
                return Ok(defaults);
            }
        };

        let categories: Vec<CategoryConfig> = serde_yaml::from_value(value)?;
        Ok(categories
            .into_iter()
            .filter(|c| !c.name.trim().is_empty() && !c.url.trim().is_empty())
            .collect())
    }

    fn set_groove_categories(&self, categories: &[CategoryConfig]) -> Result<()> {
        let value = serde_yaml::to_value(categories)?;
        self.set_value(&path(&["categories"]), value)
    }

    fn get_groove_config(&self) -> Result<GrooveConfig> {
        Ok(GrooveConfig {
            base_url: self.get_groove_base_url()?,
            image_base_url: self.get_groove_image_base_url()?,
            timeout: Duration::from_secs(self.get_groove_timeout_secs()?),
            user_agent: self.get_groove_user_agent()?,
            category_ttl: Duration::from_secs(self.get_groove_category_ttl_secs()?),
            category_delay: Duration::from_millis(self.get_groove_category_delay_ms()?),
            max_page_hops: self.get_groove_max_page_hops()? as usize,
            song_retry_attempts: self.get_groove_song_retry_attempts()? as u32,
            song_retry_delay: Duration::from_millis(self.get_groove_song_retry_delay_ms()?),
            show_cover_art_background: self.get_groove_show_cover_art_background()?,
            categories: self.get_groove_categories()?,
        })
    }
}
