//! TOML-based application configuration.
//!
//! Stores the tunable policy surface:
//! - Buffer shape (pre/post minutes, marker token, visual style)
//! - Scan windows (normal and extended lookahead) and target calendar
//! - Classification filters (guest ceiling, acceptance, exclusion patterns)
//! - Conferencing provider signatures, in match order
//!
//! Configuration is stored at `~/.config/bufferly/config.toml`. Pattern
//! fields are plain strings here; [`crate::Policy::compile`] turns them
//! into compiled matchers and rejects a bad config before any calendar
//! access happens.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Buffer shape configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuffersConfig {
    /// Minutes reserved immediately before a qualifying event.
    #[serde(default = "default_pre_minutes")]
    pub pre_minutes: u32,
    /// Minutes reserved immediately after a qualifying event.
    #[serde(default = "default_post_minutes")]
    pub post_minutes: u32,
    /// Events shorter than this never get buffers.
    #[serde(default = "default_min_event_minutes")]
    pub min_event_minutes: u32,
    /// Token that identifies generated buffers by title. The orphan
    /// reconciler has no other way to find buffers again, so changing
    /// this orphans every buffer created under the old value.
    #[serde(default = "default_marker")]
    pub marker: String,
    /// Calendar color id applied to created buffers.
    #[serde(default = "default_visual_style")]
    pub visual_style: String,
}

/// Scan window configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Forward horizon for a normal buffer pass, in hours.
    #[serde(default = "default_lookahead_hours")]
    pub lookahead_hours: u32,
    /// Forward horizon for an extended pass, in hours.
    #[serde(default = "default_extended_lookahead_hours")]
    pub extended_lookahead_hours: u32,
    /// Calendar to read from and write buffers to.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
}

/// Classification filter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Events with more guests than this never get buffers. Unset means
    /// no ceiling.
    #[serde(default)]
    pub max_guests: Option<u32>,
    /// Require the caller to have accepted (or own, or be tentative on)
    /// the event.
    #[serde(default = "default_true")]
    pub require_acceptance: bool,
    /// Events from calendars matching any of these patterns are ignored,
    /// both for buffering and as conflict neighbors. Order is significant.
    #[serde(default)]
    pub excluded_calendars: Vec<String>,
    /// Events whose title matches any of these patterns are ignored.
    /// Order is significant: the first match is the one reported.
    #[serde(default = "default_excluded_titles")]
    pub excluded_titles: Vec<String>,
    /// Title pattern whose first capture group is a customer code.
    /// A match qualifies the event regardless of conferencing links.
    #[serde(default = "default_customer_code_pattern")]
    pub customer_code_pattern: String,
}

/// One conferencing provider signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureConfig {
    pub pattern: String,
    pub provider: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/bufferly/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferConfig {
    #[serde(default)]
    pub buffers: BuffersConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    /// Conferencing signatures, tried in declared order (first match wins).
    #[serde(default = "default_signatures")]
    pub conferencing: Vec<SignatureConfig>,
}

// Default functions
fn default_pre_minutes() -> u32 {
    15
}
fn default_post_minutes() -> u32 {
    15
}
fn default_min_event_minutes() -> u32 {
    25
}
fn default_marker() -> String {
    "\u{1F552}".to_string() // 🕒
}
fn default_visual_style() -> String {
    "8".to_string() // graphite
}
fn default_lookahead_hours() -> u32 {
    48
}
fn default_extended_lookahead_hours() -> u32 {
    168
}
fn default_calendar_id() -> String {
    "primary".to_string()
}
fn default_true() -> bool {
    true
}
fn default_excluded_titles() -> Vec<String> {
    vec![
        "(?i)^lunch$".to_string(),
        "(?i)^focus time$".to_string(),
        "(?i)^hold:".to_string(),
    ]
}
fn default_customer_code_pattern() -> String {
    r"\[([A-Z][A-Z0-9]{1,9})\]".to_string()
}
fn default_signatures() -> Vec<SignatureConfig> {
    [
        (r"zoom\.us/j/", "Zoom"),
        (r"meet\.google\.com/", "Google Meet"),
        (r"teams\.microsoft\.com/|teams\.live\.com/", "Microsoft Teams"),
        (r"\bwebex\.com/", "Webex"),
        (r"gotomeeting\.com/|goto\.com/meeting", "GoToMeeting"),
    ]
    .iter()
    .map(|(pattern, provider)| SignatureConfig {
        pattern: (*pattern).to_string(),
        provider: (*provider).to_string(),
    })
    .collect()
}

impl Default for BuffersConfig {
    fn default() -> Self {
        Self {
            pre_minutes: default_pre_minutes(),
            post_minutes: default_post_minutes(),
            min_event_minutes: default_min_event_minutes(),
            marker: default_marker(),
            visual_style: default_visual_style(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lookahead_hours: default_lookahead_hours(),
            extended_lookahead_hours: default_extended_lookahead_hours(),
            calendar_id: default_calendar_id(),
        }
    }
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            max_guests: Some(30),
            require_acceptance: true,
            excluded_calendars: Vec::new(),
            excluded_titles: default_excluded_titles(),
            customer_code_pattern: default_customer_code_pattern(),
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            buffers: BuffersConfig::default(),
            scan: ScanConfig::default(),
            filters: FiltersConfig::default(),
            conferencing: default_signatures(),
        }
    }
}

/// Returns `~/.config/bufferly[-dev]/` based on BUFFERLY_ENV.
///
/// Set BUFFERLY_ENV=dev to use a development data directory.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("BUFFERLY_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("bufferly-dev")
    } else {
        base_dir.join("bufferly")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

impl BufferConfig {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the default config if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Parse from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        match current {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a scalar config value by dot-separated key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// into the existing field's type, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut json = serde_json::to_value(&*self)
            .map_err(|e| invalid(e.to_string()))?;

        let mut parts = key.split('.').peekable();
        let mut current = &mut json;
        loop {
            let part = parts.next().ok_or_else(|| invalid("empty key".into()))?;
            if parts.peek().is_none() {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| invalid("unknown config key".into()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| invalid("unknown config key".into()))?;
                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|e| invalid(e.to_string()))?
                            .into(),
                    ),
                    serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.to_string()),
                };
                obj.insert(part.to_string(), new_value);
                break;
            }
            current = current
                .get_mut(part)
                .ok_or_else(|| invalid("unknown config key".into()))?;
        }

        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        self.save()
    }
}
