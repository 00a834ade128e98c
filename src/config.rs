//! Configuration file parser for ~/.config/newsdesk/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A value parsed but is unusable (e.g. an empty category list).
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Default backend origin used when neither the config file nor `--base-url`
/// provide one.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Categories offered as filter controls when the config file lists none.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "business",
    "technology",
    "sports",
    "entertainment",
    "health",
    "science",
    "general",
];

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Origin of the news backend; `/apps/news/...` paths are joined onto it.
    pub base_url: String,

    /// Category filter controls, in display order.
    pub categories: Vec<String>,

    /// chrono format string used for the localized article date.
    pub date_format: String,

    /// Where the TUI writes its tracing output. `None` uses the config dir.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            date_format: crate::render::DEFAULT_DATE_FORMAT.to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Empty `categories` list → `Err(ConfigError::Invalid)`
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["base_url", "categories", "date_format", "log_file"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut config: Config = toml::from_str(&content)?;
        config.normalize()?;
        tracing::info!(
            path = %path.display(),
            base_url = %config.base_url,
            categories = config.categories.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Read just the `log_file` key so logging can start before [`Config::load`].
    ///
    /// Emits nothing and returns `None` on any problem; the full load reports it.
    pub fn log_file_hint(path: &Path) -> Option<PathBuf> {
        let meta = std::fs::metadata(path).ok()?;
        if meta.len() > Self::MAX_FILE_SIZE {
            return None;
        }
        let raw = std::fs::read_to_string(path).ok()?.parse::<toml::Table>().ok()?;
        raw.get("log_file")?.as_str().map(PathBuf::from)
    }

    /// Trim and de-duplicate categories, keeping first-seen order.
    fn normalize(&mut self) -> Result<(), ConfigError> {
        let mut seen = Vec::with_capacity(self.categories.len());
        for category in self.categories.drain(..) {
            let category = category.trim().to_string();
            if !category.is_empty() && !seen.contains(&category) {
                seen.push(category);
            }
        }
        if seen.is_empty() {
            return Err(ConfigError::Invalid(
                "categories must name at least one category".to_string(),
            ));
        }
        self.categories = seen;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
