//! Browser-rendered site metadata extraction
//!
//! Renders each input page in its own headless Chrome session, scrolls it to
//! materialize lazy-loaded content, then reads title, language, description,
//! keywords and social-media profile links from the live DOM. URLs are
//! processed in fixed-size batches with cooperative concurrency inside each
//! batch.

pub mod browser;
pub mod browser_setup;
pub mod input;
pub mod orchestrator;
pub mod origin;
pub mod page_extractor;
pub mod session;
pub mod utils;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::utils::SetupError;
use crate::utils::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_CLOSE_TIMEOUT_MS, DEFAULT_LAUNCH_TIMEOUT_MS,
    DEFAULT_MAX_SCROLL_STEPS, DEFAULT_NAVIGATION_TIMEOUT_MS, DEFAULT_READ_TIMEOUT_MS,
    DEFAULT_SCROLL_SETTLE_MS,
};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "SITEMETA_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URLs processed concurrently per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Optional cap on input URLs per run (controlled partial runs)
    #[serde(default)]
    pub max_urls: Option<usize>,

    #[serde(default)]
    pub invalid_input: InvalidInputPolicy,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub scroll: ScrollConfig,
}

/// What to do with inputs that cannot be resolved to a canonical URL.
/// Fixed for the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidInputPolicy {
    /// Emit `{ error, reason: "Invalid URL" }`
    #[default]
    Record,
    /// Drop the input with a warning
    Skip,
}

/// Browser security and launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Disable web security features (Same-Origin Policy, etc.)
    /// WARNING: Only enable for trusted content
    #[serde(default = "default_disable_security")]
    pub disable_security: bool,

    /// Window dimensions
    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,

    #[serde(default = "default_window_height")]
    pub height: u32,
}

/// Per-stage bounds for a page session, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_launch_ms")]
    pub launch_ms: u64,

    /// Navigation plus lazy-load scrolling
    #[serde(default = "default_navigation_ms")]
    pub navigation_ms: u64,

    /// Each individual document read
    #[serde(default = "default_read_ms")]
    pub read_ms: u64,

    #[serde(default = "default_close_ms")]
    pub close_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Delay after each scroll step
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_headless() -> bool {
    true
}

fn default_disable_security() -> bool {
    false  // SECURE BY DEFAULT
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

fn default_launch_ms() -> u64 {
    DEFAULT_LAUNCH_TIMEOUT_MS
}
fn default_navigation_ms() -> u64 {
    DEFAULT_NAVIGATION_TIMEOUT_MS
}
fn default_read_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}
fn default_close_ms() -> u64 {
    DEFAULT_CLOSE_TIMEOUT_MS
}

fn default_settle_ms() -> u64 {
    DEFAULT_SCROLL_SETTLE_MS
}

fn default_max_steps() -> u32 {
    DEFAULT_MAX_SCROLL_STEPS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_urls: None,
            invalid_input: InvalidInputPolicy::default(),
            browser: BrowserConfig::default(),
            timeouts: TimeoutConfig::default(),
            scroll: ScrollConfig::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            disable_security: default_disable_security(),
            window: WindowConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            launch_ms: default_launch_ms(),
            navigation_ms: default_navigation_ms(),
            read_ms: default_read_ms(),
            close_ms: default_close_ms(),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            max_steps: default_max_steps(),
        }
    }
}

impl TimeoutConfig {
    pub fn launch(&self) -> Duration {
        Duration::from_millis(self.launch_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn read(&self) -> Duration {
        Duration::from_millis(self.read_ms)
    }

    pub fn close(&self) -> Duration {
        Duration::from_millis(self.close_ms)
    }
}

impl ScrollConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Config {
    /// Check invariants the pipeline relies on
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.batch_size == 0 {
            return Err(SetupError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }

        utils::validate_navigation_timeout("timeouts.launch_ms", self.timeouts.launch_ms)?;
        utils::validate_navigation_timeout("timeouts.navigation_ms", self.timeouts.navigation_ms)?;
        utils::validate_interaction_timeout("timeouts.read_ms", self.timeouts.read_ms)?;
        utils::validate_interaction_timeout("timeouts.close_ms", self.timeouts.close_ms)?;

        Ok(())
    }

    /// Apply `BATCH_SIZE` / `MAX_URLS` overrides using `lookup` as the
    /// environment
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SetupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("BATCH_SIZE") {
            self.batch_size = parse_count("BATCH_SIZE", &raw)?;
        }

        if let Some(raw) = lookup("MAX_URLS") {
            self.max_urls = Some(parse_count("MAX_URLS", &raw)?);
        }

        Ok(())
    }
}

fn parse_count(name: &str, raw: &str) -> Result<usize, SetupError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| SetupError::InvalidConfig(format!("{name}={raw:?}: {e}")))
}

/// Load config from YAML, apply environment overrides, and validate.
///
/// Lookup order for the file: `path`, then `$SITEMETA_CONFIG`, then
/// `config.yaml` in the working directory. Missing default file means
/// built-in defaults.
pub fn load_yaml_config(path: Option<&Path>) -> Result<Config, SetupError> {
    let explicit = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

    let mut config = match explicit {
        Some(path) => parse_config_file(&path)?,
        None => {
            let fallback = PathBuf::from("config.yaml");
            if fallback.exists() {
                parse_config_file(&fallback)?
            } else {
                Config::default()
            }
        }
    };

    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;

    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<Config, SetupError> {
    info!("Loading config from {}", path.display());
    let contents = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&contents)?)
}

pub use browser::{
    BrowserError, BrowserResult, ChromiumEngine, DocumentQuery, ElementProperty, RenderEngine,
    RenderSession, Viewport,
};
pub use orchestrator::BatchOrchestrator;
pub use origin::{CanonicalOrigin, DomainParts, decompose, normalize};
pub use page_extractor::{ExtractionResult, FailureKind, PageMetadata, Platform, SocialHandleMap};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str(
            "batch_size: 8\ninvalid_input: skip\nscroll:\n  settle_ms: 250\n",
        )
        .unwrap();

        assert_eq!(config.batch_size, 8);
        assert_eq!(config.invalid_input, InvalidInputPolicy::Skip);
        assert_eq!(config.scroll.settle_ms, 250);
        assert_eq!(config.scroll.max_steps, DEFAULT_MAX_SCROLL_STEPS);
        assert_eq!(config.timeouts.read_ms, DEFAULT_READ_TIMEOUT_MS);
        assert!(config.browser.headless);
        assert_eq!(config.max_urls, None);
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [("BATCH_SIZE", "10"), ("MAX_URLS", " 3 ")].into();
        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.batch_size, 10);
        assert_eq!(config.max_urls, Some(3));
    }

    #[test]
    fn bad_override_is_reported() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|key| (key == "BATCH_SIZE").then(|| "five".to_string()))
            .unwrap_err();
        assert!(matches!(err, SetupError::InvalidConfig(_)));
    }

    #[test]
    fn zero_batch_size_is_invalid() {
        let config = Config {
            batch_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sitemeta.yaml");
        std::fs::write(&path, "batch_size: 2\ntimeouts:\n  navigation_ms: 5000\n").unwrap();

        let config = parse_config_file(&path).unwrap();
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.timeouts.navigation(), Duration::from_secs(5));
    }
}
