//! Chrome discovery and launch for page sessions

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

use crate::BrowserConfig;
use crate::utils::constants::CHROME_USER_AGENT;

/// Removes the profile directory on drop unless released with `keep()`
struct TempDirGuard {
    path: PathBuf,
    keep: bool,
}

impl TempDirGuard {
    fn create(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path).context("Failed to create user data directory")?;
        Ok(Self { path, keep: false })
    }

    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("Cleaned up temp dir after launch failure: {}", self.path.display()),
            Err(e) => warn!("Failed to clean up temp dir {}: {}", self.path.display(), e),
        }
    }
}

/// Find a Chrome/Chromium executable.
///
/// Order: `CHROMIUM_PATH`, well-known install locations, `which`.
pub async fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!("CHROMIUM_PATH points to non-existent file: {}", path.display());
    }

    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"%PROGRAMFILES%\Google\Chrome\Application\chrome.exe",
            r"%PROGRAMFILES(X86)%\Google\Chrome\Application\chrome.exe",
            r"%LOCALAPPDATA%\Google\Chrome\Application\chrome.exe",
            r"%PROGRAMFILES%\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "~/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    for candidate in candidates {
        let Some(path) = expand_candidate(candidate) else {
            continue;
        };
        if path.exists() {
            info!("Found browser at: {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in ["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !found.is_empty() {
                    info!("Found browser using 'which': {}", found);
                    return Ok(PathBuf::from(found));
                }
            }
        }
    }

    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

fn expand_candidate(candidate: &str) -> Option<PathBuf> {
    if let Some(rest) = candidate.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(rest));
    }
    if candidate.contains('%') {
        return Some(PathBuf::from(expand_windows_env_vars(candidate)));
    }
    Some(PathBuf::from(candidate))
}

/// Replace `%VAR%` tokens with environment values; unknown tokens are kept.
fn expand_windows_env_vars(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            result.push(ch);
            continue;
        }

        let var_name: String = chars.by_ref().take_while(|&c| c != '%').collect();
        if var_name.is_empty() {
            result.push('%');
        } else if let Ok(value) = std::env::var(&var_name) {
            result.push_str(&value);
        } else {
            result.push('%');
            result.push_str(&var_name);
            result.push('%');
        }
    }

    result
}

/// Download a managed Chromium into the user cache directory.
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| std::env::temp_dir().join(".cache"))
        .join("kodegen/chromium");

    std::fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );

    let revision_info = fetcher.fetch().await.context("Failed to fetch browser")?;
    info!("Downloaded Chromium to: {}", revision_info.folder_path.display());

    Ok(revision_info.executable_path)
}

/// Locate a local Chrome, downloading a managed Chromium when none exists.
///
/// The download can take minutes, so call this once before any session is
/// launched rather than inside a launch timeout.
pub async fn resolve_browser_executable() -> Result<PathBuf> {
    match find_browser_executable().await {
        Ok(path) => Ok(path),
        Err(e) => {
            warn!("{}. Falling back to managed download.", e);
            download_managed_browser().await
        }
    }
}

/// Launch `chrome_path` as an isolated process using `user_data_dir` as its
/// profile.
///
/// The directory is created here and removed again if the launch fails;
/// on success the caller owns it (see `BrowserWrapper`).
///
/// The returned handler task drives the CDP connection and must stay
/// alive for as long as the browser is used.
pub async fn launch_browser(
    config: &BrowserConfig,
    chrome_path: &Path,
    user_data_dir: PathBuf,
) -> Result<(Browser, JoinHandle<()>)> {
    let temp_guard = TempDirGuard::create(user_data_dir)?;

    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(config.window.width, config.window.height)
        .user_data_dir(&temp_guard.path)
        .chrome_executable(chrome_path);

    builder = if config.headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    builder = builder
        .arg(format!("--user-agent={}", CHROME_USER_AGENT))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--disable-extensions")
        .arg("--disable-popup-blocking")
        .arg("--disable-background-networking")
        .arg("--disable-breakpad")
        .arg("--disable-features=TranslateUI")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--password-store=basic")
        .arg("--use-mock-keychain")
        .arg("--hide-scrollbars")
        .arg("--mute-audio");

    if config.disable_security {
        warn!("Disabling browser security features (disable_security=true)");
        builder = builder
            .arg("--disable-web-security")
            .arg("--ignore-certificate-errors");
    }

    if config.disable_security || should_disable_sandbox() {
        builder = builder.arg("--no-sandbox").arg("--disable-setuid-sandbox");
    }

    let browser_config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                // chromiumoxide cannot decode some newer CDP events; harmless
                if message.contains("data did not match any variant of untagged enum Message")
                    || message.contains("Failed to deserialize WS response")
                {
                    trace!("Suppressed benign CDP serialization error: {}", message);
                } else {
                    error!("Browser handler error: {:?}", e);
                }
            }
        }
        debug!("Browser handler task completed");
    });

    temp_guard.keep();
    Ok((browser, handler_task))
}

/// Containers cannot use the setuid sandbox
fn should_disable_sandbox() -> bool {
    Path::new("/.dockerenv").exists()
        || std::env::var("container").is_ok()
        || std::env::var("KUBERNETES_SERVICE_HOST").is_ok()
}
