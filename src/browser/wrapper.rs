//! Owned Chrome process for a single page session

use chromiumoxide::browser::Browser;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{BrowserError, BrowserResult};

/// Browser, its CDP event handler task and its temporary profile directory
///
/// Each page session owns exactly one wrapper. `shutdown()` is the clean
/// exit path; dropping without it only aborts the handler (chromiumoxide
/// kills the child process on drop) and leaves the profile directory behind.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close Chrome, wait for the process to exit, then remove the profile.
    ///
    /// Both `close()` and `wait()` are required: without `wait()` the process
    /// lingers as a zombie and Windows refuses to delete the locked profile.
    /// Every step runs even if an earlier one failed; the first error is
    /// reported.
    pub(crate) async fn shutdown(&mut self) -> BrowserResult<()> {
        let mut first_error = None;

        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
            first_error.get_or_insert(BrowserError::CloseFailed(e.to_string()));
        }

        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
            first_error.get_or_insert(BrowserError::CloseFailed(e.to_string()));
        }

        self.handler.abort();
        self.cleanup_temp_dir();

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Remove the temporary profile directory (blocking).
    ///
    /// Must run after `browser.wait()` so Chrome has released its file
    /// handles.
    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            debug!("Cleaning up temp directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to clean up temp directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();

        if let Some(path) = &self.user_data_dir {
            warn!(
                "BrowserWrapper dropped without shutdown(). Temp directory will be orphaned: {}",
                path.display()
            );
        }
    }
}
