//! chromiumoxide-backed `RenderEngine`

use std::path::{Path, PathBuf};

use chromiumoxide::Page;
use chromiumoxide_cdp::cdp::js_protocol::runtime::{CallArgument, CallFunctionOnParams};
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::wrapper::BrowserWrapper;
use super::{
    BrowserError, BrowserResult, DocumentQuery, RenderEngine, RenderSession, Viewport,
};
use crate::BrowserConfig;

/// Returns `null` when nothing matches so "absent" and "empty" stay distinct.
const READ_PROPERTY_JS: &str = "(selector, property) => {
    const element = document.querySelector(selector);
    if (element === null) {
        return null;
    }
    const value = element[property];
    return typeof value === 'string' ? value : '';
}";

const VIEWPORT_JS: &str = "({
    scrollHeight: document.body ? document.body.scrollHeight : 0,
    viewportHeight: window.visualViewport ? window.visualViewport.height : window.innerHeight
})";

const SCROLL_BY_JS: &str = "(dy) => { window.scrollBy(0, dy); }";

/// Launches one headless Chrome process per session
#[derive(Debug, Clone)]
pub struct ChromiumEngine {
    config: BrowserConfig,
    executable: PathBuf,
}

impl ChromiumEngine {
    /// Resolve the Chrome executable (downloading one if needed), then build
    /// the engine. Await this before the first batch: session launches are
    /// bounded by the launch timeout and a download is not.
    pub async fn prepare(config: BrowserConfig) -> BrowserResult<Self> {
        let executable = crate::browser_setup::resolve_browser_executable()
            .await
            .map_err(|e| BrowserError::NotFound(format!("{e:#}")))?;

        info!("Using browser executable: {}", executable.display());
        Ok(Self::with_executable(config, executable))
    }

    /// Engine for an already known executable
    pub fn with_executable(config: BrowserConfig, executable: impl Into<PathBuf>) -> Self {
        Self {
            config,
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl RenderEngine for ChromiumEngine {
    type Session = ChromiumSession;

    async fn launch(&self) -> BrowserResult<ChromiumSession> {
        // Unique profile per session; concurrent Chromes cannot share one
        let user_data_dir =
            std::env::temp_dir().join(format!("kodegen_sitemeta_{}", Uuid::new_v4()));

        let (browser, handler) = crate::browser_setup::launch_browser(
            &self.config,
            &self.executable,
            user_data_dir.clone(),
        )
        .await
        .map_err(|e| BrowserError::LaunchFailed(format!("{e:#}")))?;

        let mut wrapper = BrowserWrapper::new(browser, handler, user_data_dir);

        let created = wrapper.browser().new_page("about:blank").await;
        let page = match created {
            Ok(page) => page,
            Err(e) => {
                // Process is up but unusable; tear it down before reporting
                if let Err(shutdown) = wrapper.shutdown().await {
                    warn!("Failed to shut down browser after page creation error: {}", shutdown);
                }
                return Err(BrowserError::PageCreationFailed(e.to_string()));
            }
        };

        info!("Launched browser session");
        Ok(ChromiumSession { wrapper, page })
    }
}

/// Live Chrome tab plus the process that owns it
pub struct ChromiumSession {
    wrapper: BrowserWrapper,
    page: Page,
}

impl ChromiumSession {
    async fn call(&self, function: &str, args: Vec<Value>) -> BrowserResult<Option<Value>> {
        let mut builder = CallFunctionOnParams::builder()
            .function_declaration(function)
            .return_by_value(true);
        for arg in args {
            builder = builder.argument(CallArgument::builder().value(arg).build());
        }
        let call = builder
            .build()
            .map_err(|e| BrowserError::EvaluationFailed(format!("Invalid call params: {e}")))?;

        let result = self
            .page
            .evaluate_function(call)
            .await
            .map_err(|e| BrowserError::EvaluationFailed(e.to_string()))?;

        Ok(result.value().cloned())
    }
}

impl RenderSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed(format!("{url}: {e}")))?;

        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| BrowserError::NavigationFailed(format!("{url}: {e}")))?;

        debug!("Navigated to {}", url);
        Ok(())
    }

    async fn viewport(&self) -> BrowserResult<Viewport> {
        self.page
            .evaluate(VIEWPORT_JS)
            .await
            .map_err(|e| BrowserError::EvaluationFailed(e.to_string()))?
            .into_value::<Viewport>()
            .map_err(|e| BrowserError::EvaluationFailed(format!("Bad viewport metrics: {e}")))
    }

    async fn scroll_by(&self, dy: f64) -> BrowserResult<()> {
        self.call(SCROLL_BY_JS, vec![json!(dy)]).await?;
        Ok(())
    }

    async fn read(&self, query: &DocumentQuery) -> BrowserResult<String> {
        let value = self
            .call(
                READ_PROPERTY_JS,
                vec![json!(query.selector), json!(query.property.dom_name())],
            )
            .await?;

        match value {
            Some(Value::String(text)) => Ok(text),
            _ => Err(BrowserError::ElementNotFound(query.selector.clone())),
        }
    }

    async fn close(self) -> BrowserResult<()> {
        let Self { mut wrapper, page } = self;

        if let Err(e) = page.close().await {
            warn!("Failed to close page: {}", e);
        }

        wrapper.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_executable_fails_fast_without_download() {
        let engine = ChromiumEngine::with_executable(
            BrowserConfig::default(),
            "/nonexistent/kodegen-sitemeta/chrome",
        );

        let outcome = tokio::time::timeout(std::time::Duration::from_secs(10), engine.launch())
            .await
            .expect("launch must not wait on a browser download");

        assert!(matches!(outcome, Err(BrowserError::LaunchFailed(_))));
    }
}
