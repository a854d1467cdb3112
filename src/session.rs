//! Page session driver
//!
//! One browser session per URL, walked through
//! `Idle -> Launching -> Loading -> Ready -> Closed`, with `Failed`
//! reachable from `Launching` and `Loading`. A launched session is closed
//! exactly once whichever state it ends in: `load` closes it itself on
//! failure, `close` consumes the handle otherwise.

use std::fmt;

use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::browser::{BrowserError, BrowserResult, RenderEngine, RenderSession, Viewport};
use crate::origin::ResolvedUrl;
use crate::page_extractor::{ExtractionResult, FailureKind, extract_page_info};
use crate::{Config, ScrollConfig, TimeoutConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Launching,
    Loading,
    Ready,
    Closed,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Launching => "launching",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Closed => "closed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Single-owner handle around one engine session
pub struct PageSession<S: RenderSession> {
    session: Option<S>,
    state: SessionState,
    url: String,
}

impl<S: RenderSession> PageSession<S> {
    /// Start a session for `url`. On failure nothing was acquired, so
    /// there is nothing to release.
    pub async fn launch<E>(engine: &E, url: &str, timeouts: &TimeoutConfig) -> BrowserResult<Self>
    where
        E: RenderEngine<Session = S>,
    {
        debug!(url, from = %SessionState::Idle, to = %SessionState::Launching, "Session transition");

        let limit = timeouts.launch();
        let session = match timeout(limit, engine.launch()).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                debug!(url, to = %SessionState::Failed, "Launch failed: {}", e);
                return Err(e);
            }
            Err(_) => {
                debug!(url, to = %SessionState::Failed, "Launch timed out");
                return Err(BrowserError::Timeout {
                    stage: "launch",
                    limit,
                });
            }
        };

        Ok(Self {
            session: Some(session),
            state: SessionState::Launching,
            url: url.to_string(),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Navigate and scroll for lazy content; returns the live session once
    /// `Ready`.
    ///
    /// Navigation and scrolling share the navigation timeout. On any
    /// failure the session is closed before the error is returned.
    pub async fn load(
        &mut self,
        scroll: &ScrollConfig,
        timeouts: &TimeoutConfig,
    ) -> BrowserResult<&S> {
        self.transition(SessionState::Loading);

        let limit = timeouts.navigation();
        let outcome = match self.session.as_mut() {
            Some(live) => match timeout(limit, load_page(live, &self.url, scroll)).await {
                Ok(result) => result,
                Err(_) => Err(BrowserError::Timeout {
                    stage: "navigation",
                    limit,
                }),
            },
            None => Err(BrowserError::NavigationFailed(format!(
                "{}: session is not open",
                self.url
            ))),
        };

        if let Err(e) = outcome {
            self.transition(SessionState::Failed);
            if let Some(live) = self.session.take() {
                close_quietly(live, &self.url, timeouts).await;
            }
            return Err(e);
        }

        self.transition(SessionState::Ready);
        self.session.as_ref().ok_or_else(|| {
            BrowserError::NavigationFailed(format!("{}: session is not open", self.url))
        })
    }

    /// Release the session. No-op if `load` already closed it after a
    /// failure.
    pub async fn close(mut self, timeouts: &TimeoutConfig) -> SessionState {
        if let Some(live) = self.session.take() {
            close_quietly(live, &self.url, timeouts).await;
            self.transition(SessionState::Closed);
        }
        self.state
    }

    fn transition(&mut self, to: SessionState) {
        debug!(url = %self.url, from = %self.state, to = %to, "Session transition");
        self.state = to;
    }
}

impl<S: RenderSession> Drop for PageSession<S> {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!(
                url = %self.url,
                "PageSession dropped without close(); relying on engine drop to reap the browser"
            );
        }
    }
}

async fn close_quietly<S: RenderSession>(session: S, url: &str, timeouts: &TimeoutConfig) {
    match timeout(timeouts.close(), session.close()).await {
        Ok(Ok(())) => debug!(url, "Session closed"),
        Ok(Err(e)) => warn!(url, "Session close reported an error: {}", e),
        Err(_) => warn!(url, "Session close timed out after {}ms", timeouts.close_ms),
    }
}

async fn load_page<S: RenderSession>(
    session: &mut S,
    url: &str,
    scroll: &ScrollConfig,
) -> BrowserResult<()> {
    session.navigate(url).await?;
    let steps = scroll_lazy_content(session, scroll).await?;
    debug!(url, steps, "Lazy-load scrolling finished");
    Ok(())
}

/// Number of one-viewport scroll commands needed to pass the bottom of the
/// document: `ceil(scrollHeight / viewportHeight) + 1`, capped at
/// `max_steps`. Zero when the metrics are unusable.
pub fn scroll_plan(viewport: Viewport, max_steps: u32) -> u32 {
    let Viewport {
        scroll_height,
        viewport_height,
    } = viewport;

    if !scroll_height.is_finite() || !viewport_height.is_finite() || viewport_height <= 0.0 {
        return 0;
    }

    let pages = (scroll_height.max(0.0) / viewport_height).ceil();
    let commands = pages + 1.0;
    if commands >= f64::from(max_steps) {
        max_steps
    } else {
        commands as u32
    }
}

/// Scroll one viewport at a time with a settle delay after each step so
/// lazy-loaded content materializes. Returns the number of steps issued.
pub async fn scroll_lazy_content<S: RenderSession>(
    session: &S,
    scroll: &ScrollConfig,
) -> BrowserResult<u32> {
    let viewport = session.viewport().await?;
    let steps = scroll_plan(viewport, scroll.max_steps);

    for _ in 0..steps {
        session.scroll_by(viewport.viewport_height).await?;
        sleep(scroll.settle()).await;
    }

    Ok(steps)
}

/// Full pipeline for one resolved URL: launch, load, extract, close.
///
/// Always yields exactly one result; launch and load failures become
/// failure records, field-level failures become empty fields.
pub async fn scrape_page<E: RenderEngine>(
    engine: &E,
    target: &ResolvedUrl,
    config: &Config,
) -> ExtractionResult {
    let mut session = match PageSession::launch(engine, &target.url, &config.timeouts).await {
        Ok(session) => session,
        Err(e) => {
            warn!(url = %target.url, "Failed to launch browser instance: {}", e);
            return ExtractionResult::failure(&target.url, FailureKind::SessionLaunch);
        }
    };

    let metadata = match session.load(&config.scroll, &config.timeouts).await {
        Ok(live) => extract_page_info(live, target, config.timeouts.read()).await,
        Err(e) => {
            warn!(url = %target.url, "Failed to load page: {}", e);
            return ExtractionResult::failure(&target.url, FailureKind::Navigation);
        }
    };

    session.close(&config.timeouts).await;
    info!(url = %target.url, "Scraped page");

    ExtractionResult::Page(metadata)
}
