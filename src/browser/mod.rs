//! Rendering engine capability used by the page session driver
//!
//! The pipeline needs five things from a browser: launch an isolated
//! session, navigate it, measure and scroll the viewport, run a read-only
//! query against the rendered document, and close it. `RenderEngine` and
//! `RenderSession` describe exactly that, and `ChromiumEngine` provides them
//! on top of chromiumoxide.

mod engine;
mod wrapper;

pub use crate::browser_setup::{
    download_managed_browser, find_browser_executable, resolve_browser_executable,
};
pub use engine::{ChromiumEngine, ChromiumSession};
pub use wrapper::BrowserWrapper;

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    /// No local Chrome and the managed download failed
    #[error("Failed to find browser executable: {0}")]
    NotFound(String),

    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("{stage} timed out after {}ms", .limit.as_millis())]
    Timeout { stage: &'static str, limit: Duration },

    #[error("Failed to close browser: {0}")]
    CloseFailed(String),
}

pub type BrowserResult<T> = Result<T, BrowserError>;

/// Element property read by a [`DocumentQuery`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementProperty {
    /// `element.lang`
    Lang,
    /// `element.textContent`
    TextContent,
    /// `element.content` (meta tags)
    Content,
    /// `element.href`, resolved against the document URL
    Href,
}

impl ElementProperty {
    /// DOM property name as seen from page JavaScript
    pub fn dom_name(self) -> &'static str {
        match self {
            Self::Lang => "lang",
            Self::TextContent => "textContent",
            Self::Content => "content",
            Self::Href => "href",
        }
    }
}

/// Read-only query: first element matching `selector`, then one property
///
/// Engines must report "no element" as [`BrowserError::ElementNotFound`]
/// and return the raw (untrimmed) property value otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    pub selector: String,
    pub property: ElementProperty,
}

impl DocumentQuery {
    pub fn new(selector: impl Into<String>, property: ElementProperty) -> Self {
        Self {
            selector: selector.into(),
            property,
        }
    }
}

/// Page and viewport heights used to plan lazy-load scrolling
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub scroll_height: f64,
    pub viewport_height: f64,
}

/// A rendering engine able to start isolated sessions
#[allow(async_fn_in_trait)]
pub trait RenderEngine {
    type Session: RenderSession;

    /// Start a new isolated browser process with one blank tab
    async fn launch(&self) -> BrowserResult<Self::Session>;
}

/// One browser process + tab, exclusively owned by a single pipeline
#[allow(async_fn_in_trait)]
pub trait RenderSession {
    /// Navigate the tab and wait for the load to finish
    async fn navigate(&mut self, url: &str) -> BrowserResult<()>;

    /// Current document scroll height and viewport height
    async fn viewport(&self) -> BrowserResult<Viewport>;

    /// Scroll the viewport vertically by `dy` CSS pixels
    async fn scroll_by(&self, dy: f64) -> BrowserResult<()>;

    /// Evaluate a read-only query against the rendered document
    async fn read(&self, query: &DocumentQuery) -> BrowserResult<String>;

    /// Close the tab and terminate the browser process
    async fn close(self) -> BrowserResult<()>;
}
