//! Scripted in-memory rendering engine
//!
//! Sessions answer CSS queries against static HTML with `scraper`, so the
//! whole pipeline (launch, load, scroll, extract, close) runs without a
//! browser. Counters record how sessions were used.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use kodegen_tools_sitemeta::{
    BrowserError, BrowserResult, Config, DocumentQuery, ElementProperty, RenderEngine,
    RenderSession, Viewport,
};
use scraper::{Html, Selector};
use url::Url;

pub const VIEWPORT_HEIGHT: f64 = 720.0;

#[derive(Debug, Default)]
pub struct Counters {
    pub launched: AtomicUsize,
    pub closed: AtomicUsize,
    pub open: AtomicUsize,
    pub peak_open: AtomicUsize,
    pub scrolls: AtomicUsize,
}

impl Counters {
    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn peak_open(&self) -> usize {
        self.peak_open.load(Ordering::SeqCst)
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
struct FakePage {
    html: String,
    scroll_height: f64,
    delay: Duration,
}

#[derive(Debug, Default)]
struct Script {
    pages: HashMap<String, FakePage>,
    broken_navigation: HashSet<String>,
    failing_selectors: Vec<String>,
    slow_selectors: Vec<(String, Duration)>,
    fail_launch: bool,
    launch_delay: Duration,
}

/// Builder-style fake engine; clone-free, share it by reference
#[derive(Debug, Default)]
pub struct FakeEngine {
    script: Arc<Script>,
    counters: Arc<Counters>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn script_mut(&mut self) -> &mut Script {
        Arc::get_mut(&mut self.script).expect("script is only edited before use")
    }

    /// Serve `html` at `url` (a canonical origin such as `https://www.acme.com`)
    pub fn page(self, url: &str, html: &str) -> Self {
        self.page_with(url, html, VIEWPORT_HEIGHT, Duration::ZERO)
    }

    pub fn page_with(mut self, url: &str, html: &str, scroll_height: f64, delay: Duration) -> Self {
        self.script_mut().pages.insert(
            url.to_string(),
            FakePage {
                html: html.to_string(),
                scroll_height,
                delay,
            },
        );
        self
    }

    pub fn broken_navigation(mut self, url: &str) -> Self {
        self.script_mut().broken_navigation.insert(url.to_string());
        self
    }

    /// Reads whose selector contains `fragment` fail with an evaluation error
    pub fn failing_reads(mut self, fragment: &str) -> Self {
        self.script_mut().failing_selectors.push(fragment.to_string());
        self
    }

    /// Reads whose selector contains `fragment` stall for `delay` first
    pub fn slow_reads(mut self, fragment: &str, delay: Duration) -> Self {
        self.script_mut()
            .slow_selectors
            .push((fragment.to_string(), delay));
        self
    }

    /// Every launch stalls for `delay` before the session exists
    pub fn slow_launch(mut self, delay: Duration) -> Self {
        self.script_mut().launch_delay = delay;
        self
    }

    pub fn failing_launch(mut self) -> Self {
        self.script_mut().fail_launch = true;
        self
    }

    pub fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }
}

impl RenderEngine for FakeEngine {
    type Session = FakeSession;

    async fn launch(&self) -> BrowserResult<FakeSession> {
        tokio::task::yield_now().await;
        tokio::time::sleep(self.script.launch_delay).await;

        if self.script.fail_launch {
            return Err(BrowserError::LaunchFailed("scripted launch failure".to_string()));
        }

        self.counters.launched.fetch_add(1, Ordering::SeqCst);
        let open = self.counters.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak_open.fetch_max(open, Ordering::SeqCst);

        Ok(FakeSession {
            script: Arc::clone(&self.script),
            counters: Arc::clone(&self.counters),
            current: None,
        })
    }
}

pub struct FakeSession {
    script: Arc<Script>,
    counters: Arc<Counters>,
    current: Option<(String, FakePage)>,
}

impl FakeSession {
    fn loaded(&self) -> BrowserResult<&(String, FakePage)> {
        self.current
            .as_ref()
            .ok_or_else(|| BrowserError::EvaluationFailed("no document loaded".to_string()))
    }
}

impl RenderSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        if self.script.broken_navigation.contains(url) {
            tokio::task::yield_now().await;
            return Err(BrowserError::NavigationFailed(format!("{url}: net::ERR_NAME_NOT_RESOLVED")));
        }

        let page = self
            .script
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| BrowserError::NavigationFailed(format!("{url}: no scripted page")))?;

        tokio::time::sleep(page.delay).await;
        self.current = Some((url.to_string(), page));
        Ok(())
    }

    async fn viewport(&self) -> BrowserResult<Viewport> {
        let (_, page) = self.loaded()?;
        Ok(Viewport {
            scroll_height: page.scroll_height,
            viewport_height: VIEWPORT_HEIGHT,
        })
    }

    async fn scroll_by(&self, _dy: f64) -> BrowserResult<()> {
        self.counters.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn read(&self, query: &DocumentQuery) -> BrowserResult<String> {
        tokio::task::yield_now().await;

        if let Some((_, delay)) = self
            .script
            .slow_selectors
            .iter()
            .find(|(fragment, _)| query.selector.contains(fragment.as_str()))
        {
            tokio::time::sleep(*delay).await;
        }

        if self
            .script
            .failing_selectors
            .iter()
            .any(|fragment| query.selector.contains(fragment.as_str()))
        {
            return Err(BrowserError::EvaluationFailed(format!(
                "scripted failure for {}",
                query.selector
            )));
        }

        let (url, page) = self.loaded()?;
        let document = Html::parse_document(&page.html);
        let selector = Selector::parse(&query.selector)
            .map_err(|e| BrowserError::EvaluationFailed(format!("{}: {e}", query.selector)))?;

        let element = document
            .select(&selector)
            .next()
            .ok_or_else(|| BrowserError::ElementNotFound(query.selector.clone()))?;

        let value = match query.property {
            ElementProperty::Lang => element.value().attr("lang").unwrap_or_default().to_string(),
            ElementProperty::TextContent => element.text().collect::<String>(),
            ElementProperty::Content => element
                .value()
                .attr("content")
                .unwrap_or_default()
                .to_string(),
            ElementProperty::Href => match element.value().attr("href") {
                Some(href) => Url::parse(url)
                    .and_then(|base| base.join(href))
                    .map(String::from)
                    .unwrap_or_else(|_| href.to_string()),
                None => String::new(),
            },
        };

        Ok(value)
    }

    async fn close(self) -> BrowserResult<()> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        self.counters.open.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Defaults with fast scrolling and short stage limits
pub fn test_config(batch_size: usize) -> Config {
    let mut config = Config {
        batch_size,
        ..Config::default()
    };
    config.scroll.settle_ms = 1;
    config.timeouts.launch_ms = 2_000;
    config.timeouts.navigation_ms = 2_000;
    config.timeouts.read_ms = 1_000;
    config.timeouts.close_ms = 1_000;
    config
}

pub fn acme_html() -> &'static str {
    r#"<!doctype html>
<html lang="en">
  <head>
    <title>  Acme Anvils  </title>
    <meta name="description" content="Anvils since 1949">
    <meta name="keywords" content="anvils, rockets">
  </head>
  <body>
    <a href="https://twitter.com/someone_else">Partner</a>
    <a href="https://twitter.com/acme">Follow us</a>
    <a href="https://www.facebook.com/groups/anvil-fans">Community</a>
    <a href="/about">About</a>
  </body>
</html>"#
}
