//! Result records produced per input URL

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Social platforms searched on every page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Pinterest,
    Tiktok,
    Twitter,
    Youtube,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::Pinterest => "pinterest",
            Self::Tiktok => "tiktok",
            Self::Twitter => "twitter",
            Self::Youtube => "youtube",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile URL per platform; every platform key is always present and
/// holds `""` when nothing was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SocialHandleMap(BTreeMap<Platform, String>);

impl SocialHandleMap {
    /// All platforms, all empty
    pub fn empty() -> Self {
        Self::from_lookups(std::iter::empty())
    }

    /// Fold per-platform lookup results into one map.
    ///
    /// Duplicate platforms keep the first value seen; platforms missing
    /// from `lookups` are filled with `""`.
    pub fn from_lookups<I>(lookups: I) -> Self
    where
        I: IntoIterator<Item = (Platform, String)>,
    {
        let mut map = BTreeMap::new();
        for (platform, href) in lookups {
            map.entry(platform).or_insert(href);
        }
        for spec in super::social::PLATFORMS {
            map.entry(spec.platform).or_default();
        }
        Self(map)
    }

    pub fn get(&self, platform: Platform) -> &str {
        self.0.get(&platform).map(String::as_str).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Platform, &str)> {
        self.0.iter().map(|(platform, href)| (*platform, href.as_str()))
    }

    /// Number of platforms with a discovered link
    pub fn found(&self) -> usize {
        self.0.values().filter(|href| !href.is_empty()).count()
    }
}

impl Default for SocialHandleMap {
    fn default() -> Self {
        Self::empty()
    }
}

/// Metadata read from one successfully loaded page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub url: String,
    /// Registrable domain, e.g. `example.co.uk`
    pub domain: String,
    pub lang: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub socials: SocialHandleMap,
}

/// Failure record: `error` holds the URL, `reason` the failure class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    pub error: String,
    pub reason: String,
}

/// Result-level failure classes; per-field read failures never reach here
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidInput,
    SessionLaunch,
    Navigation,
}

impl FailureKind {
    pub fn reason(self) -> &'static str {
        match self {
            Self::InvalidInput => "Invalid URL",
            Self::SessionLaunch => "Failed to launch browser instance",
            Self::Navigation => "Failed to load page",
        }
    }
}

/// Exactly one of these is produced per processed input URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionResult {
    Page(PageMetadata),
    Failed(ExtractionFailure),
}

impl ExtractionResult {
    pub fn failure(url: impl Into<String>, kind: FailureKind) -> Self {
        Self::Failed(ExtractionFailure {
            error: url.into(),
            reason: kind.reason().to_string(),
        })
    }

    /// The URL this result belongs to, whichever shape it has
    pub fn url(&self) -> &str {
        match self {
            Self::Page(page) => &page.url,
            Self::Failed(failure) => &failure.error,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn as_page(&self) -> Option<&PageMetadata> {
        match self {
            Self::Page(page) => Some(page),
            Self::Failed(_) => None,
        }
    }
}
