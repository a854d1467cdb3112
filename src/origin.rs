//! URL normalization and public-suffix-aware domain decomposition
//!
//! Input lists exported from upstream systems mix full URLs
//! (`https://shop.example.com/catalog`) with bare domains (`example.com`).
//! `normalize` accepts both and produces a canonical origin; `decompose`
//! splits a canonical URL into registrable domain, subdomain and
//! second-level label using the compiled-in public suffix list.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::{Host, Url};

/// Subdomain assumed for bare domain input such as `example.com`
pub const DEFAULT_SUBDOMAIN: &str = "www";

/// Scheme + host (+ explicit port), no path or query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalOrigin {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
}

impl CanonicalOrigin {
    /// Build an origin from a strictly parsed URL.
    ///
    /// Only `http`/`https` URLs with a non-empty host qualify. Other special
    /// schemes (`ftp:`) cannot be rendered as pages, and anything with an
    /// opaque origin (`mailto:`, `data:`, `example.com:8080` parsed as a
    /// scheme) is rejected so the caller can fall back to domain parsing.
    /// A fully qualified host (`example.com.`) loses its trailing dot.
    fn from_url(url: &Url) -> Option<Self> {
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }

        let host = url.host_str()?;
        let host = host.strip_suffix('.').unwrap_or(host);
        if host.is_empty() {
            return None;
        }

        Some(Self {
            scheme: url.scheme().to_string(),
            host: host.to_string(),
            port: url.port(),
        })
    }
}

impl fmt::Display for CanonicalOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}://{}:{}", self.scheme, self.host, port),
            None => write!(f, "{}://{}", self.scheme, self.host),
        }
    }
}

/// Registrable domain split of a hostname
///
/// For `shop.example.co.uk`: `domain = "example.co.uk"`,
/// `subdomain = Some("shop")`, `sld = "example"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainParts {
    pub domain: String,
    pub subdomain: Option<String>,
    pub sld: String,
}

impl DomainParts {
    /// Reassemble the full hostname these parts were split from
    pub fn hostname(&self) -> String {
        match &self.subdomain {
            Some(sub) => format!("{}.{}", sub, self.domain),
            None => self.domain.clone(),
        }
    }
}

/// An input that passed both normalization and decomposition; the unit of
/// work handed to the page pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    /// Canonical origin, e.g. `https://www.example.com`
    pub url: String,
    pub parts: DomainParts,
}

/// Normalize `input` and decompose the result.
pub fn resolve(input: &str) -> Option<ResolvedUrl> {
    let url = normalize(input);
    if url.is_empty() {
        return None;
    }
    let parts = decompose(&url)?;
    Some(ResolvedUrl { url, parts })
}

/// Normalize arbitrary input into a canonical origin string.
///
/// Returns an empty string when the input cannot be resolved; callers treat
/// empty as "unresolvable".
pub fn normalize(input: &str) -> String {
    resolve_origin(input)
        .map(|origin| origin.to_string())
        .unwrap_or_default()
}

/// Typed form of [`normalize`].
///
/// Strict URL parsing is tried first. On failure the input is treated as a
/// bare hostname: it must split against the public suffix list, and a
/// missing subdomain defaults to [`DEFAULT_SUBDOMAIN`].
pub fn resolve_origin(input: &str) -> Option<CanonicalOrigin> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(input)
        && let Some(origin) = CanonicalOrigin::from_url(&url)
    {
        return Some(origin);
    }

    let host = bare_hostname(input)?;
    let parts = split_host(&host)?;
    let subdomain = parts.subdomain.as_deref().unwrap_or(DEFAULT_SUBDOMAIN);

    Some(CanonicalOrigin {
        scheme: "https".to_string(),
        host: format!("{}.{}", subdomain, parts.domain),
        port: None,
    })
}

/// Decompose a strictly valid URL into its domain parts.
///
/// Returns `None` for malformed URLs, IP hosts, hosts whose suffix is not on
/// the public suffix list and hosts that are themselves a public suffix.
pub fn decompose(input: &str) -> Option<DomainParts> {
    let url = Url::parse(input.trim()).ok()?;

    match url.host()? {
        Host::Domain(host) => split_host(host),
        Host::Ipv4(_) | Host::Ipv6(_) => None,
    }
}

/// Extract a hostname from loosely formatted input (`Example.com`,
/// `example.com/`, `shop.example.com/path`).
///
/// Uses the URL parser for host validation and IDNA mapping so the bare
/// path shares its character rules with the strict path.
fn bare_hostname(input: &str) -> Option<String> {
    if input.contains("://") {
        return None;
    }

    let url = Url::parse(&format!("https://{input}")).ok()?;
    match url.host()? {
        Host::Domain(host) if url.port().is_none() => Some(host.to_string()),
        _ => None,
    }
}

fn split_host(host: &str) -> Option<DomainParts> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        return None;
    }

    let domain = psl::domain(host.as_bytes())?;
    let suffix = domain.suffix();
    if !suffix.is_known() {
        return None;
    }

    let domain_str = std::str::from_utf8(domain.as_bytes()).ok()?;
    let suffix_len = suffix.as_bytes().len();

    // domain_str is "<sld>.<suffix>"
    let sld = domain_str
        .len()
        .checked_sub(suffix_len + 1)
        .map(|end| &domain_str[..end])
        .filter(|sld| !sld.is_empty())?;

    let subdomain = host
        .strip_suffix(domain_str)
        .and_then(|prefix| prefix.strip_suffix('.'))
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string);

    Some(DomainParts {
        domain: domain_str.to_string(),
        subdomain,
        sld: sld.to_string(),
    })
}
