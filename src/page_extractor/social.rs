//! Social profile link discovery

use std::time::Duration;

use futures::future::join_all;
use tracing::debug;

use super::fields::{best_effort_read, css_string};
use super::schema::{Platform, SocialHandleMap};
use crate::browser::{DocumentQuery, ElementProperty, RenderSession};

/// A platform and the domain fragment its profile links contain
#[derive(Debug, Clone, Copy)]
pub struct PlatformSpec {
    pub platform: Platform,
    pub domain: &'static str,
}

/// Platforms searched on every page, in output order
pub const PLATFORMS: &[PlatformSpec] = &[
    PlatformSpec { platform: Platform::Facebook, domain: "facebook.com" },
    PlatformSpec { platform: Platform::Instagram, domain: "instagram.com" },
    PlatformSpec { platform: Platform::Pinterest, domain: "pinterest.com" },
    PlatformSpec { platform: Platform::Tiktok, domain: "tiktok.com" },
    PlatformSpec { platform: Platform::Twitter, domain: "twitter.com" },
    PlatformSpec { platform: Platform::Youtube, domain: "youtube.com" },
];

impl PlatformSpec {
    /// Anchor whose href names the site's own account, e.g.
    /// `twitter.com/acme` for `acme.com`
    pub fn profile_query(&self, sld: &str) -> DocumentQuery {
        DocumentQuery::new(
            format!(
                r#"a[href*="{}/{}" i]"#,
                css_string(self.domain),
                css_string(sld)
            ),
            ElementProperty::Href,
        )
    }

    /// Any anchor pointing at the platform
    pub fn any_link_query(&self) -> DocumentQuery {
        DocumentQuery::new(
            format!(r#"a[href*="{}" i]"#, css_string(self.domain)),
            ElementProperty::Href,
        )
    }
}

/// Find one platform's profile link; `""` when the page has none.
pub async fn lookup_platform<S: RenderSession>(
    session: &S,
    spec: &PlatformSpec,
    sld: &str,
    limit: Duration,
) -> (Platform, String) {
    if let Some(href) = best_effort_read(session, &spec.profile_query(sld), limit).await
        && !href.is_empty()
    {
        return (spec.platform, href);
    }

    let href = best_effort_read(session, &spec.any_link_query(), limit)
        .await
        .unwrap_or_default();

    if href.is_empty() {
        debug!(platform = %spec.platform, "No profile link found");
    }
    (spec.platform, href)
}

/// Look up every platform concurrently and fold the results
pub async fn lookup_socials<S: RenderSession>(
    session: &S,
    sld: &str,
    limit: Duration,
) -> SocialHandleMap {
    let lookups = PLATFORMS
        .iter()
        .map(|spec| lookup_platform(session, spec, sld, limit));

    SocialHandleMap::from_lookups(join_all(lookups).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_platform_once() {
        let platforms: Vec<Platform> = PLATFORMS.iter().map(|spec| spec.platform).collect();
        assert_eq!(
            platforms,
            vec![
                Platform::Facebook,
                Platform::Instagram,
                Platform::Pinterest,
                Platform::Tiktok,
                Platform::Twitter,
                Platform::Youtube,
            ]
        );
        for spec in PLATFORMS {
            assert_eq!(spec.domain, format!("{}.com", spec.platform));
        }
    }

    #[test]
    fn profile_query_is_disambiguated_by_sld() {
        let twitter = PLATFORMS[4];
        assert_eq!(twitter.profile_query("acme").selector, r#"a[href*="twitter.com/acme" i]"#);
        assert_eq!(twitter.any_link_query().selector, r#"a[href*="twitter.com" i]"#);
        assert_eq!(twitter.any_link_query().property, ElementProperty::Href);
    }
}
