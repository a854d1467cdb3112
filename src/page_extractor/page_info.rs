//! Full metadata extraction from a ready page session

use std::time::Duration;

use tracing::debug;

use super::fields::{lang_query, meta_query, read_field, title_query};
use super::schema::PageMetadata;
use super::social::lookup_socials;
use crate::browser::RenderSession;
use crate::origin::ResolvedUrl;

/// Read every field from a loaded page.
///
/// All reads run concurrently on the same session and each one degrades
/// to `""` on its own, so this never fails.
///
/// # Example
/// ```rust,ignore
/// let metadata = extract_page_info(&session, &target, Duration::from_secs(10)).await;
/// println!("Title: {}", metadata.title);
/// ```
pub async fn extract_page_info<S: RenderSession>(
    session: &S,
    target: &ResolvedUrl,
    read_timeout: Duration,
) -> PageMetadata {
    let lang = lang_query();
    let title = title_query();
    let description = meta_query("description");
    let keywords = meta_query("keywords");

    let (lang, title, description, keywords, socials) = tokio::join!(
        read_field(session, &lang, read_timeout),
        read_field(session, &title, read_timeout),
        read_field(session, &description, read_timeout),
        read_field(session, &keywords, read_timeout),
        lookup_socials(session, &target.parts.sld, read_timeout),
    );

    debug!(
        url = %target.url,
        title_found = !title.is_empty(),
        socials_found = socials.found(),
        "Extracted page metadata"
    );

    PageMetadata {
        url: target.url.clone(),
        domain: target.parts.domain.clone(),
        lang,
        title,
        description,
        keywords,
        socials,
    }
}
