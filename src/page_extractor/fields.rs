//! Best-effort document reads for scalar fields

use std::time::Duration;

use tracing::debug;

use crate::browser::{DocumentQuery, ElementProperty, RenderSession};

/// Run one read, collapsing every failure (no element, evaluation error,
/// timeout) into `None`. Successful values are trimmed.
pub async fn best_effort_read<S: RenderSession>(
    session: &S,
    query: &DocumentQuery,
    limit: Duration,
) -> Option<String> {
    match tokio::time::timeout(limit, session.read(query)).await {
        Ok(Ok(value)) => Some(value.trim().to_string()),
        Ok(Err(e)) => {
            debug!(selector = %query.selector, "Read failed: {}", e);
            None
        }
        Err(_) => {
            debug!(selector = %query.selector, "Read timed out after {}ms", limit.as_millis());
            None
        }
    }
}

/// [`best_effort_read`] with absent mapped to `""`
pub async fn read_field<S: RenderSession>(
    session: &S,
    query: &DocumentQuery,
    limit: Duration,
) -> String {
    best_effort_read(session, query, limit)
        .await
        .unwrap_or_default()
}

/// `lang` attribute of the document root
pub fn lang_query() -> DocumentQuery {
    DocumentQuery::new("html", ElementProperty::Lang)
}

pub fn title_query() -> DocumentQuery {
    DocumentQuery::new("title", ElementProperty::TextContent)
}

/// First `<meta>` whose `name` equals or whose `property` contains `name`,
/// both case-insensitive (`og:description` matches `description`)
pub fn meta_query(name: &str) -> DocumentQuery {
    let name = css_string(name);
    DocumentQuery::new(
        format!(r#"meta[name="{name}" i], meta[property*="{name}" i]"#),
        ElementProperty::Content,
    )
}

/// Escape a value for use inside a double-quoted CSS attribute selector
pub(crate) fn css_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '\n' => escaped.push_str("\\a "),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_selector_matches_name_or_property() {
        let query = meta_query("description");
        assert_eq!(
            query.selector,
            r#"meta[name="description" i], meta[property*="description" i]"#
        );
        assert_eq!(query.property, ElementProperty::Content);
    }

    #[test]
    fn css_values_are_escaped() {
        assert_eq!(css_string(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(css_string("plain-label"), "plain-label");
    }
}
