//! URL list acquisition
//!
//! The run's input is a list of raw URL strings. It comes from either a
//! remote JSON document (`http://` / `https://` source) or a local file.
//! JSON sources may be an array of strings or an array of records carrying a
//! `url` field; local files that are not JSON are read one URL per line.

use serde::Deserialize;
use tracing::{debug, info};

use crate::utils::SetupError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UrlEntry {
    Bare(String),
    Record { url: String },
}

impl UrlEntry {
    fn into_url(self) -> String {
        match self {
            Self::Bare(url) | Self::Record { url } => url,
        }
    }
}

/// Fetch the raw URL list from `source`.
///
/// Entries are returned untouched (no trimming or validation); resolution
/// happens later in the orchestrator so invalid entries can still be
/// reported.
pub async fn read_urls(source: &str) -> Result<Vec<String>, SetupError> {
    let source = source.trim();

    let urls = if is_remote(source) {
        info!("Fetching URL list from {}", source);
        let entries: Vec<UrlEntry> = reqwest::get(source)
            .await?
            .error_for_status()?
            .json()
            .await?;
        entries.into_iter().map(UrlEntry::into_url).collect()
    } else {
        info!("Reading URL list from {}", source);
        let contents = tokio::fs::read_to_string(source).await?;
        parse_url_list(&contents)?
    };

    if urls.is_empty() {
        return Err(SetupError::EmptyInput(source.to_string()));
    }

    debug!(count = urls.len(), "Loaded URL list");
    Ok(urls)
}

fn is_remote(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Parse local file contents.
///
/// A document starting with `[` must be a valid JSON list; anything else
/// is a newline-separated list where blank lines and `#` comments are
/// skipped.
pub fn parse_url_list(contents: &str) -> Result<Vec<String>, SetupError> {
    if contents.trim_start().starts_with('[') {
        let entries: Vec<UrlEntry> = serde_json::from_str(contents)?;
        return Ok(entries.into_iter().map(UrlEntry::into_url).collect());
    }

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_strings_and_records_mix() {
        let urls = parse_url_list(
            r#"["example.com", {"url": "https://acme.com/shop", "name": "Acme"}, ""]"#,
        )
        .unwrap();
        assert_eq!(urls, vec!["example.com", "https://acme.com/shop", ""]);
    }

    #[test]
    fn plain_lines_skip_blanks_and_comments() {
        let urls = parse_url_list("# exported 2024-01-01\nexample.com\n\n  acme.co.uk  \n").unwrap();
        assert_eq!(urls, vec!["example.com", "acme.co.uk"]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_url_list("[\"example.com\",").unwrap_err();
        assert!(matches!(err, SetupError::JsonParseError(_)));
    }

    #[test]
    fn remote_sources_are_detected() {
        assert!(is_remote("https://lists.example.com/urls.json"));
        assert!(is_remote("HTTP://lists.example.com/urls.json"));
        assert!(!is_remote("./urls.json"));
    }

    #[tokio::test]
    async fn reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.json");
        tokio::fs::write(&path, r#"[{"url": "example.com"}, "acme.com"]"#)
            .await
            .unwrap();

        let urls = read_urls(path.to_str().unwrap()).await.unwrap();
        assert_eq!(urls, vec!["example.com", "acme.com"]);
    }

    #[tokio::test]
    async fn empty_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        tokio::fs::write(&path, "# nothing yet\n").await.unwrap();

        let err = read_urls(path.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, SetupError::EmptyInput(_)));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = read_urls("/nonexistent/sitemeta/urls.json").await.unwrap_err();
        assert!(matches!(err, SetupError::IoError(_)));
    }
}
