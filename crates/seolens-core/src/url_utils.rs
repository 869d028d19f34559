use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::error::{AuditError, Result};

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)(https?://)?[\da-z.-]+\.[a-z.]{2,}(:\d{1,5})?([/?#]\S*)?$")
        .expect("invalid url pattern")
});

/// A normalized absolute URL that an audit run is pointed at.
///
/// Built once before the fan-out and shared read-only with every module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AuditTarget {
    url: Url,
}

impl AuditTarget {
    /// Validate free-text input and normalize it into a target.
    ///
    /// Input without an `http://` or `https://` prefix gets `https://`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AuditError::EmptyUrl);
        }
        if !URL_PATTERN.is_match(trimmed) {
            return Err(AuditError::InvalidUrl(trimmed.to_string()));
        }

        let normalized = normalize_scheme(trimmed);
        let url = Url::parse(&normalized).map_err(|_| AuditError::InvalidUrl(trimmed.to_string()))?;

        Ok(Self { url })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Host portion, or the full URL when the target has no host
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_else(|| self.url.as_str())
    }
}

impl fmt::Display for AuditTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Prepend `https://` when the input carries no http(s) scheme.
pub fn normalize_scheme(input: &str) -> String {
    let lower = input.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{input}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_https_when_scheme_missing() {
        let target = AuditTarget::parse("example.com").unwrap();
        assert_eq!(target.as_str(), "https://example.com/");
        assert_eq!(target.host(), "example.com");
    }

    #[test]
    fn test_keeps_existing_scheme_and_path() {
        let target = AuditTarget::parse("http://blog.example.co.uk/posts/1").unwrap();
        assert_eq!(target.as_str(), "http://blog.example.co.uk/posts/1");
    }

    #[test]
    fn test_accepts_port_and_query() {
        let target = AuditTarget::parse("https://example.com:8443/search?q=seo").unwrap();
        assert_eq!(target.url().port(), Some(8443));
        assert_eq!(target.url().query(), Some("q=seo"));
    }

    #[test]
    fn test_accepts_long_top_level_domains() {
        let target = AuditTarget::parse("shop.technology").unwrap();
        assert_eq!(target.as_str(), "https://shop.technology/");
        let target = AuditTarget::parse("https://example.photography/gallery").unwrap();
        assert_eq!(target.host(), "example.photography");
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        let target = AuditTarget::parse("  example.org  ").unwrap();
        assert_eq!(target.host(), "example.org");
    }

    #[test]
    fn test_rejects_empty_input() {
        assert!(matches!(AuditTarget::parse("   "), Err(AuditError::EmptyUrl)));
    }

    #[test]
    fn test_rejects_input_without_dotted_host() {
        assert!(matches!(
            AuditTarget::parse("localhost"),
            Err(AuditError::InvalidUrl(_))
        ));
        assert!(matches!(
            AuditTarget::parse("not a url"),
            Err(AuditError::InvalidUrl(_))
        ));
        assert!(matches!(
            AuditTarget::parse("ftp://example.com"),
            Err(AuditError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_normalize_scheme_is_case_insensitive() {
        assert_eq!(normalize_scheme("HTTPS://example.com"), "HTTPS://example.com");
        assert_eq!(normalize_scheme("example.com"), "https://example.com");
    }
}
