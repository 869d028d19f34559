//! Page HTML retrieval
//!
//! An ordered list of [`FetchStrategy`] implementations is tried until one
//! returns content that looks like HTML. When every strategy fails the
//! fetcher hands back a deterministic synthetic document, so callers always
//! get something parseable.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::url_utils::AuditTarget;

/// One way of obtaining the raw HTML of a page
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, target: &AuditTarget) -> Result<String>;
}

/// Where the HTML handed to the audit modules came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum PageOrigin {
    Fetched { strategy: String },
    Synthetic,
}

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,
    pub origin: PageOrigin,
}

impl FetchedPage {
    pub fn is_synthetic(&self) -> bool {
        self.origin == PageOrigin::Synthetic
    }
}

/// Anything the HTML audit modules can pull a page from
#[async_trait]
pub trait HtmlSource: Send + Sync {
    async fn fetch_page(&self, target: &AuditTarget) -> Result<FetchedPage>;
}

/// Accept payloads that contain an `<html` tag, in any case
pub fn looks_like_html(payload: &str) -> bool {
    payload.to_ascii_lowercase().contains("<html")
}

/// Plain GET of the target itself
pub struct DirectStrategy {
    client: Client,
}

impl DirectStrategy {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FetchStrategy for DirectStrategy {
    fn name(&self) -> &str {
        "direct"
    }

    async fn fetch(&self, target: &AuditTarget) -> Result<String> {
        get_text(&self.client, target.as_str()).await
    }
}

/// GET through a relay whose template embeds the encoded target at `{url}`
pub struct ProxyStrategy {
    template: String,
    client: Client,
}

impl ProxyStrategy {
    pub fn new(template: impl Into<String>, client: Client) -> Self {
        Self {
            template: template.into(),
            client,
        }
    }

    pub fn request_url(&self, target: &AuditTarget) -> String {
        let encoded: String =
            url::form_urlencoded::byte_serialize(target.as_str().as_bytes()).collect();
        if self.template.contains("{url}") {
            self.template.replace("{url}", &encoded)
        } else {
            format!("{}{}", self.template, encoded)
        }
    }
}

#[async_trait]
impl FetchStrategy for ProxyStrategy {
    fn name(&self) -> &str {
        &self.template
    }

    async fn fetch(&self, target: &AuditTarget) -> Result<String> {
        get_text(&self.client, &self.request_url(target)).await
    }
}

async fn get_text(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AuditError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.text().await?)
}

/// Sequential strategy chain with a synthetic last resort
pub struct HtmlFetcher {
    strategies: Vec<Box<dyn FetchStrategy>>,
}

impl HtmlFetcher {
    pub fn new(strategies: Vec<Box<dyn FetchStrategy>>) -> Self {
        Self { strategies }
    }

    /// Direct fetch (when enabled) followed by each configured proxy
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        let mut strategies: Vec<Box<dyn FetchStrategy>> = Vec::new();
        if config.direct_fetch {
            strategies.push(Box::new(DirectStrategy::new(client.clone())));
        }
        for template in &config.proxies {
            strategies.push(Box::new(ProxyStrategy::new(template.clone(), client.clone())));
        }

        Ok(Self::new(strategies))
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Try each strategy in order; never fails
    pub async fn fetch(&self, target: &AuditTarget) -> FetchedPage {
        for strategy in &self.strategies {
            debug!(strategy = strategy.name(), url = %target, "fetching page");
            match strategy.fetch(target).await {
                Ok(body) if looks_like_html(&body) => {
                    return FetchedPage {
                        html: body,
                        origin: PageOrigin::Fetched {
                            strategy: strategy.name().to_string(),
                        },
                    };
                }
                Ok(_) => {
                    let err = AuditError::NotHtml {
                        strategy: strategy.name().to_string(),
                    };
                    warn!(url = %target, "{err}");
                }
                Err(err) => {
                    warn!(strategy = strategy.name(), url = %target, error = %err, "fetch attempt failed");
                }
            }
        }

        warn!(url = %target, "all fetch strategies failed, using synthetic document");
        FetchedPage {
            html: synthetic_document(target),
            origin: PageOrigin::Synthetic,
        }
    }
}

#[async_trait]
impl HtmlSource for HtmlFetcher {
    async fn fetch_page(&self, target: &AuditTarget) -> Result<FetchedPage> {
        Ok(self.fetch(target).await)
    }
}

/// Placeholder page derived only from the target host
pub fn synthetic_document(target: &AuditTarget) -> String {
    let host = target.host();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{host} - Home</title>
<meta name="description" content="Welcome to {host}. This placeholder page stands in for content that could not be retrieved.">
</head>
<body>
<header><h1>Welcome to {host}</h1></header>
<main>
<section>
<h2>About {host}</h2>
<p>The content of {host} could not be retrieved, so this page shows generic placeholder text in its place.</p>
</section>
<section>
<h2>Services</h2>
<p>Details about the services offered by {host} would normally appear here.</p>
</section>
</main>
<footer><p>{host}</p></footer>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Canned {
        name: &'static str,
        body: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl FetchStrategy for Canned {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, _target: &AuditTarget) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body
                .map(str::to_string)
                .ok_or_else(|| AuditError::source(self.name, "connection refused"))
        }
    }

    fn canned(name: &'static str, body: Option<&'static str>, calls: &Arc<AtomicUsize>) -> Box<dyn FetchStrategy> {
        Box::new(Canned {
            name,
            body,
            calls: calls.clone(),
        })
    }

    fn target() -> AuditTarget {
        AuditTarget::parse("example.com").unwrap()
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("<html><body></body></html>"));
        assert!(looks_like_html("<!DOCTYPE html><HTML lang=\"en\">"));
        assert!(!looks_like_html("{\"error\": \"rate limited\"}"));
        assert!(!looks_like_html(""));
    }

    #[test]
    fn test_proxy_request_url_encodes_target() {
        let proxy = ProxyStrategy::new("https://relay.test/raw?url={url}", Client::new());
        assert_eq!(
            proxy.request_url(&target()),
            "https://relay.test/raw?url=https%3A%2F%2Fexample.com%2F"
        );

        let suffix = ProxyStrategy::new("https://relay.test/?", Client::new());
        assert_eq!(
            suffix.request_url(&target()),
            "https://relay.test/?https%3A%2F%2Fexample.com%2F"
        );
    }

    #[tokio::test]
    async fn test_first_valid_strategy_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = HtmlFetcher::new(vec![
            canned("down", None, &calls),
            canned("json", Some("{\"contents\": null}"), &calls),
            canned("good", Some("<html><title>ok</title></html>"), &calls),
            canned("unused", Some("<html></html>"), &calls),
        ]);

        let page = fetcher.fetch(&target()).await;
        assert_eq!(
            page.origin,
            PageOrigin::Fetched {
                strategy: "good".to_string()
            }
        );
        assert!(page.html.contains("<title>ok</title>"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_strategies_fall_back_to_synthetic() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = HtmlFetcher::new(vec![canned("down", None, &calls)]);

        let page = fetcher.fetch(&target()).await;
        assert!(page.is_synthetic());
        assert!(looks_like_html(&page.html));
        assert!(page.html.contains("Welcome to example.com"));
        assert_eq!(page.html, synthetic_document(&target()));
    }

    #[test]
    fn test_from_config_orders_direct_first() {
        let config = AuditConfig::default().with_proxies(vec!["https://p.test/{url}".to_string()]);
        let fetcher = HtmlFetcher::from_config(&config).unwrap();
        assert_eq!(fetcher.strategy_names(), vec!["direct", "https://p.test/{url}"]);

        let fetcher = HtmlFetcher::from_config(&config.with_direct_fetch(false)).unwrap();
        assert_eq!(fetcher.strategy_names(), vec!["https://p.test/{url}"]);
    }
}
