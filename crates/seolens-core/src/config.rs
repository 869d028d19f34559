//! Runtime configuration loaded from the environment

use std::env;
use std::time::Duration;

/// Placeholder value shipped in example `.env` files
pub const API_KEY_PLACEHOLDER: &str = "your_api_key_here";

/// Public relays tried in order when fetching page HTML.
///
/// `{url}` is replaced with the percent-encoded target.
pub const DEFAULT_PROXIES: &[&str] = &[
    "https://api.allorigins.win/raw?url={url}",
    "https://corsproxy.io/?{url}",
    "https://api.codetabs.com/v1/proxy?quest={url}",
];

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration shared by the fetcher and the PageSpeed client
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub pagespeed_api_key: Option<String>,
    pub proxies: Vec<String>,
    pub fetch_timeout: Duration,
    pub direct_fetch: bool,
    pub user_agent: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            pagespeed_api_key: None,
            proxies: DEFAULT_PROXIES.iter().map(|p| p.to_string()).collect(),
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            direct_fetch: true,
            user_agent: format!(
                "Mozilla/5.0 (compatible; seolens/{})",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

impl AuditConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.pagespeed_api_key = lookup("PAGESPEED_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        if let Some(raw) = lookup("SEOLENS_PROXIES") {
            let proxies: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            if !proxies.is_empty() {
                config.proxies = proxies;
            }
        }

        if let Some(secs) = lookup("SEOLENS_FETCH_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok())
        {
            config.fetch_timeout = Duration::from_secs(secs);
        }

        if let Some(flag) = lookup("SEOLENS_DIRECT_FETCH") {
            config.direct_fetch = !matches!(flag.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no");
        }

        config
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.pagespeed_api_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_proxies(mut self, proxies: Vec<String>) -> Self {
        self.proxies = proxies;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_direct_fetch(mut self, enabled: bool) -> Self {
        self.direct_fetch = enabled;
        self
    }

    /// The API key, unless it is missing or still the placeholder
    pub fn usable_api_key(&self) -> Option<&str> {
        self.pagespeed_api_key
            .as_deref()
            .filter(|key| !key.is_empty() && *key != API_KEY_PLACEHOLDER)
    }
}
