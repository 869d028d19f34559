//! PageSpeed Insights client
//!
//! Only the pieces of the Lighthouse payload the page speed module reads are
//! decoded: the four category scores and five lab metric display values.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::url_utils::AuditTarget;

pub const PAGESPEED_ENDPOINT: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

const CATEGORIES: [&str; 4] = ["PERFORMANCE", "ACCESSIBILITY", "BEST_PRACTICES", "SEO"];

// Lighthouse runs routinely take longer than a page fetch
const PAGESPEED_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Mobile,
    Desktop,
}

impl Device {
    pub fn as_str(self) -> &'static str {
        match self {
            Device::Mobile => "mobile",
            Device::Desktop => "desktop",
        }
    }
}

/// Lab metrics as Lighthouse displays them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreMetrics {
    pub fcp: String,
    pub lcp: String,
    pub cls: String,
    pub fid: String,
    pub ttfb: String,
}

/// Category scores (0-100) for one device. `None` means not reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceReport {
    pub performance: Option<u8>,
    pub accessibility: Option<u8>,
    pub best_practices: Option<u8>,
    pub seo: Option<u8>,
    pub metrics: CoreMetrics,
}

#[derive(Debug, Deserialize)]
struct PageSpeedResponse {
    #[serde(rename = "lighthouseResult")]
    lighthouse_result: Option<LighthouseResult>,
}

#[derive(Debug, Default, Deserialize)]
struct LighthouseResult {
    #[serde(default)]
    categories: HashMap<String, LighthouseCategory>,
    #[serde(default)]
    audits: HashMap<String, LighthouseAudit>,
}

#[derive(Debug, Deserialize)]
struct LighthouseCategory {
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LighthouseAudit {
    #[serde(rename = "displayValue")]
    display_value: Option<String>,
}

impl DeviceReport {
    /// Decode a raw PageSpeed JSON body
    pub fn from_json(body: &str) -> Result<Self> {
        let response: PageSpeedResponse = serde_json::from_str(body)
            .map_err(|e| AuditError::PerformancePayload(e.to_string()))?;
        let lighthouse = response.lighthouse_result.unwrap_or_default();

        let score = |category: &str| {
            lighthouse
                .categories
                .get(category)
                .and_then(|c| c.score)
                // A zero score is indistinguishable from "not measured" upstream
                .filter(|s| *s > 0.0)
                .map(|s| (s * 100.0).round().clamp(0.0, 100.0) as u8)
        };
        let metric = |audit: &str| {
            lighthouse
                .audits
                .get(audit)
                .and_then(|a| a.display_value.clone())
                .unwrap_or_else(|| "N/A".to_string())
        };

        Ok(Self {
            performance: score("performance"),
            accessibility: score("accessibility"),
            best_practices: score("best-practices"),
            seo: score("seo"),
            metrics: CoreMetrics {
                fcp: metric("first-contentful-paint"),
                lcp: metric("largest-contentful-paint"),
                cls: metric("cumulative-layout-shift"),
                fid: metric("max-potential-fid"),
                ttfb: metric("server-response-time"),
            },
        })
    }
}

/// Something that can score a page's performance for a device
#[async_trait]
pub trait PerformanceSource: Send + Sync {
    async fn analyze(&self, target: &AuditTarget, device: Device) -> Result<DeviceReport>;
}

/// HTTP client for the PageSpeed Insights v5 API
pub struct PageSpeedClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl PageSpeedClient {
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(PAGESPEED_TIMEOUT)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            endpoint: PAGESPEED_ENDPOINT.to_string(),
            api_key: config.usable_api_key().map(str::to_string),
        })
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn query(&self, target: &AuditTarget, device: Device, key: &str) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("url", target.as_str().to_string()),
            ("key", key.to_string()),
            ("strategy", device.as_str().to_string()),
        ];
        query.extend(CATEGORIES.iter().map(|c| ("category", c.to_string())));
        query
    }
}

#[async_trait]
impl PerformanceSource for PageSpeedClient {
    async fn analyze(&self, target: &AuditTarget, device: Device) -> Result<DeviceReport> {
        let key = self.api_key.as_deref().ok_or(AuditError::MissingApiKey)?;

        debug!(url = %target, device = device.as_str(), "requesting PageSpeed report");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(target, device, key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::Status {
                url: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        DeviceReport::from_json(&body)
    }
}
