//! Error types for seolens-core

use thiserror::Error;

use crate::types::ModuleKind;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AuditError>;

/// Everything that can go wrong while auditing a page
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Please enter a URL")]
    EmptyUrl,

    #[error("Please enter a valid URL (e.g., example.com or https://example.com): {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{strategy} returned content that does not look like HTML")]
    NotHtml { strategy: String },

    #[error("PageSpeed API key is not configured (set PAGESPEED_API_KEY)")]
    MissingApiKey,

    #[error("malformed PageSpeed response: {0}")]
    PerformancePayload(String),

    #[error("unable to parse selector {selector}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("{0} already has a recorded result")]
    AlreadyRecorded(ModuleKind),

    #[error("failed to read {context}: {message}")]
    Source { context: String, message: String },

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

impl AuditError {
    /// Build a generic source failure, used by custom `HtmlSource` implementations
    pub fn source(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            context: context.into(),
            message: message.into(),
        }
    }
}
