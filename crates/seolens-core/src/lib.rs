//! # seolens-core
//!
//! Core library for auditing a web page's on-page SEO.
//!
//! This library provides:
//! - HTML fetching through an ordered list of strategies with a synthetic fallback
//! - DOM fact extraction (meta tags, headings, images, visible text)
//! - Six independent scoring modules producing 0-100 scores
//! - A PageSpeed Insights client
//! - Concurrent orchestration into an [`AuditRun`] and a paginated text report
//!
//! ## Example
//!
//! ```no_run
//! use seolens_core::{AuditConfig, AuditTarget, Auditor};
//!
//! # async fn example() -> seolens_core::Result<()> {
//! let target = AuditTarget::parse("example.com")?;
//! let auditor = Auditor::from_config(&AuditConfig::from_env())?;
//!
//! let run = auditor
//!     .run(&target, |module, result| println!("{module}: {}", result.score))
//!     .await;
//! println!("overall: {}", run.overall_score());
//! # Ok(())
//! # }
//! ```

pub mod audits;
pub mod config;
pub mod error;
pub mod fetch;
pub mod orchestrator;
pub mod pagespeed;
pub mod parser;
pub mod report;
pub mod types;
pub mod url_utils;

// Re-export commonly used types
pub use config::AuditConfig;
pub use error::{AuditError, Result};
pub use fetch::{FetchStrategy, FetchedPage, HtmlFetcher, HtmlSource, PageOrigin};
pub use orchestrator::{AuditRun, Auditor, ScorePolicy};
pub use pagespeed::{Device, DeviceReport, PageSpeedClient, PerformanceSource};
pub use report::Report;
pub use types::{AuditStatus, KeywordEntry, ModuleDetails, ModuleKind, ModuleResult};
pub use url_utils::AuditTarget;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_keys_are_stable() {
        let keys: Vec<&str> = ModuleKind::ALL.iter().map(|m| m.key()).collect();
        assert_eq!(
            keys,
            vec![
                "pageSpeed",
                "metaTags",
                "headings",
                "images",
                "mobileFriendly",
                "keywordDensity"
            ]
        );
    }

    #[test]
    fn test_failure_result_shape() {
        let result = ModuleResult::failure(ModuleKind::Images, &AuditError::EmptyUrl);
        assert_eq!(result.status, AuditStatus::Error);
        assert_eq!(result.score, 0);
        assert_eq!(result.issues, vec!["Please enter a URL".to_string()]);
        assert_eq!(
            result.suggestions,
            vec![
                "Check your internet connection".to_string(),
                "Verify the URL is accessible".to_string()
            ]
        );
        assert!(result.details.is_none());
    }

    #[test]
    fn test_keyword_entry_density() {
        let entry = KeywordEntry::new("rust".to_string(), 3, 7);
        assert_eq!(entry.density, "42.86");
        assert_eq!(KeywordEntry::new("none".to_string(), 1, 0).density, "0.00");
    }
}
