//! The six audit modules
//!
//! Every module starts from 100, applies an ordered list of deductions (and
//! occasionally a capped bonus), and reports the clamped score together with
//! its issues and suggestions. Modules never return errors: failures become
//! an error-status [`ModuleResult`] with a score of 0.

pub mod headings;
pub mod images;
pub mod keyword_density;
pub mod meta_tags;
pub mod mobile_friendly;
pub mod page_speed;

use tracing::warn;

use crate::error::Result;
use crate::fetch::HtmlSource;
use crate::types::{AuditStatus, ModuleDetails, ModuleKind, ModuleResult};
use crate::url_utils::AuditTarget;

pub const SYNTHETIC_PAGE_NOTE: &str =
    "The page could not be fetched; these results are based on placeholder content";

/// Clamp a running score into 0..=100
pub fn clamp_score(raw: i32) -> u8 {
    raw.clamp(0, 100) as u8
}

/// Running score plus the issues and suggestions collected along the way
#[derive(Debug)]
pub(crate) struct Scorecard {
    score: i32,
    issues: Vec<String>,
    suggestions: Vec<String>,
}

impl Scorecard {
    pub(crate) fn new() -> Self {
        Self::with_issues(Vec::new())
    }

    /// Start from issues already raised during extraction
    pub(crate) fn with_issues(issues: Vec<String>) -> Self {
        Self {
            score: 100,
            issues,
            suggestions: Vec::new(),
        }
    }

    pub(crate) fn deduct(&mut self, points: i32) {
        self.score -= points;
    }

    /// Positive signal, capped at 100
    pub(crate) fn bonus(&mut self, points: i32) {
        self.score = (self.score + points).min(100);
    }

    pub(crate) fn issue(&mut self, message: impl Into<String>) {
        self.issues.push(message.into());
    }

    pub(crate) fn suggest(&mut self, message: impl Into<String>) {
        self.suggestions.push(message.into());
    }

    pub(crate) fn has_suggestions(&self) -> bool {
        !self.suggestions.is_empty()
    }

    pub(crate) fn finish(self, module: ModuleKind, details: ModuleDetails) -> ModuleResult {
        ModuleResult {
            module,
            status: AuditStatus::Success,
            score: clamp_score(self.score),
            issues: self.issues,
            suggestions: self.suggestions,
            details: Some(details),
        }
    }
}

/// Fetch the page, run `audit` over its HTML, and contain any failure.
///
/// `audit` is synchronous so the parsed document never lives across an
/// await point.
pub(crate) async fn run_html_module<F>(
    module: ModuleKind,
    source: &dyn HtmlSource,
    target: &AuditTarget,
    audit: F,
) -> ModuleResult
where
    F: FnOnce(&str) -> Result<ModuleResult>,
{
    let outcome = match source.fetch_page(target).await {
        Ok(page) => audit(&page.html).map(|mut result| {
            if page.is_synthetic() {
                result.suggestions.push(SYNTHETIC_PAGE_NOTE.to_string());
            }
            result
        }),
        Err(err) => Err(err),
    };

    outcome.unwrap_or_else(|err| {
        warn!(module = module.key(), url = %target, error = %err, "audit module failed");
        ModuleResult::failure(module, &err)
    })
}
