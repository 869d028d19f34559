//! Common types used across seolens

use std::fmt;

use serde::Serialize;

use crate::audits::headings::HeadingsDetails;
use crate::audits::images::ImagesDetails;
use crate::audits::keyword_density::KeywordDensityDetails;
use crate::audits::meta_tags::MetaTagsDetails;
use crate::audits::mobile_friendly::MobileFriendlyDetails;
use crate::audits::page_speed::PageSpeedDetails;
use crate::error::AuditError;

/// One of the six independent audit checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleKind {
    PageSpeed,
    MetaTags,
    Headings,
    Images,
    MobileFriendly,
    KeywordDensity,
}

impl ModuleKind {
    /// Every module, in report order
    pub const ALL: [ModuleKind; 6] = [
        ModuleKind::PageSpeed,
        ModuleKind::MetaTags,
        ModuleKind::Headings,
        ModuleKind::Images,
        ModuleKind::MobileFriendly,
        ModuleKind::KeywordDensity,
    ];

    /// Stable identifier used as the result key
    pub fn key(self) -> &'static str {
        match self {
            ModuleKind::PageSpeed => "pageSpeed",
            ModuleKind::MetaTags => "metaTags",
            ModuleKind::Headings => "headings",
            ModuleKind::Images => "images",
            ModuleKind::MobileFriendly => "mobileFriendly",
            ModuleKind::KeywordDensity => "keywordDensity",
        }
    }

    /// Human-readable section title
    pub fn title(self) -> &'static str {
        match self {
            ModuleKind::PageSpeed => "Page Speed",
            ModuleKind::MetaTags => "Meta Tags",
            ModuleKind::Headings => "Headings Structure",
            ModuleKind::Images => "Images",
            ModuleKind::MobileFriendly => "Mobile Friendly",
            ModuleKind::KeywordDensity => "Keyword Density",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ModuleKind::PageSpeed => "⚡",
            ModuleKind::MetaTags => "🏷️",
            ModuleKind::Headings => "📑",
            ModuleKind::Images => "🖼️",
            ModuleKind::MobileFriendly => "📱",
            ModuleKind::KeywordDensity => "🔑",
        }
    }

    /// Fixed advice attached to a failed run of this module
    pub fn failure_suggestions(self) -> [&'static str; 2] {
        match self {
            ModuleKind::PageSpeed => [
                "Check your API key configuration",
                "Ensure the URL is accessible",
            ],
            _ => [
                "Check your internet connection",
                "Verify the URL is accessible",
            ],
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Success,
    Error,
}

/// Module-specific structured facts carried alongside the common envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleDetails {
    PageSpeed(PageSpeedDetails),
    MetaTags(MetaTagsDetails),
    Headings(HeadingsDetails),
    Images(ImagesDetails),
    MobileFriendly(MobileFriendlyDetails),
    KeywordDensity(KeywordDensityDetails),
}

/// The output of one audit module.
///
/// `score` is always within 0..=100. `details` is `None` only for
/// error results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleResult {
    pub module: ModuleKind,
    pub status: AuditStatus,
    pub score: u8,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ModuleDetails>,
}

impl ModuleResult {
    /// Downgrade an error into a zero-score result for `module`
    pub fn failure(module: ModuleKind, error: &AuditError) -> Self {
        Self {
            module,
            status: AuditStatus::Error,
            score: 0,
            issues: vec![error.to_string()],
            suggestions: module
                .failure_suggestions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            details: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AuditStatus::Success
    }
}

/// A single row of the keyword frequency table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordEntry {
    pub word: String,
    pub count: usize,
    /// Percentage of the total word count, formatted with two decimals
    pub density: String,
}

impl KeywordEntry {
    pub fn new(word: String, count: usize, word_count: usize) -> Self {
        let density = if word_count == 0 {
            0.0
        } else {
            count as f64 / word_count as f64 * 100.0
        };
        Self {
            word,
            count,
            density: format!("{density:.2}"),
        }
    }

    /// The density as a number, at the two-decimal precision it is reported with
    pub fn density_percent(&self) -> f64 {
        self.density.parse().unwrap_or(0.0)
    }
}
