//! Lighthouse category scores for mobile and desktop

use serde::Serialize;
use tracing::warn;

use crate::pagespeed::{Device, DeviceReport, PerformanceSource};
use crate::types::{AuditStatus, ModuleDetails, ModuleKind, ModuleResult};
use crate::url_utils::AuditTarget;

const PERFORMANCE_TIPS: [&str; 3] = [
    "Optimize images and reduce file sizes",
    "Minimize HTTP requests",
    "Enable browser caching",
];

const ACCESSIBILITY_TIPS: [&str; 3] = [
    "Add alt text to images",
    "Improve color contrast",
    "Use semantic HTML elements",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSpeedDetails {
    pub mobile: DeviceReport,
    pub desktop: DeviceReport,
}

/// Query both devices concurrently; either failure fails the module
pub async fn run(source: &dyn PerformanceSource, target: &AuditTarget) -> ModuleResult {
    let (mobile, desktop) = futures::join!(
        source.analyze(target, Device::Mobile),
        source.analyze(target, Device::Desktop)
    );

    match mobile.and_then(|mobile| desktop.map(|desktop| (mobile, desktop))) {
        Ok((mobile, desktop)) => evaluate(mobile, desktop),
        Err(err) => {
            warn!(module = ModuleKind::PageSpeed.key(), url = %target, error = %err, "audit module failed");
            ModuleResult::failure(ModuleKind::PageSpeed, &err)
        }
    }
}

pub fn evaluate(mobile: DeviceReport, desktop: DeviceReport) -> ModuleResult {
    // Unavailable scores compare as zero
    let score = |value: Option<u8>| value.unwrap_or(0);

    let mut issues = Vec::new();
    if score(mobile.performance) < 50 {
        issues.push("Mobile performance score is poor".to_string());
    }
    if score(desktop.performance) < 50 {
        issues.push("Desktop performance score is poor".to_string());
    }
    if score(mobile.accessibility) < 90 {
        issues.push("Mobile accessibility needs improvement".to_string());
    }
    if score(desktop.accessibility) < 90 {
        issues.push("Desktop accessibility needs improvement".to_string());
    }
    if score(mobile.seo) < 90 {
        issues.push("Mobile SEO score needs improvement".to_string());
    }
    if score(desktop.seo) < 90 {
        issues.push("Desktop SEO score needs improvement".to_string());
    }

    let mut suggestions = Vec::new();
    if score(mobile.performance) < 90 || score(desktop.performance) < 90 {
        suggestions.extend(PERFORMANCE_TIPS.iter().map(|tip| tip.to_string()));
    }
    if score(mobile.accessibility) < 95 || score(desktop.accessibility) < 95 {
        suggestions.extend(ACCESSIBILITY_TIPS.iter().map(|tip| tip.to_string()));
    }

    let total: u32 = [
        mobile.performance,
        mobile.seo,
        mobile.accessibility,
        mobile.best_practices,
    ]
    .into_iter()
    .map(|value| u32::from(score(value)))
    .sum();
    let overall = (f64::from(total) / 4.0).round() as u8;

    ModuleResult {
        module: ModuleKind::PageSpeed,
        status: AuditStatus::Success,
        score: overall.min(100),
        issues,
        suggestions,
        details: Some(ModuleDetails::PageSpeed(PageSpeedDetails { mobile, desktop })),
    }
}
