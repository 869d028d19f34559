//! Mobile usability heuristics over markup and inline CSS

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde::Serialize;

use crate::audits::meta_tags::VIEWPORT_SUGGESTION;
use crate::audits::{Scorecard, run_html_module};
use crate::error::Result;
use crate::fetch::HtmlSource;
use crate::parser::{self, ViewportFacts};
use crate::types::{ModuleDetails, ModuleKind, ModuleResult};
use crate::url_utils::AuditTarget;

static FONT_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)font-size\s*:\s*([0-9]+(?:\.[0-9]+)?)(px|pt|em|rem)")
        .expect("invalid font-size regex")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileChecks {
    pub viewport: bool,
    pub flexible_images: bool,
    pub readable_text: bool,
    pub touch_targets: bool,
    pub no_flash: bool,
}

impl MobileChecks {
    pub const TOTAL: usize = 5;

    pub fn passed(&self) -> usize {
        [
            self.viewport,
            self.flexible_images,
            self.readable_text,
            self.touch_targets,
            self.no_flash,
        ]
        .into_iter()
        .filter(|passed| *passed)
        .count()
    }
}

/// Raw observations the mobile checks are decided from
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileSignals {
    pub viewport: ViewportFacts,
    pub total_images: usize,
    pub responsive_images: usize,
    pub interactive_elements: usize,
    pub touch_friendly_elements: usize,
    pub has_small_fonts: bool,
    pub has_flash: bool,
    pub has_media_queries: bool,
    pub has_fixed_elements: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileFriendlyDetails {
    pub checks: MobileChecks,
    pub passed_checks: usize,
    pub total_checks: usize,
    pub viewport: ViewportFacts,
    pub has_media_queries: bool,
}

pub async fn run(source: &dyn HtmlSource, target: &AuditTarget) -> ModuleResult {
    run_html_module(ModuleKind::MobileFriendly, source, target, audit_html).await
}

pub fn audit_html(html: &str) -> Result<ModuleResult> {
    let document = parser::parse_document(html);
    let signals = collect_signals(&document)?;
    Ok(evaluate(signals))
}

pub fn collect_signals(document: &Html) -> Result<MobileSignals> {
    let meta = parser::extract_meta_tags(document)?;
    let css = parser::extract_inline_css(document)?;

    let img_selector = parser::selector("img")?;
    let mut total_images = 0;
    let mut responsive_images = 0;
    for img in document.select(&img_selector) {
        total_images += 1;
        let attrs = img.value();
        let style = attrs.attr("style").unwrap_or_default();
        let class = attrs.attr("class").unwrap_or_default();
        if style.contains("max-width")
            || style.contains("width: 100%")
            || style.contains("width:100%")
            || class.contains("responsive")
            || attrs.attr("srcset").is_some()
        {
            responsive_images += 1;
        }
    }

    let interactive_selector =
        parser::selector(r#"button, a, input[type="button"], input[type="submit"]"#)?;
    let mut interactive_elements = 0;
    let mut touch_friendly_elements = 0;
    for element in document.select(&interactive_selector) {
        interactive_elements += 1;
        let class = element.value().attr("class").unwrap_or_default();
        if class.contains("btn") || class.contains("button") || element.value().name() == "button"
        {
            touch_friendly_elements += 1;
        }
    }

    let flash_selector = parser::selector("object, embed")?;
    let has_flash = document.select(&flash_selector).any(|el| {
        let attrs = el.value();
        attrs.attr("type").unwrap_or_default().contains("flash")
            || attrs.attr("src").unwrap_or_default().contains(".swf")
            || attrs.attr("data").unwrap_or_default().contains(".swf")
    });

    Ok(MobileSignals {
        viewport: meta.viewport,
        total_images,
        responsive_images,
        interactive_elements,
        touch_friendly_elements,
        has_small_fonts: has_small_fonts(&css),
        has_flash,
        has_media_queries: css.contains("@media")
            && (css.contains("max-width") || css.contains("min-width")),
        has_fixed_elements: css.contains("position: fixed") || css.contains("position:fixed"),
    })
}

/// Any `font-size` below 14px, 11pt, 0.9em or 0.9rem
pub fn has_small_fonts(css: &str) -> bool {
    FONT_SIZE.captures_iter(css).any(|caps| {
        let size: f64 = caps[1].parse().unwrap_or(f64::MAX);
        match caps[2].to_ascii_lowercase().as_str() {
            "px" => size < 14.0,
            "pt" => size < 11.0,
            "em" | "rem" => size < 0.9,
            _ => false,
        }
    })
}

pub fn evaluate(signals: MobileSignals) -> ModuleResult {
    let mut card = Scorecard::new();
    let mut checks = MobileChecks::default();

    if signals.viewport.has_mobile_viewport {
        checks.viewport = true;
    } else {
        card.deduct(30);
        card.issue("Missing or incorrect viewport meta tag");
        card.suggest(VIEWPORT_SUGGESTION);
    }

    if signals.total_images == 0
        || signals.responsive_images as f64 / signals.total_images as f64 > 0.5
    {
        checks.flexible_images = true;
    } else {
        card.deduct(20);
        card.issue("Images may not be responsive");
        card.suggest("Use responsive images with max-width: 100% or srcset attribute");
    }

    if !signals.has_small_fonts {
        checks.readable_text = true;
    } else {
        card.deduct(15);
        card.issue("Some text may be too small to read on mobile");
        card.suggest("Use font sizes of at least 14px for body text");
    }

    if signals.interactive_elements == 0
        || signals.touch_friendly_elements as f64 / signals.interactive_elements as f64 > 0.7
    {
        checks.touch_targets = true;
    } else {
        card.deduct(10);
        card.issue("Some interactive elements may be too small for touch");
        card.suggest("Ensure buttons and links are at least 44px tall for easy tapping");
    }

    if !signals.has_flash {
        checks.no_flash = true;
    } else {
        card.deduct(25);
        card.issue("Flash content detected");
        card.suggest("Replace Flash content with HTML5 alternatives");
    }

    if signals.has_media_queries {
        card.bonus(5);
    } else {
        card.deduct(10);
        card.issue("No responsive CSS media queries detected");
        card.suggest("Use CSS media queries to create responsive layouts");
    }

    if signals.has_fixed_elements {
        card.issue("Fixed positioning may cause mobile usability issues");
        card.suggest("Test fixed elements on mobile devices for usability");
    }

    card.finish(
        ModuleKind::MobileFriendly,
        ModuleDetails::MobileFriendly(MobileFriendlyDetails {
            passed_checks: checks.passed(),
            total_checks: MobileChecks::TOTAL,
            checks,
            viewport: signals.viewport,
            has_media_queries: signals.has_media_queries,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSIVE_PAGE: &str = r#"
        <html>
        <head>
            <meta name="viewport" content="width=device-width, initial-scale=1">
            <style>
                body { font-size: 16px; }
                @media (max-width: 600px) { nav { display: none; } }
            </style>
        </head>
        <body>
            <img src="/hero.jpg" srcset="/hero-2x.jpg 2x" alt="Hero">
            <button>Buy</button>
            <a class="btn btn-primary" href="/cart">Cart</a>
        </body>
        </html>
    "#;

    #[test]
    fn test_responsive_page_passes_everything() {
        let result = audit_html(RESPONSIVE_PAGE).unwrap();
        assert_eq!(result.score, 100);
        assert!(result.issues.is_empty());
        let Some(ModuleDetails::MobileFriendly(details)) = result.details else {
            panic!("expected mobile details");
        };
        assert_eq!(details.passed_checks, 5);
        assert!(details.has_media_queries);
    }

    #[test]
    fn test_bare_page_fails_viewport_and_media_queries() {
        let result = audit_html("<html><body><p>Hello</p></body></html>").unwrap();
        assert_eq!(result.score, 100 - 30 - 10);
        assert_eq!(result.issues[0], "Missing or incorrect viewport meta tag");
    }

    #[test]
    fn test_everything_wrong() {
        let html = r#"
            <html><head>
            <style>p { font-size: 10px; } .bar { position: fixed; }</style>
            </head><body>
            <img src="/a.jpg"><img src="/b.jpg">
            <a href="/1">one</a><a href="/2">two</a>
            <embed src="/movie.swf">
            </body></html>
        "#;
        let result = audit_html(html).unwrap();
        // 30 + 20 + 15 + 10 + 25 + 10 = 110
        assert_eq!(result.score, 0);
        assert!(result
            .issues
            .contains(&"Fixed positioning may cause mobile usability issues".to_string()));
        let Some(ModuleDetails::MobileFriendly(details)) = result.details else {
            panic!("expected mobile details");
        };
        assert_eq!(details.passed_checks, 0);
    }

    #[test]
    fn test_small_font_units() {
        assert!(has_small_fonts("p { font-size: 12px }"));
        assert!(has_small_fonts("p { font-size:10pt }"));
        assert!(has_small_fonts("small { FONT-SIZE: 0.75rem }"));
        assert!(has_small_fonts("small { font-size: 0.8em }"));
        assert!(!has_small_fonts("p { font-size: 16px } h1 { font-size: 2rem }"));
        assert!(!has_small_fonts("p { font-size: 100% }"));
    }

    #[test]
    fn test_half_responsive_images_is_not_enough() {
        let html = r#"
            <meta name="viewport" content="width=device-width">
            <style>@media (min-width: 800px) {}</style>
            <img class="img-responsive" src="/a.jpg"><img src="/b.jpg">
        "#;
        let result = audit_html(html).unwrap();
        assert_eq!(result.score, 100 - 20 + 5);
    }
}
