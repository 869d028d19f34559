//! Image alt-text and source checks

use serde::Serialize;

use crate::audits::{Scorecard, run_html_module};
use crate::error::Result;
use crate::fetch::HtmlSource;
use crate::parser::{self, ImageEntry, ImageFacts};
use crate::types::{ModuleDetails, ModuleKind, ModuleResult};
use crate::url_utils::AuditTarget;

const GENERIC_ALT_TERMS: [&str; 5] = ["image", "img", "picture", "photo", "icon"];
const MAX_ALT_CHARS: usize = 125;
const LAZY_LOADING_THRESHOLD: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesDetails {
    pub images: Vec<ImageEntry>,
    pub total_images: usize,
    pub images_with_alt: usize,
    pub images_missing_alt: usize,
    /// Rounded share of images carrying an alt attribute; 100 with no images
    pub alt_text_percentage: u8,
}

pub async fn run(source: &dyn HtmlSource, target: &AuditTarget) -> ModuleResult {
    run_html_module(ModuleKind::Images, source, target, audit_html).await
}

pub fn audit_html(html: &str) -> Result<ModuleResult> {
    let document = parser::parse_document(html);
    let facts = parser::extract_images(&document)?;
    Ok(evaluate(facts))
}

/// An alt of at most two words that mentions a generic term like "photo"
fn is_generic_alt(alt: &str) -> bool {
    let lower = alt.to_lowercase();
    alt.split(' ').count() <= 2 && GENERIC_ALT_TERMS.iter().any(|term| lower.contains(term))
}

pub fn evaluate(facts: ImageFacts) -> ModuleResult {
    let ImageFacts {
        images,
        total_images,
        images_with_alt,
        images_missing_alt,
        issues,
    } = facts;
    let mut card = Scorecard::with_issues(issues);

    if total_images == 0 {
        card.suggest("No images found on this page");
    } else {
        let coverage = images_with_alt as f64 / total_images as f64 * 100.0;
        if coverage < 50.0 {
            card.deduct(40);
            card.suggest("Add alt text to all images for accessibility");
        } else if coverage < 80.0 {
            card.deduct(20);
            card.suggest("Add alt text to remaining images");
        } else if coverage < 100.0 {
            card.deduct(10);
            card.suggest("Add alt text to the few remaining images");
        }

        let generic = images
            .iter()
            .filter(|img| img.has_alt && is_generic_alt(&img.alt))
            .count();
        if generic > 0 {
            card.deduct(5 * generic as i32);
            card.issue(format!("{generic} images have generic alt text"));
            card.suggest(
                r#"Use descriptive alt text instead of generic terms like "image" or "photo""#,
            );
        }

        let long = images
            .iter()
            .filter(|img| img.has_alt && img.alt.chars().count() > MAX_ALT_CHARS)
            .count();
        if long > 0 {
            card.deduct(3 * long as i32);
            card.issue(format!(
                "{long} images have alt text over {MAX_ALT_CHARS} characters"
            ));
            card.suggest("Keep alt text concise, under 125 characters");
        }

        // Informational only
        let empty_alt = images
            .iter()
            .filter(|img| img.has_alt && img.alt.is_empty())
            .count();
        if empty_alt > 0 {
            card.issue(format!("{empty_alt} images have empty alt attributes"));
            card.suggest(
                "Either add descriptive alt text or remove alt attribute for decorative images",
            );
        }
    }

    let missing_src = images.iter().filter(|img| img.src.is_empty()).count();
    if missing_src > 0 {
        card.deduct(10 * missing_src as i32);
        card.issue(format!(
            "{missing_src} images have missing or empty src attributes"
        ));
        card.suggest("Fix images with missing src attributes");
    }

    if total_images > 0 && !card.has_suggestions() {
        card.suggest("Great job! All images have proper alt text");
    }
    if total_images > LAZY_LOADING_THRESHOLD {
        card.suggest("Consider lazy loading for better performance with many images");
    }

    let alt_text_percentage = if total_images == 0 {
        100
    } else {
        (images_with_alt as f64 / total_images as f64 * 100.0).round() as u8
    };

    card.finish(
        ModuleKind::Images,
        ModuleDetails::Images(ImagesDetails {
            images,
            total_images,
            images_with_alt,
            images_missing_alt,
            alt_text_percentage,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTIVE_ALTS: [&str; 3] = [
        "Mountain trail at sunrise",
        "Red bicycle leaning on a wall",
        "Chef plating a summer salad",
    ];

    #[test]
    fn test_low_alt_coverage_deducts_40() {
        let mut html = String::from("<html><body>");
        for alt in DESCRIPTIVE_ALTS {
            html.push_str(&format!(r#"<img src="/a.jpg" alt="{alt}">"#));
        }
        for i in 0..7 {
            html.push_str(&format!(r#"<img src="/b{i}.jpg">"#));
        }
        html.push_str("</body></html>");

        let result = audit_html(&html).unwrap();
        let Some(ModuleDetails::Images(details)) = &result.details else {
            panic!("expected image details");
        };
        assert_eq!(details.images_with_alt, 3);
        assert_eq!(details.images_missing_alt, 7);
        assert_eq!(details.alt_text_percentage, 30);
        assert_eq!(result.score, 60);
        assert_eq!(result.issues, vec!["7 images missing alt text".to_string()]);
    }

    #[test]
    fn test_no_images_is_not_penalised() {
        let result = audit_html("<html><body><p>Text only</p></body></html>").unwrap();
        assert_eq!(result.score, 100);
        assert_eq!(result.suggestions, vec!["No images found on this page".to_string()]);
    }

    #[test]
    fn test_all_good_images_get_praise() {
        let html = r#"<img src="/a.jpg" alt="Mountain trail at sunrise">"#;
        let result = audit_html(html).unwrap();
        assert_eq!(result.score, 100);
        assert_eq!(
            result.suggestions,
            vec!["Great job! All images have proper alt text".to_string()]
        );
    }

    #[test]
    fn test_generic_long_empty_and_missing_src() {
        let long_alt = "a ".repeat(70);
        let html = format!(
            r#"
            <img src="/1.jpg" alt="Photo">
            <img src="/2.jpg" alt="company logo icon">
            <img src="/3.jpg" alt="{long_alt}">
            <img src="/4.jpg" alt="">
            <img alt="Sunset over the bay">
            "#
        );
        let result = audit_html(&html).unwrap();
        // generic 1 (5) + long 1 (3) + missing src 1 (10); alt coverage is 100%
        assert_eq!(result.score, 100 - 5 - 3 - 10);
        assert!(result.issues.contains(&"1 images have generic alt text".to_string()));
        assert!(result
            .issues
            .contains(&"1 images have empty alt attributes".to_string()));
        assert!(result
            .issues
            .contains(&"1 images have missing or empty src attributes".to_string()));
    }

    #[test]
    fn test_generic_alt_detection() {
        assert!(is_generic_alt("image"));
        assert!(is_generic_alt("Hero Photo"));
        assert!(!is_generic_alt("A photo of the harbour at dusk"));
        assert!(!is_generic_alt(""));
    }

    #[test]
    fn test_many_images_suggest_lazy_loading() {
        let html: String = (0..21)
            .map(|i| format!(r#"<img src="/{i}.jpg" alt="Gallery item number {i}">"#))
            .collect();
        let result = audit_html(&html).unwrap();
        assert!(result
            .suggestions
            .contains(&"Consider lazy loading for better performance with many images".to_string()));
    }

    #[test]
    fn test_score_floor() {
        let html: String = (0..12).map(|_| "<img>").collect();
        let result = audit_html(&html).unwrap();
        assert_eq!(result.score, 0);
    }
}
