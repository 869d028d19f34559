//! Title, description, viewport and Open Graph checks

use crate::audits::{Scorecard, run_html_module};
use crate::error::Result;
use crate::fetch::HtmlSource;
use crate::parser::{self, MetaTagFacts};
use crate::types::{ModuleDetails, ModuleKind, ModuleResult};
use crate::url_utils::AuditTarget;

pub type MetaTagsDetails = MetaTagFacts;

pub const VIEWPORT_SUGGESTION: &str =
    r#"Add viewport meta tag: <meta name="viewport" content="width=device-width, initial-scale=1">"#;

pub async fn run(source: &dyn HtmlSource, target: &AuditTarget) -> ModuleResult {
    run_html_module(ModuleKind::MetaTags, source, target, audit_html).await
}

pub fn audit_html(html: &str) -> Result<ModuleResult> {
    let document = parser::parse_document(html);
    let facts = parser::extract_meta_tags(&document)?;
    Ok(evaluate(facts))
}

/// Score extracted meta tags. Extraction issues stay in the details.
pub fn evaluate(facts: MetaTagFacts) -> ModuleResult {
    let mut card = Scorecard::new();

    let title_len = facts.title.length;
    if title_len == 0 {
        card.deduct(30);
        card.issue("Missing title tag");
        card.suggest("Add a descriptive title tag");
    } else if title_len > 60 {
        card.deduct(15);
        card.issue("Title too long (over 60 characters)");
        card.suggest("Shorten title to under 60 characters");
    } else if title_len < 30 {
        card.deduct(10);
        card.issue("Title too short (under 30 characters)");
        card.suggest("Expand title to 30-60 characters");
    }

    let description_len = facts.description.length;
    if description_len == 0 {
        card.deduct(25);
        card.issue("Missing meta description");
        card.suggest("Add a compelling meta description");
    } else if description_len > 160 {
        card.deduct(10);
        card.issue("Meta description too long (over 160 characters)");
        card.suggest("Shorten description to under 160 characters");
    } else if description_len < 120 {
        card.deduct(5);
        card.issue("Meta description could be longer");
        card.suggest("Expand description to 120-160 characters");
    }

    if !facts.viewport.has_mobile_viewport {
        card.deduct(15);
        card.issue("Missing or incorrect viewport meta tag");
        card.suggest(VIEWPORT_SUGGESTION);
    }

    if facts.open_graph.title.is_empty() {
        card.deduct(10);
        card.issue("Missing Open Graph title");
        card.suggest("Add og:title meta tag for social sharing");
    }
    if facts.open_graph.description.is_empty() {
        card.deduct(10);
        card.issue("Missing Open Graph description");
        card.suggest("Add og:description meta tag for social sharing");
    }
    if facts.open_graph.image.is_empty() {
        card.deduct(5);
        card.issue("Missing Open Graph image");
        card.suggest("Add og:image meta tag for social sharing");
    }

    card.finish(ModuleKind::MetaTags, ModuleDetails::MetaTags(facts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AuditStatus;

    fn page(title: &str, description: &str, extra_head: &str) -> String {
        format!(
            r#"<html><head>
                <title>{title}</title>
                <meta name="description" content="{description}">
                {extra_head}
            </head><body></body></html>"#
        )
    }

    const COMPLETE_HEAD: &str = r#"
        <meta name="viewport" content="width=device-width, initial-scale=1">
        <meta property="og:title" content="Title">
        <meta property="og:description" content="Description">
        <meta property="og:image" content="https://example.com/cover.png">
    "#;

    #[test]
    fn test_perfect_page_scores_100() {
        let html = page(&"t".repeat(45), &"d".repeat(150), COMPLETE_HEAD);
        let result = audit_html(&html).unwrap();
        assert_eq!(result.status, AuditStatus::Success);
        assert_eq!(result.score, 100);
        assert!(result.issues.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_empty_page_loses_everything_listed() {
        let result = audit_html("<html><head></head><body></body></html>").unwrap();
        // 30 + 25 + 15 + 10 + 10 + 5
        assert_eq!(result.score, 5);
        assert_eq!(result.issues.len(), 6);
        assert_eq!(result.issues[0], "Missing title tag");
    }

    #[test]
    fn test_length_bands() {
        let long = audit_html(&page(&"t".repeat(61), &"d".repeat(161), COMPLETE_HEAD)).unwrap();
        assert_eq!(long.score, 100 - 15 - 10);

        let short = audit_html(&page(&"t".repeat(29), &"d".repeat(119), COMPLETE_HEAD)).unwrap();
        assert_eq!(short.score, 100 - 10 - 5);
        assert_eq!(
            short.issues,
            vec![
                "Title too short (under 30 characters)".to_string(),
                "Meta description could be longer".to_string()
            ]
        );
    }

    #[test]
    fn test_details_keep_extraction_issues() {
        let result = audit_html(&page(&"t".repeat(10), "", "")).unwrap();
        let Some(ModuleDetails::MetaTags(facts)) = result.details else {
            panic!("expected meta tag details");
        };
        assert_eq!(facts.title.length, 10);
        assert!(facts
            .description
            .issues
            .contains(&"Missing meta description".to_string()));
    }
}
