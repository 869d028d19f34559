//! Heading outline checks

use serde::Serialize;

use crate::audits::{Scorecard, run_html_module};
use crate::error::Result;
use crate::fetch::HtmlSource;
use crate::parser::{self, HeadingEntry, HeadingFacts, HeadingStructure};
use crate::types::{ModuleDetails, ModuleKind, ModuleResult};
use crate::url_utils::AuditTarget;

const MAX_HEADING_CHARS: usize = 70;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingsDetails {
    pub headings: Vec<HeadingEntry>,
    pub structure: HeadingStructure,
    pub total_headings: usize,
}

pub async fn run(source: &dyn HtmlSource, target: &AuditTarget) -> ModuleResult {
    run_html_module(ModuleKind::Headings, source, target, audit_html).await
}

pub fn audit_html(html: &str) -> Result<ModuleResult> {
    let document = parser::parse_document(html);
    let facts = parser::extract_headings(&document)?;
    Ok(evaluate(facts))
}

pub fn evaluate(facts: HeadingFacts) -> ModuleResult {
    let HeadingFacts {
        headings,
        structure,
        issues,
        hierarchy_issues,
    } = facts;
    let mut card = Scorecard::with_issues(issues);

    if structure.h1 == 0 {
        card.deduct(30);
        card.suggest("Add an H1 tag to define the main heading");
    } else if structure.h1 > 1 {
        card.deduct(20);
        card.suggest("Use only one H1 tag per page");
    }

    if !hierarchy_issues.is_empty() {
        card.deduct(10 * hierarchy_issues.len() as i32);
        card.suggest("Fix heading hierarchy - use headings in order (H1 → H2 → H3, etc.)");
    }

    if structure.h2 == 0 && structure.h3 > 0 {
        card.deduct(15);
        card.issue("H3 tags exist without H2 tags");
        card.suggest("Add H2 tags before using H3 tags");
    }

    let total_headings = structure.total();
    if total_headings == 0 {
        card.deduct(50);
        card.issue("No heading tags found");
        card.suggest("Add heading tags to structure your content");
    } else if total_headings < 3 {
        card.deduct(10);
        card.suggest("Consider adding more headings to improve content structure");
    }

    let empty = headings.iter().filter(|h| h.text.is_empty()).count();
    if empty > 0 {
        card.deduct(5 * empty as i32);
        card.issue(format!("{empty} empty heading tags found"));
        card.suggest("Remove empty heading tags or add descriptive text");
    }

    let long = headings
        .iter()
        .filter(|h| h.text.chars().count() > MAX_HEADING_CHARS)
        .count();
    if long > 0 {
        card.deduct(5 * long as i32);
        card.issue(format!(
            "{long} headings are too long (>{MAX_HEADING_CHARS} characters)"
        ));
        card.suggest("Keep headings concise and under 70 characters");
    }

    card.finish(
        ModuleKind::Headings,
        ModuleDetails::Headings(HeadingsDetails {
            headings,
            structure,
            total_headings,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_headings() {
        let result = audit_html("<html><body><p>Just text</p></body></html>").unwrap();
        assert!(result.score <= 50);
        // No H1 (30) plus no headings at all (50)
        assert_eq!(result.score, 20);
        assert!(result.issues.contains(&"No heading tags found".to_string()));
    }

    #[test]
    fn test_single_h1_only_loses_few_headings_points() {
        let result = audit_html("<html><body><h1>Welcome</h1></body></html>").unwrap();
        assert_eq!(result.score, 90);
        assert!(result.issues.is_empty());
        assert_eq!(
            result.suggestions,
            vec!["Consider adding more headings to improve content structure".to_string()]
        );
    }

    #[test]
    fn test_well_structured_outline() {
        let html = r#"
            <h1>Guide</h1>
            <h2>Setup</h2>
            <h3>Install</h3>
            <h2>Usage</h2>
        "#;
        let result = audit_html(html).unwrap();
        assert_eq!(result.score, 100);
        let Some(ModuleDetails::Headings(details)) = result.details else {
            panic!("expected heading details");
        };
        assert_eq!(details.total_headings, 4);
    }

    #[test]
    fn test_skips_and_missing_h2() {
        let html = r#"
            <h1>One</h1>
            <h1>Two</h1>
            <h3>Skipped</h3>
            <h5>Skipped again</h5>
        "#;
        let result = audit_html(html).unwrap();
        // multiple H1 (20) + two skips (20) + H3 without H2 (15)
        assert_eq!(result.score, 45);
        assert_eq!(result.issues[0], "Multiple H1 tags found");
        assert_eq!(result.issues[1], "Heading hierarchy issue: H3 follows H1");
        assert_eq!(result.issues[2], "Heading hierarchy issue: H5 follows H3");
        assert_eq!(result.issues[3], "H3 tags exist without H2 tags");
    }

    #[test]
    fn test_empty_and_long_headings() {
        let long = "x".repeat(71);
        let html = format!("<h1>Title</h1><h2></h2><h2>{long}</h2><h2>  </h2>");
        let result = audit_html(&html).unwrap();
        assert_eq!(result.score, 100 - 10 - 5);
        assert!(result.issues.contains(&"2 empty heading tags found".to_string()));
        assert!(result
            .issues
            .contains(&"1 headings are too long (>70 characters)".to_string()));
    }

    #[test]
    fn test_score_never_negative() {
        let html = "<h3></h3><h6></h6><h3></h3><h6></h6><h3></h3><h6></h6>";
        let result = audit_html(html).unwrap();
        assert_eq!(result.score, 0);
    }
}
