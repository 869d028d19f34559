//! Content length and keyword distribution checks

use serde::Serialize;

use crate::audits::{Scorecard, run_html_module};
use crate::error::Result;
use crate::fetch::HtmlSource;
use crate::parser::{self, TextFacts};
use crate::types::{KeywordEntry, ModuleDetails, ModuleKind, ModuleResult};
use crate::url_utils::AuditTarget;

pub const STOP_WORDS: [&str; 28] = [
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is", "are",
    "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would",
    "could", "should",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordDensityDetails {
    pub word_count: usize,
    pub text_length: usize,
    pub top_keywords: Vec<KeywordEntry>,
    pub over_optimized_keywords: Vec<KeywordEntry>,
    /// Top-keyword count over word count, as a percentage with one decimal
    pub diversity_ratio: String,
    pub average_word_length: String,
    pub insights: Vec<String>,
}

pub async fn run(source: &dyn HtmlSource, target: &AuditTarget) -> ModuleResult {
    run_html_module(ModuleKind::KeywordDensity, source, target, audit_html).await
}

pub fn audit_html(html: &str) -> Result<ModuleResult> {
    let document = parser::parse_document(html);
    let facts = parser::extract_text_content(&document)?;
    Ok(evaluate(facts))
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

pub fn evaluate(facts: TextFacts) -> ModuleResult {
    let TextFacts {
        word_count,
        text_length,
        top_keywords,
    } = facts;
    let mut card = Scorecard::new();

    if word_count < 300 {
        card.deduct(20);
        card.issue("Content is too short (under 300 words)");
        card.suggest("Add more content to improve SEO - aim for at least 300 words");
    } else if word_count < 500 {
        card.deduct(10);
        card.suggest("Consider adding more content - 500+ words is ideal for SEO");
    }

    // Density warnings are reported after the structural issues
    let mut keyword_issues = Vec::new();
    let mut over_optimized = Vec::new();
    for keyword in &top_keywords {
        let density = keyword.density_percent();
        if density > 5.0 {
            over_optimized.push(keyword.clone());
            keyword_issues.push(format!(
                r#""{}" appears too frequently ({}%)"#,
                keyword.word, keyword.density
            ));
        } else if density > 3.0 {
            keyword_issues.push(format!(
                r#""{}" density is high ({}%) - monitor for over-optimization"#,
                keyword.word, keyword.density
            ));
        }
    }

    if !over_optimized.is_empty() {
        card.deduct(10 * over_optimized.len() as i32);
        card.suggest("Reduce keyword density for over-optimized terms (keep under 3%)");
    }

    if let Some(top) = top_keywords.first()
        && top.density_percent() > 4.0
    {
        card.deduct(15);
        card.issue(format!(r#"Possible keyword stuffing detected for "{}""#, top.word));
        card.suggest("Use synonyms and related terms instead of repeating the same keyword");
    }

    let diversity_ratio = if word_count == 0 {
        None
    } else {
        Some(top_keywords.len() as f64 / word_count as f64)
    };
    if diversity_ratio.is_some_and(|ratio| ratio < 0.3) {
        card.deduct(10);
        card.issue("Content lacks keyword diversity");
        card.suggest("Use more varied vocabulary and related terms");
    }

    let meaningful = top_keywords
        .iter()
        .filter(|kw| !is_stop_word(&kw.word))
        .count();
    if meaningful < 5 {
        card.deduct(15);
        card.issue("Content dominated by common words");
        card.suggest("Include more topic-specific and meaningful keywords");
    }

    let average_word_length = if top_keywords.is_empty() {
        None
    } else {
        let letters: usize = top_keywords.iter().map(|kw| kw.word.chars().count()).sum();
        Some(letters as f64 / top_keywords.len() as f64)
    };
    match average_word_length {
        Some(avg) if avg > 7.0 => {
            card.suggest("Consider using simpler language for better readability")
        }
        Some(avg) if avg < 4.0 => {
            card.suggest("Content might benefit from more descriptive vocabulary")
        }
        _ => {}
    }

    let top_five_density: f64 = top_keywords
        .iter()
        .take(5)
        .map(KeywordEntry::density_percent)
        .sum();
    if top_five_density > 15.0 {
        card.deduct(10);
        card.issue("Top 5 keywords account for too much of the content");
        card.suggest("Distribute keywords more evenly throughout the content");
    }

    if word_count >= 1000 {
        card.bonus(5);
        card.suggest("Great! Content length is good for SEO");
    }
    if meaningful >= 10 && over_optimized.is_empty() {
        card.bonus(5);
    }

    for issue in keyword_issues {
        card.issue(issue);
    }

    let mut insights = Vec::new();
    if let Some(top) = top_keywords.first() {
        insights.push(format!(
            r#"Most frequent word: "{}" ({}%)"#,
            top.word, top.density
        ));
    }
    if text_length > 0 {
        insights.push(format!(
            "Content density: {:.1}% words to total characters",
            word_count as f64 / text_length as f64 * 100.0
        ));
    }

    card.finish(
        ModuleKind::KeywordDensity,
        ModuleDetails::KeywordDensity(KeywordDensityDetails {
            word_count,
            text_length,
            top_keywords,
            over_optimized_keywords: over_optimized,
            diversity_ratio: format!("{:.1}", diversity_ratio.unwrap_or(0.0) * 100.0),
            average_word_length: format!("{:.1}", average_word_length.unwrap_or(0.0)),
            insights,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(word_count: usize, text_length: usize, table: &[(&str, usize)]) -> TextFacts {
        TextFacts {
            word_count,
            text_length,
            top_keywords: table
                .iter()
                .map(|(word, count)| KeywordEntry::new(word.to_string(), *count, word_count))
                .collect(),
        }
    }

    /// Twenty distinct topical words, each at the given count
    fn balanced_table(count: usize) -> Vec<(String, usize)> {
        [
            "garden", "compost", "seedling", "tomato", "pepper", "basil", "harvest", "mulch",
            "soil", "water", "sunlight", "trellis", "pruning", "raised", "beds", "organic",
            "pests", "ladybug", "greenhouse", "season",
        ]
        .iter()
        .map(|w| (w.to_string(), count))
        .collect()
    }

    fn as_refs(table: &[(String, usize)]) -> Vec<(&str, usize)> {
        table.iter().map(|(w, c)| (w.as_str(), *c)).collect()
    }

    #[test]
    fn test_long_balanced_content_keeps_full_score() {
        // 20 keywords at 1% density each over 1200 words
        let table = balanced_table(12);
        let result = evaluate(facts(1200, 8000, &as_refs(&table)));
        // Diversity ratio 20/1200 is low (-10), then +5 for length and +5 for variety
        assert_eq!(result.score, 100);
        assert_eq!(result.issues, vec!["Content lacks keyword diversity".to_string()]);
        assert!(result
            .suggestions
            .contains(&"Great! Content length is good for SEO".to_string()));
    }

    #[test]
    fn test_short_stuffed_content() {
        let table = [("widget", 10), ("buy", 8), ("cheap", 6), ("the", 5), ("and", 4)];
        let result = evaluate(facts(100, 600, &table));
        // short (20) + 3 over-optimized (30) + stuffing (15) + diversity (10)
        // + dominated by common words (15) + top five too dense (10)
        assert_eq!(result.score, 0);
        assert_eq!(result.issues[0], "Content is too short (under 300 words)");
        assert!(result
            .issues
            .contains(&r#"Possible keyword stuffing detected for "widget""#.to_string()));
        assert!(result
            .issues
            .contains(&r#""widget" appears too frequently (10.00%)"#.to_string()));
        let Some(ModuleDetails::KeywordDensity(details)) = result.details else {
            panic!("expected keyword details");
        };
        assert_eq!(details.over_optimized_keywords.len(), 3);
        assert!(result.issues.contains(
            &r#""the" density is high (5.00%) - monitor for over-optimization"#.to_string()
        ));
        assert_eq!(details.diversity_ratio, "5.0");
    }

    #[test]
    fn test_warning_band_has_no_deduction() {
        let mut table = balanced_table(4);
        table[0].1 = 16;
        let result = evaluate(facts(400, 3000, &as_refs(&table)));
        // 400 words (-10), diversity 20/400 (-10), +5 variety bonus
        assert_eq!(result.score, 85);
        assert!(result.issues.contains(
            &r#""garden" density is high (4.00%) - monitor for over-optimization"#.to_string()
        ));
    }

    #[test]
    fn test_empty_text() {
        let result = evaluate(facts(0, 0, &[]));
        // too short (20) + dominated by common words (15)
        assert_eq!(result.score, 65);
        let Some(ModuleDetails::KeywordDensity(details)) = result.details else {
            panic!("expected keyword details");
        };
        assert!(details.insights.is_empty());
        assert_eq!(details.average_word_length, "0.0");
    }

    #[test]
    fn test_audit_html_end_to_end() {
        let html = "<html><body><p>Rust rust rust ownership borrowing lifetimes traits</p></body></html>";
        let result = audit_html(html).unwrap();
        let Some(ModuleDetails::KeywordDensity(details)) = result.details else {
            panic!("expected keyword details");
        };
        assert_eq!(details.word_count, 7);
        assert_eq!(details.top_keywords[0].word, "rust");
        assert_eq!(details.top_keywords[0].count, 3);
        assert_eq!(details.insights[0], r#"Most frequent word: "rust" (42.86%)"#);
        assert!(result.score <= 100);
    }
}
