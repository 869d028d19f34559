//! DOM fact extraction
//!
//! Pure structural facts pulled out of a parsed document. Nothing here
//! scores anything; the audit modules apply the thresholds.

use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::error::{AuditError, Result};
use crate::types::KeywordEntry;

/// Maximum number of entries kept in the keyword table
pub const TOP_KEYWORDS: usize = 20;

/// Parse raw HTML into a navigable document
pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}

/// Compile a CSS selector, mapping failures into [`AuditError::Selector`]
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| AuditError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// A text field checked for length, with the structural issues it raised
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LengthCheckedText {
    pub content: String,
    pub length: usize,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportFacts {
    pub content: String,
    pub has_mobile_viewport: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpenGraphFacts {
    pub title: String,
    pub description: String,
    pub image: String,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTagFacts {
    pub title: LengthCheckedText,
    pub description: LengthCheckedText,
    pub keywords: String,
    pub viewport: ViewportFacts,
    pub open_graph: OpenGraphFacts,
}

/// Read title, description, keywords, viewport and Open Graph tags
pub fn extract_meta_tags(document: &Html) -> Result<MetaTagFacts> {
    let title = first_text(document, "title")?.unwrap_or_default();
    let description = meta_content(document, r#"meta[name="description"]"#)?;
    let keywords = meta_content(document, r#"meta[name="keywords"]"#)?;
    let viewport = meta_content(document, r#"meta[name="viewport"]"#)?;
    let og_title = meta_content(document, r#"meta[property="og:title"]"#)?;
    let og_description = meta_content(document, r#"meta[property="og:description"]"#)?;
    let og_image = meta_content(document, r#"meta[property="og:image"]"#)?;

    let title_len = title.chars().count();
    let mut title_issues = Vec::new();
    if title_len == 0 {
        title_issues.push("Missing title tag".to_string());
    }
    if title_len > 60 {
        title_issues.push("Title too long (>60 characters)".to_string());
    }
    if title_len < 30 {
        title_issues.push("Title too short (<30 characters)".to_string());
    }

    let description_len = description.chars().count();
    let mut description_issues = Vec::new();
    if description_len == 0 {
        description_issues.push("Missing meta description".to_string());
    }
    if description_len > 160 {
        description_issues.push("Description too long (>160 characters)".to_string());
    }
    if description_len < 120 {
        description_issues.push("Description too short (<120 characters)".to_string());
    }

    let mut og_issues = Vec::new();
    if og_title.is_empty() {
        og_issues.push("Missing og:title".to_string());
    }
    if og_description.is_empty() {
        og_issues.push("Missing og:description".to_string());
    }
    if og_image.is_empty() {
        og_issues.push("Missing og:image".to_string());
    }

    Ok(MetaTagFacts {
        title: LengthCheckedText {
            content: title,
            length: title_len,
            issues: title_issues,
        },
        description: LengthCheckedText {
            content: description,
            length: description_len,
            issues: description_issues,
        },
        keywords,
        viewport: ViewportFacts {
            has_mobile_viewport: viewport.contains("width=device-width"),
            content: viewport,
        },
        open_graph: OpenGraphFacts {
            title: og_title,
            description: og_description,
            image: og_image,
            issues: og_issues,
        },
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadingEntry {
    pub level: u8,
    pub text: String,
    pub tag: String,
}

/// Per-level heading counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeadingStructure {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
    pub h4: usize,
    pub h5: usize,
    pub h6: usize,
}

impl HeadingStructure {
    fn bump(&mut self, level: u8) {
        match level {
            1 => self.h1 += 1,
            2 => self.h2 += 1,
            3 => self.h3 += 1,
            4 => self.h4 += 1,
            5 => self.h5 += 1,
            _ => self.h6 += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.h1 + self.h2 + self.h3 + self.h4 + self.h5 + self.h6
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingFacts {
    /// Headings in document order
    pub headings: Vec<HeadingEntry>,
    pub structure: HeadingStructure,
    /// H1 problems followed by every hierarchy skip
    pub issues: Vec<String>,
    pub hierarchy_issues: Vec<String>,
}

/// Collect `h1`..`h6` in document order and check the outline
pub fn extract_headings(document: &Html) -> Result<HeadingFacts> {
    let heading_selector = selector("h1, h2, h3, h4, h5, h6")?;

    let mut facts = HeadingFacts::default();
    for element in document.select(&heading_selector) {
        let name = element.value().name();
        let level = name[1..].parse::<u8>().unwrap_or(6);
        facts.structure.bump(level);
        facts.headings.push(HeadingEntry {
            level,
            text: element.text().collect::<String>().trim().to_string(),
            tag: name.to_ascii_uppercase(),
        });
    }

    if facts.structure.h1 == 0 {
        facts.issues.push("No H1 tag found".to_string());
    } else if facts.structure.h1 > 1 {
        facts.issues.push("Multiple H1 tags found".to_string());
    }

    // One running cursor over the whole sequence, not per subtree
    let mut previous_level = 0u8;
    for heading in &facts.headings {
        if heading.level > previous_level + 1 {
            let message = if previous_level == 0 {
                format!(
                    "Heading hierarchy issue: {} appears before any higher-level heading",
                    heading.tag
                )
            } else {
                format!(
                    "Heading hierarchy issue: {} follows H{}",
                    heading.tag, previous_level
                )
            };
            facts.hierarchy_issues.push(message);
        }
        previous_level = heading.level;
    }
    facts.issues.extend(facts.hierarchy_issues.iter().cloned());

    Ok(facts)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    pub src: String,
    pub alt: String,
    /// The `alt` attribute is present, possibly empty
    pub has_alt: bool,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFacts {
    pub images: Vec<ImageEntry>,
    pub total_images: usize,
    pub images_with_alt: usize,
    pub images_missing_alt: usize,
    pub issues: Vec<String>,
}

/// Collect every `<img>` with its alt, src and title attributes
pub fn extract_images(document: &Html) -> Result<ImageFacts> {
    let img_selector = selector("img")?;

    let images: Vec<ImageEntry> = document
        .select(&img_selector)
        .map(|img| {
            let attrs = img.value();
            ImageEntry {
                src: attrs.attr("src").unwrap_or_default().trim().to_string(),
                alt: attrs.attr("alt").unwrap_or_default().to_string(),
                has_alt: attrs.attr("alt").is_some(),
                title: attrs.attr("title").unwrap_or_default().to_string(),
            }
        })
        .collect();

    let total_images = images.len();
    let images_missing_alt = images.iter().filter(|img| !img.has_alt).count();
    let issues = if images_missing_alt > 0 {
        vec![format!("{images_missing_alt} images missing alt text")]
    } else {
        Vec::new()
    };

    Ok(ImageFacts {
        total_images,
        images_with_alt: total_images - images_missing_alt,
        images_missing_alt,
        images,
        issues,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFacts {
    pub word_count: usize,
    /// Characters of body text once scripts and styles are dropped
    pub text_length: usize,
    pub top_keywords: Vec<KeywordEntry>,
}

/// Build the word-frequency table for the visible body text.
///
/// Tokens are lower-cased, stripped of non-word characters, and kept only
/// when longer than two characters. Equal counts keep first-occurrence order.
pub fn extract_text_content(document: &Html) -> Result<TextFacts> {
    let body_selector = selector("body")?;
    let text = match document.select(&body_selector).next() {
        Some(body) => visible_text(body),
        None => visible_text(document.root_element()),
    };

    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let words: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|word| word.len() > 2)
        .collect();
    let word_count = words.len();

    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for &word in &words {
        match index.get(word) {
            Some(&slot) => order[slot].1 += 1,
            None => {
                index.insert(word, order.len());
                order.push((word, 1));
            }
        }
    }

    // Stable sort keeps first-occurrence order among equal counts
    order.sort_by(|a, b| b.1.cmp(&a.1));

    let top_keywords = order
        .into_iter()
        .take(TOP_KEYWORDS)
        .map(|(word, count)| KeywordEntry::new(word.to_string(), count, word_count))
        .collect();

    Ok(TextFacts {
        word_count,
        text_length: text.chars().count(),
        top_keywords,
    })
}

/// Concatenated contents of every inline `<style>` block
pub fn extract_inline_css(document: &Html) -> Result<String> {
    let style_selector = selector("style")?;
    Ok(document
        .select(&style_selector)
        .map(|style| style.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" "))
}

/// Text of `root`, skipping anything inside `<script>` or `<style>`
fn visible_text(root: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in root.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| matches!(el.name(), "script" | "style"))
        });
        if !hidden {
            text.push_str(fragment);
        }
    }
    text
}

fn first_text(document: &Html, css: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string()))
}

fn meta_content(document: &Html, css: &str) -> Result<String> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.to_string())
        .unwrap_or_default())
}
