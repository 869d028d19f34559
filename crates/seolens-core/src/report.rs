//! Paginated text export of an audit run
//!
//! The report is plain Markdown split into fixed-height pages so it prints
//! the same way every time. Pages hold at most [`LINES_PER_PAGE`] lines and
//! the run ends with a two-line footer.

use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::orchestrator::{AuditRun, ScorePolicy};
use crate::pagespeed::DeviceReport;
use crate::types::{ModuleDetails, ModuleResult};

pub const LINES_PER_PAGE: usize = 60;

/// A section starting this close to the page end moves to the next page
const SECTION_MARGIN: usize = 10;
const MAX_BULLET_CHARS: usize = 100;
const MAX_KEYWORDS: usize = 10;
const PAGE_BREAK: &str = "---";

pub const FOOTER: [&str; 2] = [
    "Generated by seolens - https://github.com/pondevelopment/seolens",
    "MIT licensed - report issues at https://github.com/pondevelopment/seolens/issues",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pages: Vec<Vec<String>>,
}

impl Report {
    pub fn pages(&self) -> &[Vec<String>] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// `seo-audit-YYYY-MM-DD.md`
    pub fn file_name(date: NaiveDate) -> String {
        format!("seo-audit-{}.md", date.format("%Y-%m-%d"))
    }

    /// Write every page, separated by a horizontal rule
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for (index, page) in self.pages.iter().enumerate() {
            if index > 0 {
                writeln!(writer, "\n{PAGE_BREAK}\n")?;
            }
            for line in page {
                writeln!(writer, "{line}")?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_markdown(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Render with the default scoring policy
pub fn render(run: &AuditRun, generated_at: DateTime<Utc>) -> Report {
    render_with(run, ScorePolicy::default(), generated_at)
}

pub fn render_with(run: &AuditRun, policy: ScorePolicy, generated_at: DateTime<Utc>) -> Report {
    let mut pages = Paginator::default();

    pages.push("# SEO Audit Report");
    pages.push("");
    pages.push(format!("URL: {}", run.target));
    pages.push(format!(
        "Generated: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    pages.push(format!(
        "Overall Score: {}/100",
        run.overall_score_with(policy)
    ));
    let pending = run.pending();
    if !pending.is_empty() {
        let names: Vec<&str> = pending.iter().map(|m| m.title()).collect();
        pages.push(format!("Pending: {}", names.join(", ")));
    }
    pages.push("");

    for result in run.completed() {
        pages.start_section();
        render_section(&mut pages, result);
    }

    pages.footer();
    Report {
        pages: pages.finish(),
    }
}

fn render_section(pages: &mut Paginator, result: &ModuleResult) {
    let module = result.module;
    pages.push(format!("## {} {}", module.icon(), module.title()));
    pages.push(format!(
        "Score: {}/100 ({})",
        result.score,
        if result.is_success() { "success" } else { "error" }
    ));

    match &result.details {
        Some(ModuleDetails::PageSpeed(details)) => {
            device_lines(pages, "Mobile", &details.mobile);
            device_lines(pages, "Desktop", &details.desktop);
        }
        Some(ModuleDetails::MetaTags(meta)) => {
            pages.push(format!("Title: {}", truncate(&meta.title.content)));
            pages.push(format!("Title Length: {} characters", meta.title.length));
            pages.push(format!(
                "Description: {}",
                truncate(&meta.description.content)
            ));
            pages.push(format!(
                "Description Length: {} characters",
                meta.description.length
            ));
        }
        Some(ModuleDetails::Headings(details)) => {
            let s = &details.structure;
            pages.push(format!("H1: {}, H2: {}, H3: {}", s.h1, s.h2, s.h3));
            pages.push(format!("H4: {}, H5: {}, H6: {}", s.h4, s.h5, s.h6));
        }
        Some(ModuleDetails::Images(details)) => {
            pages.push(format!("Total Images: {}", details.total_images));
            pages.push(format!("Images with Alt Text: {}", details.images_with_alt));
            pages.push(format!(
                "Images Missing Alt Text: {}",
                details.images_missing_alt
            ));
        }
        Some(ModuleDetails::MobileFriendly(details)) => {
            pages.push(format!(
                "Passed Checks: {}/{}",
                details.passed_checks, details.total_checks
            ));
        }
        Some(ModuleDetails::KeywordDensity(details)) => {
            pages.push(format!("Word Count: {}", details.word_count));
            if !details.top_keywords.is_empty() {
                pages.push("Top Keywords:");
                for keyword in details.top_keywords.iter().take(MAX_KEYWORDS) {
                    pages.push(format!(
                        "- {}: {} times ({}%)",
                        keyword.word, keyword.count, keyword.density
                    ));
                }
            }
        }
        None => {}
    }

    bullet_list(pages, "Issues:", &result.issues);
    bullet_list(pages, "Suggestions:", &result.suggestions);
    pages.push("");
}

fn device_lines(pages: &mut Paginator, device: &str, report: &DeviceReport) {
    let show = |score: Option<u8>| score.map_or_else(|| "N/A".to_string(), |s| s.to_string());
    pages.push(format!(
        "{device}: Performance {}, SEO {}, Accessibility {}, Best Practices {}",
        show(report.performance),
        show(report.seo),
        show(report.accessibility),
        show(report.best_practices)
    ));
}

fn bullet_list(pages: &mut Paginator, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    pages.push(label);
    for item in items {
        pages.push(format!("- {}", truncate(item)));
    }
}

/// Cut to [`MAX_BULLET_CHARS`] characters, marking the cut with `...`
fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_BULLET_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(MAX_BULLET_CHARS).collect();
    format!("{head}...")
}

#[derive(Debug, Default)]
struct Paginator {
    pages: Vec<Vec<String>>,
    current: Vec<String>,
}

impl Paginator {
    fn push(&mut self, line: impl Into<String>) {
        if self.current.len() >= LINES_PER_PAGE {
            self.break_page();
        }
        self.current.push(line.into());
    }

    fn start_section(&mut self) {
        if self.current.len() > LINES_PER_PAGE - SECTION_MARGIN {
            self.break_page();
        }
    }

    fn footer(&mut self) {
        if self.current.len() + FOOTER.len() > LINES_PER_PAGE {
            self.break_page();
        }
        self.current.extend(FOOTER.iter().map(|line| line.to_string()));
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
    }

    fn finish(mut self) -> Vec<Vec<String>> {
        if !self.current.is_empty() {
            self.break_page();
        }
        self.pages
    }
}
