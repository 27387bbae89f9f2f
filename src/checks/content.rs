//! Content structure: headings, lists/tables, paragraphs and main landmark

use crate::checks::scoring::ratio_result;
use crate::checks::{Checker, PageContext};
use crate::document::{element_text, Document};
use crate::report::{Category, CheckResult, Issue};
use async_trait::async_trait;

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Scores how easy the page is to segment and quote
///
/// Each check contributes one issue; the score is the pass/warn ratio
/// (see [`crate::checks::ratio_score`]).
#[derive(Debug, Clone, Copy)]
pub struct ContentStructureChecker {
    max_paragraph_words: usize,
}

impl ContentStructureChecker {
    pub fn new(max_paragraph_words: usize) -> Self {
        Self {
            max_paragraph_words,
        }
    }
}

impl Default for ContentStructureChecker {
    fn default() -> Self {
        Self::new(150)
    }
}

#[async_trait(?Send)]
impl Checker for ContentStructureChecker {
    fn category(&self) -> Category {
        Category::ContentStructure
    }

    async fn analyze(&self, ctx: &PageContext<'_>) -> crate::Result<CheckResult> {
        Ok(self.evaluate(ctx.document))
    }
}

impl ContentStructureChecker {
    fn evaluate(&self, document: &Document) -> CheckResult {
        let headings = document.find_by_tags(HEADING_TAGS);
        let lists = document.find_by_tags(&["ul", "ol"]);
        let tables = document.find_by_tags(&["table"]);
        let paragraphs = document.find_by_tags(&["p"]);
        let images = document.find_by_tags(&["img"]);

        let levels: Vec<u8> = headings
            .iter()
            .filter_map(|h| h.value().name().get(1..).and_then(|n| n.parse().ok()))
            .collect();
        let table_has_header: Vec<bool> = tables
            .iter()
            .map(|table| table.descendants().any(|n| {
                n.value().as_element().map(|e| e.name() == "th").unwrap_or(false)
            }))
            .collect();
        let paragraph_words: Vec<usize> = paragraphs
            .iter()
            .map(|p| element_text(*p).split_whitespace().count())
            .collect();
        let has_main = !document
            .select("main, article, [role=\"main\"]")
            .is_empty();
        let images_missing_alt = images
            .iter()
            .filter(|img| {
                img.value()
                    .attr("alt")
                    .map(|alt| alt.trim().is_empty())
                    .unwrap_or(true)
            })
            .count();

        let mut issues = vec![
            heading_issue(&levels),
            list_table_issue(lists.len(), &table_has_header),
            paragraph_issue(&paragraph_words, self.max_paragraph_words),
            main_landmark_issue(has_main),
        ];
        if !images.is_empty() {
            issues.push(image_alt_issue(images.len(), images_missing_alt));
        }

        ratio_result(issues)
            .with_metadata("heading_count", headings.len())
            .with_metadata("list_count", lists.len())
            .with_metadata("table_count", tables.len())
            .with_metadata("paragraph_count", paragraphs.len())
            .with_metadata("image_count", images.len())
    }
}

/// One H1, no level skips between consecutive headings
fn heading_issue(levels: &[u8]) -> Issue {
    if levels.is_empty() {
        return Issue::fail("No headings found", "Add headings to structure your content");
    }

    let h1_count = levels.iter().filter(|&&l| l == 1).count();
    if h1_count == 0 {
        return Issue::fail("No H1 heading found", "Add a main H1 heading to the page");
    }
    if h1_count > 1 {
        return Issue::warn(
            format!("Multiple H1 headings found ({})", h1_count),
            "Use a single H1 heading for the main topic",
        );
    }

    let skip = levels
        .windows(2)
        .find(|pair| pair[1] > pair[0] + 1)
        .map(|pair| (pair[0], pair[1]));
    match skip {
        Some((from, to)) => Issue::warn(
            format!("Heading hierarchy jumps from h{} to h{}", from, to),
            "Maintain proper heading hierarchy (h1 -> h2 -> h3, etc.)",
        ),
        None => Issue::pass("Good heading hierarchy"),
    }
}

fn list_table_issue(list_count: usize, table_has_header: &[bool]) -> Issue {
    if list_count == 0 && table_has_header.is_empty() {
        return Issue::fail(
            "No lists or tables found",
            "Add lists or tables to make content easier to extract",
        );
    }

    if table_has_header.iter().any(|has_header| !has_header) {
        return Issue::warn(
            "Tables without headers found",
            "Add header cells to tables for better structure",
        );
    }

    Issue::pass("Lists or tables found")
}

fn paragraph_issue(word_counts: &[usize], max_words: usize) -> Issue {
    if word_counts.is_empty() {
        return Issue::fail(
            "No paragraphs found",
            "Organize body text into paragraphs",
        );
    }

    let long = word_counts.iter().filter(|&&words| words > max_words).count();
    if long > 0 {
        Issue::warn(
            format!("{} paragraph(s) longer than {} words", long, max_words),
            "Break long paragraphs into shorter ones",
        )
    } else {
        Issue::pass("Good paragraph length")
    }
}

fn main_landmark_issue(has_main: bool) -> Issue {
    if has_main {
        Issue::pass("Main content container found")
    } else {
        Issue::warn(
            "No main content container found",
            "Wrap the primary content in <main> or <article>",
        )
    }
}

fn image_alt_issue(total: usize, missing_alt: usize) -> Issue {
    if missing_alt == 0 {
        Issue::pass("All images have alt text")
    } else {
        Issue::warn(
            format!("{} of {} images lack alt text", missing_alt, total),
            "Add descriptive alt text to images",
        )
    }
}
