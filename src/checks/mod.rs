//! Heuristic checkers
//!
//! Each checker scores one [`Category`] of the audit. Checkers are
//! independent: they only read the shared [`Document`] and, when they need
//! auxiliary resources, go through the run's [`Fetcher`].
//!
//! The document is not thread-safe, so checkers run concurrently on the
//! analyzer's task rather than being spawned.

mod content;
mod crawlability;
mod eeat;
mod robots;
mod scoring;
mod structured_data;

use crate::config::AuditConfig;
use crate::document::Document;
use crate::fetcher::Fetcher;
use crate::report::{Category, CheckResult};
use crate::url::AnalysisTarget;
use async_trait::async_trait;
use tokio::time::Instant;

pub use content::ContentStructureChecker;
pub use crawlability::CrawlabilityChecker;
pub use eeat::{parse_published_date, Clock, EeatChecker};
pub use robots::{is_real_text_file, llms_has_directives, RobotsTxt, AI_CRAWLER_TOKENS};
pub use scoring::{ratio_result, ratio_score, NO_CHECKS_PERFORMED};
pub use structured_data::{required_properties, StructuredDataChecker};

/// Everything a checker may look at during one run
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// The normalized page URL
    pub target: &'a AnalysisTarget,
    /// The parsed main page
    pub document: &'a Document,
    /// Fetcher session for auxiliary requests
    pub fetcher: &'a Fetcher,
    /// End of the run budget; auxiliary fetches must finish before it
    pub deadline: Instant,
}

impl<'a> PageContext<'a> {
    /// Plain text of the main page
    pub fn text(&self) -> &'a str {
        self.document.text()
    }
}

/// A single audit category's analysis
///
/// Returning `Err` (or panicking) degrades only this checker's category.
#[async_trait(?Send)]
pub trait Checker: Send + Sync {
    /// The category this checker scores
    fn category(&self) -> Category;

    /// Analyzes the page
    async fn analyze(&self, ctx: &PageContext<'_>) -> crate::Result<CheckResult>;
}

/// The standard checker set, one per category
pub fn default_checkers(config: &AuditConfig) -> crate::Result<Vec<Box<dyn Checker>>> {
    Ok(vec![
        Box::new(CrawlabilityChecker),
        Box::new(StructuredDataChecker),
        Box::new(ContentStructureChecker::new(config.content.max_paragraph_words)),
        Box::new(EeatChecker::new()?),
    ])
}
