//! Crawlability: robots.txt, llms.txt and page-level crawler directives

use crate::checks::robots::{is_real_text_file, llms_has_directives, RobotsTxt};
use crate::checks::{Checker, PageContext};
use crate::document::Document;
use crate::fetcher::{FetchResult, Fetcher};
use crate::report::{CheckResult, Issue};
use crate::url::AnalysisTarget;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

const FILE_PRESENT_POINTS: f64 = 25.0;
const FILE_CONTENT_POINTS: f64 = 25.0;

/// Auxiliary fetches give up this long before the run deadline
const FILE_FETCH_SLACK: Duration = Duration::from_millis(250);

/// Scores how reachable the page is for AI crawlers
///
/// | Signal | Points |
/// |--------|--------|
/// | robots.txt present | 25 |
/// | robots.txt names GPTBot or Google-Extended | 25 |
/// | llms.txt present | 25 |
/// | llms.txt has allow/disallow directives | 25 |
///
/// Page-level directives (meta robots, canonical link) and whether GPTBot
/// is actually allowed on this path add issues without changing the score.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlabilityChecker;

#[async_trait(?Send)]
impl Checker for CrawlabilityChecker {
    fn category(&self) -> crate::report::Category {
        crate::report::Category::Crawlability
    }

    async fn analyze(&self, ctx: &PageContext<'_>) -> crate::Result<CheckResult> {
        let robots_url = ctx.target.origin_join("/robots.txt")?;
        let llms_url = ctx.target.origin_join("/llms.txt")?;

        let fetch_deadline = ctx
            .deadline
            .checked_sub(FILE_FETCH_SLACK)
            .unwrap_or(ctx.deadline);

        let (robots, llms) = tokio::join!(
            fetch_text_file(ctx.fetcher, robots_url.as_str(), fetch_deadline),
            fetch_text_file(ctx.fetcher, llms_url.as_str(), fetch_deadline),
        );

        let (robots_score, mut issues) = evaluate_robots(robots.as_deref(), ctx.target);
        let (llms_score, llms_issues) = evaluate_llms(llms.as_deref());
        issues.extend(llms_issues);
        issues.extend(evaluate_page_directives(ctx.document));

        Ok(CheckResult::new((robots_score + llms_score).min(100.0), issues)
            .with_metadata("robots_txt_score", robots_score)
            .with_metadata("llms_txt_score", llms_score))
    }
}

/// Fetches an auxiliary text file
///
/// Any failure, a soft 404, or not finishing before `deadline` counts as absent.
async fn fetch_text_file(fetcher: &Fetcher, url: &str, deadline: Instant) -> Option<String> {
    let Ok(result) = timeout_at(deadline, fetcher.fetch(url)).await else {
        tracing::debug!("{} not fetched before the run deadline; treating as absent", url);
        return None;
    };

    match result {
        FetchResult::Success {
            body, content_type, ..
        } if is_real_text_file(&body, content_type.as_deref()) => Some(body),
        FetchResult::Success { .. } => {
            tracing::debug!("{} looks like a soft 404; treating as absent", url);
            None
        }
        FetchResult::Failure(failure) => {
            tracing::debug!("{} unavailable: {}", url, failure);
            None
        }
    }
}

/// Scores robots.txt content (`None` when absent)
fn evaluate_robots(body: Option<&str>, target: &AnalysisTarget) -> (f64, Vec<Issue>) {
    let Some(body) = body else {
        return (
            0.0,
            vec![Issue::fail("No robots.txt found", "Create a robots.txt file")],
        );
    };

    let robots = RobotsTxt::from_content(body);
    let mut score = FILE_PRESENT_POINTS;
    let mut issues = vec![Issue::pass("robots.txt found")];

    if robots.mentions_ai_crawlers() {
        score += FILE_CONTENT_POINTS;
        issues.push(Issue::pass("AI bot permissions found in robots.txt"));
    } else {
        issues.push(Issue::warn(
            "No explicit AI bot permissions in robots.txt",
            "Add GPTBot and Google-Extended to robots.txt",
        ));
    }

    if !robots.is_allowed(target.as_str(), "GPTBot") {
        issues.push(Issue::warn(
            "robots.txt blocks GPTBot from this page",
            "Allow GPTBot in robots.txt if this page should be available to AI assistants",
        ));
    }

    (score, issues)
}

/// Scores llms.txt content (`None` when absent)
fn evaluate_llms(body: Option<&str>) -> (f64, Vec<Issue>) {
    let Some(body) = body else {
        return (
            0.0,
            vec![Issue::warn(
                "No llms.txt found",
                "Create an llms.txt file to guide AI crawlers",
            )],
        );
    };

    let mut score = FILE_PRESENT_POINTS;
    let mut issues = vec![Issue::pass("llms.txt found")];

    if llms_has_directives(body) {
        score += FILE_CONTENT_POINTS;
        issues.push(Issue::pass("llms.txt has proper directives"));
    } else {
        issues.push(Issue::warn(
            "llms.txt lacks proper directives",
            "Add allow/disallow directives to llms.txt",
        ));
    }

    (score, issues)
}

/// Informational checks on the page's own crawler directives
fn evaluate_page_directives(document: &Document) -> Vec<Issue> {
    let mut issues = Vec::new();

    let blocked = document
        .meta_content("robots")
        .map(|content| {
            let content = content.to_lowercase();
            content.contains("noindex") || content.contains("nofollow")
        })
        .unwrap_or(false);

    if blocked {
        issues.push(Issue::warn(
            "Meta robots tag restricts indexing",
            "Remove noindex/nofollow from the robots meta tag",
        ));
    } else {
        issues.push(Issue::pass("Page allows indexing"));
    }

    if document.select("link[rel~=\"canonical\"][href]").is_empty() {
        issues.push(Issue::warn(
            "No canonical link found",
            "Add a canonical link to the page head",
        ));
    } else {
        issues.push(Issue::pass("Canonical link found"));
    }

    issues
}
