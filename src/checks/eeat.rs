//! E-E-A-T: authorship, freshness, citations and trust signals

use crate::checks::scoring::ratio_result;
use crate::checks::{Checker, PageContext};
use crate::document::{element_text, Document, Link};
use crate::report::{Category, CheckResult, Issue};
use crate::url::{site_key, AnalysisTarget};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

/// Content older than this is reported as stale
const FRESHNESS_DAYS: i64 = 365;

/// Author names with at most this many words count as terse
const TERSE_AUTHOR_WORDS: usize = 2;

const AUTHOR_CLASS_TAGS: &[&str] = &["address", "div", "span", "p", "a"];

const SOCIAL_HOSTS: &[&str] = &[
    "twitter.com",
    "x.com",
    "facebook.com",
    "linkedin.com",
    "instagram.com",
    "youtube.com",
    "github.com",
    "mastodon.social",
];

/// Source of "now" for freshness checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(at) => *at,
        }
    }
}

/// Parses a publication date in any of the commonly published formats
///
/// Accepts RFC 3339, RFC 2822, `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` and
/// `Month D, YYYY` (full or abbreviated month). Offset-less values are
/// taken as UTC.
///
/// # Examples
///
/// ```
/// use llmo_audit::checks::parse_published_date;
///
/// assert!(parse_published_date("2024-03-01T10:00:00Z").is_some());
/// assert!(parse_published_date("March 1, 2024").is_some());
/// assert!(parse_published_date("last Tuesday").is_none());
/// ```
pub fn parse_published_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Compiled keyword patterns
#[derive(Debug, Clone)]
struct Patterns {
    author_class: Regex,
    date_class: Regex,
    citation: Regex,
    about: Regex,
    contact: Regex,
    social_class: Regex,
    research: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            author_class: Regex::new(r"(?i)author|byline")?,
            date_class: Regex::new(r"(?i)(^|[-_])(date|published|posted)")?,
            citation: Regex::new(r"(?i)reference|citation|source|study|research|paper")?,
            about: Regex::new(r"(?i)about|bio|team|author")?,
            contact: Regex::new(r"(?i)contact")?,
            social_class: Regex::new(r"(?i)social|share|follow")?,
            research: Regex::new(r"(?i)\b(study|studies|research|data|survey)\b")?,
        })
    }
}

/// Scores experience, expertise, authority and trust signals
///
/// | Signal | Pass | Warn | Fail |
/// |--------|------|------|------|
/// | Author | named, > 2 words | <= 2 words | none |
/// | Publication date | within 365 days | older, or unparseable | none |
/// | External citations | citation-like link | external links only | no external links |
/// | About/bio link | present | absent | - |
/// | Contact information | present | absent | - |
/// | Social proof | present | absent | - |
/// | Original research | vocabulary present | absent | - |
#[derive(Debug, Clone)]
pub struct EeatChecker {
    clock: Clock,
    patterns: Patterns,
}

impl EeatChecker {
    pub fn new() -> crate::Result<Self> {
        Ok(Self {
            clock: Clock::System,
            patterns: Patterns::compile()?,
        })
    }

    /// Replaces the clock used for freshness checks
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn evaluate(&self, target: &AnalysisTarget, document: &Document, text: &str) -> CheckResult {
        let links = document.links(target);

        let issues = vec![
            self.author_issue(document),
            self.date_issue(document),
            self.citation_issue(target, &links),
            self.about_issue(&links),
            self.contact_issue(document, &links),
            self.social_issue(document, &links),
            self.originality_issue(text),
        ];

        ratio_result(issues)
    }

    fn find_author(&self, document: &Document) -> Option<String> {
        if let Some(author) = document.meta_content("author") {
            return Some(author);
        }

        let rel_author = document
            .select("a[rel~=\"author\"]")
            .into_iter()
            .map(element_text)
            .find(|text| !text.is_empty());
        if rel_author.is_some() {
            return rel_author;
        }

        document
            .find_by_class_pattern(AUTHOR_CLASS_TAGS, &self.patterns.author_class)
            .into_iter()
            .map(element_text)
            .find(|text| !text.is_empty())
    }

    fn author_issue(&self, document: &Document) -> Issue {
        match self.find_author(document) {
            None => Issue::fail(
                "No author information found",
                "Add author information with credentials",
            ),
            Some(author) if author.split_whitespace().count() <= TERSE_AUTHOR_WORDS => Issue::warn(
                "Basic author information found",
                "Add more author details (credentials, experience, etc.)",
            ),
            Some(_) => Issue::pass("Detailed author information found"),
        }
    }

    /// First publication date found, as written on the page
    fn find_date(&self, document: &Document) -> Option<String> {
        if let Some(date) = document
            .meta_content("article:published_time")
            .or_else(|| document.meta_content("date"))
        {
            return Some(date);
        }

        let time = document.find_by_tags(&["time"]).into_iter().find_map(|el| {
            el.value()
                .attr("datetime")
                .map(|dt| dt.trim().to_string())
                .filter(|dt| !dt.is_empty())
                .or_else(|| Some(element_text(el)).filter(|t| !t.is_empty()))
        });
        if time.is_some() {
            return time;
        }

        document
            .find_by_class_pattern(&[], &self.patterns.date_class)
            .into_iter()
            .map(element_text)
            .find(|text| !text.is_empty())
    }

    fn date_issue(&self, document: &Document) -> Issue {
        let Some(raw) = self.find_date(document) else {
            return Issue::fail("No publication date found", "Add publication date");
        };

        match parse_published_date(&raw) {
            Some(published) if self.clock.now() - published <= Duration::days(FRESHNESS_DAYS) => {
                Issue::pass("Recent publication date found")
            }
            Some(_) => Issue::warn(
                "Content is over a year old (stale content)",
                "Update content or add last modified date",
            ),
            None => Issue::warn(
                "Publication date found but format unclear",
                "Use standard date format (ISO 8601)",
            ),
        }
    }

    fn citation_issue(&self, target: &AnalysisTarget, links: &[Link]) -> Issue {
        let external: Vec<&Link> = links
            .iter()
            .filter(|link| matches!(link.url.scheme(), "http" | "https"))
            .filter(|link| !target.is_same_site(&link.url))
            .collect();

        if external.is_empty() {
            return Issue::fail("No citations found", "Add citations to support claims");
        }

        let has_citation = external.iter().any(|link| {
            self.patterns.citation.is_match(&link.text) || self.patterns.citation.is_match(&link.href)
        });
        if has_citation {
            Issue::pass("External citations found")
        } else {
            Issue::warn(
                "External links found but none look like citations",
                "Add external citations to authoritative sources",
            )
        }
    }

    fn about_issue(&self, links: &[Link]) -> Issue {
        if links.iter().any(|link| self.patterns.about.is_match(&link.href)) {
            Issue::pass("About/Bio page link found")
        } else {
            Issue::warn("No About/Bio page link found", "Add an About page with credentials")
        }
    }

    fn contact_issue(&self, document: &Document, links: &[Link]) -> Issue {
        let linked = links
            .iter()
            .any(|link| link.url.scheme() == "mailto" || self.patterns.contact.is_match(&link.href));
        let marked = !document
            .find_by_class_pattern(&[], &self.patterns.contact)
            .is_empty();

        if linked || marked {
            Issue::pass("Contact information found")
        } else {
            Issue::warn(
                "No contact information found",
                "Add contact information such as an email address or contact page",
            )
        }
    }

    fn social_issue(&self, document: &Document, links: &[Link]) -> Issue {
        let linked = links.iter().any(|link| {
            link.url
                .host_str()
                .map(|host| SOCIAL_HOSTS.contains(&site_key(host)))
                .unwrap_or(false)
        });
        let marked = !document
            .find_by_class_pattern(&[], &self.patterns.social_class)
            .is_empty();

        if linked || marked {
            Issue::pass("Social proof signals found")
        } else {
            Issue::warn(
                "No social proof signals found",
                "Link to the author's or organization's social profiles",
            )
        }
    }

    fn originality_issue(&self, text: &str) -> Issue {
        if self.patterns.research.is_match(text) {
            Issue::pass("Original research signals found")
        } else {
            Issue::warn(
                "No original research signals found",
                "Include original data, studies or first-hand research",
            )
        }
    }
}

#[async_trait(?Send)]
impl Checker for EeatChecker {
    fn category(&self) -> Category {
        Category::Eeat
    }

    async fn analyze(&self, ctx: &PageContext<'_>) -> crate::Result<CheckResult> {
        Ok(self.evaluate(ctx.target, ctx.document, ctx.text()))
    }
}
