//! robots.txt and llms.txt content helpers
//!
//! Matching of allow/disallow rules goes through the robotstxt crate.

use robotstxt::DefaultMatcher;

/// User-agent tokens of the AI crawlers the audit looks for
pub const AI_CRAWLER_TOKENS: &[&str] = &["GPTBot", "Google-Extended"];

/// Fetched robots.txt content
#[derive(Debug, Clone)]
pub struct RobotsTxt {
    content: String,
}

impl RobotsTxt {
    /// Wraps raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// True if any AI crawler token appears in the file
    ///
    /// Tokens match case-sensitively, as written by site owners.
    pub fn mentions_ai_crawlers(&self) -> bool {
        AI_CRAWLER_TOKENS
            .iter()
            .any(|token| self.content.contains(token))
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL of the page
    /// * `user_agent` - The crawler's user-agent token
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed (an empty file allows everything)
    /// * `false` - If the URL is disallowed
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }
}

/// True if llms.txt content carries allow/disallow directives
///
/// Any case-insensitive occurrence of "allow" counts, which also covers
/// "disallow".
pub fn llms_has_directives(content: &str) -> bool {
    content.to_lowercase().contains("allow")
}

/// True if a fetched auxiliary text file should count as present
///
/// Empty bodies and HTML pages served in place of a missing file (soft
/// 404s) do not count.
pub fn is_real_text_file(body: &str, content_type: Option<&str>) -> bool {
    let trimmed = body.trim_start();
    if trimmed.is_empty() {
        return false;
    }

    if content_type
        .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false)
    {
        return false;
    }

    let head: String = trimmed.chars().take(64).collect::<String>().to_ascii_lowercase();
    !(head.starts_with("<!doctype html") || head.starts_with("<html"))
}
