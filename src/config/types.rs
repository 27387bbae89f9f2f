use crate::report::Category;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Desktop browser strings the fetcher rotates through per session
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
];

/// Main configuration structure for LLMO-Audit
///
/// Every section is optional; an empty file yields [`AuditConfig::default`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

/// Per-category weights for the overall score (must sum to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WeightsConfig {
    pub crawlability: f64,

    #[serde(rename = "structured-data")]
    pub structured_data: f64,

    #[serde(rename = "content-structure")]
    pub content_structure: f64,

    pub eeat: f64,
}

impl WeightsConfig {
    /// Returns the weight assigned to a category
    pub fn weight(&self, category: Category) -> f64 {
        match category {
            Category::Crawlability => self.crawlability,
            Category::StructuredData => self.structured_data,
            Category::ContentStructure => self.content_structure,
            Category::Eeat => self.eeat,
        }
    }

    /// Returns the sum of all four weights
    pub fn total(&self) -> f64 {
        self.crawlability + self.structured_data + self.content_structure + self.eeat
    }
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            crawlability: 0.25,
            structured_data: 0.25,
            content_structure: 0.25,
            eeat: 0.25,
        }
    }
}

/// HTTP fetcher behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Retries after the first attempt for transient failures
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Per-attempt request timeout (milliseconds)
    #[serde(rename = "fetch-timeout-ms")]
    pub fetch_timeout_ms: u64,

    /// Retry n waits `2^n * backoff-base-ms`
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Maximum number of simultaneous in-flight requests
    #[serde(rename = "concurrency-limit")]
    pub concurrency_limit: usize,

    /// Pool of user-agent strings; one is picked per fetcher session
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,
}

impl FetcherConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            fetch_timeout_ms: 10_000,
            backoff_base_ms: 1_000,
            concurrency_limit: 5,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Whole-run behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Wall-clock budget for the checking phase (milliseconds)
    #[serde(rename = "run-timeout-ms")]
    pub run_timeout_ms: u64,
}

impl RunConfig {
    pub fn run_timeout(&self) -> Duration {
        Duration::from_millis(self.run_timeout_ms)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            run_timeout_ms: 30_000,
        }
    }
}

/// Content-structure heuristics configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// A paragraph with more words than this is flagged as long
    #[serde(rename = "max-paragraph-words")]
    pub max_paragraph_words: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            max_paragraph_words: 150,
        }
    }
}
