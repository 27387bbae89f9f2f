//! Report data model: issues, per-category results and the final report

use crate::url::AnalysisTarget;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Outcome of a single heuristic check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Pass,
    Warn,
    Fail,
}

impl Severity {
    /// Returns the label used in rendered output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding produced by a checker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub text: String,
    pub recommendation: Option<String>,
}

impl Issue {
    pub fn pass(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Pass,
            text: text.into(),
            recommendation: None,
        }
    }

    pub fn warn(text: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warn,
            text: text.into(),
            recommendation: Some(recommendation.into()),
        }
    }

    pub fn fail(text: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self {
            severity: Severity::Fail,
            text: text.into(),
            recommendation: Some(recommendation.into()),
        }
    }

    /// Attaches (or replaces) the recommendation
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    /// Text this issue contributes to the report's recommendation list
    ///
    /// The recommendation wins; Warn/Fail issues without one fall back to
    /// their own text. Pass issues without a recommendation contribute nothing.
    pub fn recommendation_text(&self) -> Option<&str> {
        match self.recommendation.as_deref() {
            Some(rec) if !rec.trim().is_empty() => Some(rec),
            _ if self.severity != Severity::Pass && !self.text.trim().is_empty() => {
                Some(&self.text)
            }
            _ => None,
        }
    }
}

/// The four audit categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Crawlability,
    StructuredData,
    ContentStructure,
    Eeat,
}

impl Category {
    /// All categories in report order
    pub const ALL: [Category; 4] = [
        Category::Crawlability,
        Category::StructuredData,
        Category::ContentStructure,
        Category::Eeat,
    ];

    /// Machine-readable key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Crawlability => "crawlability",
            Self::StructuredData => "structured_data",
            Self::ContentStructure => "content_structure",
            Self::Eeat => "eeat",
        }
    }

    /// Human-readable title
    pub fn title(&self) -> &'static str {
        match self {
            Self::Crawlability => "Crawlability",
            Self::StructuredData => "Structured Data",
            Self::ContentStructure => "Content Structure",
            Self::Eeat => "E-E-A-T",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Clamps a score into `[0, 100]`, mapping NaN to 0
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// Rounds to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score, issues and extra metadata produced by one checker in one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub score: f64,
    pub issues: Vec<Issue>,
    pub metadata: Map<String, Value>,
}

impl CheckResult {
    /// Creates a result; the score is clamped to `[0, 100]`
    pub fn new(score: f64, issues: Vec<Issue>) -> Self {
        Self {
            score: clamp_score(score),
            issues,
            metadata: Map::new(),
        }
    }

    /// A zero-score result carrying one Fail issue
    pub fn failed(text: impl Into<String>, recommendation: Option<String>) -> Self {
        Self::new(
            0.0,
            vec![Issue {
                severity: Severity::Fail,
                text: text.into(),
                recommendation,
            }],
        )
    }

    /// Adds a metadata entry
    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Schema types recorded by the structured-data checker
    pub fn schema_types(&self) -> Vec<String> {
        self.metadata
            .get("schema_types")
            .and_then(Value::as_array)
            .map(|types| {
                types
                    .iter()
                    .filter_map(|t| t.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Counts issues of one severity
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// The terminal artifact of an audit run
///
/// The analyzer never stores a report; callers decide what to do with it.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub url: AnalysisTarget,
    pub overall_score: f64,
    pub crawlability: CheckResult,
    pub structured_data: CheckResult,
    pub content_structure: CheckResult,
    pub eeat: CheckResult,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Returns the result for one category
    pub fn category(&self, category: Category) -> &CheckResult {
        match category {
            Category::Crawlability => &self.crawlability,
            Category::StructuredData => &self.structured_data,
            Category::ContentStructure => &self.content_structure,
            Category::Eeat => &self.eeat,
        }
    }

    /// Iterates categories in report order
    pub fn categories(&self) -> impl Iterator<Item = (Category, &CheckResult)> {
        Category::ALL.into_iter().map(move |c| (c, self.category(c)))
    }
}
