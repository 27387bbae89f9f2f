//! LLMO-Audit: page readiness auditing for LLM crawlers
//!
//! This crate fetches a single web page, runs four independent heuristic
//! checks against it (crawlability, structured data, content structure and
//! E-E-A-T signals) and folds their results into one weighted 0-100 report.

pub mod analyzer;
pub mod checks;
pub mod config;
pub mod document;
pub mod fetcher;
pub mod report;
pub mod url;

use thiserror::Error;

/// Main error type for LLMO-Audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] fetcher::FetchFailure),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Document error: {0}")]
    Document(#[from] document::DocumentError),

    #[error("{category} check failed: {reason}")]
    CheckerFailure {
        category: report::Category,
        reason: String,
    },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: analyzer::RunState,
        to: analyzer::RunState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for LLMO-Audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use analyzer::{Analyzer, RunState};
pub use config::AuditConfig;
pub use report::{Category, CheckResult, Issue, Report, Severity};
pub use url::AnalysisTarget;
