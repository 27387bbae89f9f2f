//! Report module
//!
//! This module holds the audit data model ([`Issue`], [`CheckResult`],
//! [`Report`]), the aggregation rules that fold four category results into
//! one weighted score, and markdown rendering.
//!
//! The core never persists a report; saving it is the caller's job.

mod aggregate;
mod markdown;
mod types;

pub use aggregate::{
    assemble_report, collect_recommendations, failure_report, weighted_score,
    PAGE_ACCESS_FAILURE,
};
pub use markdown::{format_markdown_report, generate_markdown_report};
pub use types::{clamp_score, round2, Category, CheckResult, Issue, Report, Severity};
