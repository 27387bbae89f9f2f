//! Markdown report generation
//!
//! This module renders a human-readable markdown version of an audit report,
//! including per-category scores, issues and the recommendation list.

use crate::report::types::{Report, Severity};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown report to disk
///
/// # Arguments
///
/// * `report` - The audit report
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_report(report: &Report, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

fn severity_marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Pass => "✓",
        Severity::Warn => "!",
        Severity::Fail => "✗",
    }
}

/// Formats an audit report as markdown
pub fn format_markdown_report(report: &Report) -> String {
    let mut md = String::new();

    md.push_str("# LLMO Audit Report\n\n");

    md.push_str(&format!("- **URL**: {}\n", report.url));
    md.push_str(&format!(
        "- **Generated**: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Overall Score**: {:.2} / 100\n\n",
        report.overall_score
    ));

    // Score table
    md.push_str("## Scores\n\n");
    md.push_str("| Category | Score | Pass | Warn | Fail |\n");
    md.push_str("|----------|-------|------|------|------|\n");
    for (category, result) in report.categories() {
        md.push_str(&format!(
            "| {} | {:.2} | {} | {} | {} |\n",
            category.title(),
            result.score,
            result.count(Severity::Pass),
            result.count(Severity::Warn),
            result.count(Severity::Fail)
        ));
    }
    md.push('\n');

    // Per-category findings
    for (category, result) in report.categories() {
        md.push_str(&format!("## {}\n\n", category.title()));

        let schema_types = result.schema_types();
        if !schema_types.is_empty() {
            md.push_str(&format!("Schema types: {}\n\n", schema_types.join(", ")));
        }

        if result.issues.is_empty() {
            md.push_str("*No findings.*\n\n");
            continue;
        }

        for issue in &result.issues {
            md.push_str(&format!(
                "- {} **{}**: {}",
                severity_marker(issue.severity),
                issue.severity,
                issue.text
            ));
            if let Some(rec) = &issue.recommendation {
                md.push_str(&format!(" → _{}_", rec));
            }
            md.push('\n');
        }
        md.push('\n');
    }

    md.push_str("## Recommendations\n\n");
    if report.recommendations.is_empty() {
        md.push_str("*Nothing to improve.*\n");
    } else {
        for (i, rec) in report.recommendations.iter().enumerate() {
            md.push_str(&format!("{}. {}\n", i + 1, rec));
        }
    }

    md
}
