//! Ratio scoring shared by the content-structure and E-E-A-T checkers

use crate::report::{round2, CheckResult, Issue, Severity};

/// Issue text used when a ratio-scored checker performed no checks
pub const NO_CHECKS_PERFORMED: &str = "No checks could be performed";

/// `(passes + 0.5 * warns) / total * 100`, rounded to two decimals
///
/// Returns 0 for an empty issue list.
pub fn ratio_score(issues: &[Issue]) -> f64 {
    if issues.is_empty() {
        return 0.0;
    }

    let passes = issues.iter().filter(|i| i.severity == Severity::Pass).count() as f64;
    let warns = issues.iter().filter(|i| i.severity == Severity::Warn).count() as f64;

    round2((passes + 0.5 * warns) / issues.len() as f64 * 100.0)
}

/// Builds a ratio-scored result, or an explanatory failure for zero checks
pub fn ratio_result(issues: Vec<Issue>) -> CheckResult {
    if issues.is_empty() {
        return CheckResult::failed(
            NO_CHECKS_PERFORMED,
            Some("Make sure the page has analyzable HTML content".to_string()),
        );
    }

    CheckResult::new(ratio_score(&issues), issues)
}
