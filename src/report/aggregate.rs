//! Folding per-category results into a single report

use crate::config::WeightsConfig;
use crate::report::types::{clamp_score, round2, Category, CheckResult, Report};
use crate::url::AnalysisTarget;
use chrono::Utc;
use std::collections::{HashMap, HashSet};

/// Issue text every category carries when the page itself was unreachable
pub const PAGE_ACCESS_FAILURE: &str = "Failed to access page";

/// Computes the weighted overall score
///
/// Each category score is clamped first; a missing or failed category
/// simply contributes its 0. The result is clamped and rounded to two
/// decimals.
pub fn weighted_score(weights: &WeightsConfig, scores: &[(Category, f64)]) -> f64 {
    let total: f64 = scores
        .iter()
        .map(|(category, score)| clamp_score(*score) * weights.weight(*category))
        .sum();
    round2(clamp_score(total))
}

/// Collects recommendation texts across results, deduplicated, first-seen order
pub fn collect_recommendations<'a>(results: impl IntoIterator<Item = &'a CheckResult>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut recommendations = Vec::new();

    for result in results {
        for issue in &result.issues {
            if let Some(text) = issue.recommendation_text() {
                if seen.insert(text.to_string()) {
                    recommendations.push(text.to_string());
                }
            }
        }
    }

    recommendations
}

/// Assembles a report from per-category results
///
/// Categories absent from `results` are recorded as failed.
pub fn assemble_report(
    target: &AnalysisTarget,
    weights: &WeightsConfig,
    mut results: HashMap<Category, CheckResult>,
) -> Report {
    let mut take = |category: Category| {
        results.remove(&category).unwrap_or_else(|| {
            CheckResult::failed(
                format!("Analysis failed: no {} checker ran", category.key()),
                None,
            )
        })
    };

    let crawlability = take(Category::Crawlability);
    let structured_data = take(Category::StructuredData);
    let content_structure = take(Category::ContentStructure);
    let eeat = take(Category::Eeat);

    let overall_score = weighted_score(
        weights,
        &[
            (Category::Crawlability, crawlability.score),
            (Category::StructuredData, structured_data.score),
            (Category::ContentStructure, content_structure.score),
            (Category::Eeat, eeat.score),
        ],
    );

    let recommendations =
        collect_recommendations([&crawlability, &structured_data, &content_structure, &eeat]);

    Report {
        url: target.clone(),
        overall_score,
        crawlability,
        structured_data,
        content_structure,
        eeat,
        recommendations,
        generated_at: Utc::now(),
    }
}

/// Builds the report returned when the main page cannot be fetched or parsed
///
/// All categories score 0 and carry the same single issue.
pub fn failure_report(target: &AnalysisTarget, detail: &str) -> Report {
    let failed = || {
        CheckResult::failed(
            PAGE_ACCESS_FAILURE,
            Some(format!("{}: {}", PAGE_ACCESS_FAILURE, detail)),
        )
    };

    let structured_data = failed().with_metadata("schema_types", Vec::<String>::new());
    let crawlability = failed();
    let content_structure = failed();
    let eeat = failed();

    let recommendations =
        collect_recommendations([&crawlability, &structured_data, &content_structure, &eeat]);

    Report {
        url: target.clone(),
        overall_score: 0.0,
        crawlability,
        structured_data,
        content_structure,
        eeat,
        recommendations,
        generated_at: Utc::now(),
    }
}
