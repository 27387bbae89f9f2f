//! Structured data: JSON-LD presence, types and required properties

use crate::checks::{Checker, PageContext};
use crate::document::{node_types, Document, JsonLdBlock};
use crate::report::{Category, CheckResult, Issue};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Points for each distinct schema type
const TYPE_POINTS: f64 = 25.0;
/// Bonus when a recognized type carries all its required properties
const REQUIRED_PROPERTIES_BONUS: f64 = 25.0;
/// Bonus for an unrecognized type with more than the bare minimum
const GENERIC_RICHNESS_BONUS: f64 = 15.0;
/// A generic node needs more keys than this to earn its bonus
const GENERIC_MIN_KEYS: usize = 3;

/// Required properties for the schema types the audit recognizes
pub fn required_properties(schema_type: &str) -> Option<&'static [&'static str]> {
    match schema_type {
        "Article" => Some(&["headline", "author", "datePublished"]),
        "Product" => Some(&["name", "description", "offers"]),
        "Organization" => Some(&["name", "url", "logo"]),
        _ => None,
    }
}

/// Scores the page's JSON-LD structured data
///
/// Every distinct `@type` earns 25 points once. A recognized type earns
/// another 25 the first time a node of that type carries all required
/// properties; other types earn 15 the first time a node has more than
/// three keys. Malformed blocks are reported and skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredDataChecker;

#[async_trait(?Send)]
impl Checker for StructuredDataChecker {
    fn category(&self) -> Category {
        Category::StructuredData
    }

    async fn analyze(&self, ctx: &PageContext<'_>) -> crate::Result<CheckResult> {
        Ok(evaluate(ctx.document))
    }
}

/// Per-type bookkeeping while walking the nodes
#[derive(Default)]
struct TypeTally {
    /// Distinct types, first-seen order
    seen: Vec<String>,
    /// Types that already earned their bonus
    rewarded: HashSet<String>,
    /// First missing-property list observed for recognized types
    missing: HashMap<String, Vec<&'static str>>,
}

fn evaluate(document: &Document) -> CheckResult {
    let blocks = document.json_ld_blocks();
    let microdata = microdata_types(document);

    if blocks.is_empty() {
        let recommendation = if microdata.is_empty() {
            "Add schema.org structured data as JSON-LD"
        } else {
            "Convert the page's microdata to JSON-LD structured data"
        };
        return CheckResult::new(
            0.0,
            vec![Issue::fail("No structured data found", recommendation)],
        )
        .with_metadata("schema_types", Vec::<String>::new())
        .with_metadata("block_count", 0)
        .with_metadata("microdata_types", microdata);
    }

    let mut score = 0.0;
    let mut issues = Vec::new();
    let mut tally = TypeTally::default();

    for block in &blocks {
        if let JsonLdBlock::Invalid { error } = block {
            tracing::debug!("Skipping malformed JSON-LD block: {}", error);
            issues.push(Issue::fail(
                "Invalid JSON in JSON-LD block",
                "Fix the JSON syntax of the JSON-LD block",
            ));
            continue;
        }

        for node in block.nodes() {
            score += score_node(node, &mut tally, &mut issues);
        }
    }

    for schema_type in &tally.seen {
        if tally.rewarded.contains(schema_type) {
            continue;
        }
        match tally.missing.get(schema_type) {
            Some(missing) => issues.push(Issue::warn(
                format!(
                    "{} schema missing required properties: {}",
                    schema_type,
                    missing.join(", ")
                ),
                format!("Add {} to the {} schema", missing.join(", "), schema_type),
            )),
            None => issues.push(Issue::warn(
                format!("{} schema has minimal properties", schema_type),
                format!("Add more properties to the {} schema", schema_type),
            )),
        }
    }

    if !microdata.is_empty() {
        issues.push(
            Issue::pass(format!("Microdata found: {}", microdata.join(", ")))
                .with_recommendation("Prefer JSON-LD over microdata for structured data"),
        );
    }

    CheckResult::new(score.min(100.0), issues)
        .with_metadata("schema_types", tally.seen.clone())
        .with_metadata("block_count", blocks.len())
        .with_metadata("microdata_types", microdata)
}

/// Scores one JSON-LD node, returning the points it earned
fn score_node(node: &Map<String, Value>, tally: &mut TypeTally, issues: &mut Vec<Issue>) -> f64 {
    let types = node_types(node);
    if types.is_empty() {
        issues.push(Issue::warn(
            "JSON-LD node without @type",
            "Add an @type to every JSON-LD node",
        ));
        return 0.0;
    }

    let mut points = 0.0;
    for schema_type in types {
        if !tally.seen.contains(&schema_type) {
            tally.seen.push(schema_type.clone());
            points += TYPE_POINTS;
            issues.push(Issue::pass(format!("{} schema found", schema_type)));
        }

        if tally.rewarded.contains(&schema_type) {
            continue;
        }

        match required_properties(&schema_type) {
            Some(required) => {
                let missing: Vec<&'static str> = required
                    .iter()
                    .copied()
                    .filter(|prop| !node.contains_key(*prop))
                    .collect();
                if missing.is_empty() {
                    points += REQUIRED_PROPERTIES_BONUS;
                    issues.push(Issue::pass(format!(
                        "{} schema has all required properties",
                        schema_type
                    )));
                    tally.missing.remove(&schema_type);
                    tally.rewarded.insert(schema_type);
                } else {
                    tally.missing.entry(schema_type).or_insert(missing);
                }
            }
            None if node.len() > GENERIC_MIN_KEYS => {
                points += GENERIC_RICHNESS_BONUS;
                tally.rewarded.insert(schema_type);
            }
            None => {}
        }
    }

    points
}

/// Schema types declared through microdata `itemtype` attributes
fn microdata_types(document: &Document) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for element in document.select("[itemscope][itemtype]") {
        let Some(itemtype) = element.value().attr("itemtype") else {
            continue;
        };
        for url in itemtype.split_whitespace() {
            let name = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
            if !name.is_empty() && !types.iter().any(|t| t == name) {
                types.push(name.to_string());
            }
        }
    }
    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;

    fn doc_with_blocks(blocks: &[&str]) -> Document {
        let scripts: String = blocks
            .iter()
            .map(|b| format!(r#"<script type="application/ld+json">{}</script>"#, b))
            .collect();
        Document::parse(&format!("<html><head>{}</head><body><p>x</p></body></html>", scripts))
            .unwrap()
    }

    #[test]
    fn test_no_blocks() {
        let result = evaluate(&Document::parse("<p>No data</p>").unwrap());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].severity, Severity::Fail);
        assert!(result.schema_types().is_empty());
    }

    #[test]
    fn test_complete_article() {
        let result = evaluate(&doc_with_blocks(&[
            r#"{"@type":"Article","headline":"x","author":"y","datePublished":"2024-01-01"}"#,
        ]));
        assert_eq!(result.score, 50.0);
        assert_eq!(result.schema_types(), vec!["Article".to_string()]);
        assert_eq!(result.count(Severity::Warn), 0);
    }

    #[test]
    fn test_incomplete_article_warns_once() {
        let result = evaluate(&doc_with_blocks(&[
            r#"{"@type":"Article","headline":"x"}"#,
            r#"{"@type":"Article","author":"y"}"#,
        ]));
        assert_eq!(result.score, 25.0);
        let warns: Vec<&Issue> = result
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Warn)
            .collect();
        assert_eq!(warns.len(), 1);
        assert_eq!(
            warns[0].text,
            "Article schema missing required properties: author, datePublished"
        );
    }

    #[test]
    fn test_malformed_block_does_not_block_others() {
        let result = evaluate(&doc_with_blocks(&[
            r#"{"@type": "Product", "name": }"#,
            r#"{"@type":"Article","headline":"x","author":"y","datePublished":"2024-01-01"}"#,
        ]));
        assert_eq!(result.score, 50.0);
        let invalid = result
            .issues
            .iter()
            .filter(|i| i.text == "Invalid JSON in JSON-LD block")
            .count();
        assert_eq!(invalid, 1);
        assert_eq!(result.metadata["block_count"], 2);
    }

    #[test]
    fn test_generic_types() {
        let result = evaluate(&doc_with_blocks(&[
            r#"{"@context":"https://schema.org","@type":"Recipe","name":"Soup","recipeYield":"4"}"#,
            r#"{"@type":"WebSite","name":"x"}"#,
        ]));
        // Recipe: 25 + 15, WebSite: 25 with a minimal-properties warning
        assert_eq!(result.score, 65.0);
        assert!(result
            .issues
            .iter()
            .any(|i| i.text == "WebSite schema has minimal properties"));
    }

    #[test]
    fn test_graph_and_cap() {
        let result = evaluate(&doc_with_blocks(&[r#"{
            "@context": "https://schema.org",
            "@graph": [
                {"@type":"Organization","name":"Acme","url":"https://acme.test","logo":"l.png"},
                {"@type":"Product","name":"P","description":"d","offers":{}},
                {"@type":"Article","headline":"h","author":"a","datePublished":"2024-01-01"}
            ]
        }"#]));
        assert_eq!(result.score, 100.0);
        assert_eq!(
            result.schema_types(),
            vec!["Organization", "Product", "Article"]
        );
    }

    #[test]
    fn test_node_without_type() {
        let result = evaluate(&doc_with_blocks(&[r#"{"name":"anonymous"}"#]));
        assert_eq!(result.score, 0.0);
        assert!(result
            .issues
            .iter()
            .any(|i| i.text == "JSON-LD node without @type"));
    }

    #[test]
    fn test_microdata_reported() {
        let doc = Document::parse(
            r#"<div itemscope itemtype="https://schema.org/Recipe"><span itemprop="name">Soup</span></div>"#,
        )
        .unwrap();
        let result = evaluate(&doc);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.metadata["microdata_types"], serde_json::json!(["Recipe"]));
        assert_eq!(
            result.issues[0].recommendation.as_deref(),
            Some("Convert the page's microdata to JSON-LD structured data")
        );
    }
}
