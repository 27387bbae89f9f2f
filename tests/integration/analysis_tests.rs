//! End-to-end analysis runs against a mock site

use crate::{create_test_config, mount_html, mount_text};
use async_trait::async_trait;
use llmo_audit::checks::{
    Checker, ContentStructureChecker, CrawlabilityChecker, PageContext, StructuredDataChecker,
};
use llmo_audit::report::PAGE_ACCESS_FAILURE;
use llmo_audit::{AnalysisTarget, Analyzer, Category, CheckResult, Severity};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Measuring crawl budgets</title>
  <meta name="author" content="Jane Q. Doe, Senior Analyst">
  <meta property="article:published_time" content="2099-01-01T00:00:00Z">
  <link rel="canonical" href="/post">
  <script type="application/ld+json">
    {"@type":"Article","headline":"x","author":"y","datePublished":"2024-01-01"}
  </script>
</head>
<body>
  <main>
    <h1>Measuring crawl budgets</h1>
    <h2>Method</h2>
    <p>We ran a survey of 300 sites to collect data.</p>
    <ul><li>First finding</li><li>Second finding</li></ul>
    <p>See the <a href="https://journal.example.org/paper/7">original paper</a>.</p>
    <a href="/about">About us</a>
    <a href="mailto:team@example.com">Contact</a>
    <a href="https://twitter.com/example">Follow</a>
  </main>
</body>
</html>"#;

fn analyzer() -> Analyzer {
    Analyzer::new(create_test_config()).unwrap()
}

async fn audit(server: &MockServer, route: &str) -> llmo_audit::Report {
    let target = AnalysisTarget::parse(&format!("{}{}", server.uri(), route)).unwrap();
    analyzer().analyze(target).await
}

#[tokio::test]
async fn test_full_audit_of_well_formed_page() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/post", ARTICLE_PAGE).await;
    mount_text(&mock_server, "/robots.txt", "User-agent: GPTBot\nAllow: /\n").await;
    mount_text(&mock_server, "/llms.txt", "# Example\nAllow: /post\n").await;

    let report = audit(&mock_server, "/post").await;

    assert_eq!(report.crawlability.score, 100.0);
    assert_eq!(report.crawlability.metadata["robots_txt_score"], 50.0);
    assert_eq!(report.crawlability.metadata["llms_txt_score"], 50.0);
    assert_eq!(report.structured_data.score, 50.0);
    assert_eq!(report.structured_data.schema_types(), vec!["Article".to_string()]);
    assert_eq!(report.content_structure.score, 100.0);
    assert_eq!(report.eeat.score, 100.0);
    assert_eq!(report.overall_score, 87.5);
}

#[tokio::test]
async fn test_main_page_failure_produces_failure_report() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = audit(&mock_server, "/gone").await;

    assert_eq!(report.overall_score, 0.0);
    for (_, result) in report.categories() {
        assert_eq!(result.score, 0.0);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].text, PAGE_ACCESS_FAILURE);
    }
    assert_eq!(
        report.recommendations,
        vec!["Failed to access page: HTTP 404: Not Found".to_string()]
    );
}

#[tokio::test]
async fn test_unparseable_main_page_produces_failure_report() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/blank", "   \n  ").await;

    let report = audit(&mock_server, "/blank").await;

    assert_eq!(report.overall_score, 0.0);
    assert!(report.recommendations[0].starts_with("Failed to access page: Failed to parse document"));
}

#[tokio::test]
async fn test_robots_with_gptbot_and_no_llms_scores_fifty() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", "<h1>Home</h1><p>Welcome.</p>").await;
    mount_text(&mock_server, "/robots.txt", "User-agent: GPTBot\nDisallow: /private\n").await;

    let report = audit(&mock_server, "/").await;

    assert_eq!(report.crawlability.score, 50.0);
    assert!(report
        .crawlability
        .issues
        .iter()
        .any(|i| i.text == "No llms.txt found" && i.severity == Severity::Warn));
}

#[tokio::test]
async fn test_soft_404_llms_counts_as_absent() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", "<h1>Home</h1><p>Welcome.</p>").await;
    mount_html(&mock_server, "/llms.txt", "<!DOCTYPE html><html><body>Not found</body></html>").await;

    let report = audit(&mock_server, "/").await;

    assert_eq!(report.crawlability.metadata["llms_txt_score"], 0.0);
    assert_eq!(report.crawlability.score, 0.0);
}

#[tokio::test]
async fn test_content_structure_scenario() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", "<h1>Only heading</h1><p>One short paragraph.</p>").await;

    let report = audit(&mock_server, "/").await;
    let content = &report.content_structure;

    assert!(content.score > 0.0 && content.score < 100.0);
    assert!(content
        .issues
        .iter()
        .any(|i| i.text == "No lists or tables found" && i.severity == Severity::Fail));
    assert!(content
        .issues
        .iter()
        .any(|i| i.text == "Good heading hierarchy" && i.severity == Severity::Pass));
}

#[tokio::test]
async fn test_malformed_json_ld_block_is_isolated() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r#"<html><head>
        <script type="application/ld+json">{"@type": "Article", </script>
        <script type="application/ld+json">{"@type":"Article","headline":"x","author":"y","datePublished":"2024-01-01"}</script>
        </head><body><h1>T</h1></body></html>"#,
    )
    .await;

    let report = audit(&mock_server, "/").await;

    assert_eq!(report.structured_data.score, 50.0);
    let invalid = report
        .structured_data
        .issues
        .iter()
        .filter(|i| i.text == "Invalid JSON in JSON-LD block")
        .count();
    assert_eq!(invalid, 1);
}

#[tokio::test]
async fn test_recommendations_are_unique() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", "<h2>No h1</h2><table><tr><td>x</td></tr></table>").await;

    let report = audit(&mock_server, "/").await;

    let unique: HashSet<&String> = report.recommendations.iter().collect();
    assert_eq!(unique.len(), report.recommendations.len());
    assert!(!report.recommendations.is_empty());
}

#[tokio::test]
async fn test_repeated_runs_are_deterministic() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/post", ARTICLE_PAGE).await;
    mount_text(&mock_server, "/robots.txt", "User-agent: *\nAllow: /\n").await;

    let first = audit(&mock_server, "/post").await;
    let second = audit(&mock_server, "/post").await;

    assert_eq!(first.overall_score, second.overall_score);
    for category in Category::ALL {
        assert_eq!(first.category(category), second.category(category));
    }
    assert_eq!(first.recommendations, second.recommendations);
}

struct BrokenEeat;

#[async_trait(?Send)]
impl Checker for BrokenEeat {
    fn category(&self) -> Category {
        Category::Eeat
    }

    async fn analyze(&self, _ctx: &PageContext<'_>) -> llmo_audit::Result<CheckResult> {
        panic!("unexpected markup");
    }
}

#[tokio::test]
async fn test_one_failing_checker_does_not_sink_the_report() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/post", ARTICLE_PAGE).await;
    mount_text(&mock_server, "/robots.txt", "User-agent: GPTBot\nAllow: /\n").await;
    mount_text(&mock_server, "/llms.txt", "Allow: /\n").await;

    let analyzer = Analyzer::with_checkers(
        create_test_config(),
        vec![
            Box::new(CrawlabilityChecker),
            Box::new(StructuredDataChecker),
            Box::new(ContentStructureChecker::default()),
            Box::new(BrokenEeat),
        ],
    )
    .unwrap();

    let target = AnalysisTarget::parse(&format!("{}/post", mock_server.uri())).unwrap();
    let report = analyzer.analyze(target).await;

    assert_eq!(report.crawlability.score, 100.0);
    assert_eq!(report.structured_data.score, 50.0);
    assert_eq!(report.content_structure.score, 100.0);
    assert_eq!(report.eeat.score, 0.0);
    assert!(report.eeat.issues[0].text.contains("unexpected markup"));
    assert_eq!(report.overall_score, 62.5);
}

#[tokio::test]
async fn test_analyze_url_normalizes_and_validates() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/page", "<h1>T</h1><p>x</p>").await;

    let report = analyzer()
        .analyze_url(&format!("{}/page?utm_source=x#frag", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(report.url.as_str(), format!("{}/page", mock_server.uri()));

    assert!(analyzer().analyze_url("ftp://example.com/file").await.is_err());
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", "<h1>T</h1><p>x</p>").await;

    let report = audit(&mock_server, "/").await;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["url"], format!("{}/", mock_server.uri()));
    assert!(json["crawlability"]["issues"].is_array());
    assert_eq!(json["crawlability"]["issues"][0]["severity"], "fail");
}

#[tokio::test]
async fn test_slow_llms_counts_as_absent_without_losing_robots_points() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", "<h1>Home</h1><p>Welcome.</p>").await;
    mount_text(&mock_server, "/robots.txt", "User-agent: GPTBot\nAllow: /\n").await;

    Mock::given(method("GET"))
        .and(path("/llms.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("Allow: /\n")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.fetcher.fetch_timeout_ms = 5_000;
    config.fetcher.max_retries = 3;
    config.run.run_timeout_ms = 1_500;
    let analyzer = Analyzer::new(config).unwrap();

    let target = AnalysisTarget::parse(&format!("{}/", mock_server.uri())).unwrap();
    let report = analyzer.analyze(target).await;

    assert_eq!(report.crawlability.score, 50.0);
    assert_eq!(report.crawlability.metadata["robots_txt_score"], 50.0);
    assert_eq!(report.crawlability.metadata["llms_txt_score"], 0.0);
    assert!(report
        .crawlability
        .issues
        .iter()
        .any(|i| i.text == "No llms.txt found"));
    assert!(report
        .crawlability
        .issues
        .iter()
        .all(|i| !i.text.starts_with("Analysis failed")));
}

#[tokio::test]
async fn test_run_budget_covers_main_page_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<h1>Late</h1>")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.fetcher.fetch_timeout_ms = 5_000;
    config.run.run_timeout_ms = 1_000;
    let analyzer = Analyzer::new(config).unwrap();

    let started = Instant::now();
    let target = AnalysisTarget::parse(&format!("{}/slow", mock_server.uri())).unwrap();
    let report = analyzer.analyze(target).await;

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(report.overall_score, 0.0);
    assert_eq!(
        report.recommendations,
        vec!["Failed to access page: Request timed out: run budget of 1000ms exhausted".to_string()]
    );
}
