//! Integration tests for LLMO-Audit
//!
//! These tests use wiremock to stand in for the audited site and exercise
//! the fetcher and the full analysis run end-to-end.

mod analysis_tests;
mod fetcher_tests;

use llmo_audit::config::AuditConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration with millisecond backoff and short timeouts
pub fn create_test_config() -> AuditConfig {
    let mut config = AuditConfig::default();
    config.fetcher.backoff_base_ms = 1;
    config.fetcher.fetch_timeout_ms = 2_000;
    config.fetcher.user_agents = vec!["AuditTestAgent/1.0".to_string()];
    config.run.run_timeout_ms = 10_000;
    config
}

/// Serves `body` as HTML at `route`
pub async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Serves `body` as plain text at `route`
pub async fn mount_text(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/plain"),
        )
        .mount(server)
        .await;
}
