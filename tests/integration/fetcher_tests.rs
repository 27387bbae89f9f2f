//! Fetcher behavior against a mock server

use crate::create_test_config;
use llmo_audit::fetcher::{FetchErrorKind, FetchResult, Fetcher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_with_retries(max_retries: u32) -> Fetcher {
    let mut config = create_test_config();
    config.fetcher.max_retries = max_retries;
    Fetcher::standalone(&config.fetcher).unwrap()
}

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<h1>Hello</h1>".as_bytes().to_vec(), "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/page", mock_server.uri());
    match fetcher_with_retries(3).fetch(&url).await {
        FetchResult::Success {
            status,
            body,
            final_url,
            content_type,
        } => {
            assert_eq!(status, 200);
            assert_eq!(body, "<h1>Hello</h1>");
            assert_eq!(final_url, url);
            assert_eq!(content_type.as_deref(), Some("text/html"));
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = fetcher_with_retries(3)
        .fetch(&format!("{}/missing", mock_server.uri()))
        .await;

    match result {
        FetchResult::Failure(failure) => {
            assert_eq!(failure.kind(), FetchErrorKind::HttpError);
            assert_eq!(failure.status(), Some(404));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_retried_up_to_limit() {
    let mock_server = MockServer::start().await;

    // First attempt plus two retries
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let result = fetcher_with_retries(2)
        .fetch(&format!("{}/flaky", mock_server.uri()))
        .await;

    match result {
        FetchResult::Failure(failure) => assert_eq!(failure.status(), Some(503)),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_recovers_after_transient_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/recover"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/recover"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = fetcher_with_retries(3)
        .fetch(&format!("{}/recover", mock_server.uri()))
        .await;

    assert_eq!(result.body(), Some("ok"));
}

#[tokio::test]
async fn test_timeout_is_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1_000)))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.fetcher.max_retries = 0;
    config.fetcher.fetch_timeout_ms = 100;
    let fetcher = Fetcher::standalone(&config.fetcher).unwrap();

    match fetcher.fetch(&format!("{}/slow", mock_server.uri())).await {
        FetchResult::Failure(failure) => assert_eq!(failure.kind(), FetchErrorKind::Timeout),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Bind and release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let fetcher = fetcher_with_retries(1);
    match fetcher.fetch(&format!("http://127.0.0.1:{}/", port)).await {
        FetchResult::Failure(failure) => {
            assert_eq!(failure.kind(), FetchErrorKind::NetworkError);
            assert!(failure.is_transient());
        }
        other => panic!("expected network error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sends_user_agent_from_pool() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header("user-agent", "AuditTestAgent/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = fetcher_with_retries(0)
        .fetch(&format!("{}/ua", mock_server.uri()))
        .await;
    assert!(result.is_success());
}

#[tokio::test]
async fn test_concurrency_cap_serializes_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/delayed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("ok")
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config();
    let limiter = Arc::new(Semaphore::new(1));
    let a = Fetcher::new(&config.fetcher, limiter.clone()).unwrap();
    let b = Fetcher::new(&config.fetcher, limiter.clone()).unwrap();
    let url = format!("{}/delayed", mock_server.uri());

    let started = Instant::now();
    let (first, second) = tokio::join!(a.fetch(&url), b.fetch(&url));
    let elapsed = started.elapsed();

    assert!(first.is_success());
    assert!(second.is_success());
    assert!(
        elapsed >= Duration::from_millis(380),
        "requests overlapped: {:?}",
        elapsed
    );
    assert_eq!(limiter.available_permits(), 1);
}

#[tokio::test]
async fn test_permits_released_after_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_with_retries(2);
    let permits = fetcher.limiter().available_permits();
    let result = fetcher.fetch(&format!("{}/broken", mock_server.uri())).await;

    assert!(!result.is_success());
    assert_eq!(fetcher.limiter().available_permits(), permits);
}

#[tokio::test]
async fn test_invalid_utf8_body_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/binary"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0x3c, 0x70, 0x3e, 0xff, 0xfe], "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    match fetcher_with_retries(3)
        .fetch(&format!("{}/binary", mock_server.uri()))
        .await
    {
        FetchResult::Failure(failure) => {
            assert_eq!(failure.kind(), FetchErrorKind::ParseError);
            assert!(!failure.is_transient());
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_declared_legacy_charset_is_transcoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/latin1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0x63, 0x61, 0x66, 0xe9], "text/plain; charset=iso-8859-1"),
        )
        .mount(&mock_server)
        .await;

    let result = fetcher_with_retries(0)
        .fetch(&format!("{}/latin1", mock_server.uri()))
        .await;
    assert_eq!(result.body(), Some("café"));
}
