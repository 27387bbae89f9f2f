//! HTTP client construction and retry scheduling

use crate::config::FetcherConfig;
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

/// Maximum redirect hops followed before giving up
pub const MAX_REDIRECTS: usize = 10;

/// Upper bound on the TCP/TLS connect phase of a single attempt
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Picks a user agent from the pool at random
///
/// Falls back to the crate's own identifier if the pool is empty
/// (validation normally prevents that).
pub fn pick_user_agent(pool: &[String]) -> String {
    pool.choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| format!("llmo-audit/{}", env!("CARGO_PKG_VERSION")))
}

/// Builds an HTTP client for one fetcher session
///
/// TLS certificate verification is disabled: audits are best-effort reads of
/// public pages, and a misconfigured certificate should not hide the page
/// from the report. Never reuse this client for anything sensitive.
///
/// # Example
///
/// ```
/// use llmo_audit::config::FetcherConfig;
/// use llmo_audit::fetcher::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default(), "AuditBot/1.0").unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig, user_agent: &str) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    let timeout = config.fetch_timeout();

    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(CONNECT_TIMEOUT))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .danger_accept_invalid_certs(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Delays between attempts: retry n waits `2^n * base_ms` milliseconds
///
/// With the default base of 1000ms that is 2s, 4s, 8s, ...
pub fn backoff_schedule(base_ms: u64, max_retries: u32) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(base_ms)
        .take(max_retries as usize)
}
