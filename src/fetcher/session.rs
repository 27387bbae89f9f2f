//! Retrying fetcher session
//!
//! A [`Fetcher`] is created once per audit run. It owns an HTTP client
//! configured with one user agent from the rotation pool and shares the
//! analyzer-wide request limiter with every other session.

use crate::config::FetcherConfig;
use crate::fetcher::client::{backoff_schedule, build_http_client, pick_user_agent};
use crate::fetcher::result::{FetchFailure, FetchResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_retry::RetryIf;

/// HTTP fetcher with retry, backoff and a shared concurrency cap
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    limiter: Arc<Semaphore>,
    user_agent: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl Fetcher {
    /// Creates a session sharing `limiter` with other sessions
    ///
    /// # Arguments
    ///
    /// * `config` - Fetcher configuration (timeouts, retries, user-agent pool)
    /// * `limiter` - Semaphore bounding simultaneous in-flight requests
    ///
    /// # Returns
    ///
    /// * `Ok(Fetcher)` - Ready-to-use session
    /// * `Err(reqwest::Error)` - The HTTP client could not be built
    pub fn new(config: &FetcherConfig, limiter: Arc<Semaphore>) -> Result<Self, reqwest::Error> {
        let user_agent = pick_user_agent(&config.user_agents);
        let client = build_http_client(config, &user_agent)?;

        Ok(Self {
            client,
            limiter,
            user_agent,
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
        })
    }

    /// Creates a session with its own limiter sized from the config
    pub fn standalone(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config,
            Arc::new(Semaphore::new(config.concurrency_limit.max(1))),
        )
    }

    /// User agent this session sends
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// The shared request limiter
    pub fn limiter(&self) -> &Arc<Semaphore> {
        &self.limiter
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Success |
    /// | HTTP 5xx | Retry with backoff |
    /// | Timeout | Retry with backoff |
    /// | Connection/DNS/TLS error | Retry with backoff |
    /// | Other non-2xx | Immediate failure |
    /// | Undecodable body | Immediate failure |
    ///
    /// At most `max_retries` retries follow the first attempt. A limiter
    /// permit is held for each attempt only, never across a backoff sleep,
    /// and is released when the attempt ends however it ends.
    ///
    /// Never panics and never returns an error: every outcome is a
    /// [`FetchResult`].
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let attempts = AtomicU32::new(0);
        let attempts = &attempts;

        let outcome = RetryIf::spawn(
            backoff_schedule(self.backoff_base_ms, self.max_retries),
            move || {
                let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
                self.attempt(url, attempt)
            },
            |failure: &FetchFailure| {
                let transient = failure.is_transient();
                if transient {
                    tracing::debug!("Transient failure for {}: {}", url, failure);
                }
                transient
            },
        )
        .await;

        match outcome {
            Ok(result) => result,
            Err(failure) => {
                tracing::warn!(
                    "Giving up on {} after {} attempt(s): {}",
                    url,
                    attempts.load(Ordering::Relaxed),
                    failure
                );
                FetchResult::Failure(failure)
            }
        }
    }

    /// Performs a single request; `Ok` always holds `FetchResult::Success`
    async fn attempt(&self, url: &str, attempt: u32) -> Result<FetchResult, FetchFailure> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| FetchFailure::Network {
                detail: "request limiter closed".to_string(),
            })?;

        tracing::debug!("Fetching {} (attempt {})", url, attempt);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let failure = classify_error(&e);
                tracing::info!("{} attempt {} failed: {}", url, attempt, failure);
                return Err(failure);
            }
        };

        let status = response.status();
        let final_url = response.url().to_string();
        tracing::info!("{} attempt {} -> HTTP {}", url, attempt, status.as_u16());

        if !status.is_success() {
            return Err(FetchFailure::Http {
                status: status.as_u16(),
                detail: status
                    .canonical_reason()
                    .unwrap_or("Unexpected status")
                    .to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match read_body(response, content_type.as_deref()).await {
            Ok(body) => Ok(FetchResult::Success {
                status: status.as_u16(),
                body,
                final_url,
                content_type,
            }),
            Err(failure) => {
                tracing::info!("{} attempt {} body error: {}", url, attempt, failure);
                Err(failure)
            }
        }
    }
}

/// Decodes the response body
///
/// UTF-8 bodies (declared, or with no charset at all) must be valid UTF-8.
/// Other declared charsets are transcoded by reqwest.
async fn read_body(response: Response, content_type: Option<&str>) -> Result<String, FetchFailure> {
    let strict = declared_charset(content_type)
        .map(|charset| charset.eq_ignore_ascii_case("utf-8") || charset.eq_ignore_ascii_case("utf8"))
        .unwrap_or(true);

    if !strict {
        return response.text().await.map_err(|e| classify_error(&e));
    }

    let bytes = response.bytes().await.map_err(|e| classify_error(&e))?;
    String::from_utf8(bytes.to_vec()).map_err(|e| FetchFailure::Parse {
        detail: format!("body is not valid UTF-8: {}", e),
    })
}

/// The `charset` parameter of a Content-Type value
fn declared_charset(content_type: Option<&str>) -> Option<&str> {
    content_type?.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Maps a transport-level reqwest error onto the failure taxonomy
fn classify_error(e: &reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout {
            detail: e.to_string(),
        }
    } else if e.is_decode() {
        FetchFailure::Parse {
            detail: e.to_string(),
        }
    } else {
        // Connect, DNS, TLS, reset and redirect-limit errors all land here
        FetchFailure::Network {
            detail: e.to_string(),
        }
    }
}
