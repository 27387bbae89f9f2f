//! HTTP fetching for LLMO-Audit
//!
//! This module handles every outbound request of an audit run:
//! - Building HTTP clients with a rotated user agent
//! - Retrying transient failures with exponential backoff
//! - Bounding simultaneous requests with a shared semaphore
//! - Classifying failures (network, HTTP, timeout, decode)

mod client;
mod result;
mod session;

pub use client::{backoff_schedule, build_http_client, pick_user_agent, MAX_REDIRECTS};
pub use result::{FetchErrorKind, FetchFailure, FetchResult};
pub use session::Fetcher;
