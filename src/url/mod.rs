//! URL handling module for LLMO-Audit
//!
//! This module provides URL normalization, domain extraction and the
//! immutable [`AnalysisTarget`] every audit run is keyed on.

mod domain;
mod normalize;

use crate::UrlResult;
use ::url::Url;
use serde::{Serialize, Serializer};
use std::fmt;

// Re-export main functions
pub use domain::{extract_domain, site_key};
pub use normalize::normalize_url;

/// The normalized URL of the page being audited
///
/// Created once at the start of a run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTarget {
    url: Url,
}

impl AnalysisTarget {
    /// Parses and normalizes a user-supplied URL
    ///
    /// # Examples
    ///
    /// ```
    /// use llmo_audit::AnalysisTarget;
    ///
    /// let target = AnalysisTarget::parse("https://Example.com/blog?utm_medium=x").unwrap();
    /// assert_eq!(target.as_str(), "https://example.com/blog");
    /// assert_eq!(target.host(), "example.com");
    /// ```
    pub fn parse(url_str: &str) -> UrlResult<Self> {
        Ok(Self {
            url: normalize_url(url_str)?,
        })
    }

    /// Returns the normalized URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the normalized URL as a string slice
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Returns the lowercase host
    pub fn host(&self) -> &str {
        // normalize_url rejects host-less URLs
        self.url.host_str().unwrap_or_default()
    }

    /// Resolves an absolute path (e.g. `/robots.txt`) against the target's origin
    pub fn origin_join(&self, path: &str) -> UrlResult<Url> {
        self.url
            .join(path)
            .map_err(|e| crate::UrlError::Parse(e.to_string()))
    }

    /// Resolves a link found on the page against the target URL
    ///
    /// Returns None for empty, fragment-only and non-resolvable hrefs.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }
        self.url.join(href).ok()
    }

    /// Returns true if `url` points at the same site as the target
    ///
    /// Hosts are compared case-insensitively, ignoring a leading `www.`.
    /// URLs without a host (mailto:, tel:) are never the same site.
    pub fn is_same_site(&self, url: &Url) -> bool {
        match extract_domain(url) {
            Some(host) => site_key(&host) == site_key(self.host()),
            None => false,
        }
    }
}

impl Serialize for AnalysisTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for AnalysisTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
