use std::fmt;
use thiserror::Error;

/// Broad classification of a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    NetworkError,
    HttpError,
    Timeout,
    ParseError,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NetworkError => "network error",
            Self::HttpError => "http error",
            Self::Timeout => "timeout",
            Self::ParseError => "parse error",
        };
        f.write_str(name)
    }
}

/// Why a fetch did not produce a body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// DNS failure, connection refused/reset, TLS handshake failure
    #[error("Network error: {detail}")]
    Network { detail: String },

    /// Terminal non-2xx response
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// The request did not complete within its time budget
    #[error("Request timed out: {detail}")]
    Timeout { detail: String },

    /// The body could not be decoded as text
    #[error("Failed to decode response: {detail}")]
    Parse { detail: String },
}

impl FetchFailure {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Network { .. } => FetchErrorKind::NetworkError,
            Self::Http { .. } => FetchErrorKind::HttpError,
            Self::Timeout { .. } => FetchErrorKind::Timeout,
            Self::Parse { .. } => FetchErrorKind::ParseError,
        }
    }

    /// HTTP status, for `Http` failures
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if another attempt may succeed
    ///
    /// | Failure | Retried |
    /// |---------|---------|
    /// | Network error | yes |
    /// | Timeout | yes |
    /// | HTTP 5xx | yes |
    /// | HTTP 4xx / other non-2xx | no |
    /// | Undecodable body | no |
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            Self::Parse { .. } => false,
        }
    }
}

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Successfully fetched the resource
    Success {
        /// HTTP status code
        status: u16,
        /// Decoded body
        body: String,
        /// Final URL after redirects
        final_url: String,
        /// Content-Type header value, if any
        content_type: Option<String>,
    },

    /// Every attempt failed; carries the last failure
    Failure(FetchFailure),
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the body of a successful fetch
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Success { body, .. } => Some(body),
            Self::Failure(_) => None,
        }
    }

    /// Converts into a `Result`, keeping only the body
    pub fn into_body(self) -> Result<String, FetchFailure> {
        match self {
            Self::Success { body, .. } => Ok(body),
            Self::Failure(failure) => Err(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let network = FetchFailure::Network {
            detail: "refused".into(),
        };
        let timeout = FetchFailure::Timeout {
            detail: "10s".into(),
        };
        let server = FetchFailure::Http {
            status: 503,
            detail: "Service Unavailable".into(),
        };
        let missing = FetchFailure::Http {
            status: 404,
            detail: "Not Found".into(),
        };
        let parse = FetchFailure::Parse {
            detail: "invalid utf-8".into(),
        };

        assert!(network.is_transient());
        assert!(timeout.is_transient());
        assert!(server.is_transient());
        assert!(!missing.is_transient());
        assert!(!parse.is_transient());
    }

    #[test]
    fn test_kind_and_status() {
        let failure = FetchFailure::Http {
            status: 403,
            detail: "Forbidden".into(),
        };
        assert_eq!(failure.kind(), FetchErrorKind::HttpError);
        assert_eq!(failure.status(), Some(403));
        assert_eq!(failure.to_string(), "HTTP 403: Forbidden");
    }

    #[test]
    fn test_into_body() {
        let ok = FetchResult::Success {
            status: 200,
            body: "User-agent: *".into(),
            final_url: "https://example.com/robots.txt".into(),
            content_type: Some("text/plain".into()),
        };
        assert_eq!(ok.body(), Some("User-agent: *"));
        assert_eq!(ok.into_body().unwrap(), "User-agent: *");

        let failed = FetchResult::Failure(FetchFailure::Timeout {
            detail: "slow".into(),
        });
        assert!(!failed.is_success());
        assert!(failed.into_body().is_err());
    }
}
