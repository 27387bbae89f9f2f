use crate::UrlError;
use url::Url;

/// Exact-match tracking query parameters removed during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "source"];

/// Prefixes that mark a query parameter as tracking noise
const TRACKING_PREFIXES: &[&str] = &["utm_", "fb_", "_ga", "ref_"];

/// Normalizes a URL for auditing
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything but `http` and `https`
/// 3. Require a host and lowercase it
/// 4. Remove fragment (everything after #)
/// 5. Remove tracking query parameters, keeping the others in their original order
/// 6. Remove empty query string (trailing ?)
///
/// Unlike a crawler frontier key, the scheme and `www.` prefix are left alone:
/// the audited URL must still be fetchable exactly as the user gave it.
///
/// # Examples
///
/// ```
/// use llmo_audit::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com/post?utm_source=x&id=7#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/post?id=7");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {
            let lowered = host.to_lowercase();
            if lowered != host {
                url.set_host(Some(&lowered))
                    .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;
            }
        }
        _ => return Err(UrlError::MissingDomain),
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    Ok(url)
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || TRACKING_PREFIXES.iter().any(|p| key.starts_with(p))
}
