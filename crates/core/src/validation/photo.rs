//! Photo URL format validation and the live reachability probe seam.

use std::future::Future;
use std::sync::OnceLock;

use regex::Regex;

/// Absolute http(s) URL with a domain, `localhost` or IPv4 host, optional
/// port and optional path/query.
const PHOTO_URL_PATTERN: &str = concat!(
    r"(?i)^https?://",
    r"(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?",
    r"|localhost",
    r"|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})",
    r"(?::\d+)?",
    r"(?:/?|[/?]\S+)$",
);

fn photo_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHOTO_URL_PATTERN).expect("photo URL pattern is valid"))
}

/// Whether `url` is a well-formed absolute http(s) URL with a host.
pub fn is_valid_photo_url(url: &str) -> bool {
    photo_url_regex().is_match(url)
}

// ---------------------------------------------------------------------------
// Probe
// ---------------------------------------------------------------------------

/// Status and content type returned by a HEAD request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub content_type: Option<String>,
}

impl ProbeResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.trim_start().starts_with("image/"))
    }
}

/// Why a probe produced no response.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("{0}")]
    Request(String),
}

/// Issues a bounded HEAD request against a photo URL.
///
/// Implementations must enforce their own timeout; failures are reported as
/// [`ProbeError`] and never abort validation.
pub trait PhotoProbe: Send + Sync {
    fn head(&self, url: &str) -> impl Future<Output = Result<ProbeResponse, ProbeError>> + Send;
}
