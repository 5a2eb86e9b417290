// src/error.rs
// =============================================================================
// Error types for the crawl engine.
//
// The crawler distinguishes a few failure classes because each one is handled
// differently:
// - ParseError: a single malformed link. Drop it and keep going.
// - Probe / Fetch: one URL could not be retrieved. Log it, abandon that URL.
// - BackendUnavailable: the Redis frontier or dedup set cannot be reached at
//   startup. The crawl cannot begin.
// - Backend: a backend call failed mid-crawl.
//
// Rust concepts:
// - thiserror: derives std::error::Error and Display from attributes
// - #[from]: lets `?` convert one error type into another automatically
// =============================================================================

use thiserror::Error;

/// Why a raw string could not be turned into a canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The string contains a character that is never legal in a URI
    #[error("illegal character {ch:?} in URL '{url}'")]
    InvalidCharacter { url: String, ch: char },

    /// The URL parser rejected the string (relative URL, bad port, ...)
    #[error("cannot parse URL '{url}': {reason}")]
    Invalid { url: String, reason: String },

    /// Syntactically valid, but there is no host to crawl (mailto:, data:, ...)
    #[error("URL '{0}' has no host")]
    MissingHost(String),
}

/// How a single HTTP request failed.
///
/// Mirrors the categories a link checker reports so log lines stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestFailure {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed")]
    Connect,
    #[error("too many redirects")]
    TooManyRedirects,
    #[error("HTTP {0}")]
    Status(u16),
    #[error("{0}")]
    Other(String),
}

/// Every error the crawl engine can surface.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("probe of {url} failed: {reason}")]
    Probe { url: String, reason: RequestFailure },

    #[error("fetch of {url} failed: {reason}")]
    Fetch { url: String, reason: RequestFailure },

    #[error("{backend} is unavailable: {source}")]
    BackendUnavailable {
        backend: &'static str,
        #[source]
        source: redis::RedisError,
    },

    #[error("{backend} operation failed: {source}")]
    Backend {
        backend: &'static str,
        #[source]
        source: redis::RedisError,
    },
}

impl CrawlError {
    /// True for errors that end a crawl before it starts.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CrawlError::BackendUnavailable { .. } | CrawlError::Parse(_))
    }
}
