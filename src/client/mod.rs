// src/client/mod.rs
// =============================================================================
// The web client is everything the crawler needs from HTTP and HTML:
// - probe: a cheap HEAD request that tells us the content type
// - fetch: download a page and hand back every link on it
//
// The orchestrator is written against the WebClient trait only, so tests can
// swap in a fake site without any network.
//
// Submodules:
// - http: the reqwest-based client used in production
// - html: pulls a[href] links out of an HTML document
// =============================================================================

mod html;
mod http;

pub use html::extract_links;
pub use http::HttpWebClient;

use crate::error::CrawlError;
use async_trait::async_trait;

/// The media type a server reported for a URL, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentType(pub Option<String>);

impl ContentType {
    pub fn new(value: impl Into<String>) -> Self {
        ContentType(Some(value.into()))
    }

    /// True for `text/html`, with or without parameters like `; charset=utf-8`.
    pub fn is_html(&self) -> bool {
        self.0
            .as_deref()
            .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("text/html"))
            .unwrap_or(false)
    }
}

/// What a successful fetch produced.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    /// Every link target on the page, already resolved to an absolute URL
    pub links: Vec<String>,
}

#[async_trait]
pub trait WebClient: Send + Sync {
    /// Looks up the content type without downloading the body.
    async fn probe(&self, url: &str) -> Result<ContentType, CrawlError>;

    /// Downloads the document and extracts its outbound links.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CrawlError>;
}
