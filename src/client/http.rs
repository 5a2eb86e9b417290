// src/client/http.rs
// =============================================================================
// The production web client, built on reqwest.
//
// Key functionality:
// - probe: HTTP HEAD (lightweight, no body download) to read Content-Type
// - fetch: HTTP GET, then link extraction with scraper
// - Failures are categorized (timeout, connect, redirects, status) so the
//   crawler's log says why a page was abandoned
//
// One reqwest::Client is shared by every worker. Cloning it is cheap (it is
// reference counted internally) and keeps connection pooling effective.
// =============================================================================

use super::{extract_links, ContentType, FetchedPage, WebClient};
use crate::error::{CrawlError, RequestFailure};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

// Follow a handful of redirects, then give up (redirect loops)
const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Clone)]
pub struct HttpWebClient {
    client: Client,
}

impl HttpWebClient {
    /// Creates a client whose requests each time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!("site-crawler/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebClient for HttpWebClient {
    async fn probe(&self, url: &str) -> Result<ContentType, CrawlError> {
        let probe_error = |reason| CrawlError::Probe {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| probe_error(categorize_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(probe_error(RequestFailure::Status(status.as_u16())));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(ContentType(content_type))
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage, CrawlError> {
        let fetch_error = |reason| CrawlError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(categorize_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(RequestFailure::Status(status.as_u16())));
        }

        // Resolve relative links against where we actually ended up
        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| fetch_error(categorize_error(&e)))?;

        Ok(FetchedPage {
            links: extract_links(&html, &final_url),
        })
    }
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - Connection refused / DNS resolution failure
// - Too many redirects
// - An error status while following redirects
fn categorize_error(error: &reqwest::Error) -> RequestFailure {
    if error.is_timeout() {
        RequestFailure::Timeout
    } else if error.is_redirect() {
        RequestFailure::TooManyRedirects
    } else if error.is_connect() {
        RequestFailure::Connect
    } else if let Some(status) = error.status() {
        RequestFailure::Status(status.as_u16())
    } else {
        RequestFailure::Other(error.to_string())
    }
}
