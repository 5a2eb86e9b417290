// src/links/scope.rs
// =============================================================================
// Decides whether a canonical URL belongs to this crawl.
//
// A URL is in scope when:
// 1. its scheme is http or https
// 2. its host is exactly the seed's host (no subdomains)
// 3. it does not point at a document/image/archive/media file
// =============================================================================

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

// Extensions that are never worth downloading as HTML.
// A trailing query string (?v=2) does not hide the extension.
const IGNORED_EXTENSIONS: &str =
    r"(?i)\.(pdf|jpg|jpeg|png|gif|svg|webp|ico|mp4|mov|avi|zip|gz|tar|rar|exe|dmg|docx?|xlsx?|pptx?|mp3|wav)(\?.*)?$";

fn ignored_extension() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(IGNORED_EXTENSIONS).expect("extension pattern is valid"))
}

/// True if `url` points at a file type the crawler never fetches.
pub fn is_ignored_file(url: &str) -> bool {
    ignored_extension().is_match(url)
}

/// True if `canonical_url` should be crawled when the crawl is scoped to
/// `scope_domain`.
pub fn is_in_scope(canonical_url: &str, scope_domain: &str) -> bool {
    let parsed = match Url::parse(&canonical_url.replace(' ', "%20")) {
        Ok(url) => url,
        Err(_) => return false,
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }

    if parsed.host_str() != Some(scope_domain) {
        return false;
    }

    !is_ignored_file(canonical_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_host_is_in_scope() {
        assert!(is_in_scope("https://example.com/docs", "example.com"));
        assert!(is_in_scope("http://example.com", "example.com"));
        assert!(is_in_scope("http://localhost:8089/page2", "localhost"));
    }

    #[test]
    fn test_other_host_and_subdomain_are_out_of_scope() {
        assert!(!is_in_scope("https://other.com/docs", "example.com"));
        assert!(!is_in_scope("https://blog.example.com/docs", "example.com"));
    }

    #[test]
    fn test_non_http_scheme_is_out_of_scope() {
        assert!(!is_in_scope("ftp://example.com/file", "example.com"));
        assert!(!is_in_scope("ws://example.com/socket", "example.com"));
    }

    #[test]
    fn test_ignored_extensions() {
        assert!(!is_in_scope("https://example.com/report.pdf", "example.com"));
        assert!(!is_in_scope("https://example.com/photo.JPG", "example.com"));
        assert!(!is_in_scope("https://example.com/a.zip?download=1", "example.com"));
        assert!(!is_in_scope("https://example.com/deck.pptx", "example.com"));
        assert!(is_in_scope("https://example.com/pdf-guide", "example.com"));
        assert!(is_in_scope("https://example.com/page.html", "example.com"));
    }

    #[test]
    fn test_garbage_is_out_of_scope() {
        assert!(!is_in_scope("not a url", "example.com"));
    }
}
