// src/client/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, so broken markup still parses
//
// We also use the `url` crate to resolve relative links against the page URL.
//
// Note that no filtering happens here. mailto:, other hosts, images: the
// crawler's scope check decides what to keep.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

// Extracts every link target from HTML content
//
// Parameters:
//   html: the HTML content to parse
//   page_url: the URL the HTML was fetched from (for relative links)
//
// Returns: absolute URLs, in document order, duplicates included
//
// Example:
//   html = "<a href='/docs'>Docs</a>"
//   page_url = "https://example.com/guide"
//   result = ["https://example.com/docs"]
pub fn extract_links(html: &str, page_url: &str) -> Vec<String> {
    let base = match Url::parse(page_url) {
        Ok(url) => url,
        Err(_) => return Vec::new(),
    };

    let document = Html::parse_document(html);

    // The selector is a constant, so parsing it cannot fail
    let selector = Selector::parse("a[href]").expect("a[href] is a valid selector");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(&base, href))
        .collect()
}

// Resolves a possibly-relative href to an absolute URL
//
// Examples (base = "https://example.com/page/"):
//   "/docs"             -> Some("https://example.com/docs")
//   "../other"          -> Some("https://example.com/other")
//   "https://other.com" -> Some("https://other.com/")
//   ""                  -> None
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    // join() handles absolute hrefs too: they simply replace the base
    base.join(href).ok().map(|url| url.to_string())
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why collect duplicates?
//    - A page often links to the same place from the header, body and footer
//    - Dropping them here would just repeat work the dedup set already does
//      atomically across all workers
//
// 2. Why filter_map?
//    - It maps and drops None in one step
//    - Elements without href and unresolvable hrefs both fall out naturally
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<a href="https://www.rust-lang.org">Rust</a>"#;
        let links = extract_links(html, "https://example.com");
        assert_eq!(links, vec!["https://www.rust-lang.org/"]);
    }

    #[test]
    fn test_resolve_relative_link() {
        let html = r#"<a href="/docs">Docs</a>"#;
        let links = extract_links(html, "https://example.com/page");
        assert_eq!(links, vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_keeps_port_of_page() {
        let html = r#"<a href="/page2">Next</a>"#;
        let links = extract_links(html, "http://localhost:8089/page1");
        assert_eq!(links, vec!["http://localhost:8089/page2"]);
    }

    #[test]
    fn test_multiple_links_in_order() {
        let html = r#"
            <a href="https://rust-lang.org">Rust</a>
            <a href="/docs">Docs</a>
            <a href="../about">About</a>
            <a>no href</a>
        "#;
        let links = extract_links(html, "https://example.com/page/");
        assert_eq!(
            links,
            vec![
                "https://rust-lang.org/",
                "https://example.com/docs",
                "https://example.com/about",
            ]
        );
    }

    #[test]
    fn test_malformed_html_still_yields_links() {
        let html = r#"<div><p><a href="/a">A<a href="/b">B</div>"#;
        let links = extract_links(html, "https://example.com");
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_invalid_page_url_yields_nothing() {
        let links = extract_links(r#"<a href="/a">A</a>"#, "not a url");
        assert!(links.is_empty());
    }
}
