// src/links/normalize.rs
// =============================================================================
// Turns a raw URL string into a canonical comparison key.
//
// Canonical form:
//   scheme://host[:port]/path[?query]
// - scheme, host and path are lower-cased
// - the fragment (#...) is dropped
// - any run of trailing '/' on the path is removed
// - the query string is kept exactly as written
// - "%20" in the path becomes a literal space; every other escape stays
//   encoded, so "%23" never turns back into a fragment marker
//
// So all of these are the same page:
//   https://X.com/a/#frag  https://x.com/a  https://x.com/a//
//
// Rust concepts:
// - Result<T, E>: invalid input is a ParseError, never an empty string
// - Url (from the url crate): does the actual RFC 3986 parsing
// =============================================================================

use crate::error::ParseError;
use url::Url;

// Characters that may never appear unescaped in a URI.
// The url crate would silently percent-encode these, so we reject them first.
const ILLEGAL_CHARS: &[char] = &['<', '>', '"', '{', '}', '|', '\\', '^', '`'];

/// Canonicalizes `raw` into the crawler's comparison key.
pub fn normalize(raw: &str) -> Result<String, ParseError> {
    // Stray spaces would otherwise make the parse ambiguous
    let prepared = raw.trim().replace(' ', "%20");

    if let Some(ch) = prepared
        .chars()
        .find(|c| ILLEGAL_CHARS.contains(c) || c.is_control())
    {
        return Err(ParseError::InvalidCharacter {
            url: raw.to_string(),
            ch,
        });
    }

    let parsed = Url::parse(&prepared).map_err(|e| ParseError::Invalid {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ParseError::MissingHost(raw.to_string()))?;

    let path = parsed.path().replace("%20", " ");

    let mut canonical = match parsed.port() {
        Some(port) => format!("{}://{}:{}{}", parsed.scheme(), host, port, path),
        None => format!("{}://{}{}", parsed.scheme(), host, path),
    }
    .to_lowercase();

    let trimmed_len = canonical.trim_end_matches('/').len();
    canonical.truncate(trimmed_len);

    if let Some(query) = parsed.query() {
        canonical.push('?');
        canonical.push_str(query);
    }

    Ok(canonical)
}

/// Host component of an already-canonical URL.
pub fn domain_of(canonical: &str) -> Option<String> {
    Url::parse(&canonical.replace(' ', "%20"))
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_case_and_trailing_slash_collapse() {
        let a = normalize("https://X.com/a/#frag").unwrap();
        let b = normalize("https://x.com/a").unwrap();
        let c = normalize("https://x.com/a/").unwrap();
        let d = normalize("HTTPS://x.com/A///").unwrap();
        assert_eq!(a, "https://x.com/a");
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(c, d);
    }

    #[test]
    fn test_root_has_no_trailing_slash() {
        assert_eq!(normalize("http://example.com/").unwrap(), "http://example.com");
        assert_eq!(normalize("http://example.com").unwrap(), "http://example.com");
    }

    #[test]
    fn test_port_is_kept() {
        assert_eq!(
            normalize("http://localhost:8089/page1").unwrap(),
            "http://localhost:8089/page1"
        );
        // default ports are implied by the scheme
        assert_eq!(normalize("http://x.com:80/a").unwrap(), "http://x.com/a");
    }

    #[test]
    fn test_query_is_preserved_verbatim() {
        assert_eq!(
            normalize("https://x.com/Search/?q=MixedCase#top").unwrap(),
            "https://x.com/search?q=MixedCase"
        );
    }

    #[test]
    fn test_space_in_path_is_kept_literally() {
        assert_eq!(
            normalize("https://x.com/my page").unwrap(),
            "https://x.com/my page"
        );
        assert_eq!(
            normalize("https://x.com/my%20page").unwrap(),
            "https://x.com/my page"
        );
    }

    #[test]
    fn test_escaped_reserved_characters_stay_encoded() {
        // %23 is '#', %3C is '<'; decoding them would change what gets fetched
        assert_eq!(normalize("http://x.com/a%23b").unwrap(), "http://x.com/a%23b");
        assert_eq!(normalize("http://x.com/%3Cp%3E").unwrap(), "http://x.com/%3cp%3e");
        assert_ne!(
            normalize("http://x.com/a%23b").unwrap(),
            normalize("http://x.com/a#b").unwrap()
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "https://X.com/a/#frag",
            "http://localhost:8089/Page1/",
            "https://x.com/my%20page",
            "https://x.com/my page/?q=a b",
            "http://x.com/a%23b",
            "http://x.com/%3Cp%3E",
            "http://x.com/caf%C3%A9",
            "http://x.com/100%2520off",
        ];
        for raw in inputs {
            let once = normalize(raw).unwrap();
            let twice = normalize(&once).unwrap();
            assert_eq!(once, twice, "not stable for {}", raw);
        }
    }

    #[test]
    fn test_illegal_character_is_parse_error() {
        let err = normalize("https://x.com/<script>").unwrap_err();
        assert!(matches!(err, ParseError::InvalidCharacter { ch: '<', .. }));
    }

    #[test]
    fn test_relative_url_is_parse_error() {
        assert!(matches!(
            normalize("/just/a/path"),
            Err(ParseError::Invalid { .. })
        ));
    }

    #[test]
    fn test_hostless_url_is_parse_error() {
        assert!(matches!(
            normalize("mailto:someone@example.com"),
            Err(ParseError::MissingHost(_))
        ));
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(
            domain_of("http://localhost:8089/page1"),
            Some("localhost".to_string())
        );
        assert_eq!(domain_of("not a url"), None);
    }
}
