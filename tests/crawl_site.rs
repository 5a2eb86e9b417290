// tests/crawl_site.rs
// =============================================================================
// End-to-end crawls against a local mockito HTTP server, using the real
// reqwest/scraper web client and the in-memory backends.
// =============================================================================

use mockito::{Mock, ServerGuard};
use site_crawler::client::HttpWebClient;
use site_crawler::dedup::LocalDedupSet;
use site_crawler::frontier::LocalFrontier;
use site_crawler::{CrawlOptions, CrawlReport, CrawlState, Crawler};
use std::sync::Arc;
use std::time::Duration;

async fn html_page(server: &mut ServerGuard, path: &str, body: &str) -> (Mock, Mock) {
    let head = server
        .mock("HEAD", path)
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .create_async()
        .await;
    let get = server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(body)
        .create_async()
        .await;
    (head, get)
}

async fn crawl(seed: &str) -> (Crawler, CrawlReport) {
    let client = HttpWebClient::new(Duration::from_secs(5)).unwrap();
    let crawler = Crawler::new(
        seed,
        Arc::new(LocalFrontier::new()),
        Arc::new(LocalDedupSet::new()),
        Arc::new(client),
        CrawlOptions {
            workers: 4,
            ..CrawlOptions::default()
        },
    )
    .await
    .unwrap();

    let report = tokio::time::timeout(Duration::from_secs(20), crawler.crawl())
        .await
        .expect("crawl did not terminate")
        .unwrap();
    (crawler, report)
}

#[tokio::test]
async fn test_two_page_site_is_fully_crawled() {
    let mut server = mockito::Server::new_async().await;
    let _page1 = html_page(
        &mut server,
        "/page1",
        r#"<html><body>
            <a href="/page2">Page 2</a>
            <a href="/page2/#top">Page 2 again</a>
            <a href="https://elsewhere.example/">External</a>
        </body></html>"#,
    )
    .await;
    let _page2 = html_page(&mut server, "/page2", "<html><body>The end</body></html>").await;

    let base = server.url();
    let (crawler, report) = crawl(&format!("{}/page1", base)).await;

    assert_eq!(
        report.visited,
        vec![format!("{}/page1", base), format!("{}/page2", base)]
    );
    assert_eq!(report.discovered, 2);
    assert!(report.failed.is_empty());
    assert_eq!(crawler.state(), CrawlState::Terminated);
}

#[tokio::test]
async fn test_broken_and_binary_pages_are_tolerated() {
    let mut server = mockito::Server::new_async().await;
    let _root = html_page(
        &mut server,
        "/",
        r#"<a href="/broken">Broken</a>
           <a href="/download">Download</a>
           <a href="/fine">Fine</a>"#,
    )
    .await;
    let _fine = html_page(&mut server, "/fine", "<p>ok</p>").await;

    let _broken_head = server
        .mock("HEAD", "/broken")
        .with_status(200)
        .with_header("content-type", "text/html")
        .create_async()
        .await;
    let _broken_get = server
        .mock("GET", "/broken")
        .with_status(500)
        .create_async()
        .await;

    let _download_head = server
        .mock("HEAD", "/download")
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .create_async()
        .await;
    let download_get = server
        .mock("GET", "/download")
        .expect(0)
        .create_async()
        .await;

    let base = server.url();
    let (_, report) = crawl(&format!("{}/", base)).await;

    assert_eq!(report.visited, vec![base.clone(), format!("{}/fine", base)]);
    assert_eq!(report.failed, vec![format!("{}/broken", base)]);
    assert_eq!(report.skipped, vec![format!("{}/download", base)]);
    assert_eq!(report.discovered, 4);
    download_get.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_seed_terminates_cleanly() {
    // Nothing listens on port 1
    let (_, report) = crawl("http://127.0.0.1:1/start").await;

    assert!(report.visited.is_empty());
    assert!(report.failed.is_empty());
    assert_eq!(report.skipped, vec!["http://127.0.0.1:1/start"]);
    assert_eq!(report.discovered, 1);
}
