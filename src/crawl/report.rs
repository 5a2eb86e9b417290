// src/crawl/report.rs
// =============================================================================
// What a finished crawl hands back, and the two ways the CLI prints it:
// - a human-readable summary
// - pretty JSON (serde_json)
// =============================================================================

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// Canonical seed URL
    pub seed: String,
    /// Host the crawl was restricted to
    pub domain: String,
    /// Pages that were fetched and parsed, sorted
    pub visited: Vec<String>,
    /// Pages that looked like HTML but whose fetch failed; never retried
    pub failed: Vec<String>,
    /// Pages not HTML, or whose HEAD request failed
    pub skipped: Vec<String>,
    /// Distinct URLs admitted to the frontier
    pub discovered: usize,
    pub elapsed_ms: u64,
}

impl CrawlReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Multi-line summary; with `list_urls` every visited URL is appended.
    pub fn summary(&self, list_urls: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("📊 Crawl of {} ({})\n", self.seed, self.domain));
        out.push_str(&format!("   ✅ Visited:    {}\n", self.visited.len()));
        out.push_str(&format!("   ❌ Failed:     {}\n", self.failed.len()));
        out.push_str(&format!("   ⏭️  Skipped:    {}\n", self.skipped.len()));
        out.push_str(&format!("   🔗 Discovered: {}\n", self.discovered));
        out.push_str(&format!(
            "   ⏱️  Elapsed:    {:.1}s\n",
            self.elapsed_ms as f64 / 1000.0
        ));

        for url in &self.failed {
            out.push_str(&format!("   failed: {}\n", url));
        }

        if list_urls {
            out.push('\n');
            for url in &self.visited {
                out.push_str(url);
                out.push('\n');
            }
        }
        out
    }
}
