// src/links/mod.rs
// =============================================================================
// URL handling shared by the crawler:
// - normalize: canonical comparison keys for URLs
// - scope: which canonical URLs belong to this crawl
// =============================================================================

mod normalize;
mod scope;

pub use normalize::{domain_of, normalize};
pub use scope::{is_ignored_file, is_in_scope};
