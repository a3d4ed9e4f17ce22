pub mod cache;
pub mod candidates;
pub mod canonical;
pub mod discover;
pub mod error;
pub mod fetch;
pub mod html;
pub mod matcher;
pub(crate) mod rate_limit;
pub mod scan;
pub mod sitemap;
pub mod urls;

#[cfg(test)]
mod test_support;

pub use cache::ResultCache;
pub use candidates::{clean_phrase, extract_candidates, CandidateRules, PhraseShapes};
pub use canonical::{canonical_display, canonical_key, dedup_global, dedup_per_page, Canonicalizer};
pub use discover::SiteDiscoverer;
pub use error::ScraperError;
pub use fetch::{HttpFetcher, PageFetcher};
pub use html::{PageRecord, StructuredProduct};
pub use matcher::{compile_matcher, CompiledCatalog};
pub use scan::{ScanProgress, ScanRequest, ScanResult, Scanner};
pub use urls::{normalize_site, normalize_sites};
