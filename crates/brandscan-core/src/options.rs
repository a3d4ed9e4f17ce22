use serde::{Deserialize, Serialize};

use crate::AppConfig;

/// URL substrings excluded from a scan unless the caller overrides them.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "/tag/",
    "/category/",
    "/page/",
    "/feed/",
    "/reviews/",
    "/author/",
];

/// Words that disqualify a derived product phrase.
pub const DEFAULT_IGNORE_WORDS: &[&str] = &[
    "guide",
    "beginners",
    "review",
    "best",
    "top",
    "vs",
    "comparison",
    "peace",
    "actually",
    "lowest",
    "entrance",
];

/// Per-scan knobs. Every field has a default so a partial JSON/YAML
/// document deserializes into a usable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Maximum pages visited by the crawl fallback, per site.
    pub page_budget: usize,
    /// Upper bound on concurrent page fetches during the scan.
    pub workers: usize,
    /// Politeness delay before each request, in milliseconds.
    pub request_delay_ms: u64,
    pub exclude_substrings: Vec<String>,
    pub case_sensitive: bool,
    /// Named entries also need their brand on the page.
    pub require_brand_and_product: bool,
    /// Derived product names are prefixed with the brand when it is absent.
    pub require_brand_in_name: bool,
    pub ignore_words: Vec<String>,
    pub other_brands: Vec<String>,
    pub max_names_per_page: usize,
    pub collapse_variants: bool,
    pub dedupe_per_url: bool,
    /// Read embedded structured product data.
    pub auto_detect: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            page_budget: 800,
            workers: 8,
            request_delay_ms: 100,
            exclude_substrings: to_owned_list(DEFAULT_EXCLUDES),
            case_sensitive: false,
            require_brand_and_product: false,
            require_brand_in_name: true,
            ignore_words: to_owned_list(DEFAULT_IGNORE_WORDS),
            other_brands: Vec::new(),
            max_names_per_page: 12,
            collapse_variants: true,
            dedupe_per_url: true,
            auto_detect: true,
        }
    }
}

impl ScanOptions {
    /// Defaults seeded from the process configuration.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            page_budget: config.page_budget,
            workers: config.workers,
            request_delay_ms: config.request_delay_ms,
            ..Self::default()
        }
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
