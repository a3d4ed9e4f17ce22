//! Scan orchestration: validate the request, discover pages per site, fetch
//! and match pages with bounded concurrency, fold rows at a single consumer,
//! then canonicalize and summarize.

use std::collections::{BTreeSet, HashSet};

use brandscan_core::{
    summarize, CatalogEntry, MatchRow, ProductSummary, ScanOptions, UNKNOWN_BRAND,
};
use futures::stream::{self, StreamExt};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::candidates::{extract_candidates, CandidateRules};
use crate::canonical::{dedup_global, dedup_per_page, Canonicalizer};
use crate::discover::SiteDiscoverer;
use crate::error::ScraperError;
use crate::fetch::PageFetcher;
use crate::html::PageRecord;
use crate::matcher::{CompiledCatalog, CompiledMatcher};
use crate::urls::normalize_sites;

/// Everything that determines the outcome of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Site origins as entered; comma-separated values are split.
    pub sites: Vec<String>,
    pub catalog: Vec<CatalogEntry>,
    #[serde(default)]
    pub options: ScanOptions,
}

impl ScanRequest {
    /// SHA-256 hex digest of the request's JSON form. Equal requests share a
    /// key, so the key identifies a cached [`ScanResult`].
    #[must_use]
    pub fn cache_key(&self) -> String {
        let encoded =
            serde_json::to_vec(self).unwrap_or_else(|_| format!("{self:?}").into_bytes());
        format!("{:x}", Sha256::digest(&encoded))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Sorted by brand, product, url.
    pub rows: Vec<MatchRow>,
    pub summary: Vec<ProductSummary>,
    /// In-scope URLs after exclusion, across all sites.
    pub pages_discovered: usize,
    /// Pages that were fetched successfully.
    pub pages_scanned: usize,
}

/// Reported once per page, in completion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    pub completed: usize,
    pub total: usize,
}

/// Runs scans against a [`PageFetcher`].
pub struct Scanner<'a, F> {
    fetcher: &'a F,
}

impl<'a, F: PageFetcher> Scanner<'a, F> {
    #[must_use]
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    /// Runs `request` to completion.
    ///
    /// # Errors
    ///
    /// Fails before any network activity with [`ScraperError::NoSites`] or
    /// [`ScraperError::InvalidSiteUrl`] when no site normalizes, with
    /// [`ScraperError::EmptyCatalog`] for an empty catalog, and with a pattern
    /// error when a catalog matcher cannot be compiled. Fetch and parse
    /// failures never surface here.
    pub async fn run(&self, request: &ScanRequest) -> Result<ScanResult, ScraperError> {
        self.run_with_progress(request, |_| {}).await
    }

    /// Like [`Scanner::run`], calling `on_progress` after every page.
    ///
    /// # Errors
    ///
    /// See [`Scanner::run`].
    pub async fn run_with_progress(
        &self,
        request: &ScanRequest,
        on_progress: impl FnMut(ScanProgress),
    ) -> Result<ScanResult, ScraperError> {
        let options = &request.options;
        let sites = normalize_sites(&request.sites)?;
        let catalog = CompiledCatalog::compile(&request.catalog, options.case_sensitive)?;

        let mut urls = Vec::new();
        for site in &sites {
            let pages = SiteDiscoverer::new(self.fetcher, options.page_budget)
                .with_excludes(options.exclude_substrings.clone())
                .discover(site)
                .await;
            urls.extend(pages);
        }

        tracing::info!(
            sites = sites.len(),
            pages = urls.len(),
            entries = catalog.len(),
            "starting scan"
        );
        Ok(self.scan_urls(urls, &catalog, options, on_progress).await)
    }

    /// Fetches and matches an explicit URL list, skipping discovery.
    pub async fn scan_urls(
        &self,
        urls: Vec<Url>,
        catalog: &CompiledCatalog,
        options: &ScanOptions,
        mut on_progress: impl FnMut(ScanProgress),
    ) -> ScanResult {
        let total = urls.len();
        let matcher = PageMatcher::new(catalog, options);
        let matcher = &matcher;
        let fetcher = self.fetcher;

        let mut pages = stream::iter(urls)
            .map(|url| async move {
                let Some(body) = fetcher.fetch(url.as_str()).await else {
                    return None;
                };
                let page = PageRecord::parse(url.as_str(), body, options.auto_detect);
                Some(matcher.match_page(&page))
            })
            .buffer_unordered(options.workers.max(1));

        let mut results = ResultSet::default();
        let mut completed = 0usize;
        let mut scanned = 0usize;
        while let Some(outcome) = pages.next().await {
            completed += 1;
            if let Some(rows) = outcome {
                scanned += 1;
                results.extend(rows);
            }
            tracing::info!(completed, total, "scan progress");
            on_progress(ScanProgress { completed, total });
        }

        let rows = results.finalize(options, &matcher.canon);
        let summary = summarize(&rows);
        if rows.is_empty() {
            tracing::info!(pages = scanned, "no product matches found");
        }
        ScanResult {
            rows,
            summary,
            pages_discovered: total,
            pages_scanned: scanned,
        }
    }
}

/// Rows accumulated so far, unique by `(brand, product, url)`.
#[derive(Debug, Default)]
struct ResultSet {
    seen: HashSet<(String, String, String)>,
    rows: Vec<MatchRow>,
}

impl ResultSet {
    fn extend(&mut self, rows: Vec<MatchRow>) {
        for row in rows {
            if self.seen.insert(row.unique_key()) {
                self.rows.push(row);
            }
        }
    }

    fn finalize(self, options: &ScanOptions, canon: &Canonicalizer) -> Vec<MatchRow> {
        let mut rows = self.rows;
        rows.sort();
        if options.collapse_variants {
            rows = dedup_global(rows, canon);
        }
        if options.dedupe_per_url {
            rows = dedup_per_page(rows, canon);
        }
        rows.sort();
        rows
    }
}

/// Per-scan matching state shared read-only by every in-flight page.
struct PageMatcher<'c> {
    catalog: &'c CompiledCatalog,
    options: &'c ScanOptions,
    rules: CandidateRules,
    canon: Canonicalizer,
}

impl<'c> PageMatcher<'c> {
    fn new(catalog: &'c CompiledCatalog, options: &'c ScanOptions) -> Self {
        let canon = Canonicalizer::for_brands(catalog.entries().map(|(_, e)| e.brand.as_str()));
        Self {
            catalog,
            options,
            rules: CandidateRules::from_options(options),
            canon,
        }
    }

    fn match_page(&self, page: &PageRecord) -> Vec<MatchRow> {
        let mut rows = Vec::new();
        for (id, entry) in self.catalog.entries() {
            let matcher = self.catalog.matcher(id);
            if entry.brand_only {
                self.match_brand_only(page, entry, matcher, &mut rows);
            } else {
                self.match_named(page, entry, matcher, &mut rows);
            }
        }
        rows
    }

    fn match_named(
        &self,
        page: &PageRecord,
        entry: &CatalogEntry,
        matcher: &CompiledMatcher,
        rows: &mut Vec<MatchRow>,
    ) {
        let text = page.visible_text.as_str();
        if !matcher.matches_name(text) {
            return;
        }

        let require_brand = self.options.require_brand_and_product;
        if require_brand && !entry.has_unknown_brand() && !matcher.matches_brand(text) {
            return;
        }

        let brand = if entry.has_unknown_brand() || !require_brand {
            structured_brand(page, matcher).unwrap_or_else(|| entry.brand.clone())
        } else {
            entry.brand.clone()
        };
        let product = self.canonicalize(&brand, &entry.name);
        push_row(rows, page, brand, product);
    }

    fn match_brand_only(
        &self,
        page: &PageRecord,
        entry: &CatalogEntry,
        matcher: &CompiledMatcher,
        rows: &mut Vec<MatchRow>,
    ) {
        let text = page.visible_text.as_str();
        if !matcher.matches_brand(text) {
            return;
        }
        let Some(shapes) = matcher.shapes.as_ref() else {
            return;
        };

        let mut names: BTreeSet<String> = self
            .catalog
            .named_for_brand(&entry.brand)
            .iter()
            .filter(|named| self.catalog.matcher(named.id).matches_name(text))
            .map(|named| named.name.clone())
            .collect();

        for phrase in extract_candidates(page, &entry.brand, shapes, &self.rules) {
            names.insert(self.canonicalize(&entry.brand, &phrase));
        }

        for product in names.into_iter().filter(|n| !n.trim().is_empty()) {
            push_row(rows, page, entry.brand.clone(), product);
        }
    }

    /// A phrase matched by a named catalog entry of `brand` becomes that
    /// entry's name; anything else is reduced to its display form when
    /// variants are collapsed.
    fn canonicalize(&self, brand: &str, phrase: &str) -> String {
        let phrase = phrase.trim();
        for named in self.catalog.named_for_brand(brand) {
            if self.catalog.matcher(named.id).matches_name(phrase) {
                return named.name.clone();
            }
        }
        if self.options.collapse_variants {
            self.canon.display(brand, phrase)
        } else {
            phrase.to_string()
        }
    }
}

/// Brand of the first structured product whose name the entry's matchers
/// accept.
fn structured_brand(page: &PageRecord, matcher: &CompiledMatcher) -> Option<String> {
    page.structured_products
        .iter()
        .filter(|p| !p.name.trim().is_empty() && matcher.matches_name(&p.name))
        .find_map(|p| {
            p.brand
                .as_deref()
                .map(str::trim)
                .filter(|b| !b.is_empty() && *b != UNKNOWN_BRAND)
                .map(str::to_string)
        })
}

fn push_row(rows: &mut Vec<MatchRow>, page: &PageRecord, brand: String, product: String) {
    rows.push(MatchRow {
        brand,
        product,
        url: page.url.clone(),
        title: page.title.clone(),
    });
}

#[cfg(test)]
#[path = "scan_test.rs"]
mod tests;
