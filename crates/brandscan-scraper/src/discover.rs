//! Page discovery for one site: sitemaps first, breadth-first crawl as the
//! fallback.

use std::collections::{BTreeSet, HashSet, VecDeque};

use reqwest::Url;

use crate::fetch::PageFetcher;
use crate::html::extract_links;
use crate::sitemap::{
    is_robots_path, looks_like_sitemap, parse_robots_sitemaps, parse_sitemap_locs,
    SITEMAP_PROBE_PATHS,
};
use crate::urls::same_origin;

/// Resolves the in-scope page URLs of a site.
///
/// Fetch failures are absorbed: a sitemap or page that cannot be fetched
/// contributes nothing and discovery continues.
pub struct SiteDiscoverer<'a, F> {
    fetcher: &'a F,
    page_budget: usize,
    exclude_substrings: Vec<String>,
}

impl<'a, F: PageFetcher> SiteDiscoverer<'a, F> {
    #[must_use]
    pub fn new(fetcher: &'a F, page_budget: usize) -> Self {
        Self {
            fetcher,
            page_budget,
            exclude_substrings: Vec::new(),
        }
    }

    /// Drop discovered URLs containing any of `substrings`.
    #[must_use]
    pub fn with_excludes(mut self, substrings: Vec<String>) -> Self {
        self.exclude_substrings = substrings
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    /// Sorted, duplicate-free page URLs for `site` (an origin root as
    /// returned by [`crate::urls::normalize_site`]).
    pub async fn discover(&self, site: &Url) -> Vec<Url> {
        let mut pages = self.from_sitemaps(site).await;
        let source = if pages.is_empty() {
            pages = self.crawl(site).await;
            "crawl"
        } else {
            "sitemap"
        };

        let found = pages.len();
        let kept: Vec<Url> = pages
            .into_iter()
            .filter(|u| !self.is_excluded(u.as_str()))
            .collect();

        tracing::info!(
            site = %site,
            source,
            found,
            excluded = found - kept.len(),
            kept = kept.len(),
            "discovery complete"
        );
        kept
    }

    fn is_excluded(&self, url: &str) -> bool {
        self.exclude_substrings
            .iter()
            .any(|s| url.contains(s.as_str()))
    }

    /// Probes the conventional sitemap paths, then any sitemap named by
    /// `robots.txt`. Entries that are themselves sitemaps are followed one
    /// level deep.
    async fn from_sitemaps(&self, site: &Url) -> BTreeSet<Url> {
        let mut pages = BTreeSet::new();
        let mut fetched: HashSet<Url> = HashSet::new();
        let mut from_robots: Vec<Url> = Vec::new();

        for path in SITEMAP_PROBE_PATHS {
            let Ok(url) = site.join(path) else {
                continue;
            };
            if !fetched.insert(url.clone()) {
                continue;
            }
            let Some(body) = self.fetcher.fetch(url.as_str()).await else {
                continue;
            };

            if is_robots_path(path) {
                from_robots.extend(parse_robots_sitemaps(&body, site));
            } else {
                tracing::debug!(url = %url, "sitemap found");
                self.read_sitemap(site, &body, &mut fetched, &mut pages)
                    .await;
            }
        }

        for url in from_robots {
            if !fetched.insert(url.clone()) {
                continue;
            }
            let Some(body) = self.fetcher.fetch(url.as_str()).await else {
                continue;
            };
            tracing::debug!(url = %url, "sitemap found via robots.txt");
            self.read_sitemap(site, &body, &mut fetched, &mut pages)
                .await;
        }

        pages
    }

    async fn read_sitemap(
        &self,
        site: &Url,
        body: &str,
        fetched: &mut HashSet<Url>,
        pages: &mut BTreeSet<Url>,
    ) {
        for loc in parse_sitemap_locs(body) {
            let Ok(url) = site.join(&loc) else {
                continue;
            };
            if !looks_like_sitemap(&url) {
                insert_page(url, site, pages);
                continue;
            }

            if !fetched.insert(url.clone()) {
                continue;
            }
            let Some(nested) = self.fetcher.fetch(url.as_str()).await else {
                continue;
            };
            for inner in parse_sitemap_locs(&nested) {
                let Ok(inner_url) = site.join(&inner) else {
                    continue;
                };
                // Nesting stops here.
                if looks_like_sitemap(&inner_url) {
                    continue;
                }
                insert_page(inner_url, site, pages);
            }
        }
    }

    /// FIFO crawl from the site root. The budget counts attempted visits;
    /// only pages that were fetched successfully are returned.
    async fn crawl(&self, site: &Url) -> BTreeSet<Url> {
        let mut pages = BTreeSet::new();
        let mut queue: VecDeque<Url> = VecDeque::from([site.clone()]);
        let mut seen: HashSet<Url> = HashSet::from([site.clone()]);
        let mut visited = 0usize;

        while visited < self.page_budget {
            let Some(url) = queue.pop_front() else {
                break;
            };
            visited += 1;

            let Some(body) = self.fetcher.fetch(url.as_str()).await else {
                continue;
            };
            for link in extract_links(&body, &url, site) {
                if seen.insert(link.clone()) {
                    queue.push_back(link);
                }
            }
            pages.insert(url);
        }

        tracing::debug!(site = %site, visited, fetched = pages.len(), "crawl finished");
        pages
    }
}

fn insert_page(mut url: Url, site: &Url, pages: &mut BTreeSet<Url>) {
    url.set_fragment(None);
    if same_origin(&url, site) {
        pages.insert(url);
    }
}

#[cfg(test)]
#[path = "discover_test.rs"]
mod tests;
