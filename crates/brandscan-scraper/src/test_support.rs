//! In-memory [`PageFetcher`] for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::fetch::PageFetcher;

/// Serves fixed bodies by exact URL and records every request in order.
#[derive(Default)]
pub(crate) struct MapFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MapFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl PageFetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned()
    }
}

pub(crate) fn urlset(locs: &[&str]) -> String {
    let body: String = locs
        .iter()
        .map(|l| format!("<url><loc>{l}</loc></url>"))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{body}</urlset>"#
    )
}

pub(crate) fn sitemap_index(locs: &[&str]) -> String {
    let body: String = locs
        .iter()
        .map(|l| format!("<sitemap><loc>{l}</loc></sitemap>"))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{body}</sitemapindex>"#
    )
}
