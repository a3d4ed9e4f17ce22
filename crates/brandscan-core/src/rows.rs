use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One page on which a brand/product was found.
///
/// Field order is significant: the derived `Ord` sorts by brand, product,
/// then url, which is the finalized presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchRow {
    pub brand: String,
    pub product: String,
    pub url: String,
    /// Best-guess page title, empty when the page exposes none.
    pub title: String,
}

impl MatchRow {
    /// Key used for at-most-once aggregation across workers.
    #[must_use]
    pub fn unique_key(&self) -> (String, String, String) {
        (self.brand.clone(), self.product.clone(), self.url.clone())
    }
}

/// Number of distinct pages per brand/product pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub brand: String,
    pub product: String,
    pub pages_found: usize,
}

/// Count distinct URLs per `(brand, product)`, ordered by brand then product.
#[must_use]
pub fn summarize(rows: &[MatchRow]) -> Vec<ProductSummary> {
    let mut pages: BTreeMap<(&str, &str), BTreeSet<&str>> = BTreeMap::new();
    for row in rows {
        pages
            .entry((row.brand.as_str(), row.product.as_str()))
            .or_default()
            .insert(row.url.as_str());
    }

    pages
        .into_iter()
        .map(|((brand, product), urls)| ProductSummary {
            brand: brand.to_string(),
            product: product.to_string(),
            pages_found: urls.len(),
        })
        .collect()
}
