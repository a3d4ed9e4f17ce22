//! Markup extraction: visible text, title, link targets, heading/list/link
//! snippets, and embedded JSON-LD product records.
//!
//! `scraper::Html` is not `Send`, so every function here parses and drops the
//! document synchronously; callers only hold owned strings across awaits.

use std::sync::LazyLock;

use reqwest::Url;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::urls::resolve_in_site;

static SCRIPT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script[type]").expect("valid selector"));
static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
static SNIPPET_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, strong, b, li, a").expect("valid selector")
});
static OG_TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:title"]"#).expect("valid selector")
});
static TWITTER_TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="twitter:title"], meta[property="twitter:title"]"#)
        .expect("valid selector")
});
static H1_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// A `(brand, name)` pair read from a schema.org `Product` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredProduct {
    /// `None` when the node has no usable brand.
    pub brand: Option<String>,
    pub name: String,
}

/// Everything the matcher needs from one fetched page.
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub url: String,
    pub raw_markup: String,
    /// Markup-free text with whitespace collapsed to single spaces.
    pub visible_text: String,
    pub title: String,
    /// Text of heading, emphasis, list-item and link elements.
    pub snippets: Vec<String>,
    pub structured_products: Vec<StructuredProduct>,
}

impl PageRecord {
    /// Parses `markup`. Structured products are only read when
    /// `read_structured` is set.
    #[must_use]
    pub fn parse(url: &str, markup: String, read_structured: bool) -> Self {
        let document = Html::parse_document(&markup);
        let visible_text = visible_text(&document);
        let title = title_guess(&document);
        let snippets = markup_snippets(&document);
        let structured_products = if read_structured {
            products_in(&document)
        } else {
            Vec::new()
        };
        drop(document);

        Self {
            url: url.to_string(),
            raw_markup: markup,
            visible_text,
            title,
            snippets,
            structured_products,
        }
    }
}

/// Collapse every whitespace run to one space and trim.
#[must_use]
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn visible_text(document: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            parts.push(text);
        }
    }
    collapse_whitespace(&parts.join(" "))
}

/// First non-empty of `og:title`, `twitter:title`, the first `<h1>`, and
/// `<title>`.
fn title_guess(document: &Html) -> String {
    let meta_content = |sel: &Selector| {
        document
            .select(sel)
            .filter_map(|e| e.value().attr("content"))
            .map(collapse_whitespace)
            .find(|s| !s.is_empty())
    };
    let element_text = |sel: &Selector| {
        document
            .select(sel)
            .map(|e| collapse_whitespace(&e.text().collect::<Vec<_>>().join(" ")))
            .find(|s| !s.is_empty())
    };

    meta_content(&OG_TITLE_SEL)
        .or_else(|| meta_content(&TWITTER_TITLE_SEL))
        .or_else(|| element_text(&H1_SEL))
        .or_else(|| element_text(&TITLE_SEL))
        .unwrap_or_default()
}

fn markup_snippets(document: &Html) -> Vec<String> {
    document
        .select(&SNIPPET_SEL)
        .map(|e| collapse_whitespace(&e.text().collect::<Vec<_>>().join(" ")))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Same-origin anchor targets of a page, fragment-stripped, in document
/// order. Pure fragment, `mailto:`, `tel:` and `javascript:` links are
/// skipped.
#[must_use]
pub fn extract_links(markup: &str, page: &Url, site: &Url) -> Vec<Url> {
    let document = Html::parse_document(markup);
    document
        .select(&ANCHOR_SEL)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| {
            let lower = href.to_ascii_lowercase();
            !href.is_empty()
                && !href.starts_with('#')
                && !lower.starts_with("mailto:")
                && !lower.starts_with("tel:")
                && !lower.starts_with("javascript:")
        })
        .filter_map(|href| resolve_in_site(href, page, site))
        .collect()
}

/// `Product` nodes from every `application/ld+json` block.
///
/// A block that is not valid JSON is skipped; other blocks on the page are
/// still read.
#[must_use]
pub fn structured_products(markup: &str) -> Vec<StructuredProduct> {
    products_in(&Html::parse_document(markup))
}

fn products_in(document: &Html) -> Vec<StructuredProduct> {
    let mut out = Vec::new();
    let blocks = document.select(&SCRIPT_SEL).filter(|script| {
        script
            .value()
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
    });
    for script in blocks {
        let raw = script.text().collect::<String>();
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => collect_products(&value, &mut out),
            Err(e) => tracing::debug!(error = %e, "skipping malformed JSON-LD block"),
        }
    }
    out
}

fn collect_products(value: &Value, out: &mut Vec<StructuredProduct>) {
    match value {
        Value::Object(map) => {
            if is_product_type(map.get("@type")) {
                let name = map
                    .get("name")
                    .and_then(Value::as_str)
                    .map(collapse_whitespace)
                    .unwrap_or_default();
                if !name.is_empty() {
                    out.push(StructuredProduct {
                        brand: brand_name(map.get("brand")),
                        name,
                    });
                }
            }
            for child in map.values() {
                collect_products(child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_products(item, out);
            }
        }
        _ => {}
    }
}

/// `@type` may be a plain string or an array of strings.
fn is_product_type(type_node: Option<&Value>) -> bool {
    match type_node {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("product"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s.eq_ignore_ascii_case("product")),
        _ => false,
    }
}

fn brand_name(brand: Option<&Value>) -> Option<String> {
    let raw = match brand? {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("name").and_then(Value::as_str)?,
        _ => return None,
    };
    let cleaned = collapse_whitespace(raw);
    (!cleaned.is_empty()).then_some(cleaned)
}

#[cfg(test)]
#[path = "html_test.rs"]
mod tests;
