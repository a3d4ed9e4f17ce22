//! Canonical product names and the two de-duplication passes run over a
//! finished result set.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use brandscan_core::MatchRow;
use regex::{Regex, RegexBuilder};

use crate::html::collapse_whitespace;
use crate::matcher::bounded_pattern;

/// Connectivity qualifiers that do not distinguish one product from
/// another. Longer spellings come first so they win over their parts.
static VARIANT_TOKENS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"with\s+wi[\s\-]?fi",
        r"wi[\s\-]?fi\s+enabled",
        r"app[\s\-]?controlled",
        r"with\s+app",
        r"wi[\s\-]?fi",
        r"bluetooth",
        r"wireless",
    ]
    .iter()
    .map(|p| {
        RegexBuilder::new(&format!(r"\b{p}\b"))
            .case_insensitive(true)
            .build()
            .expect("valid variant token regex")
    })
    .collect()
});

const EDGE_CHARS: &[char] = &[
    ' ', '-', '\u{2013}', '\u{2014}', ':', '|', '.', ',', '(', ')', '\u{2122}', '\u{00AE}',
];

/// Upper bound on display passes; each pass only ever shortens the name.
const MAX_DISPLAY_PASSES: usize = 8;

#[derive(Debug, Clone)]
struct BrandPatterns {
    /// Whole-word brand anywhere, case-insensitive.
    word: Regex,
    /// Brand at the very start, case-insensitive.
    leading: Regex,
}

impl BrandPatterns {
    fn compile(brand: &str) -> Option<Self> {
        let bounded = bounded_pattern(brand);
        if bounded.is_empty() {
            return None;
        }
        let build = |p: &str| RegexBuilder::new(p).case_insensitive(true).build().ok();
        Some(Self {
            word: build(&bounded)?,
            leading: build(&format!("^{bounded}"))?,
        })
    }
}

/// Brand-aware name canonicalization.
///
/// Brand patterns are compiled up front for the brands passed to
/// [`Canonicalizer::for_brands`]; any other brand is compiled on demand.
/// The type is immutable and can be shared across workers.
#[derive(Debug, Clone, Default)]
pub struct Canonicalizer {
    brands: HashMap<String, Option<BrandPatterns>>,
}

impl Canonicalizer {
    #[must_use]
    pub fn for_brands<'a>(brands: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = HashMap::new();
        for brand in brands {
            let key = brand.trim().to_lowercase();
            map.entry(key)
                .or_insert_with(|| BrandPatterns::compile(brand));
        }
        Self { brands: map }
    }

    fn with_brand<T>(&self, brand: &str, f: impl FnOnce(Option<&BrandPatterns>) -> T) -> T {
        let key = brand.trim().to_lowercase();
        match self.brands.get(&key) {
            Some(patterns) => f(patterns.as_ref()),
            None => f(BrandPatterns::compile(brand).as_ref()),
        }
    }

    /// Display form of `phrase`: connectivity variant tokens removed,
    /// whitespace collapsed, edge punctuation trimmed, and a doubled leading
    /// brand reduced to one. Idempotent.
    #[must_use]
    pub fn display(&self, brand: &str, phrase: &str) -> String {
        self.with_brand(brand, |patterns| {
            let mut current = phrase.to_string();
            for _ in 0..MAX_DISPLAY_PASSES {
                let next = display_pass(patterns, &current);
                if next == current {
                    break;
                }
                current = next;
            }
            current
        })
    }

    /// Deduplication identity: the display form lowercased, brand removed,
    /// and reduced to alphanumerics.
    #[must_use]
    pub fn key(&self, brand: &str, phrase: &str) -> String {
        let display = self.display(brand, phrase).to_lowercase();
        let without_brand = self.strip_brand(brand, &display);
        without_brand.chars().filter(|c| c.is_alphanumeric()).collect()
    }

    fn strip_brand(&self, brand: &str, text: &str) -> String {
        self.with_brand(brand, |patterns| match patterns {
            Some(p) => p.word.replace_all(text, " ").into_owned(),
            None => text.to_string(),
        })
    }

    /// Lowercased, brand removed, punctuation turned into single spaces.
    fn loose_key(&self, brand: &str, phrase: &str) -> String {
        let stripped = self.strip_brand(brand, &phrase.to_lowercase());
        let spaced: String = stripped
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        collapse_whitespace(&spaced)
    }

    fn stripped_lower(&self, brand: &str, phrase: &str) -> String {
        collapse_whitespace(&self.strip_brand(brand, &phrase.to_lowercase()))
    }
}

fn display_pass(patterns: Option<&BrandPatterns>, phrase: &str) -> String {
    let mut s = phrase.to_string();
    for re in VARIANT_TOKENS.iter() {
        s = re.replace_all(&s, " ").into_owned();
    }
    let s = collapse_whitespace(&s);
    let s = s.trim_matches(EDGE_CHARS);

    let Some(patterns) = patterns else {
        return s.to_string();
    };
    if let Some(first) = patterns.leading.find(s) {
        let rest = &s[first.end()..];
        let rest_trimmed = rest.trim_start();
        if rest_trimmed.len() < rest.len() && patterns.leading.is_match(rest_trimmed) {
            return rest_trimmed.to_string();
        }
    }
    s.to_string()
}

/// Free-function form of [`Canonicalizer::display`].
#[must_use]
pub fn canonical_display(brand: &str, phrase: &str) -> String {
    Canonicalizer::default().display(brand, phrase)
}

/// Free-function form of [`Canonicalizer::key`].
#[must_use]
pub fn canonical_key(brand: &str, phrase: &str) -> String {
    Canonicalizer::default().key(brand, phrase)
}

/// Keeps the first row per `(brand, canonical key, url)` and rewrites its
/// product to the display form. Rows must already be in their final order.
#[must_use]
pub fn dedup_global(rows: Vec<MatchRow>, canon: &Canonicalizer) -> Vec<MatchRow> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(rows.len());
    for mut row in rows {
        let key = (
            row.brand.to_lowercase(),
            canon.key(&row.brand, &row.product),
            row.url.clone(),
        );
        if !seen.insert(key) {
            continue;
        }
        let display = canon.display(&row.brand, &row.product);
        if !display.is_empty() {
            row.product = display;
        }
        out.push(row);
    }
    out
}

/// Collapses near-duplicate names on the same page for the same brand.
///
/// Within each `(brand, url)` group, rows sharing a loose key keep the
/// longest name. Of the survivors, a row is dropped when its brand-stripped
/// name occurs inside another survivor's brand-stripped name and that other
/// survivor's name is strictly longer.
#[must_use]
pub fn dedup_per_page(rows: Vec<MatchRow>, canon: &Canonicalizer) -> Vec<MatchRow> {
    let mut group_index: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<Vec<MatchRow>> = Vec::new();
    for row in rows {
        let key = (row.brand.to_lowercase(), row.url.clone());
        let idx = *group_index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[idx].push(row);
    }

    let mut out = Vec::new();
    for group in groups {
        out.extend(dedup_group(group, canon));
    }
    out
}

fn dedup_group(group: Vec<MatchRow>, canon: &Canonicalizer) -> Vec<MatchRow> {
    let mut bucket_index: HashMap<String, usize> = HashMap::new();
    let mut survivors: Vec<MatchRow> = Vec::new();
    for row in group {
        let key = canon.loose_key(&row.brand, &row.product);
        match bucket_index.get(&key) {
            Some(&idx) => {
                if char_len(&row.product) > char_len(&survivors[idx].product) {
                    survivors[idx] = row;
                }
            }
            None => {
                bucket_index.insert(key, survivors.len());
                survivors.push(row);
            }
        }
    }

    let stripped: Vec<String> = survivors
        .iter()
        .map(|r| canon.stripped_lower(&r.brand, &r.product))
        .collect();
    let lengths: Vec<usize> = survivors.iter().map(|r| char_len(&r.product)).collect();

    survivors
        .into_iter()
        .enumerate()
        .filter(|(i, _)| {
            !(0..stripped.len()).any(|j| {
                j != *i && stripped[j].contains(stripped[*i].as_str()) && lengths[j] > lengths[*i]
            })
        })
        .map(|(_, row)| row)
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
#[path = "canonical_test.rs"]
mod tests;
