//! Separator-flexible, word-bounded matchers for brands, product names and
//! aliases, and the compiled catalog built from them.

use std::collections::HashMap;

use brandscan_core::CatalogEntry;
use regex::{Regex, RegexBuilder};

use crate::candidates::PhraseShapes;
use crate::error::ScraperError;

/// Characters treated as interchangeable token separators.
const SEPARATORS: [char; 5] = [' ', '\u{00A0}', '-', '_', '/'];

/// Matches any run (possibly empty) of separator characters.
pub(crate) const SEPARATOR_RUN: &str = r"[ \u{00A0}\-_/]*";

fn is_separator(c: char) -> bool {
    SEPARATORS.contains(&c)
}

fn has_content(literal: &str) -> bool {
    !literal.trim().trim_matches(is_separator).is_empty()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Regex source for `literal` with every separator run rewritten to
/// [`SEPARATOR_RUN`] and everything else escaped. No boundaries are added.
#[must_use]
pub fn flexible_pattern(literal: &str) -> String {
    let literal = literal.trim_matches(is_separator);
    let mut out = String::with_capacity(literal.len() * 2);
    let mut in_separator = false;
    for c in literal.chars() {
        if is_separator(c) {
            if !in_separator {
                out.push_str(SEPARATOR_RUN);
                in_separator = true;
            }
        } else {
            in_separator = false;
            out.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4])));
        }
    }
    out
}

/// [`flexible_pattern`] wrapped in `\b` on each edge that starts or ends
/// with a word character.
#[must_use]
pub fn bounded_pattern(literal: &str) -> String {
    let trimmed = literal.trim_matches(is_separator);
    let lead = if trimmed.chars().next().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    let trail = if trimmed.chars().next_back().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    format!("{lead}{}{trail}", flexible_pattern(trimmed))
}

/// Compiles the word-bounded flexible matcher for `literal`.
///
/// # Errors
///
/// Returns [`ScraperError::EmptyPattern`] when the literal has nothing but
/// separators, and [`ScraperError::Pattern`] when the generated pattern fails
/// to compile.
pub fn compile_matcher(literal: &str, case_sensitive: bool) -> Result<Regex, ScraperError> {
    if !has_content(literal) {
        return Err(ScraperError::EmptyPattern(literal.to_string()));
    }
    RegexBuilder::new(&bounded_pattern(literal))
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| ScraperError::Pattern {
            literal: literal.to_string(),
            source: e,
        })
}

/// Position of an entry in its [`CompiledCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

/// Case-folded brand label used to group entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BrandKey(String);

impl BrandKey {
    #[must_use]
    pub fn new(brand: &str) -> Self {
        Self(brand.trim().to_lowercase())
    }
}

/// Matchers owned by one catalog entry.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    pub brand: Regex,
    /// Product name first, then aliases. Empty for brand-only entries.
    pub names: Vec<Regex>,
    /// Phrase-mining patterns, only for brand-only entries.
    pub shapes: Option<PhraseShapes>,
}

impl CompiledMatcher {
    #[must_use]
    pub fn matches_brand(&self, text: &str) -> bool {
        self.brand.is_match(text)
    }

    /// `true` when the product name or any alias occurs in `text`.
    #[must_use]
    pub fn matches_name(&self, text: &str) -> bool {
        self.names.iter().any(|re| re.is_match(text))
    }
}

/// A named (non brand-only) entry listed under its brand.
#[derive(Debug, Clone)]
pub struct NamedMatcher {
    pub id: EntryId,
    pub name: String,
}

/// The catalog with every matcher compiled once, shared read-only by all
/// workers of a scan.
#[derive(Debug)]
pub struct CompiledCatalog {
    entries: Vec<CatalogEntry>,
    matchers: Vec<CompiledMatcher>,
    named_by_brand: HashMap<BrandKey, Vec<NamedMatcher>>,
}

impl CompiledCatalog {
    /// # Errors
    ///
    /// Returns [`ScraperError::EmptyCatalog`] for an empty catalog and
    /// [`ScraperError::Pattern`] when a matcher fails to compile.
    pub fn compile(entries: &[CatalogEntry], case_sensitive: bool) -> Result<Self, ScraperError> {
        if entries.is_empty() {
            return Err(ScraperError::EmptyCatalog);
        }

        let mut brand_cache: HashMap<BrandKey, Regex> = HashMap::new();
        let mut matchers = Vec::with_capacity(entries.len());
        let mut named_by_brand: HashMap<BrandKey, Vec<NamedMatcher>> = HashMap::new();

        for (idx, entry) in entries.iter().enumerate() {
            let key = BrandKey::new(&entry.brand);
            let brand = match brand_cache.get(&key) {
                Some(re) => re.clone(),
                None => {
                    let re = compile_matcher(&entry.brand, case_sensitive)?;
                    brand_cache.insert(key.clone(), re.clone());
                    re
                }
            };

            let (names, shapes) = if entry.brand_only {
                (Vec::new(), Some(PhraseShapes::compile(&entry.brand, case_sensitive)?))
            } else {
                let names = std::iter::once(&entry.name)
                    .chain(entry.aliases.iter())
                    .filter(|s| has_content(s))
                    .map(|s| compile_matcher(s, case_sensitive))
                    .collect::<Result<Vec<_>, _>>()?;
                named_by_brand.entry(key).or_default().push(NamedMatcher {
                    id: EntryId(idx),
                    name: entry.name.clone(),
                });
                (names, None)
            };

            matchers.push(CompiledMatcher {
                brand,
                names,
                shapes,
            });
        }

        Ok(Self {
            entries: entries.to_vec(),
            matchers,
            named_by_brand,
        })
    }

    /// Entries in catalog order, paired with their ids.
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &CatalogEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (EntryId(idx), entry))
    }

    #[must_use]
    pub fn entry(&self, id: EntryId) -> &CatalogEntry {
        &self.entries[id.0]
    }

    #[must_use]
    pub fn matcher(&self, id: EntryId) -> &CompiledMatcher {
        &self.matchers[id.0]
    }

    /// Named entries of `brand`, in catalog order.
    #[must_use]
    pub fn named_for_brand(&self, brand: &str) -> &[NamedMatcher] {
        self.named_by_brand
            .get(&BrandKey::new(brand))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;
