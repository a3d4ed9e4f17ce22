//! Product-name mining for brand-only catalog entries.
//!
//! Three sources feed the candidate list, in this order: embedded `Product`
//! records, heading/emphasis/list/link snippets, and the page's visible text.
//! Mined phrases go through [`clean_phrase`] and the per-scan
//! [`CandidateRules`]; the merged list is de-duplicated case-insensitively and
//! capped.

use std::collections::HashSet;

use brandscan_core::ScanOptions;
use regex::{Regex, RegexBuilder};

use crate::error::ScraperError;
use crate::html::PageRecord;
use crate::matcher::bounded_pattern;

const STOPWORDS: [&str; 12] = [
    "and", "or", "with", "for", "to", "the", "a", "an", "in", "on", "of", "by",
];

const NOISE_WORDS: [&str; 21] = [
    "guide",
    "beginners",
    "beginner",
    "best",
    "top",
    "vs",
    "comparison",
    "compare",
    "review",
    "reviews",
    "let",
    "peace",
    "how",
    "why",
    "what",
    "actually",
    "really",
    "lowest",
    "entrance",
    "ultimate",
    "complete",
];

const EDGE_CHARS: &[char] = &[
    ' ', '-', '\u{2013}', '\u{2014}', ':', '|', '.', ',', '(', ')', '\u{2122}', '\u{00AE}', '"',
    '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}',
];

/// The capitalized token run both shapes capture: one capitalized token
/// followed by up to six capitalized or digit-leading tokens. Capitalization
/// is checked even when the brand is matched case-insensitively.
const TOKEN_RUN: &str = r"((?-i:[A-Z][\w\-]*(?:\s+[A-Z0-9][\w\-]*){0,6}))";

/// Phrase-mining regexes for one brand.
#[derive(Debug, Clone)]
pub struct PhraseShapes {
    /// `Brand['s] Capitalized Tokens`
    prefix: Regex,
    /// `Capitalized Tokens by|from Brand`
    suffix: Regex,
    /// The brand as a whole word anywhere.
    brand_word: Regex,
    /// The brand at the start of a phrase, with trailing separators.
    leading_brand: Regex,
}

impl PhraseShapes {
    /// # Errors
    ///
    /// Returns [`ScraperError::Pattern`] if a generated regex fails to
    /// compile.
    pub fn compile(brand: &str, case_sensitive: bool) -> Result<Self, ScraperError> {
        let bounded = bounded_pattern(brand);
        let build = |pattern: &str| {
            RegexBuilder::new(pattern)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|e| ScraperError::Pattern {
                    literal: brand.to_string(),
                    source: e,
                })
        };

        Ok(Self {
            prefix: build(&format!(r"{bounded}(?:['\u{{2019}}]s)?\s+{TOKEN_RUN}"))?,
            suffix: build(&format!(r"{TOKEN_RUN}\s+(?i:by|from)\s+{bounded}"))?,
            brand_word: build(&bounded)?,
            leading_brand: build(&format!(r"^{bounded}(?:['\u{{2019}}]s)?[\s\-]*"))?,
        })
    }

    /// Raw captures of both shapes in `text`: every prefix capture, then
    /// every suffix capture.
    pub fn captures<'t>(&'t self, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
        let prefix = self.prefix.captures_iter(text);
        let suffix = self.suffix.captures_iter(text);
        prefix
            .chain(suffix)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
    }

    #[must_use]
    pub fn contains_brand(&self, phrase: &str) -> bool {
        self.brand_word.is_match(phrase)
    }

    /// Drops one leading brand occurrence, unless nothing would remain.
    #[must_use]
    pub fn strip_leading_brand<'p>(&self, phrase: &'p str) -> &'p str {
        match self.leading_brand.find(phrase) {
            Some(m) if m.end() < phrase.len() => &phrase[m.end()..],
            _ => phrase,
        }
    }
}

/// Per-scan filtering knobs, lowercased once.
#[derive(Debug, Clone)]
pub struct CandidateRules {
    pub ignore_words: Vec<String>,
    pub other_brands: Vec<String>,
    pub require_brand_in_name: bool,
    pub max_names: usize,
}

impl CandidateRules {
    #[must_use]
    pub fn from_options(options: &ScanOptions) -> Self {
        let lowered = |items: &[String]| {
            items
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        };
        Self {
            ignore_words: lowered(&options.ignore_words),
            other_brands: lowered(&options.other_brands),
            require_brand_in_name: options.require_brand_in_name,
            max_names: options.max_names_per_page,
        }
    }

    fn rejects(&self, phrase: &str) -> bool {
        let lower = phrase.to_lowercase();
        self.other_brands
            .iter()
            .chain(self.ignore_words.iter())
            .any(|w| lower.contains(w.as_str()))
    }
}

fn is_bare_year(token: &str) -> bool {
    token.len() == 4
        && token.bytes().all(|b| b.is_ascii_digit())
        && matches!(token.get(..2), Some("19" | "20"))
}

/// Trims edge punctuation, rejects numeric-led phrases, and truncates the
/// token run at the first stopword, noise word, bare year, list separator,
/// or all-lowercase word. Returns `None` when fewer than two tokens survive.
#[must_use]
pub fn clean_phrase(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches(EDGE_CHARS);
    let mut tokens = trimmed.split_whitespace().peekable();

    if tokens
        .peek()
        .is_none_or(|first| first.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }

    let mut kept: Vec<&str> = Vec::new();
    for token in tokens {
        let lower = token.to_lowercase();
        if STOPWORDS.contains(&lower.as_str())
            || NOISE_WORDS.contains(&lower.as_str())
            || is_bare_year(token)
        {
            break;
        }
        if token.chars().all(char::is_alphabetic) && token.chars().all(char::is_lowercase) {
            break;
        }
        if token.contains([',', ';', '/']) {
            break;
        }
        kept.push(token);
    }

    let phrase = kept.join(" ");
    let phrase = phrase.trim_matches(EDGE_CHARS);
    if phrase.split_whitespace().count() < 2 {
        return None;
    }
    Some(phrase.to_string())
}

/// Mines candidate product names for `brand` from one page.
///
/// Structured records only contribute when their brand equals `brand`
/// (ASCII case-insensitive). Their names are taken as-is; mined phrases are
/// cleaned and filtered first.
#[must_use]
pub fn extract_candidates(
    page: &PageRecord,
    brand: &str,
    shapes: &PhraseShapes,
    rules: &CandidateRules,
) -> Vec<String> {
    let structured = page
        .structured_products
        .iter()
        .filter(|p| p.brand.as_deref().is_some_and(|b| b.eq_ignore_ascii_case(brand)))
        .map(|p| p.name.clone());

    let mined = page
        .snippets
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(page.visible_text.as_str()))
        .flat_map(|text| shapes.captures(text))
        .filter_map(|raw| mine_phrase(raw, brand, shapes, rules));

    merge_capped(structured.chain(mined), rules.max_names)
}

fn mine_phrase(
    raw: &str,
    brand: &str,
    shapes: &PhraseShapes,
    rules: &CandidateRules,
) -> Option<String> {
    let cleaned = clean_phrase(raw)?;
    if rules.rejects(&cleaned) {
        return None;
    }
    let product = shapes.strip_leading_brand(&cleaned);
    if product.split_whitespace().count() < 2 {
        return None;
    }
    if rules.require_brand_in_name && !shapes.contains_brand(product) {
        Some(format!("{brand} {product}"))
    } else {
        Some(product.to_string())
    }
}

/// Case-insensitive de-duplication preserving first-seen order, capped at
/// `max` names.
fn merge_capped(phrases: impl Iterator<Item = String>, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    phrases
        .filter(|p| !p.trim().is_empty())
        .filter(|p| seen.insert(p.to_lowercase()))
        .take(max)
        .collect()
}

#[cfg(test)]
#[path = "candidates_test.rs"]
mod tests;
