use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Brand label used when an input line names a product but no brand.
pub const UNKNOWN_BRAND: &str = "Unknown";

/// One brand or brand+product the scan looks for.
///
/// `brand_only` is `true` iff `name` is empty: the scan then discovers any
/// product of the brand instead of confirming a fixed product name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub brand: String,
    pub name: String,
    pub aliases: Vec<String>,
    pub brand_only: bool,
}

impl CatalogEntry {
    /// Builds an entry for a fixed product. An empty `name` yields a
    /// brand-only entry and drops the aliases.
    #[must_use]
    pub fn product(brand: &str, name: &str, aliases: Vec<String>) -> Self {
        let name = name.trim();
        if name.is_empty() {
            return Self::brand_only(brand);
        }
        let aliases = aliases
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        Self {
            brand: brand_or_unknown(brand),
            name: name.to_string(),
            aliases,
            brand_only: false,
        }
    }

    #[must_use]
    pub fn brand_only(brand: &str) -> Self {
        Self {
            brand: brand_or_unknown(brand),
            name: String::new(),
            aliases: Vec::new(),
            brand_only: true,
        }
    }

    /// `true` when the entry carries no usable brand label.
    #[must_use]
    pub fn has_unknown_brand(&self) -> bool {
        self.brand.trim().is_empty() || self.brand.eq_ignore_ascii_case(UNKNOWN_BRAND)
    }
}

fn brand_or_unknown(brand: &str) -> String {
    let brand = brand.trim();
    if brand.is_empty() {
        UNKNOWN_BRAND.to_string()
    } else {
        brand.to_string()
    }
}

/// Aliases may be written as a YAML list or as one pipe-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum AliasList {
    Many(Vec<String>),
    Piped(String),
}

impl Default for AliasList {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl AliasList {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::Many(list) => list,
            Self::Piped(raw) => split_aliases(&raw),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCatalogEntry {
    #[serde(default)]
    pub brand: String,
    #[serde(default, alias = "name")]
    pub product: String,
    #[serde(default)]
    aliases: AliasList,
}

#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub entries: Vec<RawCatalogEntry>,
}

/// Load and validate a catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: CatalogFile = serde_yaml::from_str(&content)?;

    let mut entries = Vec::with_capacity(file.entries.len());
    for (idx, raw) in file.entries.into_iter().enumerate() {
        if raw.brand.trim().is_empty() && raw.product.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "entry {} has neither a brand nor a product",
                idx + 1
            )));
        }
        entries.push(CatalogEntry::product(
            &raw.brand,
            &raw.product,
            raw.aliases.into_vec(),
        ));
    }

    validate_catalog(entries)
}

/// Parse the line-oriented catalog format.
///
/// ```text
/// Whisker,Litter-Robot 4,Litter Robot 4|LR4
/// PetSafe,                 # brand-only
/// Litter-Robot 4           # single field
/// ```
///
/// A single field becomes a brand-only entry when `treat_single_as_brand` is
/// set, otherwise a product of brand [`UNKNOWN_BRAND`].
///
/// # Errors
///
/// Returns [`ConfigError::CatalogParse`] for a malformed line and
/// [`ConfigError::Validation`] when no entries remain.
pub fn parse_catalog_lines(
    text: &str,
    treat_single_as_brand: bool,
) -> Result<Vec<CatalogEntry>, ConfigError> {
    let mut entries = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        let entry = match parts.as_slice() {
            [single] => {
                if treat_single_as_brand {
                    CatalogEntry::brand_only(single)
                } else {
                    CatalogEntry::product(UNKNOWN_BRAND, single, Vec::new())
                }
            }
            [brand, name] => entry_from_fields(idx + 1, brand, name, "")?,
            [brand, name, aliases] => entry_from_fields(idx + 1, brand, name, aliases)?,
            _ => {
                return Err(ConfigError::CatalogParse {
                    line: idx + 1,
                    reason: format!(
                        "expected at most 3 comma-separated fields, found {}",
                        parts.len()
                    ),
                })
            }
        };
        entries.push(entry);
    }

    validate_catalog(entries)
}

fn entry_from_fields(
    line: usize,
    brand: &str,
    name: &str,
    aliases: &str,
) -> Result<CatalogEntry, ConfigError> {
    if brand.is_empty() && name.is_empty() {
        return Err(ConfigError::CatalogParse {
            line,
            reason: "both brand and product are empty".to_string(),
        });
    }
    if name.is_empty() && !aliases.is_empty() {
        return Err(ConfigError::CatalogParse {
            line,
            reason: "aliases given without a product name".to_string(),
        });
    }
    Ok(CatalogEntry::product(brand, name, split_aliases(aliases)))
}

/// Split a pipe-separated alias field.
#[must_use]
pub fn split_aliases(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drops a trailing `# comment`; a `#` only starts a comment at line start
/// or after whitespace so product names like `No.#5` survive.
fn strip_comment(line: &str) -> &str {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return "";
    }
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'#' && i > 0 && bytes[i - 1].is_ascii_whitespace() {
            return &line[..i];
        }
    }
    line
}

fn validate_catalog(entries: Vec<CatalogEntry>) -> Result<Vec<CatalogEntry>, ConfigError> {
    let mut seen = HashSet::new();
    let entries: Vec<CatalogEntry> = entries
        .into_iter()
        .filter(|e| seen.insert(e.clone()))
        .collect();

    if entries.is_empty() {
        return Err(ConfigError::Validation(
            "catalog must contain at least one brand or product".to_string(),
        ));
    }

    Ok(entries)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
