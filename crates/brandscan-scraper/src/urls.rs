//! Site normalization and same-origin URL helpers.

use reqwest::Url;

use crate::error::ScraperError;

/// Normalizes one user-supplied site string into its origin root
/// (`scheme://host[:port]/`).
///
/// A missing scheme defaults to `https://`. Any path, query, or fragment is
/// dropped.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidSiteUrl`] for blank input, unparseable
/// input, or a non-HTTP scheme.
pub fn normalize_site(raw: &str) -> Result<Url, ScraperError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScraperError::InvalidSiteUrl {
            site: raw.to_string(),
            reason: "empty site".to_string(),
        });
    }

    let lower = trimmed.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&with_scheme).map_err(|e| ScraperError::InvalidSiteUrl {
        site: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ScraperError::InvalidSiteUrl {
            site: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    let origin = url.origin().ascii_serialization();
    Url::parse(&format!("{origin}/")).map_err(|e| ScraperError::InvalidSiteUrl {
        site: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Normalizes a list of site strings. Each input may itself hold several
/// comma-separated sites. Duplicates are dropped, first occurrence wins;
/// invalid entries are logged and skipped.
///
/// # Errors
///
/// Returns [`ScraperError::NoSites`] when nothing was supplied, or the last
/// [`ScraperError::InvalidSiteUrl`] when no input normalized.
pub fn normalize_sites<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<Url>, ScraperError> {
    let mut sites: Vec<Url> = Vec::new();
    let mut last_err = None;
    let mut saw_any = false;

    for part in inputs
        .iter()
        .flat_map(|s| s.as_ref().split(','))
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        saw_any = true;
        match normalize_site(part) {
            Ok(url) => {
                if !sites.contains(&url) {
                    sites.push(url);
                }
            }
            Err(e) => {
                tracing::warn!(site = part, error = %e, "skipping invalid site");
                last_err = Some(e);
            }
        }
    }

    if sites.is_empty() {
        return Err(match last_err {
            Some(e) if saw_any => e,
            _ => ScraperError::NoSites,
        });
    }
    Ok(sites)
}

/// Scheme, host, and port equality.
#[must_use]
pub fn same_origin(url: &Url, site: &Url) -> bool {
    url.origin() == site.origin()
}

/// Parses `raw` (absolute, or relative to `base`), drops the fragment, and
/// returns it only if it shares `site`'s origin.
#[must_use]
pub fn resolve_in_site(raw: &str, base: &Url, site: &Url) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let mut url = base.join(raw).ok()?;
    url.set_fragment(None);
    if same_origin(&url, site) {
        Some(url)
    } else {
        None
    }
}
