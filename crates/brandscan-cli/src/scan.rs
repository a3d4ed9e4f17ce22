//! `scan` command: load the catalog, build scan options from config and
//! flags, run the scan, and print the result.

use std::path::{Path, PathBuf};
use std::time::Duration;

use brandscan_core::{
    load_catalog, parse_catalog_lines, AppConfig, CatalogEntry, ScanOptions, DEFAULT_EXCLUDES,
};
use brandscan_scraper::{HttpFetcher, ScanRequest, Scanner};
use clap::Args;

use crate::report;

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Site origin to scan; repeat or comma-separate for several
    #[arg(long = "site", required = true, num_args = 1..)]
    pub sites: Vec<String>,

    /// YAML catalog file (falls back to `BRANDSCAN_CATALOG_PATH`)
    #[arg(long, conflicts_with = "entries")]
    pub catalog: Option<PathBuf>,

    /// Line-format catalog: `Brand,Product,Alias1|Alias2` per line
    #[arg(long)]
    pub entries: Option<PathBuf>,

    /// Treat single-field lines of `--entries` as brands instead of products
    #[arg(long, requires = "entries")]
    pub single_is_brand: bool,

    /// Crawl fallback page limit per site
    #[arg(long)]
    pub page_budget: Option<usize>,

    /// Concurrent page fetches
    #[arg(long)]
    pub workers: Option<usize>,

    /// Delay before each request, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Extra URL substring to exclude; repeatable
    #[arg(long = "exclude")]
    pub excludes: Vec<String>,

    /// Do not apply the built-in tag/category/feed/... exclusions
    #[arg(long)]
    pub no_default_excludes: bool,

    #[arg(long)]
    pub case_sensitive: bool,

    /// Named products also need their brand on the same page
    #[arg(long)]
    pub require_brand: bool,

    /// Keep derived product names without prefixing the brand
    #[arg(long)]
    pub no_brand_in_name: bool,

    /// Extra word that disqualifies a derived product name; repeatable
    #[arg(long = "ignore-word")]
    pub ignore_words: Vec<String>,

    /// Competing brand whose names should never be attributed; repeatable
    #[arg(long = "other-brand")]
    pub other_brands: Vec<String>,

    /// Cap on derived product names per page and brand
    #[arg(long)]
    pub max_names: Option<usize>,

    /// Keep connectivity variants (Wi-Fi, Bluetooth, ...) as separate products
    #[arg(long)]
    pub keep_variants: bool,

    /// Keep every name found on a page, even when a longer one subsumes it
    #[arg(long)]
    pub no_page_dedupe: bool,

    /// Ignore embedded structured product data
    #[arg(long)]
    pub no_structured_data: bool,

    /// Print a JSON report instead of tables
    #[arg(long)]
    pub json: bool,
}

/// Scan options seeded from `config` with command-line overrides applied.
pub(crate) fn build_options(config: &AppConfig, args: &ScanArgs) -> ScanOptions {
    let mut options = ScanOptions::from_app_config(config);

    if let Some(budget) = args.page_budget {
        options.page_budget = budget;
    }
    if let Some(workers) = args.workers {
        options.workers = workers.max(1);
    }
    if let Some(delay) = args.delay_ms {
        options.request_delay_ms = delay;
    }
    if let Some(max) = args.max_names {
        options.max_names_per_page = max;
    }

    if args.no_default_excludes {
        options
            .exclude_substrings
            .retain(|s| !DEFAULT_EXCLUDES.contains(&s.as_str()));
    }
    options.exclude_substrings.extend(non_empty(&args.excludes));
    options.ignore_words.extend(non_empty(&args.ignore_words));
    options.other_brands.extend(non_empty(&args.other_brands));

    options.case_sensitive = args.case_sensitive;
    options.require_brand_and_product = args.require_brand;
    options.require_brand_in_name = !args.no_brand_in_name;
    options.collapse_variants = !args.keep_variants;
    options.dedupe_per_url = !args.no_page_dedupe;
    options.auto_detect = !args.no_structured_data;
    options
}

fn non_empty(items: &[String]) -> impl Iterator<Item = String> + '_ {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Reads the catalog named by the flags, or by `BRANDSCAN_CATALOG_PATH`.
///
/// # Errors
///
/// Returns an error if no catalog source is given, the file cannot be read,
/// or it does not parse.
pub(crate) fn load_entries(config: &AppConfig, args: &ScanArgs) -> anyhow::Result<Vec<CatalogEntry>> {
    if let Some(path) = &args.entries {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        return Ok(parse_catalog_lines(&text, args.single_is_brand)?);
    }

    let path: &Path = args
        .catalog
        .as_deref()
        .or(config.catalog_path.as_deref())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no catalog given; pass --catalog or --entries, or set BRANDSCAN_CATALOG_PATH"
            )
        })?;
    Ok(load_catalog(path)?)
}

/// Run a scan and print its rows and per-product summary.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the HTTP client cannot
/// be built, or the request is invalid (no usable site, empty catalog).
/// Per-page failures only reduce the result.
pub(crate) async fn run_scan(config: &AppConfig, args: &ScanArgs) -> anyhow::Result<()> {
    let catalog = load_entries(config, args)?;
    let options = build_options(config, args);
    let fetcher = HttpFetcher::from_config(config)?
        .with_request_delay(Duration::from_millis(options.request_delay_ms));

    let request = ScanRequest {
        sites: args.sites.clone(),
        catalog,
        options,
    };
    tracing::info!(
        sites = request.sites.len(),
        entries = request.catalog.len(),
        key = %request.cache_key(),
        "scan requested"
    );

    let result = Scanner::new(&fetcher).run(&request).await?;

    if args.json {
        report::print_json(&request, &result)?;
    } else {
        report::print_tables(&result);
    }
    Ok(())
}
