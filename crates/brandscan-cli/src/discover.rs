//! `discover` command: print the pages a scan of each site would visit.

use brandscan_core::{AppConfig, DEFAULT_EXCLUDES};
use brandscan_scraper::{normalize_sites, HttpFetcher, SiteDiscoverer};
use clap::Args;

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Site origin; repeat or comma-separate for several
    #[arg(long = "site", required = true, num_args = 1..)]
    pub sites: Vec<String>,

    /// Crawl fallback page limit per site
    #[arg(long)]
    pub page_budget: Option<usize>,

    /// Extra URL substring to exclude; repeatable
    #[arg(long = "exclude")]
    pub excludes: Vec<String>,

    /// Do not apply the built-in tag/category/feed/... exclusions
    #[arg(long)]
    pub no_default_excludes: bool,
}

impl DiscoverArgs {
    pub(crate) fn exclusions(&self) -> Vec<String> {
        let mut out: Vec<String> = if self.no_default_excludes {
            Vec::new()
        } else {
            DEFAULT_EXCLUDES.iter().map(|s| (*s).to_string()).collect()
        };
        out.extend(
            self.excludes
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        );
        out
    }
}

/// Discover and print page URLs for every site, one per line.
///
/// # Errors
///
/// Returns an error if no site normalizes or the HTTP client cannot be built.
pub(crate) async fn run_discover(config: &AppConfig, args: &DiscoverArgs) -> anyhow::Result<()> {
    let sites = normalize_sites(&args.sites)?;
    let fetcher = HttpFetcher::from_config(config)?;
    let budget = args.page_budget.unwrap_or(config.page_budget);

    let mut total = 0usize;
    for site in &sites {
        let pages = SiteDiscoverer::new(&fetcher, budget)
            .with_excludes(args.exclusions())
            .discover(site)
            .await;
        total += pages.len();
        for page in &pages {
            println!("{page}");
        }
    }

    eprintln!("discovered {total} pages across {} sites", sites.len());
    Ok(())
}
