//! Terminal and JSON renderings of a finished scan.

use brandscan_core::{MatchRow, ProductSummary};
use brandscan_scraper::{ScanRequest, ScanResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

const TITLE_WIDTH: usize = 40;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    request_key: String,
    pages_discovered: usize,
    pages_scanned: usize,
    rows: &'a [MatchRow],
    summary: &'a [ProductSummary],
}

pub(crate) fn print_json(request: &ScanRequest, result: &ScanResult) -> anyhow::Result<()> {
    let report = JsonReport {
        generated_at: Utc::now(),
        request_key: request.cache_key(),
        pages_discovered: result.pages_discovered,
        pages_scanned: result.pages_scanned,
        rows: &result.rows,
        summary: &result.summary,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) fn print_tables(result: &ScanResult) {
    if result.rows.is_empty() {
        println!(
            "no product matches found across {} pages; try adding aliases or product lines",
            result.pages_scanned
        );
        return;
    }

    let brand_width = column_width(result.rows.iter().map(|r| r.brand.as_str()), "BRAND");
    let product_width = column_width(result.rows.iter().map(|r| r.product.as_str()), "PRODUCT");

    println!(
        "{:<bw$}  {:<pw$}  {:<tw$}  URL",
        "BRAND",
        "PRODUCT",
        "TITLE",
        bw = brand_width,
        pw = product_width,
        tw = TITLE_WIDTH
    );
    for row in &result.rows {
        println!(
            "{:<bw$}  {:<pw$}  {:<tw$}  {}",
            row.brand,
            row.product,
            truncate(&row.title, TITLE_WIDTH),
            row.url,
            bw = brand_width,
            pw = product_width,
            tw = TITLE_WIDTH
        );
    }

    println!();
    println!(
        "{:<bw$}  {:<pw$}  PAGES",
        "BRAND",
        "PRODUCT",
        bw = brand_width,
        pw = product_width
    );
    for item in &result.summary {
        println!(
            "{:<bw$}  {:<pw$}  {}",
            item.brand,
            item.product,
            item.pages_found,
            bw = brand_width,
            pw = product_width
        );
    }

    println!();
    println!(
        "found {} product-page matches on {} of {} pages",
        result.rows.len(),
        result.pages_scanned,
        result.pages_discovered
    );
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}

pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}
