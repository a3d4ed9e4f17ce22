use super::*;
use crate::test_support::{urlset, MapFetcher};

fn page(body: &str) -> String {
    format!(
        r#"<html><head><meta property="og:title" content="Launch"></head><body>{body}</body></html>"#
    )
}

fn request(catalog: Vec<CatalogEntry>, options: ScanOptions) -> ScanRequest {
    ScanRequest {
        sites: vec!["https://a.test".to_string()],
        catalog,
        options,
    }
}

fn three_page_site(p1: &str, p2: &str, p3: &str) -> MapFetcher {
    MapFetcher::new()
        .with(
            "https://a.test/sitemap.xml",
            &urlset(&["https://a.test/p1", "https://a.test/p2", "https://a.test/p3"]),
        )
        .with("https://a.test/p1", &page(p1))
        .with("https://a.test/p2", &page(p2))
        .with("https://a.test/p3", &page(p3))
}

fn triples(rows: &[MatchRow]) -> Vec<(&str, &str, &str)> {
    rows.iter()
        .map(|r| (r.brand.as_str(), r.product.as_str(), r.url.as_str()))
        .collect()
}

#[tokio::test]
async fn brand_only_entry_derives_product_from_text() {
    let fetcher = three_page_site(
        "<p>Acme Rover X2 by Acme</p>",
        "<p>Nothing to see here.</p>",
        "<p>Contact us for details.</p>",
    );
    let options = ScanOptions {
        require_brand_in_name: false,
        ..ScanOptions::default()
    };
    let result = Scanner::new(&fetcher)
        .run(&request(vec![CatalogEntry::brand_only("Acme")], options))
        .await
        .unwrap();

    assert_eq!(
        triples(&result.rows),
        vec![("Acme", "Rover X2", "https://a.test/p1")]
    );
    assert_eq!(result.rows[0].title, "Launch");
    assert_eq!(result.pages_discovered, 3);
    assert_eq!(result.pages_scanned, 3);
}

#[tokio::test]
async fn brand_only_entry_prepends_brand_by_default() {
    let fetcher = three_page_site("<p>Acme Rover X2 by Acme</p>", "", "");
    let result = Scanner::new(&fetcher)
        .run(&request(
            vec![CatalogEntry::brand_only("Acme")],
            ScanOptions::default(),
        ))
        .await
        .unwrap();
    assert_eq!(
        triples(&result.rows),
        vec![("Acme", "Acme Rover X2", "https://a.test/p1")]
    );
}

#[tokio::test]
async fn alias_hit_reports_catalog_name() {
    let fetcher = three_page_site("<p>LR4</p>", "<p>Other stuff</p>", "");
    let catalog = vec![CatalogEntry::product(
        "Whisker",
        "Litter-Robot 4",
        vec!["LR4".to_string()],
    )];
    let result = Scanner::new(&fetcher)
        .run(&request(catalog, ScanOptions::default()))
        .await
        .unwrap();
    assert_eq!(
        triples(&result.rows),
        vec![("Whisker", "Litter-Robot 4", "https://a.test/p1")]
    );
}

#[tokio::test]
async fn summary_counts_distinct_pages() {
    let fetcher = three_page_site(
        "<p>The Litter Robot 4 arrives.</p>",
        "<p>More on the litter-robot 4.</p>",
        "<p>Unrelated.</p>",
    );
    let catalog = vec![CatalogEntry::product("Whisker", "Litter-Robot 4", Vec::new())];
    let result = Scanner::new(&fetcher)
        .run(&request(catalog, ScanOptions::default()))
        .await
        .unwrap();
    assert_eq!(result.rows.len(), 2);
    assert_eq!(
        result.summary,
        vec![ProductSummary {
            brand: "Whisker".to_string(),
            product: "Litter-Robot 4".to_string(),
            pages_found: 2,
        }]
    );
}

#[tokio::test]
async fn unreachable_site_completes_without_rows() {
    let fetcher = MapFetcher::new();
    let result = Scanner::new(&fetcher)
        .run(&request(
            vec![CatalogEntry::brand_only("Acme")],
            ScanOptions::default(),
        ))
        .await
        .unwrap();
    assert!(result.rows.is_empty());
    assert!(result.summary.is_empty());
    assert_eq!(result.pages_discovered, 0);
}

#[tokio::test]
async fn invalid_requests_fail_before_fetching() {
    let fetcher = MapFetcher::new();
    let scanner = Scanner::new(&fetcher);

    let mut no_sites = request(vec![CatalogEntry::brand_only("Acme")], ScanOptions::default());
    no_sites.sites = vec!["  ".to_string()];
    assert!(matches!(
        scanner.run(&no_sites).await,
        Err(ScraperError::NoSites)
    ));

    let empty_catalog = request(Vec::new(), ScanOptions::default());
    assert!(matches!(
        scanner.run(&empty_catalog).await,
        Err(ScraperError::EmptyCatalog)
    ));

    assert!(fetcher.requests().is_empty());
}

#[tokio::test]
async fn co_occurrence_gate_requires_brand_on_page() {
    let fetcher = three_page_site(
        "<p>The Litter-Robot 4 is here.</p>",
        "<p>Whisker ships the Litter-Robot 4.</p>",
        "",
    );
    let catalog = vec![CatalogEntry::product("Whisker", "Litter-Robot 4", Vec::new())];

    let strict = ScanOptions {
        require_brand_and_product: true,
        ..ScanOptions::default()
    };
    let result = Scanner::new(&fetcher)
        .run(&request(catalog.clone(), strict))
        .await
        .unwrap();
    assert_eq!(
        triples(&result.rows),
        vec![("Whisker", "Litter-Robot 4", "https://a.test/p2")]
    );

    let loose = Scanner::new(&fetcher)
        .run(&request(catalog, ScanOptions::default()))
        .await
        .unwrap();
    assert_eq!(loose.rows.len(), 2);
}

#[tokio::test]
async fn unknown_brand_is_recovered_from_structured_data() {
    let body = r#"<script type="application/ld+json">
        {"@type": "Product", "name": "CatGenie 120 Self-Washing", "brand": {"name": "Petnovations"}}
        </script><p>Meet the CatGenie 120.</p>"#;
    let fetcher = three_page_site(body, "", "");
    let catalog = vec![CatalogEntry::product("", "CatGenie 120", Vec::new())];
    let result = Scanner::new(&fetcher)
        .run(&request(catalog, ScanOptions::default()))
        .await
        .unwrap();
    assert_eq!(
        triples(&result.rows),
        vec![("Petnovations", "CatGenie 120", "https://a.test/p1")]
    );
}

#[tokio::test]
async fn brand_only_entry_collects_named_siblings_and_candidates() {
    let fetcher = three_page_site(
        "<p>Whisker Feeder Robot Mini is here. Also try the LR4.</p>",
        "<p>Feeder Robot Mini without the brand.</p>",
        "",
    );
    let catalog = vec![
        CatalogEntry::brand_only("Whisker"),
        CatalogEntry::product("Whisker", "Litter-Robot 4", vec!["LR4".to_string()]),
    ];
    let result = Scanner::new(&fetcher)
        .run(&request(catalog, ScanOptions::default()))
        .await
        .unwrap();
    assert_eq!(
        triples(&result.rows),
        vec![
            ("Whisker", "Litter-Robot 4", "https://a.test/p1"),
            ("Whisker", "Whisker Feeder Robot Mini", "https://a.test/p1"),
        ]
    );
}

#[tokio::test]
async fn progress_reaches_total() {
    let fetcher = three_page_site("", "", "");
    let mut seen = Vec::new();
    Scanner::new(&fetcher)
        .run_with_progress(
            &request(vec![CatalogEntry::brand_only("Acme")], ScanOptions::default()),
            |p| seen.push(p),
        )
        .await
        .unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|p| p.total == 3));
    assert_eq!(seen.last().map(|p| p.completed), Some(3));
}

#[test]
fn cache_key_tracks_request_identity() {
    let a = request(vec![CatalogEntry::brand_only("Acme")], ScanOptions::default());
    let b = a.clone();
    let mut c = a.clone();
    c.options.case_sensitive = true;

    assert_eq!(a.cache_key(), b.cache_key());
    assert_ne!(a.cache_key(), c.cache_key());
    assert_eq!(a.cache_key().len(), 64);
    assert!(a.cache_key().chars().all(|ch| ch.is_ascii_hexdigit()));
}
