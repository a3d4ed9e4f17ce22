use super::*;
use crate::test_support::{sitemap_index, urlset, MapFetcher};

fn site() -> Url {
    Url::parse("https://a.test/").unwrap()
}

fn strings(urls: &[Url]) -> Vec<&str> {
    urls.iter().map(Url::as_str).collect()
}

#[tokio::test]
async fn sitemap_pages_are_sorted_same_origin_and_fragment_free() {
    let fetcher = MapFetcher::new().with(
        "https://a.test/sitemap.xml",
        &urlset(&[
            "https://a.test/products/rover",
            "https://a.test/about#team",
            "https://other.test/products/rover",
            "http://a.test/insecure",
            "https://a.test/about",
        ]),
    );
    let pages = SiteDiscoverer::new(&fetcher, 10).discover(&site()).await;
    assert_eq!(
        strings(&pages),
        vec!["https://a.test/about", "https://a.test/products/rover"]
    );
}

#[tokio::test]
async fn sitemap_index_is_followed_one_level() {
    let fetcher = MapFetcher::new()
        .with(
            "https://a.test/sitemap.xml",
            &sitemap_index(&["https://a.test/sitemap-products.xml"]),
        )
        .with(
            "https://a.test/sitemap-products.xml",
            &urlset(&[
                "https://a.test/products/rover",
                "https://a.test/sitemap-deeper.xml",
            ]),
        )
        .with(
            "https://a.test/sitemap-deeper.xml",
            &urlset(&["https://a.test/too-deep"]),
        );
    let pages = SiteDiscoverer::new(&fetcher, 10).discover(&site()).await;
    assert_eq!(strings(&pages), vec!["https://a.test/products/rover"]);
    assert!(!fetcher
        .requests()
        .contains(&"https://a.test/sitemap-deeper.xml".to_string()));
}

#[tokio::test]
async fn robots_sitemap_directive_is_used() {
    let fetcher = MapFetcher::new()
        .with(
            "https://a.test/robots.txt",
            "User-agent: *\nDisallow: /cart\nSITEMAP: https://a.test/custom-map.xml\n",
        )
        .with(
            "https://a.test/custom-map.xml",
            &urlset(&["https://a.test/shop/drone"]),
        );
    let pages = SiteDiscoverer::new(&fetcher, 10).discover(&site()).await;
    assert_eq!(strings(&pages), vec!["https://a.test/shop/drone"]);
}

#[tokio::test]
async fn sitemap_probe_order_is_fixed() {
    let fetcher = MapFetcher::new();
    let _ = SiteDiscoverer::new(&fetcher, 0).discover(&site()).await;
    let expected: Vec<String> = SITEMAP_PROBE_PATHS
        .iter()
        .map(|p| format!("https://a.test/{p}"))
        .collect();
    assert_eq!(fetcher.requests(), expected);
}

fn crawl_fetcher() -> MapFetcher {
    MapFetcher::new()
        .with(
            "https://a.test/",
            r##"<a href="/a">A</a> <a href="b#top">B</a> <a href="mailto:x@a.test">m</a>
                <a href="https://other.test/x">ext</a> <a href="#frag">f</a>"##,
        )
        .with(
            "https://a.test/a",
            r#"<a href="/c">C</a> <a href="/b">B again</a> <a href="/">home</a>"#,
        )
        .with("https://a.test/b", "<p>leaf</p>")
        .with("https://a.test/c", "<p>leaf</p>")
}

fn crawl_requests(fetcher: &MapFetcher) -> Vec<String> {
    fetcher
        .requests()
        .into_iter()
        .filter(|u| {
            !SITEMAP_PROBE_PATHS
                .iter()
                .any(|p| *u == format!("https://a.test/{p}"))
        })
        .collect()
}

#[tokio::test]
async fn crawl_fallback_is_breadth_first() {
    let fetcher = crawl_fetcher();
    let pages = SiteDiscoverer::new(&fetcher, 10).discover(&site()).await;
    assert_eq!(
        strings(&pages),
        vec![
            "https://a.test/",
            "https://a.test/a",
            "https://a.test/b",
            "https://a.test/c",
        ]
    );
    assert_eq!(
        crawl_requests(&fetcher),
        vec![
            "https://a.test/",
            "https://a.test/a",
            "https://a.test/b",
            "https://a.test/c",
        ]
    );
}

#[tokio::test]
async fn crawl_stops_at_page_budget() {
    let fetcher = crawl_fetcher();
    let pages = SiteDiscoverer::new(&fetcher, 2).discover(&site()).await;
    assert_eq!(strings(&pages), vec!["https://a.test/", "https://a.test/a"]);
    assert_eq!(crawl_requests(&fetcher).len(), 2);
}

#[tokio::test]
async fn crawl_budget_counts_failed_visits() {
    let fetcher = MapFetcher::new().with(
        "https://a.test/",
        r#"<a href="/missing">x</a> <a href="/b">B</a>"#,
    )
    .with("https://a.test/b", "<p>leaf</p>");
    let pages = SiteDiscoverer::new(&fetcher, 2).discover(&site()).await;
    assert_eq!(strings(&pages), vec!["https://a.test/"]);
}

#[tokio::test]
async fn all_fetches_failing_yields_nothing() {
    let fetcher = MapFetcher::new();
    let pages = SiteDiscoverer::new(&fetcher, 25).discover(&site()).await;
    assert!(pages.is_empty());
}

#[tokio::test]
async fn excludes_apply_to_sitemap_and_crawl_results() {
    let fetcher = MapFetcher::new().with(
        "https://a.test/sitemap.xml",
        &urlset(&[
            "https://a.test/tag/rovers",
            "https://a.test/products/rover",
            "https://a.test/blog/page/2",
        ]),
    );
    let pages = SiteDiscoverer::new(&fetcher, 10)
        .with_excludes(vec!["/tag/".to_string(), "/page/".to_string(), String::new()])
        .discover(&site())
        .await;
    assert_eq!(strings(&pages), vec!["https://a.test/products/rover"]);

    let crawl = crawl_fetcher();
    let pages = SiteDiscoverer::new(&crawl, 10)
        .with_excludes(vec!["/c".to_string()])
        .discover(&site())
        .await;
    assert_eq!(pages.len(), 3);
}
