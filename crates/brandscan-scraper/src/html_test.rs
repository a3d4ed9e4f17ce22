use super::*;

const PAGE: &str = r#"<!doctype html>
<html>
<head>
  <title>  Shop | Acme  </title>
  <meta property="og:title" content="Acme Rover X2 - Official">
  <style>.hero { color: red }</style>
  <script>var tracking = "Acme Secret Thing";</script>
  <script type="application/ld+json">
    {"@context":"https://schema.org","@type":"Product","name":"Rover X2","brand":{"@type":"Brand","name":"Acme"}}
  </script>
</head>
<body>
  <h1>The   Acme
      Rover X2</h1>
  <p>Meet the new&nbsp;rover.</p>
  <ul><li>Fast</li><li>Made by <strong>Acme</strong></li></ul>
  <noscript>Enable JS</noscript>
  <a href="/products/rover-x2#specs">Rover X2</a>
</body>
</html>"#;

#[test]
fn visible_text_skips_scripts_and_styles() {
    let page = PageRecord::parse("https://a.test/", PAGE.to_string(), true);
    assert!(page.visible_text.contains("The Acme Rover X2"));
    assert!(page.visible_text.contains("Meet the new rover."));
    assert!(!page.visible_text.contains("Secret Thing"));
    assert!(!page.visible_text.contains("color: red"));
    assert!(!page.visible_text.contains("Enable JS"));
    assert!(!page.visible_text.contains("  "));
}

#[test]
fn title_prefers_og_title() {
    let page = PageRecord::parse("https://a.test/", PAGE.to_string(), false);
    assert_eq!(page.title, "Acme Rover X2 - Official");
}

#[test]
fn title_falls_back_through_twitter_h1_and_title() {
    let twitter = r#"<html><head><title>T</title><meta name="twitter:title" content="Tw"></head><body><h1>H</h1></body></html>"#;
    assert_eq!(
        PageRecord::parse("u", twitter.to_string(), false).title,
        "Tw"
    );

    let h1 = "<html><head><title>T</title></head><body><h1> Big  Heading </h1></body></html>";
    assert_eq!(
        PageRecord::parse("u", h1.to_string(), false).title,
        "Big Heading"
    );

    let title = "<html><head><title> Only Title </title></head><body><h1>  </h1></body></html>";
    assert_eq!(
        PageRecord::parse("u", title.to_string(), false).title,
        "Only Title"
    );

    let none = "<html><body><p>x</p></body></html>";
    assert_eq!(PageRecord::parse("u", none.to_string(), false).title, "");
}

#[test]
fn snippets_cover_headings_lists_emphasis_and_links() {
    let page = PageRecord::parse("https://a.test/", PAGE.to_string(), false);
    assert!(page.snippets.contains(&"The Acme Rover X2".to_string()));
    assert!(page.snippets.contains(&"Made by Acme".to_string()));
    assert!(page.snippets.contains(&"Acme".to_string()));
    assert!(page.snippets.contains(&"Rover X2".to_string()));
    assert!(!page.snippets.iter().any(String::is_empty));
}

#[test]
fn structured_products_only_when_requested() {
    let on = PageRecord::parse("https://a.test/", PAGE.to_string(), true);
    assert_eq!(
        on.structured_products,
        vec![StructuredProduct {
            brand: Some("Acme".to_string()),
            name: "Rover X2".to_string(),
        }]
    );
    let off = PageRecord::parse("https://a.test/", PAGE.to_string(), false);
    assert!(off.structured_products.is_empty());
}

#[test]
fn structured_products_handle_graph_type_arrays_and_bare_brands() {
    let markup = r#"
<script type="application/ld+json">
{"@graph":[
  {"@type":"WebPage","name":"Home"},
  {"@type":["Product","Thing"],"name":"Widget  Pro","brand":"Acme"},
  {"@type":"product","name":"No Brand Gadget"},
  {"@type":"Product","name":"","brand":"Acme"}
]}
</script>
<script type='application/ld+json'>[{"@type":"Product","name":"Second","brand":{"name":"  "}}]</script>"#;
    let found = structured_products(markup);
    assert_eq!(
        found,
        vec![
            StructuredProduct {
                brand: Some("Acme".to_string()),
                name: "Widget Pro".to_string(),
            },
            StructuredProduct {
                brand: None,
                name: "No Brand Gadget".to_string(),
            },
            StructuredProduct {
                brand: None,
                name: "Second".to_string(),
            },
        ]
    );
}

#[test]
fn malformed_json_ld_block_does_not_hide_siblings() {
    let markup = r#"
<script type="application/ld+json">{"@type":"Product","name": oops}</script>
<script type="application/ld+json">{"@type":"Product","name":"Survivor","brand":"Acme"}</script>"#;
    let found = structured_products(markup);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Survivor");
}

#[test]
fn json_ld_type_attribute_may_be_unquoted_or_mixed_case() {
    let markup = r#"<html><head>
<script type=application/ld+json>{"@type":"Product","name":"Bare Attr","brand":"Acme"}</script>
<script type=" Application/LD+JSON ">{"@type":"Product","name":"Loud Attr","brand":"Acme"}</script>
<script type="text/javascript">var x = {"@type":"Product","name":"Not Data"};</script>
</head><body><p>Acme</p></body></html>"#;
    let names: Vec<String> = structured_products(markup)
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Bare Attr".to_string(), "Loud Attr".to_string()]);

    let page = PageRecord::parse("https://a.test/", markup.to_string(), true);
    assert_eq!(page.structured_products.len(), 2);
    assert!(!page.visible_text.contains("Bare Attr"));
}

#[test]
fn links_are_same_origin_and_fragment_free() {
    let site = Url::parse("https://a.test/").unwrap();
    let page = Url::parse("https://a.test/blog/post").unwrap();
    let markup = r##"
<a href="/shop#top">shop</a>
<a href="related">related</a>
<a href="#comments">comments</a>
<a href="mailto:hi@a.test">mail</a>
<a href="TEL:555">call</a>
<a href="javascript:void(0)">js</a>
<a href="https://elsewhere.test/x">away</a>
<a href="">empty</a>
<a>no href</a>"##;
    let links: Vec<String> = extract_links(markup, &page, &site)
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(
        links,
        vec![
            "https://a.test/shop".to_string(),
            "https://a.test/blog/related".to_string(),
        ]
    );
}

#[test]
fn collapse_whitespace_trims_and_joins() {
    assert_eq!(collapse_whitespace("  a \n\t b\u{00A0}c  "), "a b c");
    assert_eq!(collapse_whitespace("   "), "");
}
