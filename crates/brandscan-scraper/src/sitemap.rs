//! `robots.txt` and sitemap XML parsing.

use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Url;

/// Conventional sitemap locations probed in priority order, relative to the
/// site root. `robots.txt` is parsed for `Sitemap:` directives instead.
pub const SITEMAP_PROBE_PATHS: [&str; 7] = [
    "sitemap.xml",
    "sitemap_index.xml",
    "sitemap1.xml",
    "sitemap-index.xml",
    "sitemap_index.xml.gz",
    "sitemap.xml.gz",
    "robots.txt",
];

/// `true` for the `robots.txt` entry of [`SITEMAP_PROBE_PATHS`].
#[must_use]
pub fn is_robots_path(path: &str) -> bool {
    path.eq_ignore_ascii_case("robots.txt")
}

/// Every `Sitemap:` directive value in a robots file, resolved against `base`.
/// The directive keyword is matched case-insensitively.
#[must_use]
pub fn parse_robots_sitemaps(robots: &str, base: &Url) -> Vec<Url> {
    robots
        .lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once(':')?;
            if !key.trim().eq_ignore_ascii_case("sitemap") {
                return None;
            }
            let value = value.trim();
            if value.is_empty() {
                return None;
            }
            base.join(value).ok()
        })
        .collect()
}

/// Text of every `<loc>` element, in document order.
///
/// Parsing stops at the first XML error; locations read before the error
/// are kept.
#[must_use]
pub fn parse_sitemap_locs(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut locs = Vec::new();
    let mut in_loc = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref().eq_ignore_ascii_case(b"loc") {
                    in_loc = true;
                    current.clear();
                }
            }
            Ok(Event::Text(e)) => {
                if in_loc {
                    current.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::CData(e)) => {
                if in_loc {
                    current.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::End(e)) => {
                if in_loc && e.local_name().as_ref().eq_ignore_ascii_case(b"loc") {
                    in_loc = false;
                    let loc = current.trim();
                    if !loc.is_empty() {
                        locs.push(loc.to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!(
                    position = reader.buffer_position(),
                    error = %e,
                    "malformed sitemap XML, keeping locations read so far"
                );
                break;
            }
            _ => {}
        }
    }

    locs
}

/// `true` when the URL path names an XML sitemap, gzipped or not.
#[must_use]
pub fn looks_like_sitemap(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    path.ends_with(".xml") || path.ends_with(".xml.gz")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://a.test/").unwrap()
    }

    #[test]
    fn robots_directives_are_case_insensitive_and_resolved() {
        let robots = "User-agent: *\nDisallow: /cart\nSitemap: https://a.test/sm.xml\n\
                      sitemap:/relative.xml\nSITEMAP:   \n# Sitemap: ignored?\n";
        let found = parse_robots_sitemaps(robots, &base());
        let rendered: Vec<&str> = found.iter().map(Url::as_str).collect();
        assert_eq!(
            rendered,
            vec!["https://a.test/sm.xml", "https://a.test/relative.xml"]
        );
    }

    #[test]
    fn sitemap_locs_in_order() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://a.test/one</loc></url>
  <url><loc>
      https://a.test/two?x=1&amp;y=2
  </loc></url>
  <url><loc><![CDATA[https://a.test/three]]></loc></url>
  <url><loc>   </loc></url>
</urlset>"#;
        assert_eq!(
            parse_sitemap_locs(xml),
            vec![
                "https://a.test/one",
                "https://a.test/two?x=1&y=2",
                "https://a.test/three",
            ]
        );
    }

    #[test]
    fn prefixed_loc_elements_are_read() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
<sm:url><sm:loc>https://a.test/p</sm:loc></sm:url></sm:urlset>"#;
        assert_eq!(parse_sitemap_locs(xml), vec!["https://a.test/p"]);
    }

    #[test]
    fn malformed_xml_keeps_earlier_locs() {
        let xml = "<urlset><url><loc>https://a.test/ok</loc></url><url></oops></urlset>";
        assert_eq!(parse_sitemap_locs(xml), vec!["https://a.test/ok"]);
    }

    #[test]
    fn non_xml_body_yields_nothing() {
        assert!(parse_sitemap_locs("not a sitemap at all").is_empty());
    }

    #[test]
    fn sitemap_detection_by_extension() {
        let yes = ["https://a.test/post-sitemap.xml", "https://a.test/SM.XML.GZ"];
        let no = ["https://a.test/products/x", "https://a.test/feed.xml.bak"];
        for u in yes {
            assert!(looks_like_sitemap(&Url::parse(u).unwrap()), "{u}");
        }
        for u in no {
            assert!(!looks_like_sitemap(&Url::parse(u).unwrap()), "{u}");
        }
    }
}
