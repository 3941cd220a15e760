//! Lesson-link extraction from the course root page

use scraper::{Html, Selector};
use url::Url;

/// The lesson list on the course root page
const LESSON_LINK_SELECTOR: &str = "#list-tab a.list-group-item";

/// Extracts lesson page URLs from the root document
///
/// Relative hrefs are resolved against `base_url`. Unresolvable or
/// non-HTTP(S) hrefs are skipped. Zero results is a valid outcome here;
/// the caller decides whether to treat it as format drift.
pub fn extract_lesson_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse(LESSON_LINK_SELECTOR) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves an href to an absolute HTTP(S) URL, or drops it
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}
