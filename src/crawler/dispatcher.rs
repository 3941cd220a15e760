//! Page-type dispatch
//!
//! Routes a fetched page to the extraction handler its request label names.
//! The label enum is closed, so there is no unknown-label failure path to
//! retry or recover from.

use crate::crawler::frontier::{CrawlRequest, PageLabel};
use crate::extract::{extract_lesson, extract_lesson_links, LessonExtract};
use crate::page::RenderedPage;
use url::Url;

/// Structured output of exactly one extraction handler
#[derive(Debug)]
pub enum ExtractedPage {
    /// Lesson URLs discovered on the root page
    Root { lesson_links: Vec<String> },

    /// Title and slides of a lesson page
    Lesson(LessonExtract),
}

/// Runs the extraction handler for the request's label
///
/// Link resolution uses the browser's final URL when it parses, falling
/// back to the requested URL (fixture capabilities may not track URLs).
pub fn dispatch(
    request: &CrawlRequest,
    doc: &RenderedPage,
    strip_delimiters: bool,
) -> Result<ExtractedPage, url::ParseError> {
    match request.label {
        PageLabel::Root => {
            let base = Url::parse(&doc.url).or_else(|_| Url::parse(&request.url))?;
            Ok(ExtractedPage::Root {
                lesson_links: extract_lesson_links(&doc.html, &base),
            })
        }
        PageLabel::Lesson => Ok(ExtractedPage::Lesson(extract_lesson(
            &doc.html,
            strip_delimiters,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str, label: PageLabel) -> CrawlRequest {
        CrawlRequest {
            url: url.to_string(),
            label,
            attempt: 0,
        }
    }

    #[test]
    fn test_root_label_extracts_links() {
        let doc = RenderedPage {
            url: "https://console.example.com/serial-course".to_string(),
            html: r#"<div id="list-tab"><a class="list-group-item" href="/lesson-1">L1</a></div>"#
                .to_string(),
        };

        let request = request("https://console.example.com/serial-course", PageLabel::Root);
        match dispatch(&request, &doc, true).unwrap() {
            ExtractedPage::Root { lesson_links } => {
                assert_eq!(lesson_links, vec!["https://console.example.com/lesson-1"]);
            }
            other => panic!("expected root extraction, got {:?}", other),
        }
    }

    #[test]
    fn test_lesson_label_extracts_slides() {
        let doc = RenderedPage {
            url: "https://console.example.com/lesson-1".to_string(),
            html: r#"
                <div class="serial_course_title"><div>Lesson 1</div></div>
                <div id="main_slide-1">
                  <table>
                    <tr class="pinyin"><td class="show_pinyin_text">nǐ</td></tr>
                    <tr class="chinese_characters"><td class="show_simplified_characters_text">你</td></tr>
                    <tr class="english"><td class="show_translation_characters_text">you</td></tr>
                  </table>
                </div>
            "#
            .to_string(),
        };

        let request = request("https://console.example.com/lesson-1", PageLabel::Lesson);
        match dispatch(&request, &doc, true).unwrap() {
            ExtractedPage::Lesson(extract) => {
                assert_eq!(extract.title.as_deref(), Some("Lesson 1"));
                assert_eq!(extract.slides.len(), 1);
            }
            other => panic!("expected lesson extraction, got {:?}", other),
        }
    }

    #[test]
    fn test_falls_back_to_request_url_for_base() {
        let doc = RenderedPage {
            url: String::new(),
            html: r#"<div id="list-tab"><a class="list-group-item" href="/lesson-1">L1</a></div>"#
                .to_string(),
        };

        let request = request("https://console.example.com/serial-course", PageLabel::Root);
        match dispatch(&request, &doc, true).unwrap() {
            ExtractedPage::Root { lesson_links } => {
                assert_eq!(lesson_links, vec!["https://console.example.com/lesson-1"]);
            }
            other => panic!("expected root extraction, got {:?}", other),
        }
    }
}
