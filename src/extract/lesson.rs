//! Phrase extraction from a lesson detail page
//!
//! A lesson page carries one title and an ordered sequence of slides. Each
//! slide is visited exactly once; a slide missing a required field produces
//! a row-level error and the rest of the page is still extracted.

use crate::extract::clean_text;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

const TITLE_SELECTOR: &str = ".serial_course_title div";
const SLIDE_SELECTOR: &str = r#"[id^="main_slide-"]"#;
const PINYIN_SELECTOR: &str = "tr.pinyin .show_pinyin_text";
const CHINESE_SELECTOR: &str = "tr.chinese_characters .show_simplified_characters_text";
const TRANSLATION_SELECTOR: &str = "tr.english .show_translation_characters_text";
const NOTES_SELECTOR: &str = ".parent_lesson_note .lesson_note_div";

const AUDIO_FAST_ATTR: &str = "data-audio-fast";
const AUDIO_SLOW_ATTR: &str = "data-audio-slow";

/// Row-level extraction failure for a single slide
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("slide {position}: required field '{field}' missing or empty")]
pub struct SlideError {
    /// 1-based position of the slide in the page's slide sequence
    pub position: u32,

    /// Which required field was missing
    pub field: &'static str,
}

/// Extracted fields of one well-formed slide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    /// 1-based position in the page's slide sequence
    pub position: u32,

    pub pinyin: String,
    pub chinese: String,
    pub translation: String,
    pub notes: String,
    pub audio_fast: String,
    pub audio_slow: String,
}

/// Everything extracted from one lesson page
#[derive(Debug, Clone)]
pub struct LessonExtract {
    /// The lesson title; None means the page layout has drifted
    pub title: Option<String>,

    /// One entry per slide element, in DOM order
    pub slides: Vec<Result<Slide, SlideError>>,
}

/// Extracts the lesson title and all slides from a rendered lesson page
pub fn extract_lesson(html: &str, strip_delimiters: bool) -> LessonExtract {
    let document = Html::parse_document(html);

    let title = select_text(&document.root_element(), TITLE_SELECTOR)
        .map(|t| clean_text(&t, strip_delimiters))
        .filter(|t| !t.is_empty());

    let slide_selector = Selector::parse(SLIDE_SELECTOR).expect("static selector");

    let slides = document
        .select(&slide_selector)
        .enumerate()
        .map(|(i, slide)| extract_slide(slide, (i + 1) as u32, strip_delimiters))
        .collect();

    LessonExtract { title, slides }
}

/// Pulls the fields of a single slide element
fn extract_slide(
    slide: ElementRef<'_>,
    position: u32,
    strip_delimiters: bool,
) -> Result<Slide, SlideError> {
    let required = |selector: &str, field: &'static str| {
        select_text(&slide, selector)
            .map(|t| clean_text(&t, strip_delimiters))
            .filter(|t| !t.is_empty())
            .ok_or(SlideError { position, field })
    };

    let pinyin = required(PINYIN_SELECTOR, "pinyin")?;
    let chinese = required(CHINESE_SELECTOR, "chinese")?;
    let translation = required(TRANSLATION_SELECTOR, "translation")?;

    // Optional fields degrade to empty strings
    let notes = select_text(&slide, NOTES_SELECTOR)
        .map(|t| clean_text(&t, strip_delimiters))
        .unwrap_or_default();

    let audio_fast = slide
        .value()
        .attr(AUDIO_FAST_ATTR)
        .unwrap_or_default()
        .trim()
        .to_string();
    let audio_slow = slide
        .value()
        .attr(AUDIO_SLOW_ATTR)
        .unwrap_or_default()
        .trim()
        .to_string();

    Ok(Slide {
        position,
        pinyin,
        chinese,
        translation,
        notes,
        audio_fast,
        audio_slow,
    })
}

/// Text content of the first descendant matching the selector
fn select_text(scope: &ElementRef<'_>, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    scope
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
}
