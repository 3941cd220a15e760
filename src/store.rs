//! Append-only result store
//!
//! Workers append records from any task at any time; nothing is ever
//! mutated or deleted. The only ordering guarantee consumers get is the
//! explicit (lesson_order, slide_index) sort applied at run end.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// One phrase-level record extracted from a lesson slide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseRecord {
    /// Human-readable lesson name as scraped
    pub lesson_title: String,

    /// Stable per-title order number, assigned at first sighting
    pub lesson_order: u32,

    /// 1-based position within the lesson's slide sequence
    pub slide_index: u32,

    pub pinyin: String,
    pub chinese: String,
    pub translation: String,

    /// May be empty; absence on the page is not an error
    pub notes: String,

    /// Pronunciation media locators; empty when the page omits them
    pub audio_fast: String,
    pub audio_slow: String,
}

/// Thread-safe append-only collection of extracted records
#[derive(Debug, Default)]
pub struct ResultStore {
    records: Mutex<Vec<PhraseRecord>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record; safe from any worker
    pub fn append(&self, record: PhraseRecord) {
        self.records.lock().unwrap().push(record);
    }

    /// Number of records appended so far
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains the store, returning the records sorted by
    /// (lesson_order, slide_index) (used once the worker pool has been
    /// joined)
    pub fn take_sorted(&self) -> Vec<PhraseRecord> {
        let mut records = std::mem::take(&mut *self.records.lock().unwrap());
        records.sort_by_key(|r| (r.lesson_order, r.slide_index));
        records
    }
}
