//! JSON serialization
//!
//! The JSON export is the lossless format: deserializing it yields exactly
//! the record set that was written.

use crate::export::{ExportError, ExportResult};
use crate::store::PhraseRecord;

/// Serializes the records as a pretty-printed JSON array
pub fn format_json(records: &[PhraseRecord]) -> ExportResult<String> {
    serde_json::to_string_pretty(records).map_err(|e| ExportError::Serialize(e.to_string()))
}
