//! CSV and TSV serialization
//!
//! Every field is quote-wrapped unconditionally and embedded quotes are
//! doubled, so commas, tabs, and newlines inside extracted text can never
//! shift columns.

use crate::export::{field_values, FIELDS};
use crate::store::PhraseRecord;

/// Serializes the records as CSV with a header row
pub fn format_csv(records: &[PhraseRecord]) -> String {
    format_delimited(records, ',')
}

/// Serializes the records as TSV with a header row
pub fn format_tsv(records: &[PhraseRecord]) -> String {
    format_delimited(records, '\t')
}

fn format_delimited(records: &[PhraseRecord], delimiter: char) -> String {
    let mut out = String::new();

    push_row(&mut out, FIELDS.iter().map(|f| f.to_string()), delimiter);

    for record in records {
        push_row(&mut out, field_values(record).into_iter(), delimiter);
    }

    out
}

fn push_row(out: &mut String, fields: impl Iterator<Item = String>, delimiter: char) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    }
    out.push('\n');
}
