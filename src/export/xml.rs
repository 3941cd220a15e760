//! XML serialization

use crate::export::{field_values, FIELDS};
use crate::store::PhraseRecord;

/// Serializes the records as a `<rows>` document with one `<row>` per record
pub fn format_xml(records: &[PhraseRecord]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rows>\n");

    for record in records {
        out.push_str("  <row>\n");
        for (name, value) in FIELDS.iter().zip(field_values(record)) {
            out.push_str("    <");
            out.push_str(name);
            out.push('>');
            out.push_str(&escape_xml(&value));
            out.push_str("</");
            out.push_str(name);
            out.push_str(">\n");
        }
        out.push_str("  </row>\n");
    }

    out.push_str("</rows>\n");
    out
}

/// Escapes the five XML-significant characters
pub(crate) fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_records;

    #[test]
    fn test_xml_structure() {
        let xml = format_xml(&sample_records());
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rows>"));
        assert!(xml.ends_with("</rows>\n"));
        assert_eq!(xml.matches("<row>").count(), 2);
        assert!(xml.contains("<pinyin>nǐ hǎo</pinyin>"));
        assert!(xml.contains("<lesson_order>1</lesson_order>"));
    }

    #[test]
    fn test_xml_escapes_special_characters() {
        assert_eq!(
            escape_xml(r#"<a href="x">&'y'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&apos;y&apos;&lt;/a&gt;"
        );

        let xml = format_xml(&sample_records());
        assert!(xml.contains("a &quot;common&quot; greeting"));
    }

    #[test]
    fn test_empty_set_yields_empty_rows_element() {
        let xml = format_xml(&[]);
        assert!(!xml.contains("<row>"));
        assert!(xml.contains("<rows>"));
    }
}
