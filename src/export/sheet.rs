//! SpreadsheetML serialization
//!
//! Writes the Excel 2003 XML workbook format, which spreadsheet
//! applications open directly. Order and index columns carry a numeric
//! cell type so sorting inside the spreadsheet behaves.

use crate::export::xml::escape_xml;
use crate::export::{field_values, FIELDS};
use crate::store::PhraseRecord;

const WORKBOOK_OPEN: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\"\n",
    "          xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\">\n",
    " <Worksheet ss:Name=\"Phrases\">\n",
    "  <Table>\n",
);

const WORKBOOK_CLOSE: &str = "  </Table>\n </Worksheet>\n</Workbook>\n";

// lesson_order and slide_index are the numeric columns
const NUMERIC_COLUMNS: [usize; 2] = [1, 2];

/// Serializes the records as a single-sheet SpreadsheetML workbook
pub fn format_sheet(records: &[PhraseRecord]) -> String {
    let mut out = String::from(WORKBOOK_OPEN);

    out.push_str("   <Row>\n");
    for name in FIELDS {
        push_cell(&mut out, name, "String");
    }
    out.push_str("   </Row>\n");

    for record in records {
        out.push_str("   <Row>\n");
        for (i, value) in field_values(record).iter().enumerate() {
            let cell_type = if NUMERIC_COLUMNS.contains(&i) {
                "Number"
            } else {
                "String"
            };
            push_cell(&mut out, value, cell_type);
        }
        out.push_str("   </Row>\n");
    }

    out.push_str(WORKBOOK_CLOSE);
    out
}

fn push_cell(out: &mut String, value: &str, cell_type: &str) {
    out.push_str("    <Cell><Data ss:Type=\"");
    out.push_str(cell_type);
    out.push_str("\">");
    out.push_str(&escape_xml(value));
    out.push_str("</Data></Cell>\n");
}
