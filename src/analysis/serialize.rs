//! Compact delimited-text rendering of a record subset
//!
//! Produces the CSV block embedded in completion prompts: one header line,
//! then one line per record in header order. Only fields containing a comma
//! or a quote are quoted.

use crate::types::Record;

/// Render records as delimited text.
///
/// Null and missing cells render as empty fields. An empty subset renders
/// as the empty string, with no header line.
pub fn to_delimited_text(headers: &[String], records: &[&Record]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut out = headers.join(",");
    out.push('\n');

    for record in records {
        let line = headers
            .iter()
            .map(|header| escape_field(record.get(header)))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Quote a field when it contains a comma or a quote, doubling internal
/// quotes.
fn escape_field(value: Option<&str>) -> String {
    match value {
        None => String::new(),
        Some(v) if v.contains(',') || v.contains('"') => {
            format!("\"{}\"", v.replace('"', "\"\""))
        }
        Some(v) => v.to_string(),
    }
}
