//! Metadata file schema
//!
//! One header line, then one line per record:
//!
//! ```text
//! Title,Year,Authors,PDF Link
//! "<title>",<year>,"<authors>",<attachment-url>
//! ```
//!
//! Title and Authors are always quoted. Year and the URL are bare unless they
//! contain a separator, quote or line break. Embedded quotes are doubled.

use crate::model::MetadataRecord;
use std::mem::take;

/// Column names, in file order
pub const HEADER: [&str; 4] = ["Title", "Year", "Authors", "PDF Link"];

/// The header exactly as written to the file (without newline)
pub const HEADER_LINE: &str = "Title,Year,Authors,PDF Link";

const SEPARATOR: char = ',';

fn needs_quotes(field: &str) -> bool {
    field.contains(SEPARATOR) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn bare_or_quoted(field: &str) -> String {
    if needs_quotes(field) {
        quoted(field)
    } else {
        field.to_string()
    }
}

/// Formats a record as one complete line, including the trailing newline
pub fn format_record_line(record: &MetadataRecord) -> String {
    format!(
        "{}{sep}{}{sep}{}{sep}{}\n",
        quoted(&record.title),
        bare_or_quoted(&record.period),
        quoted(&record.authors),
        bare_or_quoted(record.attachment_url.as_str()),
        sep = SEPARATOR
    )
}

/// Minimal CSV parser matching the writer's quoting (quotes + CRLF tolerant)
///
/// Blank lines are skipped. An unterminated quote swallows the rest of the
/// input into the current field rather than failing.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == SEPARATOR && !in_quotes => {
                row.push(take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if row.len() == 1 && row[0].is_empty() {
                    row.clear();
                } else {
                    rows.push(take(&mut row));
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}
