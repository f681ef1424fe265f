//! Minimal reader for comma-separated tables
//!
//! Handles quoted fields (embedded commas, doubled quotes, line breaks),
//! CRLF line endings and a leading byte-order mark. Unquoted fields are
//! trimmed; blank rows are dropped.

use std::mem;

/// One parsed row and the line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableRow {
    pub line: usize,
    pub fields: Vec<String>,
}

impl TableRow {
    /// Field at `index`, or "" when the row is short
    pub fn get(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    /// Position of the column named `name` when this row is a header
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableError {
    pub line: usize,
    pub message: String,
}

/// Splits `text` into rows of fields
pub(crate) fn parse_table(text: &str) -> Result<Vec<TableRow>, TableError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push('\n');
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                quoted = true;
            }
            ',' => fields.push(finish_field(&mut field, &mut quoted)),
            '\r' => {}
            '\n' => {
                fields.push(finish_field(&mut field, &mut quoted));
                push_row(&mut rows, row_start, &mut fields);
                line += 1;
                row_start = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(TableError {
            line: row_start,
            message: "unterminated quoted field".to_string(),
        });
    }

    if quoted || !field.is_empty() || !fields.is_empty() {
        fields.push(finish_field(&mut field, &mut quoted));
        push_row(&mut rows, row_start, &mut fields);
    }

    Ok(rows)
}

fn finish_field(field: &mut String, quoted: &mut bool) -> String {
    let value = if *quoted {
        mem::take(field)
    } else {
        let trimmed = field.trim().to_string();
        field.clear();
        trimmed
    };
    *quoted = false;
    value
}

fn push_row(rows: &mut Vec<TableRow>, line: usize, fields: &mut Vec<String>) {
    let fields = mem::take(fields);
    if fields.iter().all(String::is_empty) {
        return;
    }
    rows.push(TableRow { line, fields });
}
