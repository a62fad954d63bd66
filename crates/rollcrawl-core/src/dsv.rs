//! DSV field encoding with a configurable quote/delimiter pair.
//!
//! Only the free-text columns (Character, URL, Purpose) are ever quoted; the
//! remaining columns are numeric or fixed-format on the remote site and are
//! written as-is.

use crate::models::{FormatOptions, LAST_COLUMN, ROLL_HEADER, is_free_text_column};

/// Returns true if `value` must be quoted to survive a DSV reader.
pub fn needs_quotes(value: &str, format: &FormatOptions) -> bool {
    value.contains(format.quote())
        || value.contains(format.delimiter())
        || value.contains('\n')
        || value.contains('\r')
}

/// Wraps `value` in quote characters, doubling every embedded quote.
pub fn quote_field(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        if c == quote {
            out.push(quote);
        }
        out.push(c);
    }
    out.push(quote);
    out
}

/// Appends one field of a roll record to `out`, followed by the delimiter,
/// or by a newline when `column` is the last one.
pub fn push_field(out: &mut String, value: &str, column: usize, format: &FormatOptions) {
    if is_free_text_column(column) && needs_quotes(value, format) {
        out.push_str(&quote_field(value, format.quote()));
    } else {
        out.push_str(value);
    }

    if column == LAST_COLUMN {
        out.push('\n');
    } else {
        out.push(format.delimiter());
    }
}

/// Header line of an output file, newline-terminated.
///
/// The free-text column names are always quoted.
pub fn header_line(format: &FormatOptions) -> String {
    let mut out = String::new();
    for (column, name) in ROLL_HEADER.iter().enumerate() {
        if is_free_text_column(column) {
            out.push(format.quote());
            out.push_str(name);
            out.push(format.quote());
        } else {
            out.push_str(name);
        }
        out.push(if column == LAST_COLUMN {
            '\n'
        } else {
            format.delimiter()
        });
    }
    out
}
