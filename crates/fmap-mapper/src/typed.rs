//! Typed parsing of tokenized records.

use crate::error::{MapError, Result};
use crate::record::{Document, Value};
use crate::schema::{Column, ColumnKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Convert the date and amount columns of every record in place.
///
/// Text columns are left untouched, as are values that were already typed.
/// The first failure aborts the whole document.
pub fn parse(document: &mut Document) -> Result<()> {
    let schema = &document.schema;
    let date_columns: Vec<Column> = schema
        .columns_of_kind(ColumnKind::Date)
        .map(|(_, c)| c)
        .collect();
    let amount_columns: Vec<Column> = schema
        .columns_of_kind(ColumnKind::Amount)
        .map(|(_, c)| c)
        .collect();

    for record in &mut document.records {
        for &column in &date_columns {
            let Some(text) = record.text(column) else {
                continue;
            };
            let date = parse_date(text, &schema.date_format).map_err(|source| {
                MapError::DateParse {
                    path: document.source.clone(),
                    line: record.line,
                    column: column.as_str(),
                    value: text.to_string(),
                    pattern: schema.date_format.clone(),
                    source,
                }
            })?;
            let stored = record.set(column, Value::Date(date));
            debug_assert!(stored, "record is missing column {column}");
        }

        for &column in &amount_columns {
            let Some(text) = record.text(column) else {
                continue;
            };
            let amount = parse_amount(text, schema.decimal_separator).ok_or_else(|| {
                MapError::AmountParse {
                    path: document.source.clone(),
                    line: record.line,
                    column: column.as_str(),
                    value: text.to_string(),
                }
            })?;
            let stored = record.set(column, Value::Amount(amount));
            debug_assert!(stored, "record is missing column {column}");
        }
    }

    tracing::debug!(
        format = %schema.name,
        records = document.records.len(),
        date_columns = date_columns.len(),
        amount_columns = amount_columns.len(),
        "typed records"
    );

    Ok(())
}

/// Parse a date field.
///
/// Empty text is an absent date, not an error. Anything else is trimmed and
/// must match `pattern`.
pub fn parse_date(text: &str, pattern: &str) -> std::result::Result<Option<NaiveDate>, chrono::ParseError> {
    if text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text.trim(), pattern).map(Some)
}

/// Rewrite an amount in canonical form: `separator` becomes `.` and all
/// whitespace (including non-breaking spaces) is removed.
pub fn normalize_amount(text: &str, separator: char) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == separator { '.' } else { c })
        .collect()
}

/// Parse a signed amount written with the given decimal separator.
///
/// Amounts that cannot be represented exactly are rejected rather than
/// rounded.
pub fn parse_amount(text: &str, separator: char) -> Option<Decimal> {
    let cleaned = normalize_amount(text, separator);
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str_exact(&cleaned).ok()
}
