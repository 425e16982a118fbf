//! Records and documents produced by the tokenizer.

use crate::schema::{Column, Schema};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::PathBuf;

/// A field value.
///
/// Every value starts out as [`Value::Text`]; the typed parser converts the
/// date and amount columns in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Raw text.
    Text(String),
    /// A date, or `None` when the source text was empty.
    Date(Option<NaiveDate>),
    /// A signed amount.
    Amount(Decimal),
}

impl Value {
    /// The text, if this value is still untyped.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One transaction's field values, in schema column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based line of the record in the input.
    pub line: u64,
    fields: Vec<(Column, Value)>,
}

impl Record {
    /// A record with an empty text value for every column.
    pub fn template(columns: &[Column]) -> Self {
        Self {
            line: 0,
            fields: columns
                .iter()
                .map(|c| (*c, Value::Text(String::new())))
                .collect(),
        }
    }

    /// The value stored under `column`.
    pub fn get(&self, column: Column) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v)
    }

    /// Replace the value stored under `column`.
    ///
    /// Returns `false` (and stores nothing) if the record has no such column;
    /// the key set of a record never changes.
    #[must_use]
    pub fn set(&mut self, column: Column, value: Value) -> bool {
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, slot)) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// The text under `column`, if present and untyped.
    pub fn text(&self, column: Column) -> Option<&str> {
        self.get(column).and_then(Value::as_text)
    }

    /// The date under `column`, if present and non-empty.
    pub fn date(&self, column: Column) -> Option<NaiveDate> {
        match self.get(column) {
            Some(Value::Date(date)) => *date,
            _ => None,
        }
    }

    /// The amount under `column`, if present and typed.
    pub fn amount(&self, column: Column) -> Option<Decimal> {
        match self.get(column) {
            Some(Value::Amount(amount)) => Some(*amount),
            _ => None,
        }
    }

    /// The record's columns, in schema order.
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.fields.iter().map(|(c, _)| *c)
    }

    /// The record's fields, in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (Column, &Value)> + '_ {
        self.fields.iter().map(|(c, v)| (*c, v))
    }
}

/// A schema paired with the records read from one input.
#[derive(Debug, Clone)]
pub struct Document {
    /// The schema the input was read with.
    pub schema: Schema,
    /// Where the records came from, for error messages.
    pub source: PathBuf,
    /// Records in input order.
    pub records: Vec<Record>,
}
