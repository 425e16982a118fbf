//! Export layouts: column vocabulary and per-format schemas.

use crate::error::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Credit account used when a schema does not name one.
pub const DEFAULT_CREDIT_ACCOUNT: &str = "misc";
/// Payee used when a schema does not name one.
pub const DEFAULT_PAYEE: &str = "Payee";
/// Currency symbol prefixed to rendered amounts.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "€";

/// A column identifier from the fixed vocabulary of bank exports.
///
/// The serialized names are the identifiers used in formats files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    /// Date the operation was booked.
    #[serde(rename = "DATE_OP")]
    DateOperation,
    /// Date the operation was valued.
    #[serde(rename = "DATE_VAL")]
    DateValuation,
    /// Free-text description of the operation.
    #[serde(rename = "DESCRIPTION")]
    Description,
    /// First-level bank category.
    #[serde(rename = "CATEGORY_1")]
    Category1,
    /// Second-level bank category.
    #[serde(rename = "CATEGORY_2")]
    Category2,
    /// Signed amount of the operation.
    #[serde(rename = "AMOUNT")]
    Amount,
    /// Free-text comment.
    #[serde(rename = "COMMENT")]
    Comment,
    /// Account number.
    #[serde(rename = "ACCOUNT_NUM")]
    AccountNumber,
    /// Account label.
    #[serde(rename = "ACCOUNT_LABEL")]
    AccountLabel,
    /// Account balance after the operation.
    #[serde(rename = "ACCOUNT_BAL")]
    AccountBalance,
    /// Bank-side operation identifier.
    #[serde(rename = "OPERATION_ID")]
    OperationId,
    /// Currency label.
    #[serde(rename = "CURRENCY")]
    Currency,
    /// Payment reference.
    #[serde(rename = "PAYMENT_REFERENCE")]
    PaymentReference,
    /// Source side of a currency exchange.
    #[serde(rename = "EXCHANGE_FROM")]
    ExchangeFrom,
    /// Target side of a currency exchange.
    #[serde(rename = "EXCHANGE_TO")]
    ExchangeTo,
}

/// How the values of a column are typed after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Calendar date, parsed with the schema's date pattern.
    Date,
    /// Decimal amount, parsed with the schema's decimal separator.
    Amount,
    /// Left as text.
    Text,
}

impl Column {
    /// Every column identifier, in vocabulary order.
    pub const ALL: [Self; 15] = [
        Self::DateOperation,
        Self::DateValuation,
        Self::Description,
        Self::Category1,
        Self::Category2,
        Self::Amount,
        Self::Comment,
        Self::AccountNumber,
        Self::AccountLabel,
        Self::AccountBalance,
        Self::OperationId,
        Self::Currency,
        Self::PaymentReference,
        Self::ExchangeFrom,
        Self::ExchangeTo,
    ];

    /// The identifier as written in formats files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DateOperation => "DATE_OP",
            Self::DateValuation => "DATE_VAL",
            Self::Description => "DESCRIPTION",
            Self::Category1 => "CATEGORY_1",
            Self::Category2 => "CATEGORY_2",
            Self::Amount => "AMOUNT",
            Self::Comment => "COMMENT",
            Self::AccountNumber => "ACCOUNT_NUM",
            Self::AccountLabel => "ACCOUNT_LABEL",
            Self::AccountBalance => "ACCOUNT_BAL",
            Self::OperationId => "OPERATION_ID",
            Self::Currency => "CURRENCY",
            Self::PaymentReference => "PAYMENT_REFERENCE",
            Self::ExchangeFrom => "EXCHANGE_FROM",
            Self::ExchangeTo => "EXCHANGE_TO",
        }
    }

    /// The static type classification of this column.
    pub const fn kind(self) -> ColumnKind {
        match self {
            Self::DateOperation | Self::DateValuation => ColumnKind::Date,
            Self::Amount => ColumnKind::Amount,
            _ => ColumnKind::Text,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of one bank's export layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Registry key.
    pub name: String,
    /// Field delimiter.
    pub delimiter: char,
    /// Quote character.
    pub quote: char,
    /// Number of leading lines to skip.
    pub header_lines: usize,
    /// Positional column mapping: field `i` goes to `columns[i]`.
    pub columns: Vec<Column>,
    /// Date pattern (strftime-style).
    pub date_format: String,
    /// Decimal separator used in amounts.
    pub decimal_separator: char,
    /// The account the export belongs to.
    pub debit_account: String,
    /// Counterpart account.
    pub credit_account: String,
    /// Payee written on every transaction.
    pub payee: String,
    /// Symbol prefixed to rendered amounts.
    pub currency_symbol: String,
}

impl Schema {
    /// Start building a schema.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// Index of `column` in the positional mapping.
    pub fn position(&self, column: Column) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    /// Columns of the given kind with their positions.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> impl Iterator<Item = (usize, Column)> + '_ {
        self.columns
            .iter()
            .copied()
            .enumerate()
            .filter(move |(_, c)| c.kind() == kind)
    }

    /// Check the invariants the tokenizer and emitter rely on.
    ///
    /// Built-in schemas are trusted; this is applied to schemas coming from
    /// formats files.
    pub fn validate(&self) -> Result<()> {
        let reject = |reason: String| MapError::InvalidSchema {
            name: self.name.clone(),
            reason,
        };

        if !self.delimiter.is_ascii() {
            return Err(reject(format!(
                "delimiter {:?} is not a single-byte character",
                self.delimiter
            )));
        }
        if !self.quote.is_ascii() {
            return Err(reject(format!(
                "quote character {:?} is not a single-byte character",
                self.quote
            )));
        }
        if self.delimiter == self.quote {
            return Err(reject("delimiter and quote character are equal".to_string()));
        }
        if self.columns.is_empty() {
            return Err(reject("no columns".to_string()));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(*column) {
                return Err(reject(format!("column {column} appears more than once")));
            }
        }

        for required in [Column::DateOperation, Column::Amount] {
            if !seen.contains(&required) {
                return Err(reject(format!("missing required column {required}")));
            }
        }

        if self.date_format.trim().is_empty() {
            return Err(reject("empty date format".to_string()));
        }

        Ok(())
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Create a builder with comma delimiter, double-quote quoting, one header
    /// line and ISO dates.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: Schema {
                name: name.into(),
                delimiter: ',',
                quote: '"',
                header_lines: 1,
                columns: Vec::new(),
                date_format: "%Y-%m-%d".to_string(),
                decimal_separator: '.',
                debit_account: String::new(),
                credit_account: DEFAULT_CREDIT_ACCOUNT.to_string(),
                payee: DEFAULT_PAYEE.to_string(),
                currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            },
        }
    }

    /// Set the field delimiter.
    pub const fn delimiter(mut self, delimiter: char) -> Self {
        self.schema.delimiter = delimiter;
        self
    }

    /// Set the quote character.
    pub const fn quote(mut self, quote: char) -> Self {
        self.schema.quote = quote;
        self
    }

    /// Set the number of header lines to skip.
    pub const fn header_lines(mut self, count: usize) -> Self {
        self.schema.header_lines = count;
        self
    }

    /// Set the positional column mapping.
    pub fn columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.schema.columns = columns.into_iter().collect();
        self
    }

    /// Set the date pattern (strftime-style).
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.schema.date_format = format.into();
        self
    }

    /// Set the decimal separator.
    pub const fn decimal_separator(mut self, separator: char) -> Self {
        self.schema.decimal_separator = separator;
        self
    }

    /// Set the default debit account.
    pub fn debit_account(mut self, account: impl Into<String>) -> Self {
        self.schema.debit_account = account.into();
        self
    }

    /// Set the default credit account.
    pub fn credit_account(mut self, account: impl Into<String>) -> Self {
        self.schema.credit_account = account.into();
        self
    }

    /// Set the default payee.
    pub fn payee(mut self, payee: impl Into<String>) -> Self {
        self.schema.payee = payee.into();
        self
    }

    /// Set the currency symbol.
    pub fn currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.schema.currency_symbol = symbol.into();
        self
    }

    /// Finish the schema.
    pub fn build(self) -> Schema {
        self.schema
    }
}
