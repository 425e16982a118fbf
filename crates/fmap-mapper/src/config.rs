//! Formats files: user-defined schemas in JSON.
//!
//! A formats file maps format names to schema definitions using the same
//! keys as the built-in table:
//!
//! ```json
//! {
//!   "revolut": {
//!     "delimiter": ",",
//!     "quotechar": "\"",
//!     "header": 1,
//!     "columns": ["DATE_OP", "DESCRIPTION", "AMOUNT", "CURRENCY"],
//!     "date-format": "%Y-%m-%d",
//!     "decimal-separator": ".",
//!     "default-debit-account": "revolut",
//!     "default-credit-account": "expenses",
//!     "default-payee": "Revolut"
//!   }
//! }
//! ```

use crate::error::{MapError, Result};
use crate::registry::FormatRegistry;
use crate::schema::{Column, Schema};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One schema as written in a formats file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct SchemaDef {
    #[serde(default = "default_delimiter")]
    delimiter: char,
    #[serde(rename = "quotechar", default = "default_quote")]
    quote: char,
    #[serde(default)]
    header: usize,
    columns: Vec<Column>,
    date_format: String,
    #[serde(default = "default_decimal_separator")]
    decimal_separator: char,
    default_debit_account: String,
    default_credit_account: Option<String>,
    default_payee: Option<String>,
    currency_symbol: Option<String>,
}

const fn default_delimiter() -> char {
    ','
}

const fn default_quote() -> char {
    '"'
}

const fn default_decimal_separator() -> char {
    '.'
}

impl SchemaDef {
    fn into_schema(self, name: String) -> Schema {
        let mut builder = Schema::builder(name)
            .delimiter(self.delimiter)
            .quote(self.quote)
            .header_lines(self.header)
            .columns(self.columns)
            .date_format(self.date_format)
            .decimal_separator(self.decimal_separator)
            .debit_account(self.default_debit_account);

        if let Some(account) = self.default_credit_account {
            builder = builder.credit_account(account);
        }
        if let Some(payee) = self.default_payee {
            builder = builder.payee(payee);
        }
        if let Some(symbol) = self.currency_symbol {
            builder = builder.currency_symbol(symbol);
        }
        builder.build()
    }
}

/// Parse and validate the schemas of a formats file.
///
/// `source` only labels error messages. Schemas are returned sorted by name.
pub fn parse_formats(json: &str, source: &Path) -> Result<Vec<Schema>> {
    let defs: BTreeMap<String, SchemaDef> =
        serde_json::from_str(json).map_err(|e| MapError::FormatsFile {
            path: source.to_path_buf(),
            source: e,
        })?;

    defs.into_iter()
        .map(|(name, def)| {
            let schema = def.into_schema(name);
            schema.validate()?;
            Ok(schema)
        })
        .collect()
}

/// Read, parse and validate a formats file.
pub fn load_formats_file(path: &Path) -> Result<Vec<Schema>> {
    let json = fs::read_to_string(path).map_err(|e| MapError::io(path, e))?;
    parse_formats(&json, path)
}

impl FormatRegistry {
    /// Register every schema of a formats file, replacing built-ins of the
    /// same name.
    ///
    /// Returns the number of schemas loaded. Nothing is registered if any
    /// schema in the file is invalid.
    pub fn load_formats_file(&mut self, path: &Path) -> Result<usize> {
        let schemas = load_formats_file(path)?;
        let count = schemas.len();
        for schema in schemas {
            if self.register(schema).is_some() {
                tracing::debug!(path = %path.display(), "formats file overrides a built-in format");
            }
        }
        tracing::debug!(path = %path.display(), count, "loaded formats file");
        Ok(count)
    }
}
