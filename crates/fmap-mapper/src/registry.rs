//! Registry of known export formats.

use crate::error::{MapError, Result};
use crate::schema::{Column, Schema};
use std::collections::BTreeMap;

/// Registry of schemas, keyed by format name.
///
/// The registry is an explicit value handed to the pipeline; there is no
/// global format table.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    formats: BTreeMap<String, Schema>,
}

impl FormatRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            formats: BTreeMap::new(),
        }
    }

    /// Create a registry holding the built-in bank formats.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for schema in builtin_schemas() {
            registry.register(schema);
        }
        registry
    }

    /// Register a schema under its name, replacing any schema of that name.
    ///
    /// Returns the replaced schema, if any.
    pub fn register(&mut self, schema: Schema) -> Option<Schema> {
        self.formats.insert(schema.name.clone(), schema)
    }

    /// Look up the schema registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<&Schema> {
        self.formats
            .get(name)
            .ok_or_else(|| MapError::UnknownFormat {
                name: name.to_string(),
                known: self.names().map(str::to_string).collect(),
            })
    }

    /// Registered format names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.formats.keys().map(String::as_str)
    }

    /// Registered schemas, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Schema> {
        self.formats.values()
    }

    /// Get the number of registered formats.
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

fn builtin_schemas() -> [Schema; 4] {
    use Column::{
        AccountBalance, AccountLabel, AccountNumber, Amount, Category1, Category2, Comment,
        Currency, DateOperation, DateValuation, Description, OperationId, PaymentReference,
    };

    [
        Schema::builder("boursorama")
            .delimiter(';')
            .columns([
                DateOperation,
                DateValuation,
                Description,
                Category1,
                Category2,
                Amount,
                Comment,
                AccountNumber,
                AccountLabel,
                AccountBalance,
            ])
            .date_format("%Y-%m-%d")
            .decimal_separator(',')
            .debit_account("bourso")
            .build(),
        Schema::builder("bourso")
            .delimiter('\t')
            .columns([DateOperation, DateValuation, Description, Amount, Currency])
            .date_format("%d/%m/%Y")
            .debit_account("bourso")
            .build(),
        Schema::builder("wise")
            .columns([
                OperationId,
                DateOperation,
                Amount,
                Currency,
                Description,
                PaymentReference,
            ])
            .date_format("%d-%m-%Y")
            .debit_account("wise_current")
            .build(),
        Schema::builder("bnp")
            .columns([DateOperation, Category1, Category2, Description, Amount])
            .date_format("%d-%m-%Y")
            .debit_account("current")
            .build(),
    ]
}
