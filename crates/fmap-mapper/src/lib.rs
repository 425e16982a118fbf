//! Bank export to ledger mapping.
//!
//! This crate converts CSV exports of varying, bank-specific layouts into
//! double-entry ledger transactions.
//!
//! # Overview
//!
//! The pipeline has four stages:
//!
//! 1. [`FormatRegistry`] resolves a format name to a [`Schema`].
//! 2. The [`tokenizer`] reads the file into a [`Document`] of text records.
//! 3. The [`typed`] parser converts date and amount columns in place.
//! 4. The [`LedgerEmitter`] orders the records and renders transactions.
//!
//! # Example
//!
//! ```rust,no_run
//! use fmap_mapper::{FormatMapper, FormatRegistry};
//! use std::path::Path;
//!
//! let mapper = FormatMapper::new(FormatRegistry::builtin());
//! let rendered = mapper.run(Path::new("export.csv"), "bnp")?;
//! print!("{}", rendered.to_ledger_string());
//! # Ok::<(), fmap_mapper::MapError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod emitter;
pub mod error;
pub mod record;
pub mod registry;
pub mod schema;
pub mod tokenizer;
pub mod typed;

use std::path::Path;

pub use emitter::{LedgerEmitter, LedgerEntry, Rendered, SkipReason, SkippedRecord};
pub use error::{MapError, Result};
pub use record::{Document, Record, Value};
pub use registry::FormatRegistry;
pub use schema::{Column, ColumnKind, Schema};

/// The mapping pipeline over an explicit format registry.
#[derive(Debug, Clone, Default)]
pub struct FormatMapper {
    registry: FormatRegistry,
}

impl FormatMapper {
    /// Create a mapper over `registry`.
    pub const fn new(registry: FormatRegistry) -> Self {
        Self { registry }
    }

    /// The registry formats are resolved from.
    pub const fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Map the file at `path`, read as format `format_name`.
    pub fn run(&self, path: &Path, format_name: &str) -> Result<Rendered> {
        tracing::info!(format = format_name, file = %path.display(), "mapping export");
        let schema = self.registry.resolve(format_name)?;
        map_file(path, schema)
    }
}

/// Map the file at `path` under `schema`.
pub fn map_file(path: &Path, schema: &Schema) -> Result<Rendered> {
    let mut document = tokenizer::tokenize_file(path, schema)?;
    typed::parse(&mut document)?;
    Ok(LedgerEmitter::new(&document.schema).render(&document.records))
}

/// Map in-memory content under `schema` (useful for testing).
pub fn map_str(content: &str, schema: &Schema) -> Result<Rendered> {
    let mut document = tokenizer::tokenize_str(content, schema, "<string>")?;
    typed::parse(&mut document)?;
    Ok(LedgerEmitter::new(&document.schema).render(&document.records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_map_str_bnp() {
        let registry = FormatRegistry::builtin();
        let schema = registry.resolve("bnp").unwrap();
        let rendered = map_str(
            "Date,Cat1,Cat2,Label,Amount\n01-02-2024,Food,Groceries,Supermarket,-45.30\n",
            schema,
        )
        .unwrap();

        assert_eq!(rendered.entries.len(), 1);
        let entry = &rendered.entries[0];
        assert_eq!(entry.amount, dec!(-45.30));
        assert_eq!(entry.credit_account, "misc");
        assert_eq!(entry.debit_account, "current");
        assert_eq!(
            rendered.to_ledger_string(),
            "02/01\tPayee\n\t;Supermarket\n\tmisc\t€45.30\n\tcurrent\n\n"
        );
    }

    #[test]
    fn test_map_str_empty() {
        let registry = FormatRegistry::builtin();
        let rendered = map_str("Date,Cat1,Cat2,Label,Amount\n", registry.resolve("bnp").unwrap())
            .unwrap();
        assert!(rendered.entries.is_empty());
        assert!(rendered.skipped.is_empty());
    }

    #[test]
    fn test_map_str_leading_blank_line_takes_header_slot() {
        let registry = FormatRegistry::builtin();
        let err = map_str(
            "\nDate,C1,C2,Label,Amount\n01-02-2024,a,b,X,-1.00\n",
            registry.resolve("bnp").unwrap(),
        )
        .unwrap_err();
        match err {
            MapError::DateParse { line, value, .. } => {
                assert_eq!(line, 2);
                assert_eq!(value, "Date");
            }
            other => panic!("expected DateParse, got {other:?}"),
        }
    }

    #[test]
    fn test_map_str_blank_data_line_aborts() {
        let registry = FormatRegistry::builtin();
        let err = map_str(
            "Date,C1,C2,Label,Amount\n01-02-2024,a,b,X,-1.00\n\n02-02-2024,a,b,Y,2.00\n",
            registry.resolve("bnp").unwrap(),
        )
        .unwrap_err();
        assert_eq!(err.kind_name(), "RowTooShort");
    }

    #[test]
    fn test_run_unknown_format() {
        let mapper = FormatMapper::new(FormatRegistry::builtin());
        let err = mapper.run(Path::new("whatever.csv"), "hsbc").unwrap_err();
        assert_eq!(err.kind_name(), "UnknownFormat");
    }

    #[test]
    fn test_default_mapper_is_empty() {
        assert!(FormatMapper::default().registry().is_empty());
    }
}
