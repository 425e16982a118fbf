//! Error types for the mapping pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MapError>;

/// Errors that can occur while mapping a bank export to ledger text.
///
/// Every variant is fatal for the run it occurs in: no partial output is
/// produced.
#[derive(Debug, Error)]
pub enum MapError {
    /// The requested format name is not registered.
    #[error("unknown format '{name}' (known formats: {})", .known.join(", "))]
    UnknownFormat {
        /// The name that was requested.
        name: String,
        /// The registered names, sorted.
        known: Vec<String>,
    },

    /// The input file does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The input file exists but could not be read.
    #[error("failed to read file {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The delimited text itself is malformed.
    #[error("{path}: malformed delimited text: {source}")]
    Csv {
        /// The input path.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// A data line has fewer fields than the schema has columns.
    #[error("{path}:{line}: expected at least {expected} fields, found {found}")]
    RowTooShort {
        /// The input path.
        path: PathBuf,
        /// 1-based line number in the input.
        line: u64,
        /// Number of columns in the schema.
        expected: usize,
        /// Number of fields on the line.
        found: usize,
    },

    /// A date-like field does not match the schema's date pattern.
    #[error("{path}:{line}: invalid date '{value}' in column {column} (expected format '{pattern}'): {source}")]
    DateParse {
        /// The input path.
        path: PathBuf,
        /// 1-based line number in the input.
        line: u64,
        /// The column identifier.
        column: &'static str,
        /// The offending text.
        value: String,
        /// The strftime-style pattern.
        pattern: String,
        /// The underlying chrono error.
        #[source]
        source: chrono::ParseError,
    },

    /// An amount-like field is not a valid number.
    #[error("{path}:{line}: invalid amount '{value}' in column {column}")]
    AmountParse {
        /// The input path.
        path: PathBuf,
        /// 1-based line number in the input.
        line: u64,
        /// The column identifier.
        column: &'static str,
        /// The offending text.
        value: String,
    },

    /// A user-supplied schema was rejected.
    #[error("invalid schema '{name}': {reason}")]
    InvalidSchema {
        /// The schema name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A formats file could not be read or decoded.
    #[error("failed to load formats file {path}: {source}")]
    FormatsFile {
        /// The formats file path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl MapError {
    /// Build the IO error for `path`, promoting "not found" to its own variant.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Short machine-readable name of the error kind.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::UnknownFormat { .. } => "UnknownFormat",
            Self::FileNotFound { .. } => "FileNotFound",
            Self::Io { .. } => "IOError",
            Self::Csv { .. } => "CsvError",
            Self::RowTooShort { .. } => "RowTooShort",
            Self::DateParse { .. } => "DateParseError",
            Self::AmountParse { .. } => "AmountParseError",
            Self::InvalidSchema { .. } => "InvalidSchema",
            Self::FormatsFile { .. } => "FormatsFileError",
        }
    }
}
