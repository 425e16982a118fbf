//! Bank export conversion CLI.
//!
//! This crate provides the `format-mapper` command (also installed as `fmap`
//! and `recon`), which converts a bank CSV export into ledger transactions.
//!
//! # Example Usage
//!
//! ```bash
//! format-mapper --file export.csv --format bnp
//! fmap -f releve.csv -o boursorama > 2024.ledger
//! format-mapper --formats-file my-banks.json --list-formats
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
