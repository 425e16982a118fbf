//! format-mapper - Convert bank CSV exports into ledger transactions.
//!
//! Primary binary for mapping bank exports.

fn main() -> std::process::ExitCode {
    fmap::cmd::map_cmd::main()
}
