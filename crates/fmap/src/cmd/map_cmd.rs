//! format-mapper - Convert bank CSV exports into ledger transactions.
//!
//! # Usage
//!
//! ```bash
//! format-mapper --file export.csv --format bnp
//! format-mapper -f releve.csv -o boursorama --formats-file banks.json
//! format-mapper --list-formats
//! ```

use crate::cmd::completions::ShellType;
use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use fmap_mapper::{FormatMapper, FormatRegistry, Schema};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Transform a bank CSV export into ledger format.
#[derive(Parser, Debug)]
#[command(name = "format-mapper")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    generate_completions: Option<ShellType>,

    /// Path to the bank export
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// One of the known formats
    #[arg(short = 'o', long, value_name = "NAME")]
    format: Option<String>,

    /// Load additional formats from a JSON file
    #[arg(long, value_name = "JSON")]
    formats_file: Option<PathBuf>,

    /// List the known formats and exit
    #[arg(long)]
    list_formats: bool,

    /// Show debug logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// What a run of the command does once its arguments are parsed.
#[derive(Debug, PartialEq, Eq)]
enum Job<'a> {
    ListFormats,
    Map { file: &'a Path, format: &'a str },
}

impl<'a> Job<'a> {
    /// `None` when neither `--list-formats` nor both `--file` and `--format`
    /// were given.
    fn from_args(args: &'a Args) -> Option<Self> {
        if args.list_formats {
            return Some(Self::ListFormats);
        }
        match (&args.file, &args.format) {
            (Some(file), Some(format)) => Some(Self::Map {
                file: file.as_path(),
                format: format.as_str(),
            }),
            _ => None,
        }
    }
}

/// Main entry point for the format-mapper command.
pub fn main() -> ExitCode {
    main_with_name("format-mapper")
}

/// Main entry point with custom binary name (for the alias binaries).
pub fn main_with_name(bin_name: &str) -> ExitCode {
    let args = parse_args(bin_name);

    // Handle shell completion generation
    if let Some(shell) = args.generate_completions {
        crate::cmd::completions::generate_completions::<Args>(shell, bin_name);
        return ExitCode::SUCCESS;
    }

    let Some(job) = Job::from_args(&args) else {
        eprintln!("error: --file and --format are required");
        eprintln!("For more information, try '--help'");
        return ExitCode::from(2);
    };

    init_tracing(&args);

    match run(&args, job) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Parse the command line, listing the built-in formats in the help text.
fn parse_args(bin_name: &str) -> Args {
    let builtin = FormatRegistry::builtin();
    let known = builtin.names().collect::<Vec<_>>().join(", ");
    let command = Args::command()
        .bin_name(bin_name)
        .mut_arg("format", |arg| {
            arg.help(format!("One of the known formats. Available formats: {known}"))
        });

    Args::from_arg_matches(&command.get_matches()).unwrap_or_else(|e| e.exit())
}

fn init_tracing(args: &Args) {
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else if args.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn run(args: &Args, job: Job<'_>) -> Result<()> {
    let registry = build_registry(args)?;
    match job {
        Job::ListFormats => list_formats(&registry),
        Job::Map { file, format } => map(args, registry, file, format),
    }
}

/// The built-in formats, plus any loaded from `--formats-file`.
fn build_registry(args: &Args) -> Result<FormatRegistry> {
    let mut registry = FormatRegistry::builtin();
    if let Some(path) = &args.formats_file {
        registry
            .load_formats_file(path)
            .with_context(|| format!("cannot use formats file {}", path.display()))?;
    }

    tracing::debug!(formats = registry.len(), "format registry ready");
    Ok(registry)
}

fn list_formats(registry: &FormatRegistry) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for schema in registry.iter() {
        writeln!(stdout, "{}", describe(schema))?;
    }
    Ok(())
}

fn map(args: &Args, registry: FormatRegistry, file: &Path, format: &str) -> Result<()> {
    let mapper = FormatMapper::new(registry);
    let rendered = mapper.run(file, format)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.to_ledger_string().as_bytes())?;
    stdout.flush()?;

    if !args.quiet {
        eprintln!(
            "Mapped {} transactions from {} ({} skipped)",
            rendered.entries.len(),
            file.display(),
            rendered.skipped.len()
        );
    }

    Ok(())
}

/// One-line summary of a format for `--list-formats`.
fn describe(schema: &Schema) -> String {
    let delimiter = match schema.delimiter {
        '\t' => "tab".to_string(),
        c => format!("'{c}'"),
    };
    format!(
        "{:<12} delimiter {:<5} dates {:<10} decimal '{}'  account {}",
        schema.name, delimiter, schema.date_format, schema.decimal_separator, schema.debit_account
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_args_short_flags() {
        let args = Args::try_parse_from(["format-mapper", "-f", "export.csv", "-o", "bnp"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("export.csv")));
        assert_eq!(args.format.as_deref(), Some("bnp"));
        assert!(!args.list_formats);
    }

    #[test]
    fn test_job_requires_file_and_format() {
        let args = Args::try_parse_from(["format-mapper", "-o", "bnp"]).unwrap();
        assert_eq!(Job::from_args(&args), None);
        let args = Args::try_parse_from(["format-mapper", "-f", "x.csv"]).unwrap();
        assert_eq!(Job::from_args(&args), None);
        let args = Args::try_parse_from(["format-mapper"]).unwrap();
        assert_eq!(Job::from_args(&args), None);
    }

    #[test]
    fn test_job_from_args() {
        let args = Args::try_parse_from(["format-mapper", "-f", "x.csv", "-o", "bnp"]).unwrap();
        assert_eq!(
            Job::from_args(&args),
            Some(Job::Map {
                file: Path::new("x.csv"),
                format: "bnp"
            })
        );
        let args = Args::try_parse_from(["format-mapper", "--list-formats", "-o", "bnp"]).unwrap();
        assert_eq!(Job::from_args(&args), Some(Job::ListFormats));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(
            Args::try_parse_from(["format-mapper", "--list-formats", "-v", "-q"]).is_err()
        );
    }

    #[test]
    fn test_describe() {
        let registry = FormatRegistry::builtin();
        let line = describe(registry.resolve("bourso").unwrap());
        assert!(line.starts_with("bourso"));
        assert!(line.contains("tab"));
        assert!(line.contains("%d/%m/%Y"));
        assert!(line.ends_with("account bourso"));
    }
}
