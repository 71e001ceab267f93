//! CLI argument definitions for the `tabnorm` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tabnorm",
    version,
    about = "Normalize a directory of CSV files",
    long_about = "Normalize every CSV file of an input directory.\n\n\
                  Columns are cleaned by name-based treatments or a fallback,\n\
                  state columns are enriched from a reference database, and the\n\
                  results are written under the same file names."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize every CSV file of the input directory.
    Run(RunArgs),

    /// List the effective column treatment catalog.
    Treatments(TreatmentsArgs),
}

/// Flags override the matching environment variables.
#[derive(Parser)]
pub struct RunArgs {
    /// Directory holding the CSV files to normalize [env: INPUT_DIR].
    #[arg(long = "input-dir", value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving the normalized files [env: OUTPUT_DIR].
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Input field delimiter [env: CSV_DELIMITER].
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<String>,

    /// Comma-separated tokens read as missing [env: CSV_NA_VALUES].
    #[arg(long = "na-values", value_name = "LIST")]
    pub na_values: Option<String>,

    /// SQLite reference database used for enrichment [env: REFERENCE_DB].
    #[arg(long = "reference-db", value_name = "PATH")]
    pub reference_db: Option<PathBuf>,

    /// Treatment for columns missing from the catalog [env: FALLBACK_MODE].
    #[arg(long = "fallback", value_enum)]
    pub fallback: Option<FallbackArg>,

    /// How state keys are compared to reference keys [env: REFERENCE_KEY_MATCHING].
    #[arg(long = "key-matching", value_enum)]
    pub key_matching: Option<KeyMatchingArg>,

    /// TOML file with extra column treatments [env: TREATMENTS_FILE].
    #[arg(long = "treatments-file", value_name = "PATH")]
    pub treatments_file: Option<PathBuf>,

    /// Normalize and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Skip reference enrichment even when a database is configured.
    #[arg(long = "no-enrichment")]
    pub no_enrichment: bool,
}

#[derive(Parser)]
pub struct TreatmentsArgs {
    /// TOML file with extra column treatments [env: TREATMENTS_FILE].
    #[arg(long = "treatments-file", value_name = "PATH")]
    pub treatments_file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FallbackArg {
    Trim,
    Infer,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KeyMatchingArg {
    Exact,
    CaseInsensitive,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
