//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "swimid",
    version,
    about = "Resolve swim meet result rows against the athlete registries",
    long_about = "Resolve raw name/birthdate/gender/nation rows from a meet results file\n\
                  against the registered-athlete and foreign-athlete registries.\n\n\
                  Rows without a confident match are never turned into new identities;\n\
                  they are collected into a review report for a human decision."
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

    /// Log output format (pretty for humans, json for machine parsing).
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
    /// Resolve every row of a results file and write decision reports.
    Resolve(ResolveArgs),

    /// Print the normalized token set of a name, one token per line.
    Tokens(TokensArgs),
}

#[derive(Parser)]
pub struct ResolveArgs {
    /// Results CSV exported from meet management software.
    #[arg(value_name = "RESULTS_FILE")]
    pub results: PathBuf,

    /// Registered-athlete registry CSV.
    #[arg(long, value_name = "FILE")]
    pub athletes: PathBuf,

    /// Foreign-athlete registry CSV.
    #[arg(long, value_name = "FILE")]
    pub foreign: PathBuf,

    /// Nation-correction table CSV.
    #[arg(long, value_name = "FILE")]
    pub corrections: Option<PathBuf>,

    /// Output directory for reports (default: <RESULTS_FILE dir>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Matching threshold preset.
    #[arg(long, value_enum, default_value = "default")]
    pub thresholds: ThresholdArg,

    /// Resolve and summarize without writing report files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct TokensArgs {
    /// The raw name to normalize.
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ThresholdArg {
    /// Production defaults (3 words, or 2 words plus birthdate).
    Default,
    /// Name evidence alone is never enough.
    Strict,
    /// Looser matching for exploratory runs.
    Relaxed,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
