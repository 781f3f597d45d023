//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use mend_adapters::DiagnosticFormat;
use mend_core::domain::{ErrorCategory, Severity, UserFeedback};

pub mod global;
pub use global::{GlobalArgs, LogFormat, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "mend",
    bin_name = "mend",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Explain compiler errors, suggest fixes, and learn what works",
    long_about = "Mend reads TypeScript compiler diagnostics, analyses their root \
                  cause, ranks candidate fixes, applies the safe ones with \
                  rollback, and learns from every outcome.",
    after_help = "EXAMPLES:\n\
        \x20 tsc --noEmit --pretty false > tsc.txt; mend analyze tsc.txt\n\
        \x20 mend suggest diagnostics.json --output-format json\n\
        \x20 mend apply tsc.txt --dry-run\n\
        \x20 mend learn --code 2304 --solution \"Import useState from react\" --feedback helpful\n\
        \x20 mend kb stats",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Full analysis of every diagnostic.
    #[command(
        visible_alias = "a",
        about = "Analyse diagnostics: root cause, fixes, tips, resources",
        after_help = "EXAMPLES:\n\
            \x20 mend analyze tsc.txt\n\
            \x20 mend analyze ./diagnostics --format json"
    )]
    Analyze(AnalyzeArgs),

    /// Ranked fixes per diagnostic.
    #[command(
        visible_alias = "s",
        about = "Suggest ranked fixes",
        after_help = "EXAMPLES:\n\
            \x20 mend suggest tsc.txt\n\
            \x20 mend suggest tsc.txt --limit 1 --output-format json"
    )]
    Suggest(SuggestArgs),

    /// Apply automatic fixes.
    #[command(
        about = "Apply the top automatic fix for each diagnostic",
        after_help = "EXAMPLES:\n\
            \x20 mend apply tsc.txt --dry-run\n\
            \x20 mend apply tsc.txt --yes\n\
            \x20 mend apply tsc.txt --fix 2304-add-missing-import --yes"
    )]
    Apply(ApplyArgs),

    /// Record how a diagnostic was resolved.
    #[command(
        about = "Record a resolution in the knowledge base",
        after_help = "EXAMPLES:\n\
            \x20 mend learn --code 2304 --solution \"Import useState from react\"\n\
            \x20 mend learn --code 2322 --solution \"Cast with as\" --failed --feedback not-helpful"
    )]
    Learn(LearnArgs),

    /// Inspect the knowledge base.
    #[command(
        about = "Knowledge base inspection",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 mend kb stats\n\
            \x20 mend kb list\n\
            \x20 mend kb show TS2304:IMPORT_ERROR"
    )]
    Kb(KbCommands),

    /// Initialise a Mend configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 mend init           # user configuration directory\n\
            \x20 mend init --local   # .mend.toml in the current directory"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 mend completions bash > ~/.local/share/bash-completion/completions/mend\n\
            \x20 mend completions zsh  > ~/.zfunc/_mend\n\
            \x20 mend completions fish > ~/.config/fish/completions/mend.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the effective configuration.
    #[command(
        about = "Configuration inspection",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 mend config get knowledge.path\n\
            \x20 mend config list\n\
            \x20 mend config path"
    )]
    Config(ConfigCommands),
}

// ── shared input ──────────────────────────────────────────────────────────────

/// Where diagnostics come from.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// JSON diagnostics, `tsc` text output, or a directory of JSON files.
    #[arg(value_name = "INPUT", help = "Diagnostics file or directory")]
    pub input: PathBuf,

    /// Input format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "auto",
        help = "Input format"
    )]
    pub format: InputFormat,
}

/// Diagnostic input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Detect from the file extension and content.
    Auto,
    /// JSON diagnostic records.
    Json,
    /// `tsc` text output.
    Tsc,
}

impl From<InputFormat> for DiagnosticFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Auto => DiagnosticFormat::Auto,
            InputFormat::Json => DiagnosticFormat::Json,
            InputFormat::Tsc => DiagnosticFormat::Tsc,
        }
    }
}

// ── analyze / suggest ─────────────────────────────────────────────────────────

/// Arguments for `mend analyze`.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Arguments for `mend suggest`.
#[derive(Debug, Args)]
pub struct SuggestArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Show at most this many fixes per diagnostic.
    #[arg(
        short = 'n',
        long = "limit",
        value_name = "N",
        help = "Maximum fixes shown per diagnostic"
    )]
    pub limit: Option<usize>,
}

// ── apply ─────────────────────────────────────────────────────────────────────

/// Arguments for `mend apply`.
#[derive(Debug, Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Apply this fix instead of the top automatic one.
    #[arg(long = "fix", value_name = "ID", help = "Specific fix ID to apply")]
    pub fix: Option<String>,

    /// Show the edited text without writing any files.
    #[arg(long = "dry-run", help = "Preview edits without writing")]
    pub dry_run: bool,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes", help = "Apply without confirmation")]
    pub yes: bool,
}

// ── learn ─────────────────────────────────────────────────────────────────────

/// Arguments for `mend learn`.
#[derive(Debug, Args)]
pub struct LearnArgs {
    /// Diagnostic code, with or without the `TS` prefix.
    #[arg(long = "code", value_name = "CODE", value_parser = parse_code)]
    pub code: u32,

    /// Category as reported upstream; derived from the code when omitted.
    #[arg(long = "category", value_name = "CATEGORY", value_parser = parse_category)]
    pub category: Option<ErrorCategory>,

    /// Severity of the resolved diagnostic.
    #[arg(long = "severity", value_enum, default_value = "error")]
    pub severity: SeverityArg,

    /// Diagnostic message, used as the learned pattern.
    #[arg(
        long = "message",
        value_name = "TEXT",
        default_value = "recorded from the command line"
    )]
    pub message: String,

    /// What was done to resolve it.
    #[arg(long = "solution", value_name = "TEXT")]
    pub solution: String,

    /// The solution did not work.
    #[arg(long = "failed", help = "Record the attempt as unsuccessful")]
    pub failed: bool,

    /// Minutes spent, at least one.
    #[arg(long = "minutes", value_name = "N", default_value_t = 1)]
    pub minutes: u32,

    /// Was the suggestion helpful?
    #[arg(long = "feedback", value_enum)]
    pub feedback: Option<FeedbackArg>,
}

fn parse_code(raw: &str) -> Result<u32, String> {
    raw.trim()
        .trim_start_matches("TS")
        .trim_start_matches("ts")
        .parse()
        .map_err(|_| format!("'{raw}' is not a diagnostic code (e.g. 2304 or TS2304)"))
}

fn parse_category(raw: &str) -> Result<ErrorCategory, String> {
    raw.parse().map_err(|e: mend_core::domain::DomainError| e.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityArg {
    Error,
    Warning,
    Info,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Error => Severity::Error,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Info => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeedbackArg {
    Helpful,
    NotHelpful,
    PartiallyHelpful,
}

impl From<FeedbackArg> for UserFeedback {
    fn from(arg: FeedbackArg) -> Self {
        match arg {
            FeedbackArg::Helpful => UserFeedback::Helpful,
            FeedbackArg::NotHelpful => UserFeedback::NotHelpful,
            FeedbackArg::PartiallyHelpful => UserFeedback::PartiallyHelpful,
        }
    }
}

// ── kb ────────────────────────────────────────────────────────────────────────

/// Subcommands for `mend kb`.
#[derive(Debug, Subcommand)]
pub enum KbCommands {
    /// Aggregate statistics.
    Stats,
    /// Every entry, one line each.
    List,
    /// One entry in full.
    Show {
        /// Signature such as `TS2304:IMPORT_ERROR`.
        signature: String,
    },
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `mend init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `.mend.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `mend completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `mend config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `knowledge.path`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the default configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
