//! Tracing subscriber for the `mend` binary.
//!
//! `mend-core` and `mend-adapters` only emit spans and events; this module
//! decides where they go. Everything is written to stderr so stdout carries
//! nothing but command results.
//!
//! Text runs print one compact line per event. With `--log-format json`, or
//! by default under `--output-format json`, each event is a JSON object, so
//! a wrapper parsing results from stdout can parse progress from stderr
//! too.
//!
//! | Flag(s)   | Filter | Extras             |
//! |-----------|--------|--------------------|
//! | `--quiet` | ERROR  |                    |
//! | (none)    | WARN   |                    |
//! | `-v`      | INFO   |                    |
//! | `-vv`     | DEBUG  | event targets      |
//! | `-vvv`    | TRACE  | file and line      |
//!
//! `RUST_LOG` replaces the computed filter.

use std::io::{self, IsTerminal as _};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{GlobalArgs, LogFormat, OutputFormat};

/// Crates whose events are shown at the chosen level.
const MEND_TARGETS: [&str; 3] = ["mend", "mend_core", "mend_adapters"];

/// Resolved subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogPlan {
    level: &'static str,
    format: LogFormat,
    ansi: bool,
    targets: bool,
    source_locations: bool,
}

impl LogPlan {
    fn new(args: &GlobalArgs, stderr_is_terminal: bool) -> Self {
        let level = level_for(args);
        let format = args.log_format.unwrap_or(match args.output_format {
            OutputFormat::Json => LogFormat::Json,
            _ => LogFormat::Text,
        });
        Self {
            level,
            format,
            ansi: format == LogFormat::Text
                && !args.no_color
                && args.output_format != OutputFormat::Plain
                && stderr_is_terminal,
            targets: matches!(level, "debug" | "trace"),
            source_locations: level == "trace",
        }
    }

    /// `EnvFilter` directives for the workspace crates; other crates stay
    /// at WARN.
    fn directives(&self) -> String {
        let mut directives = vec!["warn".to_string()];
        directives.extend(MEND_TARGETS.iter().map(|t| format!("{t}={}", self.level)));
        directives.join(",")
    }
}

/// Install the global subscriber. Call once, before any event fires.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let plan = LogPlan::new(args, io::stderr().is_terminal());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(plan.directives()));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match plan.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true)
                    .with_file(plan.source_locations)
                    .with_line_number(plan.source_locations)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(plan.targets)
                    .with_file(plan.source_locations)
                    .with_line_number(plan.source_locations)
                    .with_ansi(plan.ansi)
                    .with_writer(io::stderr),
            )
            .try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))
}

fn level_for(args: &GlobalArgs) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(verbose: u8, quiet: bool, output_format: OutputFormat) -> GlobalArgs {
        GlobalArgs {
            verbose,
            quiet,
            no_color: false,
            config: None,
            output_format,
            log_format: None,
        }
    }

    #[test]
    fn verbosity_maps_to_levels() {
        let level = |v, q| level_for(&args(v, q, OutputFormat::Auto));
        assert_eq!(level(0, true), "error");
        assert_eq!(level(3, true), "error");
        assert_eq!(level(0, false), "warn");
        assert_eq!(level(1, false), "info");
        assert_eq!(level(2, false), "debug");
        assert_eq!(level(10, false), "trace");
    }

    #[test]
    fn directives_cover_every_workspace_crate() {
        let plan = LogPlan::new(&args(1, false, OutputFormat::Auto), false);
        assert_eq!(
            plan.directives(),
            "warn,mend=info,mend_core=info,mend_adapters=info"
        );
    }

    #[test]
    fn json_output_defaults_to_json_logs() {
        let plan = LogPlan::new(&args(0, false, OutputFormat::Json), true);
        assert_eq!(plan.format, LogFormat::Json);
        assert!(!plan.ansi);

        let mut explicit = args(0, false, OutputFormat::Json);
        explicit.log_format = Some(LogFormat::Text);
        assert_eq!(LogPlan::new(&explicit, false).format, LogFormat::Text);
    }

    #[test]
    fn colour_needs_a_terminal_and_a_coloured_format() {
        assert!(LogPlan::new(&args(0, false, OutputFormat::Human), true).ansi);
        assert!(!LogPlan::new(&args(0, false, OutputFormat::Human), false).ansi);
        assert!(!LogPlan::new(&args(0, false, OutputFormat::Plain), true).ansi);
        let mut no_color = args(0, false, OutputFormat::Human);
        no_color.no_color = true;
        assert!(!LogPlan::new(&no_color, true).ansi);
    }

    #[test]
    fn detail_grows_with_verbosity() {
        let info = LogPlan::new(&args(1, false, OutputFormat::Auto), false);
        assert!(!info.targets && !info.source_locations);
        let debug = LogPlan::new(&args(2, false, OutputFormat::Auto), false);
        assert!(debug.targets && !debug.source_locations);
        let trace = LogPlan::new(&args(3, false, OutputFormat::Auto), false);
        assert!(trace.targets && trace.source_locations);
    }
}
